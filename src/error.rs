use std::path::PathBuf;

use bitcoin::Txid;

use crate::scripts::disassembler::ScriptDecodeError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot read data directory {path}: {source}")]
    DataDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dump file {file}: {reason}")]
    MalformedDump { file: PathBuf, reason: String },

    #[error("transaction {spender} spends {txid}, which is not in the loaded set")]
    ReferencedTxNotFound { txid: Txid, spender: Txid },

    #[error("transaction {spender} spends {txid}:{index}, but {txid} has only {outputs} outputs")]
    OutputIndexOutOfRange {
        txid: Txid,
        index: u32,
        outputs: usize,
        spender: Txid,
    },

    #[error("script decode error: {0}")]
    ScriptDecode(#[from] ScriptDecodeError),

    #[error("not a valid htlc script")]
    NotAnHtlcScript,

    #[error("htlc expiry slot holds a non-numeric value: {0}")]
    NonNumericExpiry(String),

    #[error("unknown transaction {0}")]
    UnknownTransaction(Txid),

    #[error("transaction {0} has no inputs")]
    NoInputs(Txid),

    #[error("transaction {txid} expected to have 1 child, but has {count}")]
    UnexpectedChildCount { txid: Txid, count: usize },

    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
