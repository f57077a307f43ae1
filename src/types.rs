use bitcoin::{Amount, BlockHash, SignedAmount, Txid};
use serde::{Deserialize, Serialize};

pub type BlockHeight = u32;

/// nSequence value at or above which an input does not signal BIP-125 replaceability.
pub const MAX_NON_RBF_SEQUENCE: u32 = 0xffff_fffe;

// ============================================================================
// NODE DUMP SHAPES
// ============================================================================
// These mirror the verbose `getblock` / `getrawtransaction` responses that the
// simulation dumps into its data directory. Unknown fields are ignored.

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub hash: BlockHash,
    pub height: BlockHeight,
    pub tx: Vec<Txid>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Transaction {
    pub txid: Txid,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vsize: Option<u64>,
    pub locktime: u32,
    pub vin: Vec<TxInput>,
    pub vout: Vec<TxOutput>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TxInput {
    #[serde(flatten)]
    pub source: InputSource,
    pub sequence: u32,
    /// Hex-encoded witness stack, bottom first. The witness script is the last element.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub txinwitness: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum InputSource {
    Coinbase { coinbase: String },
    Outpoint { txid: Txid, vout: u32 },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub value: Amount,
    #[serde(default)]
    pub n: u32,
}

impl TxInput {
    pub fn is_coinbase(&self) -> bool {
        matches!(self.source, InputSource::Coinbase { .. })
    }

    /// The (txid, vout) this input spends, or None for a coinbase input.
    pub fn outpoint(&self) -> Option<(Txid, u32)> {
        match self.source {
            InputSource::Coinbase { .. } => None,
            InputSource::Outpoint { txid, vout } => Some((txid, vout)),
        }
    }

    /// The witness script of a P2WSH spend: the final witness stack element.
    pub fn witness_script(&self) -> Option<&str> {
        self.txinwitness.last().map(String::as_str)
    }
}

impl Transaction {
    /// Coinbase transactions are recognized by their first input only.
    pub fn is_coinbase(&self) -> bool {
        self.vin.first().map_or(false, TxInput::is_coinbase)
    }

    pub fn output_value(&self, index: u32) -> Option<Amount> {
        self.vout.get(index as usize).map(|out| out.value)
    }

    /// Virtual size when the node reported one, raw size otherwise.
    pub fn vsize_or_size(&self) -> u64 {
        self.vsize.unwrap_or(self.size)
    }
}

// ============================================================================
// GRAPH ATTRIBUTES
// ============================================================================

/// Attributes carried by a graph node besides its txid.
#[derive(Debug, Clone, PartialEq)]
pub struct TxNode {
    pub tx: std::sync::Arc<Transaction>,
    pub fee: SignedAmount,
    /// Height of the containing block, None if the tx is in no loaded block.
    pub height: Option<BlockHeight>,
}

impl TxNode {
    pub fn txid(&self) -> Txid {
        self.tx.txid
    }
}

/// A spend relationship: `dst` spends output `index` (worth `value`) of `src`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpendEdge {
    pub src: Txid,
    pub dst: Txid,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub value: Amount,
    pub index: u32,
}

/// How an HTLC output was claimed, read off the claiming witness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HtlcClaimPath {
    /// Payment preimage revealed.
    Success,
    /// CLTV expiry reached, no preimage.
    Timeout,
    /// Revocation key used on a revoked commitment.
    Revocation,
}
