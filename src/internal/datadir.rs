use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use bitcoin::{BlockHash, Txid};
use log::{debug, info};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::types::{Block, BlockHeight, Transaction};

/// File name prefixes the node dump uses for blocks and transactions.
/// Whatever follows the prefix carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpLayout {
    pub block_prefix: String,
    pub tx_prefix: String,
}

impl Default for DumpLayout {
    fn default() -> Self {
        Self {
            block_prefix: "block_".to_string(),
            tx_prefix: "tx_".to_string(),
        }
    }
}

/// Every block and transaction of one data directory, parsed once and owned
/// by a single analysis run.
#[derive(Debug, Clone, Default)]
pub struct ChainDump {
    pub blocks: HashMap<BlockHash, Block>,
    pub txs: HashMap<Txid, Transaction>,
}

impl ChainDump {
    pub fn from_datadir(datadir: impl AsRef<Path>) -> Result<Self> {
        Self::from_datadir_with_layout(datadir, &DumpLayout::default())
    }

    /// Reads the directory listing once and parses both kinds of dump file.
    pub fn from_datadir_with_layout(datadir: impl AsRef<Path>, layout: &DumpLayout) -> Result<Self> {
        let datadir = datadir.as_ref();
        let mut dump = ChainDump::default();
        let mut skipped = 0usize;

        for (name, path) in list_datadir(datadir)? {
            if name.starts_with(&layout.block_prefix) {
                let block: Block = parse_dump_file(&path)?;
                dump.blocks.insert(block.hash, block);
            } else if name.starts_with(&layout.tx_prefix) {
                let tx: Transaction = parse_dump_file(&path)?;
                dump.txs.insert(tx.txid, tx);
            } else {
                skipped += 1;
            }
        }

        info!(
            "loaded {} blocks and {} transactions from {} ({} other files skipped)",
            dump.blocks.len(),
            dump.txs.len(),
            datadir.display(),
            skipped,
        );
        Ok(dump)
    }

    /// Height of the block containing each txid. Transactions in no loaded
    /// block are absent.
    ///
    /// A txid listed by several blocks (stale or reorged blocks left in the
    /// datadir) gets the lowest of their heights.
    pub fn tx_heights(&self) -> HashMap<Txid, BlockHeight> {
        let mut heights: HashMap<Txid, BlockHeight> = HashMap::new();
        for block in self.blocks.values() {
            for txid in &block.tx {
                heights
                    .entry(*txid)
                    .and_modify(|height| *height = (*height).min(block.height))
                    .or_insert(block.height);
            }
        }
        heights
    }
}

pub fn load_blocks(datadir: impl AsRef<Path>) -> Result<HashMap<BlockHash, Block>> {
    load_prefixed(datadir.as_ref(), &DumpLayout::default().block_prefix, |b: &Block| b.hash)
}

pub fn load_txs(datadir: impl AsRef<Path>) -> Result<HashMap<Txid, Transaction>> {
    load_prefixed(datadir.as_ref(), &DumpLayout::default().tx_prefix, |tx: &Transaction| tx.txid)
}

fn load_prefixed<K, V, F>(datadir: &Path, prefix: &str, key: F) -> Result<HashMap<K, V>>
where
    K: std::hash::Hash + Eq,
    V: DeserializeOwned,
    F: Fn(&V) -> K,
{
    let mut loaded = HashMap::new();
    for (name, path) in list_datadir(datadir)? {
        if !name.starts_with(prefix) {
            continue;
        }
        let value: V = parse_dump_file(&path)?;
        loaded.insert(key(&value), value);
    }
    debug!("loaded {} '{}' files from {}", loaded.len(), prefix, datadir.display());
    Ok(loaded)
}

/// (file name, path) of every regular file directly inside `datadir`.
fn list_datadir(datadir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let dir_error = |source| Error::DataDirectory {
        path: datadir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(datadir).map_err(dir_error)? {
        let entry = entry.map_err(dir_error)?;
        if !entry.file_type().map_err(dir_error)?.is_file() {
            continue;
        }
        // non UTF-8 names cannot carry our prefixes
        if let Ok(name) = entry.file_name().into_string() {
            files.push((name, entry.path()));
        }
    }
    Ok(files)
}

fn parse_dump_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let malformed = |reason: String| Error::MalformedDump {
        file: path.to_path_buf(),
        reason,
    };
    let contents = fs::read_to_string(path).map_err(|e| malformed(e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| malformed(e.to_string()))
}
