use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use bitcoin::Txid;
use log::{debug, warn};
use serde::Deserialize;

use crate::error::Result;

/// What the channel funding command prints once the funding tx is broadcast.
#[derive(Debug, Deserialize)]
struct FundChannelOutput {
    #[allow(dead_code)]
    tx: String,
    txid: Txid,
    #[allow(dead_code)]
    channel_id: String,
}

/// Funding txids printed to the simulation log at `simulation_outfile`.
pub fn extract_funding_txids(simulation_outfile: impl AsRef<Path>) -> Result<BTreeSet<Txid>> {
    let output = fs::read_to_string(simulation_outfile.as_ref())?;
    Ok(scan_funding_txids(&output))
}

/// Finds every JSON object in `output` shaped like a funding command result.
/// Other text, including unrelated JSON, is skipped.
pub fn scan_funding_txids(output: &str) -> BTreeSet<Txid> {
    let mut txids = BTreeSet::new();
    let mut pos = 0;

    while let Some(start) = output[pos..].find('{').map(|i| pos + i) {
        let mut stream =
            serde_json::Deserializer::from_str(&output[start..]).into_iter::<serde_json::Value>();
        match stream.next() {
            Some(Ok(value)) => match funding_txid(value) {
                Some(txid) => {
                    debug!("found funding tx {}", txid);
                    txids.insert(txid);
                    pos = start + stream.byte_offset();
                }
                // may still wrap a funding object
                None => pos = start + 1,
            },
            // not json at this brace, try the next one
            _ => pos = start + 1,
        }
    }

    if txids.is_empty() {
        warn!("no funding transactions found in simulation output");
    }
    txids
}

fn funding_txid(value: serde_json::Value) -> Option<Txid> {
    let object = value.as_object()?;
    if !["tx", "txid", "channel_id"].iter().all(|key| object.contains_key(*key)) {
        return None;
    }
    serde_json::from_value::<FundChannelOutput>(value)
        .ok()
        .map(|out| out.txid)
}
