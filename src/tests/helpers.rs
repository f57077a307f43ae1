// Fixture builders shared by the test modules.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use bitcoin::blockdata::opcodes::all as opcodes;
use bitcoin::hashes::Hash;
use bitcoin::script::{Builder, ScriptBuf};
use bitcoin::{Amount, BlockHash, Txid};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::graph::TxsGraph;
use crate::internal::datadir::ChainDump;
use crate::types::{Block, BlockHeight, InputSource, Transaction, TxInput, TxOutput};

pub const OUTPUT_SATS: u64 = 100_000;

/// Deterministic txid for a human-readable label.
pub fn txid(label: &str) -> Txid {
    Txid::from_byte_array(Sha256::digest(label.as_bytes()).into())
}

pub fn block_hash(height: BlockHeight) -> BlockHash {
    BlockHash::from_byte_array(Sha256::digest(format!("block {}", height)).into())
}

pub fn coinbase_tx(label: &str, sats: u64) -> Transaction {
    Transaction {
        txid: txid(label),
        size: 120,
        vsize: None,
        locktime: 0,
        vin: vec![TxInput {
            source: InputSource::Coinbase {
                coinbase: "510101".to_string(),
            },
            sequence: u32::MAX,
            txinwitness: vec![],
        }],
        vout: vec![TxOutput {
            value: Amount::from_sat(sats),
            n: 0,
        }],
    }
}

/// A tx spending `inputs` (label, vout) and creating one output per entry of `outputs`.
pub fn spend_tx(label: &str, inputs: &[(&str, u32)], outputs: &[u64]) -> Transaction {
    Transaction {
        txid: txid(label),
        size: 200,
        vsize: Some(150),
        locktime: 0,
        vin: inputs
            .iter()
            .map(|(src, vout)| TxInput {
                source: InputSource::Outpoint {
                    txid: txid(src),
                    vout: *vout,
                },
                sequence: u32::MAX,
                txinwitness: vec![],
            })
            .collect(),
        vout: outputs
            .iter()
            .enumerate()
            .map(|(n, sats)| TxOutput {
                value: Amount::from_sat(*sats),
                n: n as u32,
            })
            .collect(),
    }
}

pub fn dump_of(txs: Vec<Transaction>, blocks: Vec<Block>) -> ChainDump {
    ChainDump {
        blocks: blocks.into_iter().map(|b| (b.hash, b)).collect(),
        txs: txs.into_iter().map(|tx| (tx.txid, tx)).collect(),
    }
}

pub fn block_of(height: BlockHeight, labels: &[&str]) -> Block {
    Block {
        hash: block_hash(height),
        height,
        tx: labels.iter().map(|label| txid(label)).collect(),
    }
}

/// A graph with one node per label and one spend per `(src, dst)` pair.
///
/// Each pair spends its own output of `src`. Labels that spend nothing become
/// coinbase transactions.
pub fn graph_from_edges(edges: &[(&str, &str)]) -> TxsGraph {
    let mut labels: Vec<&str> = Vec::new();
    for (src, dst) in edges {
        for label in [*src, *dst] {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
    }

    let mut inputs: HashMap<&str, Vec<(&str, u32)>> = HashMap::new();
    let mut output_count: HashMap<&str, u32> = HashMap::new();
    for (src, dst) in edges {
        let vout = output_count.entry(*src).or_insert(0);
        inputs.entry(*dst).or_default().push((*src, *vout));
        *vout += 1;
    }

    let txs = labels
        .iter()
        .map(|label| {
            let outputs = vec![OUTPUT_SATS; *output_count.get(label).unwrap_or(&1) as usize];
            match inputs.get(label) {
                Some(spent) => spend_tx(label, spent, &outputs),
                None => {
                    let mut tx = coinbase_tx(label, OUTPUT_SATS);
                    tx.vout = spend_tx(label, &[], &outputs).vout;
                    tx
                }
            }
        })
        .collect();

    TxsGraph::from_dump(&dump_of(txs, vec![])).unwrap()
}

pub fn txid_set(labels: &[&str]) -> Vec<Txid> {
    labels.iter().map(|label| txid(label)).collect()
}

pub fn sorted_txids(graph: &TxsGraph) -> Vec<Txid> {
    let mut txids: Vec<Txid> = graph.txids().collect();
    txids.sort();
    txids
}

pub fn sorted(mut txids: Vec<Txid>) -> Vec<Txid> {
    txids.sort();
    txids
}

// ============================================================================
// HTLC SCRIPTS
// ============================================================================

pub const REVOCATION_PUBKEY: [u8; 33] = [0x03; 33];
pub const REMOTE_HTLCPUBKEY: [u8; 33] = [0x02; 33];
pub const LOCAL_HTLCPUBKEY: [u8; 33] = [0x02; 33];

pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(Sha256::digest(data)).into()
}

/// BOLT 3 received-HTLC script for `payment_preimage`, expiring at `cltv_expiry`.
pub fn received_htlc_script(payment_preimage: &[u8; 32], cltv_expiry: i64) -> ScriptBuf {
    let payment_hash: [u8; 32] = Sha256::digest(payment_preimage).into();
    let payment_hash160: [u8; 20] = Ripemd160::digest(payment_hash).into();

    Builder::new()
        .push_opcode(opcodes::OP_DUP)
        .push_opcode(opcodes::OP_HASH160)
        .push_slice(hash160(&REVOCATION_PUBKEY))
        .push_opcode(opcodes::OP_EQUAL)
        .push_opcode(opcodes::OP_IF)
        .push_opcode(opcodes::OP_CHECKSIG)
        .push_opcode(opcodes::OP_ELSE)
        .push_slice(REMOTE_HTLCPUBKEY)
        .push_opcode(opcodes::OP_SWAP)
        .push_opcode(opcodes::OP_SIZE)
        .push_int(32)
        .push_opcode(opcodes::OP_EQUAL)
        .push_opcode(opcodes::OP_IF)
        .push_opcode(opcodes::OP_HASH160)
        .push_slice(payment_hash160)
        .push_opcode(opcodes::OP_EQUALVERIFY)
        .push_int(2)
        .push_opcode(opcodes::OP_SWAP)
        .push_slice(LOCAL_HTLCPUBKEY)
        .push_int(2)
        .push_opcode(opcodes::OP_CHECKMULTISIG)
        .push_opcode(opcodes::OP_ELSE)
        .push_opcode(opcodes::OP_DROP)
        .push_int(cltv_expiry)
        .push_opcode(opcodes::OP_CLTV)
        .push_opcode(opcodes::OP_DROP)
        .push_opcode(opcodes::OP_CHECKSIG)
        .push_opcode(opcodes::OP_ENDIF)
        .push_opcode(opcodes::OP_ENDIF)
        .into_script()
}

pub fn received_htlc_script_hex(cltv_expiry: i64) -> String {
    hex::encode(received_htlc_script(&[0x42; 32], cltv_expiry).as_bytes())
}

/// Witness of a timeout claim by the remote: `<remotehtlcsig> <> <script>`.
pub fn timeout_witness(script_hex: &str) -> Vec<String> {
    vec![hex::encode([0x30; 71]), String::new(), script_hex.to_string()]
}

/// Witness of a success claim: `0 <remotehtlcsig> <localhtlcsig> <preimage> <script>`.
pub fn success_witness(script_hex: &str) -> Vec<String> {
    vec![
        String::new(),
        hex::encode([0x30; 71]),
        hex::encode([0x30; 72]),
        hex::encode([0x42; 32]),
        script_hex.to_string(),
    ]
}

/// Witness of a revocation claim: `<revocation_sig> <revocationpubkey> <script>`.
pub fn revocation_witness(script_hex: &str) -> Vec<String> {
    vec![
        hex::encode([0x30; 71]),
        hex::encode(REVOCATION_PUBKEY),
        script_hex.to_string(),
    ]
}

/// Single-input tx spending `src:vout` with the given witness.
pub fn claim_tx(label: &str, src: &str, vout: u32, witness: Vec<String>, locktime: u32) -> Transaction {
    let mut tx = spend_tx(label, &[(src, vout)], &[OUTPUT_SATS / 2]);
    tx.vin[0].txinwitness = witness;
    tx.locktime = locktime;
    tx
}

// ============================================================================
// ON-DISK DUMPS
// ============================================================================

pub fn write_tx(dir: &Path, tx: &Transaction) {
    let path = dir.join(format!("tx_{}.json", tx.txid));
    fs::write(path, serde_json::to_string_pretty(tx).unwrap()).unwrap();
}

pub fn write_block(dir: &Path, block: &Block) {
    let path = dir.join(format!("block_{}.json", block.height));
    fs::write(path, serde_json::to_string_pretty(block).unwrap()).unwrap();
}

pub fn write_dump(dir: &Path, dump: &ChainDump) {
    for tx in dump.txs.values() {
        write_tx(dir, tx);
    }
    for block in dump.blocks.values() {
        write_block(dir, block);
    }
}
