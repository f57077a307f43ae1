use std::collections::BTreeMap;

use bitcoin::Txid;
use log::info;
use serde::Serialize;

use htlc_forensics::types::{BlockHeight, SpendEdge};
use htlc_forensics::{find_double_spends, Error, Result, TxsGraph};

#[derive(Serialize)]
struct NodeReport {
    txid: Txid,
    fee_sat: i64,
    feerate_sat_vb: f64,
    height: Option<BlockHeight>,
    replaceable: bool,
    htlc_claim: bool,
}

#[derive(Serialize)]
struct GraphReport<'a> {
    nodes: Vec<NodeReport>,
    edges: Vec<&'a SpendEdge>,
}

#[derive(Serialize)]
struct HtlcExpiry {
    commitment_txid: Txid,
    /// 0 when no child of the commitment claims an htlc
    minimal_expiration_height: BlockHeight,
}

#[derive(Serialize)]
struct Summary {
    transactions: usize,
    spends: usize,
    coinbase: usize,
    unconfirmed: usize,
    replaceable: usize,
    htlc_claims: usize,
    double_spent_outputs: usize,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Like `is_replaceable_by_fee`, but an input-less tx simply signals nothing.
fn signals_rbf(graph: &TxsGraph, txid: &Txid) -> Result<bool> {
    match graph.is_replaceable_by_fee(txid) {
        Err(Error::NoInputs(_)) => Ok(false),
        other => other,
    }
}

fn node_report(graph: &TxsGraph, txid: Txid) -> Result<NodeReport> {
    let node = graph.node(&txid).ok_or(Error::UnknownTransaction(txid))?;
    Ok(NodeReport {
        txid,
        fee_sat: node.fee.to_sat(),
        feerate_sat_vb: graph.feerate(&txid)?,
        height: node.height,
        replaceable: signals_rbf(graph, &txid)?,
        htlc_claim: graph.is_htlc_claim_tx(&txid)?,
    })
}

pub fn run_summary(graph: &TxsGraph) -> Result<()> {
    let mut summary = Summary {
        transactions: graph.node_count(),
        spends: graph.edge_count(),
        coinbase: 0,
        unconfirmed: 0,
        replaceable: 0,
        htlc_claims: 0,
        double_spent_outputs: find_double_spends(graph).values().map(|outs| outs.len()).sum(),
    };

    for node in graph.nodes() {
        let txid = node.txid();
        summary.coinbase += usize::from(node.tx.is_coinbase());
        summary.unconfirmed += usize::from(node.height.is_none());
        summary.replaceable += usize::from(signals_rbf(graph, &txid)?);
        summary.htlc_claims += usize::from(graph.is_htlc_claim_tx(&txid)?);
    }

    print_json(&summary)
}

pub fn run_downstream(graph: &TxsGraph, sources: &[Txid]) -> Result<()> {
    let downstream = graph.get_downstream(sources)?;
    let nodes = downstream
        .txids()
        .map(|txid| node_report(&downstream, txid))
        .collect::<Result<Vec<_>>>()?;

    print_json(&GraphReport {
        nodes,
        edges: downstream.edges().collect(),
    })
}

pub fn run_double_spends(graph: &TxsGraph) -> Result<()> {
    print_json(&find_double_spends(graph))
}

pub fn run_htlc_expiry(graph: &TxsGraph, commitment_txid: &Txid) -> Result<()> {
    let height = graph.get_minimal_htlc_expiration_height(commitment_txid)?;
    if height == 0 {
        info!("no htlc claimed from {}", commitment_txid);
    }
    print_json(&HtlcExpiry {
        commitment_txid: *commitment_txid,
        minimal_expiration_height: height,
    })
}

/// How many HTLCs were claimed using timeout from each channel.
pub fn run_timeout_claims(graph: &TxsGraph, funding_txids: &[Txid]) -> Result<()> {
    let mut claims: BTreeMap<Txid, Vec<Txid>> = BTreeMap::new();
    for funding_txid in funding_txids {
        let claimed = graph.get_htlcs_claimed_by_timeout(funding_txid)?;
        info!("{}: {} htlcs claimed by timeout", funding_txid, claimed.len());
        claims.insert(*funding_txid, claimed);
    }
    print_json(&claims)
}
