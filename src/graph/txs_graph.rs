use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use bitcoin::{SignedAmount, Txid};
use log::{info, warn};

use crate::error::{Error, Result};
use crate::internal::datadir::{ChainDump, DumpLayout};
use crate::transactions::fees::{find_tx_fee, get_spent_output_value};
use crate::types::{BlockHeight, SpendEdge, Transaction, TxNode};

/// Dense index of a node inside one graph.
pub(crate) type NodeIdx = usize;

/// Directed graph of spend relationships between transactions.
///
/// Nodes live in an arena indexed by [`NodeIdx`]; the public API speaks txids.
/// An edge `src -> dst` means `dst` spends an output of `src`. Several edges may
/// join the same pair, and several edges may share one `(src, index)` output:
/// that is a double spend and is kept as is.
///
/// A graph is built once and not mutated afterwards, so shared references can
/// be queried from several threads.
#[derive(Debug, Clone, Default)]
pub struct TxsGraph {
    pub(crate) index: HashMap<Txid, NodeIdx>,
    pub(crate) nodes: Vec<TxNode>,
    pub(crate) edges: Vec<SpendEdge>,
    /// Edge positions leaving / entering each node, in insertion order.
    pub(crate) out_edges: Vec<Vec<usize>>,
    pub(crate) in_edges: Vec<Vec<usize>>,
}

impl TxsGraph {
    /// Reads all block and transaction files in `datadir` and builds the full
    /// transaction graph.
    ///
    /// Each node carries the tx json, its fee and the height of its block (None
    /// if the tx is in no loaded block, e.g. a mempool tx). Each edge carries
    /// the value of the spent output and its index in the source transaction.
    pub fn from_datadir(datadir: impl AsRef<Path>) -> Result<Self> {
        Self::from_datadir_with_layout(datadir, &DumpLayout::default())
    }

    pub fn from_datadir_with_layout(datadir: impl AsRef<Path>, layout: &DumpLayout) -> Result<Self> {
        let dump = ChainDump::from_datadir_with_layout(datadir, layout)?;
        Self::from_dump(&dump)
    }

    pub fn from_dump(dump: &ChainDump) -> Result<Self> {
        let heights = dump.tx_heights();

        // Sort so node order, and everything derived from it, is reproducible.
        let mut txids: Vec<&Txid> = dump.txs.keys().collect();
        txids.sort();

        let mut graph = TxsGraph::default();
        for txid in &txids {
            let tx = &dump.txs[*txid];
            if tx.is_coinbase() && tx.vin.len() > 1 {
                warn!("coinbase transaction {} has {} inputs", txid, tx.vin.len());
            }
            let fee = find_tx_fee(txid, &dump.txs)?;
            graph.add_node(Arc::new(tx.clone()), fee, heights.get(*txid).copied());
        }

        for dest_txid in &txids {
            let dest_tx = &dump.txs[*dest_txid];
            for (src_txid, index) in dest_tx.vin.iter().filter_map(|input| input.outpoint()) {
                let value = get_spent_output_value(src_txid, index, **dest_txid, &dump.txs)?;
                graph.add_edge(SpendEdge {
                    src: src_txid,
                    dst: **dest_txid,
                    value,
                    index,
                });
            }
        }

        info!(
            "built transaction graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    /// Inserts a node, or returns the existing index if the txid is known.
    pub(crate) fn add_node(
        &mut self,
        tx: Arc<Transaction>,
        fee: SignedAmount,
        height: Option<BlockHeight>,
    ) -> NodeIdx {
        if let Some(idx) = self.index.get(&tx.txid) {
            return *idx;
        }
        let idx = self.nodes.len();
        self.index.insert(tx.txid, idx);
        self.nodes.push(TxNode { tx, fee, height });
        self.out_edges.push(Vec::new());
        self.in_edges.push(Vec::new());
        idx
    }

    /// Both endpoints must already be nodes of the graph.
    pub(crate) fn add_edge(&mut self, edge: SpendEdge) {
        let src = self.index[&edge.src];
        let dst = self.index[&edge.dst];
        let pos = self.edges.len();
        self.edges.push(edge);
        self.out_edges[src].push(pos);
        self.in_edges[dst].push(pos);
    }

    pub(crate) fn idx(&self, txid: &Txid) -> Result<NodeIdx> {
        self.index
            .get(txid)
            .copied()
            .ok_or(Error::UnknownTransaction(*txid))
    }

    pub(crate) fn out_edges_of(&self, idx: NodeIdx) -> impl Iterator<Item = &SpendEdge> {
        self.out_edges[idx].iter().map(move |pos| &self.edges[*pos])
    }

    pub fn contains(&self, txid: &Txid) -> bool {
        self.index.contains_key(txid)
    }

    pub fn node(&self, txid: &Txid) -> Option<&TxNode> {
        self.index.get(txid).map(|idx| &self.nodes[*idx])
    }

    pub(crate) fn node_or_err(&self, txid: &Txid) -> Result<&TxNode> {
        self.node(txid).ok_or(Error::UnknownTransaction(*txid))
    }

    pub fn tx(&self, txid: &Txid) -> Result<&Transaction> {
        Ok(&self.node_or_err(txid)?.tx)
    }

    pub fn fee(&self, txid: &Txid) -> Result<SignedAmount> {
        Ok(self.node_or_err(txid)?.fee)
    }

    pub fn height(&self, txid: &Txid) -> Result<Option<BlockHeight>> {
        Ok(self.node_or_err(txid)?.height)
    }

    /// Fee rate of `txid` in sat/vbyte.
    pub fn feerate(&self, txid: &Txid) -> Result<f64> {
        let node = self.node_or_err(txid)?;
        Ok(crate::transactions::fees::feerate(&node.tx, node.fee))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Txids in node insertion order.
    pub fn txids(&self) -> impl Iterator<Item = Txid> + '_ {
        self.nodes.iter().map(TxNode::txid)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TxNode> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &SpendEdge> {
        self.edges.iter()
    }

    /// Edges leaving `txid`, in insertion order.
    pub fn out_edges(&self, txid: &Txid) -> Result<Vec<&SpendEdge>> {
        Ok(self.out_edges_of(self.idx(txid)?).collect())
    }

    /// Edges entering `txid`, in insertion order.
    pub fn in_edges(&self, txid: &Txid) -> Result<Vec<&SpendEdge>> {
        let idx = self.idx(txid)?;
        Ok(self.in_edges[idx].iter().map(|pos| &self.edges[*pos]).collect())
    }
}
