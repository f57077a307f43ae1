use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use bitcoin::Txid;
use log::debug;

use crate::error::{Error, Result};
use crate::graph::txs_graph::{NodeIdx, TxsGraph};
use crate::scripts::htlc::{claim_path, get_htlc_expiration_height, is_htlc_script};
use crate::types::{BlockHeight, HtlcClaimPath, MAX_NON_RBF_SEQUENCE};

/// Spenders of each double-spent output, keyed by source txid then output index.
pub type DoubleSpends = HashMap<Txid, BTreeMap<u32, Vec<Txid>>>;

impl TxsGraph {
    /// Every transaction spending an output of `txid`, each listed once.
    pub fn get_all_direct_children(&self, txid: &Txid) -> Result<Vec<Txid>> {
        let mut seen: HashSet<Txid> = HashSet::new();
        Ok(self
            .out_edges_of(self.idx(txid)?)
            .map(|edge| edge.dst)
            .filter(|child| seen.insert(*child))
            .collect())
    }

    /// Every loaded transaction `txid` spends from, each listed once.
    pub fn get_all_direct_parents(&self, txid: &Txid) -> Result<Vec<Txid>> {
        let mut seen: HashSet<Txid> = HashSet::new();
        Ok(self
            .in_edges(txid)?
            .into_iter()
            .map(|edge| edge.src)
            .filter(|parent| seen.insert(*parent))
            .collect())
    }

    /// Minimal nSequence over the inputs of `txid`.
    pub fn get_minimal_nsequence(&self, txid: &Txid) -> Result<u32> {
        self.tx(txid)?
            .vin
            .iter()
            .map(|input| input.sequence)
            .min()
            .ok_or(Error::NoInputs(*txid))
    }

    /// BIP-125 opt-in: some input has a sequence below `0xfffffffe`.
    pub fn is_replaceable_by_fee(&self, txid: &Txid) -> Result<bool> {
        Ok(self.get_minimal_nsequence(txid)? < MAX_NON_RBF_SEQUENCE)
    }

    /// The subgraph induced by `sources` and everything reachable from them.
    ///
    /// Node and edge attributes are copied from this graph. Nodes keep this
    /// graph's relative order, so the result does not depend on the order of
    /// `sources`.
    pub fn get_downstream<'a, I>(&self, sources: I) -> Result<TxsGraph>
    where
        I: IntoIterator<Item = &'a Txid>,
    {
        let mut reached = vec![false; self.nodes.len()];
        let mut queue: VecDeque<NodeIdx> = VecDeque::new();

        for txid in sources {
            let idx = self.idx(txid)?;
            if !reached[idx] {
                reached[idx] = true;
                queue.push_back(idx);
            }
        }

        while let Some(idx) = queue.pop_front() {
            for edge in self.out_edges_of(idx) {
                let child = self.index[&edge.dst];
                if !reached[child] {
                    reached[child] = true;
                    queue.push_back(child);
                }
            }
        }

        let mut downstream = TxsGraph::default();
        let members: Vec<NodeIdx> = (0..self.nodes.len()).filter(|idx| reached[*idx]).collect();
        for idx in &members {
            let node = &self.nodes[*idx];
            downstream.add_node(node.tx.clone(), node.fee, node.height);
        }
        // every out-edge of a reached node ends in a reached node
        for idx in &members {
            for edge in self.out_edges_of(*idx) {
                downstream.add_edge(*edge);
            }
        }

        debug!(
            "downstream: {} of {} nodes reachable",
            downstream.node_count(),
            self.node_count()
        );
        Ok(downstream)
    }

    /// Whether `txid` claims an HTLC output: a single input whose witness
    /// script is a BOLT 3 HTLC script.
    pub fn is_htlc_claim_tx(&self, txid: &Txid) -> Result<bool> {
        Ok(self.htlc_witness_script(txid)?.is_some())
    }

    /// The witness script of `txid`'s single input, if it is an HTLC script.
    fn htlc_witness_script(&self, txid: &Txid) -> Result<Option<&str>> {
        let vin = &self.tx(txid)?.vin;
        // an htlc-claim tx has a single input, the commitment's htlc output
        let [input] = vin.as_slice() else {
            return Ok(None);
        };
        Ok(input.witness_script().filter(|script| is_htlc_script(script)))
    }

    /// Which branch of the HTLC script `txid` used, if it is an HTLC claim.
    pub fn htlc_claim_path(&self, txid: &Txid) -> Result<Option<HtlcClaimPath>> {
        let vin = &self.tx(txid)?.vin;
        Ok(match vin.as_slice() {
            [input] => claim_path(&input.txinwitness),
            _ => None,
        })
    }

    /// Minimal CLTV expiry among the HTLCs of `commitment_txid` that were
    /// claimed on chain, or 0 if no child claims an HTLC.
    pub fn get_minimal_htlc_expiration_height(&self, commitment_txid: &Txid) -> Result<BlockHeight> {
        let mut minimal: Option<BlockHeight> = None;
        for child in self.get_all_direct_children(commitment_txid)? {
            if let Some(script) = self.htlc_witness_script(&child)? {
                let expiry = get_htlc_expiration_height(script)?;
                minimal = Some(minimal.map_or(expiry, |m| m.min(expiry)));
            }
        }
        Ok(minimal.unwrap_or(0))
    }

    /// HTLC claims of the channel funded by `funding_txid` that used the
    /// timeout path.
    ///
    /// The funding output must have been spent by exactly one transaction, the
    /// commitment that went on chain.
    pub fn get_htlcs_claimed_by_timeout(&self, funding_txid: &Txid) -> Result<Vec<Txid>> {
        let children = self.get_all_direct_children(funding_txid)?;
        let [commitment_txid] = children.as_slice() else {
            return Err(Error::UnexpectedChildCount {
                txid: *funding_txid,
                count: children.len(),
            });
        };

        let mut claimed = Vec::new();
        for child in self.get_all_direct_children(commitment_txid)? {
            if self.htlc_claim_path(&child)? == Some(HtlcClaimPath::Timeout) {
                claimed.push(child);
            }
        }
        Ok(claimed)
    }
}

/// Outputs spent by more than one transaction in `graph`.
///
/// Only sources with at least one double-spent output appear, and each listed
/// output has at least two spenders.
pub fn find_double_spends(graph: &TxsGraph) -> DoubleSpends {
    let mut double_spends = DoubleSpends::new();

    for (idx, node) in graph.nodes.iter().enumerate() {
        let mut spenders: BTreeMap<u32, Vec<Txid>> = BTreeMap::new();
        for edge in graph.out_edges_of(idx) {
            spenders.entry(edge.index).or_default().push(edge.dst);
        }
        spenders.retain(|_, txids| txids.len() > 1);
        if !spenders.is_empty() {
            double_spends.insert(node.txid(), spenders);
        }
    }

    double_spends
}
