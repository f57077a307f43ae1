use std::collections::BTreeMap;
use std::io::{self, Write};

use bitcoin::Txid;

use crate::graph::TxsGraph;
use crate::types::{BlockHeight, TxNode};

/// Last four hex chars of the txid, enough to tell apart the txs of a simulation.
pub fn short_txid(txid: &Txid) -> String {
    let s = txid.to_string();
    s[s.len() - 4..].to_string()
}

/// Short txid plus the fee in satoshis.
pub fn label_with_fee(txid: &Txid, node: &TxNode) -> String {
    format!("id={}; fee={}", short_txid(txid), node.fee.to_sat())
}

/// Writes `graph` in graphviz dot format.
///
/// Transactions confirmed at the same height share a rank, next to a chain of
/// invisible height nodes that keeps the ranks ordered. Edges are labelled
/// with the spent value in satoshis.
pub fn write_dot<W, F>(graph: &TxsGraph, out: &mut W, label: F) -> io::Result<()>
where
    W: Write,
    F: Fn(&Txid, &TxNode) -> String,
{
    let quoted = |txid: &Txid| -> String {
        let text = graph
            .node(txid)
            .map_or_else(|| short_txid(txid), |node| label(txid, node));
        format!("\"{}\"", text)
    };

    writeln!(out, "digraph shells {{")?;
    writeln!(out, "node [fontsize=20, shape = box];")?;

    let mut by_height: BTreeMap<BlockHeight, Vec<Txid>> = BTreeMap::new();
    for node in graph.nodes() {
        if let Some(height) = node.height {
            by_height.entry(height).or_default().push(node.txid());
        }
    }

    for (height, txids) in &by_height {
        let members: Vec<String> = txids.iter().map(|txid| quoted(txid)).collect();
        writeln!(out, "{{ rank = same; {} \"{}\"; }}", members.join(" "), height)?;
    }

    for edge in graph.edges() {
        writeln!(
            out,
            "{} -> {} [ label = \"{}\" ];",
            quoted(&edge.src),
            quoted(&edge.dst),
            edge.value.to_sat()
        )?;
    }

    if !by_height.is_empty() {
        writeln!(out, "edge [style=invis];")?;
        let heights: Vec<String> = by_height.keys().map(|h| h.to_string()).collect();
        writeln!(out, "{};", heights.join(" -> "))?;
    }
    writeln!(out, "}}")
}
