use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use bitcoin::Txid;
use log::info;

use htlc_forensics::internal::dot::{label_with_fee, short_txid, write_dot};
use htlc_forensics::{Result, TxsGraph};

/// Writes the downstream of `sources` (the whole graph if empty) to `dotfile`.
pub fn run_dot(graph: &TxsGraph, sources: &[Txid], dotfile: &Path, with_fee: bool) -> Result<()> {
    let subgraph = if sources.is_empty() {
        graph.clone()
    } else {
        graph.get_downstream(sources)?
    };

    let mut out = BufWriter::new(File::create(dotfile)?);
    if with_fee {
        write_dot(&subgraph, &mut out, label_with_fee)?;
    } else {
        write_dot(&subgraph, &mut out, |txid, _| short_txid(txid))?;
    }
    out.flush()?;

    info!(
        "wrote {} transactions to {}",
        subgraph.node_count(),
        dotfile.display()
    );
    Ok(())
}
