//! Transaction-graph forensics for Lightning channel-closure simulations.
//!
//! Loads the block and transaction dumps of a regtest run, builds the graph
//! of spend relationships between transactions and classifies HTLC claims by
//! matching their witness scripts against the BOLT 3 template.

pub mod config;
pub mod error;
pub mod graph;
pub mod internal;
pub mod scripts;
pub mod transactions;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use graph::{find_double_spends, DoubleSpends, TxsGraph};
pub use internal::datadir::{load_blocks, load_txs, ChainDump, DumpLayout};
pub use internal::dot::write_dot;
pub use internal::simulation::extract_funding_txids;
pub use scripts::{decode_script, get_htlc_expiration_height, is_htlc_script, Token};
pub use transactions::fees::*;
pub use types::*;
