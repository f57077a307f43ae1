pub mod queries;
pub mod txs_graph;

pub use queries::{find_double_spends, DoubleSpends};
pub use txs_graph::TxsGraph;
