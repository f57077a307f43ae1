pub mod fees;

pub use fees::*;
