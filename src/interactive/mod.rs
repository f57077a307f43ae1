// Command handlers for the CLI. Each one prints its result to stdout.

pub mod analysis;
pub mod export;
pub mod script;
