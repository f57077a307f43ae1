use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;
use crate::internal::datadir::DumpLayout;

pub const DEFAULT_CONFIG_FILE: &str = "htlc-forensics.toml";
/// e.g. `HTLC_FORENSICS_DATADIR=/tmp/sim/datadir`
pub const ENV_PREFIX: &str = "HTLC_FORENSICS";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub datadir: Option<PathBuf>,
    #[serde(default)]
    pub simulation_outfile: Option<PathBuf>,
    #[serde(default = "default_block_prefix")]
    pub block_prefix: String,
    #[serde(default = "default_tx_prefix")]
    pub tx_prefix: String,
}

fn default_block_prefix() -> String {
    DumpLayout::default().block_prefix
}

fn default_tx_prefix() -> String {
    DumpLayout::default().tx_prefix
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            datadir: None,
            simulation_outfile: None,
            block_prefix: default_block_prefix(),
            tx_prefix: default_tx_prefix(),
        }
    }
}

impl Settings {
    /// Settings from `./htlc-forensics.toml` (optional) and the environment.
    pub fn new() -> Result<Self> {
        Self::from_file(DEFAULT_CONFIG_FILE)
    }

    /// Settings from `path` (optional) overlaid with `HTLC_FORENSICS_*` variables.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_string_lossy().into_owned();
        let builder = ::config::Config::builder()
            .add_source(::config::File::with_name(&path).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );

        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn layout(&self) -> DumpLayout {
        DumpLayout {
            block_prefix: self.block_prefix.clone(),
            tx_prefix: self.tx_prefix.clone(),
        }
    }
}
