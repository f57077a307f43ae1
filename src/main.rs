use std::path::PathBuf;

use bitcoin::Txid;
use clap::{Args, Parser, Subcommand};
use log::error;

use htlc_forensics::config::Settings;
use htlc_forensics::{extract_funding_txids, Error, Result, TxsGraph};

// Interactive CLI modules
mod interactive;

// ============================================================================
// CLI DEFINITION
// ============================================================================

/// Main CLI structure
#[derive(Parser)]
#[command(name = "htlc-forensics")]
#[command(version = "0.1")]
#[command(about = "Analyze the transaction graph of a Lightning attack simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where to read the simulation dump from. Falls back to the settings file.
#[derive(Args)]
struct DataArgs {
    #[arg(short = 'd', long, help = "Directory with block_*/tx_* json dumps")]
    datadir: Option<PathBuf>,
}

/// Transactions to start from: explicit txids, or the funding txids of a simulation log.
#[derive(Args)]
struct SourceArgs {
    #[arg(short = 't', long = "txid", help = "Source txid (repeatable)")]
    txids: Vec<Txid>,
    #[arg(short = 'o', long, help = "Simulation output to extract funding txids from")]
    simulation_outfile: Option<PathBuf>,
}

/// CLI Subcommands
#[derive(Subcommand)]
enum Commands {
    /// Disassemble a hex script and check it against the HTLC template
    DecodeScript {
        #[arg(short = 's', long, help = "Script (hex)")]
        script: String,
    },
    /// Print whether a hex script is a BOLT 3 HTLC script
    IsHtlc {
        #[arg(short = 's', long, help = "Script (hex)")]
        script: String,
    },
    /// Count transactions, spends, RBF signals, HTLC claims and double spends
    Summary {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Print the subgraph reachable from the given transactions
    Downstream {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        sources: SourceArgs,
    },
    /// Print every output spent by more than one transaction
    DoubleSpends {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Minimal expiry height of the HTLCs claimed from a commitment transaction
    HtlcExpiry {
        #[command(flatten)]
        data: DataArgs,
        #[arg(short = 'c', long, help = "Commitment Tx ID")]
        commitment_txid: Txid,
    },
    /// Count the HTLCs claimed through the timeout path, per channel
    TimeoutClaims {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        sources: SourceArgs,
    },
    /// Export the (downstream) transaction graph in graphviz dot format
    Dot {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        sources: SourceArgs,
        #[arg(short = 'f', long, help = "Output dot file")]
        dotfile: PathBuf,
        #[arg(long, help = "Include the fee in node labels")]
        with_fee: bool,
    },
}

fn load_graph(settings: &Settings, data: &DataArgs) -> Result<TxsGraph> {
    let datadir = data
        .datadir
        .clone()
        .or_else(|| settings.datadir.clone())
        .ok_or_else(|| Error::Config(config::ConfigError::NotFound("datadir".to_string())))?;
    TxsGraph::from_datadir_with_layout(datadir, &settings.layout())
}

fn resolve_sources(settings: &Settings, sources: &SourceArgs) -> Result<Vec<Txid>> {
    let mut txids = sources.txids.clone();
    let outfile = sources
        .simulation_outfile
        .clone()
        .or_else(|| settings.simulation_outfile.clone());
    if let Some(outfile) = outfile {
        txids.extend(extract_funding_txids(outfile)?);
    }
    Ok(txids)
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::new()?;

    match &cli.command {
        Commands::DecodeScript { script } => interactive::script::run_decode(script),
        Commands::IsHtlc { script } => interactive::script::run_is_htlc(script),
        Commands::Summary { data } => {
            interactive::analysis::run_summary(&load_graph(&settings, data)?)
        }
        Commands::Downstream { data, sources } => {
            let graph = load_graph(&settings, data)?;
            interactive::analysis::run_downstream(&graph, &resolve_sources(&settings, sources)?)
        }
        Commands::DoubleSpends { data } => {
            interactive::analysis::run_double_spends(&load_graph(&settings, data)?)
        }
        Commands::HtlcExpiry { data, commitment_txid } => {
            let graph = load_graph(&settings, data)?;
            interactive::analysis::run_htlc_expiry(&graph, commitment_txid)
        }
        Commands::TimeoutClaims { data, sources } => {
            let graph = load_graph(&settings, data)?;
            interactive::analysis::run_timeout_claims(&graph, &resolve_sources(&settings, sources)?)
        }
        Commands::Dot { data, sources, dotfile, with_fee } => {
            let graph = load_graph(&settings, data)?;
            let sources = resolve_sources(&settings, sources)?;
            interactive::export::run_dot(&graph, &sources, dotfile, *with_fee)
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}
