//! Command line surface of the `avax-tester` binary.

pub mod certs;
pub mod local;
pub mod run;

use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;

#[derive(Parser, Debug)]
#[command(name = "avax-tester")]
#[command(about = "Local multi-node cluster runner", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Starts a local cluster, provisions it and keeps it running until interrupted
    Run(RunArgs),

    /// Staking certificate helpers
    Certs {
        #[command(subcommand)]
        command: CertsCommand,
    },

    /// Helpers for hand-run local clusters
    Local {
        #[command(subcommand)]
        command: LocalCommand,
    },

    /// Prints the version and the git commit it was built from
    Version,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Node binary
    #[arg(long)]
    pub avalanchego_path: Option<PathBuf>,

    #[arg(long)]
    pub vm_name: Option<String>,

    /// VM id of the custom blockchain [default: tGas3T58KzdjLHhBDMnH2TvrddhqTji5iZAMZ3RXs2NLpSnhH]
    #[arg(long)]
    pub vm_id: Option<String>,

    /// Genesis file of the custom blockchain; no subnet is created without it
    #[arg(long)]
    pub vm_genesis_path: Option<PathBuf>,

    /// Where the cluster record is written
    #[arg(long)]
    pub output_path: Option<PathBuf>,

    /// Number of nodes
    #[arg(long)]
    pub nodes: Option<usize>,

    /// Log directory (default: a fresh temp dir)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Extra configuration file layered over `CONFIG_PATH` and the defaults
    #[arg(long)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum CertsCommand {
    /// Writes one staking key pair per node
    Create {
        #[arg(long, default_value = "/tmp/avax-tester/certs")]
        dir_path: PathBuf,

        #[arg(long, default_value_t = 5)]
        nodes: usize,
    },
}

#[derive(Subcommand, Debug)]
pub enum LocalCommand {
    /// Writes staking certs and a bash script that starts every node
    Create {
        #[arg(long, default_value_t = 5)]
        nodes: usize,

        #[arg(long, default_value = "avalanchego")]
        avalanchego_path: PathBuf,

        #[arg(long, default_value = "/tmp/avax-tester/db")]
        db_dir_path: PathBuf,

        #[arg(long, default_value = "/tmp/avax-tester/certs")]
        certs_dir_path: PathBuf,

        #[arg(long, default_value = "/tmp/avax-tester/run.sh")]
        cmd_output_path: PathBuf,
    },

    /// Smoke test against running nodes: import the genesis key and transfer
    Transfer {
        /// Node URIs, comma separated
        #[arg(long, value_delimiter = ',', default_value = "http://127.0.0.1:9650")]
        api_hosts: Vec<String>,

        /// Amount sent to a fresh address on every host, in nAVAX
        #[arg(long, default_value_t = 1_000_000_000)]
        amount: u64,
    },
}
