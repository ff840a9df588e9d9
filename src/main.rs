mod cli;

use std::path::Path;
use std::process::ExitCode;

use avax_tester::constants::RUNNER_LOG_FILE;
use avax_tester::file_io::open_file_for_append;
use avax_tester::OutputError;
use avax_tester::Result;
use clap::Parser;
use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tracing::info;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

use crate::cli::CertsCommand;
use crate::cli::Cli;
use crate::cli::Command;
use crate::cli::LocalCommand;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run(args) => cli::run::execute(args).await,
        Command::Certs {
            command: CertsCommand::Create { dir_path, nodes },
        } => with_stdout_logs(|| cli::certs::create(&dir_path, nodes)),
        Command::Local {
            command:
                LocalCommand::Create {
                    nodes,
                    avalanchego_path,
                    db_dir_path,
                    certs_dir_path,
                    cmd_output_path,
                },
        } => with_stdout_logs(|| {
            cli::local::create(
                nodes,
                &avalanchego_path,
                &db_dir_path,
                &certs_dir_path,
                &cmd_output_path,
            )
        }),
        Command::Local {
            command: LocalCommand::Transfer { api_hosts, amount },
        } => match init_observability(None) {
            Ok(_guard) => cli::local::transfer(&api_hosts, amount).await,
            Err(e) => Err(e),
        },
        Command::Version => {
            println!(
                "{} {} ({} {})",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                env!("VERGEN_GIT_SHA"),
                env!("VERGEN_GIT_BRANCH")
            );
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn with_stdout_logs(f: impl FnOnce() -> Result<()>) -> Result<()> {
    let _guard = init_observability(None)?;
    f()
}

/// Resolves on SIGINT, SIGTERM or Ctrl+C.
pub async fn wait_for_signal() {
    let (mut sigint, mut sigterm) =
        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
            (Err(e), _) | (_, Err(e)) => {
                warn!("failed to install signal handlers, falling back to Ctrl+C: {}", e);
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("failed to listen for Ctrl+C: {}", e);
                }
                return;
            }
        };

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT detected.");
        },
        _ = sigterm.recv() => {
            info!("SIGTERM detected.");
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C detected.");
        },
    }
}

/// Stdout logging plus, when `log_dir` is given, a non-blocking `runner.log`
/// there. `RUST_LOG` overrides the default `info` level.
pub fn init_observability(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let stdout_layer = tracing_subscriber::fmt::layer().with_filter(env_filter());

    let Some(log_dir) = log_dir else {
        tracing_subscriber::registry().with(stdout_layer).init();
        return Ok(None);
    };

    let path = log_dir.join(RUNNER_LOG_FILE);
    let log_file = open_file_for_append(&path).map_err(|source| OutputError::Io {
        path: path.clone(),
        source,
    })?;
    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_filter(env_filter());

    tracing_subscriber::registry().with(stdout_layer).with(file_layer).init();
    info!("logging to {}", path.display());
    Ok(Some(guard))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
