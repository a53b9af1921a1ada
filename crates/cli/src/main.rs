//! ol - command-line client for OpenList/AList file storage servers

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_code;
mod output;

use commands::Cli;

/// Log to stderr so stdout stays clean for `--json`.
///
/// `--debug` overrides `RUST_LOG`; otherwise `RUST_LOG` applies, falling
/// back to warnings only.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.debug);

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "Starting ol");

    let code = commands::execute(cli).await;
    if !code.is_success() {
        std::process::exit(code.code());
    }
}
