//! # shopline Main Entry Point
//!
//! Runs one storefront command from the command line.

use anyhow::Result;
use shopline::cmd_args::CommandLineArgs;
use shopline::config::LOG_LEVEL_ENV_VAR;
use tracing_subscriber::{fmt::time::ChronoLocal, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let args = CommandLineArgs::parse();
    init_tracing_subscriber(args.verbose());

    tracing::debug!("command: {:?}", args.command());
    shopline::app::run(args).await
}

/// Quiet directives for the HTTP stack
const QUIET_TARGETS: [&str; 8] = [
    "reqwest",
    "hyper",
    "hyper_util",
    "tokio",
    "rustls",
    "tokio_rustls",
    "cookie_store",
    "tracing_subscriber",
];

fn init_tracing_subscriber(verbose: bool) {
    let mut filter = EnvFilter::from_env(LOG_LEVEL_ENV_VAR);
    if verbose {
        if let Ok(directive) = format!("{}=debug", env!("CARGO_CRATE_NAME")).parse() {
            filter = filter.add_directive(directive);
        }
    }
    for target in QUIET_TARGETS {
        if let Ok(directive) = format!("{target}=warn").parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_timer(ChronoLocal::rfc_3339())
        .init();
}
