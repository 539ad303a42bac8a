use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use version_chain::cli::{Cli, run};
use version_chain::config::{DEFAULT_LOG_FILTER, LOG_ENV, LOG_FORMAT_ENV};

fn init_logging() -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false);

    if std::env::var(LOG_FORMAT_ENV).is_ok_and(|format| format == "json") {
        builder.json().init();
    } else {
        builder.init();
    }
    guard
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging();

    for line in run(&cli)? {
        println!("{}", line);
    }
    Ok(())
}
