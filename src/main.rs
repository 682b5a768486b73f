mod app;
mod cli;
mod config;
mod error;
mod export;
mod model;
mod providers;
mod sync;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use app::RunOutcome;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Optional; variables already in the environment win.
    dotenv::dotenv().ok();

    let config = config::load_config(cli::Cli::parse())?;
    init_tracing(config.verbose);

    match app::run(&config).await? {
        RunOutcome::NoIssues => println!("No issues found"),
        RunOutcome::Exported(path) => println!("Export written: {}", path.display()),
        RunOutcome::Synced(stats) => {
            println!("Sync complete:");
            println!("  created: {}", stats.created);
            println!("  updated: {}", stats.updated);
            println!("  skipped: {}", stats.skipped);
            if stats.failed > 0 {
                println!("  failed:  {}", stats.failed);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,gitlab_tasks={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
