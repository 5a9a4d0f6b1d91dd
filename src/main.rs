use clap::Parser;
use dotenv::dotenv;
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;
use std::io::{self, Write};
use std::process::ExitCode;
use tokio::time::Duration;
use tracing::{error, info};

use downstream_dependents_lib::{write_json, write_repositories, Args, DependentsSearcher, SearchConfig};

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout only carries results.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    dotenv().ok();

    let args = Args::parse();
    if let Err(e) = args.validate() {
        e.exit();
    }

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("failed to fetch dependents: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = SearchConfig::new(args.resolve_token()).with_manifest(args.manifest.clone());
    let searcher = DependentsSearcher::new(config)?;

    info!("Searching dependents of '{}'", args.module);
    let pb = spinner(format!("Searching GitHub for '{}'", args.module));
    let result = searcher.fetch(&args.module, args.limit).await;
    pb.finish_and_clear();
    let repos = result?;

    let mut stdout = io::stdout().lock();
    if args.json {
        write_json(&mut stdout, &repos)?;
    } else {
        write_repositories(&mut stdout, &args.module, &repos)?;
    }
    stdout.flush()?;

    Ok(())
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
