mod collector;
mod db;
mod diff;
mod error;
mod export;
mod model;
mod notify;
mod parser;
mod pipeline;
mod report;
mod settings;

use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use error::PipelineError;
use pipeline::Pipeline;
use settings::{RunConfig, Settings};

#[derive(Parser)]
#[command(
    name = "world_records",
    about = "IWF world records scraper: scrape, store, and notify about world records"
)]
struct Cli {
    /// Scrape and compare with the stored snapshot, but write nothing and send no notification
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("invalid settings, using defaults: {:#}", e);
            println!("⚠️  Could not read settings ({:#}); using defaults", e);
            Settings::default()
        }
    };
    let run = RunConfig::new(cli.dry_run, settings);

    let result = match Pipeline::from_config(run) {
        Ok(pipeline) => pipeline.run().await,
        Err(e) => Err(e),
    };

    match &result {
        Err(PipelineError::NoRecords) => println!("❌ No records found!"),
        Err(e) => println!("❌ {}", e),
        Ok(_) => {}
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    ExitCode::from(pipeline::exit_status(&result))
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
