mod anchors;
mod error;
mod fetch;
mod harvester;
mod output;
mod parser;
mod pipeline;
mod schema;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;

use fetch::HttpFetcher;
use pipeline::{HarvestConfig, DEFAULT_DOCS_BASE_URL, DEFAULT_OUTPUT_PATH, DEFAULT_SCHEMA_PATH};

#[derive(Parser)]
#[command(
    name = "c7n_docs_harvester",
    about = "Collect Cloud Custodian action/filter documentation into one JSON file"
)]
struct Cli {
    /// Policy schema to read resources and common entries from
    #[arg(long, default_value = DEFAULT_SCHEMA_PATH)]
    schema: PathBuf,
    /// Where to write the merged documentation
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,
    /// Base URL of the resource reference pages
    #[arg(long, default_value = DEFAULT_DOCS_BASE_URL)]
    docs_base_url: String,
    /// Concurrent page fetches (default: available CPUs)
    #[arg(short = 'j', long)]
    workers: Option<usize>,
    /// Fail the whole run if any resource page cannot be harvested
    #[arg(long)]
    strict: bool,
    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

impl Cli {
    fn into_config(self) -> HarvestConfig {
        HarvestConfig {
            schema_path: self.schema,
            output_path: self.output,
            docs_base_url: self.docs_base_url,
            workers: self.workers.unwrap_or_else(pipeline::default_workers).max(1),
            strict: self.strict,
            progress: !self.no_progress,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let config = Cli::parse().into_config();

    let stats = pipeline::run(&config, Arc::new(HttpFetcher::new())).await?;

    println!(
        "Harvested {} resources ({} ok, {} failed), {} documented entries.",
        stats.resources,
        stats.ok,
        stats.failed.len(),
        stats.entries
    );
    for (resource_id, reason) in &stats.failed {
        println!("  failed: {:<28} {}", resource_id, reason);
    }
    println!("output written to file: {}", stats.output_path.display());

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
