use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::fetch::PageFetcher;
use crate::harvester::Harvester;
use crate::output::{Documentation, ResourceDocs};
use crate::schema::{ResourceDef, Schema};

pub const DEFAULT_DOCS_BASE_URL: &str = "https://cloudcustodian.io/docs/aws/resources";
pub const DEFAULT_SCHEMA_PATH: &str = "public/c7n-schema.json";
pub const DEFAULT_OUTPUT_PATH: &str = "public/c7n-docs.json";

#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub schema_path: PathBuf,
    pub output_path: PathBuf,
    pub docs_base_url: String,
    /// Concurrent resource fetches.
    pub workers: usize,
    /// Abort without writing output if any resource fails.
    pub strict: bool,
    pub progress: bool,
}

pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Stats returned after the output file is written.
#[derive(Debug)]
pub struct HarvestStats {
    pub resources: usize,
    pub ok: usize,
    /// Resource ids whose page could not be harvested, with the reason.
    pub failed: Vec<(String, String)>,
    pub entries: usize,
    pub output_path: PathBuf,
}

/// Load the schema, harvest every resource page concurrently, then the two
/// common pages, and write the merged document.
pub async fn run<F>(config: &HarvestConfig, fetcher: Arc<F>) -> Result<HarvestStats>
where
    F: PageFetcher + 'static,
{
    let schema = Schema::load(&config.schema_path)?;
    let harvester = Harvester::new(fetcher, &config.docs_base_url);

    let resources = schema.resources();
    let total = resources.len();
    info!("Harvesting {} resources with {} workers", total, config.workers);

    let results = harvest_resources(&harvester, resources, config).await?;

    let mut docs = Documentation::new();
    let mut failed = Vec::new();
    for (resource_id, result) in results {
        match result {
            Ok(record) => {
                if !docs.insert_resource(resource_id.clone(), record) {
                    warn!("Skipping resource '{}': id collides with a common group key", resource_id);
                    failed.push((resource_id, "reserved output key".to_string()));
                }
            }
            Err(reason) => {
                warn!("Omitting resource '{}': {}", resource_id, reason);
                failed.push((resource_id, reason));
            }
        }
    }
    failed.sort();

    if config.strict && !failed.is_empty() {
        let (resource_id, reason) = &failed[0];
        bail!(
            "{} of {} resources failed (first: '{}': {}); no output written",
            failed.len(),
            total,
            resource_id,
            reason
        );
    }

    let common = harvester
        .harvest_common(&schema.definitions.actions, &schema.definitions.filters)
        .await
        .context("Failed to harvest common actions/filters")?;
    docs.set_common(common);

    docs.write(&config.output_path)?;
    info!("output written to file: {}", config.output_path.display());

    Ok(HarvestStats {
        resources: total,
        ok: docs.resources().len(),
        failed,
        entries: docs.entry_count(),
        output_path: config.output_path.clone(),
    })
}

type ResourceResult = (String, std::result::Result<ResourceDocs, String>);

/// Fan out one task per resource, gated to `config.workers` in flight, and
/// wait for every task to finish. A panicking task counts as a failed
/// resource.
async fn harvest_resources<F>(
    harvester: &Harvester<F>,
    resources: &[(String, ResourceDef)],
    config: &HarvestConfig,
) -> Result<Vec<ResourceResult>>
where
    F: PageFetcher + 'static,
{
    let semaphore = Arc::new(Semaphore::new(config.workers.max(1)));
    let total = resources.len();

    let pb = if config.progress {
        ProgressBar::new(total as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    // Task id → resource id, so a panicked task can still be attributed
    let mut owners = HashMap::with_capacity(total);
    let mut tasks = JoinSet::new();

    for (resource_id, def) in resources.iter().cloned() {
        let harvester = harvester.clone();
        let sem = Arc::clone(&semaphore);
        let task_id = resource_id.clone();

        let handle = tasks.spawn(async move {
            let Ok(_permit) = sem.acquire_owned().await else {
                return Err("worker pool closed".to_string());
            };
            harvester
                .harvest_resource(&task_id, &def)
                .await
                .map_err(|e| e.to_string())
        });
        owners.insert(handle.id(), resource_id);
    }

    let mut results = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next_with_id().await {
        let (task, outcome) = match joined {
            Ok((task, outcome)) => (task, outcome),
            Err(e) => (e.id(), Err(format!("task aborted: {}", e))),
        };
        let Some(resource_id) = owners.remove(&task) else {
            continue;
        };
        if let Err(reason) = &outcome {
            pb.println(format!("failed: {} ({})", resource_id, reason));
        }
        results.push((resource_id, outcome));
        pb.inc(1);
    }
    pb.finish_and_clear();

    if results.len() != total {
        bail!("only {} of {} resource tasks reported back", results.len(), total);
    }
    Ok(results)
}
