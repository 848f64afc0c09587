use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::collector::{self, HttpFetcher, PageFetcher, PageOutcome};
use crate::db::{self, RecordStore};
use crate::diff::{self, SnapshotDiff};
use crate::error::PipelineError;
use crate::export;
use crate::model::{WorldRecord, CONFIGURATIONS};
use crate::notify::{DiscordNotifier, Notification, Notifier};
use crate::report;
use crate::settings::{RunConfig, TABLE};

/// Result of the persistence step, consumed by reporting and notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Success { upserted: usize },
    Skipped { message: String },
    Failed { message: String },
    DryRun { message: String },
}

impl PersistOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            PersistOutcome::Success { .. } => "success",
            PersistOutcome::Skipped { .. } => "skipped",
            PersistOutcome::Failed { .. } => "error",
            PersistOutcome::DryRun { .. } => "dry_run",
        }
    }

    pub fn upserted(&self) -> usize {
        match self {
            PersistOutcome::Success { upserted } => *upserted,
            _ => 0,
        }
    }

    pub fn message(&self) -> String {
        match self {
            PersistOutcome::Success { upserted } => format!("Successfully upserted {} records", upserted),
            PersistOutcome::Skipped { message }
            | PersistOutcome::Failed { message }
            | PersistOutcome::DryRun { message } => message.clone(),
        }
    }

    fn print(&self) {
        match self {
            PersistOutcome::Success { .. } | PersistOutcome::DryRun { .. } => {
                println!("✅ {}", self.message())
            }
            PersistOutcome::Skipped { .. } => println!("⚠️  {}", self.message()),
            PersistOutcome::Failed { .. } => println!("❌ {}", self.message()),
        }
    }
}

pub enum StoreState {
    Ready(Box<dyn RecordStore>),
    NotConfigured,
    Unavailable(String),
}

pub struct RunSummary {
    pub scraped: usize,
    pub diff: SnapshotDiff,
    pub persist: PersistOutcome,
    pub notified: bool,
}

impl RunSummary {
    /// One-line tally of the diff and the notification state.
    pub fn tally(&self) -> String {
        let counts = self.diff.counts();
        format!(
            "New: {} | Modified: {} | Unchanged: {} | Notified: {}",
            counts.new,
            counts.modified,
            counts.unchanged,
            if self.notified { "yes" } else { "no" }
        )
    }
}

pub struct Pipeline {
    run: RunConfig,
    fetcher: Box<dyn PageFetcher>,
    store: StoreState,
    notifier: Option<Box<dyn Notifier>>,
}

impl Pipeline {
    pub fn new(
        run: RunConfig,
        fetcher: Box<dyn PageFetcher>,
        store: StoreState,
        notifier: Option<Box<dyn Notifier>>,
    ) -> Self {
        Self {
            run,
            fetcher,
            store,
            notifier,
        }
    }

    /// Wire up the real HTTP fetcher, store and webhook from settings.
    pub fn from_config(run: RunConfig) -> Result<Self, PipelineError> {
        let fetcher = HttpFetcher::new(&run.settings.iwf_base_url).map_err(PipelineError::Extraction)?;

        let store = match db::open_store(&run.settings) {
            Ok(Some(store)) => StoreState::Ready(store),
            Ok(None) => StoreState::NotConfigured,
            Err(e) => {
                warn!("store unavailable: {:#}", e);
                StoreState::Unavailable(format!("{:#}", e))
            }
        };

        let notifier = run
            .settings
            .discord_webhook_url
            .as_deref()
            .map(|url| Box::new(DiscordNotifier::new(url)) as Box<dyn Notifier>);

        Ok(Self::new(run, Box::new(fetcher), store, notifier))
    }

    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        let rule = "=".repeat(60);
        println!("{rule}");
        println!("IWF World Records Scraper Pipeline");
        if self.run.dry_run {
            println!("🔍 DRY RUN MODE ENABLED");
        }
        println!("{rule}");

        let total_steps = if self.run.dry_run { 2 } else { 4 };

        println!("\n[1/{}] Scraping world records...", total_steps);
        let records = self.scrape().await?;
        println!("✅ Scraped {} records", records.len());

        let summary = if self.run.dry_run {
            self.dry_run(&records).await
        } else {
            self.commit(&records).await
        };

        println!("\n{rule}");
        println!("Pipeline Complete!");
        println!("{rule}");
        println!("Records scraped: {}", summary.scraped);
        println!("{}", summary.tally());
        if !self.run.dry_run {
            println!("Store status: {}", summary.persist.status());
        }
        println!("{rule}");
        info!(
            scraped = summary.scraped,
            status = summary.persist.status(),
            notified = summary.notified,
            "run finished"
        );

        Ok(summary)
    }

    async fn scrape(&self) -> Result<Vec<WorldRecord>, PipelineError> {
        let batch =
            collector::collect_all(self.fetcher.as_ref(), &CONFIGURATIONS, self.run.request_delay()).await;
        for (config, outcome) in &batch.pages {
            match outcome {
                PageOutcome::Ok(n) => debug!(%config, records = n, "page ok"),
                PageOutcome::Failed(e) => debug!(%config, error = %e, "page skipped"),
            }
        }
        if batch.failed() > 0 {
            warn!(failed = batch.failed(), "some pages could not be scraped");
        }
        if batch.records.is_empty() {
            error!("no records extracted from any page");
            return Err(PipelineError::NoRecords);
        }
        Ok(batch.records)
    }

    async fn dry_run(&self, records: &[WorldRecord]) -> RunSummary {
        println!("\n[2/2] Comparing with stored snapshot...");
        let prior = match &self.store {
            StoreState::Ready(store) => self.read_prior(store.as_ref()).await,
            StoreState::NotConfigured => {
                println!("⚠️  Store not configured; comparing against an empty snapshot");
                Vec::new()
            }
            StoreState::Unavailable(e) => {
                println!("⚠️  Store unavailable ({}); comparing against an empty snapshot", e);
                Vec::new()
            }
        };

        let diff = diff::diff(records, &prior);
        print!("{}", report::DryRunSummary::new(records, &diff));

        let counts = diff.counts();
        let outcome = PersistOutcome::DryRun {
            message: format!(
                "DRY RUN: Would upsert {} records ({} new, {} modified)",
                records.len(),
                counts.new,
                counts.modified
            ),
        };
        outcome.print();

        RunSummary {
            scraped: records.len(),
            diff,
            persist: outcome,
            notified: false,
        }
    }

    async fn commit(&self, records: &[WorldRecord]) -> RunSummary {
        println!("\n[2/4] Saving to CSV...");
        let path = &self.run.settings.world_records_csv;
        match export::save_csv(path, records) {
            Ok(()) => println!("✅ Saved {} records to {}", records.len(), path.display()),
            Err(e) => {
                warn!("csv export failed: {:#}", e);
                println!("⚠️  Error saving CSV: {:#}", e);
            }
        }

        println!("\n[3/4] Upserting to store...");
        let (diff, outcome) = self.persist(records).await;
        outcome.print();

        println!("\n[4/4] Sending notification...");
        let notified = self.notify(records.len(), &outcome).await;

        RunSummary {
            scraped: records.len(),
            diff,
            persist: outcome,
            notified,
        }
    }

    async fn read_prior(&self, store: &dyn RecordStore) -> Vec<WorldRecord> {
        match store.read_all(TABLE).await {
            Ok(rows) => {
                info!(store = store.name(), rows = rows.len(), "loaded stored snapshot");
                rows
            }
            Err(e) => {
                warn!("could not fetch existing records: {:#}", e);
                println!("⚠️  Could not fetch existing records: {:#}", e);
                Vec::new()
            }
        }
    }

    async fn persist(&self, records: &[WorldRecord]) -> (SnapshotDiff, PersistOutcome) {
        let store = match &self.store {
            StoreState::Ready(store) => store.as_ref(),
            StoreState::NotConfigured => {
                let outcome = PersistOutcome::Skipped {
                    message: "Store credentials not configured".into(),
                };
                return (diff::diff(records, &[]), outcome);
            }
            StoreState::Unavailable(e) => {
                let outcome = PersistOutcome::Skipped {
                    message: format!("Store unavailable: {}", e),
                };
                return (diff::diff(records, &[]), outcome);
            }
        };

        let prior = self.read_prior(store).await;
        let diff = diff::diff(records, &prior);
        let counts = diff.counts();
        info!(
            new = counts.new,
            modified = counts.modified,
            unchanged = counts.unchanged,
            "snapshot compared"
        );

        let outcome = match store.replace_all(TABLE, records).await {
            Ok(upserted) => PersistOutcome::Success { upserted },
            Err(e) => {
                error!("replace failed: {:#}", e);
                PersistOutcome::Failed {
                    message: format!("{} error: {:#}", store.name(), e),
                }
            }
        };
        (diff, outcome)
    }

    async fn notify(&self, scraped: usize, outcome: &PersistOutcome) -> bool {
        let Some(notifier) = &self.notifier else {
            warn!("notification webhook not configured");
            println!("⚠️  Discord webhook not configured");
            return false;
        };

        let notification = Notification::from_outcome(scraped, outcome, Utc::now());
        match notifier.send(&notification).await {
            Ok(()) => {
                println!("✅ Discord notification sent");
                true
            }
            Err(e) => {
                warn!("notification failed: {:#}", e);
                println!("❌ Discord notification failed: {:#}", e);
                false
            }
        }
    }
}

/// 0 for any completed run, 1 when extraction failed outright.
pub fn exit_status(result: &Result<RunSummary, PipelineError>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

// ── Tests ──
