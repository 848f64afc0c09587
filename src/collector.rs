use std::collections::HashSet;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::model::{QueryConfig, WorldRecord};
use crate::parser;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Source of raw page markup for one query configuration.
#[async_trait(?Send)]
pub trait PageFetcher {
    async fn fetch(&self, config: &QueryConfig) -> Result<String>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait(?Send)]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, config: &QueryConfig) -> Result<String> {
        let url = config.url(&self.base_url);
        info!("Fetching: {}", url);
        self.client
            .get(&url)
            .send()
            .await?
            .error_for_status()
            .with_context(|| format!("Bad response for {}", url))?
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", url))
    }
}

/// What one configuration contributed to the batch.
#[derive(Debug)]
pub enum PageOutcome {
    Ok(usize),
    Failed(String),
}

pub struct BatchReport {
    pub records: Vec<WorldRecord>,
    pub pages: Vec<(QueryConfig, PageOutcome)>,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.pages
            .iter()
            .filter(|(_, o)| matches!(o, PageOutcome::Failed(_)))
            .count()
    }
}

/// Fetch and parse every configuration in order, one at a time.
///
/// A failing page is logged and contributes nothing; the batch itself never
/// fails because of one page. `delay` is slept between successive fetches.
pub async fn collect_all<F: PageFetcher + ?Sized>(
    fetcher: &F,
    configs: &[QueryConfig],
    delay: Duration,
) -> BatchReport {
    let pb = ProgressBar::new(configs.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}") {
        pb.set_style(style.progress_chars("=> "));
    }

    let mut seen = HashSet::new();
    let mut records = Vec::new();
    let mut pages = Vec::with_capacity(configs.len());

    for (i, config) in configs.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        pb.set_message(config.to_string());
        pb.suspend(|| println!("\nScraping {}...", config));

        match fetcher.fetch(config).await {
            Ok(html) => {
                let mut added = 0;
                for record in parser::parse_page(&html, config) {
                    if !seen.insert(record.key()) {
                        warn!(weight_class = %record.weight_class, "duplicate record across pages, dropped");
                        continue;
                    }
                    pb.suspend(|| {
                        println!(
                            "  Found: {} {} {} (S:{}, C&J:{}, T:{})",
                            record.age_category,
                            record.gender,
                            record.weight_class,
                            show(record.snatch_record),
                            show(record.cj_record),
                            show(record.total_record)
                        )
                    });
                    records.push(record);
                    added += 1;
                }
                info!(%config, records = added, "page parsed");
                pages.push((*config, PageOutcome::Ok(added)));
            }
            Err(e) => {
                warn!(%config, "page failed: {:#}", e);
                pb.suspend(|| println!("❌ Error scraping {}: {:#}", config, e));
                pages.push((*config, PageOutcome::Failed(format!("{:#}", e))));
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    BatchReport { records, pages }
}

fn show(v: Option<u32>) -> String {
    v.map(|n| n.to_string()).unwrap_or_else(|| "None".into())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CONFIGURATIONS;
    use std::cell::RefCell;

    /// Serves a one-class page per configuration, failing the listed indexes.
    struct FakeFetcher {
        fail: Vec<usize>,
        calls: RefCell<Vec<QueryConfig>>,
    }

    impl FakeFetcher {
        fn new(fail: Vec<usize>) -> Self {
            Self {
                fail,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl PageFetcher for FakeFetcher {
        async fn fetch(&self, config: &QueryConfig) -> Result<String> {
            let idx = self.calls.borrow().len();
            self.calls.borrow_mut().push(*config);
            if self.fail.contains(&idx) {
                anyhow::bail!("connection reset");
            }
            Ok(format!(
                r#"<div class="results__title"><h2>{} kg</h2></div>
                   <div class="cards">Snatch Record: {} kg C&amp;J Record: 150 kg Total Record: 260 kg</div>"#,
                60 + idx,
                100 + idx
            ))
        }
    }

    #[tokio::test]
    async fn one_failing_page_is_isolated() {
        let fetcher = FakeFetcher::new(vec![2]);
        let report = collect_all(&fetcher, &CONFIGURATIONS, Duration::ZERO).await;

        assert_eq!(fetcher.calls.borrow().len(), 6);
        assert_eq!(report.records.len(), 5);
        assert_eq!(report.failed(), 1);
        assert!(matches!(report.pages[2].1, PageOutcome::Failed(_)));
        assert!(report
            .records
            .iter()
            .all(|r| r.age_category != CONFIGURATIONS[2].age_category
                || r.gender != CONFIGURATIONS[2].gender));
    }

    #[tokio::test]
    async fn fetches_in_fixed_order() {
        let fetcher = FakeFetcher::new(vec![]);
        collect_all(&fetcher, &CONFIGURATIONS, Duration::ZERO).await;
        assert_eq!(*fetcher.calls.borrow(), CONFIGURATIONS.to_vec());
    }

    #[tokio::test]
    async fn all_failing_yields_empty_batch() {
        let fetcher = FakeFetcher::new((0..6).collect());
        let report = collect_all(&fetcher, &CONFIGURATIONS, Duration::ZERO).await;
        assert!(report.records.is_empty());
        assert_eq!(report.failed(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_only_between_pages() {
        let fetcher = FakeFetcher::new(vec![]);
        let start = tokio::time::Instant::now();
        collect_all(&fetcher, &CONFIGURATIONS[..3], Duration::from_secs(1)).await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3));
    }

    /// Serves the same page for every configuration.
    struct SamePage;

    #[async_trait(?Send)]
    impl PageFetcher for SamePage {
        async fn fetch(&self, _config: &QueryConfig) -> Result<String> {
            Ok(r#"<div class="results__title"><h2>61 kg</h2></div>
                  <div class="cards">Snatch Record: 141 kg</div>"#
                .to_string())
        }
    }

    #[tokio::test]
    async fn duplicate_key_across_pages_is_dropped() {
        let configs = [CONFIGURATIONS[0], CONFIGURATIONS[0]];
        let report = collect_all(&SamePage, &configs, Duration::ZERO).await;

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].weight_class, "61kg");
        assert_eq!(report.failed(), 0);
        assert!(matches!(report.pages[0].1, PageOutcome::Ok(1)));
        assert!(matches!(report.pages[1].1, PageOutcome::Ok(0)));
    }
}
