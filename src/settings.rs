use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use config::Config;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://iwf.sport/results/world-records/";
pub const DEFAULT_CSV_PATH: &str = "world_records_latest.csv";
pub const TABLE: &str = "world_records";

/// Values read from the environment (and `.env`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub world_records_db: Option<PathBuf>,
    pub discord_webhook_url: Option<String>,
    pub world_records_csv: PathBuf,
    pub request_delay_ms: u64,
    pub iwf_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            supabase_url: None,
            supabase_key: None,
            world_records_db: None,
            discord_webhook_url: None,
            world_records_csv: PathBuf::from(DEFAULT_CSV_PATH),
            request_delay_ms: 1000,
            iwf_base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let cfg = Config::builder()
            .add_source(config::Environment::default())
            .build()?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: Config) -> Result<Self> {
        let mut settings: Settings = cfg.try_deserialize()?;
        settings.supabase_url = non_empty(settings.supabase_url);
        settings.supabase_key = non_empty(settings.supabase_key);
        settings.discord_webhook_url = non_empty(settings.discord_webhook_url);
        Ok(settings)
    }

    pub fn supabase(&self) -> Option<(&str, &str)> {
        Some((self.supabase_url.as_deref()?, self.supabase_key.as_deref()?))
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

/// Frozen for the whole run and handed to each stage.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub dry_run: bool,
    pub settings: Settings,
}

impl RunConfig {
    pub fn new(dry_run: bool, settings: Settings) -> Self {
        Self { dry_run, settings }
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.settings.request_delay_ms)
    }
}

// ── Tests ──
