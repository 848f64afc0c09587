//! Durable storage for the latest snapshot.
//!
//! Replacing a snapshot is an unconditional delete followed by a full insert.
//! Only one writer may run against a given table at a time; nothing here
//! locks against a concurrent run.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::model::{AgeCategory, Gender, WorldRecord};
use crate::settings::Settings;

#[async_trait(?Send)]
pub trait RecordStore {
    fn name(&self) -> &'static str;

    async fn read_all(&self, table: &str) -> Result<Vec<WorldRecord>>;

    async fn delete_all(&self, table: &str) -> Result<()>;

    async fn insert_many(&self, table: &str, records: &[WorldRecord]) -> Result<usize>;

    async fn replace_all(&self, table: &str, records: &[WorldRecord]) -> Result<usize> {
        println!("Clearing existing records...");
        self.delete_all(table).await?;
        println!("Inserting {} records...", records.len());
        self.insert_many(table, records).await
    }
}

/// Pick the configured backend: Supabase, then a local SQLite file, else none.
pub fn open_store(settings: &Settings) -> Result<Option<Box<dyn RecordStore>>> {
    if let Some((url, key)) = settings.supabase() {
        return Ok(Some(Box::new(SupabaseStore::new(url, key)?)));
    }
    if let Some(path) = &settings.world_records_db {
        return Ok(Some(Box::new(SqliteStore::open(path)?)));
    }
    Ok(None)
}

// ── SQLite ──

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::with_connection(conn)
    }

    pub fn with_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn, crate::settings::TABLE)?;
        Ok(Self { conn })
    }
}

pub fn init_schema(conn: &Connection, table: &str) -> Result<()> {
    conn.execute_batch(&format!(
        "
        CREATE TABLE IF NOT EXISTS \"{table}\" (
            id            INTEGER PRIMARY KEY,
            age_category  TEXT NOT NULL CHECK(age_category IN ('Senior','Junior','Youth')),
            gender        TEXT NOT NULL CHECK(gender IN ('Men','Women')),
            weight_class  TEXT NOT NULL,
            snatch_record INTEGER,
            cj_record     INTEGER,
            total_record  INTEGER,
            created_at    TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(age_category, gender, weight_class)
        );
        "
    ))?;
    Ok(())
}

fn insert_rows(conn: &Connection, table: &str, records: &[WorldRecord]) -> Result<usize> {
    let mut stmt = conn.prepare(&format!(
        "INSERT INTO \"{table}\"
         (age_category, gender, weight_class, snatch_record, cj_record, total_record)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
    ))?;
    let mut count = 0;
    for r in records {
        count += stmt.execute(rusqlite::params![
            r.age_category.as_str(),
            r.gender.as_str(),
            r.weight_class,
            r.snatch_record,
            r.cj_record,
            r.total_record,
        ])?;
    }
    Ok(count)
}

#[async_trait(?Send)]
impl RecordStore for SqliteStore {
    fn name(&self) -> &'static str {
        "SQLite"
    }

    async fn read_all(&self, table: &str) -> Result<Vec<WorldRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT age_category, gender, weight_class, snatch_record, cj_record, total_record
             FROM \"{table}\" ORDER BY id"
        ))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<u32>>(3)?,
                    row.get::<_, Option<u32>>(4)?,
                    row.get::<_, Option<u32>>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let records = rows
            .into_iter()
            .filter_map(|(age, gender, weight_class, s, cj, t)| {
                let (Some(age_category), Some(gender)) =
                    (AgeCategory::parse(&age), Gender::parse(&gender))
                else {
                    warn!(%age, %gender, %weight_class, "unrecognised stored row, ignoring");
                    return None;
                };
                Some(WorldRecord {
                    age_category,
                    gender,
                    weight_class,
                    snatch_record: s,
                    cj_record: cj,
                    total_record: t,
                })
            })
            .collect();
        Ok(records)
    }

    async fn delete_all(&self, table: &str) -> Result<()> {
        self.conn.execute(&format!("DELETE FROM \"{table}\""), [])?;
        Ok(())
    }

    async fn insert_many(&self, table: &str, records: &[WorldRecord]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let count = insert_rows(&tx, table, records)?;
        tx.commit()?;
        Ok(count)
    }

    /// Delete and insert in one transaction, so a failed insert keeps the old rows.
    async fn replace_all(&self, table: &str, records: &[WorldRecord]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        println!("Clearing existing records...");
        tx.execute(&format!("DELETE FROM \"{table}\""), [])?;
        println!("Inserting {} records...", records.len());
        let count = insert_rows(&tx, table, records)?;
        tx.commit()?;
        info!(table, count, "snapshot replaced");
        Ok(count)
    }
}

// ── Supabase (PostgREST) ──

pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
    key: String,
}

impl SupabaseStore {
    pub fn new(url: &str, key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        })
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", self.key))
    }
}

async fn check(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Supabase {} failed {}: {}", what, status, body);
    }
    Ok(response)
}

#[async_trait(?Send)]
impl RecordStore for SupabaseStore {
    fn name(&self) -> &'static str {
        "Supabase"
    }

    async fn read_all(&self, table: &str) -> Result<Vec<WorldRecord>> {
        let req = self
            .client
            .get(self.endpoint(table))
            .query(&[("select", "*")]);
        let response = check(self.authed(req).send().await?, "select").await?;
        response
            .json::<Vec<WorldRecord>>()
            .await
            .context("Unexpected Supabase row shape")
    }

    async fn delete_all(&self, table: &str) -> Result<()> {
        let req = self
            .client
            .delete(self.endpoint(table))
            .query(&[("id", "neq.0")]);
        check(self.authed(req).send().await?, "delete").await?;
        Ok(())
    }

    async fn insert_many(&self, table: &str, records: &[WorldRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let req = self
            .client
            .post(self.endpoint(table))
            .header("Prefer", "return=minimal")
            .json(records);
        check(self.authed(req).send().await?, "insert").await?;
        Ok(records.len())
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TABLE;

    fn rec(wc: &str, s: Option<u32>, cj: Option<u32>, t: Option<u32>) -> WorldRecord {
        WorldRecord {
            age_category: AgeCategory::Senior,
            gender: Gender::Women,
            weight_class: wc.to_string(),
            snatch_record: s,
            cj_record: cj,
            total_record: t,
        }
    }

    fn memory_store() -> SqliteStore {
        SqliteStore::with_connection(Connection::open_in_memory().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn replace_swaps_whole_snapshot() {
        let store = memory_store();
        store
            .insert_many(TABLE, &[rec("49kg", Some(96), None, None), rec("55kg", None, None, None)])
            .await
            .unwrap();

        let fresh = vec![rec("59kg", Some(110), Some(140), Some(247))];
        let n = store.replace_all(TABLE, &fresh).await.unwrap();
        assert_eq!(n, 1);
        assert_eq!(store.read_all(TABLE).await.unwrap(), fresh);
    }

    #[tokio::test]
    async fn absent_values_stay_null() {
        let store = memory_store();
        let rows = vec![rec("+87kg", Some(130), None, None)];
        store.insert_many(TABLE, &rows).await.unwrap();
        let back = store.read_all(TABLE).await.unwrap();
        assert_eq!(back[0].cj_record, None);
        assert_eq!(back[0].snatch_record, Some(130));
    }

    #[tokio::test]
    async fn failed_replace_keeps_old_rows() {
        let store = memory_store();
        let old = vec![rec("49kg", Some(96), None, None)];
        store.insert_many(TABLE, &old).await.unwrap();

        // Duplicate key violates the unique constraint mid-insert.
        let bad = vec![rec("55kg", None, None, None), rec("55kg", None, None, None)];
        assert!(store.replace_all(TABLE, &bad).await.is_err());
        assert_eq!(store.read_all(TABLE).await.unwrap(), old);
    }

    #[tokio::test]
    async fn file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wr.sqlite");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_many(TABLE, &[rec("71kg", Some(117), None, None)]).await.unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.read_all(TABLE).await.unwrap().len(), 1);
    }

    #[test]
    fn no_credentials_means_no_store() {
        let settings = Settings::default();
        assert!(open_store(&settings).unwrap().is_none());
    }

    #[test]
    fn supabase_preferred_over_sqlite() {
        let settings = Settings {
            supabase_url: Some("https://x.supabase.co/".into()),
            supabase_key: Some("k".into()),
            world_records_db: Some("/nonexistent/dir/wr.sqlite".into()),
            ..Settings::default()
        };
        let store = open_store(&settings).unwrap().unwrap();
        assert_eq!(store.name(), "Supabase");
    }
}
