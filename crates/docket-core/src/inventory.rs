use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use uuid::Uuid;

use crate::{
    asset::{ExistingAssetIndex, HttpMethod, FALLBACK_SOURCE},
    policy::Destination,
    sink::{AssetSink, CommitOptions, CommitRecord, CommitReport},
    Error, Result,
};

const INIT_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS assets (
    id TEXT PRIMARY KEY,
    url TEXT NOT NULL,
    method TEXT NOT NULL DEFAULT 'GET',
    source TEXT NOT NULL,
    recursive INTEGER NOT NULL DEFAULT 0,
    destination TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(url, method)
);

CREATE INDEX IF NOT EXISTS idx_assets_url ON assets(url);
CREATE INDEX IF NOT EXISTS idx_assets_source ON assets(source);

CREATE TABLE IF NOT EXISTS import_runs (
    id TEXT PRIMARY KEY,
    source TEXT NOT NULL,
    total INTEGER NOT NULL,
    successful INTEGER NOT NULL,
    failed INTEGER NOT NULL,
    duplicates INTEGER NOT NULL,
    status TEXT NOT NULL,
    error TEXT,
    options TEXT NOT NULL,
    created_at TEXT NOT NULL,
    finished_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_runs_created ON import_runs(created_at);
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RunStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(Error::InvalidRunStatus(s.to_string())),
        }
    }
}

/// An endpoint record in the permanent inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAsset {
    pub id: Uuid,
    pub url: String,
    pub method: HttpMethod,
    pub source: String,
    pub recursive: bool,
    pub destination: Destination,
    pub created_at: DateTime<Utc>,
}

impl StoredAsset {
    #[must_use]
    pub fn new(
        url: String,
        method: HttpMethod,
        source: String,
        recursive: bool,
        destination: Destination,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            url,
            method,
            source,
            recursive,
            destination,
            created_at: Utc::now(),
        }
    }
}

/// One import, recorded around a commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRun {
    pub id: Uuid,
    pub source: String,
    pub total: u32,
    pub successful: u32,
    pub failed: u32,
    pub duplicates: u32,
    pub status: RunStatus,
    pub error: Option<String>,
    pub options: CommitOptions,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ImportRun {
    #[must_use]
    pub fn begin(source: String, total: u32, options: CommitOptions) -> Self {
        Self {
            id: Uuid::now_v7(),
            source,
            total,
            successful: 0,
            failed: 0,
            duplicates: 0,
            status: RunStatus::Running,
            error: None,
            options,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn complete(&mut self, report: &CommitReport) {
        self.successful = report.successful;
        self.failed = report.failed;
        self.duplicates = report.duplicates;
        self.status = RunStatus::Completed;
        self.finished_at = Some(Utc::now());
    }

    pub fn fail(&mut self, error: String) {
        self.status = RunStatus::Failed;
        self.error = Some(error);
        self.finished_at = Some(Utc::now());
    }
}

pub struct Inventory {
    pool: Pool<Sqlite>,
}

impl Inventory {
    pub async fn open(path: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&format!("sqlite:{path}?mode=rwc"))
            .await?;

        sqlx::query(INIT_SQL).execute(&pool).await?;

        Ok(Self { pool })
    }

    pub async fn open_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        sqlx::query(INIT_SQL).execute(&pool).await?;

        Ok(Self { pool })
    }

    // Asset operations

    /// Insert or refresh an asset keyed on (url, method) and return the
    /// surviving row id. Recursion only upgrades; a later non-recursive
    /// import never switches it off.
    pub async fn add_asset(&self, asset: &StoredAsset) -> Result<Uuid> {
        let url = normalize_url(&asset.url);

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO assets (id, url, method, source, recursive, destination, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(asset.id.to_string())
        .bind(&url)
        .bind(asset.method.as_str())
        .bind(&asset.source)
        .bind(asset.recursive)
        .bind(asset.destination.as_str())
        .bind(asset.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        let (id, recursive, source): (String, bool, String) =
            sqlx::query_as("SELECT id, recursive, source FROM assets WHERE url = ? AND method = ?")
                .bind(&url)
                .bind(asset.method.as_str())
                .fetch_one(&self.pool)
                .await?;

        if asset.recursive && !recursive {
            sqlx::query("UPDATE assets SET recursive = 1 WHERE id = ?")
                .bind(&id)
                .execute(&self.pool)
                .await?;
        }

        if asset.source != source {
            sqlx::query("UPDATE assets SET source = ? WHERE id = ?")
                .bind(&asset.source)
                .bind(&id)
                .execute(&self.pool)
                .await?;
        }

        id.parse().map_err(|_| Error::AssetNotFound(Uuid::nil()))
    }

    pub async fn asset_exists(&self, url: &str, method: HttpMethod) -> Result<bool> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT id FROM assets WHERE url = ? AND method = ?")
                .bind(normalize_url(url))
                .bind(method.as_str())
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.is_some())
    }

    /// Snapshot of every stored (url, method) pair for duplicate tagging.
    pub async fn existing_index(&self) -> Result<ExistingAssetIndex> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT url, method FROM assets")
            .fetch_all(&self.pool)
            .await?;

        let mut index = ExistingAssetIndex::new();
        for (url, method) in rows {
            index.insert(&url, method.parse()?);
        }

        Ok(index)
    }

    pub async fn list_assets(&self) -> Result<Vec<StoredAsset>> {
        let rows: Vec<(String, String, String, String, bool, String, String)> = sqlx::query_as(
            r#"
            SELECT id, url, method, source, recursive, destination, created_at
            FROM assets ORDER BY created_at DESC, url
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(parse_asset_row).collect()
    }

    pub async fn remove_asset(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM assets WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::AssetNotFound(id));
        }

        Ok(())
    }

    pub async fn clear_assets(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM assets").execute(&self.pool).await?;

        Ok(result.rows_affected())
    }

    // Run operations

    pub async fn begin_run(&self, run: &ImportRun) -> Result<()> {
        let options_json = serde_json::to_string(&run.options)?;

        sqlx::query(
            r#"
            INSERT INTO import_runs (id, source, total, successful, failed, duplicates, status, error, options, created_at, finished_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(run.id.to_string())
        .bind(&run.source)
        .bind(i64::from(run.total))
        .bind(i64::from(run.successful))
        .bind(i64::from(run.failed))
        .bind(i64::from(run.duplicates))
        .bind(run.status.as_str())
        .bind(&run.error)
        .bind(options_json)
        .bind(run.created_at.to_rfc3339())
        .bind(run.finished_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn finish_run(&self, run: &ImportRun) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE import_runs
            SET successful = ?, failed = ?, duplicates = ?, status = ?, error = ?, finished_at = ?
            WHERE id = ?
            "#,
        )
        .bind(i64::from(run.successful))
        .bind(i64::from(run.failed))
        .bind(i64::from(run.duplicates))
        .bind(run.status.as_str())
        .bind(&run.error)
        .bind(run.finished_at.map(|t| t.to_rfc3339()))
        .bind(run.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RunNotFound(run.id));
        }

        Ok(())
    }

    pub async fn list_runs(&self, limit: u32) -> Result<Vec<ImportRun>> {
        let rows: Vec<(
            String,
            String,
            i64,
            i64,
            i64,
            i64,
            String,
            Option<String>,
            String,
            String,
            Option<String>,
        )> = sqlx::query_as(
            r#"
            SELECT id, source, total, successful, failed, duplicates, status, error, options, created_at, finished_at
            FROM import_runs ORDER BY created_at DESC LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(parse_run_row).collect()
    }

    // Sink plumbing

    async fn store_records(
        &self,
        records: &[CommitRecord],
        destination: Destination,
        options: &CommitOptions,
    ) -> Result<CommitReport> {
        let mut report = CommitReport::default();

        for batch in records.chunks(options.batch_size.max(1)) {
            tracing::debug!("Storing batch of {} records", batch.len());

            for record in batch {
                if options.skip_duplicates && self.asset_exists(&record.url, record.method).await? {
                    report.duplicates += 1;
                    continue;
                }

                let asset = StoredAsset::new(
                    record.url.clone(),
                    record.method,
                    record.source.clone(),
                    record.recursive,
                    destination,
                );
                match self.add_asset(&asset).await {
                    Ok(_) => report.successful += 1,
                    Err(e) => {
                        tracing::warn!("Failed to store {}: {}", record.url, e);
                        report.failed += 1;
                        report.errors.push(format!("{}: {e}", record.url));
                    }
                }

                if options.rate_limit_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(options.rate_limit_ms)).await;
                }
            }
        }

        Ok(report)
    }
}

#[async_trait::async_trait]
impl AssetSink for Inventory {
    async fn commit(
        &self,
        records: &[CommitRecord],
        destination: Destination,
        options: &CommitOptions,
    ) -> Result<CommitReport> {
        let mut run = ImportRun::begin(
            batch_source(records),
            records.len() as u32,
            options.clone(),
        );
        self.begin_run(&run).await?;

        match self.store_records(records, destination, options).await {
            Ok(report) => {
                run.complete(&report);
                self.finish_run(&run).await?;
                Ok(report)
            }
            Err(e) => {
                run.fail(e.to_string());
                self.finish_run(&run).await?;
                Err(e)
            }
        }
    }
}

/// Schemeless values with a dot become https URLs; paths and full URLs pass
/// through untouched.
fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") || trimmed.starts_with('/')
    {
        return trimmed.to_string();
    }
    if trimmed.contains('.') {
        return format!("https://{trimmed}");
    }

    trimmed.to_string()
}

fn batch_source(records: &[CommitRecord]) -> String {
    records
        .first()
        .map_or_else(|| FALLBACK_SOURCE.to_string(), |r| r.source.clone())
}

fn parse_asset_row(
    row: (String, String, String, String, bool, String, String),
) -> Result<StoredAsset> {
    let (id, url, method, source, recursive, destination, created_at) = row;

    Ok(StoredAsset {
        id: id.parse().map_err(|_| Error::AssetNotFound(Uuid::nil()))?,
        url,
        method: method.parse()?,
        source,
        recursive,
        destination: destination.parse()?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|_| Error::AssetNotFound(Uuid::nil()))?
            .with_timezone(&Utc),
    })
}

fn parse_run_row(
    row: (
        String,
        String,
        i64,
        i64,
        i64,
        i64,
        String,
        Option<String>,
        String,
        String,
        Option<String>,
    ),
) -> Result<ImportRun> {
    let (
        id,
        source,
        total,
        successful,
        failed,
        duplicates,
        status,
        error,
        options_json,
        created_at,
        finished_at,
    ) = row;

    Ok(ImportRun {
        id: id.parse().map_err(|_| Error::RunNotFound(Uuid::nil()))?,
        source,
        total: u32::try_from(total).unwrap_or_default(),
        successful: u32::try_from(successful).unwrap_or_default(),
        failed: u32::try_from(failed).unwrap_or_default(),
        duplicates: u32::try_from(duplicates).unwrap_or_default(),
        status: status.parse()?,
        error,
        options: serde_json::from_str(&options_json)?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|_| Error::RunNotFound(Uuid::nil()))?
            .with_timezone(&Utc),
        finished_at: finished_at
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|t| t.with_timezone(&Utc)),
    })
}
