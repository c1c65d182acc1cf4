//! Metric store: idempotent upserts keyed on (country, metric, source)
//!
//! The destination is a SQLite table with a named unique index on the
//! identity key, created before any write. Upserts replace the stored
//! document wholesale (never merged field-by-field) so a rerun with updated
//! values clears stale year entries. Per-document failures are isolated:
//! one bad document is counted and logged, the rest of the batch proceeds.

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use aep_common::types::CanonicalDocument;
use aep_common::{Error, Result};

const TABLE_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS energy_metrics (
    country TEXT NOT NULL,
    country_slug TEXT NOT NULL,
    metric TEXT NOT NULL,
    unit TEXT NOT NULL,
    sector TEXT NOT NULL,
    sub_sector TEXT,
    sub_sub_sector TEXT,
    source_link TEXT NOT NULL,
    source TEXT NOT NULL,
    yearly TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

const UNIQUE_INDEX_DDL: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS uniq_country_metric_source
    ON energy_metrics (country, metric, source)
"#;

const UPSERT_SQL: &str = r#"
INSERT INTO energy_metrics
    (country, country_slug, metric, unit, sector, sub_sector, sub_sub_sector,
     source_link, source, yearly, updated_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
ON CONFLICT (country, metric, source) DO UPDATE SET
    country_slug = excluded.country_slug,
    unit = excluded.unit,
    sector = excluded.sector,
    sub_sector = excluded.sub_sector,
    sub_sub_sector = excluded.sub_sub_sector,
    source_link = excluded.source_link,
    yearly = excluded.yearly,
    updated_at = excluded.updated_at
"#;

/// Counts from one bulk upsert, mirroring a document store's bulk-write
/// result: `matched` existing keys, of which `modified` actually changed,
/// plus `upserted` new documents and isolated `failed` writes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WriteSummary {
    pub matched: usize,
    pub modified: usize,
    pub upserted: usize,
    pub failed: usize,
}

/// Keyed document collection over SQLite.
pub struct MetricStore {
    pool: SqlitePool,
}

impl MetricStore {
    /// Connect and prepare the schema. The unique index exists before any
    /// write; upsert correctness depends on it.
    pub async fn connect(database_url: &str) -> Result<Self> {
        debug!(url = %database_url, "Connecting to metric store");
        let pool = SqlitePool::connect(database_url).await?;

        sqlx::query(TABLE_DDL).execute(&pool).await?;
        sqlx::query(UNIQUE_INDEX_DDL).execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Upsert a batch of canonical documents. Set-oriented and
    /// partial-failure tolerant: an error on one document is recorded in
    /// the summary without aborting the rest.
    pub async fn upsert_documents(&self, docs: &[CanonicalDocument]) -> Result<WriteSummary> {
        let mut summary = WriteSummary::default();

        if docs.is_empty() {
            warn!("No documents to store");
            return Ok(summary);
        }

        info!(count = docs.len(), "Upserting documents");

        for doc in docs {
            match self.upsert_one(doc).await {
                Ok(UpsertOutcome::Inserted) => summary.upserted += 1,
                Ok(UpsertOutcome::Unchanged) => summary.matched += 1,
                Ok(UpsertOutcome::Updated) => {
                    summary.matched += 1;
                    summary.modified += 1;
                }
                Err(err) => {
                    summary.failed += 1;
                    warn!(
                        country = %doc.country,
                        metric = %doc.metric,
                        source = %doc.source,
                        error = %err,
                        "Document upsert failed"
                    );
                }
            }
        }

        info!(
            matched = summary.matched,
            modified = summary.modified,
            upserted = summary.upserted,
            failed = summary.failed,
            "Store write complete"
        );
        Ok(summary)
    }

    async fn upsert_one(&self, doc: &CanonicalDocument) -> Result<UpsertOutcome> {
        let existing = self
            .fetch_document(&doc.country, &doc.metric, &doc.source)
            .await?;

        let yearly = serde_json::to_string(&doc.yearly)?;
        let updated_at = chrono::Utc::now().to_rfc3339();

        sqlx::query(UPSERT_SQL)
            .bind(&doc.country)
            .bind(&doc.country_slug)
            .bind(&doc.metric)
            .bind(&doc.unit)
            .bind(&doc.sector)
            .bind(&doc.sub_sector)
            .bind(&doc.sub_sub_sector)
            .bind(&doc.source_link)
            .bind(&doc.source)
            .bind(&yearly)
            .bind(&updated_at)
            .execute(&self.pool)
            .await?;

        Ok(match existing {
            None => UpsertOutcome::Inserted,
            Some(prev) if prev == *doc => UpsertOutcome::Unchanged,
            Some(_) => UpsertOutcome::Updated,
        })
    }

    /// Fetch one document by identity key.
    pub async fn fetch_document(
        &self,
        country: &str,
        metric: &str,
        source: &str,
    ) -> Result<Option<CanonicalDocument>> {
        let row: Option<StoredRow> = sqlx::query_as(
            "SELECT country, country_slug, metric, unit, sector, sub_sector, sub_sub_sector, \
             source_link, source, yearly \
             FROM energy_metrics WHERE country = ? AND metric = ? AND source = ?",
        )
        .bind(country)
        .bind(metric)
        .bind(source)
        .fetch_optional(&self.pool)
        .await?;

        row.map(StoredRow::into_document).transpose()
    }

    /// Fetch every stored document, ordered by identity key.
    pub async fn fetch_all(&self) -> Result<Vec<CanonicalDocument>> {
        let rows: Vec<StoredRow> = sqlx::query_as(
            "SELECT country, country_slug, metric, unit, sector, sub_sector, sub_sub_sector, \
             source_link, source, yearly \
             FROM energy_metrics ORDER BY country, metric, source",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StoredRow::into_document).collect()
    }

    /// Number of stored documents.
    pub async fn count(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM energy_metrics")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

enum UpsertOutcome {
    Inserted,
    Unchanged,
    Updated,
}

#[derive(sqlx::FromRow)]
struct StoredRow {
    country: String,
    country_slug: String,
    metric: String,
    unit: String,
    sector: String,
    sub_sector: Option<String>,
    sub_sub_sector: Option<String>,
    source_link: String,
    source: String,
    yearly: String,
}

impl StoredRow {
    fn into_document(self) -> Result<CanonicalDocument> {
        let yearly: BTreeMap<u16, Option<f64>> = serde_json::from_str(&self.yearly)
            .map_err(|e| Error::Internal(format!("Corrupt yearly column: {}", e)))?;

        Ok(CanonicalDocument {
            country: self.country,
            country_slug: self.country_slug,
            metric: self.metric,
            unit: self.unit,
            sector: self.sector,
            sub_sector: self.sub_sector,
            sub_sub_sector: self.sub_sub_sector,
            source_link: self.source_link,
            source: self.source,
            yearly,
        })
    }
}
