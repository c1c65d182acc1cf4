//! Pipeline orchestrator
//!
//! Sequences the four stages: extract -> normalize -> store -> validate,
//! persisting artifacts between stages and timing each one. A store-stage
//! failure is downgraded to an empty write summary so validation still runs
//! against the in-memory documents of the current run.

use std::time::Instant;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::fetch::{ExtractionCoordinator, PayloadFetcher};
use crate::normalize::normalize_rows;
use crate::report;
use crate::store::{MetricStore, WriteSummary};
use crate::validate::{validate_documents, ValidationSummary};
use aep_common::config::Settings;
use aep_common::constants::AFRICAN_COUNTRIES;

/// Aggregated result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub dry_run: bool,
    pub countries_requested: usize,
    pub raw_rows: usize,
    pub documents: usize,
    pub write: WriteSummary,
    pub validation: ValidationSummary,
    pub extract_secs: f64,
    pub normalize_secs: f64,
    pub store_secs: f64,
    pub validate_secs: f64,
    pub total_secs: f64,
}

pub struct Pipeline<F> {
    coordinator: ExtractionCoordinator<F>,
    settings: Settings,
}

impl<F: PayloadFetcher> Pipeline<F> {
    pub fn new(fetcher: F, settings: Settings) -> Self {
        Self {
            coordinator: ExtractionCoordinator::new(fetcher, &settings),
            settings,
        }
    }

    /// Run the full pipeline over all countries or a named subset.
    /// `dry_run` skips the store stage; normalization and validation still
    /// run.
    pub async fn run(&self, countries: Option<&[String]>, dry_run: bool) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let run_start = Instant::now();

        let targets: Vec<String> = match countries {
            Some(subset) if !subset.is_empty() => subset.to_vec(),
            _ => AFRICAN_COUNTRIES.iter().map(|c| c.to_string()).collect(),
        };

        info!(
            run_id = %run_id,
            countries = targets.len(),
            dry_run,
            "Pipeline starting"
        );

        // Stage 1: extraction
        let stage_start = Instant::now();
        let raw_rows = self.coordinator.extract_all(&targets).await;
        let extract_secs = stage_start.elapsed().as_secs_f64();
        info!(rows = raw_rows.len(), elapsed_secs = extract_secs, "Extraction complete");

        report::write_raw_artifacts(&self.settings.reports_dir, &raw_rows)?;

        // Stage 2: normalization
        let stage_start = Instant::now();
        let documents = normalize_rows(raw_rows.clone());
        let normalize_secs = stage_start.elapsed().as_secs_f64();
        info!(docs = documents.len(), elapsed_secs = normalize_secs, "Normalization complete");

        report::write_formatted(&self.settings.reports_dir, &documents)?;

        // Stage 3: storage
        let stage_start = Instant::now();
        let write = if dry_run {
            info!("Store stage skipped (dry run)");
            WriteSummary::default()
        } else {
            match self.store_documents(&documents).await {
                Ok(summary) => summary,
                Err(err) => {
                    // Stage-level failure; validation still runs below.
                    error!(error = %err, "Store stage failed");
                    WriteSummary::default()
                }
            }
        };
        let store_secs = stage_start.elapsed().as_secs_f64();

        // Stage 4: validation
        let stage_start = Instant::now();
        let validation_report = validate_documents(&documents, AFRICAN_COUNTRIES);
        let validate_secs = stage_start.elapsed().as_secs_f64();

        report::write_validation_report(&self.settings.reports_dir, &validation_report.issues)?;

        let summary = RunSummary {
            run_id,
            started_at,
            dry_run,
            countries_requested: targets.len(),
            raw_rows: raw_rows.len(),
            documents: documents.len(),
            write,
            validation: validation_report.summary,
            extract_secs,
            normalize_secs,
            store_secs,
            validate_secs,
            total_secs: run_start.elapsed().as_secs_f64(),
        };

        info!(
            run_id = %run_id,
            total_secs = summary.total_secs,
            raw_rows = summary.raw_rows,
            documents = summary.documents,
            "Pipeline complete"
        );

        Ok(summary)
    }

    /// Extract one country and save its raw artifact (no later stages).
    pub async fn dump_country(&self, country: &str) -> Result<Vec<std::path::PathBuf>> {
        let rows = self.coordinator.extract_country(country).await;
        report::write_raw_artifacts(&self.settings.reports_dir, &rows)
    }

    async fn store_documents(
        &self,
        documents: &[aep_common::types::CanonicalDocument],
    ) -> Result<WriteSummary> {
        let store = MetricStore::connect(&self.settings.database_url).await?;
        Ok(store.upsert_documents(documents).await?)
    }
}
