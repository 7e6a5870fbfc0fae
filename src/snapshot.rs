//! Storage Snapshot Loading
//!
//! The engine's input boundary made concrete for the CLI: a JSON document
//! holding the pre-fetched feedback rows, assistance requests and external
//! rating snapshots for the venues under inspection. The engine itself never
//! touches storage; this file format is how "already fetched" arrives on the
//! command line.
//!
//! A snapshot is structurally strict (it is produced by export tooling, so a
//! malformed document fails the load with context) while semantically corrupt
//! rows inside it - empty session ids, out-of-range ratings, negative
//! durations - are filtered downstream by the engine rather than rejected
//! here.

use crate::models::{AssistanceRequest, ExternalRating, FeedbackItem};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageSnapshot {
    #[serde(default)]
    pub feedback: Vec<FeedbackItem>,
    #[serde(default)]
    pub assistance: Vec<AssistanceRequest>,
    #[serde(rename = "externalRatings", default)]
    pub external_ratings: Vec<ExternalRating>,
}

impl StorageSnapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot file: {}", path.display()))?;

        let snapshot: StorageSnapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot file: {}", path.display()))?;

        debug!(
            feedback = snapshot.feedback.len(),
            assistance = snapshot.assistance.len(),
            external_ratings = snapshot.external_ratings.len(),
            "Loaded storage snapshot"
        );

        Ok(snapshot)
    }

    /// Distinct venue ids across all row kinds, sorted.
    pub fn venue_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .feedback
            .iter()
            .map(|f| f.venue_id.clone())
            .chain(self.assistance.iter().map(|a| a.venue_id.clone()))
            .chain(self.external_ratings.iter().map(|r| r.venue_id.clone()))
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}
