//! Scenario run reports with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, ErrorKind};
use crate::matching::HelpRequest;
use crate::reputation::Tier;
use crate::tutor::TutorProfile;

/// A complete scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub scenario: ScenarioSummary,
    /// One outcome per student registration and per event, in order.
    pub outcomes: Vec<EventOutcome>,
    /// Result of every help request.
    pub matches: Vec<MatchRecord>,
    /// Tutor state at the end of the run.
    pub tutors: Vec<TutorSummary>,
    pub platform_revenue_cents: i64,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Summary of a scenario (without its event list).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub id: String,
    pub name: String,
    pub student_count: usize,
    pub event_count: usize,
}

/// What happened when one step was applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventOutcome {
    /// `register` for student registrations, the event type otherwise.
    pub step: String,
    /// Zero-based event index; `None` for student registrations.
    pub event_index: Option<usize>,
    pub description: String,
    /// Extra detail on success (new tier, matched tutor, split).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OutcomeError>,
}

impl EventOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// A failed step's error, kept by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&Error> for OutcomeError {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.message().to_string(),
        }
    }
}

/// A help request and the tutor it matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub event_index: usize,
    pub request: HelpRequest,
    pub tutor_email: Option<String>,
}

/// End-of-run tutor state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorSummary {
    pub registration_id: String,
    pub name: String,
    pub email: String,
    pub subjects: Vec<(String, u8)>,
    pub rating: f64,
    pub tier: Tier,
    pub balance_cents: i64,
}

impl From<&TutorProfile> for TutorSummary {
    fn from(tutor: &TutorProfile) -> Self {
        Self {
            registration_id: tutor.registration_id().to_string(),
            name: tutor.name().to_string(),
            email: tutor.email().to_string(),
            subjects: tutor
                .subjects()
                .into_iter()
                .map(|(subject, level)| (subject.to_string(), level))
                .collect(),
            rating: tutor.rating(),
            tier: tutor.tier(),
            balance_cents: tutor.balance(),
        }
    }
}

impl RunReport {
    /// Number of failed steps.
    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.succeeded()).count()
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: RunReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
