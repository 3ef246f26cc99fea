//! Scenario replay engine.
//!
//! Registers a scenario's students on a marketplace and applies its events in
//! order. A failing step is recorded in the report and the run continues.

use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use crate::config::TutoriaConfig;
use crate::marketplace::Marketplace;
use crate::report::{
    EventOutcome, MatchRecord, OutcomeError, RunReport, ScenarioSummary, TutorSummary,
};
use crate::scenario::{Scenario, ScenarioEvent};
use crate::traits::ListingKind;

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_event_start(&self, index: usize, total: usize, event: &ScenarioEvent);
    fn on_event_complete(&self, outcome: &EventOutcome);
    fn on_run_complete(&self, total: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_event_start(&self, _: usize, _: usize, _: &ScenarioEvent) {}
    fn on_event_complete(&self, _: &EventOutcome) {}
    fn on_run_complete(&self, _: usize, _: usize, _: Duration) {}
}

/// Replays scenarios against a marketplace.
pub struct ScenarioEngine {
    config: TutoriaConfig,
}

impl ScenarioEngine {
    pub fn new(config: TutoriaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TutoriaConfig {
        &self.config
    }

    /// Run `scenario` on a fresh marketplace built from the engine config.
    pub fn run(&self, scenario: &Scenario, progress: &dyn ProgressReporter) -> Result<RunReport> {
        let mut market = Marketplace::new(&self.config)?;
        Ok(self.run_on(&mut market, scenario, progress))
    }

    /// Run `scenario` on an existing marketplace, leaving its final state
    /// in place for the caller.
    pub fn run_on(
        &self,
        market: &mut Marketplace,
        scenario: &Scenario,
        progress: &dyn ProgressReporter,
    ) -> RunReport {
        let start = Instant::now();
        let mut outcomes = Vec::with_capacity(scenario.students.len() + scenario.events.len());
        let mut matches = Vec::new();

        tracing::info!(
            scenario = %scenario.id,
            students = scenario.students.len(),
            events = scenario.events.len(),
            "running scenario"
        );

        for student in &scenario.students {
            let result = market.register_student(
                &student.registration_id,
                &student.name,
                student.course_code,
                &student.phone,
                &student.email,
            );
            let outcome = EventOutcome {
                step: "register".into(),
                event_index: None,
                description: format!("register {} <{}>", student.registration_id, student.email),
                detail: None,
                error: result.err().as_ref().map(OutcomeError::from),
            };
            if let Some(err) = &outcome.error {
                tracing::warn!(registration_id = %student.registration_id, "registration failed: {}", err.message);
            }
            outcomes.push(outcome);
        }

        let total = scenario.events.len();
        for (index, event) in scenario.events.iter().enumerate() {
            progress.on_event_start(index, total, event);

            let result = apply_event(market, event);
            let outcome = match result {
                Ok(applied) => {
                    if let (Some(request), Some(tutor_email)) =
                        (event.help_request(), applied.matched)
                    {
                        matches.push(MatchRecord {
                            event_index: index,
                            request,
                            tutor_email,
                        });
                    }
                    EventOutcome {
                        step: event.kind().into(),
                        event_index: Some(index),
                        description: event.to_string(),
                        detail: applied.detail,
                        error: None,
                    }
                }
                Err(err) => {
                    tracing::warn!(index, event = %event, kind = %err.kind(), "event failed: {}", err);
                    EventOutcome {
                        step: event.kind().into(),
                        event_index: Some(index),
                        description: event.to_string(),
                        detail: None,
                        error: Some(OutcomeError::from(&err)),
                    }
                }
            };

            progress.on_event_complete(&outcome);
            outcomes.push(outcome);
        }

        let elapsed = start.elapsed();
        let failed = outcomes.iter().filter(|o| !o.succeeded()).count();
        progress.on_run_complete(outcomes.len(), failed, elapsed);

        RunReport {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            scenario: ScenarioSummary {
                id: scenario.id.clone(),
                name: scenario.name.clone(),
                student_count: scenario.students.len(),
                event_count: scenario.events.len(),
            },
            outcomes,
            matches,
            tutors: market.tutors().into_iter().map(TutorSummary::from).collect(),
            platform_revenue_cents: market.platform_revenue(),
            duration_ms: elapsed.as_millis() as u64,
        }
    }
}

#[derive(Default)]
struct Applied {
    detail: Option<String>,
    /// Set for help requests: the matched tutor's email, if any.
    matched: Option<Option<String>>,
}

impl Applied {
    fn detail(detail: String) -> Self {
        Self {
            detail: Some(detail),
            matched: None,
        }
    }
}

fn apply_event(market: &mut Marketplace, event: &ScenarioEvent) -> crate::error::Result<Applied> {
    match event {
        ScenarioEvent::Promote {
            registration_id,
            subject,
            proficiency,
        } => {
            market.make_tutor(registration_id, subject, *proficiency)?;
            Ok(Applied::default())
        }
        ScenarioEvent::Slot { email, time, day } => {
            market.register_slot(email, time, day)?;
            Ok(Applied::default())
        }
        ScenarioEvent::Location { email, location } => {
            market.register_location(email, location)?;
            Ok(Applied::default())
        }
        ScenarioEvent::Rate { email, score } => {
            let tier = market.rate_tutor(email, *score)?;
            let rating = market.tutor_rating(email)?;
            Ok(Applied::detail(format!("rating {rating:.2}, tier {tier}")))
        }
        ScenarioEvent::Donate { email, amount } => {
            let receipt = market.donate(email, *amount)?;
            Ok(Applied::detail(format!(
                "tutor {} / platform {}",
                receipt.tutor_share, receipt.platform_share
            )))
        }
        ScenarioEvent::Satisfaction {
            registration_id,
            score,
        } => {
            market.set_student_satisfaction(registration_id, *score)?;
            Ok(Applied::default())
        }
        ScenarioEvent::Order { directory, by } => {
            match directory {
                ListingKind::Students => market.configure_student_order(*by)?,
                ListingKind::Tutors => market.configure_tutor_order(*by)?,
            }
            Ok(Applied::default())
        }
        ScenarioEvent::RequestInPerson { .. } | ScenarioEvent::RequestOnline { .. } => {
            let Some(request) = event.help_request() else {
                return Ok(Applied::default());
            };
            let tutor = market.find_tutor(&request)?.map(|t| t.email().to_string());
            Ok(Applied {
                detail: Some(match &tutor {
                    Some(email) => format!("matched {email}"),
                    None => "no tutor available".to_string(),
                }),
                matched: Some(tutor),
            })
        }
    }
}
