//! TOML scenario parser.
//!
//! A scenario declares students and a sequence of marketplace events to replay
//! against a fresh marketplace. Scenarios are loaded from files or directories
//! and can be validated before they are run.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::matching::HelpRequest;
use crate::model::Attribute;
use crate::traits::ListingKind;

/// A parsed scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub description: String,
    pub students: Vec<StudentSpec>,
    pub events: Vec<ScenarioEvent>,
}

/// A student to register before any event runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSpec {
    pub registration_id: String,
    pub name: String,
    pub course_code: u32,
    #[serde(default)]
    pub phone: String,
    pub email: String,
}

/// One marketplace operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioEvent {
    Promote {
        registration_id: String,
        subject: String,
        proficiency: u8,
    },
    Slot {
        email: String,
        time: String,
        day: String,
    },
    Location {
        email: String,
        location: String,
    },
    Rate {
        email: String,
        score: u8,
    },
    /// `amount` is in minor currency units.
    Donate {
        email: String,
        amount: i64,
    },
    Satisfaction {
        registration_id: String,
        score: u8,
    },
    Order {
        directory: ListingKind,
        by: Attribute,
    },
    RequestInPerson {
        subject: String,
        time: String,
        day: String,
        location: String,
    },
    RequestOnline {
        subject: String,
    },
}

impl ScenarioEvent {
    /// The help request this event issues, if it is a request.
    pub fn help_request(&self) -> Option<HelpRequest> {
        match self {
            ScenarioEvent::RequestInPerson {
                subject,
                time,
                day,
                location,
            } => Some(HelpRequest::InPerson {
                subject: subject.clone(),
                time: time.clone(),
                day: day.clone(),
                location: location.clone(),
            }),
            ScenarioEvent::RequestOnline { subject } => Some(HelpRequest::Online {
                subject: subject.clone(),
            }),
            _ => None,
        }
    }

    /// Short event kind, as written in the `type` key.
    pub fn kind(&self) -> &'static str {
        match self {
            ScenarioEvent::Promote { .. } => "promote",
            ScenarioEvent::Slot { .. } => "slot",
            ScenarioEvent::Location { .. } => "location",
            ScenarioEvent::Rate { .. } => "rate",
            ScenarioEvent::Donate { .. } => "donate",
            ScenarioEvent::Satisfaction { .. } => "satisfaction",
            ScenarioEvent::Order { .. } => "order",
            ScenarioEvent::RequestInPerson { .. } => "request_in_person",
            ScenarioEvent::RequestOnline { .. } => "request_online",
        }
    }
}

impl fmt::Display for ScenarioEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioEvent::Promote {
                registration_id,
                subject,
                proficiency,
            } => write!(f, "promote {registration_id} to tutor of {subject} ({proficiency})"),
            ScenarioEvent::Slot { email, time, day } => write!(f, "slot {email} {day} {time}"),
            ScenarioEvent::Location { email, location } => {
                write!(f, "location {email} {location}")
            }
            ScenarioEvent::Rate { email, score } => write!(f, "rate {email} {score}"),
            ScenarioEvent::Donate { email, amount } => write!(f, "donate {amount} to {email}"),
            ScenarioEvent::Satisfaction {
                registration_id,
                score,
            } => write!(f, "satisfaction {registration_id} {score}"),
            ScenarioEvent::Order { directory, by } => write!(f, "order {directory} by {by}"),
            ScenarioEvent::RequestInPerson { .. } | ScenarioEvent::RequestOnline { .. } => {
                match self.help_request() {
                    Some(request) => write!(f, "request {request}"),
                    None => Ok(()),
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct TomlScenarioFile {
    scenario: TomlScenarioHeader,
    #[serde(default)]
    students: Vec<StudentSpec>,
    #[serde(default)]
    events: Vec<ScenarioEvent>,
}

#[derive(Debug, Deserialize)]
struct TomlScenarioHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

/// Parse a single TOML file into a `Scenario`.
pub fn parse_scenario(path: &Path) -> Result<Scenario> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario file: {}", path.display()))?;

    parse_scenario_str(&content, path)
}

/// Parse a TOML string into a `Scenario`.
pub fn parse_scenario_str(content: &str, source_path: &Path) -> Result<Scenario> {
    let parsed: TomlScenarioFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    Ok(Scenario {
        id: parsed.scenario.id,
        name: parsed.scenario.name,
        description: parsed.scenario.description,
        students: parsed.students,
        events: parsed.events,
    })
}

/// Recursively load all `.toml` scenario files from a directory.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_scenario_directory(dir: &Path) -> Result<Vec<Scenario>> {
    let mut scenarios = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            scenarios.extend(load_scenario_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_scenario(&path) {
                Ok(scenario) => scenarios.push(scenario),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(scenarios)
}

/// A warning from scenario validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioWarning {
    /// Zero-based event index, when the warning concerns one event.
    pub event_index: Option<usize>,
    pub message: String,
}

impl fmt::Display for ScenarioWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.event_index {
            Some(index) => write!(f, "event #{}: {}", index + 1, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Check a scenario for issues that would make events fail at run time.
pub fn validate_scenario(scenario: &Scenario) -> Vec<ScenarioWarning> {
    let mut warnings = Vec::new();

    if scenario.events.is_empty() {
        warnings.push(ScenarioWarning {
            event_index: None,
            message: "scenario has no events".into(),
        });
    }

    let mut ids = HashSet::new();
    let mut emails = HashSet::new();
    for student in &scenario.students {
        if !ids.insert(student.registration_id.as_str()) {
            warnings.push(ScenarioWarning {
                event_index: None,
                message: format!("duplicate registration id: {}", student.registration_id),
            });
        }
        if !emails.insert(student.email.as_str()) {
            warnings.push(ScenarioWarning {
                event_index: None,
                message: format!("duplicate email: {}", student.email),
            });
        }
    }

    // Emails of students promoted so far, in event order.
    let mut tutors: HashSet<&str> = HashSet::new();
    for (index, event) in scenario.events.iter().enumerate() {
        let mut warn = |message: String| {
            warnings.push(ScenarioWarning {
                event_index: Some(index),
                message,
            })
        };

        match event {
            ScenarioEvent::Promote {
                registration_id, ..
            } => match scenario
                .students
                .iter()
                .find(|s| &s.registration_id == registration_id)
            {
                Some(student) => {
                    tutors.insert(student.email.as_str());
                }
                None => warn(format!("unknown student: {registration_id}")),
            },
            ScenarioEvent::Satisfaction {
                registration_id, ..
            } => {
                if !ids.contains(registration_id.as_str()) {
                    warn(format!("unknown student: {registration_id}"));
                }
            }
            ScenarioEvent::Slot { email, .. }
            | ScenarioEvent::Location { email, .. }
            | ScenarioEvent::Rate { email, .. }
            | ScenarioEvent::Donate { email, .. } => {
                if !emails.contains(email.as_str()) {
                    warn(format!("unknown email: {email}"));
                } else if !tutors.contains(email.as_str()) {
                    warn(format!("{email} is not a tutor at this point"));
                }
            }
            ScenarioEvent::Order { .. }
            | ScenarioEvent::RequestInPerson { .. }
            | ScenarioEvent::RequestOnline { .. } => {}
        }
    }

    warnings
}
