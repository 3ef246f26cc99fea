//! Tutor matching for help requests.
//!
//! Matching is a pure query over the tutor directory: hard constraints filter
//! the candidate set, then the best-match comparator ranks the survivors.
//! An empty survivor set is a normal outcome, not an error.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::directory::TutorDirectory;
use crate::error::Result;
use crate::model::Slot;
use crate::tutor::TutorProfile;
use crate::validation::require_non_blank;

/// A request for help with a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum HelpRequest {
    InPerson {
        subject: String,
        time: String,
        day: String,
        location: String,
    },
    Online {
        subject: String,
    },
}

impl HelpRequest {
    pub fn subject(&self) -> &str {
        match self {
            HelpRequest::InPerson { subject, .. } | HelpRequest::Online { subject } => subject,
        }
    }

    /// Find the best tutor for this request in `tutors`.
    pub fn find_tutor<'a>(&self, tutors: &'a TutorDirectory) -> Result<Option<&'a TutorProfile>> {
        match self {
            HelpRequest::InPerson {
                subject,
                time,
                day,
                location,
            } => find_tutor_for_in_person_request(tutors, subject, time, day, location),
            HelpRequest::Online { subject } => find_tutor_for_online_request(tutors, subject),
        }
    }
}

impl fmt::Display for HelpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HelpRequest::InPerson {
                subject,
                time,
                day,
                location,
            } => write!(f, "in person: {subject} on {day} at {time} in {location}"),
            HelpRequest::Online { subject } => write!(f, "online: {subject}"),
        }
    }
}

/// Best-match ordering: higher rating first, then lower registration id.
///
/// Registration ids are compared as strings, so `"10"` sorts before `"9"`.
/// The fallback makes ranking independent of directory iteration order.
pub fn best_match(a: &TutorProfile, b: &TutorProfile) -> Ordering {
    b.rating()
        .total_cmp(&a.rating())
        .then_with(|| a.registration_id().cmp(b.registration_id()))
}

/// Tutors teaching `subject` at `day`/`time` in `location`, best match first.
pub fn rank_in_person_candidates<'a>(
    tutors: &'a TutorDirectory,
    subject: &str,
    time: &str,
    day: &str,
    location: &str,
) -> Result<Vec<&'a TutorProfile>> {
    require_non_blank(subject, "subject cannot be blank")?;
    require_non_blank(location, "location cannot be blank")?;
    let slot = Slot::new(time, day)?;

    let mut candidates: Vec<&TutorProfile> = tutors
        .values()
        .filter(|t| t.teaches(subject))
        .filter(|t| t.offers_slot(&slot))
        .filter(|t| t.offers_location(location))
        .collect();
    candidates.sort_by(|a, b| best_match(a, b));
    Ok(candidates)
}

/// Tutors teaching `subject`, best match first.
pub fn rank_online_candidates<'a>(
    tutors: &'a TutorDirectory,
    subject: &str,
) -> Result<Vec<&'a TutorProfile>> {
    require_non_blank(subject, "subject cannot be blank")?;

    let mut candidates: Vec<&TutorProfile> =
        tutors.values().filter(|t| t.teaches(subject)).collect();
    candidates.sort_by(|a, b| best_match(a, b));
    Ok(candidates)
}

/// The best tutor for an in-person request, or `None` if nobody qualifies.
pub fn find_tutor_for_in_person_request<'a>(
    tutors: &'a TutorDirectory,
    subject: &str,
    time: &str,
    day: &str,
    location: &str,
) -> Result<Option<&'a TutorProfile>> {
    let ranked = rank_in_person_candidates(tutors, subject, time, day, location)?;
    let best = ranked.first().copied();
    tracing::debug!(
        subject,
        day,
        time,
        location,
        candidates = ranked.len(),
        tutor = ?best.map(|t| t.email()),
        "in-person match"
    );
    Ok(best)
}

/// The best tutor for an online request, or `None` if nobody qualifies.
pub fn find_tutor_for_online_request<'a>(
    tutors: &'a TutorDirectory,
    subject: &str,
) -> Result<Option<&'a TutorProfile>> {
    let ranked = rank_online_candidates(tutors, subject)?;
    let best = ranked.first().copied();
    tracing::debug!(
        subject,
        candidates = ranked.len(),
        tutor = ?best.map(|t| t.email()),
        "online match"
    );
    Ok(best)
}
