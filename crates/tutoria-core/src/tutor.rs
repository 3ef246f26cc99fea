//! Tutor profiles.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::{Slot, Student};
use crate::reputation::{Reputation, Tier};
use crate::validation::{require_in_range, require_non_blank, require_non_negative};

/// Lowest and highest subject proficiency.
pub const MIN_PROFICIENCY: u8 = 1;
pub const MAX_PROFICIENCY: u8 = 5;

/// A student promoted to tutor.
///
/// The profile shares the student record through an `Arc` and delegates every
/// identity field to it. It always teaches at least one subject.
#[derive(Debug, Clone)]
pub struct TutorProfile {
    student: Arc<Student>,
    subjects: HashMap<String, u8>,
    reputation: Reputation,
    schedule: HashSet<Slot>,
    locations: HashSet<String>,
    balance: i64,
}

impl TutorProfile {
    /// Promote `student` to tutor of `subject`.
    pub fn new(student: Arc<Student>, subject: &str, proficiency: u8) -> Result<Self> {
        validate_subject(subject, proficiency)?;

        let mut subjects = HashMap::new();
        subjects.insert(subject.to_string(), proficiency);

        Ok(Self {
            student,
            subjects,
            reputation: Reputation::default(),
            schedule: HashSet::new(),
            locations: HashSet::new(),
            balance: 0,
        })
    }

    /// The wrapped student record.
    pub fn student(&self) -> &Arc<Student> {
        &self.student
    }

    pub fn registration_id(&self) -> &str {
        self.student.registration_id()
    }

    pub fn name(&self) -> &str {
        self.student.name()
    }

    pub fn phone(&self) -> &str {
        self.student.phone()
    }

    pub fn email(&self) -> &str {
        self.student.email()
    }

    pub fn course_code(&self) -> u32 {
        self.student.course_code()
    }

    /// Add a subject; fails if the tutor already teaches it.
    pub fn add_subject(&mut self, subject: &str, proficiency: u8) -> Result<()> {
        validate_subject(subject, proficiency)?;
        if self.teaches(subject) {
            return Err(Error::invalid_argument(format!(
                "already tutors this subject: {subject}"
            )));
        }
        self.subjects.insert(subject.to_string(), proficiency);
        Ok(())
    }

    pub fn teaches(&self, subject: &str) -> bool {
        self.subjects.contains_key(subject)
    }

    pub fn proficiency(&self, subject: &str) -> Option<u8> {
        self.subjects.get(subject).copied()
    }

    /// Subjects with their proficiency, sorted by subject name.
    pub fn subjects(&self) -> Vec<(&str, u8)> {
        let mut subjects: Vec<(&str, u8)> = self
            .subjects
            .iter()
            .map(|(name, level)| (name.as_str(), *level))
            .collect();
        subjects.sort_unstable();
        subjects
    }

    /// Register an attendance slot. Registering the same slot twice is a no-op.
    pub fn add_slot(&mut self, time: &str, day: &str) -> Result<()> {
        let slot = Slot::new(time, day)?;
        self.schedule.insert(slot);
        Ok(())
    }

    /// Register an attendance location. Registering it twice is a no-op.
    pub fn add_location(&mut self, location: &str) -> Result<()> {
        require_non_blank(location, "location cannot be blank")?;
        self.locations.insert(location.to_string());
        Ok(())
    }

    /// Whether the tutor attends at `time` on `day`.
    pub fn has_slot(&self, time: &str, day: &str) -> Result<bool> {
        Ok(self.offers_slot(&Slot::new(time, day)?))
    }

    /// Whether the tutor attends at `location`.
    pub fn has_location(&self, location: &str) -> Result<bool> {
        require_non_blank(location, "location cannot be blank")?;
        Ok(self.offers_location(location))
    }

    pub(crate) fn offers_slot(&self, slot: &Slot) -> bool {
        self.schedule.contains(slot)
    }

    pub(crate) fn offers_location(&self, location: &str) -> bool {
        self.locations.contains(location)
    }

    pub fn schedule(&self) -> impl Iterator<Item = &Slot> {
        self.schedule.iter()
    }

    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.locations.iter().map(String::as_str)
    }

    pub fn rating(&self) -> f64 {
        self.reputation.rating()
    }

    pub fn tier(&self) -> Tier {
        self.reputation.tier()
    }

    /// Fold a session score into the tutor's reputation.
    pub fn record_rating(&mut self, score: u8) -> Result<Tier> {
        let tier = self.reputation.record(score)?;
        tracing::debug!(
            email = self.email(),
            score,
            rating = self.rating(),
            %tier,
            "rating recorded"
        );
        Ok(tier)
    }

    /// Accrued donation credit in minor units.
    pub fn balance(&self) -> i64 {
        self.balance
    }

    /// Balance after crediting `amount`, or `None` on overflow.
    pub(crate) fn balance_after(&self, amount: i64) -> Option<i64> {
        self.balance.checked_add(amount)
    }

    pub(crate) fn credit(&mut self, amount: i64) -> Result<()> {
        require_non_negative(amount, "credit cannot be negative")?;
        self.balance = self
            .balance_after(amount)
            .ok_or_else(|| Error::invalid_argument("tutor balance overflow"))?;
        Ok(())
    }
}

impl fmt::Display for TutorProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.student, f)
    }
}

fn validate_subject(subject: &str, proficiency: u8) -> Result<()> {
    require_non_blank(subject, "subject cannot be blank")?;
    require_in_range(
        proficiency,
        MIN_PROFICIENCY,
        MAX_PROFICIENCY,
        "proficiency out of range",
    )?;
    Ok(())
}
