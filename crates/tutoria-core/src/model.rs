//! Core data model types for tutoria.
//!
//! Students, attendance slots and the closed set of attributes that callers
//! use to pick listing orders and read student fields.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::validation::{require_email, require_in_range, require_non_blank, require_positive};

/// Satisfaction score every student starts with.
pub const DEFAULT_SATISFACTION: u8 = 5;

/// A registered student.
///
/// Identity fields never change after registration. The satisfaction score is
/// the only mutable field and is kept in an atomic so a shared handle can
/// update it without exclusive access.
#[derive(Debug)]
pub struct Student {
    registration_id: String,
    name: String,
    phone: String,
    email: String,
    course_code: u32,
    satisfaction: AtomicU8,
}

impl Student {
    /// Validate and build a student. `phone` may be empty.
    pub fn new(
        registration_id: &str,
        name: &str,
        course_code: u32,
        phone: &str,
        email: &str,
    ) -> Result<Self> {
        require_non_blank(registration_id, "registration id cannot be blank")?;
        require_non_blank(name, "name cannot be blank")?;
        require_email(email, "invalid email")?;
        require_positive(i64::from(course_code), "course code must be positive")?;

        Ok(Self {
            registration_id: registration_id.to_string(),
            name: name.to_string(),
            phone: phone.trim().to_string(),
            email: email.to_string(),
            course_code,
            satisfaction: AtomicU8::new(DEFAULT_SATISFACTION),
        })
    }

    pub fn registration_id(&self) -> &str {
        &self.registration_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn course_code(&self) -> u32 {
        self.course_code
    }

    pub fn satisfaction(&self) -> u8 {
        self.satisfaction.load(Ordering::Relaxed)
    }

    /// Set the satisfaction score (1–5).
    pub fn set_satisfaction(&self, score: u8) -> Result<()> {
        require_in_range(score, 1, 5, "satisfaction score out of range")?;
        self.satisfaction.store(score, Ordering::Relaxed);
        Ok(())
    }
}

impl PartialEq for Student {
    fn eq(&self, other: &Self) -> bool {
        self.email == other.email && self.registration_id == other.registration_id
    }
}

impl Eq for Student {}

impl Hash for Student {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.email.hash(state);
        self.registration_id.hash(state);
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {} - ",
            self.registration_id, self.name, self.course_code
        )?;
        if !self.phone.is_empty() {
            write!(f, "{} - ", self.phone)?;
        }
        write!(f, "{}", self.email)
    }
}

/// A (day, time) attendance slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub day: String,
    pub time: String,
}

impl Slot {
    pub fn new(time: &str, day: &str) -> Result<Self> {
        require_non_blank(time, "time cannot be blank")?;
        require_non_blank(day, "day cannot be blank")?;
        Ok(Self {
            day: day.to_string(),
            time: time.to_string(),
        })
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day, self.time)
    }
}

/// Named attributes a caller can select by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Name,
    Phone,
    Email,
    RegistrationId,
    Subject,
    Location,
    Schedule,
    Day,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Name => write!(f, "name"),
            Attribute::Phone => write!(f, "phone"),
            Attribute::Email => write!(f, "email"),
            Attribute::RegistrationId => write!(f, "registration_id"),
            Attribute::Subject => write!(f, "subject"),
            Attribute::Location => write!(f, "location"),
            Attribute::Schedule => write!(f, "schedule"),
            Attribute::Day => write!(f, "day"),
        }
    }
}

impl FromStr for Attribute {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(Attribute::Name),
            "phone" => Ok(Attribute::Phone),
            "email" => Ok(Attribute::Email),
            "registration_id" | "registrationid" | "registration" | "id" => {
                Ok(Attribute::RegistrationId)
            }
            "subject" => Ok(Attribute::Subject),
            "location" => Ok(Attribute::Location),
            "schedule" => Ok(Attribute::Schedule),
            "day" => Ok(Attribute::Day),
            other => Err(Error::invalid_argument(format!("unknown attribute: {other}"))),
        }
    }
}

/// The attributes a listing can be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    #[default]
    Name,
    Email,
    RegistrationId,
}

impl TryFrom<Attribute> for OrderBy {
    type Error = Error;

    fn try_from(attribute: Attribute) -> Result<Self> {
        match attribute {
            Attribute::Name => Ok(OrderBy::Name),
            Attribute::Email => Ok(OrderBy::Email),
            Attribute::RegistrationId => Ok(OrderBy::RegistrationId),
            other => Err(Error::invalid_argument(format!(
                "invalid order: cannot order by {other}"
            ))),
        }
    }
}

impl FromStr for OrderBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        OrderBy::try_from(s.parse::<Attribute>()?)
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBy::Name => write!(f, "name"),
            OrderBy::Email => write!(f, "email"),
            OrderBy::RegistrationId => write!(f, "registration_id"),
        }
    }
}
