//! Incremental tutor reputation.
//!
//! A tutor's rating is a weighted moving average: the current rating counts
//! as [`HISTORY_WEIGHT`] prior observations and each new score as one more.
//! The tier is a pure function of the rating and is re-derived on every read.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::validation::require_in_range;

/// Rating every new tutor starts with.
pub const INITIAL_RATING: f64 = 4.0;

/// Number of prior observations the current rating stands for.
pub const HISTORY_WEIGHT: f64 = 5.0;

/// Highest rating that is still Apprentice.
pub const APPRENTICE_CEILING: f64 = 3.0;

/// Highest rating that is still Tutor.
pub const TUTOR_CEILING: f64 = 4.5;

/// Lowest and highest score a session may receive.
pub const MIN_SCORE: u8 = 0;
pub const MAX_SCORE: u8 = 5;

/// Reputation tier derived from a rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Apprentice,
    Tutor,
    Top,
}

impl Tier {
    /// Apprentice up to 3.0, Tutor up to 4.5, Top above.
    pub fn from_rating(rating: f64) -> Self {
        if rating <= APPRENTICE_CEILING {
            Tier::Apprentice
        } else if rating <= TUTOR_CEILING {
            Tier::Tutor
        } else {
            Tier::Top
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Apprentice => write!(f, "Apprentice"),
            Tier::Tutor => write!(f, "Tutor"),
            Tier::Top => write!(f, "Top"),
        }
    }
}

/// The mutable half of a tutor's reputation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reputation {
    rating: f64,
}

impl Default for Reputation {
    fn default() -> Self {
        Self {
            rating: INITIAL_RATING,
        }
    }
}

impl Reputation {
    pub fn rating(&self) -> f64 {
        self.rating
    }

    pub fn tier(&self) -> Tier {
        Tier::from_rating(self.rating)
    }

    /// Fold a session score into the rating and return the resulting tier.
    pub fn record(&mut self, score: u8) -> Result<Tier> {
        require_in_range(score, MIN_SCORE, MAX_SCORE, "rating score out of range")?;
        self.rating = (self.rating * HISTORY_WEIGHT + f64::from(score)) / (HISTORY_WEIGHT + 1.0);
        Ok(self.tier())
    }
}
