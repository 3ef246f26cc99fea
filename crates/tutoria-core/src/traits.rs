//! Persistence collaborator trait.
//!
//! Implemented by the `tutoria-store` crate. Stores see listings as opaque
//! text: whatever the directories render is saved and handed back verbatim.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which directory a listing belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Students,
    Tutors,
}

impl ListingKind {
    pub const ALL: [ListingKind; 2] = [ListingKind::Students, ListingKind::Tutors];
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingKind::Students => write!(f, "students"),
            ListingKind::Tutors => write!(f, "tutors"),
        }
    }
}

impl std::str::FromStr for ListingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "students" | "student" => Ok(ListingKind::Students),
            "tutors" | "tutor" => Ok(ListingKind::Tutors),
            other => Err(format!("unknown listing kind: {other}")),
        }
    }
}

/// Trait for backends that persist rendered listings.
pub trait ListingStore: Send + Sync {
    /// Human-readable store name (e.g. "file").
    fn name(&self) -> &str;

    /// Replace the saved listing for `kind`.
    fn save(&self, kind: ListingKind, listing: &str) -> anyhow::Result<()>;

    /// The saved listing for `kind`; empty when nothing was saved.
    fn load(&self, kind: ListingKind) -> anyhow::Result<String>;

    /// Drop the saved listing for `kind`.
    fn clear(&self, kind: ListingKind) -> anyhow::Result<()>;
}
