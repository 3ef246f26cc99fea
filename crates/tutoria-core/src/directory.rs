//! Keyed registries of students and tutors.
//!
//! A directory enforces key uniqueness and renders its entries in the order
//! picked by an [`OrderBy`]. Every order breaks ties by registration id so a
//! listing never depends on map iteration order.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::{Attribute, OrderBy, Student};
use crate::tutor::TutorProfile;

/// Identity fields a directory can order entries by.
pub trait Listed {
    fn registration_id(&self) -> &str;
    fn name(&self) -> &str;
    fn email(&self) -> &str;
}

impl Listed for Student {
    fn registration_id(&self) -> &str {
        Student::registration_id(self)
    }

    fn name(&self) -> &str {
        Student::name(self)
    }

    fn email(&self) -> &str {
        Student::email(self)
    }
}

impl Listed for TutorProfile {
    fn registration_id(&self) -> &str {
        TutorProfile::registration_id(self)
    }

    fn name(&self) -> &str {
        TutorProfile::name(self)
    }

    fn email(&self) -> &str {
        TutorProfile::email(self)
    }
}

impl<T: Listed + ?Sized> Listed for Arc<T> {
    fn registration_id(&self) -> &str {
        (**self).registration_id()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn email(&self) -> &str {
        (**self).email()
    }
}

/// Compare two entries by `order`, falling back to registration id.
/// Registration ids compare lexicographically, never numerically.
pub fn compare<T: Listed + ?Sized>(order: OrderBy, a: &T, b: &T) -> Ordering {
    let primary = match order {
        OrderBy::Name => a.name().cmp(b.name()),
        OrderBy::Email => a.email().cmp(b.email()),
        OrderBy::RegistrationId => Ordering::Equal,
    };
    primary.then_with(|| a.registration_id().cmp(b.registration_id()))
}

/// Join rendered entries the way saved listings expect.
pub fn render_listing<T: Display>(entries: &[&T]) -> String {
    entries
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A keyed registry.
#[derive(Debug, Clone)]
pub struct Directory<T> {
    label: &'static str,
    entries: HashMap<String, T>,
    order: OrderBy,
}

/// Students keyed by registration id.
pub type StudentDirectory = Directory<Arc<Student>>;

/// Tutor profiles keyed by email.
pub type TutorDirectory = Directory<TutorProfile>;

impl<T: Listed> Directory<T> {
    /// `label` names the entry kind in error messages ("student", "tutor").
    pub fn new(label: &'static str, order: OrderBy) -> Self {
        Self {
            label,
            entries: HashMap::new(),
            order,
        }
    }

    pub fn register(&mut self, key: &str, entry: T) -> Result<()> {
        if self.entries.contains_key(key) {
            return Err(Error::already_exists(format!(
                "{} already registered",
                self.label
            )));
        }
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<&T> {
        self.entries
            .get(key)
            .ok_or_else(|| Error::not_found(format!("{} not registered", self.label)))
    }

    pub fn get_mut(&mut self, key: &str) -> Result<&mut T> {
        let label = self.label;
        self.entries
            .get_mut(key)
            .ok_or_else(|| Error::not_found(format!("{label} not registered")))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in no particular order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn order(&self) -> OrderBy {
        self.order
    }

    /// Switch the listing order. Only name, email and registration id are
    /// accepted.
    pub fn configure_order(&mut self, attribute: Attribute) -> Result<()> {
        self.order = OrderBy::try_from(attribute)?;
        tracing::debug!(directory = self.label, order = %self.order, "listing order changed");
        Ok(())
    }

    /// Entries in the configured order.
    pub fn list(&self) -> Vec<&T> {
        self.list_by(self.order)
    }

    /// Entries in an explicit order.
    pub fn list_by(&self, order: OrderBy) -> Vec<&T> {
        let mut listed: Vec<&T> = self.entries.values().collect();
        listed.sort_by(|a, b| compare(order, *a, *b));
        listed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: Listed + Display> Directory<T> {
    /// The configured listing as text.
    pub fn render(&self) -> String {
        render_listing(&self.list())
    }
}
