//! The marketplace facade.
//!
//! Owns the student and tutor directories plus the donation splitter, and
//! exposes every operation the outer surfaces (scenario engine, CLI) need.
//! Failures from the inner components are wrapped with the operation that was
//! in progress; the error kind is always preserved.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::TutoriaConfig;
use crate::directory::{StudentDirectory, TutorDirectory};
use crate::donation::{DonationReceipt, DonationSplitter};
use crate::error::{Error, Result, ResultExt};
use crate::matching::{self, HelpRequest};
use crate::model::{Attribute, Student};
use crate::reputation::Tier;
use crate::traits::{ListingKind, ListingStore};
use crate::tutor::TutorProfile;
use crate::validation::{require_email, require_non_blank, require_present};

/// Rendered listings read back from a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listings {
    pub students: String,
    pub tutors: String,
}

pub struct Marketplace {
    students: StudentDirectory,
    /// Email -> registration id of every registered student.
    student_emails: HashMap<String, String>,
    tutors: TutorDirectory,
    splitter: DonationSplitter,
}

impl Marketplace {
    pub fn new(config: &TutoriaConfig) -> Result<Self> {
        let splitter =
            DonationSplitter::new(config.fees).context("error configuring donation fees")?;
        Ok(Self {
            students: StudentDirectory::new("student", config.default_order),
            student_emails: HashMap::new(),
            tutors: TutorDirectory::new("tutor", config.default_order),
            splitter,
        })
    }

    // --- students ---

    pub fn register_student(
        &mut self,
        registration_id: &str,
        name: &str,
        course_code: u32,
        phone: &str,
        email: &str,
    ) -> Result<()> {
        let student = Student::new(registration_id, name, course_code, phone, email)
            .context("error registering student")?;
        if let Some(owner) = self.student_emails.get(email) {
            return Err(Error::already_exists(format!(
                "error registering student: email already registered to {owner}"
            )));
        }
        self.students
            .register(registration_id, Arc::new(student))
            .context("error registering student")?;
        self.student_emails
            .insert(email.to_string(), registration_id.to_string());
        tracing::debug!(registration_id, email, "student registered");
        Ok(())
    }

    pub fn student(&self, registration_id: &str) -> Result<Arc<Student>> {
        require_non_blank(registration_id, "registration id cannot be blank")
            .context("error looking up student")?;
        self.students
            .get(registration_id)
            .map(Arc::clone)
            .context("error looking up student")
    }

    /// A single text attribute of a student. Only name, phone and email are
    /// readable this way.
    pub fn student_info(&self, registration_id: &str, attribute: Attribute) -> Result<String> {
        let student = self
            .student(registration_id)
            .context("error reading student info")?;
        match attribute {
            Attribute::Name => Ok(student.name().to_string()),
            Attribute::Phone => Ok(student.phone().to_string()),
            Attribute::Email => Ok(student.email().to_string()),
            other => Err(Error::invalid_argument(format!(
                "error reading student info: unsupported attribute {other}"
            ))),
        }
    }

    pub fn set_student_satisfaction(&self, registration_id: &str, score: u8) -> Result<()> {
        let student = self
            .student(registration_id)
            .context("error rating student")?;
        student.set_satisfaction(score).context("error rating student")
    }

    pub fn list_students(&self) -> String {
        self.students.render()
    }

    pub fn configure_student_order(&mut self, attribute: Attribute) -> Result<()> {
        self.students
            .configure_order(attribute)
            .context("error ordering students")
    }

    // --- tutors ---

    /// Promote a registered student to tutor of `subject`. A student who
    /// already tutors gains the subject instead.
    pub fn make_tutor(&mut self, registration_id: &str, subject: &str, proficiency: u8) -> Result<()> {
        let student = self
            .student(registration_id)
            .context("error promoting student")?;
        self.promote(Some(student), subject, proficiency)
            .context("error promoting student")
    }

    fn promote(
        &mut self,
        student: Option<Arc<Student>>,
        subject: &str,
        proficiency: u8,
    ) -> Result<()> {
        let student = require_present(student, "student handle is missing")?;
        let email = student.email().to_string();

        if self.tutors.contains(&email) {
            self.tutors.get_mut(&email)?.add_subject(subject, proficiency)?;
            tracing::debug!(email = %email, subject, proficiency, "subject added");
            return Ok(());
        }

        let profile = TutorProfile::new(student, subject, proficiency)?;
        self.tutors.register(&email, profile)?;
        tracing::info!(email = %email, subject, proficiency, "student promoted to tutor");
        Ok(())
    }

    pub fn tutor(&self, email: &str) -> Result<&TutorProfile> {
        self.tutor_entry(email).context("error looking up tutor")
    }

    pub fn tutor_by_registration(&self, registration_id: &str) -> Result<&TutorProfile> {
        let student = self
            .student(registration_id)
            .context("error looking up tutor")?;
        self.tutors
            .get(student.email())
            .context("error looking up tutor")
    }

    fn tutor_entry(&self, email: &str) -> Result<&TutorProfile> {
        require_email(email, "invalid email")?;
        self.tutors.get(email)
    }

    fn tutor_entry_mut(&mut self, email: &str) -> Result<&mut TutorProfile> {
        require_email(email, "invalid email")?;
        self.tutors.get_mut(email)
    }

    pub fn list_tutors(&self) -> String {
        self.tutors.render()
    }

    pub fn configure_tutor_order(&mut self, attribute: Attribute) -> Result<()> {
        self.tutors
            .configure_order(attribute)
            .context("error ordering tutors")
    }

    /// Every tutor profile, in the configured listing order.
    pub fn tutors(&self) -> Vec<&TutorProfile> {
        self.tutors.list()
    }

    pub fn student_count(&self) -> usize {
        self.students.len()
    }

    pub fn tutor_count(&self) -> usize {
        self.tutors.len()
    }

    // --- availability ---

    pub fn register_slot(&mut self, email: &str, time: &str, day: &str) -> Result<()> {
        self.tutor_entry_mut(email)
            .and_then(|t| t.add_slot(time, day))
            .context("error registering schedule")
    }

    pub fn register_location(&mut self, email: &str, location: &str) -> Result<()> {
        self.tutor_entry_mut(email)
            .and_then(|t| t.add_location(location))
            .context("error registering location")
    }

    /// `false` for a well-formed email that belongs to no tutor.
    pub fn has_slot(&self, email: &str, time: &str, day: &str) -> Result<bool> {
        require_email(email, "invalid email").context("error checking schedule")?;
        match self.tutors.get(email) {
            Ok(tutor) => tutor.has_slot(time, day).context("error checking schedule"),
            Err(_) => Ok(false),
        }
    }

    /// `false` for a well-formed email that belongs to no tutor.
    pub fn has_location(&self, email: &str, location: &str) -> Result<bool> {
        require_email(email, "invalid email").context("error checking location")?;
        match self.tutors.get(email) {
            Ok(tutor) => tutor.has_location(location).context("error checking location"),
            Err(_) => Ok(false),
        }
    }

    // --- matching ---

    pub fn find_tutor_in_person(
        &self,
        subject: &str,
        time: &str,
        day: &str,
        location: &str,
    ) -> Result<Option<&TutorProfile>> {
        matching::find_tutor_for_in_person_request(&self.tutors, subject, time, day, location)
            .context("error requesting in-person help")
    }

    pub fn find_tutor_online(&self, subject: &str) -> Result<Option<&TutorProfile>> {
        matching::find_tutor_for_online_request(&self.tutors, subject)
            .context("error requesting online help")
    }

    pub fn find_tutor(&self, request: &HelpRequest) -> Result<Option<&TutorProfile>> {
        match request {
            HelpRequest::InPerson {
                subject,
                time,
                day,
                location,
            } => self.find_tutor_in_person(subject, time, day, location),
            HelpRequest::Online { subject } => self.find_tutor_online(subject),
        }
    }

    // --- reputation ---

    pub fn rate_tutor(&mut self, email: &str, score: u8) -> Result<Tier> {
        let tutor = self.tutor_entry_mut(email).context("error rating tutor")?;
        let before = tutor.tier();
        let after = tutor.record_rating(score).context("error rating tutor")?;
        if before != after {
            tracing::info!(email, from = %before, to = %after, "tutor tier changed");
        }
        Ok(after)
    }

    pub fn tutor_rating(&self, email: &str) -> Result<f64> {
        self.tutor_entry(email)
            .map(TutorProfile::rating)
            .context("error reading tutor rating")
    }

    pub fn tutor_tier(&self, email: &str) -> Result<Tier> {
        self.tutor_entry(email)
            .map(TutorProfile::tier)
            .context("error reading tutor tier")
    }

    // --- donations ---

    pub fn donate(&mut self, email: &str, total: i64) -> Result<DonationReceipt> {
        require_email(email, "invalid email").context("error donating")?;
        let tutor = self.tutors.get_mut(email).context("error donating")?;
        self.splitter.donate(tutor, total).context("error donating")
    }

    /// The share rate the tutor currently keeps.
    pub fn tutor_rate(&self, email: &str) -> Result<f64> {
        let tutor = self
            .tutor_entry(email)
            .context("error reading tutor rate")?;
        Ok(self.splitter.rate_for(tutor.tier()))
    }

    pub fn tutor_balance(&self, email: &str) -> Result<i64> {
        self.tutor_entry(email)
            .map(TutorProfile::balance)
            .context("error reading tutor balance")
    }

    pub fn platform_revenue(&self) -> i64 {
        self.splitter.revenue()
    }

    // --- persistence ---

    /// Write both rendered listings to `store`.
    pub fn save(&self, store: &dyn ListingStore) -> anyhow::Result<()> {
        use anyhow::Context;

        for kind in ListingKind::ALL {
            store
                .save(kind, &self.render(kind))
                .with_context(|| format!("error saving {kind} to {} store", store.name()))?;
        }
        tracing::info!(
            store = store.name(),
            students = self.students.len(),
            tutors = self.tutors.len(),
            "listings saved"
        );
        Ok(())
    }

    /// Read both listings back from `store`.
    pub fn load(&self, store: &dyn ListingStore) -> anyhow::Result<Listings> {
        use anyhow::Context;

        let students = store
            .load(ListingKind::Students)
            .with_context(|| format!("error loading students from {} store", store.name()))?;
        let tutors = store
            .load(ListingKind::Tutors)
            .with_context(|| format!("error loading tutors from {} store", store.name()))?;
        Ok(Listings { students, tutors })
    }

    /// Clear `store`, then drop every registration and reset revenue.
    ///
    /// In-memory state is only touched once the store has been cleared.
    pub fn clear(&mut self, store: &dyn ListingStore) -> anyhow::Result<()> {
        use anyhow::Context;

        for kind in ListingKind::ALL {
            store
                .clear(kind)
                .with_context(|| format!("error clearing {kind} in {} store", store.name()))?;
        }
        self.tutors.clear();
        self.students.clear();
        self.student_emails.clear();
        self.splitter.reset();
        tracing::info!(store = store.name(), "marketplace cleared");
        Ok(())
    }

    fn render(&self, kind: ListingKind) -> String {
        match kind {
            ListingKind::Students => self.list_students(),
            ListingKind::Tutors => self.list_tutors(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::error::ErrorKind;

    const GAUDS: &str = "gaudslindo99@gmail.com";

    #[derive(Default)]
    struct RecordingStore {
        listings: Mutex<HashMap<ListingKind, String>>,
        fail_clear: bool,
    }

    impl ListingStore for RecordingStore {
        fn name(&self) -> &str {
            "recording"
        }

        fn save(&self, kind: ListingKind, listing: &str) -> anyhow::Result<()> {
            self.listings.lock().unwrap().insert(kind, listing.to_string());
            Ok(())
        }

        fn load(&self, kind: ListingKind) -> anyhow::Result<String> {
            Ok(self
                .listings
                .lock()
                .unwrap()
                .get(&kind)
                .cloned()
                .unwrap_or_default())
        }

        fn clear(&self, kind: ListingKind) -> anyhow::Result<()> {
            if self.fail_clear {
                anyhow::bail!("disk unavailable");
            }
            self.listings.lock().unwrap().remove(&kind);
            Ok(())
        }
    }

    fn marketplace() -> Marketplace {
        let mut m = Marketplace::new(&TutoriaConfig::default()).unwrap();
        m.register_student("11715963", "Gauds Lindo", 1, "", GAUDS).unwrap();
        m.register_student("11715000", "Ana Clara", 1, "83 99999-0000", "ana@ccc.ufcg.edu.br")
            .unwrap();
        m.make_tutor("11715963", "P2", 5).unwrap();
        m
    }

    #[test]
    fn duplicate_student_is_already_exists() {
        let mut m = marketplace();
        let err = m
            .register_student("11715963", "Other", 1, "", "other@gmail.com")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(err.message(), "error registering student: student already registered");
    }

    #[test]
    fn shared_email_is_already_exists() {
        let mut m = marketplace();
        let err = m
            .register_student("22", "Bia", 1, "", "ana@ccc.ufcg.edu.br")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(
            err.message(),
            "error registering student: email already registered to 11715000"
        );
        assert_eq!(m.student_count(), 2);
        assert!(m.student("22").is_err());

        // The existing tutor keeps its own student record and subjects.
        m.make_tutor("11715000", "Calculo", 3).unwrap();
        let tutor = m.tutor_by_registration("11715000").unwrap();
        assert_eq!(tutor.name(), "Ana Clara");
        assert_eq!(tutor.subjects(), vec![("Calculo", 3)]);
    }

    #[test]
    fn cleared_emails_can_register_again() {
        let mut m = marketplace();
        m.clear(&RecordingStore::default()).unwrap();
        m.register_student("22", "Bia", 1, "", GAUDS).unwrap();
        assert_eq!(m.student("22").unwrap().email(), GAUDS);
    }

    #[test]
    fn student_info_reads_text_attributes() {
        let m = marketplace();
        assert_eq!(m.student_info("11715000", Attribute::Name).unwrap(), "Ana Clara");
        assert_eq!(m.student_info("11715000", Attribute::Phone).unwrap(), "83 99999-0000");
        assert_eq!(m.student_info("11715963", Attribute::Phone).unwrap(), "");
        let err = m.student_info("11715000", Attribute::Location).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = m.student_info("1", Attribute::Name).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn promoting_again_adds_a_subject() {
        let mut m = marketplace();
        m.make_tutor("11715963", "Calculo", 3).unwrap();
        let tutor = m.tutor(GAUDS).unwrap();
        assert_eq!(tutor.subjects(), vec![("Calculo", 3), ("P2", 5)]);
        assert_eq!(m.tutor_count(), 1);

        let err = m.make_tutor("11715963", "P2", 4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn promoting_unknown_student_is_not_found() {
        let mut m = marketplace();
        let err = m.make_tutor("404", "P2", 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.message().starts_with("error promoting student"));
    }

    #[test]
    fn missing_student_handle_is_null_reference() {
        let mut m = marketplace();
        let err = m.promote(None, "P2", 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NullReference);
    }

    #[test]
    fn tutor_shares_the_student_record() {
        let m = marketplace();
        m.set_student_satisfaction("11715963", 2).unwrap();
        let tutor = m.tutor_by_registration("11715963").unwrap();
        assert_eq!(tutor.student().satisfaction(), 2);
        assert!(Arc::ptr_eq(tutor.student(), &m.student("11715963").unwrap()));
    }

    #[test]
    fn availability_queries_do_not_fail_for_unknown_tutor() {
        let mut m = marketplace();
        m.register_slot(GAUDS, "10:00", "seg").unwrap();
        m.register_location(GAUDS, "LCC2").unwrap();

        assert!(m.has_slot(GAUDS, "10:00", "seg").unwrap());
        assert!(!m.has_slot(GAUDS, "12:00", "seg").unwrap());
        assert!(m.has_location(GAUDS, "LCC2").unwrap());
        assert!(!m.has_slot("nobody@gmail.com", "10:00", "seg").unwrap());
        assert!(!m.has_location("nobody@gmail.com", "LCC2").unwrap());

        let err = m.register_slot("nobody@gmail.com", "10:00", "seg").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = m.has_slot("not-an-email", "10:00", "seg").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn five_top_scores_reach_top_tier() {
        let mut m = marketplace();
        let mut tier = Tier::Tutor;
        for _ in 0..5 {
            tier = m.rate_tutor(GAUDS, 5).unwrap();
        }
        assert_eq!(tier, Tier::Top);
        assert_eq!(m.tutor_tier(GAUDS).unwrap(), Tier::Top);
        assert_eq!(m.tutor_rate(GAUDS).unwrap(), 0.90);
    }

    #[test]
    fn five_low_scores_drop_to_apprentice() {
        let mut m = marketplace();
        for _ in 0..5 {
            m.rate_tutor(GAUDS, 1).unwrap();
        }
        assert_eq!(m.tutor_tier(GAUDS).unwrap(), Tier::Apprentice);
        assert!(m.tutor_rating(GAUDS).unwrap() <= 3.0);
    }

    #[test]
    fn rating_unknown_tutor_keeps_kind() {
        let mut m = marketplace();
        let err = m.rate_tutor("nobody@gmail.com", 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message(), "error rating tutor: tutor not registered");
        let err = m.rate_tutor(GAUDS, 6).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn donation_updates_balance_and_revenue() {
        let mut m = marketplace();
        let receipt = m.donate(GAUDS, 1001).unwrap();
        assert_eq!(receipt.platform_share, 201);
        assert_eq!(m.tutor_balance(GAUDS).unwrap(), 800);
        assert_eq!(m.platform_revenue(), 201);

        assert!(m.donate(GAUDS, 0).is_err());
        assert_eq!(m.platform_revenue(), 201);
    }

    #[test]
    fn online_match_picks_best_rated() {
        let mut m = marketplace();
        m.make_tutor("11715000", "P2", 2).unwrap();
        m.rate_tutor("ana@ccc.ufcg.edu.br", 5).unwrap();
        let best = m.find_tutor_online("P2").unwrap().unwrap();
        assert_eq!(best.email(), "ana@ccc.ufcg.edu.br");
        assert!(m.find_tutor_online("Calculo").unwrap().is_none());
    }

    #[test]
    fn save_load_and_clear_round_trip_through_store() {
        let mut m = marketplace();
        m.donate(GAUDS, 100).unwrap();
        let store = RecordingStore::default();
        m.save(&store).unwrap();

        let listings = m.load(&store).unwrap();
        assert_eq!(listings.students, m.list_students());
        assert_eq!(listings.tutors, format!("11715963 - Gauds Lindo - 1 - {GAUDS}"));

        m.clear(&store).unwrap();
        assert_eq!(m.student_count(), 0);
        assert_eq!(m.tutor_count(), 0);
        assert_eq!(m.platform_revenue(), 0);
        assert_eq!(m.load(&store).unwrap(), Listings::default());
    }

    #[test]
    fn failed_store_clear_keeps_state() {
        let mut m = marketplace();
        m.donate(GAUDS, 100).unwrap();
        let store = RecordingStore {
            fail_clear: true,
            ..Default::default()
        };
        let err = m.clear(&store).unwrap_err();
        assert!(format!("{err:#}").contains("disk unavailable"));
        assert_eq!(m.student_count(), 2);
        assert_eq!(m.platform_revenue(), 20);
    }

    #[test]
    fn listing_order_is_configurable() {
        let mut m = marketplace();
        assert!(m.list_students().starts_with("11715000 - Ana Clara"));
        m.configure_student_order(Attribute::Email).unwrap();
        assert!(m.list_students().starts_with("11715000 - Ana Clara"));
        m.configure_student_order(Attribute::RegistrationId).unwrap();
        assert!(m.list_students().starts_with("11715000"));
        assert!(m.configure_tutor_order(Attribute::Day).is_err());
    }
}
