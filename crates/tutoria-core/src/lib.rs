//! tutoria-core: tutor marketplace domain. Students, tutors, matching,
//! reputation and donations.
//!
//! This crate defines the data model, the marketplace facade, and the
//! scenario engine that the store and CLI crates build on.

pub mod config;
pub mod directory;
pub mod donation;
pub mod engine;
pub mod error;
pub mod marketplace;
pub mod matching;
pub mod model;
pub mod report;
pub mod reputation;
pub mod scenario;
pub mod traits;
pub mod tutor;
pub mod validation;
