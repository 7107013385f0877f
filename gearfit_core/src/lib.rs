#![forbid(unsafe_code)]

//! Core domain model and rule engine for the Gearfit system.
//!
//! This crate provides:
//! - Domain types (equipment sources, questions, exercises)
//! - Equipment resolution into a canonical set
//! - The location-conditioned equipment questionnaire
//! - Exercise eligibility matching with equivalence classes
//! - Catalog, configuration and profile handling for hosts

pub mod types;
pub mod error;
pub mod equivalence;
pub mod resolver;
pub mod questionnaire;
pub mod matcher;
pub mod catalog;
pub mod config;
pub mod profile;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use equivalence::EquivalenceClasses;
pub use resolver::resolve;
pub use questionnaire::{aggregate_equipment, next, QuestionFlow, Questionnaire, QuestionnaireOutcome};
pub use matcher::{check_eligibility, filter_eligible, is_eligible, Eligibility};
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
