//! Vaccine distribution analytics.
//!
//! Ten derivations over the loaded schema, each taking an explicit store handle:
//! - `symptoms`: patient symptom view (stored as `patient_symptoms`) and top symptoms per gender.
//! - `dosing`: first and second dose per patient (stored as `patient_vaccine_info`).
//! - `demographics`: age groups, vaccination status, and status distribution per age group.
//! - `frequency`: symptom frequency classification per vaccine type.
//! - `reserve`: reserve-dose recommendation from event participation.
//! - `timeline`: cumulative first-dose and two-dose series.
//! - `contact`: contact tracing for a worker over a date window.
//!
//! `report::run_all` runs them in order and keeps one outcome per requirement.

pub mod contact;
pub mod demographics;
pub mod dosing;
pub mod error;
pub mod frequency;
pub mod helpers;
pub mod models;
pub mod report;
pub mod reserve;
pub mod symptoms;
pub mod timeline;

pub use crate::error::AnalyticsError;
pub use crate::models::{AnalyticsParams, ContactQuery, Requirement};
pub use crate::report::{AnalyticsReport, Outcome, RequirementOutput, run_all};
