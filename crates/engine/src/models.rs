use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// The ten fixed reporting requirements, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
pub enum Requirement {
    #[strum(to_string = "1 (patient symptoms)")]
    PatientSymptoms,
    #[strum(to_string = "2 (dose pairing)")]
    DosePairing,
    #[strum(to_string = "3 (top symptoms by gender)")]
    TopSymptoms,
    #[strum(to_string = "4 (age groups)")]
    AgeGroups,
    #[strum(to_string = "5 (vaccination status)")]
    VaccinationStatus,
    #[strum(to_string = "6 (status distribution)")]
    StatusDistribution,
    #[strum(to_string = "7 (symptom frequency)")]
    SymptomFrequency,
    #[strum(to_string = "8 (reserve doses)")]
    ReserveDoses,
    #[strum(to_string = "9 (cumulative vaccinations)")]
    CumulativeSeries,
    #[strum(to_string = "10 (contact tracing)")]
    ContactTracing,
}

impl Requirement {
    pub const ALL: [Requirement; 10] = [
        Requirement::PatientSymptoms,
        Requirement::DosePairing,
        Requirement::TopSymptoms,
        Requirement::AgeGroups,
        Requirement::VaccinationStatus,
        Requirement::StatusDistribution,
        Requirement::SymptomFrequency,
        Requirement::ReserveDoses,
        Requirement::CumulativeSeries,
        Requirement::ContactTracing,
    ];

    pub fn number(self) -> u8 {
        match self {
            Requirement::PatientSymptoms => 1,
            Requirement::DosePairing => 2,
            Requirement::TopSymptoms => 3,
            Requirement::AgeGroups => 4,
            Requirement::VaccinationStatus => 5,
            Requirement::StatusDistribution => 6,
            Requirement::SymptomFrequency => 7,
            Requirement::ReserveDoses => 8,
            Requirement::CumulativeSeries => 9,
            Requirement::ContactTracing => 10,
        }
    }

    /// The requirement whose output this one consumes, if any.
    pub fn prerequisite(self) -> Option<Requirement> {
        match self {
            Requirement::TopSymptoms => Some(Requirement::PatientSymptoms),
            Requirement::VaccinationStatus => Some(Requirement::AgeGroups),
            Requirement::StatusDistribution => Some(Requirement::VaccinationStatus),
            _ => None,
        }
    }
}

/// Worker and inclusive date window for contact tracing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactQuery {
    pub worker: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsParams {
    /// Reference date for ages.
    pub today: NaiveDate,
    pub top_n: usize,
    pub contact: Option<ContactQuery>,
}

impl AnalyticsParams {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            top_n: 3,
            contact: None,
        }
    }

    pub fn with_contact(mut self, contact: ContactQuery) -> Self {
        self.contact = Some(contact);
        self
    }
}
