use serde::{Deserialize, Serialize};
use std::fmt;

/// Every relation the pipeline reads or writes.
///
/// The storage name returned by [`Relation::table`] is part of the storage contract:
/// all identifiers are lower-case, and changing one requires a schema migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Relation {
    VaccineType,
    Manufacturer,
    Hospital,
    Batch,
    TransportLog,
    Staff,
    VaccinationShift,
    VaccinationEvent,
    Patient,
    VaccinePatient,
    Symptom,
    Diagnosis,
    /// Patient ⋈ Diagnosis, written back by the analytics engine.
    PatientSymptoms,
    /// First/second dose per patient, written back by the analytics engine.
    PatientVaccineInfo,
}

impl Relation {
    /// Base relations in workbook order.
    pub const BASE: [Relation; 12] = [
        Relation::VaccineType,
        Relation::Manufacturer,
        Relation::Hospital,
        Relation::Batch,
        Relation::TransportLog,
        Relation::Staff,
        Relation::VaccinationShift,
        Relation::VaccinationEvent,
        Relation::Patient,
        Relation::VaccinePatient,
        Relation::Symptom,
        Relation::Diagnosis,
    ];

    pub fn table(self) -> &'static str {
        match self {
            Relation::VaccineType => "vaccine_type",
            Relation::Manufacturer => "manufacturer",
            Relation::Hospital => "hospital",
            Relation::Batch => "batch",
            Relation::TransportLog => "transport_log",
            Relation::Staff => "staff",
            Relation::VaccinationShift => "vaccination_shift",
            Relation::VaccinationEvent => "vaccination_event",
            Relation::Patient => "patient",
            Relation::VaccinePatient => "vaccine_patient",
            Relation::Symptom => "symptoms",
            Relation::Diagnosis => "diagnosis",
            Relation::PatientSymptoms => "patient_symptoms",
            Relation::PatientVaccineInfo => "patient_vaccine_info",
        }
    }

    /// Derived relations are owned by the analytics engine and replaced on every run.
    pub fn is_derived(self) -> bool {
        matches!(
            self,
            Relation::PatientSymptoms | Relation::PatientVaccineInfo
        )
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}
