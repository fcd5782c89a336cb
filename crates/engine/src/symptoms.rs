//! Patient symptom view and the most frequent symptoms per gender.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;
use vd_database::RelationalStore;
use vd_types::Relation;

use crate::error::AnalyticsError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSymptom {
    pub ssn: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub symptom: String,
    pub diagnosis_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderTopSymptoms {
    pub gender: String,
    /// (symptom, occurrences), most frequent first.
    pub symptoms: Vec<(String, i64)>,
}

/// Join patients with their diagnoses and store the result as `patient_symptoms`.
pub fn patient_symptom_view<S: RelationalStore + ?Sized>(
    store: &S,
) -> Result<Vec<PatientSymptom>, AnalyticsError> {
    let table = Relation::PatientSymptoms.table();
    store.execute(&format!(
        "CREATE OR REPLACE TABLE {table} AS \
         SELECT p.ssn, p.gender, p.birthday AS date_of_birth, d.symptom, d.date AS diagnosis_date \
         FROM patient p JOIN diagnosis d ON d.patient = p.ssn"
    ))?;
    let rows = store
        .query(&format!(
            "SELECT ssn, gender, date_of_birth, symptom, diagnosis_date FROM {table} \
             ORDER BY ssn, diagnosis_date, symptom"
        ))?
        .decode(|r| {
            Ok(PatientSymptom {
                ssn: r.text("ssn")?,
                gender: r.opt_text("gender")?,
                date_of_birth: r.opt_date("date_of_birth")?,
                symptom: r.text("symptom")?,
                diagnosis_date: r.date("diagnosis_date")?,
            })
        })?;
    info!(rows = rows.len(), "patient symptom view stored");
    Ok(rows)
}

/// Top `n` symptoms for every gender present in `patient_symptoms`.
/// Equal counts are ordered by symptom name.
pub fn top_symptoms_by_gender<S: RelationalStore + ?Sized>(
    store: &S,
    n: usize,
) -> Result<Vec<GenderTopSymptoms>, AnalyticsError> {
    let counts = store
        .query(&format!(
            "SELECT gender, symptom, COUNT(*) AS n FROM {} \
             WHERE gender IS NOT NULL GROUP BY gender, symptom",
            Relation::PatientSymptoms.table()
        ))?
        .decode(|r| Ok((r.text("gender")?, r.text("symptom")?, r.int("n")?)))?;
    Ok(rank_top(counts, n))
}

/// Group `(gender, symptom, count)` triples by gender and keep the `n` highest counts in each.
pub fn rank_top(counts: Vec<(String, String, i64)>, n: usize) -> Vec<GenderTopSymptoms> {
    let mut by_gender: BTreeMap<String, Vec<(String, i64)>> = BTreeMap::new();
    for (gender, symptom, count) in counts {
        by_gender.entry(gender).or_default().push((symptom, count));
    }
    by_gender
        .into_iter()
        .map(|(gender, mut symptoms)| {
            symptoms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            symptoms.truncate(n);
            GenderTopSymptoms { gender, symptoms }
        })
        .collect()
}
