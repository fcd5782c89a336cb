//! Dose pairing: each patient's first two doses in chronological order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use vd_database::RelationalStore;
use vd_types::{Relation, Table, Value};

use crate::error::AnalyticsError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dose {
    pub date: NaiveDate,
    pub vaccine_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DosePair {
    pub ssn: String,
    pub date1: Option<NaiveDate>,
    pub date2: Option<NaiveDate>,
    pub vaccine_type1: Option<String>,
    pub vaccine_type2: Option<String>,
}

impl DosePair {
    /// Sort `doses` by date and keep the first two. Doses on the same date keep their input order.
    pub fn from_doses(ssn: String, mut doses: Vec<Dose>) -> Self {
        doses.sort_by_key(|d| d.date);
        let mut it = doses.into_iter();
        let first = it.next();
        let second = it.next();
        Self {
            ssn,
            date1: first.as_ref().map(|d| d.date),
            date2: second.as_ref().map(|d| d.date),
            vaccine_type1: first.and_then(|d| d.vaccine_type),
            vaccine_type2: second.and_then(|d| d.vaccine_type),
        }
    }
}

/// One [`DosePair`] per patient, ordered by ssn, also stored as `patient_vaccine_info`.
pub fn dose_pairs<S: RelationalStore + ?Sized>(store: &S) -> Result<Vec<DosePair>, AnalyticsError> {
    let rows = store
        .query(
            "SELECT p.ssn, vp.date, b.vaccine_type \
             FROM patient p \
             LEFT JOIN vaccine_patient vp ON vp.patient = p.ssn \
             LEFT JOIN vaccination_event e ON e.date = vp.date AND e.hospital = vp.hospital \
             LEFT JOIN batch b ON b.id = e.batch \
             ORDER BY p.ssn, vp.hospital, b.vaccine_type",
        )?
        .decode(|r| Ok((r.text("ssn")?, r.opt_date("date")?, r.opt_text("vaccine_type")?)))?;

    let mut pairs: Vec<DosePair> = Vec::new();
    let mut current: Option<(String, Vec<Dose>)> = None;
    for (ssn, date, vaccine_type) in rows {
        match &mut current {
            Some((s, doses)) if *s == ssn => {
                if let Some(date) = date {
                    doses.push(Dose { date, vaccine_type });
                }
            }
            _ => {
                if let Some((s, doses)) = current.take() {
                    pairs.push(DosePair::from_doses(s, doses));
                }
                let doses = date
                    .map(|date| vec![Dose { date, vaccine_type }])
                    .unwrap_or_default();
                current = Some((ssn, doses));
            }
        }
    }
    if let Some((s, doses)) = current {
        pairs.push(DosePair::from_doses(s, doses));
    }

    store_pairs(store, &pairs)?;
    info!(patients = pairs.len(), "dose pairing stored");
    Ok(pairs)
}

fn store_pairs<S: RelationalStore + ?Sized>(
    store: &S,
    pairs: &[DosePair],
) -> Result<(), AnalyticsError> {
    let relation = Relation::PatientVaccineInfo;
    store.execute(&format!(
        "CREATE OR REPLACE TABLE {} (ssn VARCHAR, date1 DATE, date2 DATE, \
         vaccine_type1 VARCHAR, vaccine_type2 VARCHAR)",
        relation.table()
    ))?;
    let mut table = Table::new(["ssn", "date1", "date2", "vaccine_type1", "vaccine_type2"]);
    for p in pairs {
        table.push_row(vec![
            Value::from(p.ssn.as_str()),
            Value::from(p.date1),
            Value::from(p.date2),
            Value::from(p.vaccine_type1.clone()),
            Value::from(p.vaccine_type2.clone()),
        ])?;
    }
    store.append(relation, &table)?;
    Ok(())
}
