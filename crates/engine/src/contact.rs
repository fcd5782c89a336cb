//! Contact tracing: everyone a worker may have met on their shifts within a date window.
//!
//! An event counts when it is at a hospital where the worker has a shift on the event's weekday.
//! The contacts are the patients dosed at those events plus the other staff rostered on the same
//! hospital and weekday.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::{info, warn};
use vd_database::RelationalStore;
use vd_database::helpers::quote_literal;
use vd_types::calendar::ShiftDay;

use crate::error::AnalyticsError;
use crate::helpers::date_literal;
use crate::models::ContactQuery;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Contact {
    pub ssn: String,
    pub name: String,
}

fn parse_day(hospital: &str, weekday: &str) -> Option<ShiftDay> {
    match weekday.parse::<ShiftDay>() {
        Ok(d) => Some(d),
        Err(e) => {
            warn!(hospital = %hospital, error = %e, "shift skipped");
            None
        }
    }
}

/// Events of the window that fall on one of `shifts`.
pub fn matching_events(
    shifts: &HashSet<(String, ShiftDay)>,
    events: Vec<(NaiveDate, String)>,
) -> Vec<(NaiveDate, String)> {
    events
        .into_iter()
        .filter(|(date, hospital)| shifts.contains(&(hospital.clone(), ShiftDay::of(*date))))
        .collect()
}

pub fn trace_contacts<S: RelationalStore + ?Sized>(
    store: &S,
    query: &ContactQuery,
) -> Result<Vec<Contact>, AnalyticsError> {
    let worker = quote_literal(&query.worker);
    let shifts: HashSet<(String, ShiftDay)> = store
        .query(&format!(
            "SELECT hospital, weekday FROM vaccination_shift WHERE worker = {worker}"
        ))?
        .decode(|r| Ok((r.text("hospital")?, r.text("weekday")?)))?
        .into_iter()
        .filter_map(|(h, w)| parse_day(&h, &w).map(|d| (h, d)))
        .collect();

    let window = format!(
        "BETWEEN {} AND {}",
        date_literal(query.from),
        date_literal(query.to)
    );
    let events = store
        .query(&format!(
            "SELECT date, hospital FROM vaccination_event WHERE date {window} ORDER BY date, hospital"
        ))?
        .decode(|r| Ok((r.date("date")?, r.text("hospital")?)))?;
    let events: HashSet<(NaiveDate, String)> =
        matching_events(&shifts, events).into_iter().collect();
    let event_days: HashSet<(String, ShiftDay)> = events
        .iter()
        .map(|(d, h)| (h.clone(), ShiftDay::of(*d)))
        .collect();

    let mut contacts: BTreeSet<Contact> = BTreeSet::new();

    let patients = store
        .query(&format!(
            "SELECT vp.date, vp.hospital, p.ssn, p.name FROM vaccine_patient vp \
             JOIN patient p ON p.ssn = vp.patient WHERE vp.date {window}"
        ))?
        .decode(|r| {
            Ok((
                r.date("date")?,
                r.text("hospital")?,
                r.text("ssn")?,
                r.opt_text("name")?.unwrap_or_default(),
            ))
        })?;
    for (date, hospital, ssn, name) in patients {
        if events.contains(&(date, hospital)) {
            contacts.insert(Contact { ssn, name });
        }
    }

    let staff = store
        .query(&format!(
            "SELECT vs.hospital, vs.weekday, s.ssn, s.name FROM vaccination_shift vs \
             JOIN staff s ON s.ssn = vs.worker WHERE vs.worker <> {worker}"
        ))?
        .decode(|r| {
            Ok((
                r.text("hospital")?,
                r.text("weekday")?,
                r.text("ssn")?,
                r.opt_text("name")?.unwrap_or_default(),
            ))
        })?;
    for (hospital, weekday, ssn, name) in staff {
        let Some(day) = parse_day(&hospital, &weekday) else {
            continue;
        };
        if event_days.contains(&(hospital, day)) {
            contacts.insert(Contact { ssn, name });
        }
    }

    info!(worker = %query.worker, events = events.len(), contacts = contacts.len(), "contacts traced");
    Ok(contacts.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_events_on_shift_days_match() {
        let monday = NaiveDate::from_ymd_opt(2021, 5, 10).unwrap();
        let tuesday = monday.succ_opt().unwrap();
        let shifts: HashSet<_> = [("HUS".to_string(), ShiftDay::Monday)].into_iter().collect();
        let matched = matching_events(
            &shifts,
            vec![
                (monday, "HUS".to_string()),
                (tuesday, "HUS".to_string()),
                (monday, "Espoo".to_string()),
            ],
        );
        assert_eq!(matched, vec![(monday, "HUS".to_string())]);
    }
}
