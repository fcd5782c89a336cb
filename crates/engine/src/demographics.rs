//! Age groups, per-patient vaccination status, and the status distribution per age group.
//!
//! Group membership reproduces the historical conditions exactly: `age < 10`, `10 <= age < 20`,
//! `20 <= age < 39`, `39 <= age < 59`, `age >= 60`. An age of 59 satisfies none of them and is
//! left without a group (known defect of the reporting rules).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::Display;
use tracing::info;
use vd_database::RelationalStore;

use crate::error::AnalyticsError;

/// Mean Gregorian year length, the unit used for whole-year ages.
const DAYS_PER_YEAR: f64 = 365.2425;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
pub enum AgeGroup {
    #[strum(to_string = "0-9")]
    Child,
    #[strum(to_string = "10-19")]
    Teen,
    #[strum(to_string = "20-39")]
    YoungAdult,
    #[strum(to_string = "40-59")]
    Adult,
    #[strum(to_string = "60+")]
    Senior,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 5] = [
        AgeGroup::Child,
        AgeGroup::Teen,
        AgeGroup::YoungAdult,
        AgeGroup::Adult,
        AgeGroup::Senior,
    ];

    pub fn for_age(age: i64) -> Option<AgeGroup> {
        match age {
            a if a < 10 => Some(AgeGroup::Child),
            a if (10..20).contains(&a) => Some(AgeGroup::Teen),
            a if (20..39).contains(&a) => Some(AgeGroup::YoungAdult),
            a if (39..59).contains(&a) => Some(AgeGroup::Adult),
            a if a >= 60 => Some(AgeGroup::Senior),
            _ => None,
        }
    }
}

/// Whole years between `birthday` and `today`.
pub fn age_in_years(birthday: NaiveDate, today: NaiveDate) -> i64 {
    let days = (today - birthday).num_days() as f64;
    (days / DAYS_PER_YEAR).floor() as i64
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientAge {
    pub ssn: String,
    pub birthday: Option<NaiveDate>,
    pub age: Option<i64>,
    pub group: Option<AgeGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientStatus {
    pub ssn: String,
    pub group: Option<AgeGroup>,
    /// Doses recorded for the patient, 0 when none.
    pub doses: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDistribution {
    pub group: AgeGroup,
    pub total: usize,
    /// Percent of the group with 0, 1 and 2 recorded doses.
    pub percent: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDistribution {
    pub groups: Vec<GroupDistribution>,
    /// Patients that fell into no age group.
    pub unbucketed: usize,
}

impl StatusDistribution {
    pub fn group(&self, group: AgeGroup) -> Option<&GroupDistribution> {
        self.groups.iter().find(|g| g.group == group)
    }
}

/// Age and age group of every patient, ordered by ssn.
pub fn age_groups<S: RelationalStore + ?Sized>(
    store: &S,
    today: NaiveDate,
) -> Result<Vec<PatientAge>, AnalyticsError> {
    let patients = store
        .query("SELECT ssn, birthday FROM patient ORDER BY ssn")?
        .decode(|r| Ok((r.text("ssn")?, r.opt_date("birthday")?)))?;
    let ages: Vec<PatientAge> = patients
        .into_iter()
        .map(|(ssn, birthday)| {
            let age = birthday.map(|b| age_in_years(b, today));
            PatientAge {
                ssn,
                birthday,
                age,
                group: age.and_then(AgeGroup::for_age),
            }
        })
        .collect();
    info!(
        patients = ages.len(),
        ungrouped = ages.iter().filter(|a| a.group.is_none()).count(),
        "age groups assigned"
    );
    Ok(ages)
}

/// Left-join `ages` with the per-patient dose count.
pub fn vaccination_status<S: RelationalStore + ?Sized>(
    store: &S,
    ages: &[PatientAge],
) -> Result<Vec<PatientStatus>, AnalyticsError> {
    let counts: HashMap<String, i64> = store
        .query("SELECT patient, COUNT(*) AS doses FROM vaccine_patient GROUP BY patient")?
        .decode(|r| Ok((r.text("patient")?, r.int("doses")?)))?
        .into_iter()
        .collect();
    Ok(ages
        .iter()
        .map(|a| PatientStatus {
            ssn: a.ssn.clone(),
            group: a.group,
            doses: counts.get(&a.ssn).copied().unwrap_or(0),
        })
        .collect())
}

/// Share of each group's own population with 0, 1 and 2 doses. Only groups with patients appear.
pub fn status_distribution(statuses: &[PatientStatus]) -> StatusDistribution {
    let mut tally: HashMap<AgeGroup, (usize, [usize; 3])> = HashMap::new();
    let mut unbucketed = 0;
    for s in statuses {
        let Some(group) = s.group else {
            unbucketed += 1;
            continue;
        };
        let entry = tally.entry(group).or_default();
        entry.0 += 1;
        if let Ok(i) = usize::try_from(s.doses) {
            if i < 3 {
                entry.1[i] += 1;
            }
        }
    }
    let groups = AgeGroup::ALL
        .iter()
        .filter_map(|g| {
            let (total, counts) = tally.get(g)?;
            Some(GroupDistribution {
                group: *g,
                total: *total,
                percent: counts.map(|c| c as f64 / *total as f64 * 100.0),
            })
        })
        .collect();
    StatusDistribution { groups, unbucketed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, Some(AgeGroup::Child))]
    #[case(9, Some(AgeGroup::Child))]
    #[case(10, Some(AgeGroup::Teen))]
    #[case(19, Some(AgeGroup::Teen))]
    #[case(20, Some(AgeGroup::YoungAdult))]
    #[case(38, Some(AgeGroup::YoungAdult))]
    #[case(39, Some(AgeGroup::Adult))]
    #[case(58, Some(AgeGroup::Adult))]
    #[case(59, None)]
    #[case(60, Some(AgeGroup::Senior))]
    #[case(101, Some(AgeGroup::Senior))]
    fn group_boundaries_match_historical_rules(#[case] age: i64, #[case] expected: Option<AgeGroup>) {
        assert_eq!(AgeGroup::for_age(age), expected);
    }

    #[test]
    fn labels() {
        let labels: Vec<String> = AgeGroup::ALL.iter().map(|g| g.to_string()).collect();
        assert_eq!(labels, ["0-9", "10-19", "20-39", "40-59", "60+"]);
    }

    #[test]
    fn whole_years_use_mean_year_length() {
        let today = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
        assert_eq!(age_in_years(NaiveDate::from_ymd_opt(1990, 6, 1).unwrap(), today), 31);
        assert_eq!(age_in_years(NaiveDate::from_ymd_opt(1990, 6, 2).unwrap(), today), 30);
        assert_eq!(age_in_years(today, today), 0);
    }

    fn status(group: Option<AgeGroup>, doses: i64) -> PatientStatus {
        PatientStatus {
            ssn: String::new(),
            group,
            doses,
        }
    }

    #[test]
    fn percentages_are_relative_to_each_group() {
        let d = status_distribution(&[
            status(Some(AgeGroup::Child), 0),
            status(Some(AgeGroup::Child), 2),
            status(Some(AgeGroup::Senior), 1),
            status(Some(AgeGroup::Senior), 1),
            status(Some(AgeGroup::Senior), 2),
            status(Some(AgeGroup::Senior), 3),
            status(None, 2),
        ]);
        assert_eq!(d.unbucketed, 1);
        assert_eq!(d.groups.len(), 2);
        assert_eq!(d.group(AgeGroup::Child).unwrap().percent, [50.0, 0.0, 50.0]);
        let senior = d.group(AgeGroup::Senior).unwrap();
        assert_eq!(senior.total, 4);
        assert_eq!(senior.percent, [0.0, 50.0, 25.0]);
        for g in &d.groups {
            assert!(g.percent.iter().all(|p| (0.0..=100.0).contains(p)));
        }
    }
}
