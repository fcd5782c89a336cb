//! Runs the ten requirements and collects one outcome per requirement.
//!
//! A failing requirement does not stop the others. Requirements that consume another one's output
//! (3 after 1, 5 after 4, 6 after 5) report [`AnalyticsError::Dependency`] when that input is
//! missing.

use std::fmt;
use tracing::{info, warn};
use vd_database::RelationalStore;

use crate::contact::{Contact, trace_contacts};
use crate::demographics::{
    PatientAge, PatientStatus, StatusDistribution, age_groups, status_distribution,
    vaccination_status,
};
use crate::dosing::{DosePair, dose_pairs};
use crate::error::AnalyticsError;
use crate::frequency::{FrequencyGrid, symptom_frequency};
use crate::models::{AnalyticsParams, Requirement};
use crate::reserve::{ReserveRecommendation, reserve_recommendation};
use crate::symptoms::{GenderTopSymptoms, PatientSymptom, patient_symptom_view, top_symptoms_by_gender};
use crate::timeline::{VaccinationSeries, cumulative_series};

#[derive(Debug, Clone, PartialEq)]
pub enum RequirementOutput {
    PatientSymptoms(Vec<PatientSymptom>),
    DosePairs(Vec<DosePair>),
    TopSymptoms(Vec<GenderTopSymptoms>),
    AgeGroups(Vec<PatientAge>),
    VaccinationStatus(Vec<PatientStatus>),
    StatusDistribution(StatusDistribution),
    SymptomFrequency(FrequencyGrid),
    Reserve(ReserveRecommendation),
    Series(VaccinationSeries),
    Contacts(Vec<Contact>),
}

#[derive(Debug)]
pub enum Outcome {
    Done(RequirementOutput),
    Failed(AnalyticsError),
    Skipped(&'static str),
}

impl Outcome {
    pub fn output(&self) -> Option<&RequirementOutput> {
        match self {
            Outcome::Done(o) => Some(o),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }
}

#[derive(Debug, Default)]
pub struct AnalyticsReport {
    pub outcomes: Vec<(Requirement, Outcome)>,
}

impl AnalyticsReport {
    pub fn outcome(&self, requirement: Requirement) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|(r, _)| *r == requirement)
            .map(|(_, o)| o)
    }

    pub fn output(&self, requirement: Requirement) -> Option<&RequirementOutput> {
        self.outcome(requirement).and_then(Outcome::output)
    }

    pub fn failures(&self) -> impl Iterator<Item = (Requirement, &AnalyticsError)> {
        self.outcomes.iter().filter_map(|(r, o)| match o {
            Outcome::Failed(e) => Some((*r, e)),
            _ => None,
        })
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes
            .iter()
            .all(|(_, o)| !matches!(o, Outcome::Failed(_)))
    }
}

fn record<T>(
    report: &mut AnalyticsReport,
    requirement: Requirement,
    result: Result<T, AnalyticsError>,
    wrap: impl FnOnce(T) -> RequirementOutput,
) {
    let outcome = match result {
        Ok(v) => {
            info!(requirement = %requirement, "requirement complete");
            Outcome::Done(wrap(v))
        }
        Err(e) => {
            warn!(requirement = %requirement, error = %e, "requirement failed");
            Outcome::Failed(e)
        }
    };
    report.outcomes.push((requirement, outcome));
}

fn needs<T>(requirement: Requirement, input: Option<T>) -> Result<T, AnalyticsError> {
    input.ok_or_else(|| {
        AnalyticsError::Dependency(requirement.prerequisite().unwrap_or(requirement))
    })
}

/// Run every requirement against `store`.
pub fn run_all<S: RelationalStore + ?Sized>(store: &S, params: &AnalyticsParams) -> AnalyticsReport {
    let mut report = AnalyticsReport::default();

    let symptoms = patient_symptom_view(store);
    let have_symptoms = symptoms.is_ok();
    record(&mut report, Requirement::PatientSymptoms, symptoms, RequirementOutput::PatientSymptoms);

    record(&mut report, Requirement::DosePairing, dose_pairs(store), RequirementOutput::DosePairs);

    let top = needs(Requirement::TopSymptoms, have_symptoms.then_some(()))
        .and_then(|_| top_symptoms_by_gender(store, params.top_n));
    record(&mut report, Requirement::TopSymptoms, top, RequirementOutput::TopSymptoms);

    let ages = age_groups(store, params.today);
    let ages_ok = ages.as_ref().ok().cloned();
    record(&mut report, Requirement::AgeGroups, ages, RequirementOutput::AgeGroups);

    let statuses = needs(Requirement::VaccinationStatus, ages_ok)
        .and_then(|ages| vaccination_status(store, &ages));
    let statuses_ok = statuses.as_ref().ok().cloned();
    record(
        &mut report,
        Requirement::VaccinationStatus,
        statuses,
        RequirementOutput::VaccinationStatus,
    );

    let distribution = needs(Requirement::StatusDistribution, statuses_ok)
        .map(|s| status_distribution(&s));
    record(
        &mut report,
        Requirement::StatusDistribution,
        distribution,
        RequirementOutput::StatusDistribution,
    );

    record(
        &mut report,
        Requirement::SymptomFrequency,
        symptom_frequency(store),
        RequirementOutput::SymptomFrequency,
    );
    record(
        &mut report,
        Requirement::ReserveDoses,
        reserve_recommendation(store),
        RequirementOutput::Reserve,
    );
    record(
        &mut report,
        Requirement::CumulativeSeries,
        cumulative_series(store),
        RequirementOutput::Series,
    );

    match &params.contact {
        Some(q) => record(
            &mut report,
            Requirement::ContactTracing,
            trace_contacts(store, q),
            RequirementOutput::Contacts,
        ),
        None => {
            info!(requirement = %Requirement::ContactTracing, "skipped: no contact query configured");
            report
                .outcomes
                .push((Requirement::ContactTracing, Outcome::Skipped("no contact query configured")));
        }
    }

    report
}

fn opt<T: fmt::Display>(v: &Option<T>) -> String {
    v.as_ref().map_or_else(|| "-".to_string(), |x| x.to_string())
}

impl fmt::Display for RequirementOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequirementOutput::PatientSymptoms(rows) => {
                writeln!(f, "ssn | gender | date_of_birth | symptom | diagnosis_date")?;
                for r in rows {
                    writeln!(
                        f,
                        "{} | {} | {} | {} | {}",
                        r.ssn,
                        opt(&r.gender),
                        opt(&r.date_of_birth),
                        r.symptom,
                        r.diagnosis_date
                    )?;
                }
            }
            RequirementOutput::DosePairs(rows) => {
                writeln!(f, "ssn | date1 | vaccine_type1 | date2 | vaccine_type2")?;
                for r in rows {
                    writeln!(
                        f,
                        "{} | {} | {} | {} | {}",
                        r.ssn,
                        opt(&r.date1),
                        opt(&r.vaccine_type1),
                        opt(&r.date2),
                        opt(&r.vaccine_type2)
                    )?;
                }
            }
            RequirementOutput::TopSymptoms(groups) => {
                for g in groups {
                    let names: Vec<&str> = g.symptoms.iter().map(|(s, _)| s.as_str()).collect();
                    writeln!(f, "{}: {}", g.gender, names.join(", "))?;
                }
            }
            RequirementOutput::AgeGroups(rows) => {
                writeln!(f, "ssn | birthday | age_group")?;
                for r in rows {
                    writeln!(f, "{} | {} | {}", r.ssn, opt(&r.birthday), opt(&r.group))?;
                }
            }
            RequirementOutput::VaccinationStatus(rows) => {
                writeln!(f, "ssn | age_group | vacc_status")?;
                for r in rows {
                    writeln!(f, "{} | {} | {}", r.ssn, opt(&r.group), r.doses)?;
                }
            }
            RequirementOutput::StatusDistribution(d) => {
                let header: Vec<String> = d.groups.iter().map(|g| g.group.to_string()).collect();
                writeln!(f, "vacc_status | {}", header.join(" | "))?;
                for (i, label) in ["0-vacc", "1-vacc", "2-vacc"].iter().enumerate() {
                    let cells: Vec<String> =
                        d.groups.iter().map(|g| format!("{:.2}", g.percent[i])).collect();
                    writeln!(f, "{label} | {}", cells.join(" | "))?;
                }
                if d.unbucketed > 0 {
                    writeln!(f, "({} patients without an age group)", d.unbucketed)?;
                }
            }
            RequirementOutput::SymptomFrequency(grid) => {
                writeln!(f, "name | critical | {}", grid.vaccine_types.join(" | "))?;
                for row in &grid.rows {
                    writeln!(f, "{} | {} | {}", row.symptom, row.critical, row.labels().join(" | "))?;
                }
            }
            RequirementOutput::Reserve(r) => {
                writeln!(
                    f,
                    "{} events, mean participation {:.2}%, std {:.2}",
                    r.events.len(),
                    r.mean,
                    r.std_dev
                )?;
                writeln!(f, "reserve {:.2}% of each batch per vaccination", r.reserve_percent)?;
            }
            RequirementOutput::Series(s) => {
                for series in [&s.vaccinated, &s.two_vaccines] {
                    writeln!(f, "{}:", series.name)?;
                    for (d, n) in &series.points {
                        writeln!(f, "  {d} {n}")?;
                    }
                }
            }
            RequirementOutput::Contacts(rows) => {
                writeln!(f, "ssn | name")?;
                for c in rows {
                    writeln!(f, "{} | {}", c.ssn, c.name)?;
                }
            }
        }
        Ok(())
    }
}
