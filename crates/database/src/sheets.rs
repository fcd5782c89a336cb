//! Fixed worksheet → relation mappings.
//!
//! Each [`SheetMapping`] names the source sheet, the target relation, the header renames applied
//! before lower-casing, which columns need boolean or date coercion, and the foreign keys the
//! relation carries. The foreign keys double as the edges of the load plan.

use vd_types::Relation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub columns: &'static [&'static str],
    pub parent: Relation,
    pub parent_columns: &'static [&'static str],
}

const fn fk(
    columns: &'static [&'static str],
    parent: Relation,
    parent_columns: &'static [&'static str],
) -> ForeignKey {
    ForeignKey {
        columns,
        parent,
        parent_columns,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetMapping {
    pub sheet: &'static str,
    pub relation: Relation,
    /// (sheet header, column). Matched after trimming, ignoring case.
    pub renames: &'static [(&'static str, &'static str)],
    pub bool_columns: &'static [&'static str],
    pub date_columns: &'static [&'static str],
    pub foreign_keys: &'static [ForeignKey],
}

impl SheetMapping {
    /// Column a sheet header lands in: the rename target if one matches, else the trimmed header
    /// lower-cased.
    pub fn target_column(&self, header: &str) -> String {
        let header = header.trim();
        self.renames
            .iter()
            .find(|(from, _)| from.eq_ignore_ascii_case(header))
            .map(|(_, to)| to.to_string())
            .unwrap_or_else(|| header.to_lowercase())
    }

    pub fn is_bool(&self, column: &str) -> bool {
        self.bool_columns.contains(&column)
    }

    pub fn is_date(&self, column: &str) -> bool {
        self.date_columns.contains(&column)
    }

    /// Distinct parent relations, in declaration order.
    pub fn parents(&self) -> Vec<Relation> {
        let mut out: Vec<Relation> = Vec::new();
        for fk in self.foreign_keys {
            if !out.contains(&fk.parent) {
                out.push(fk.parent);
            }
        }
        out
    }
}

const NAME: &[&str] = &["name"];
const ID: &[&str] = &["id"];
const SSN: &[&str] = &["ssn"];

/// All twelve mappings in workbook order.
pub fn workbook_mappings() -> Vec<SheetMapping> {
    vec![
        SheetMapping {
            sheet: "VaccineType",
            relation: Relation::VaccineType,
            renames: &[("tempMin", "temp_min"), ("tempMax", "temp_max")],
            bool_columns: &[],
            date_columns: &[],
            foreign_keys: &[],
        },
        SheetMapping {
            sheet: "Manufacturer",
            relation: Relation::Manufacturer,
            renames: &[("country", "origin"), ("vaccine", "vaccine_type")],
            bool_columns: &[],
            date_columns: &[],
            foreign_keys: const { &[fk(&["vaccine_type"], Relation::VaccineType, ID)] },
        },
        SheetMapping {
            sheet: "VaccinationStations",
            relation: Relation::Hospital,
            renames: &[],
            bool_columns: &[],
            date_columns: &[],
            foreign_keys: &[],
        },
        SheetMapping {
            sheet: "VaccineBatch",
            relation: Relation::Batch,
            renames: &[
                ("batchID", "id"),
                ("amount", "num_of_vacc"),
                ("type", "vaccine_type"),
                ("manufDate", "prod_date"),
                ("expiration", "exp_date"),
                ("location", "hospital"),
            ],
            bool_columns: &[],
            date_columns: &["prod_date", "exp_date"],
            foreign_keys: const {
                &[
                    fk(&["vaccine_type"], Relation::VaccineType, ID),
                    fk(&["manufacturer"], Relation::Manufacturer, ID),
                    fk(&["hospital"], Relation::Hospital, NAME),
                ]
            },
        },
        SheetMapping {
            sheet: "Transportation log",
            relation: Relation::TransportLog,
            renames: &[
                ("batchID", "batch"),
                ("departure", "dep_hospital"),
                ("arrival", "arr_hospital"),
                ("dateArr", "arr_date"),
                ("dateDep", "dep_date"),
            ],
            bool_columns: &[],
            date_columns: &["dep_date", "arr_date"],
            foreign_keys: const {
                &[
                    fk(&["batch"], Relation::Batch, ID),
                    fk(&["dep_hospital"], Relation::Hospital, NAME),
                    fk(&["arr_hospital"], Relation::Hospital, NAME),
                ]
            },
        },
        SheetMapping {
            sheet: "StaffMembers",
            relation: Relation::Staff,
            renames: &[
                ("social security number", "ssn"),
                ("date of birth", "birthday"),
                ("vaccination status", "vacc_status"),
            ],
            bool_columns: &["vacc_status"],
            date_columns: &["birthday"],
            foreign_keys: const { &[fk(&["hospital"], Relation::Hospital, NAME)] },
        },
        SheetMapping {
            sheet: "Shifts",
            relation: Relation::VaccinationShift,
            renames: &[("station", "hospital")],
            bool_columns: &[],
            date_columns: &[],
            foreign_keys: const {
                &[
                    fk(&["hospital"], Relation::Hospital, NAME),
                    fk(&["worker"], Relation::Staff, SSN),
                ]
            },
        },
        SheetMapping {
            sheet: "Vaccinations",
            relation: Relation::VaccinationEvent,
            renames: &[("batchID", "batch"), ("location", "hospital")],
            bool_columns: &[],
            date_columns: &["date"],
            foreign_keys: const {
                &[
                    fk(&["hospital"], Relation::Hospital, NAME),
                    fk(&["batch"], Relation::Batch, ID),
                ]
            },
        },
        SheetMapping {
            sheet: "Patients",
            relation: Relation::Patient,
            renames: &[("ssNo", "ssn"), ("date of birth", "birthday")],
            bool_columns: &[],
            date_columns: &["birthday"],
            foreign_keys: &[],
        },
        SheetMapping {
            sheet: "VaccinePatients",
            relation: Relation::VaccinePatient,
            renames: &[("patientSsNo", "patient"), ("location", "hospital")],
            bool_columns: &[],
            date_columns: &["date"],
            foreign_keys: const {
                &[
                    fk(&["patient"], Relation::Patient, SSN),
                    fk(
                        &["date", "hospital"],
                        Relation::VaccinationEvent,
                        &["date", "hospital"],
                    ),
                ]
            },
        },
        SheetMapping {
            sheet: "Symptoms",
            relation: Relation::Symptom,
            renames: &[("criticality", "critical")],
            bool_columns: &["critical"],
            date_columns: &[],
            foreign_keys: &[],
        },
        SheetMapping {
            sheet: "Diagnosis",
            relation: Relation::Diagnosis,
            renames: &[],
            bool_columns: &[],
            date_columns: &["date"],
            foreign_keys: const {
                &[
                    fk(&["patient"], Relation::Patient, SSN),
                    fk(&["symptom"], Relation::Symptom, NAME),
                ]
            },
        },
    ]
}

pub fn mapping_for(relation: Relation) -> Option<SheetMapping> {
    workbook_mappings()
        .into_iter()
        .find(|m| m.relation == relation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_mapping_per_base_relation_in_workbook_order() {
        let relations: Vec<_> = workbook_mappings().iter().map(|m| m.relation).collect();
        assert_eq!(relations, Relation::BASE.to_vec());
    }

    #[test]
    fn headers_are_trimmed_renamed_and_lower_cased() {
        let log = mapping_for(Relation::TransportLog).unwrap();
        assert_eq!(log.target_column("departure "), "dep_hospital");
        assert_eq!(log.target_column("BATCHID"), "batch");
        let patients = mapping_for(Relation::Patient).unwrap();
        assert_eq!(patients.target_column(" Gender"), "gender");
        assert_eq!(patients.target_column("date of birth"), "birthday");
    }

    #[test]
    fn parents_are_distinct() {
        let log = mapping_for(Relation::TransportLog).unwrap();
        assert_eq!(log.parents(), vec![Relation::Batch, Relation::Hospital]);
        assert!(mapping_for(Relation::Patient).unwrap().parents().is_empty());
    }
}
