//! Symptom frequency per vaccine type.
//!
//! A diagnosis counts against a dose when it is dated strictly after the dose. When several doses
//! precede the same diagnosis at one hospital, only the latest counts.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use strum_macros::Display;
use vd_database::RelationalStore;

use crate::error::AnalyticsError;

/// Grid cell text for a symptom never observed after a vaccine type.
pub const PLACEHOLDER: &str = "-";

const REACTIONS_SQL: &str = "\
    WITH mapping AS ( \
        SELECT vp.patient, e.date AS vacc_date, e.hospital, d.symptom, d.date AS symptom_date \
        FROM vaccination_event e \
        JOIN vaccine_patient vp ON vp.date = e.date AND vp.hospital = e.hospital \
        JOIN diagnosis d ON d.patient = vp.patient AND e.date < d.date \
    ), deduplicated AS ( \
        SELECT patient, hospital, symptom, symptom_date, MAX(vacc_date) AS vacc_date \
        FROM mapping GROUP BY patient, hospital, symptom, symptom_date \
    ) \
    SELECT b.vaccine_type, dd.symptom, COUNT(*) AS n \
    FROM deduplicated dd \
    JOIN vaccination_event e ON e.date = dd.vacc_date AND e.hospital = dd.hospital \
    JOIN batch b ON b.id = e.batch \
    GROUP BY b.vaccine_type, dd.symptom";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Frequency {
    #[strum(to_string = "very common")]
    VeryCommon,
    #[strum(to_string = "common")]
    Common,
    #[strum(to_string = "rare")]
    Rare,
}

impl Frequency {
    pub fn classify(share: f64) -> Frequency {
        if share >= 0.10 {
            Frequency::VeryCommon
        } else if share >= 0.05 {
            Frequency::Common
        } else {
            Frequency::Rare
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomShare {
    pub vaccine_type: String,
    pub symptom: String,
    pub count: i64,
    /// All symptom observations for the vaccine type.
    pub total: i64,
    pub share: f64,
    pub frequency: Frequency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomRow {
    pub symptom: String,
    pub critical: bool,
    /// One cell per entry of [`FrequencyGrid::vaccine_types`].
    pub cells: Vec<Option<Frequency>>,
}

impl SymptomRow {
    pub fn labels(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|c| c.map_or_else(|| PLACEHOLDER.to_string(), |f| f.to_string()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyGrid {
    pub vaccine_types: Vec<String>,
    pub rows: Vec<SymptomRow>,
    pub shares: Vec<SymptomShare>,
}

impl FrequencyGrid {
    pub fn cell(&self, symptom: &str, vaccine_type: &str) -> Option<Frequency> {
        let col = self.vaccine_types.iter().position(|v| v == vaccine_type)?;
        self.rows
            .iter()
            .find(|r| r.symptom == symptom)
            .and_then(|r| r.cells[col])
    }
}

/// Classify `(vaccine_type, symptom, count)` observations and pivot them over `catalog`
/// (symptom name, critical), which is kept in the order given.
pub fn build_grid(counts: Vec<(String, String, i64)>, catalog: Vec<(String, bool)>) -> FrequencyGrid {
    let mut totals: BTreeMap<&str, i64> = BTreeMap::new();
    for (vt, _, n) in &counts {
        *totals.entry(vt.as_str()).or_default() += n;
    }
    let vaccine_types: Vec<String> = totals.keys().map(|v| v.to_string()).collect();

    let mut shares: Vec<SymptomShare> = counts
        .iter()
        .map(|(vt, symptom, n)| {
            let total = totals.get(vt.as_str()).copied().unwrap_or(*n);
            let share = if total > 0 { *n as f64 / total as f64 } else { 0.0 };
            SymptomShare {
                vaccine_type: vt.clone(),
                symptom: symptom.clone(),
                count: *n,
                total,
                share,
                frequency: Frequency::classify(share),
            }
        })
        .collect();
    shares.sort_by(|a, b| {
        a.vaccine_type
            .cmp(&b.vaccine_type)
            .then_with(|| a.symptom.cmp(&b.symptom))
    });

    let rows = catalog
        .into_iter()
        .map(|(symptom, critical)| {
            let cells = vaccine_types
                .iter()
                .map(|vt| {
                    shares
                        .iter()
                        .find(|s| &s.vaccine_type == vt && s.symptom == symptom)
                        .map(|s| s.frequency)
                })
                .collect();
            SymptomRow {
                symptom,
                critical,
                cells,
            }
        })
        .collect();

    FrequencyGrid {
        vaccine_types,
        rows,
        shares,
    }
}

pub fn symptom_frequency<S: RelationalStore + ?Sized>(
    store: &S,
) -> Result<FrequencyGrid, AnalyticsError> {
    let counts = store
        .query(REACTIONS_SQL)?
        .decode(|r| Ok((r.text("vaccine_type")?, r.text("symptom")?, r.int("n")?)))?;
    let catalog = store
        .query("SELECT name, critical FROM symptoms ORDER BY name")?
        .decode(|r| Ok((r.text("name")?, r.opt_bool("critical")?.unwrap_or(false))))?;

    // symptoms observed but absent from the catalog still get a row
    let known: BTreeSet<&str> = catalog.iter().map(|(n, _)| n.as_str()).collect();
    let extra: BTreeSet<String> = counts
        .iter()
        .filter(|(_, s, _)| !known.contains(s.as_str()))
        .map(|(_, s, _)| s.clone())
        .collect();
    let mut catalog = catalog;
    catalog.extend(extra.into_iter().map(|s| (s, false)));

    Ok(build_grid(counts, catalog))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.10, Frequency::VeryCommon)]
    #[case(0.5, Frequency::VeryCommon)]
    #[case(0.05, Frequency::Common)]
    #[case(0.099999, Frequency::Common)]
    #[case(0.049999, Frequency::Rare)]
    #[case(0.0, Frequency::Rare)]
    fn thresholds(#[case] share: f64, #[case] expected: Frequency) {
        assert_eq!(Frequency::classify(share), expected);
    }

    #[test]
    fn shares_are_per_vaccine_type_and_catalog_fills_gaps() {
        let counts = vec![
            ("V01".to_string(), "fever".to_string(), 1),
            ("V01".to_string(), "headache".to_string(), 19),
            ("V02".to_string(), "fever".to_string(), 2),
        ];
        let catalog = vec![
            ("anaphylaxis".to_string(), true),
            ("fever".to_string(), false),
            ("headache".to_string(), false),
        ];
        let grid = build_grid(counts, catalog);
        assert_eq!(grid.vaccine_types, ["V01", "V02"]);
        assert_eq!(grid.cell("fever", "V01"), Some(Frequency::Common));
        assert_eq!(grid.cell("headache", "V01"), Some(Frequency::VeryCommon));
        assert_eq!(grid.cell("fever", "V02"), Some(Frequency::VeryCommon));
        assert_eq!(grid.rows[0].labels(), ["-", "-"]);
        assert!(grid.rows[0].critical);
        assert_eq!(grid.rows[1].labels(), ["common", "very common"]);
        assert_eq!(grid.rows[2].labels(), ["very common", "-"]);

        let fever_v01 = &grid.shares[0];
        assert_eq!((fever_v01.count, fever_v01.total), (1, 20));
        assert_eq!(fever_v01.share, 0.05);
        assert_eq!(fever_v01.frequency, Frequency::Common);
    }
}
