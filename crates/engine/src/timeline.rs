use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use vd_database::RelationalStore;

use crate::error::AnalyticsError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeSeries {
    pub name: String,
    /// (date, running total), ascending by date.
    pub points: Vec<(NaiveDate, i64)>,
}

impl CumulativeSeries {
    /// Build a running total from per-date counts. Input order does not matter.
    pub fn accumulate(name: &str, mut daily: Vec<(NaiveDate, i64)>) -> Self {
        daily.sort_by_key(|(d, _)| *d);
        let mut total = 0;
        let points = daily
            .into_iter()
            .map(|(d, n)| {
                total += n;
                (d, total)
            })
            .collect();
        Self {
            name: name.to_string(),
            points,
        }
    }

    pub fn last(&self) -> i64 {
        self.points.last().map_or(0, |(_, n)| *n)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccinationSeries {
    /// Patients with at least one dose, by first dose date.
    pub vaccinated: CumulativeSeries,
    /// Patients with more than one dose, by latest dose date.
    pub two_vaccines: CumulativeSeries,
}

pub fn cumulative_series<S: RelationalStore + ?Sized>(
    store: &S,
) -> Result<VaccinationSeries, AnalyticsError> {
    let first = store
        .query(
            "WITH firsts AS (SELECT patient, MIN(date) AS date FROM vaccine_patient GROUP BY patient) \
             SELECT date, COUNT(patient) AS n FROM firsts GROUP BY date ORDER BY date",
        )?
        .decode(|r| Ok((r.date("date")?, r.int("n")?)))?;
    let full = store
        .query(
            "WITH counts AS ( \
                 SELECT patient, COUNT(patient) AS shots, MAX(date) AS last_date \
                 FROM vaccine_patient GROUP BY patient) \
             SELECT last_date AS date, COUNT(patient) AS n FROM counts \
             WHERE shots > 1 GROUP BY last_date ORDER BY last_date",
        )?
        .decode(|r| Ok((r.date("date")?, r.int("n")?)))?;
    Ok(VaccinationSeries {
        vaccinated: CumulativeSeries::accumulate("vaccinated", first),
        two_vaccines: CumulativeSeries::accumulate("two_vaccines", full),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_total_is_non_decreasing() {
        let d = |day| NaiveDate::from_ymd_opt(2021, 5, day).unwrap();
        let s = CumulativeSeries::accumulate("vaccinated", vec![(d(9), 1), (d(2), 3), (d(5), 2)]);
        assert_eq!(s.points, vec![(d(2), 3), (d(5), 5), (d(9), 6)]);
        assert!(s.points.windows(2).all(|w| w[0].0 < w[1].0 && w[0].1 <= w[1].1));
        assert_eq!(s.last(), 6);
    }
}
