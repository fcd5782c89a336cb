//! Reserve-dose recommendation from observed event participation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;
use vd_database::RelationalStore;

use crate::error::AnalyticsError;
use crate::helpers::{mean, round2, sample_std};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventParticipation {
    pub date: NaiveDate,
    pub hospital: String,
    pub batch: String,
    pub capacity: i64,
    pub administered: i64,
    /// administered / capacity × 100, two decimals.
    pub participation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveRecommendation {
    pub events: Vec<EventParticipation>,
    pub mean: f64,
    pub std_dev: f64,
    /// Percent of batch capacity to reserve per vaccination: `mean + std_dev`.
    pub reserve_percent: f64,
}

/// Mean and sample standard deviation, each rounded to two decimals, and their sum.
pub fn recommend(participations: &[f64]) -> Result<(f64, f64, f64), AnalyticsError> {
    let m = mean(participations).ok_or(AnalyticsError::NoEvents)?;
    let m = round2(m);
    let sd = round2(sample_std(participations));
    Ok((m, sd, round2(m + sd)))
}

pub fn reserve_recommendation<S: RelationalStore + ?Sized>(
    store: &S,
) -> Result<ReserveRecommendation, AnalyticsError> {
    let rows = store
        .query(
            "SELECT vp.date, e.hospital, b.id AS batch, b.num_of_vacc, COUNT(vp.patient) AS administered \
             FROM vaccine_patient vp \
             JOIN vaccination_event e ON vp.date = e.date AND vp.hospital = e.hospital \
             JOIN batch b ON b.id = e.batch \
             GROUP BY vp.date, e.hospital, b.id, b.num_of_vacc \
             ORDER BY vp.date, e.hospital",
        )?
        .decode(|r| {
            Ok((
                r.date("date")?,
                r.text("hospital")?,
                r.text("batch")?,
                r.int("num_of_vacc")?,
                r.int("administered")?,
            ))
        })?;

    let mut events = Vec::with_capacity(rows.len());
    for (date, hospital, batch, capacity, administered) in rows {
        if capacity <= 0 {
            warn!(%date, hospital = %hospital, batch = %batch, capacity, "event skipped: batch has no capacity");
            continue;
        }
        events.push(EventParticipation {
            participation: round2(administered as f64 / capacity as f64 * 100.0),
            date,
            hospital,
            batch,
            capacity,
            administered,
        });
    }

    let participations: Vec<f64> = events.iter().map(|e| e.participation).collect();
    let (mean, std_dev, reserve_percent) = recommend(&participations)?;
    Ok(ReserveRecommendation {
        events,
        mean,
        std_dev,
        reserve_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_plus_sample_std() {
        assert_eq!(recommend(&[80.0, 90.0, 100.0]).unwrap(), (90.0, 10.0, 100.0));
    }

    #[test]
    fn single_event_has_no_spread() {
        assert_eq!(recommend(&[42.5]).unwrap(), (42.5, 0.0, 42.5));
    }

    #[test]
    fn no_events_is_an_error() {
        assert!(matches!(recommend(&[]), Err(AnalyticsError::NoEvents)));
    }

    #[test]
    fn components_round_before_summing() {
        // mean 33.333.., sample std 0.577..
        let (m, sd, r) = recommend(&[33.0, 33.0, 34.0]).unwrap();
        assert_eq!((m, sd), (33.33, 0.58));
        assert_eq!(r, 33.91);
    }
}
