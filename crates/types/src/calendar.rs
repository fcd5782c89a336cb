use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Weekday a staff member is rostered on, as written in the shift sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShiftDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown weekday '{0}'")]
pub struct UnknownWeekday(pub String);

impl ShiftDay {
    /// ISO-8601 day number, Monday = 1 … Sunday = 7.
    pub fn iso_number(self) -> u32 {
        match self {
            ShiftDay::Monday => 1,
            ShiftDay::Tuesday => 2,
            ShiftDay::Wednesday => 3,
            ShiftDay::Thursday => 4,
            ShiftDay::Friday => 5,
            ShiftDay::Saturday => 6,
            ShiftDay::Sunday => 7,
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Mon => ShiftDay::Monday,
            Weekday::Tue => ShiftDay::Tuesday,
            Weekday::Wed => ShiftDay::Wednesday,
            Weekday::Thu => ShiftDay::Thursday,
            Weekday::Fri => ShiftDay::Friday,
            Weekday::Sat => ShiftDay::Saturday,
            Weekday::Sun => ShiftDay::Sunday,
        }
    }
}

impl FromStr for ShiftDay {
    type Err = UnknownWeekday;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let day = match s.trim().to_ascii_lowercase().as_str() {
            "monday" | "mon" => ShiftDay::Monday,
            "tuesday" | "tue" => ShiftDay::Tuesday,
            "wednesday" | "wed" => ShiftDay::Wednesday,
            "thursday" | "thu" => ShiftDay::Thursday,
            "friday" | "fri" => ShiftDay::Friday,
            "saturday" | "sat" => ShiftDay::Saturday,
            "sunday" | "sun" => ShiftDay::Sunday,
            _ => return Err(UnknownWeekday(s.to_string())),
        };
        Ok(day)
    }
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d.%m.%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a calendar date from workbook or configuration text. Time-of-day parts are dropped.
pub fn parse_date_text(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
}
