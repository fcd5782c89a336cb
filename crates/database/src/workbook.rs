//! Worksheet access.
//!
//! The importer only needs a header row and data rows per named sheet. [`XlsxWorkbook`] reads
//! spreadsheet files with `calamine`; [`MemoryWorkbook`] holds sheets built in code.

use calamine::{Data, Reader, Sheets, open_workbook_auto};
use chrono::{Duration, NaiveDate};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use vd_types::Value;
use vd_types::calendar::parse_date_text;

use crate::ingest::ImportError;

/// One worksheet: trimmed headers and raw cells, header row excluded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Sheet {
    pub fn new<S: AsRef<str>>(name: &str, headers: &[S], rows: Vec<Vec<Value>>) -> Self {
        Self {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.as_ref().trim().to_string()).collect(),
            rows,
        }
    }
}

pub trait WorkbookSource {
    fn sheet_names(&self) -> Vec<String>;

    /// Read one sheet by name. Names match exactly first, then trimmed and ignoring case.
    fn sheet(&mut self, name: &str) -> Result<Sheet, ImportError>;
}

fn resolve_name(names: &[String], wanted: &str) -> Option<String> {
    names
        .iter()
        .find(|n| n.as_str() == wanted)
        .or_else(|| {
            names
                .iter()
                .find(|n| n.trim().eq_ignore_ascii_case(wanted.trim()))
        })
        .cloned()
}

pub struct XlsxWorkbook {
    path: PathBuf,
    inner: Sheets<BufReader<File>>,
}

impl XlsxWorkbook {
    pub fn open(path: &Path) -> Result<Self, ImportError> {
        let inner = open_workbook_auto(path).map_err(|source| ImportError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WorkbookSource for XlsxWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names()
    }

    fn sheet(&mut self, name: &str) -> Result<Sheet, ImportError> {
        let resolved = resolve_name(&self.inner.sheet_names(), name)
            .ok_or_else(|| ImportError::MissingSheet(name.to_string()))?;
        let range = self
            .inner
            .worksheet_range(&resolved)
            .map_err(|source| ImportError::Sheet {
                sheet: resolved.clone(),
                source,
            })?;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(h) => h.iter().map(|c| c.to_string().trim().to_string()).collect(),
            None => Vec::new(),
        };
        let rows = rows
            .map(|r| r.iter().map(cell_value).collect::<Vec<_>>())
            .collect();
        Ok(Sheet {
            name: resolved,
            headers,
            rows,
        })
    }
}

/// Days from the 1900 system's day zero (1899-12-30) to 1970-01-01.
const SERIAL_UNIX_OFFSET: i64 = 25_569;

/// Convert a 1900-system serial to a date, dropping the time of day. Serials before 1900-03-01
/// are off by one, as in every spreadsheet using this system.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..2_958_466.0).contains(&serial) {
        return None;
    }
    NaiveDate::default().checked_add_signed(Duration::days(serial.floor() as i64 - SERIAL_UNIX_OFFSET))
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Value::Null
            } else {
                Value::Text(s.to_string())
            }
        }
        Data::Int(i) => Value::Int(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Value::Int(*f as i64),
        Data::Float(f) => Value::Float(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(Value::Date)
            .unwrap_or(Value::Float(dt.as_f64())),
        Data::DateTimeIso(s) => parse_date_text(s)
            .map(Value::Date)
            .unwrap_or_else(|| Value::Text(s.clone())),
        Data::DurationIso(s) => Value::Text(s.clone()),
        Data::Error(e) => Value::Text(format!("{e:?}")),
    }
}

/// Sheets assembled in code, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<Sheet>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.insert(sheet);
        self
    }

    /// Add a sheet, replacing one of the same name.
    pub fn insert(&mut self, sheet: Sheet) {
        self.sheets.retain(|s| s.name != sheet.name);
        self.sheets.push(sheet);
    }
}

impl WorkbookSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn sheet(&mut self, name: &str) -> Result<Sheet, ImportError> {
        let resolved = resolve_name(&self.sheet_names(), name)
            .ok_or_else(|| ImportError::MissingSheet(name.to_string()))?;
        self.sheets
            .iter()
            .find(|s| s.name == resolved)
            .cloned()
            .ok_or(ImportError::MissingSheet(resolved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(44197.0, Some((2021, 1, 1)))]
    #[case(44197.75, Some((2021, 1, 1)))]
    #[case(61.0, Some((1900, 3, 1)))]
    #[case(0.0, None)]
    #[case(f64::NAN, None)]
    fn serials_map_to_calendar_dates(#[case] serial: f64, #[case] expected: Option<(i32, u32, u32)>) {
        let expected = expected.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap());
        assert_eq!(excel_serial_to_date(serial), expected);
    }

    #[test]
    fn integral_floats_become_ints_and_blanks_null() {
        assert_eq!(cell_value(&Data::Float(15.0)), Value::Int(15));
        assert_eq!(cell_value(&Data::Float(-2.5)), Value::Float(-2.5));
        assert_eq!(cell_value(&Data::String("  ".into())), Value::Null);
        assert_eq!(cell_value(&Data::String(" Oslo ".into())), Value::Text("Oslo".into()));
    }

    #[test]
    fn memory_sheets_resolve_by_trimmed_name() {
        let mut wb = MemoryWorkbook::new().with_sheet(Sheet::new(
            "Transportation log ",
            &["batchID"],
            vec![vec![Value::from("B1")]],
        ));
        assert_eq!(wb.sheet("Transportation log").unwrap().rows.len(), 1);
        assert!(matches!(
            wb.sheet("Diagnosis"),
            Err(ImportError::MissingSheet(ref s)) if s == "Diagnosis"
        ));
    }
}
