//! Tabular results exchanged with the relational store.
//!
//! A [`Table`] is a list of lower-case column names plus rows of [`Value`]s. Column lookups are
//! case-insensitive, matching how the store treats identifiers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integers, and floats without a fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("column '{0}' not present in result")]
    MissingColumn(String),
    #[error("row {row}: column '{column}' is null")]
    Null { column: String, row: usize },
    #[error("row {row}: column '{column}' expected {expected}, found {found}")]
    Type {
        column: String,
        row: usize,
        expected: &'static str,
        found: &'static str,
    },
    #[error("row has {found} values, table has {expected} columns")]
    Width { expected: usize, found: usize },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            columns: columns
                .into_iter()
                .map(|c| c.as_ref().to_lowercase())
                .collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), DecodeError> {
        if row.len() != self.columns.len() {
            return Err(DecodeError::Width {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = RowRef<'_>> {
        (0..self.rows.len()).map(move |index| RowRef { table: self, index })
    }

    /// Decode every row with `f`, stopping at the first failure.
    pub fn decode<T, F>(&self, f: F) -> Result<Vec<T>, DecodeError>
    where
        F: Fn(&RowRef<'_>) -> Result<T, DecodeError>,
    {
        self.iter().map(|r| f(&r)).collect()
    }
}

/// Borrowed view of one row with typed, column-named accessors.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> RowRef<'a> {
    pub fn get(&self, column: &str) -> Result<&'a Value, DecodeError> {
        let idx = self
            .table
            .column_index(column)
            .ok_or_else(|| DecodeError::MissingColumn(column.to_string()))?;
        Ok(&self.table.rows[self.index][idx])
    }

    fn type_error(&self, column: &str, expected: &'static str, found: &Value) -> DecodeError {
        DecodeError::Type {
            column: column.to_string(),
            row: self.index,
            expected,
            found: found.type_name(),
        }
    }

    fn required<T>(&self, column: &str, v: Option<T>) -> Result<T, DecodeError> {
        v.ok_or_else(|| DecodeError::Null {
            column: column.to_string(),
            row: self.index,
        })
    }

    pub fn opt_text(&self, column: &str) -> Result<Option<String>, DecodeError> {
        match self.get(column)? {
            Value::Null => Ok(None),
            Value::Text(s) => Ok(Some(s.clone())),
            // identifiers typed as numbers in a workbook still compare as text
            v @ (Value::Int(_) | Value::Float(_)) => Ok(Some(v.to_string())),
            v => Err(self.type_error(column, "text", v)),
        }
    }

    pub fn text(&self, column: &str) -> Result<String, DecodeError> {
        let v = self.opt_text(column)?;
        self.required(column, v)
    }

    pub fn opt_date(&self, column: &str) -> Result<Option<NaiveDate>, DecodeError> {
        match self.get(column)? {
            Value::Null => Ok(None),
            Value::Date(d) => Ok(Some(*d)),
            v => Err(self.type_error(column, "date", v)),
        }
    }

    pub fn date(&self, column: &str) -> Result<NaiveDate, DecodeError> {
        let v = self.opt_date(column)?;
        self.required(column, v)
    }

    pub fn opt_int(&self, column: &str) -> Result<Option<i64>, DecodeError> {
        match self.get(column)? {
            Value::Null => Ok(None),
            v => v
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.type_error(column, "int", v)),
        }
    }

    pub fn int(&self, column: &str) -> Result<i64, DecodeError> {
        let v = self.opt_int(column)?;
        self.required(column, v)
    }

    pub fn opt_bool(&self, column: &str) -> Result<Option<bool>, DecodeError> {
        match self.get(column)? {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(*b)),
            v => Err(self.type_error(column, "bool", v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut t = Table::new(["SSN", "Birthday", "doses"]);
        t.push_row(vec![
            "010203-1234".into(),
            NaiveDate::from_ymd_opt(1990, 1, 2).into(),
            Value::Int(2),
        ])
        .unwrap();
        t.push_row(vec!["020304-5678".into(), Value::Null, Value::Float(1.0)])
            .unwrap();
        t
    }

    #[test]
    fn columns_are_lower_cased_and_lookup_ignores_case() {
        let t = sample();
        assert_eq!(t.columns(), ["ssn", "birthday", "doses"]);
        assert_eq!(t.column_index("BIRTHDAY"), Some(1));
    }

    #[test]
    fn typed_accessors_decode_and_report_nulls() {
        let t = sample();
        let rows: Vec<_> = t.iter().collect();
        assert_eq!(rows[0].text("ssn").unwrap(), "010203-1234");
        assert_eq!(rows[1].int("doses").unwrap(), 1);
        assert_eq!(rows[1].opt_date("birthday").unwrap(), None);
        assert!(matches!(
            rows[1].date("birthday"),
            Err(DecodeError::Null { row: 1, .. })
        ));
        assert!(matches!(
            rows[0].date("ssn"),
            Err(DecodeError::Type { expected: "date", found: "text", .. })
        ));
        assert!(matches!(
            rows[0].get("nope"),
            Err(DecodeError::MissingColumn(_))
        ));
    }

    #[test]
    fn push_row_rejects_wrong_width() {
        let mut t = Table::new(["a", "b"]);
        assert_eq!(
            t.push_row(vec![Value::Int(1)]),
            Err(DecodeError::Width {
                expected: 2,
                found: 1
            })
        );
        assert!(t.is_empty());
    }

    #[test]
    fn display_renders_dates_iso() {
        let d = Value::Date(NaiveDate::from_ymd_opt(2021, 5, 5).unwrap());
        assert_eq!(d.to_string(), "2021-05-05");
        assert_eq!(Value::Null.to_string(), "");
    }
}
