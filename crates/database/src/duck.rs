//! DuckDB implementation of the relational store.
//!
//! The store is a single synchronous connection, either file-backed or in-memory. Query results
//! are materialised into [`Table`]s; DuckDB's integer widths collapse to `Int`, floating and
//! decimal types to `Float`, and `DATE`/`TIMESTAMP` to `Date`.

use chrono::{DateTime, NaiveDate};
use duckdb::Connection;
use duckdb::types::{TimeUnit, Value as DuckValue};
use std::path::Path;
use tracing::debug;
use vd_types::{Table, Value};

use crate::store::{RelationalStore, StoreError};

pub struct DuckStore {
    conn: Connection,
}

/// Open a file-backed store, or an in-memory one when `db_file` is `None`.
pub fn connect(db_file: Option<&Path>) -> Result<DuckStore, StoreError> {
    let (conn, target) = match db_file {
        Some(p) => (Connection::open(p), p.display().to_string()),
        None => (Connection::open_in_memory(), ":memory:".to_string()),
    };
    let conn = conn.map_err(|source| StoreError::Connectivity { target, source })?;
    Ok(DuckStore { conn })
}

impl DuckStore {
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        connect(Some(db_path))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        connect(None)
    }
}

impl RelationalStore for DuckStore {
    fn execute(&self, sql: &str) -> Result<(), StoreError> {
        debug!(sql, "duckdb execute");
        self.conn
            .execute_batch(sql)
            .map_err(|source| StoreError::Statement {
                sql: sql.to_string(),
                source,
            })
    }

    fn query(&self, sql: &str) -> Result<Table, StoreError> {
        debug!(sql, "duckdb query");
        let statement_err = |source: duckdb::Error| StoreError::Statement {
            sql: sql.to_string(),
            source,
        };
        let mut stmt = self.conn.prepare(sql).map_err(statement_err)?;
        let mut rows = stmt.query([]).map_err(statement_err)?;
        let columns: Vec<String> = rows
            .as_ref()
            .map(|s| s.column_names())
            .unwrap_or_default();

        let mut table = Table::new(&columns);
        while let Some(row) = rows.next().map_err(statement_err)? {
            let mut out = Vec::with_capacity(columns.len());
            for (i, name) in columns.iter().enumerate() {
                let raw: DuckValue = row.get(i).map_err(statement_err)?;
                out.push(from_duck(name, raw)?);
            }
            // width always matches the statement's column list
            let _ = table.push_row(out);
        }
        Ok(table)
    }
}

fn epoch() -> NaiveDate {
    // 1970-01-01
    NaiveDate::default()
}

fn from_duck(column: &str, v: DuckValue) -> Result<Value, StoreError> {
    let unsupported = |v: &DuckValue| StoreError::UnsupportedType {
        column: column.to_string(),
        type_name: format!("{v:?}"),
    };
    Ok(match v {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(b) => Value::Bool(b),
        DuckValue::TinyInt(i) => Value::Int(i.into()),
        DuckValue::SmallInt(i) => Value::Int(i.into()),
        DuckValue::Int(i) => Value::Int(i.into()),
        DuckValue::BigInt(i) => Value::Int(i),
        DuckValue::UTinyInt(i) => Value::Int(i.into()),
        DuckValue::USmallInt(i) => Value::Int(i.into()),
        DuckValue::UInt(i) => Value::Int(i.into()),
        DuckValue::HugeInt(i) => Value::Int(i64::try_from(i).map_err(|_| unsupported(&v))?),
        DuckValue::UBigInt(i) => Value::Int(i64::try_from(i).map_err(|_| unsupported(&v))?),
        DuckValue::Float(f) => Value::Float(f.into()),
        DuckValue::Double(f) => Value::Float(f),
        DuckValue::Decimal(d) => Value::Float(
            d.to_string()
                .parse::<f64>()
                .map_err(|_| unsupported(&v))?,
        ),
        DuckValue::Text(s) => Value::Text(s),
        DuckValue::Date32(days) => Value::Date(
            epoch()
                .checked_add_signed(chrono::Duration::days(days.into()))
                .ok_or_else(|| unsupported(&v))?,
        ),
        DuckValue::Timestamp(unit, t) => {
            let micros = match unit {
                TimeUnit::Second => t.saturating_mul(1_000_000),
                TimeUnit::Millisecond => t.saturating_mul(1_000),
                TimeUnit::Microsecond => t,
                TimeUnit::Nanosecond => t / 1_000,
            };
            let dt = DateTime::from_timestamp_micros(micros).ok_or_else(|| {
                StoreError::UnsupportedType {
                    column: column.to_string(),
                    type_name: format!("TIMESTAMP {t}"),
                }
            })?;
            Value::Date(dt.date_naive())
        }
        other => return Err(unsupported(&other)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_decodes_core_types() {
        let store = DuckStore::open_in_memory().unwrap();
        let t = store
            .query(
                "SELECT 1::INTEGER AS i, 2.5::DOUBLE AS f, 'x' AS s, TRUE AS b, \
                 DATE '2021-05-05' AS d, NULL::VARCHAR AS n, 7::BIGINT AS c",
            )
            .unwrap();
        assert_eq!(t.columns(), ["i", "f", "s", "b", "d", "n", "c"]);
        let row = &t.rows()[0];
        assert_eq!(row[0], Value::Int(1));
        assert_eq!(row[1], Value::Float(2.5));
        assert_eq!(row[2], Value::Text("x".into()));
        assert_eq!(row[3], Value::Bool(true));
        assert_eq!(
            row[4],
            Value::Date(NaiveDate::from_ymd_opt(2021, 5, 5).unwrap())
        );
        assert_eq!(row[5], Value::Null);
        assert_eq!(row[6], Value::Int(7));
    }

    #[test]
    fn empty_results_keep_their_columns() {
        let store = DuckStore::open_in_memory().unwrap();
        store.execute("CREATE TABLE t (a INTEGER, b VARCHAR)").unwrap();
        let t = store.query("SELECT a, b FROM t").unwrap();
        assert!(t.is_empty());
        assert_eq!(t.columns(), ["a", "b"]);
    }

    #[test]
    fn failed_statement_names_the_sql() {
        let store = DuckStore::open_in_memory().unwrap();
        let err = store.execute("SELEKT 1").unwrap_err();
        assert!(matches!(err, StoreError::Statement { ref sql, .. } if sql == "SELEKT 1"));
    }
}
