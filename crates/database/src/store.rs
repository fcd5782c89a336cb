//! The relational store boundary.
//!
//! Two verbs are enough for the whole pipeline: `execute` for statements without a result and
//! `query` for statements returning rows. `append` is layered on top of them so any store that
//! can run SQL gets transactional batch inserts for free.

use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};
use vd_types::{Relation, Table};

use crate::helpers::render_literal;

/// Rows per INSERT statement when appending.
const APPEND_CHUNK_ROWS: usize = 500;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot open relational store at {target}: {source}")]
    Connectivity {
        target: String,
        #[source]
        source: duckdb::Error,
    },
    #[error("statement failed: {source}; sql: {sql}")]
    Statement {
        sql: String,
        #[source]
        source: duckdb::Error,
    },
    #[error("column '{column}' has unsupported type {type_name}")]
    UnsupportedType { column: String, type_name: String },
}

pub trait RelationalStore {
    /// Run one or more statements, discarding any result.
    fn execute(&self, sql: &str) -> Result<(), StoreError>;

    /// Run a single statement and collect its rows.
    fn query(&self, sql: &str) -> Result<Table, StoreError>;

    /// Append `batch` to `relation`, matching columns by name. Either every row lands or none.
    fn append(&self, relation: Relation, batch: &Table) -> Result<usize, StoreError> {
        if batch.is_empty() {
            return Ok(0);
        }
        let columns = batch.columns().join(", ");
        debug!(relation = %relation, rows = batch.len(), "append");

        self.execute("BEGIN TRANSACTION")?;
        let written = batch
            .rows()
            .chunks(APPEND_CHUNK_ROWS)
            .try_for_each(|chunk| {
                let values = chunk
                    .iter()
                    .map(|row| {
                        let cells: Vec<String> = row.iter().map(render_literal).collect();
                        format!("({})", cells.join(", "))
                    })
                    .collect::<Vec<_>>()
                    .join(",\n");
                self.execute(&format!(
                    "INSERT INTO {} ({columns}) VALUES {values}",
                    relation.table()
                ))
            })
            .and_then(|_| self.execute("COMMIT"));

        if let Err(e) = written {
            // the connection must leave the transaction whatever happened
            if let Err(rollback) = self.execute("ROLLBACK") {
                warn!(relation = %relation, error = %rollback, "rollback after failed append");
            }
            return Err(e);
        }
        Ok(batch.len())
    }

    fn count(&self, relation: Relation) -> Result<usize, StoreError> {
        let t = self.query(&format!("SELECT COUNT(*) AS n FROM {}", relation.table()))?;
        Ok(t.rows()
            .first()
            .and_then(|r| r.first())
            .and_then(|v| v.as_i64())
            .unwrap_or(0) as usize)
    }

    /// Distinct non-null key tuples of `relation`, each cell rendered as text.
    fn key_set(
        &self,
        relation: Relation,
        columns: &[&str],
    ) -> Result<HashSet<Vec<String>>, StoreError> {
        let not_null = columns
            .iter()
            .map(|c| format!("{c} IS NOT NULL"))
            .collect::<Vec<_>>()
            .join(" AND ");
        let sql = format!(
            "SELECT DISTINCT {} FROM {} WHERE {not_null}",
            columns.join(", "),
            relation.table()
        );
        let t = self.query(&sql)?;
        Ok(t.rows()
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect())
    }
}
