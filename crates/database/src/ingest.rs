//! Workbook import: map each sheet onto its relation, coerce cells, and append in plan order.
//!
//! Row-level coercion failures are recorded and the row is skipped. Anything at statement level
//! (missing sheet, foreign-key violation, store failure) stops the import and is returned.
//!
//! Rejections cascade: a parent row skipped for one bad cell never reaches its relation, so the
//! first child row that references its key fails the foreign-key check and ends the import with
//! [`ImportError::ReferentialIntegrity`]. The parent's rejection is logged at `warn` before that.

use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};
use vd_types::calendar::parse_date_text;
use vd_types::{Relation, Table, Value};

use crate::append::append_checked;
use crate::catalog::{ColumnInfo, relation_columns};
use crate::models::{ImportReport, RelationLoad, RowRejection};
use crate::plan::{LoadPlan, PlanError};
use crate::sheets::SheetMapping;
use crate::store::{RelationalStore, StoreError};
use crate::workbook::{Sheet, WorkbookSource, excel_serial_to_date};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("cannot open workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    #[error("cannot read sheet '{sheet}': {source}")]
    Sheet {
        sheet: String,
        #[source]
        source: calamine::Error,
    },
    #[error("workbook has no sheet named '{0}'")]
    MissingSheet(String),
    #[error("relation {0} does not exist; apply the schema first")]
    MissingRelation(Relation),
    #[error("{relation}: ({columns}) = ({key}) has no matching row in {parent}")]
    ReferentialIntegrity {
        relation: Relation,
        columns: String,
        key: String,
        parent: Relation,
    },
    #[error("store failure while loading {relation}: {source}")]
    Store {
        relation: Relation,
        #[source]
        source: StoreError,
    },
    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// A sheet mapped onto its relation's columns, ready to append.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedBatch {
    pub table: Table,
    pub rejected: Vec<RowRejection>,
    pub ignored_headers: Vec<String>,
}

/// Map `sheet` through `mapping` onto the relation's `columns`.
///
/// Headers that do not name a column are ignored. Blank rows are skipped. A row with any cell
/// that cannot be coerced to its column's type is rejected as a whole.
pub fn map_sheet(sheet: &Sheet, mapping: &SheetMapping, columns: &[ColumnInfo]) -> MappedBatch {
    let mut kept: Vec<(usize, &ColumnInfo)> = Vec::new();
    let mut ignored_headers = Vec::new();
    for (i, header) in sheet.headers.iter().enumerate() {
        let target = mapping.target_column(header);
        match columns.iter().find(|c| c.name == target) {
            Some(col) if !kept.iter().any(|(_, k)| k.name == col.name) => kept.push((i, col)),
            _ => {
                if !header.trim().is_empty() {
                    warn!(sheet = %sheet.name, header = %header, relation = %mapping.relation, "header ignored");
                    ignored_headers.push(header.clone());
                }
            }
        }
    }

    let mut table = Table::new(kept.iter().map(|(_, c)| c.name.as_str()));
    let mut rejected = Vec::new();
    for (index, row) in sheet.rows.iter().enumerate() {
        if row.iter().all(Value::is_null) {
            continue;
        }
        let spreadsheet_row = index + 2;
        let mut out = Vec::with_capacity(kept.len());
        let mut failure = None;
        for (i, col) in &kept {
            let raw = row.get(*i).cloned().unwrap_or(Value::Null);
            match coerce(raw, mapping, col) {
                Ok(v) => out.push(v),
                Err(reason) => {
                    failure = Some(RowRejection {
                        sheet: sheet.name.clone(),
                        row: spreadsheet_row,
                        column: col.name.clone(),
                        reason,
                    });
                    break;
                }
            }
        }
        match failure {
            Some(r) => {
                warn!(sheet = %r.sheet, row = r.row, column = %r.column, reason = %r.reason, "row rejected");
                rejected.push(r);
            }
            None => {
                // width is kept.len() by construction
                let _ = table.push_row(out);
            }
        }
    }

    MappedBatch {
        table,
        rejected,
        ignored_headers,
    }
}

/// Coerce one cell to the type its column stores.
pub fn coerce(raw: Value, mapping: &SheetMapping, col: &ColumnInfo) -> Result<Value, String> {
    if raw.is_null() {
        return Ok(Value::Null);
    }
    if mapping.is_date(&col.name) || col.is_date() {
        return coerce_date(raw);
    }
    if mapping.is_bool(&col.name) || col.is_bool() {
        return coerce_bool(raw);
    }
    if col.is_text() {
        return Ok(match raw {
            Value::Text(_) => raw,
            other => Value::Text(other.to_string()),
        });
    }
    if col.is_integer() {
        return match &raw {
            Value::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| format!("'{s}' is not an integer")),
            v => v
                .as_i64()
                .map(Value::Int)
                .ok_or_else(|| format!("{} value '{v}' is not an integer", v.type_name())),
        };
    }
    if col.is_float() {
        return match &raw {
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| format!("'{s}' is not a number")),
            v => v
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| format!("{} value '{v}' is not a number", v.type_name())),
        };
    }
    Ok(raw)
}

fn coerce_date(raw: Value) -> Result<Value, String> {
    match raw {
        Value::Date(_) => Ok(raw),
        Value::Text(s) => parse_date_text(&s)
            .map(Value::Date)
            .ok_or_else(|| format!("'{s}' is not a date")),
        Value::Int(_) | Value::Float(_) => raw
            .as_f64()
            .and_then(excel_serial_to_date)
            .map(Value::Date)
            .ok_or_else(|| format!("{raw} is not a date serial")),
        other => Err(format!("{} value '{other}' is not a date", other.type_name())),
    }
}

fn coerce_bool(raw: Value) -> Result<Value, String> {
    match raw {
        Value::Bool(_) => Ok(raw),
        Value::Int(i) => Ok(Value::Bool(i != 0)),
        Value::Float(f) => Ok(Value::Bool(f != 0.0)),
        Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" => Ok(Value::Bool(true)),
            "false" | "f" | "no" | "n" | "0" => Ok(Value::Bool(false)),
            _ => Err(format!("'{s}' is not a boolean")),
        },
        other => Err(format!("{} value '{other}' is not a boolean", other.type_name())),
    }
}

/// Import a single sheet into its relation. Rows are appended to whatever is already there.
pub fn import_sheet<S, W>(
    store: &S,
    source: &mut W,
    mapping: &SheetMapping,
) -> Result<RelationLoad, ImportError>
where
    S: RelationalStore + ?Sized,
    W: WorkbookSource + ?Sized,
{
    let columns = relation_columns(store, mapping.relation).map_err(|source| ImportError::Store {
        relation: mapping.relation,
        source,
    })?;
    if columns.is_empty() {
        return Err(ImportError::MissingRelation(mapping.relation));
    }

    let sheet = source.sheet(mapping.sheet)?;
    let batch = map_sheet(&sheet, mapping, &columns);
    let appended = append_checked(store, mapping, &batch.table)?;
    info!(
        relation = %mapping.relation,
        sheet = %sheet.name,
        appended,
        rejected = batch.rejected.len(),
        "relation loaded"
    );
    Ok(RelationLoad {
        relation: mapping.relation,
        sheet: sheet.name,
        appended,
        rejected: batch.rejected,
        ignored_headers: batch.ignored_headers,
    })
}

/// Import every sheet of `plan` in order, stopping at the first statement-level failure.
pub fn import_workbook<S, W>(
    store: &S,
    source: &mut W,
    plan: &LoadPlan,
) -> Result<ImportReport, ImportError>
where
    S: RelationalStore + ?Sized,
    W: WorkbookSource + ?Sized,
{
    let mut report = ImportReport::default();
    for mapping in plan.steps() {
        report.loads.push(import_sheet(store, source, mapping)?);
    }
    info!(
        relations = report.loads.len(),
        rows = report.total_appended(),
        rejected = report.total_rejected(),
        "workbook imported"
    );
    Ok(report)
}
