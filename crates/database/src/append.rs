//! Foreign-key checked appends.
//!
//! DuckDB enforces the constraints too, but its error text does not say which key broke. The
//! pre-check reports the first missing key and the parent it should have matched, and leaves the
//! relation untouched.

use tracing::debug;
use vd_types::{Table, Value};

use crate::ingest::ImportError;
use crate::sheets::{ForeignKey, SheetMapping};
use crate::store::RelationalStore;

/// Verify every foreign key of `batch` against the parent's current rows.
/// Rows with a NULL in any key column are not checked.
pub fn check_foreign_keys<S: RelationalStore + ?Sized>(
    store: &S,
    mapping: &SheetMapping,
    batch: &Table,
) -> Result<(), ImportError> {
    for fk in mapping.foreign_keys {
        let Some(indices) = key_indices(batch, fk) else {
            debug!(relation = %mapping.relation, columns = ?fk.columns, "fk columns absent from batch");
            continue;
        };
        let parent_keys = store
            .key_set(fk.parent, fk.parent_columns)
            .map_err(|source| ImportError::Store {
                relation: fk.parent,
                source,
            })?;

        for row in batch.rows() {
            let cells: Vec<&Value> = indices.iter().map(|&i| &row[i]).collect();
            if cells.iter().any(|v| v.is_null()) {
                continue;
            }
            let key: Vec<String> = cells.iter().map(|v| v.to_string()).collect();
            if !parent_keys.contains(&key) {
                return Err(ImportError::ReferentialIntegrity {
                    relation: mapping.relation,
                    columns: fk.columns.join(", "),
                    key: key.join(", "),
                    parent: fk.parent,
                });
            }
        }
    }
    Ok(())
}

fn key_indices(batch: &Table, fk: &ForeignKey) -> Option<Vec<usize>> {
    fk.columns.iter().map(|c| batch.column_index(c)).collect()
}

/// Check foreign keys, then append the whole batch in one transaction.
pub fn append_checked<S: RelationalStore + ?Sized>(
    store: &S,
    mapping: &SheetMapping,
    batch: &Table,
) -> Result<usize, ImportError> {
    check_foreign_keys(store, mapping, batch)?;
    let appended = store
        .append(mapping.relation, batch)
        .map_err(|source| ImportError::Store {
            relation: mapping.relation,
            source,
        })?;
    debug!(relation = %mapping.relation, rows = appended, "appended");
    Ok(appended)
}
