use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::store::{RelationalStore, StoreError};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("cannot read schema file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("schema statement #{index} failed: {source}")]
    Statement {
        index: usize,
        statement: String,
        #[source]
        source: StoreError,
    },
}

/// Split a DDL script into statements.
///
/// Everything after `--` on a line is dropped, blank lines are skipped, and the remaining lines are
/// joined with a single space. A statement ends at a line whose trimmed content ends with `;`.
/// Trailing text without a terminating `;` is discarded.
pub fn split_statements(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for raw in script.lines() {
        let line = match raw.find("--") {
            Some(pos) => &raw[..pos],
            None => raw,
        }
        .trim();
        if line.is_empty() {
            continue;
        }
        current.push(line);
        if line.ends_with(';') {
            statements.push(current.join(" "));
            current.clear();
        }
    }
    if !current.is_empty() {
        warn!(dropped = %current.join(" "), "schema script ends without ';'");
    }
    statements
}

/// Execute every statement of `script` in order, stopping at the first failure.
/// Returns how many statements ran.
pub fn apply_schema<S: RelationalStore + ?Sized>(
    store: &S,
    script: &str,
) -> Result<usize, SchemaError> {
    let statements = split_statements(script);
    for (index, statement) in statements.iter().enumerate() {
        debug!(index, statement = %statement, "schema statement");
        store
            .execute(statement)
            .map_err(|source| SchemaError::Statement {
                index,
                statement: statement.clone(),
                source,
            })?;
    }
    info!(statements = statements.len(), "schema applied");
    Ok(statements.len())
}

pub fn apply_schema_file<S: RelationalStore + ?Sized>(
    store: &S,
    path: &Path,
) -> Result<usize, SchemaError> {
    let script = fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    apply_schema(store, &script)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_and_blank_lines_are_dropped() {
        let script = "-- header\n\nCREATE TABLE a (\n  x INTEGER -- key\n);\n\nCREATE TABLE b (y INTEGER);\n";
        assert_eq!(
            split_statements(script),
            vec![
                "CREATE TABLE a ( x INTEGER );".to_string(),
                "CREATE TABLE b (y INTEGER);".to_string(),
            ]
        );
    }

    #[test]
    fn unterminated_tail_is_not_executed() {
        assert_eq!(split_statements("SELECT 1;\nSELECT 2"), vec!["SELECT 1;"]);
        assert!(split_statements("-- nothing\n\n").is_empty());
    }
}
