//! The DDL shipped with the crate.

use crate::init::{SchemaError, apply_schema};
use crate::store::RelationalStore;

/// Twelve base relations, parents before children.
pub const BUNDLED_SCHEMA: &str = include_str!("../sql/schema.sql");

pub fn create_bundled_schema<S: RelationalStore + ?Sized>(store: &S) -> Result<usize, SchemaError> {
    apply_schema(store, BUNDLED_SCHEMA)
}
