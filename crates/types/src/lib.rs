//! Shared vocabulary for the vaccine distribution pipeline.
//!
//! - `keys`: the relations of the data model and their storage names.
//! - `cells`: the tabular result shape (`Table` of `Value`s) exchanged with the store.
//! - `calendar`: shift weekday mapping and the date formats accepted from workbooks.

pub mod calendar;
pub mod cells;
pub mod keys;

pub use cells::{DecodeError, RowRef, Table, Value};
pub use keys::Relation;
