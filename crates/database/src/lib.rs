//! Vaccine distribution database crate
//!
//! Loads a vaccination campaign workbook into a normalized relational schema held in DuckDB.
//!
//! Key modules:
//! - `store`: the `RelationalStore` boundary (`execute`, `query`, plus transactional `append`).
//! - `duck`: DuckDB implementation of the store, file-backed or in-memory.
//! - `init` / `schema`: DDL script splitting and the bundled schema for the twelve base relations.
//! - `sheets`: the fixed worksheet → relation mappings, including foreign keys.
//! - `plan`: dependency-ordered load plan built from those foreign keys.
//! - `workbook`: worksheet readers (`calamine` for files, in-memory for code-built sheets).
//! - `ingest`: cell coercion, row rejection, and the import driver.
//! - `append`: foreign-key checked appends.
//! - `catalog`: column introspection used to type incoming cells.
//!
//! A typical run: `duck::connect`, `schema::create_bundled_schema`, `plan::LoadPlan::workbook`,
//! then `ingest::import_workbook` with an `XlsxWorkbook`.

pub mod append;
pub mod catalog;
pub mod duck;
pub mod helpers;
pub mod ingest;
pub mod init;
pub mod models;
pub mod plan;
pub mod schema;
pub mod sheets;
pub mod store;
pub mod workbook;

pub use duck::{DuckStore, connect};
pub use store::{RelationalStore, StoreError};
