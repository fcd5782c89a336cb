use thiserror::Error;
use vd_database::StoreError;
use vd_types::DecodeError;

use crate::models::Requirement;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("query failed: {0}")]
    Query(#[from] StoreError),
    #[error("unexpected result shape: {0}")]
    Decode(#[from] DecodeError),
    #[error("no vaccination events with administered doses")]
    NoEvents,
    #[error("prerequisite requirement {0} did not complete")]
    Dependency(Requirement),
}
