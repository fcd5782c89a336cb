use serde::{Deserialize, Serialize};
use vd_types::Relation;

/// A spreadsheet row that failed coercion and was left out of the load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRejection {
    pub sheet: String,
    /// 1-based spreadsheet row number, the header being row 1.
    pub row: usize,
    pub column: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationLoad {
    pub relation: Relation,
    pub sheet: String,
    pub appended: usize,
    pub rejected: Vec<RowRejection>,
    pub ignored_headers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub loads: Vec<RelationLoad>,
}

impl ImportReport {
    pub fn total_appended(&self) -> usize {
        self.loads.iter().map(|l| l.appended).sum()
    }

    pub fn total_rejected(&self) -> usize {
        self.loads.iter().map(|l| l.rejected.len()).sum()
    }

    pub fn rejections(&self) -> impl Iterator<Item = &RowRejection> {
        self.loads.iter().flat_map(|l| l.rejected.iter())
    }

    pub fn load(&self, relation: Relation) -> Option<&RelationLoad> {
        self.loads.iter().find(|l| l.relation == relation)
    }
}
