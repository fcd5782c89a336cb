//! Introspection of the relations the schema initializer created.

use serde::{Deserialize, Serialize};
use vd_types::Relation;

use crate::helpers::quote_literal;
use crate::store::{RelationalStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Store type name as reported by `information_schema`, e.g. `VARCHAR`, `DATE`.
    pub data_type: String,
}

impl ColumnInfo {
    pub fn is_date(&self) -> bool {
        self.data_type == "DATE" || self.data_type.starts_with("TIMESTAMP")
    }

    pub fn is_bool(&self) -> bool {
        self.data_type == "BOOLEAN"
    }

    pub fn is_text(&self) -> bool {
        self.data_type == "VARCHAR" || self.data_type.starts_with("VARCHAR(")
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self.data_type.as_str(),
            "TINYINT" | "SMALLINT" | "INTEGER" | "BIGINT" | "HUGEINT" | "UTINYINT"
                | "USMALLINT" | "UINTEGER" | "UBIGINT"
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self.data_type.as_str(), "FLOAT" | "DOUBLE" | "REAL")
            || self.data_type.starts_with("DECIMAL")
    }
}

/// Columns of `relation` in declaration order. Empty when the relation does not exist.
pub fn relation_columns<S: RelationalStore + ?Sized>(
    store: &S,
    relation: Relation,
) -> Result<Vec<ColumnInfo>, StoreError> {
    let sql = format!(
        "SELECT column_name, data_type FROM information_schema.columns \
         WHERE table_name = {} ORDER BY ordinal_position",
        quote_literal(relation.table())
    );
    let t = store.query(&sql)?;
    Ok(t.rows()
        .iter()
        .map(|r| ColumnInfo {
            name: r[0].to_string().to_lowercase(),
            data_type: r[1].to_string().to_uppercase(),
        })
        .collect())
}

pub fn relation_exists<S: RelationalStore + ?Sized>(
    store: &S,
    relation: Relation,
) -> Result<bool, StoreError> {
    Ok(!relation_columns(store, relation)?.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duck::DuckStore;

    #[test]
    fn columns_come_back_in_declaration_order() {
        let store = DuckStore::open_in_memory().unwrap();
        store
            .execute("CREATE TABLE patient (ssn VARCHAR, birthday DATE, critical BOOLEAN, n INTEGER)")
            .unwrap();
        let cols = relation_columns(&store, Relation::Patient).unwrap();
        let names: Vec<_> = cols.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["ssn", "birthday", "critical", "n"]);
        assert!(cols[0].is_text() && cols[1].is_date() && cols[2].is_bool() && cols[3].is_integer());
        assert!(!relation_exists(&store, Relation::Diagnosis).unwrap());
    }
}
