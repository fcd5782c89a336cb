mod common;

use common::{setup_store, t};
use vd_database::store::RelationalStore;
use vd_types::{Relation, Table, Value};

fn symptom_rows(rows: Vec<Vec<Value>>) -> Table {
    let mut table = Table::new(["name", "critical"]);
    for row in rows {
        table.push_row(row).unwrap();
    }
    table
}

#[test]
fn failed_insert_rolls_back_and_store_stays_usable() {
    let store = setup_store();
    // critical is NOT NULL
    let bad = symptom_rows(vec![
        vec![t("fever"), Value::Bool(false)],
        vec![t("rash"), Value::Null],
    ]);
    assert!(store.append(Relation::Symptom, &bad).is_err());
    assert_eq!(store.count(Relation::Symptom).unwrap(), 0);

    let good = symptom_rows(vec![vec![t("fever"), Value::Bool(false)]]);
    assert_eq!(store.append(Relation::Symptom, &good).unwrap(), 1);
    assert_eq!(store.count(Relation::Symptom).unwrap(), 1);
    store.execute("CREATE TABLE after_append (a INTEGER)").unwrap();
}

#[test]
fn failure_in_a_later_chunk_discards_earlier_chunks() {
    let store = setup_store();
    let mut rows: Vec<Vec<Value>> = (0..600)
        .map(|i| vec![t(&format!("s{i}")), Value::Bool(false)])
        .collect();
    // duplicate primary key well past the first chunk
    rows.push(vec![t("s0"), Value::Bool(true)]);
    assert!(store.append(Relation::Symptom, &symptom_rows(rows)).is_err());
    assert_eq!(store.count(Relation::Symptom).unwrap(), 0);

    let retry = symptom_rows(vec![vec![t("s0"), Value::Bool(true)]]);
    assert_eq!(store.append(Relation::Symptom, &retry).unwrap(), 1);
}

#[test]
fn key_set_skips_null_keys() {
    let store = setup_store();
    store
        .execute("INSERT INTO patient VALUES ('P1', 'Alice', NULL, 'F'), ('P2', 'Bob', NULL, NULL)")
        .unwrap();
    let genders = store.key_set(Relation::Patient, &["gender"]).unwrap();
    assert_eq!(genders.len(), 1);
    assert!(genders.contains(&vec!["F".to_string()]));
}
