use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use vd_database::ingest::import_sheet;
use vd_database::schema::create_bundled_schema;
use vd_database::sheets::mapping_for;
use vd_database::store::RelationalStore;
use vd_database::workbook::{WorkbookSource, XlsxWorkbook};
use vd_database::duck::DuckStore;
use vd_types::{Relation, Value};

fn write_patients(path: &std::path::Path) {
    let mut workbook = Workbook::new();
    let date_fmt = Format::new().set_num_format("yyyy-mm-dd");
    let ws = workbook.add_worksheet();
    ws.set_name("Patients").unwrap();
    for (c, h) in ["ssNo", "name", "date of birth", "gender "].iter().enumerate() {
        ws.write_string(0, c as u16, *h).unwrap();
    }
    ws.write_string(1, 0, "120390-123A").unwrap();
    ws.write_string(1, 1, "Alice").unwrap();
    ws.write_datetime_with_format(1, 2, &ExcelDateTime::from_ymd(1990, 3, 12).unwrap(), &date_fmt)
        .unwrap();
    ws.write_string(1, 3, "F").unwrap();
    ws.write_string(2, 0, "010101-9876").unwrap();
    ws.write_string(2, 1, "Bob").unwrap();
    ws.write_string(2, 2, "01.01.1961").unwrap();
    ws.write_string(2, 3, "M").unwrap();
    workbook.save(path).unwrap();
}

#[test]
fn calamine_reader_feeds_the_importer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("campaign.xlsx");
    write_patients(&path);

    let mut wb = XlsxWorkbook::open(&path).unwrap();
    assert_eq!(wb.sheet_names(), vec!["Patients".to_string()]);

    let store = DuckStore::open_in_memory().unwrap();
    create_bundled_schema(&store).unwrap();
    let load = import_sheet(&store, &mut wb, &mapping_for(Relation::Patient).unwrap()).unwrap();
    assert_eq!(load.appended, 2);
    assert!(load.rejected.is_empty());

    let rows = store
        .query("SELECT ssn, birthday, gender FROM patient ORDER BY name")
        .unwrap();
    assert_eq!(
        rows.rows()[0],
        vec![
            Value::from("120390-123A"),
            Value::Date(chrono::NaiveDate::from_ymd_opt(1990, 3, 12).unwrap()),
            Value::from("F"),
        ]
    );
    assert_eq!(
        rows.rows()[1][1],
        Value::Date(chrono::NaiveDate::from_ymd_opt(1961, 1, 1).unwrap())
    );
}

#[test]
fn opening_a_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(XlsxWorkbook::open(&dir.path().join("nope.xlsx")).is_err());
}
