#![allow(dead_code)]

use chrono::NaiveDate;
use vd_database::duck::DuckStore;
use vd_database::schema::create_bundled_schema;
use vd_database::workbook::{MemoryWorkbook, Sheet};
use vd_types::Value;

pub fn day(y: i32, m: u32, d: u32) -> Value {
    Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

pub fn t(s: &str) -> Value {
    Value::from(s)
}

pub fn setup_store() -> DuckStore {
    let store = DuckStore::open_in_memory().expect("duckdb mem");
    create_bundled_schema(&store).expect("bundled schema");
    store
}

/// A small but complete campaign: two stations, two vaccine types, three patients.
pub fn campaign_workbook() -> MemoryWorkbook {
    MemoryWorkbook::new()
        .with_sheet(Sheet::new(
            "VaccineType",
            &["ID", "name", "doses", "tempMin", "tempMax"],
            vec![
                vec![t("V01"), t("Comirnaty"), Value::Int(2), Value::Int(-90), Value::Int(-60)],
                vec![t("V02"), t("Vaxzevria"), Value::Int(2), Value::Int(2), Value::Int(8)],
            ],
        ))
        .with_sheet(Sheet::new(
            "Manufacturer",
            &["ID", "country", "phone", "vaccine"],
            vec![
                vec![t("M1"), t("Germany"), Value::Int(4_930_123), t("V01")],
                vec![t("M2"), t("Sweden"), t("+46 8 123"), t("V02")],
            ],
        ))
        .with_sheet(Sheet::new(
            "VaccinationStations",
            &["name", "address", "phone"],
            vec![
                vec![t("HUS Meilahti"), t("Haartmaninkatu 4"), t("09 4711")],
                vec![t("Espoo Centre"), t("Kamreerintie 3"), t("09 8162")],
            ],
        ))
        .with_sheet(Sheet::new(
            "VaccineBatch",
            &["batchID", "amount", "type", "manufacturer", "manufDate", "expiration", "location"],
            vec![
                vec![
                    t("B1"),
                    Value::Int(10),
                    t("V01"),
                    t("M1"),
                    day(2021, 1, 1),
                    day(2021, 12, 31),
                    t("HUS Meilahti"),
                ],
                vec![
                    t("B2"),
                    Value::Int(20),
                    t("V02"),
                    t("M2"),
                    day(2021, 1, 15),
                    day(2021, 12, 31),
                    t("Espoo Centre"),
                ],
            ],
        ))
        .with_sheet(Sheet::new(
            "Transportation log",
            &["batchID", "arrival", "departure ", "dateArr", "dateDep"],
            vec![vec![
                t("B2"),
                t("Espoo Centre"),
                t("HUS Meilahti"),
                day(2021, 2, 2),
                day(2021, 2, 1),
            ]],
        ))
        .with_sheet(Sheet::new(
            "StaffMembers",
            &[
                "social security number",
                "name",
                "date of birth",
                "phone",
                "role",
                "vaccination status",
                "hospital",
            ],
            vec![
                vec![
                    t("S1"),
                    t("Nurse Joy"),
                    day(1980, 3, 3),
                    t("040 1"),
                    t("nurse"),
                    Value::Int(1),
                    t("HUS Meilahti"),
                ],
                vec![
                    t("S2"),
                    t("Dr Quinn"),
                    day(1975, 4, 4),
                    t("040 2"),
                    t("doctor"),
                    Value::Int(0),
                    t("HUS Meilahti"),
                ],
            ],
        ))
        .with_sheet(Sheet::new(
            "Shifts",
            &["station", "weekday", "worker"],
            vec![
                vec![t("HUS Meilahti"), t("Monday"), t("S1")],
                vec![t("HUS Meilahti"), t("Monday"), t("S2")],
            ],
        ))
        .with_sheet(Sheet::new(
            "Vaccinations",
            &["date", "location ", "batchID"],
            vec![
                vec![day(2021, 5, 10), t("HUS Meilahti"), t("B1")],
                vec![day(2021, 5, 14), t("Espoo Centre"), t("B2")],
            ],
        ))
        .with_sheet(Sheet::new(
            "Patients",
            &["ssNo", "name", "date of birth", "gender"],
            vec![
                vec![t("P1"), t("Alice"), day(1990, 1, 2), t("F")],
                vec![t("P2"), t("Bob"), day(1950, 6, 7), t("M")],
                vec![t("P3"), t("Cara"), day(2015, 8, 9), t("F")],
            ],
        ))
        .with_sheet(Sheet::new(
            "VaccinePatients",
            &["date", "location", "patientSsNo"],
            vec![
                vec![day(2021, 5, 10), t("HUS Meilahti"), t("P1")],
                vec![day(2021, 5, 14), t("Espoo Centre"), t("P1")],
                vec![day(2021, 5, 10), t("HUS Meilahti"), t("P2")],
            ],
        ))
        .with_sheet(Sheet::new(
            "Symptoms",
            &["name", "criticality"],
            vec![
                vec![t("fever"), Value::Int(0)],
                vec![t("anaphylaxis"), Value::Int(1)],
            ],
        ))
        .with_sheet(Sheet::new(
            "Diagnosis",
            &["patient", "symptom", "date"],
            vec![
                vec![t("P1"), t("fever"), day(2021, 5, 12)],
                vec![t("P2"), t("anaphylaxis"), t("2021-05-11")],
                vec![t("P3"), t("fever"), t("sometime in May")],
            ],
        ))
}
