use tabula::{Db, Descriptor, Dialect, ErrorKind};
use tabula_core::driver::{ColumnMeta, QueryOutput};
use tests::{StubDriver, StubResponse};

fn descriptor_with_relationship() -> Descriptor {
    let doc = serde_json::json!({
        "key": "brewery",
        "name": "Brewery",
        "typeDescriptors": [
            {
                "key": "equipment",
                "name": "Equipment",
                "tableName": "equipment",
                "columnAsOptionName": "title",
                "uniqueIdColumn": "id",
                "fields": [
                    {"key": "title", "name": "Title", "fromColumn": "title",
                     "type": {"name": "Text", "kind": "text"}},
                    {"key": "recipes", "name": "Recipes",
                     "type": {"name": "Text", "kind": "text"},
                     "relationship": {"kind": "oneToMany", "withTable": "recipes",
                                      "localTableUniqueIdColumn": "id",
                                      "foreignTableUniqueIdColumn": "equipment_id"}},
                ],
            },
            {
                "key": "recipes",
                "name": "Recipes",
                "tableName": "recipes",
                "columnAsOptionName": "name",
                "uniqueIdColumn": "id",
                "fields": [
                    {"key": "name", "name": "Name", "fromColumn": "name",
                     "type": {"name": "Text", "kind": "text"}},
                ],
            },
        ],
    });
    Descriptor::from_slice(doc.to_string().as_bytes()).unwrap()
}

fn probe(names_and_types: &[(&str, &str)]) -> StubResponse {
    StubResponse::Query(QueryOutput {
        columns: names_and_types
            .iter()
            .map(|(name, ty)| ColumnMeta {
                name: name.to_string(),
                native_type: ty.to_string(),
            })
            .collect(),
        rows: vec![],
    })
}

#[test]
fn zero_columns_fail_startup() {
    let driver = StubDriver::new(Dialect::Postgresql, vec![probe(&[])]);
    let err = Db::new(driver, descriptor_with_relationship()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
}

#[test]
fn joined_column_count_must_match_cached_base_tables() {
    let driver = StubDriver::new(
        Dialect::Postgresql,
        vec![
            // Phase 1: both base tables.
            probe(&[("id", "int4"), ("title", "text")]),
            probe(&[("id", "int4"), ("name", "text"), ("equipment_id", "int4")]),
            // Phase 2: the join should return 2 + 3 columns, not 4.
            probe(&[
                ("id", "int4"),
                ("title", "text"),
                ("id", "int4"),
                ("name", "text"),
            ]),
        ],
    );
    let err = Db::new(driver, descriptor_with_relationship()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
}

#[test]
fn two_phase_build_probes_bases_before_joins() {
    let driver = StubDriver::new(
        Dialect::Postgresql,
        vec![
            probe(&[("id", "int4"), ("title", "text")]),
            probe(&[("id", "int4"), ("name", "text"), ("equipment_id", "int4")]),
            probe(&[
                ("id", "int4"),
                ("title", "text"),
                ("id", "int4"),
                ("name", "text"),
                ("equipment_id", "int4"),
            ]),
        ],
    );
    let log = driver.log_handle();
    Db::new(driver, descriptor_with_relationship()).unwrap();

    let issued = log.lock().unwrap().clone();
    assert_eq!(
        issued,
        vec![
            "SELECT * FROM \"equipment\" LIMIT 1".to_string(),
            "SELECT * FROM \"recipes\" LIMIT 1".to_string(),
            "SELECT \"equipment\".*, \"recipes\".* FROM \"equipment\" \
             LEFT JOIN \"recipes\" ON \"recipes\".\"equipment_id\" = \"equipment\".\"id\" \
             LIMIT 1"
                .to_string(),
        ]
    );
}
