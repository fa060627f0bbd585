use pretty_assertions::assert_eq;
use tabula::{CreateOutcome, Db, Descriptor, Dialect};
use tabula_core::driver::{ColumnMeta, ExecOutput, QueryOutput};
use tabula_core::Value;
use tests::{StubDriver, StubResponse};

fn single_table_descriptor() -> Descriptor {
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
                "fetchOneAvailable": true,
                "fields": [
                    {"key": "title", "name": "Title", "fromColumn": "title",
                     "type": {"name": "Text", "kind": "text"}},
                ],
            },
        ],
    });
    Descriptor::from_slice(doc.to_string().as_bytes()).unwrap()
}

fn schema_probe(id_type: &str, title_type: &str) -> StubResponse {
    StubResponse::Query(QueryOutput {
        columns: vec![
            ColumnMeta {
                name: "id".to_string(),
                native_type: id_type.to_string(),
            },
            ColumnMeta {
                name: "title".to_string(),
                native_type: title_type.to_string(),
            },
        ],
        rows: vec![],
    })
}

#[test]
fn unsupported_insert_id_degrades_create_to_no_content() {
    let driver = StubDriver::new(
        Dialect::Oracle,
        vec![
            schema_probe("NUMBER", "VARCHAR2"),
            StubResponse::Exec(ExecOutput {
                rows_affected: 1,
                last_insert_id: None,
            }),
        ],
    );
    let log = driver.log_handle();
    let db = Db::new(driver, single_table_descriptor()).unwrap();

    let scope = db
        .scope("equipment")
        .unwrap()
        .with_payload(serde_json::json!({"title": "Kettle"}))
        .unwrap();

    match db.create(&scope).unwrap() {
        CreateOutcome::NoContent => {}
        other => panic!("expected NoContent, got {other:?}"),
    }

    let issued = log.lock().unwrap().clone();
    assert!(issued.contains(&"INSERT INTO \"equipment\" (\"title\") VALUES (:1)".to_string()));
}

#[test]
fn returning_strategy_scans_the_id_back() {
    let driver = StubDriver::new(
        Dialect::Postgresql,
        vec![
            schema_probe("int4", "text"),
            StubResponse::Query(QueryOutput {
                columns: vec![ColumnMeta {
                    name: "id".to_string(),
                    native_type: "int4".to_string(),
                }],
                rows: vec![vec![Value::I64(7)]],
            }),
            StubResponse::Query(QueryOutput {
                columns: vec![
                    ColumnMeta {
                        name: "id".to_string(),
                        native_type: "int4".to_string(),
                    },
                    ColumnMeta {
                        name: "title".to_string(),
                        native_type: "text".to_string(),
                    },
                ],
                rows: vec![vec![Value::I64(7), Value::String("Kettle".to_string())]],
            }),
        ],
    );
    let log = driver.log_handle();
    let db = Db::new(driver, single_table_descriptor()).unwrap();

    let scope = db
        .scope("equipment")
        .unwrap()
        .with_payload(serde_json::json!({"title": "Kettle"}))
        .unwrap();

    match db.create(&scope).unwrap() {
        CreateOutcome::Created { id, body } => {
            assert_eq!(id, "7");
            assert_eq!(body["id"], serde_json::json!("7"));
            assert_eq!(body["title"], serde_json::json!("Kettle"));
        }
        other => panic!("expected Created, got {other:?}"),
    }

    let issued = log.lock().unwrap().clone();
    assert!(issued
        .contains(&"INSERT INTO \"equipment\" (\"title\") VALUES ($1) RETURNING \"id\"".to_string()));
}
