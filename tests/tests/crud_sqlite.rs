use pretty_assertions::assert_eq;
use tests::seeded_sqlite;

#[test]
fn get_single_nests_deduplicated_relationships() {
    let fixture = seeded_sqlite();
    let db = &fixture.db;

    let scope = db.scope("equipment").unwrap().with_id("2");
    let object = db.get_single(&scope).unwrap();

    assert_eq!(object["id"], serde_json::json!("2"));
    assert_eq!(object["title"], serde_json::json!("Mash Tun"));
    assert_eq!(
        object["price"],
        serde_json::json!({"amount": 1200.5, "currency": "EUR"})
    );
    assert_eq!(object["acquired"], serde_json::json!("2024-03-09T17:05:01.000Z"));

    let recipes = object["recipes"].as_array().unwrap();
    assert_eq!(recipes.len(), 1);
    assert_eq!(recipes[0]["name"], serde_json::json!("Pale Ale"));
    assert_eq!(recipes[0]["id"], serde_json::json!("1"));
}

#[test]
fn unmatched_left_join_yields_empty_collection() {
    let fixture = seeded_sqlite();
    let db = &fixture.db;

    let scope = db.scope("equipment").unwrap().with_id("1");
    let object = db.get_single(&scope).unwrap();

    assert_eq!(object["recipes"], serde_json::json!([]));
}

#[test]
fn many_to_one_resolves_to_a_single_object() {
    let fixture = seeded_sqlite();
    let db = &fixture.db;

    let scope = db.scope("recipes").unwrap().with_id("1");
    let object = db.get_single(&scope).unwrap();

    assert_eq!(object["id"], serde_json::json!("1"));
    assert_eq!(object["equipment"]["title"], serde_json::json!("Mash Tun"));
    assert_eq!(object["equipment"]["id"], serde_json::json!("2"));
}

#[test]
fn many_to_one_without_a_match_is_an_empty_object() {
    let fixture = seeded_sqlite();
    let db = &fixture.db;

    let scope = db
        .scope("recipes")
        .unwrap()
        .with_payload(serde_json::json!({"name": "Lambic", "style": "Sour"}))
        .unwrap();
    let id = match db.create(&scope).unwrap() {
        tabula::CreateOutcome::Created { id, .. } => id,
        other => panic!("expected Created, got {other:?}"),
    };

    let read = db.scope("recipes").unwrap().with_id(id);
    let object = db.get_single(&read).unwrap();
    assert_eq!(object["equipment"], serde_json::json!({}));
}

#[test]
fn missing_resource_maps_to_the_404_envelope() {
    let fixture = seeded_sqlite();
    let db = &fixture.db;

    let scope = db.scope("equipment").unwrap().with_id("42");
    let err = db.get_single(&scope).unwrap_err();

    assert_eq!(err.status_code(), 404);
    assert_eq!(
        err.to_envelope(),
        serde_json::json!({
            "status": {
                "code": 404,
                "description": "Resource with uniqueID '42' not found in equipment table",
            }
        })
    );
}

#[test]
fn collection_returns_one_object_per_parent() {
    let fixture = seeded_sqlite();
    let db = &fixture.db;

    let scope = db.scope("equipment").unwrap();
    let collection = db.get_collection(&scope).unwrap();
    let objects = collection.as_array().unwrap();

    assert_eq!(objects.len(), 2);
    assert_eq!(objects[0]["id"], serde_json::json!("1"));
    assert_eq!(objects[1]["id"], serde_json::json!("2"));
    assert_eq!(objects[1]["recipes"].as_array().unwrap().len(), 1);
}

#[test]
fn eq_filter_narrows_the_collection() {
    let fixture = seeded_sqlite();
    let db = &fixture.db;

    let filter = tabula::Filter::parse("style eq APA").unwrap();
    let scope = db.scope("recipes").unwrap().with_filter(filter);
    let collection = db.get_collection(&scope).unwrap();

    let objects = collection.as_array().unwrap();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0]["name"], serde_json::json!("Pale Ale"));
}

#[test]
fn unknown_filter_column_is_a_bad_request() {
    let fixture = seeded_sqlite();
    let db = &fixture.db;

    let filter = tabula::Filter::parse("nonsense eq x").unwrap();
    let scope = db.scope("recipes").unwrap().with_filter(filter);
    let err = db.get_collection(&scope).unwrap_err();

    assert_eq!(err.status_code(), 400);
}

#[test]
fn create_returns_the_created_resource() {
    let fixture = seeded_sqlite();
    let db = &fixture.db;

    let scope = db
        .scope("equipment")
        .unwrap()
        .with_payload(serde_json::json!({
            "title": "Fermenter",
            "volume": 30,
            "price": {"amount": 999.0, "currency": "GBP"},
            "acquired": "2025-01-15T08:00:00.000Z",
        }))
        .unwrap();

    match db.create(&scope).unwrap() {
        tabula::CreateOutcome::Created { id, body } => {
            assert_eq!(id, "3");
            assert_eq!(body["id"], serde_json::json!("3"));
            assert_eq!(body["title"], serde_json::json!("Fermenter"));
            assert_eq!(
                body["price"],
                serde_json::json!({"amount": 999.0, "currency": "GBP"})
            );
            assert_eq!(
                body["acquired"],
                serde_json::json!("2025-01-15T08:00:00.000Z")
            );
        }
        other => panic!("expected Created, got {other:?}"),
    }
}

#[test]
fn partial_update_leaves_other_columns_alone() {
    let fixture = seeded_sqlite();
    let db = &fixture.db;

    let scope = db
        .scope("equipment")
        .unwrap()
        .with_id("2")
        .with_payload(serde_json::json!({"title": "Lauter Tun"}))
        .unwrap();

    let body = db.update(&scope).unwrap();
    assert_eq!(body["title"], serde_json::json!("Lauter Tun"));
    assert_eq!(body["volume"], serde_json::json!(80));
    assert_eq!(
        body["price"],
        serde_json::json!({"amount": 1200.5, "currency": "EUR"})
    );
}

#[test]
fn update_of_a_missing_resource_is_not_found() {
    let fixture = seeded_sqlite();
    let db = &fixture.db;

    let scope = db
        .scope("equipment")
        .unwrap()
        .with_id("42")
        .with_payload(serde_json::json!({"title": "Ghost"}))
        .unwrap();

    assert_eq!(db.update(&scope).unwrap_err().status_code(), 404);
}

#[test]
fn delete_removes_the_row() {
    let fixture = seeded_sqlite();
    let db = &fixture.db;

    let scope = db.scope("equipment").unwrap().with_id("1");
    db.delete(&scope).unwrap();

    assert_eq!(db.get_single(&scope).unwrap_err().status_code(), 404);
    assert_eq!(db.delete(&scope).unwrap_err().status_code(), 404);
}

#[test]
fn unknown_resource_key_is_not_found() {
    let fixture = seeded_sqlite();
    let db = &fixture.db;

    let err = db.scope("gremlins").unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[test]
fn descriptor_document_round_trips() {
    let fixture = seeded_sqlite();
    let db = &fixture.db;

    let doc = db.descriptor_json();
    assert_eq!(doc["key"], serde_json::json!("brewery"));
    assert_eq!(doc["typeDescriptors"].as_array().unwrap().len(), 2);
}
