use std::time::Duration;

use pretty_assertions::assert_eq;
use tests::seeded_sqlite;

#[test]
fn commit_succeeds_once_and_only_once() {
    let fixture = seeded_sqlite();
    let db = &fixture.db;

    let tx = db.begin_transaction(Duration::from_secs(60)).unwrap();
    db.commit_transaction(tx).unwrap();

    let err = db.commit_transaction(tx).unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[test]
fn expired_transactions_are_evicted_silently() {
    let fixture = seeded_sqlite();
    let db = &fixture.db;

    let tx = db.begin_transaction(Duration::from_millis(100)).unwrap();
    std::thread::sleep(Duration::from_millis(250));

    let err = db.commit_transaction(tx).unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[test]
fn named_transaction_spans_requests_until_commit() {
    let fixture = seeded_sqlite();
    let db = &fixture.db;

    let tx = db.begin_transaction(Duration::from_secs(60)).unwrap();

    let scope = db
        .scope("equipment")
        .unwrap()
        .with_transaction(tx)
        .with_payload(serde_json::json!({"title": "Bottling Line", "volume": 5}))
        .unwrap();
    let id = match db.create(&scope).unwrap() {
        tabula::CreateOutcome::Created { id, .. } => id,
        other => panic!("expected Created, got {other:?}"),
    };

    // Uncommitted work is invisible to other connections.
    let read = db.scope("equipment").unwrap().with_id(id.clone());
    assert_eq!(db.get_single(&read).unwrap_err().status_code(), 404);

    db.commit_transaction(tx).unwrap();

    let body = db.get_single(&read).unwrap();
    assert_eq!(body["title"], serde_json::json!("Bottling Line"));
}

#[test]
fn mutation_naming_a_missing_transaction_never_touches_the_database() {
    let fixture = seeded_sqlite();
    let db = &fixture.db;

    let scope = db
        .scope("equipment")
        .unwrap()
        .with_transaction(uuid::Uuid::new_v4())
        .with_payload(serde_json::json!({"title": "Phantom"}))
        .unwrap();

    assert_eq!(db.create(&scope).unwrap_err().status_code(), 404);

    let collection = db.get_collection(&db.scope("equipment").unwrap()).unwrap();
    assert_eq!(collection.as_array().unwrap().len(), 2);
}
