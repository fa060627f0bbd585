use tabula::{Db, Descriptor};
use tabula_driver_sqlite::Sqlite;

/// A seeded file-backed SQLite database plus the engine built over it.
///
/// File-backed because the engine checks out one connection per request
/// and an in-memory SQLite database does not outlive its connection.
pub struct SqliteTest {
    pub db: Db,

    // Held so the database file outlives the test.
    _dir: tempfile::TempDir,
}

/// The brewery fixture: equipment rows 1 (no recipes) and 2 (one recipe),
/// with a money price and a datetime column, plus recipes pointing back at
/// equipment through `equipment_id`.
pub fn brewery_descriptor() -> Descriptor {
    let doc = serde_json::json!({
        "key": "brewery",
        "name": "Brewery",
        "description": "Brewing inventory",
        "typeDescriptors": [
            {
                "key": "equipment",
                "name": "Equipment",
                "tableName": "equipment",
                "columnAsOptionName": "title",
                "uniqueIdColumn": "id",
                "optionsAvailable": true,
                "fetchOneAvailable": true,
                "fields": [
                    {"key": "title", "name": "Title", "fromColumn": "title",
                     "type": {"name": "Text", "kind": "text"}},
                    {"key": "volume", "name": "Volume", "fromColumn": "volume",
                     "type": {"name": "Text", "kind": "text"}},
                    {"key": "price", "name": "Price",
                     "type": {"name": "Money", "kind": "money",
                              "amount": {"key": "amount", "fromColumn": "price_amount"},
                              "currency": {"key": "currency", "fromColumn": "price_currency"}}},
                    {"key": "acquired", "name": "Acquired", "fromColumn": "acquired",
                     "type": {"name": "Datetime", "kind": "datetime"}},
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
                "optionsAvailable": true,
                "fetchOneAvailable": true,
                "fields": [
                    {"key": "name", "name": "Name", "fromColumn": "name",
                     "type": {"name": "Text", "kind": "text"}},
                    {"key": "style", "name": "Style", "fromColumn": "style",
                     "type": {"name": "Text", "kind": "text"}},
                    {"key": "equipment", "name": "Equipment",
                     "type": {"name": "Text", "kind": "text"},
                     "relationship": {"kind": "manyToOne", "withTable": "equipment",
                                      "localTableUniqueIdColumn": "equipment_id",
                                      "foreignTableUniqueIdColumn": "id"}},
                ],
            },
        ],
    });
    Descriptor::from_slice(doc.to_string().as_bytes()).unwrap()
}

pub fn seeded_sqlite() -> SqliteTest {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("brewery.db");

    let seed = tabula_driver_sqlite::Connection::open(&path).unwrap();
    {
        use tabula_core::Connection;
        let mut seed = seed;
        for statement in [
            "CREATE TABLE equipment (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT,
                volume INTEGER,
                price_amount REAL,
                price_currency TEXT,
                acquired DATETIME
            )",
            "CREATE TABLE recipes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT,
                style TEXT,
                equipment_id INTEGER
            )",
            "INSERT INTO equipment (id, title, volume, price_amount, price_currency, acquired)
             VALUES (1, 'Kettle', 50, 450.0, 'USD', '2023-06-01T09:30:00.000Z')",
            "INSERT INTO equipment (id, title, volume, price_amount, price_currency, acquired)
             VALUES (2, 'Mash Tun', 80, 1200.5, 'EUR', '2024-03-09T17:05:01.000Z')",
            "INSERT INTO recipes (id, name, style, equipment_id)
             VALUES (1, 'Pale Ale', 'APA', 2)",
        ] {
            seed.execute(statement, &[]).unwrap();
        }
    }

    let db = Db::new(Sqlite::open(&path), brewery_descriptor()).unwrap();
    SqliteTest { db, _dir: dir }
}
