//! Catalog-to-disk workflow tests.

use std::fs;
use std::sync::Arc;

use ntest::timeout;
use tempfile::tempdir;

use heapdb_core::config::DbConfig;
use heapdb_core::database::Database;
use heapdb_core::error::DbError;
use heapdb_core::schema::SchemaFile;
use heapdb_core::table::{Field, Record, Relation, Table};
use heapdb_core::types::{decode_integer, encode_integer, Domain};

const PEOPLE_SCHEMA: &str = r#"{
    "tables": [{
        "name": "people",
        "fields": [
            {"name": "Name", "domain": {"kind": "string", "max_len": 10}},
            {"name": "Id", "domain": {"kind": "integer"}, "key": true}
        ]
    }]
}"#;

fn people(db: &mut Database) -> Arc<Relation> {
    let integer = db.add_domain(Domain::Integer);
    let name = db.add_domain(Domain::String { max_len: 10 });
    Arc::new(Relation::new(vec![Field::key("Id", integer), Field::value("Name", name)]).unwrap())
}

fn person(relation: &Arc<Relation>, id: i32, name: &str) -> Record {
    Record::from_values(relation.clone(), &[&encode_integer(id), name.as_bytes()]).unwrap()
}

fn ids(records: &[Record]) -> Vec<i32> {
    records
        .iter()
        .map(|r| decode_integer(r.value_at("Id").unwrap()).unwrap())
        .collect()
}

/// Id/Name table: insert three people, read, delete, re-insert.
#[timeout(2000)]
#[test]
fn test_people_lifecycle() {
    let dir = tempdir().unwrap();
    let mut db = Database::open_dir("people_db", dir.path()).unwrap();
    let relation = people(&mut db);
    assert_eq!(relation.record_size(), 14);
    assert_eq!(relation.key_size(), 4);

    let table = db.add_table("people", relation.clone()).unwrap();
    for (id, name) in [(1, "Ann"), (2, "Bob"), (3, "Cat")] {
        table.add_record(person(&relation, id, name)).unwrap();
    }
    assert_eq!(table.len(), 3);

    let bob = table.get_record(&encode_integer(2)).unwrap().unwrap();
    assert_eq!(bob.value_at("Name").unwrap(), b"Bob\0\0\0\0\0\0\0");
    assert_eq!(
        bob.render(),
        vec![
            ("Id".to_string(), "2".to_string()),
            ("Name".to_string(), "Bob".to_string())
        ]
    );

    let removed = table.delete_record(&encode_integer(1)).unwrap();
    assert_eq!(removed, person(&relation, 1, "Ann"));
    assert_eq!(ids(&table.records().unwrap()), vec![3, 2]);
    assert!(table.get_record(&encode_integer(1)).unwrap().is_none());

    table.add_record(person(&relation, 1, "Ann")).unwrap();
    assert_eq!(ids(&table.records().unwrap()), vec![3, 2, 1]);

    db.close().unwrap();
    assert_eq!(
        fs::metadata(dir.path().join("people")).unwrap().len(),
        3 * 14
    );
}

#[timeout(1000)]
#[test]
fn test_duplicate_key_leaves_count_unchanged() {
    let dir = tempdir().unwrap();
    let mut db = Database::open_dir("d", dir.path()).unwrap();
    let relation = people(&mut db);
    let table = db.add_table("people", relation.clone()).unwrap();

    table.add_record(person(&relation, 1, "Ann")).unwrap();
    let err = table.add_record(person(&relation, 1, "Other")).unwrap_err();
    assert_eq!(
        err,
        DbError::DuplicateKey {
            table: "people".to_string()
        }
    );
    assert_eq!(table.len(), 1);
    assert_eq!(
        table.get_record(&encode_integer(1)).unwrap().unwrap(),
        &person(&relation, 1, "Ann")
    );
}

#[timeout(1000)]
#[test]
fn test_update_and_search() {
    let dir = tempdir().unwrap();
    let mut db = Database::open_dir("d", dir.path()).unwrap();
    let relation = people(&mut db);
    let table = db.add_table("people", relation.clone()).unwrap();
    for (id, name) in [(1, "Ann"), (2, "Bob"), (3, "Ann")] {
        table.add_record(person(&relation, id, name)).unwrap();
    }

    let ann = relation.encode_field("Name", b"Ann").unwrap();
    assert_eq!(ids(&table.search(&[("Name", &ann[..])]).unwrap()), vec![1, 3]);

    let dan = relation.encode_field("Name", b"Dan").unwrap();
    table
        .update_record_by_key(&encode_integer(3), &[("Name", &dan[..])])
        .unwrap();
    assert_eq!(ids(&table.search(&[("Name", &ann[..])]).unwrap()), vec![1]);
    assert_eq!(table.len(), 3);

    assert!(matches!(
        table.update_record_by_key(&encode_integer(9), &[("Name", &dan[..])]),
        Err(DbError::KeyNotFound { .. })
    ));
}

#[timeout(2000)]
#[test]
fn test_reopen_with_schema_keeps_records() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let config = DbConfig {
        data_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let schema = SchemaFile::from_json(PEOPLE_SCHEMA)?;

    {
        let mut db = Database::open(config.clone())?;
        db.attach_schema(&schema)?;
        let table = db.get_table_mut("people")?;
        let relation = table.relation().clone();
        for (id, name) in [(10, "Ann"), (20, "Bob")] {
            table.add_record(person(&relation, id, name))?;
        }
        table.delete_record(&encode_integer(10))?;
        db.close()?;
    }

    let mut db = Database::open(config)?;
    db.attach_schema(&schema)?;
    let table = db.get_table_mut("people")?;
    assert_eq!(table.len(), 1);
    let bob = table
        .get_record(&encode_integer(20))?
        .ok_or_else(|| anyhow::anyhow!("record 20 missing after reopen"))?;
    assert_eq!(bob.render()[1].1, "Bob");
    Ok(())
}

#[timeout(1000)]
#[test]
fn test_enum_domain_table() {
    let dir = tempdir().unwrap();
    let mut db = Database::open_dir("d", dir.path()).unwrap();
    let integer = db.add_domain(Domain::Integer);
    let status = db.add_domain(Domain::enumeration(["open", "closed"]));
    let relation = Arc::new(
        Relation::new(vec![Field::key("Id", integer), Field::value("Status", status)]).unwrap(),
    );
    assert_eq!(relation.record_size(), 10);

    let table = db.add_table("tickets", relation.clone()).unwrap();
    table
        .add_record(Record::from_values(relation.clone(), &[&encode_integer(1), b"open"]).unwrap())
        .unwrap();
    assert!(matches!(
        Record::from_values(relation.clone(), &[&encode_integer(2), b"pending"]),
        Err(DbError::ValidationError(_))
    ));

    let ticket = table.get_record(&encode_integer(1)).unwrap().unwrap();
    assert_eq!(ticket.render()[1].1, "open");
}

#[timeout(1000)]
#[test]
fn test_deleted_table_file_stays_on_disk() {
    let dir = tempdir().unwrap();
    let mut db = Database::open_dir("d", dir.path()).unwrap();
    let relation = people(&mut db);
    let table = db.add_table("people", relation.clone()).unwrap();
    table.add_record(person(&relation, 1, "Ann")).unwrap();

    db.delete_table("people").unwrap();
    assert_eq!(db.table_count(), 0);
    assert_eq!(fs::metadata(dir.path().join("people")).unwrap().len(), 14);

    let table = db.add_table("people", relation).unwrap();
    assert_eq!(table.len(), 1);
}
