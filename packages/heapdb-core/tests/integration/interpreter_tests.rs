//! Statement execution against a populated database.

use std::sync::Arc;

use ntest::timeout;
use tempfile::{tempdir, TempDir};

use heapdb_core::database::Database;
use heapdb_core::error::DbError;
use heapdb_core::sql::{ExecuteOutcome, Interpreter, StatementKind};
use heapdb_core::table::{Field, Record, Relation, Table};
use heapdb_core::types::{encode_integer, Domain};

fn interpreter_with_people() -> (TempDir, Interpreter) {
    let dir = tempdir().unwrap();
    let mut db = Database::open_dir("d", dir.path()).unwrap();
    let integer = db.add_domain(Domain::Integer);
    let name = db.add_domain(Domain::String { max_len: 10 });
    let relation = Arc::new(
        Relation::new(vec![Field::key("Id", integer), Field::value("Name", name)]).unwrap(),
    );
    let table = db.add_table("people", relation.clone()).unwrap();
    for (id, name) in [(1, "Ann"), (2, "Bob")] {
        table
            .add_record(
                Record::from_values(relation.clone(), &[&encode_integer(id), name.as_bytes()])
                    .unwrap(),
            )
            .unwrap();
    }
    (dir, Interpreter::new(db))
}

#[timeout(1000)]
#[test]
fn test_select_scans_table() {
    let (_dir, mut interpreter) = interpreter_with_people();
    let outcomes = interpreter.execute("SELECT * FROM people;").unwrap();
    assert_eq!(outcomes.len(), 1);

    let ExecuteOutcome::Rows(rows) = &outcomes[0] else {
        panic!("expected rows, got {:?}", outcomes[0]);
    };
    assert_eq!(rows.name(), "people");
    assert_eq!(rows.len(), 2);
    let names: Vec<String> = rows.iter().map(|r| r.render()[1].1.clone()).collect();
    assert_eq!(names, vec!["Ann", "Bob"]);
}

#[timeout(1000)]
#[test]
fn test_select_unknown_table() {
    let (_dir, mut interpreter) = interpreter_with_people();
    assert_eq!(
        interpreter.execute("select Id from nobody").unwrap_err(),
        DbError::TableNotFound {
            table: "nobody".to_string()
        }
    );
}

#[timeout(1000)]
#[test]
fn test_select_without_source() {
    let (_dir, mut interpreter) = interpreter_with_people();
    let outcomes = interpreter.execute("SELECT 1").unwrap();
    assert!(matches!(outcomes[0], ExecuteOutcome::NoSource));
}

#[timeout(1000)]
#[test]
fn test_other_statements_are_unsupported() {
    let (_dir, mut interpreter) = interpreter_with_people();
    let outcomes = interpreter
        .execute("INSERT INTO people VALUES (3, 'Cat'); DELETE FROM people; SELECT * FROM people")
        .unwrap();
    assert!(matches!(
        outcomes[0],
        ExecuteOutcome::Unsupported(StatementKind::Insert)
    ));
    assert!(matches!(
        outcomes[1],
        ExecuteOutcome::Unsupported(StatementKind::Delete)
    ));
    let ExecuteOutcome::Rows(rows) = &outcomes[2] else {
        panic!("expected rows");
    };
    assert_eq!(rows.len(), 2);
}

#[timeout(1000)]
#[test]
fn test_empty_statement() {
    let (_dir, mut interpreter) = interpreter_with_people();
    assert!(matches!(
        interpreter.execute("   "),
        Err(DbError::ParseError(_))
    ));
    assert_eq!(interpreter.database().table_count(), 1);
}

#[timeout(1000)]
#[test]
fn test_scan_result_is_detached_from_table() {
    let (_dir, mut interpreter) = interpreter_with_people();
    let mut outcomes = interpreter.execute("SELECT * FROM people").unwrap();
    let Some(ExecuteOutcome::Rows(mut rows)) = outcomes.pop() else {
        panic!("expected rows");
    };
    rows.delete_record(&encode_integer(1)).unwrap();
    assert_eq!(rows.len(), 1);

    let people = interpreter.database_mut().get_table_mut("people").unwrap();
    assert_eq!(people.len(), 2);
    interpreter.into_database().close().unwrap();
}
