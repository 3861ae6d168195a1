use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use notes_cli::db::{
    error::StoreError,
    migrations::SCHEMA_VERSION,
    models::INVALID_NOTE_ID,
    NoteStore,
};
use tempfile::TempDir;

fn db_path(dir: &TempDir) -> String {
    dir.path()
        .join("nested")
        .join("notes.db")
        .to_string_lossy()
        .into_owned()
}

#[test]
fn writes_survive_reopen() {
    let dir = TempDir::new().expect("temp dir");
    let url = db_path(&dir);

    let store = NoteStore::open(&url).expect("open");
    assert_eq!(store.database_url(), url);
    let kept = store.create("Groceries", "milk, eggs", Some("Home")).expect("create");
    let gone = store.create("Trip", "packing list", None).expect("create");
    assert!(store.delete(gone).expect("delete"));
    store.close();

    let store = NoteStore::open(&url).expect("reopen");
    assert_eq!(store.schema_version().expect("version"), SCHEMA_VERSION);
    let all = store.list_all().expect("list");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, kept);
    assert_eq!(store.list_folders().expect("folders"), vec!["Home"]);

    let next = store.create("Later", "x", None).expect("create");
    assert!(next > gone, "id {} reused after {}", next, gone);
}

#[test]
fn legacy_file_is_migrated_in_place() {
    let dir = TempDir::new().expect("temp dir");
    let url = dir.path().join("legacy.db").to_string_lossy().into_owned();
    {
        let conn = SqliteConnection::establish(&url).expect("raw open");
        conn.batch_execute(
            "CREATE TABLE notes (_id INTEGER PRIMARY KEY AUTOINCREMENT, title TEXT, note TEXT);
             INSERT INTO notes (title, note) VALUES ('Old', 'from v2');
             PRAGMA user_version = 2;",
        )
        .expect("legacy schema");
    }

    let store = NoteStore::open(&url).expect("migrate");
    assert_eq!(store.schema_version().expect("version"), 3);
    let old = store.read(1).expect("read").expect("row kept");
    assert_eq!((old.title.as_str(), old.body.as_str()), ("Old", "from v2"));
    assert!(store.list_folders().expect("folders").is_empty());
    assert!(store.update_folder(1, "Archive").expect("move"));
    assert_eq!(store.list_by_folder("Archive").expect("folder"), vec![old]);
}

#[test]
fn newer_schema_refuses_to_open() {
    let dir = TempDir::new().expect("temp dir");
    let url = dir.path().join("future.db").to_string_lossy().into_owned();
    {
        let conn = SqliteConnection::establish(&url).expect("raw open");
        conn.batch_execute("PRAGMA user_version = 9;").expect("bump");
    }

    match NoteStore::open(&url) {
        Err(err @ StoreError::Schema(_)) => assert!(err.is_fatal()),
        Err(other) => panic!("expected schema failure, got {}", other),
        Ok(_) => panic!("store opened on a newer schema"),
    }
}

#[test]
fn failed_insert_reports_invalid_id() {
    let dir = TempDir::new().expect("temp dir");
    let url = dir.path().join("readonly.db").to_string_lossy().into_owned();
    let store = NoteStore::open(&url).expect("open");
    {
        let conn = SqliteConnection::establish(&url).expect("second connection");
        conn.batch_execute("CREATE TRIGGER no_inserts BEFORE INSERT ON notes BEGIN SELECT RAISE(ABORT, 'read only'); END;")
            .expect("trigger");
    }

    assert_eq!(store.create_or_invalid("t", "b", None), INVALID_NOTE_ID);
    assert!(matches!(store.create("t", "b", None), Err(StoreError::Storage(_))));
    assert!(store.list_all().expect("list").is_empty());
}
