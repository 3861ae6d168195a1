pub mod error;
pub mod migrations;
pub mod models;
pub mod schema;

use std::{fs, path::Path};

use diesel::{connection::Connection, SqliteConnection};
use tracing::{debug, warn};

use self::error::StoreResult;
use self::models::{Folder, Note, NoteId, INVALID_NOTE_ID};

pub const IN_MEMORY: &str = ":memory:";

pub type DbConnection = SqliteConnection;

/// Connects and brings the schema up to date; a schema error means no connection.
pub fn establish_connection(database_url: &str) -> StoreResult<DbConnection> {
    let connection = SqliteConnection::establish(database_url)?;
    migrations::run(&connection)?;
    Ok(connection)
}

/// Owner of the one open connection to the notes table.
///
/// Every mutating call is committed before it returns. The store does no
/// locking of its own: callers sharing it across threads must serialize.
pub struct NoteStore {
    conn: DbConnection,
    database_url: String,
}

impl NoteStore {
    pub fn open(database_url: &str) -> StoreResult<Self> {
        if database_url != IN_MEMORY {
            if let Some(parent) = Path::new(database_url)
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
            {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = establish_connection(database_url).map_err(|err| {
            warn!(database = %database_url, error = %err, "failed to open note store");
            err
        })?;
        debug!(database = %database_url, "note store opened");
        Ok(Self {
            conn,
            database_url: database_url.to_string(),
        })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::open(IN_MEMORY)
    }

    pub fn close(self) {
        debug!(database = %self.database_url, "note store closed");
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn schema_version(&self) -> StoreResult<i32> {
        migrations::schema_version(&self.conn)
    }

    pub fn create(&self, title: &str, body: &str, folder: Option<&str>) -> StoreResult<NoteId> {
        Note::create(title, body, folder, &self.conn)
    }

    /// Like [`NoteStore::create`], reporting a failed write as [`INVALID_NOTE_ID`].
    pub fn create_or_invalid(&self, title: &str, body: &str, folder: Option<&str>) -> NoteId {
        self.create(title, body, folder).unwrap_or_else(|err| {
            warn!(error = %err, "note insert failed");
            INVALID_NOTE_ID
        })
    }

    pub fn read(&self, id: NoteId) -> StoreResult<Option<Note>> {
        Note::read(id, &self.conn)
    }

    pub fn update(&self, id: NoteId, title: &str, body: &str) -> StoreResult<bool> {
        Note::update(id, title, body, &self.conn)
    }

    pub fn update_folder(&self, id: NoteId, folder: &str) -> StoreResult<bool> {
        Note::update_folder(id, folder, &self.conn)
    }

    pub fn delete(&self, id: NoteId) -> StoreResult<bool> {
        Note::delete(id, &self.conn)
    }

    pub fn list_all(&self) -> StoreResult<Vec<Note>> {
        Note::list_all(&self.conn)
    }

    pub fn search_by_title(&self, needle: &str) -> StoreResult<Vec<Note>> {
        Note::search_by_title(needle, &self.conn)
    }

    pub fn list_folders(&self) -> StoreResult<Vec<String>> {
        Ok(Folder::list(&self.conn)?
            .into_iter()
            .map(|folder| folder.name)
            .collect())
    }

    pub fn list_by_folder(&self, folder: &str) -> StoreResult<Vec<Note>> {
        Folder::named(folder).notes(&self.conn)
    }
}
