use diesel::prelude::*;

use super::{
    note::{NoteRow, NOTE_COLUMNS},
    schema::notes,
    Note,
};
use crate::db::{error::StoreResult, DbConnection};

/// A folder is only a label on notes; it exists while some note carries it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Folder {
    pub name: String,
}

/// Blank or whitespace-only folder names mean "unfiled" and are stored as NULL.
pub(super) fn normalize(folder: Option<&str>) -> Option<&str> {
    folder.filter(|name| !name.trim().is_empty())
}

impl Folder {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub(crate) fn list(conn: &DbConnection) -> StoreResult<Vec<Self>> {
        let names = notes::table
            .select(notes::folder)
            .filter(notes::folder.is_not_null())
            .distinct()
            .order(notes::folder.asc())
            .load::<Option<String>>(conn)?;
        Ok(names
            .into_iter()
            .flatten()
            .filter(|name| normalize(Some(name.as_str())).is_some())
            .map(|name| Self { name })
            .collect())
    }

    /// Notes whose folder equals this name exactly.
    pub(crate) fn notes(&self, conn: &DbConnection) -> StoreResult<Vec<Note>> {
        if normalize(Some(self.name.as_str())).is_none() {
            return Ok(vec![]);
        }
        Ok(notes::table
            .select(NOTE_COLUMNS)
            .filter(notes::folder.eq(self.name.as_str()))
            .order(notes::id.asc())
            .load::<NoteRow>(conn)?
            .into_iter()
            .map(Note::from)
            .collect())
    }
}
