use diesel::prelude::*;
use tracing::debug;

use super::{folder, schema::notes};
use crate::db::{error::StoreResult, DbConnection};

pub type NoteId = i64;

/// Id reported by callers that need a sentinel for a failed create.
pub const INVALID_NOTE_ID: NoteId = -1;

const PREVIEW_LEN: usize = 40;

no_arg_sql_function!(last_insert_rowid, diesel::sql_types::BigInt);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub body: String,
}

/// Row as stored; rows written before the body column was required can hold NULLs.
#[derive(Queryable)]
pub(super) struct NoteRow {
    id: NoteId,
    title: Option<String>,
    body: Option<String>,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Self {
            id: row.id,
            title: row.title.unwrap_or_default(),
            body: row.body.unwrap_or_default(),
        }
    }
}

#[derive(Insertable)]
#[table_name = "notes"]
struct NewNote<'a> {
    title: &'a str,
    body: &'a str,
    folder: Option<&'a str>,
}

pub(super) type NoteColumns = (notes::id, notes::title, notes::body);

pub(super) const NOTE_COLUMNS: NoteColumns = (notes::id, notes::title, notes::body);

impl Note {
    /// First line of the body, cut to a list-friendly width.
    pub fn preview(&self) -> &str {
        let line = self.body.lines().next().unwrap_or("");
        match line.char_indices().nth(PREVIEW_LEN) {
            Some((end, _)) => &line[..end],
            None => line,
        }
    }

    pub(crate) fn create(
        title: &str,
        body: &str,
        folder: Option<&str>,
        conn: &DbConnection,
    ) -> StoreResult<NoteId> {
        let note = NewNote {
            title,
            body,
            folder: folder::normalize(folder),
        };
        let id = conn.transaction::<_, diesel::result::Error, _>(|| {
            diesel::insert_into(notes::table)
                .values(&note)
                .execute(conn)?;
            diesel::select(last_insert_rowid).get_result::<NoteId>(conn)
        })?;
        debug!(id, "note created");
        Ok(id)
    }

    pub(crate) fn read(id: NoteId, conn: &DbConnection) -> StoreResult<Option<Self>> {
        Ok(notes::table
            .find(id)
            .select(NOTE_COLUMNS)
            .first::<NoteRow>(conn)
            .optional()?
            .map(Self::from))
    }

    pub(crate) fn update(
        id: NoteId,
        title: &str,
        body: &str,
        conn: &DbConnection,
    ) -> StoreResult<bool> {
        let rows = diesel::update(notes::table.find(id))
            .set((notes::title.eq(title), notes::body.eq(body)))
            .execute(conn)?;
        debug!(id, rows, "note updated");
        Ok(rows == 1)
    }

    pub(crate) fn update_folder(id: NoteId, folder: &str, conn: &DbConnection) -> StoreResult<bool> {
        let rows = diesel::update(notes::table.find(id))
            .set(notes::folder.eq(folder::normalize(Some(folder))))
            .execute(conn)?;
        debug!(id, rows, folder, "note folder updated");
        Ok(rows == 1)
    }

    pub(crate) fn delete(id: NoteId, conn: &DbConnection) -> StoreResult<bool> {
        let rows = diesel::delete(notes::table.find(id)).execute(conn)?;
        debug!(id, rows, "note deleted");
        Ok(rows == 1)
    }

    pub(crate) fn list_all(conn: &DbConnection) -> StoreResult<Vec<Self>> {
        Ok(notes::table
            .select(NOTE_COLUMNS)
            .order(notes::id.asc())
            .load::<NoteRow>(conn)?
            .into_iter()
            .map(Self::from)
            .collect())
    }

    /// Substring match on the title using sqlite `LIKE`, so ASCII letters
    /// compare case-insensitively. NULL titles never match.
    pub(crate) fn search_by_title(needle: &str, conn: &DbConnection) -> StoreResult<Vec<Self>> {
        let pattern = format!("%{}%", escape_like(needle));
        Ok(notes::table
            .select(NOTE_COLUMNS)
            .filter(notes::title.like(pattern).escape('\\'))
            .order(notes::id.asc())
            .load::<NoteRow>(conn)?
            .into_iter()
            .map(Self::from)
            .collect())
    }
}

fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
