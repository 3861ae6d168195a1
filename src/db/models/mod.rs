use super::schema;

mod folder;
mod note;

pub use folder::Folder;
pub use note::{Note, NoteId, INVALID_NOTE_ID};
