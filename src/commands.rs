use std::{
    fs::OpenOptions,
    io::{self, stdin, stdout, Read, Write},
    path::{Path, PathBuf},
};

use crate::db::{
    models::{Note, NoteId},
    NoteStore,
};
use structopt::{
    clap::{App, AppSettings},
    StructOpt,
};
use tracing::debug;
use uuid::Uuid;

#[derive(StructOpt, Debug)]
#[structopt(about, rename_all = "lower",global_settings(&[AppSettings::VersionlessSubcommands, AppSettings::NoBinaryName, AppSettings::DisableVersion]))]
pub enum Command {
    #[structopt(visible_alias = "ls", about = "list notes, all or of one folder")]
    List {
        #[structopt(short = "f", long = "folder")]
        folder: Option<String>,
    },
    #[structopt(about = "list notes whose title contains text")]
    Search { text: String },
    #[structopt(about = "list folders in use")]
    Folders,
    #[structopt(visible_alias = "mk", about = "create note with body from given file or stdin")]
    New {
        #[structopt(short = "f", long = "folder")]
        folder: Option<String>,
        title: String,
        in_file: Option<PathBuf>,
    },
    #[structopt(about = "output note body to file or stdout")]
    Cat { id: NoteId, out_file: Option<PathBuf> },
    #[structopt(about = "update note body with given file or stdin")]
    Update {
        #[structopt(short = "t", long = "title")]
        title: Option<String>,
        id: NoteId,
        in_file: Option<PathBuf>,
    },
    #[structopt(about = "edit note in an editor")]
    Edit { id: NoteId },
    #[structopt(visible_alias = "mv", about = "move note to folder (blank folder unfiles it)")]
    Move { id: NoteId, folder: String },
    #[structopt(visible_alias = "rm", about = "remove note")]
    Remove { id: NoteId },
}

impl Command {
    pub fn execute(&self, store: &NoteStore) -> Result<String, String> {
        let output;
        match &self {
            Command::List { folder } => {
                let notes = match folder {
                    Some(folder) => store.list_by_folder(folder),
                    None => store.list_all(),
                }
                .map_err(|e| e.to_string())?;
                output = render_notes(&notes);
            }
            Command::Search { text } => {
                let notes = store.search_by_title(text).map_err(|e| e.to_string())?;
                output = render_notes(&notes);
            }
            Command::Folders => {
                let folders = store.list_folders().map_err(|e| e.to_string())?;
                output = render_tree(folders.iter().map(|folder| format!("{}/", folder)));
            }
            Command::New {
                folder,
                title,
                in_file,
            } => {
                let body = read_body(in_file.as_ref())?;
                let id = store
                    .create(title.trim(), &body, folder.as_deref())
                    .map_err(|e| e.to_string())?;
                output = format!("note {} successfully created", id);
            }
            Command::Cat { id, out_file: dest } => {
                let note = find(store, *id)?;
                let mut writer: Box<dyn Write> = match dest {
                    Some(path) => Box::new(
                        OpenOptions::new()
                            .write(true)
                            .create(true)
                            .truncate(true)
                            .open(&path)
                            .map_err(|e| e.to_string())?,
                    ),
                    None => Box::new(stdout()),
                };
                writer
                    .write_all(note.body.as_bytes())
                    .map_err(|e| e.to_string())?;
                output = String::new();
            }
            Command::Edit { id } => {
                let mut temp_file = std::env::temp_dir();
                temp_file.push(&format!(
                    "tmp_{}_{}_{}",
                    structopt::clap::crate_name!(),
                    Uuid::new_v4().to_string(),
                    id
                ));
                output = edit_with(store, *id, temp_file, |path| edit::edit_file(path))?;
            }
            Command::Update {
                title,
                id,
                in_file: src,
            } => {
                let body = read_body(src.as_ref())?;
                let title = match title {
                    Some(title) => title.trim().to_string(),
                    None => find(store, *id)?.title,
                };
                if !store
                    .update(*id, &title, &body)
                    .map_err(|e| e.to_string())?
                {
                    return Err(not_found(*id));
                }
                output = format!("note {} successfully updated", id);
            }
            Command::Move { id, folder } => {
                if !store
                    .update_folder(*id, folder)
                    .map_err(|e| e.to_string())?
                {
                    return Err(not_found(*id));
                }
                output = if folder.trim().is_empty() {
                    format!("note {} unfiled", id)
                } else {
                    format!("note {} moved to {}/", id, folder)
                };
            }
            Command::Remove { id } => {
                if !store.delete(*id).map_err(|e| e.to_string())? {
                    return Err(not_found(*id));
                }
                output = format!("note {} successfully deleted", id);
            }
        }
        Ok(output)
    }
}

/// Round-trips the body through `temp_file`; the file is removed whatever the editor does.
fn edit_with<F>(store: &NoteStore, id: NoteId, temp_file: PathBuf, editor: F) -> Result<String, String>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    Command::Cat {
        id,
        out_file: Some(temp_file.clone()),
    }
    .execute(store)?;
    let updated = editor(&temp_file)
        .map_err(|e| e.to_string())
        .and_then(|_| {
            Command::Update {
                title: None,
                id,
                in_file: Some(temp_file.clone()),
            }
            .execute(store)
        });
    std::fs::remove_file(&temp_file).map_err(|e| e.to_string())?;
    updated
}

/// Usage goes to stdout; a closed stdout is only worth a debug line.
pub fn print_long_help(mut app: App) {
    if let Err(err) = app.print_long_help() {
        debug!(error = %err, "could not print help");
    }
}

fn not_found(id: NoteId) -> String {
    format!("NoteNotFound: {}", id)
}

fn find(store: &NoteStore, id: NoteId) -> Result<Note, String> {
    store
        .read(id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| not_found(id))
}

/// Trimmed body from the file, or stdin when none is given. Empty bodies are refused.
fn read_body(src: Option<&PathBuf>) -> Result<String, String> {
    let mut reader: Box<dyn Read> = match src {
        Some(path) => Box::new(
            OpenOptions::new()
                .read(true)
                .open(&path)
                .map_err(|e| e.to_string())?,
        ),
        None => Box::new(stdin()),
    };
    let mut body = String::new();
    reader
        .read_to_string(&mut body)
        .map_err(|e| e.to_string())?;
    let body = body.trim();
    if body.is_empty() {
        return Err("EmptyNote: please include note content".into());
    }
    Ok(body.to_string())
}

fn render_notes(notes: &[Note]) -> String {
    render_tree(notes.iter().map(|note| {
        let title = if note.title.is_empty() {
            "(untitled)"
        } else {
            note.title.as_str()
        };
        format!("{:>4} {}  {}", note.id, title, note.preview())
    }))
}

fn render_tree<I>(lines: I) -> String
where
    I: ExactSizeIterator<Item = String>,
{
    let mut count = lines.len();
    let mut connector = || {
        count -= 1;
        if count > 0 {
            "├─"
        } else {
            "└─"
        }
    };
    let mut buffer = String::new();
    for line in lines {
        buffer.push_str(&format!("{}{}\n", connector(), line));
    }
    buffer
}
