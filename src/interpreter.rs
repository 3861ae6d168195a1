use rustyline::{error::ReadlineError, Editor};
use structopt::StructOpt;

use crate::{
    commands::{self, Command},
    db::NoteStore,
};

pub struct Interpreter {
    prompt: String,
    store: NoteStore,
    reader: Editor<()>,
}

#[derive(StructOpt)]
#[structopt(rename_all = "lower", global_settings(&[structopt::clap::AppSettings::NoBinaryName]))]
enum InterpreterCommand {
    #[structopt(flatten)]
    Command(Command),
    #[structopt(visible_alias = "q", about = "quit")]
    Quit,
}

impl Interpreter {
    pub fn new(prompt: &str, store: NoteStore) -> Self {
        let reader = Editor::<()>::new();
        Self {
            prompt: prompt.to_string(),
            store,
            reader,
        }
    }

    pub fn read_line(&mut self) -> Result<String, ReadlineError> {
        match self.reader.readline(self.prompt.as_str()) {
            Ok(line) => {
                self.reader.add_history_entry(&line);
                Ok(line)
            }
            err => err,
        }
    }

    pub fn run(mut self) {
        while let Ok(line) = self.read_line() {
            let words = match shellwords::split(&line) {
                Ok(words) if words.is_empty() => continue,
                Ok(words) => words,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    continue;
                }
            };
            match InterpreterCommand::from_iter_safe(words) {
                Ok(InterpreterCommand::Command(c)) => match c.execute(&self.store) {
                    Err(err) => eprintln!("{}", err),
                    Ok(msg) => println!("{}", msg),
                },
                Ok(InterpreterCommand::Quit) => {
                    break;
                }
                Err(e) => {
                    if matches!(e.kind, structopt::clap::ErrorKind::HelpDisplayed) {
                        eprintln!("{}", e.message);
                    } else {
                        eprintln!("Error: {:?}", e.kind);
                        eprintln!("Info: {:?}", e.info);
                        eprintln!("\n==============================");
                        commands::print_long_help(InterpreterCommand::clap());
                    }
                }
            }
        }
        self.store.close();
    }
}
