use notes_cli::{
    commands::{self, Command},
    config::Config,
    db::NoteStore,
    interpreter::Interpreter,
    logging,
};
use structopt::StructOpt;

fn open_store(config: &Config) -> NoteStore {
    match NoteStore::open(&config.database_url) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("{}", err);
            if err.is_fatal() {
                eprintln!("note store at {} is unusable", config.database_url);
            }
            std::process::exit(1);
        }
    }
}

fn main() {
    let config = Config::from_env();
    logging::init(&config.log_filter);

    let args = ::std::env::args();

    if args.len() < 2 {
        Interpreter::new("notes> ", open_store(&config)).run();
    } else {
        match Command::from_iter_safe(args.into_iter().skip(1)) {
            Ok(c) => {
                let store = open_store(&config);
                let result = c.execute(&store);
                store.close();
                match result {
                    Ok(msg) if msg.is_empty() => {}
                    Ok(msg) => println!("{}", msg),
                    Err(err) => {
                        eprintln!("{}", err);
                        std::process::exit(1);
                    }
                }
            }
            Err(e) => match e.kind {
                structopt::clap::ErrorKind::HelpDisplayed => {
                    eprintln!("{}", e.message);
                }
                _ => {
                    eprintln!("Error: {:?}", e.kind);
                    eprintln!("Info: {:?}", e.info);
                    eprintln!("\n==============================");
                    commands::print_long_help(Command::clap());
                }
            },
        }
    }
}
