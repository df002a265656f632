use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use log::{error, info};
use rustyline::config::Config as EditorConfig;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Editor, Helper};
use simplelog::{Config as LogConfig, LevelFilter, SimpleLogger};

use scalc::{Printed, Runtime};

mod repl;

use repl::{fixup_input, ReplHelper};

const HISTORY_FILE: &str = ".scalc_history";
const PROMPT: &str = "(scalc) ";

/// Evaluate scalc programs. Starts a REPL if neither FILE nor --eval is given
#[derive(Parser)]
#[command(version, about)]
struct Opt {
    /// Program file to run
    file: Option<PathBuf>,

    /// Run SOURCE instead of a file
    #[arg(short, long, value_name = "SOURCE", conflicts_with = "file")]
    eval: Option<String>,

    /// Show debug output (repeat for more)
    #[arg(short, long, action = ArgAction::Count)]
    debug: u8,
}

fn init_logging(debug: u8) -> Result<()> {
    let filter = match debug {
        0 => LevelFilter::Error,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    match SimpleLogger::init(filter, LogConfig::default()) {
        Ok(_) => Ok(()),
        Err(e) => bail!("Failed to init logger: {}", e),
    }
}

fn init_editor() -> Result<Editor<ReplHelper, DefaultHistory>> {
    let config = EditorConfig::builder().auto_add_history(true).build();
    let mut editor = Editor::with_config(config).context("Failed to create line editor")?;
    editor.set_helper(Some(ReplHelper::new()));

    Ok(editor)
}

fn init_history<H: Helper>(editor: &mut Editor<H, DefaultHistory>) {
    let _ = editor.load_history(HISTORY_FILE);
}

fn save_history<H: Helper>(editor: &mut Editor<H, DefaultHistory>) -> Result<()> {
    match editor.save_history(HISTORY_FILE) {
        Ok(_) => Ok(()),
        Err(e) => bail!("Failed to save history: {}", e),
    }
}

fn welcome() {
    println!(r#"scalc v{}"#, env!("CARGO_PKG_VERSION"));
    println!("Type 'quit' or press Ctrl-D to quit");
    println!();
}

fn print_output(output: &[Printed]) {
    for val in output {
        println!("{}", val);
    }
}

fn run_source(source: &str) -> Result<()> {
    let output = scalc::run(source)?;
    print_output(&output);

    Ok(())
}

fn repl() -> Result<()> {
    let mut editor = init_editor()?;
    init_history(&mut editor);
    welcome();

    let mut runtime = Runtime::new();

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                info!("read: {}", &line);

                if line.trim() == "quit" {
                    break;
                }

                match runtime.eval(&fixup_input(&line)) {
                    Ok(output) => print_output(&output),
                    Err(e) => {
                        eprintln!("{}", e);
                        continue;
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("Press Ctrl-D or type 'quit' to quit");
            }
            Err(ReadlineError::Eof) => {
                println!("quit");
                break;
            }
            Err(e) => {
                error!("Unexpected error: {}", e);
                println!("quit");
                break;
            }
        }
    }

    save_history(&mut editor)
}

fn main() -> Result<()> {
    let opts = Opt::parse();
    init_logging(opts.debug)?;

    if let Some(source) = &opts.eval {
        return run_source(source);
    }

    if let Some(path) = &opts.file {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return run_source(&source);
    }

    repl()
}
