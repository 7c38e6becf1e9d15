use lispcell::{Interpreter, ReadError, ReplConfig};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::env;
use std::fs;
use std::process;

/// Enable with `RUST_LOG=lispcell=debug` or `RUST_LOG=lispcell=trace`.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    // Only initialize if RUST_LOG is set
    if env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn print_diagnostics(interp: &mut Interpreter) {
    for diagnostic in interp.take_diagnostics() {
        eprintln!("{diagnostic}");
    }
}

fn repl(config: &ReplConfig) -> Result<(), ReadlineError> {
    let mut editor = DefaultEditor::new()?;
    if let Some(path) = &config.history_file {
        // A missing history file is expected on first run
        let _ = editor.load_history(path);
    }

    let mut interp = Interpreter::new();

    println!("Minimal Lisp REPL");
    println!("Type expressions to evaluate, or (exit) to quit");
    println!();

    loop {
        let line = match editor.readline(&config.prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e),
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        editor.add_history_entry(input)?;

        // Check for exit
        if input == "(exit)" || input == "exit" {
            break;
        }

        let echo = config.echo_parsed;
        let evaluated = interp.eval_line_with(input, |tree| {
            if echo {
                println!("\"{tree}\"");
            }
        });

        match evaluated {
            Ok(result) => {
                print_diagnostics(&mut interp);
                println!("{result}");
            }
            Err(e) => {
                print_diagnostics(&mut interp);
                if e != ReadError::Empty {
                    eprintln!("{e}");
                }
            }
        }
    }

    if let Some(path) = &config.history_file {
        if let Err(e) = editor.save_history(path) {
            tracing::warn!(path = %path.display(), error = %e, "could not save history");
        }
    }
    Ok(())
}

fn run_file(filename: &str) -> Result<(), String> {
    let contents = fs::read_to_string(filename)
        .map_err(|e| format!("Failed to read file '{filename}': {e}"))?;

    let mut interp = Interpreter::new();
    let result = interp.eval_source(&contents);
    print_diagnostics(&mut interp);

    match result {
        Ok(value) => {
            println!("{value}");
            Ok(())
        }
        Err(ReadError::Empty) => Ok(()),
        Err(e) => Err(format!("{filename}: {e}")),
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  lispcell              Start interactive REPL");
    eprintln!("  lispcell <file.lisp>  Run a Lisp file");
    eprintln!("  lispcell --help       Show this help message");
}

fn main() {
    init_tracing();
    let args: Vec<String> = env::args().collect();

    match args.len() {
        1 => {
            let config = ReplConfig::from_env();
            if let Err(e) = repl(&config) {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
        2 => {
            let arg = &args[1];
            if arg == "--help" || arg == "-h" {
                print_usage();
            } else if let Err(e) = run_file(arg) {
                eprintln!("{e}");
                process::exit(1);
            }
        }
        _ => {
            eprintln!("Error: Too many arguments");
            print_usage();
            process::exit(1);
        }
    }
}
