use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use quill::ast::Stmt;
use quill::ast_printer::AstPrinter;
use quill::error::QuillError;
use quill::interpreter::Interpreter;
use quill::parser::Parser;
use quill::resolver::Resolver;
use quill::scanner::Scanner;
use quill::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about = "Quill language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize { filename: Option<PathBuf> },

    /// Parses input from a file and prints its AST
    Parse { filename: Option<PathBuf> },

    /// Runs input from a file as a Quill program, or starts a REPL
    Run { filename: Option<PathBuf> },
}

/// Reads the contents of a file into a Vec<u8>
fn read_file(filename: PathBuf) -> Result<Vec<u8>> {
    info!("Reading file: {:?}", filename);
    let file = File::open(&filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger() -> Result<()> {
    // Create or open the log file
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // Configure env_logger to write to file with module path and source line
    Builder::new()
        .format(|buf, record| {
            // Strip 'quill::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("quill::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Scan the whole buffer, printing every lexical error.  `None` means at
/// least one error was reported.
fn scan_all<'a>(src: &'a [u8]) -> Option<Vec<Token<'a>>> {
    let mut tokens: Vec<Token<'a>> = Vec::new();
    let mut clean = true;

    for result in Scanner::new(src) {
        match result {
            Ok(token) => tokens.push(token),
            Err(e) => {
                clean = false;

                debug!("Scan debug: {}", e);
                eprintln!("{}", e);
            }
        }
    }

    if clean {
        Some(tokens)
    } else {
        None
    }
}

fn report_all(errors: &[QuillError]) {
    for e in errors {
        debug!("Static error: {}", e);
        eprintln!("{}", e);
    }
}

/// Scan, parse, and resolve a program against `interpreter`.  Exits with 65
/// semantics by returning `None` after printing every error found.
fn prepare<'a>(src: &'a [u8], interpreter: &mut Interpreter<'a>) -> Option<Vec<Stmt<'a>>> {
    let tokens = scan_all(src)?;

    // Tokens are dropped only when the program is; leaking them into the
    // statements' lifetime is handled by the caller for the REPL.
    let tokens: &'a [Token<'a>] = Box::leak(tokens.into_boxed_slice());

    let statements = match Parser::new(tokens).parse() {
        Ok(statements) => statements,
        Err(errors) => {
            report_all(&errors);

            return None;
        }
    };

    if let Err(errors) = Resolver::new(interpreter).resolve(&statements) {
        report_all(&errors);

        return None;
    }

    Some(statements)
}

fn run_file(filename: PathBuf) -> Result<()> {
    info!("Running Run subcommand");
    let buf = read_file(filename)?;

    // The source buffer must outlive the interpreter's values.
    let src: &'static [u8] = Box::leak(buf.into_boxed_slice());

    let mut interpreter = Interpreter::new();

    let statements = match prepare(src, &mut interpreter) {
        Some(statements) => statements,
        None => {
            debug!("Static analysis failed, exiting with code 65");

            std::process::exit(65);
        }
    };

    info!("Prepared {} statements", statements.len());

    match interpreter.interpret(&statements) {
        Ok(true) => {
            info!("Program executed successfully");
        }

        Ok(false) => {
            info!("Program requested exit");

            std::process::exit(0);
        }

        Err(e) => {
            debug!("Runtime debug: {}", e);
            eprintln!("{}", e);
            std::process::exit(70);
        }
    }

    Ok(())
}

fn run_repl() -> Result<()> {
    info!("Starting REPL");

    let mut interpreter: Interpreter<'static> = Interpreter::new();
    let stdin = std::io::stdin();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();

        if stdin.lock().read_line(&mut line)? == 0 {
            break; // end of input
        }

        if line.trim().is_empty() {
            continue;
        }

        // Each line's tokens stay referenced by the interpreter's state, so
        // the line lives as long as the session.
        let src: &'static [u8] = Box::leak(line.into_boxed_str().into_boxed_bytes());

        let statements = match prepare(src, &mut interpreter) {
            Some(statements) => statements,
            None => continue,
        };

        match interpreter.interpret(&statements) {
            Ok(true) => {}

            Ok(false) => {
                info!("REPL exit requested");

                break;
            }

            Err(e) => {
                debug!("Runtime debug: {}", e);
                eprintln!("{}", e);
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename } => match filename {
            Some(filename) => {
                info!("Running Tokenize subcommand");
                let buf = read_file(filename)?;
                let mut tokenized = true;

                for token in Scanner::new(&buf) {
                    match token {
                        Ok(token) => {
                            debug!("Scanned token: {}", token);

                            println!("{}", token);
                        }

                        Err(e) => {
                            tokenized = false;

                            debug!("Tokenization debug: {}", e);

                            eprintln!("{}", e);
                        }
                    }
                }

                if !tokenized {
                    debug!("Tokenization failed, exiting with code 65");

                    std::process::exit(65);
                }

                info!("Tokenization completed successfully");
            }
            None => {
                info!("No filepath provided for Tokenize");

                println!("No input filepath was provided. Exiting...");

                std::process::exit(0);
            }
        },

        Commands::Parse { filename } => match filename {
            Some(filename) => {
                info!("Running Parse subcommand");
                let buf = read_file(filename)?;

                let tokens = match scan_all(&buf) {
                    Some(tokens) => tokens,
                    None => std::process::exit(65),
                };

                match Parser::new(&tokens).parse() {
                    Ok(statements) => {
                        info!("Program parsed successfully");

                        for stmt in &statements {
                            let ast_str = AstPrinter::print_stmt(stmt);

                            debug!("AST: {}", ast_str);
                            println!("{}", ast_str);
                        }
                    }

                    Err(errors) => {
                        report_all(&errors);
                        std::process::exit(65);
                    }
                }

                info!("Parse subcommand completed");
            }
            None => {
                info!("No filepath provided for Parse");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Run { filename } => match filename {
            Some(filename) => run_file(filename)?,
            None => run_repl()?,
        },
    }

    Ok(())
}
