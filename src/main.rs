use clap::{ArgAction, Parser, Subcommand}; // command line argument parser
use doma::{Env, Evaluator, Lexer, Object, MAX_EVAL_DEPTH};
use miette::{IntoDiagnostic, WrapErr};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// type to help us parse the command line arguments
#[derive(Parser, Debug)]
#[command(version, about, long_about=None)]
struct Args {
	#[command(subcommand)]
	command: Option<Commands>,

	/// nested evaluation depth before a recursion error
	#[arg(long, global = true, default_value_t = MAX_EVAL_DEPTH)]
	max_depth: usize,

	/// log more, repeat for trace output
	#[arg(short, long, global = true, action = ArgAction::Count)]
	verbose: u8,
}

/// holds the Command types argument type
#[derive(Debug, Subcommand)]
enum Commands {
	/// prints the tokens of a file
	Tokenize { filename: PathBuf },
	/// prints the parsed program of a file
	Parse { filename: PathBuf },
	/// evaluates a whole file
	Run { filename: PathBuf },
	/// starts the interactive prompt (the default)
	Repl,
}

fn read_source(filename: &Path) -> miette::Result<String> {
	fs::read_to_string(filename)
		.into_diagnostic()
		.wrap_err_with(|| format!("reading {} file failed!", filename.display()))
}

fn init_logging(verbose: u8) {
	let default = match verbose {
		0 => "warn",
		1 => "debug",
		_ => "trace",
	};

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn main() -> miette::Result<()> {
	let args = Args::parse();

	init_logging(args.verbose);

	let code = match args.command.unwrap_or(Commands::Repl) {
		Commands::Tokenize { filename } => tokenize(&read_source(&filename)?),
		Commands::Parse { filename } => parse(&read_source(&filename)?),
		Commands::Run { filename } => run(&read_source(&filename)?, args.max_depth),
		Commands::Repl => repl(args.max_depth)?,
	};

	std::process::exit(code);
}

fn tokenize(source: &str) -> i32 {
	let mut erry = false;

	for token in Lexer::new(source) {
		match token {
			Ok(token) => println!("{token}"),
			Err(e) => {
				erry = true;
				eprintln!("{:?}", miette::Report::new(e));
			},
		}
	}

	println!("EOF  null");

	if erry {
		65
	} else {
		0
	}
}

fn parse(source: &str) -> i32 {
	let (program, errors) = doma::Parser::new(source).parse_program();

	if errors.is_empty() {
		print!("{program}");
		return 0;
	}

	for e in errors {
		eprintln!("{:?}", miette::Report::new(e));
	}
	65
}

fn run(
	source: &str,
	max_depth: usize,
) -> i32 {
	let env = doma::new_environment();
	let mut evaluator = Evaluator::stdout().with_max_depth(max_depth);

	match evaluator.run(source, &env) {
		Err(errors) => {
			for e in errors {
				eprintln!("{:?}", miette::Report::new(e));
			}
			65
		},
		Ok(Object::Error(msg)) => {
			eprintln!("ERROR: {msg}");
			70
		},
		Ok(Object::Nil) => 0,
		Ok(value) => {
			println!("{}", value.inspect());
			0
		},
	}
}

fn print_help() {
	println!("Enter expressions like (+ 1 2) or (define x 10).");
	println!("  :env   list global bindings");
	println!("  :help  show this message");
	println!("  :quit  leave the prompt");
}

fn print_environment(env: &Env) {
	for name in env.names() {
		if let Some(value) = env.get(&name) {
			println!("{name} = {}", value.inspect());
		}
	}
}

/// Reads lines until EOF, all of them sharing one environment.
fn repl(max_depth: usize) -> miette::Result<i32> {
	println!("Welcome to Doma!");

	let mut rl = DefaultEditor::new().into_diagnostic().wrap_err("could not initialize the prompt")?;
	let env = doma::new_environment();
	let mut evaluator = Evaluator::stdout().with_max_depth(max_depth);

	loop {
		let line = match rl.readline("> ") {
			Ok(line) => line,
			Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
			Err(e) => return Err(e).into_diagnostic().wrap_err("reading input failed"),
		};

		let line = line.trim();
		if line.is_empty() {
			continue;
		}

		let _ = rl.add_history_entry(line);

		match line {
			":help" => print_help(),
			":env" => print_environment(&env),
			":quit" => break,
			_ => match evaluator.run(line, &env) {
				Err(errors) => {
					for e in errors {
						println!("{e}");
					}
				},
				Ok(Object::Nil) => {},
				Ok(value) => println!("{}", value.inspect()),
			},
		}
	}

	Ok(0)
}
