//! This module contains the main entrypoint to the pedal cli.

use anyhow::{format_err, Result};
use backtrace::Backtrace;
use clap::Parser;
use colored::Colorize;
use once_cell::sync::Lazy;
use pedal_core::{Config, Error, Session};
use std::{panic::AssertUnwindSafe, path::PathBuf, sync::Mutex};

#[derive(Parser, Debug)]
#[clap(
	name = "pedal",
	about = "Analyze hourly bike rentals and predict the rental count with a decision tree."
)]
struct Options {
	#[clap(short, long, help = "the path or file:// url of the .csv file to analyze")]
	file: Option<String>,
	#[clap(short, long, help = "the path to a config file")]
	config: Option<PathBuf>,
}

fn main() {
	let options = Options::parse();
	let config = pedal_core::load_config(options.config.as_deref());
	let default_filter = config
		.as_ref()
		.ok()
		.and_then(|config| config.log_level())
		.map(|log_level| log_level.to_string().to_lowercase())
		.unwrap_or_else(|| "info".to_owned());
	let env = env_logger::Env::default().default_filter_or(default_filter);
	env_logger::Builder::from_env(env)
		.format_module_path(false)
		.format_timestamp(None)
		.init();
	let mut config = match config {
		Ok(config) => config,
		Err(error) => {
			print_error(&error);
			std::process::exit(1);
		}
	};
	if let Some(file) = options.file {
		config.file = Some(file);
	}
	let session = match Session::new(&config) {
		Ok(session) => session,
		Err(error) => {
			print_error(&error);
			std::process::exit(1);
		}
	};
	println!("Session \"{}\" started.", session.app_name());
	let result = cli_run(&session, &config);
	if let Err(error) = &result {
		print_error(error);
	}
	// The session is released whether or not the run succeeded.
	session.stop();
	println!("Session stopped.");
	if result.is_err() {
		std::process::exit(1);
	}
}

fn cli_run(session: &Session, config: &Config) -> Result<()> {
	// Panics inside the run are caught so the session can still be stopped. A custom panic hook stores the panic message and a backtrace, which are reported as an error once `catch_unwind` returns.
	static PANIC_MESSAGE_AND_BACKTRACE: Lazy<Mutex<Option<(String, Backtrace)>>> =
		Lazy::new(|| Mutex::new(None));
	let hook = std::panic::take_hook();
	std::panic::set_hook(Box::new(|panic_info| {
		let value = (panic_info.to_string(), Backtrace::new());
		if let Ok(mut panic_message_and_backtrace) = PANIC_MESSAGE_AND_BACKTRACE.lock() {
			panic_message_and_backtrace.replace(value);
		}
	}));
	let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
		let stdout = std::io::stdout();
		let mut stdout = stdout.lock();
		pedal_core::run(session, config, &mut stdout)
	}));
	std::panic::set_hook(hook);
	match result {
		Ok(result) => result.map(|_| ()),
		Err(_) => {
			let panic_message_and_backtrace = PANIC_MESSAGE_AND_BACKTRACE
				.lock()
				.map_err(|_| format_err!("the analysis panicked"))?;
			match panic_message_and_backtrace.as_ref() {
				Some((message, backtrace)) => Err(format_err!("{}\n{:?}", message, backtrace)),
				None => Err(format_err!("the analysis panicked")),
			}
		}
	}
}

/// Validation errors are printed as a single message. Other errors are printed with their chain of causes.
fn print_error(error: &anyhow::Error) {
	let is_validation_error = error
		.downcast_ref::<Error>()
		.map(Error::is_validation_error)
		.unwrap_or(false);
	if is_validation_error {
		eprintln!("{}: {}", "error".red().bold(), error);
	} else {
		eprintln!("{}: {:?}", "error".red().bold(), error);
	}
}
