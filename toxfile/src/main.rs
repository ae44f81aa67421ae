use toxfile::{
	args,
	config::{self, Config, FromEnv as _},
	logging,
	prompt::Terminal,
	run, PROGRAM_NAME,
};
use toxsave::Engine;

use std::{env, io, process::ExitCode};

fn main() -> ExitCode {
	logging::init();

	let engine = if cfg!(feature = "encryption") {
		Engine::default()
	} else {
		Engine::without_encryption()
	};

	let request = match args::parse(&engine, env::args_os()) {
		Ok(request) => request,
		Err(e) => {
			// Nothing useful to be done if stderr has gone away
			let _ = e.print();
			return ExitCode::FAILURE;
		}
	};

	let cfg = if request.help_requested || request.version_requested {
		Config::default()
	} else {
		match Config::from_env_vars(PROGRAM_NAME, config::unicode_vars(env::vars_os())) {
			Ok(cfg) => cfg,
			Err(e) => {
				tracing::error!("Failed to configure {PROGRAM_NAME}: {e}");
				return ExitCode::FAILURE;
			}
		}
	};
	tracing::debug!("Using config: {cfg:?}");

	let mut prompt = Terminal::new(&cfg);

	match run(&engine, &request, &mut prompt, &mut io::stdout().lock()) {
		Ok(()) => ExitCode::SUCCESS,
		// The reader went away, as with `| head`
		Err(e) if e.is_broken_pipe() => {
			tracing::debug!("{e}");
			ExitCode::SUCCESS
		}
		Err(e) => {
			tracing::error!("{e}");
			ExitCode::FAILURE
		}
	}
}
