//! The insides of `toxfile`, a general purpose utility for Tox profile files.
//!
//! The binary is a thin shell around [`run`]; everything here takes its prompts and output as
//! parameters, so the whole thing can be driven without a terminal.
//!
use toxsave::Engine;

use std::io::Write;

pub mod args;
pub mod codec;
pub mod config;
pub mod create;
pub mod dispatch;
pub mod logging;
pub mod prompt;
pub mod render;

mod error;
pub use error::Error;

use args::{Operation, Request};
use prompt::Prompt;

pub const PROGRAM_NAME: &str = "toxfile";

/// Do whatever `request` asks for.
///
/// Help and version win over everything else, and making a new profile is a world unto
/// itself; otherwise the target profile is opened and handed to [`dispatch::dispatch`].
pub fn run(
	engine: &Engine,
	request: &Request,
	prompt: &mut impl Prompt,
	out: &mut impl Write,
) -> Result<(), Error> {
	if request.help_requested {
		return write!(out, "{}", args::help(engine)).map_err(Error::output);
	}

	if request.version_requested {
		return writeln!(out, "{}", args::version()).map_err(Error::output);
	}

	if let Some(Operation::CreateNew(path)) = &request.operation {
		let outcome = create::create_new(engine, path, prompt)?;
		tracing::debug!("create_new: {outcome:?}");
		return Ok(());
	}

	let path = request.target_path.as_deref().ok_or(Error::NoProfilePath)?;
	let mut loaded = codec::open(engine, path, prompt)?;

	dispatch::dispatch(engine, &mut loaded, request, prompt, out)
}
