use toxsave::Engine;

use std::{fs, path::Path};

use crate::{codec, prompt::Prompt, Error};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
	Created,
	/// There was already a file there, and the operator didn't want it overwritten.
	Declined,
}

/// Write a brand new, empty profile to `path`.
///
/// An existing regular file is only replaced if the operator agrees to it; anything else
/// already at `path` (a directory, say) is left strictly alone.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn create_new(engine: &Engine, path: &Path, prompt: &mut impl Prompt) -> Result<Outcome, Error> {
	if let Ok(meta) = fs::metadata(path) {
		if !meta.is_file() {
			return Err(Error::not_regular_file(path));
		}

		if !prompt.confirm("File exists, overwrite? (y/N) ")? {
			tracing::info!("leaving existing file alone");
			return Ok(Outcome::Declined);
		}
	}

	let profile = engine.new_profile(None).map_err(Error::engine_init)?;
	codec::save(&profile, path)?;
	tracing::info!("created new profile");

	Ok(Outcome::Created)
}
