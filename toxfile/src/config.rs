//! Settings that come from the environment rather than the command line.
//!
//! Every variable is named `<PREFIX>_<FIELD>`, where the prefix is the program name in shouty
//! snake case, so `TOXFILE_PASSPHRASE` and `TOXFILE_OVERWRITE` for the real thing.
//!
use heck::AsShoutySnekCase;
use secrecy::SecretString;
use zeroize::Zeroize as _;

use std::{
	collections::HashMap,
	convert::Infallible,
	env,
	ffi::OsString,
	fmt::{Debug, Display},
};

use crate::Error;

pub trait FromEnv {
	fn from_env_vars(
		prefix: &str,
		vars: impl Iterator<Item = (String, String)>,
	) -> Result<Self, Error>
	where
		Self: Sized;
}

#[derive(Clone, Debug, Default)]
pub struct Config {
	/// Used to open encrypted profiles, and for `--encrypt`, instead of asking for one.
	pub passphrase: Option<SecretString>,

	/// The answer to "overwrite?" when `--new` finds an existing file.
	pub overwrite: Option<bool>,
}

impl FromEnv for Config {
	fn from_env_vars(
		prefix: &str,
		vars: impl Iterator<Item = (String, String)>,
	) -> Result<Self, Error> {
		let prefix = AsShoutySnekCase(prefix).to_string();
		let mut map: HashMap<String, String> = vars.collect();

		let passphrase_var = format!("{prefix}_PASSPHRASE");
		let mut raw_passphrase = map.remove(&passphrase_var);
		let passphrase = determine_optional_value(
			"passphrase",
			|s| Ok::<_, Infallible>(SecretString::new(s.to_string())),
			raw_passphrase.as_ref(),
		)?;
		if let Some(raw) = raw_passphrase.as_mut() {
			raw.zeroize();
			// Child processes have no business inheriting it
			env::remove_var(&passphrase_var);
		}

		Ok(Config {
			passphrase,
			overwrite: determine_optional_value(
				"overwrite",
				parse_bool,
				map.get(&format!("{prefix}_OVERWRITE")),
			)?,
		})
	}
}

/// Only the variables that are valid UTF-8, name and value both.  Anything else in the
/// environment is none of our business, so it's skipped rather than treated as an error.
pub fn unicode_vars(
	vars: impl Iterator<Item = (OsString, OsString)>,
) -> impl Iterator<Item = (String, String)> {
	vars.filter_map(|(name, value)| match (name.into_string(), value.into_string()) {
		(Ok(name), Ok(value)) => Some((name, value)),
		(Ok(name), Err(_)) => {
			tracing::debug!("skipping {name}: value is not valid UTF-8");
			None
		}
		(Err(name), _) => {
			tracing::debug!("skipping {name:?}: name is not valid UTF-8");
			None
		}
	})
}

pub fn determine_optional_value<RT: Debug + Sync + Send, E: Display>(
	var: &str,
	parser: impl Fn(&str) -> Result<RT, E>,
	env_value: Option<&String>,
) -> Result<Option<RT>, Error> {
	let Some(value_to_parse) = env_value.map(String::as_str) else {
		return Ok(None);
	};

	parser(value_to_parse)
		.map_err(|e| Error::config_value_parse(var, value_to_parse, e))
		.map(Some)
}

fn parse_bool(s: &str) -> Result<bool, String> {
	match s.trim().to_ascii_lowercase().as_str() {
		"1" | "y" | "yes" | "true" | "on" => Ok(true),
		"0" | "n" | "no" | "false" | "off" => Ok(false),
		_ => Err("expected a yes/no value".to_string()),
	}
}
