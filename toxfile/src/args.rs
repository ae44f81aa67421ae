//! Turning the command line into a [`Request`].
//!
//! The command line follows getopt conventions: short flags can be clustered, options take
//! their value either attached or as the next argument, flags and the file can come in any
//! order, long options can be shortened to any unambiguous prefix, and when the same thing is
//! asked for twice, the last one asked for wins.  Flags we don't recognise are dropped rather
//! than treated as errors.
//!
use clap::{parser::ValueSource, value_parser, Arg, ArgAction, ArgMatches, Command};
use toxsave::{Engine, UserStatus, SECRET_KEY_SIZE};
use zeroize::Zeroizing;

use std::{ffi::OsString, path::PathBuf};

use crate::PROGRAM_NAME;

/// Something that changes the file (or makes a new one).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Operation {
	CreateNew(PathBuf),
	Encrypt,
	Decrypt,
}

/// A single field to print, instead of the full rundown.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Field {
	Address,
	Name,
	PublicKey,
	SecretKey,
	StatusMessage,
	Status,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Edit {
	Name(String),
	StatusMessage(String),
	Status(UserStatus),
	SecretKey(Zeroizing<[u8; SECRET_KEY_SIZE]>),
}

/// What the operator asked for.  Built once, then only ever looked at.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Request {
	pub operation: Option<Operation>,
	pub exclusive_print: Option<Field>,
	pub target_path: Option<PathBuf>,
	pub edits: Vec<Edit>,
	pub help_requested: bool,
	pub version_requested: bool,
}

const PRINTS: &[(&str, Field)] = &[
	("print-address", Field::Address),
	("print-name", Field::Name),
	("print-public-key", Field::PublicKey),
	("print-secret-key", Field::SecretKey),
	("print-status-message", Field::StatusMessage),
	("print-status", Field::Status),
];

/// Interpret `args` (program name first, as from [`std::env::args_os`]).
///
/// The encryption flags are only recognised if `engine` can actually encrypt.
pub fn parse<I, T>(engine: &Engine, args: I) -> Result<Request, clap::Error>
where
	I: IntoIterator<Item = T>,
	T: Into<OsString>,
{
	let cmd = command(engine.supports_encryption());
	let args = strip_unknown_flags(&cmd, args.into_iter().map(Into::into));
	let matches = cmd.try_get_matches_from(args)?;

	let mut operations = vec![(
		position(&matches, "new"),
		matches
			.get_one::<PathBuf>("new")
			.map(|path| Operation::CreateNew(path.clone())),
	)];
	if engine.supports_encryption() {
		operations.push((position(&matches, "encrypt"), Some(Operation::Encrypt)));
		operations.push((position(&matches, "decrypt"), Some(Operation::Decrypt)));
	}

	let operation = operations
		.into_iter()
		.filter_map(|(pos, op)| Some((pos?, op?)))
		.max_by_key(|(pos, _)| *pos)
		.map(|(_, op)| op);

	let exclusive_print = PRINTS
		.iter()
		.filter_map(|(id, field)| Some((position(&matches, id)?, *field)))
		.max_by_key(|(pos, _)| *pos)
		.map(|(_, field)| field);

	let mut edits = Vec::new();
	if let Some(key) = matches.get_one::<Zeroizing<[u8; SECRET_KEY_SIZE]>>("set-secret-key") {
		edits.push(Edit::SecretKey(key.clone()));
	}
	if let Some(name) = matches.get_one::<String>("set-name") {
		edits.push(Edit::Name(name.clone()));
	}
	if let Some(message) = matches.get_one::<String>("set-status-message") {
		edits.push(Edit::StatusMessage(message.clone()));
	}
	if let Some(status) = matches.get_one::<UserStatus>("set-status") {
		edits.push(Edit::Status(*status));
	}

	Ok(Request {
		operation,
		exclusive_print,
		target_path: matches
			.get_many::<PathBuf>("file")
			.and_then(|mut paths| paths.next())
			.cloned(),
		edits,
		help_requested: matches.get_flag("help"),
		version_requested: matches.get_flag("version"),
	})
}

#[must_use]
pub fn help(engine: &Engine) -> String {
	command(engine.supports_encryption()).render_help().to_string()
}

#[must_use]
pub fn version() -> String {
	format!("{PROGRAM_NAME} v{}", env!("CARGO_PKG_VERSION"))
}

fn command(encryption: bool) -> Command {
	let mut cmd = Command::new(PROGRAM_NAME)
		.about("general purpose utility for tox files")
		.override_usage(format!("{PROGRAM_NAME} [options] <file>"))
		.disable_help_flag(true)
		.disable_version_flag(true)
		.args_override_self(true)
		.arg(flag("print-address", 'a', "print tox address"));

	if encryption {
		cmd = cmd
			.arg(flag("decrypt", 'd', "decrypt tox save file"))
			.arg(flag("encrypt", 'e', "encrypt tox save file"));
	}

	cmd.arg(flag("print-public-key", 'k', "print tox public key"))
		.arg(flag("print-name", 'm', "print tox name"))
		.arg(
			option("new", 'N', "PATH", "create a new tox file")
				.value_parser(value_parser!(PathBuf)),
		)
		.arg(flag("print-status-message", 's', "print tox status message"))
		.arg(flag("print-status", 'u', "print tox user status (none, away, busy)"))
		.arg(flag("print-secret-key", 'x', "print tox secret key"))
		.arg(option("set-name", 'M', "NAME", "change tox name"))
		.arg(option("set-status-message", 'S', "MESSAGE", "change tox status message"))
		.arg(
			option("set-status", 'U', "STATUS", "change tox user status (none, away, busy)")
				.value_parser(|s: &str| s.parse::<UserStatus>().map_err(|e| e.to_string())),
		)
		.arg(
			option("set-secret-key", 'X', "HEX", "replace tox keypair, given the secret key")
				.value_parser(parse_secret_key),
		)
		.arg(flag("help", 'h', "print help/usage message (this)").visible_short_alias('?'))
		.arg(flag("version", 'v', "print toxfile version"))
		.arg(
			Arg::new("file")
				.value_name("FILE")
				.num_args(0..)
				.action(ArgAction::Append)
				.value_parser(value_parser!(PathBuf)),
		)
}

fn flag(id: &'static str, short: char, help: &'static str) -> Arg {
	Arg::new(id)
		.short(short)
		.long(id)
		.help(help)
		.action(ArgAction::SetTrue)
}

fn option(id: &'static str, short: char, value_name: &'static str, help: &'static str) -> Arg {
	Arg::new(id)
		.short(short)
		.long(id)
		.value_name(value_name)
		.help(help)
		.action(ArgAction::Set)
		.allow_hyphen_values(true)
}

fn parse_secret_key(s: &str) -> Result<Zeroizing<[u8; SECRET_KEY_SIZE]>, String> {
	let mut key = Zeroizing::new([0u8; SECRET_KEY_SIZE]);
	hex::decode_to_slice(s.trim(), &mut key[..])
		.map_err(|e| format!("expected {} hex digits: {e}", SECRET_KEY_SIZE * 2))?;

	Ok(key)
}

/// Where on the command line `id` was given, if it was given at all.
///
/// Flags that weren't given still have a (default) value, so the source has to be checked as
/// well as the index.
fn position(matches: &ArgMatches, id: &str) -> Option<usize> {
	if matches.value_source(id) == Some(ValueSource::CommandLine) {
		matches.index_of(id)
	} else {
		None
	}
}

/// Drop everything that looks like a flag but isn't one of `cmd`'s, so that clap never sees
/// it, and spell out abbreviated long options in full.
fn strip_unknown_flags(cmd: &Command, args: impl Iterator<Item = OsString>) -> Vec<OsString> {
	let mut args = args;
	let mut kept: Vec<OsString> = args.next().into_iter().collect();

	while let Some(arg) = args.next() {
		let Some(s) = arg.to_str() else {
			kept.push(arg);
			continue;
		};

		if s == "--" {
			kept.push(arg);
			kept.extend(args.by_ref());
			break;
		}

		if let Some(long) = s.strip_prefix("--") {
			let (name, value) = match long.split_once('=') {
				Some((name, value)) => (name, Some(value)),
				None => (long, None),
			};

			match find_long(cmd, name).and_then(|a| Some((a, a.get_long()?))) {
				Some((a, full)) => {
					kept.push(match value {
						Some(value) => format!("--{full}={value}").into(),
						None => format!("--{full}").into(),
					});
					if takes_value(a) && value.is_none() {
						kept.extend(args.next());
					}
				}
				None => tracing::debug!("ignoring unknown or ambiguous flag {s}"),
			}
		} else if s.len() > 1 && s.starts_with('-') {
			let mut cluster = String::from("-");
			let mut wants_value = false;

			for (i, c) in s.char_indices().skip(1) {
				match find_short(cmd, c) {
					Some(a) if takes_value(a) => {
						cluster.push(c);
						let rest = &s[i + c.len_utf8()..];
						if rest.is_empty() {
							wants_value = true;
						} else {
							cluster.push_str(rest);
						}
						break;
					}
					Some(_) => cluster.push(c),
					None => tracing::debug!("ignoring unknown flag -{c}"),
				}
			}

			if cluster.len() > 1 {
				kept.push(cluster.into());
			}
			if wants_value {
				kept.extend(args.next());
			}
		} else {
			kept.push(arg);
		}
	}

	kept
}

/// An exact match, or else the only long option that starts with `name`.
fn find_long<'c>(cmd: &'c Command, name: &str) -> Option<&'c Arg> {
	if let Some(exact) = cmd.get_arguments().find(|a| a.get_long() == Some(name)) {
		return Some(exact);
	}

	let mut candidates = cmd
		.get_arguments()
		.filter(|a| a.get_long().is_some_and(|long| long.starts_with(name)));

	match (candidates.next(), candidates.next()) {
		(Some(only), None) => Some(only),
		_ => None,
	}
}

fn find_short(cmd: &Command, c: char) -> Option<&Arg> {
	cmd.get_arguments().find(|a| {
		a.get_short_and_visible_aliases()
			.is_some_and(|shorts| shorts.contains(&c))
	})
}

fn takes_value(arg: &Arg) -> bool {
	arg.get_action().takes_values()
}
