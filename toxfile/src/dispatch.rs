use secrecy::SecretString;
use toxsave::{Engine, Profile};
use zeroize::Zeroizing;

use std::io::Write;

use crate::{
	args::{Edit, Field, Operation, Request},
	codec::{self, LoadedProfile},
	prompt::Prompt,
	render, Error,
};

/// Carry out `request` against an opened profile.
///
/// Edits go first, then the operation, then the exclusive print (so a print after `--encrypt`
/// or `--set-name` shows the result).  The full rundown is only printed when nothing else at
/// all was asked for.
#[tracing::instrument(skip_all, fields(path = %loaded.path().display()))]
pub fn dispatch(
	engine: &Engine,
	loaded: &mut LoadedProfile,
	request: &Request,
	prompt: &mut impl Prompt,
	out: &mut impl Write,
) -> Result<(), Error> {
	let mut unsaved = apply_edits(loaded.profile_mut(), &request.edits)?;

	match &request.operation {
		Some(Operation::Decrypt) => {
			require_encryption(engine)?;
			match codec::decrypt_in_place(loaded) {
				Ok(()) => unsaved = false,
				Err(e) if !e.is_fatal() => tracing::warn!("{e}"),
				Err(e) => return Err(e),
			}
		}
		Some(Operation::Encrypt) => {
			require_encryption(engine)?;
			let passphrase: SecretString = prompt.passphrase("Encrypt with password: ")?;
			codec::encrypt_in_place(engine, loaded, passphrase)?;
			unsaved = false;
		}
		// New profiles are made before anything gets opened
		Some(Operation::CreateNew(_)) | None => (),
	}

	if unsaved {
		codec::save_back(engine, loaded)?;
	}

	if let Some(field) = request.exclusive_print {
		print_field(loaded.profile(), field, out)
	} else if request.operation.is_none() && request.edits.is_empty() {
		render::dump(loaded.profile(), out)
	} else {
		Ok(())
	}
}

/// Returns whether anything was changed.
fn apply_edits(profile: &mut Profile, edits: &[Edit]) -> Result<bool, Error> {
	for edit in edits {
		match edit {
			Edit::Name(name) => profile
				.set_name(name.as_bytes())
				.map_err(|e| Error::edit("name", e))?,
			Edit::StatusMessage(message) => profile
				.set_status_message(message.as_bytes())
				.map_err(|e| Error::edit("status message", e))?,
			Edit::Status(status) => profile.set_status(*status),
			Edit::SecretKey(key) => profile.set_secret_key(key),
		}
		tracing::debug!("applied {} edit", edit_name(edit));
	}

	Ok(!edits.is_empty())
}

fn edit_name(edit: &Edit) -> &'static str {
	match edit {
		Edit::Name(_) => "name",
		Edit::StatusMessage(_) => "status message",
		Edit::Status(_) => "status",
		Edit::SecretKey(_) => "secret key",
	}
}

fn print_field(profile: &Profile, field: Field, out: &mut impl Write) -> Result<(), Error> {
	let line = Zeroizing::new(match field {
		Field::Address => render::hex(&profile.address()),
		Field::Name => render::name(profile)?,
		Field::PublicKey => render::hex(&profile.public_key()),
		// The operator asked for it by name
		Field::SecretKey => render::hex(&profile.secret_key()[..]),
		Field::StatusMessage => render::status_message(profile)?,
		Field::Status => profile.status().to_string(),
	});

	writeln!(out, "{}", *line).map_err(Error::output)
}

fn require_encryption(engine: &Engine) -> Result<(), Error> {
	if engine.supports_encryption() {
		Ok(())
	} else {
		Err(Error::EncryptionUnsupported)
	}
}
