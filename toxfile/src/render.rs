use toxsave::{Profile, MAX_NAME_LENGTH, MAX_STATUS_MESSAGE_LENGTH};

use std::io::Write;

use crate::Error;

/// Two uppercase hex digits per byte, no separators.
#[must_use]
pub fn hex(bytes: &[u8]) -> String {
	hex::encode_upper(bytes)
}

/// Render a text field, refusing anything longer than the field is allowed to be.
///
/// Tox clients treat text fields as C strings, so a NUL ends the text.
pub fn text(field: &str, bytes: &[u8], max: usize) -> Result<String, Error> {
	if bytes.len() > max {
		return Err(Error::field_too_long(field, bytes.len(), max));
	}

	let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());

	Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
}

pub fn name(profile: &Profile) -> Result<String, Error> {
	text("name", profile.name(), MAX_NAME_LENGTH)
}

pub fn status_message(profile: &Profile) -> Result<String, Error> {
	text(
		"status message",
		profile.status_message(),
		MAX_STATUS_MESSAGE_LENGTH,
	)
}

/// Everything worth knowing about a profile that isn't a secret.
pub fn dump(profile: &Profile, out: &mut impl Write) -> Result<(), Error> {
	let name = name(profile)?;
	let status_message = status_message(profile)?;

	writeln!(out, "Basic Info:")
		.and_then(|()| writeln!(out, " Address:    {}", hex(&profile.address())))
		.and_then(|()| writeln!(out, " Tox Name:   {name}"))
		.and_then(|()| writeln!(out, " Tox Status: {status_message}"))
		.and_then(|()| writeln!(out, "Crypto Info:"))
		.and_then(|()| writeln!(out, " Public key:  {}", hex(&profile.public_key())))
		.map_err(Error::output)
}
