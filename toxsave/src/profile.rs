use byteorder::{LittleEndian, ReadBytesExt};
use rand::{rngs::OsRng, RngCore};
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

use std::{
	fmt::{self, Debug, Display},
	str::FromStr,
};

use crate::Error;

pub const PUBLIC_KEY_SIZE: usize = 32;
pub const SECRET_KEY_SIZE: usize = 32;
pub const NOSPAM_SIZE: usize = 4;
pub const CHECKSUM_SIZE: usize = 2;
pub const ADDRESS_SIZE: usize = PUBLIC_KEY_SIZE + NOSPAM_SIZE + CHECKSUM_SIZE;
pub const MAX_NAME_LENGTH: usize = 128;
pub const MAX_STATUS_MESSAGE_LENGTH: usize = 1007;

const SAVE_MAGIC: u32 = 0x15ED_1B1F;
const SAVE_HEADER_SIZE: usize = 8;
const SECTION_COOKIE: u16 = 0x01CE;
const SECTION_HEADER_SIZE: usize = 8;
const KEYS_SECTION_SIZE: usize = NOSPAM_SIZE + PUBLIC_KEY_SIZE + SECRET_KEY_SIZE;

const SECTION_NOSPAMKEYS: u16 = 1;
const SECTION_NAME: u16 = 4;
const SECTION_STATUSMESSAGE: u16 = 5;
const SECTION_STATUS: u16 = 6;
const SECTION_END: u16 = 255;

/// The presence a profile advertises to its friends.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum UserStatus {
	#[default]
	None,
	Away,
	Busy,
}

impl UserStatus {
	fn from_byte(b: u8) -> Result<Self, Error> {
		match b {
			0 => Ok(Self::None),
			1 => Ok(Self::Away),
			2 => Ok(Self::Busy),
			other => Err(Error::invalid_status(other)),
		}
	}

	fn as_byte(self) -> u8 {
		match self {
			Self::None => 0,
			Self::Away => 1,
			Self::Busy => 2,
		}
	}

	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Away => "away",
			Self::Busy => "busy",
		}
	}
}

impl Display for UserStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for UserStatus {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Error> {
		match s.to_ascii_lowercase().as_str() {
			"none" | "online" => Ok(Self::None),
			"away" => Ok(Self::Away),
			"busy" => Ok(Self::Busy),
			_ => Err(Error::invalid_section(
				"status",
				format!("unknown user status {s:?} (expected none, away, or busy)"),
			)),
		}
	}
}

/// A loaded (or freshly generated) profile.
///
/// The public key is always derived from the secret key, so the two can never disagree.  The
/// secret key is wiped from memory when the profile is dropped.
///
/// Sections this crate doesn't interpret (friends, DHT nodes, relays and so on) are carried
/// along untouched, so that saving a loaded profile never loses any of its state.
#[derive(Clone)]
pub struct Profile {
	secret: StaticSecret,
	public: PublicKey,
	nospam: u32,
	name: Vec<u8>,
	status_message: Vec<u8>,
	status: UserStatus,
	other_sections: Vec<Section>,
}

/// A section kept verbatim, in the order it was read.
#[derive(Clone, Debug)]
struct Section {
	section_type: u16,
	body: Vec<u8>,
}

impl Profile {
	/// Make a brand new identity, with a random keypair and nospam and everything else empty.
	pub fn generate() -> Result<Self, Error> {
		let mut key = Zeroizing::new([0u8; SECRET_KEY_SIZE]);
		let mut nospam = [0u8; NOSPAM_SIZE];
		OsRng
			.try_fill_bytes(&mut key[..])
			.map_err(|e| Error::random(e.to_string()))?;
		OsRng
			.try_fill_bytes(&mut nospam)
			.map_err(|e| Error::random(e.to_string()))?;

		let secret = StaticSecret::from(*key);

		Ok(Self {
			public: PublicKey::from(&secret),
			secret,
			nospam: u32::from_be_bytes(nospam),
			name: Vec::new(),
			status_message: Vec::new(),
			status: UserStatus::None,
			other_sections: Vec::new(),
		})
	}

	/// Decode plaintext save data.
	///
	/// Sections of a type we don't know about are kept as they are, and a missing end section
	/// is tolerated, but everything we do know about has to be well-formed.
	pub fn from_save_data(data: &[u8]) -> Result<Self, Error> {
		let mut reader = data;

		let zero = reader.read_u32::<LittleEndian>()?;
		let magic = reader.read_u32::<LittleEndian>()?;
		if zero != 0 {
			return Err(Error::bad_magic(zero));
		}
		if magic != SAVE_MAGIC {
			return Err(Error::bad_magic(magic));
		}

		let mut keys = None;
		let mut name = Vec::new();
		let mut status_message = Vec::new();
		let mut status = UserStatus::None;
		let mut other_sections = Vec::new();

		while !reader.is_empty() {
			let len = reader.read_u32::<LittleEndian>()? as usize;
			let section_type = reader.read_u16::<LittleEndian>()?;
			let cookie = reader.read_u16::<LittleEndian>()?;

			if cookie != SECTION_COOKIE {
				return Err(Error::bad_cookie(section_type, cookie));
			}
			if len > reader.len() {
				return Err(Error::invalid_section(
					section_name(section_type),
					format!("length {len} runs past the end of the data"),
				));
			}

			let (body, rest) = reader.split_at(len);
			reader = rest;

			match section_type {
				SECTION_NOSPAMKEYS => keys = Some(read_keys(body)?),
				SECTION_NAME => name = bounded("name", body, MAX_NAME_LENGTH)?,
				SECTION_STATUSMESSAGE => {
					status_message = bounded("status message", body, MAX_STATUS_MESSAGE_LENGTH)?;
				}
				SECTION_STATUS => {
					status = match body {
						[b] => UserStatus::from_byte(*b)?,
						_ => {
							return Err(Error::invalid_section(
								"status",
								format!("expected 1 byte, got {}", body.len()),
							))
						}
					};
				}
				SECTION_END => break,
				_ => other_sections.push(Section {
					section_type,
					body: body.to_vec(),
				}),
			}
		}

		let (nospam, secret) = keys.ok_or(Error::MissingKeys)?;

		Ok(Self {
			public: PublicKey::from(&secret),
			secret,
			nospam,
			name,
			status_message,
			status,
			other_sections,
		})
	}

	/// The exact number of bytes [`save_data`](Self::save_data) will produce.
	#[must_use]
	pub fn save_size(&self) -> usize {
		SAVE_HEADER_SIZE
			+ SECTION_HEADER_SIZE + KEYS_SECTION_SIZE
			+ SECTION_HEADER_SIZE + self.name.len()
			+ SECTION_HEADER_SIZE + self.status_message.len()
			+ SECTION_HEADER_SIZE + 1
			+ self
				.other_sections
				.iter()
				.map(|s| SECTION_HEADER_SIZE + s.body.len())
				.sum::<usize>()
			+ SECTION_HEADER_SIZE
	}

	/// Encode the profile as plaintext save data.
	///
	/// The buffer holds the secret key, so it's allocated once at its final size (no
	/// reallocation leaving copies lying around) and wiped when dropped.
	#[must_use]
	pub fn save_data(&self) -> Zeroizing<Vec<u8>> {
		let mut out = Zeroizing::new(Vec::with_capacity(self.save_size()));

		out.extend_from_slice(&0u32.to_le_bytes());
		out.extend_from_slice(&SAVE_MAGIC.to_le_bytes());

		push_section_header(&mut out, SECTION_NOSPAMKEYS, KEYS_SECTION_SIZE);
		out.extend_from_slice(&self.nospam.to_le_bytes());
		out.extend_from_slice(self.public.as_bytes());
		out.extend_from_slice(self.secret.as_bytes());

		push_section_header(&mut out, SECTION_NAME, self.name.len());
		out.extend_from_slice(&self.name);

		push_section_header(&mut out, SECTION_STATUSMESSAGE, self.status_message.len());
		out.extend_from_slice(&self.status_message);

		push_section_header(&mut out, SECTION_STATUS, 1);
		out.push(self.status.as_byte());

		for section in &self.other_sections {
			push_section_header(&mut out, section.section_type, section.body.len());
			out.extend_from_slice(&section.body);
		}

		push_section_header(&mut out, SECTION_END, 0);

		out
	}

	/// The address other peers use to send us a friend request.
	#[must_use]
	pub fn address(&self) -> [u8; ADDRESS_SIZE] {
		let mut address = [0u8; ADDRESS_SIZE];
		let (id, checksum) = address.split_at_mut(PUBLIC_KEY_SIZE + NOSPAM_SIZE);

		id[..PUBLIC_KEY_SIZE].copy_from_slice(self.public.as_bytes());
		id[PUBLIC_KEY_SIZE..].copy_from_slice(&self.nospam.to_be_bytes());

		for (i, b) in id.iter().enumerate() {
			checksum[i % CHECKSUM_SIZE] ^= b;
		}

		address
	}

	#[must_use]
	pub fn public_key(&self) -> [u8; PUBLIC_KEY_SIZE] {
		self.public.to_bytes()
	}

	#[must_use]
	pub fn secret_key(&self) -> Zeroizing<[u8; SECRET_KEY_SIZE]> {
		Zeroizing::new(self.secret.to_bytes())
	}

	#[must_use]
	pub fn nospam(&self) -> u32 {
		self.nospam
	}

	#[must_use]
	pub fn name(&self) -> &[u8] {
		&self.name
	}

	#[must_use]
	pub fn status_message(&self) -> &[u8] {
		&self.status_message
	}

	#[must_use]
	pub fn status(&self) -> UserStatus {
		self.status
	}

	pub fn set_name(&mut self, name: &[u8]) -> Result<(), Error> {
		self.name = bounded("name", name, MAX_NAME_LENGTH)?;
		Ok(())
	}

	pub fn set_status_message(&mut self, message: &[u8]) -> Result<(), Error> {
		self.status_message = bounded("status message", message, MAX_STATUS_MESSAGE_LENGTH)?;
		Ok(())
	}

	pub fn set_status(&mut self, status: UserStatus) {
		self.status = status;
	}

	/// Replace the keypair.  The public key (and therefore the address) follows.
	pub fn set_secret_key(&mut self, key: &[u8; SECRET_KEY_SIZE]) {
		self.secret = StaticSecret::from(*key);
		self.public = PublicKey::from(&self.secret);
	}
}

impl Debug for Profile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Profile")
			.field("public", &self.public)
			.field("nospam", &self.nospam)
			.field("name", &String::from_utf8_lossy(&self.name))
			.field("status_message", &String::from_utf8_lossy(&self.status_message))
			.field("status", &self.status)
			.field("other_sections", &self.other_sections.len())
			.finish_non_exhaustive()
	}
}

fn read_keys(mut body: &[u8]) -> Result<(u32, StaticSecret), Error> {
	if body.len() != KEYS_SECTION_SIZE {
		return Err(Error::invalid_section(
			"keys",
			format!("expected {KEYS_SECTION_SIZE} bytes, got {}", body.len()),
		));
	}

	let nospam = body.read_u32::<LittleEndian>()?;
	let (public, secret) = body.split_at(PUBLIC_KEY_SIZE);

	let mut key = Zeroizing::new([0u8; SECRET_KEY_SIZE]);
	key.copy_from_slice(secret);
	let secret = StaticSecret::from(*key);

	if PublicKey::from(&secret).as_bytes()[..] != public[..] {
		return Err(Error::invalid_section(
			"keys",
			"public key does not belong to the secret key",
		));
	}

	Ok((nospam, secret))
}

fn bounded(field: &str, value: &[u8], max: usize) -> Result<Vec<u8>, Error> {
	if value.len() > max {
		return Err(Error::field_too_long(field, value.len(), max));
	}

	Ok(value.to_vec())
}

fn push_section_header(out: &mut Vec<u8>, section_type: u16, len: usize) {
	// Known fields are bounded, and kept sections were read with a u32 length
	#[allow(clippy::cast_possible_truncation)]
	out.extend_from_slice(&(len as u32).to_le_bytes());
	out.extend_from_slice(&section_type.to_le_bytes());
	out.extend_from_slice(&SECTION_COOKIE.to_le_bytes());
}

fn section_name(section_type: u16) -> String {
	match section_type {
		SECTION_NOSPAMKEYS => "keys".to_string(),
		SECTION_NAME => "name".to_string(),
		SECTION_STATUSMESSAGE => "status message".to_string(),
		SECTION_STATUS => "status".to_string(),
		SECTION_END => "end".to_string(),
		other => format!("type {other}"),
	}
}
