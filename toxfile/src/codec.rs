//! Moving profiles between disk and memory.
//!
//! Whether a profile was encrypted is only knowable at the moment its bytes are read, so
//! [`open`] records that in the [`LoadedProfile`] and everything afterwards consults the record
//! rather than trying to work it out again.
//!
use secrecy::{ExposeSecret as _, SecretString};
use toxsave::{Engine, Profile, ENCRYPTION_EXTRA_LENGTH};
use zeroize::Zeroizing;

use std::{
	fs::{self, File},
	io::{self, Write},
	path::{Path, PathBuf},
};

use crate::{prompt::Prompt, Error};

/// A profile, along with where it came from and what form it was in.
#[derive(Debug)]
pub struct LoadedProfile {
	profile: Profile,
	path: PathBuf,
	was_encrypted: bool,
	passphrase: Option<SecretString>,
}

impl LoadedProfile {
	#[must_use]
	pub fn profile(&self) -> &Profile {
		&self.profile
	}

	pub fn profile_mut(&mut self) -> &mut Profile {
		&mut self.profile
	}

	#[must_use]
	pub fn path(&self) -> &Path {
		&self.path
	}

	#[must_use]
	pub fn was_encrypted(&self) -> bool {
		self.was_encrypted
	}
}

/// Read the profile at `path`, asking for a passphrase if it turns out to be encrypted.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn open(engine: &Engine, path: &Path, prompt: &mut impl Prompt) -> Result<LoadedProfile, Error> {
	let data = Zeroizing::new(fs::read(path).map_err(|e| Error::open(path, e))?);

	if !engine.is_encrypted(&data) {
		let profile = engine
			.new_profile(Some(&data[..]))
			.map_err(|e| Error::load(path, e))?;
		tracing::debug!("opened plaintext profile");

		return Ok(LoadedProfile {
			profile,
			path: path.to_path_buf(),
			was_encrypted: false,
			passphrase: None,
		});
	}

	if !engine.supports_encryption() {
		return Err(Error::load(path, toxsave::Error::EncryptionUnsupported));
	}

	let passphrase = prompt.passphrase("Decrypt with password: ")?;
	let plaintext = engine
		.decrypt(&data, passphrase.expose_secret().as_bytes())
		.map_err(|e| Error::load(path, e))?;
	let profile = engine
		.new_profile(Some(&plaintext[..]))
		.map_err(|e| Error::load(path, e))?;
	tracing::debug!("opened encrypted profile");

	Ok(LoadedProfile {
		profile,
		path: path.to_path_buf(),
		was_encrypted: true,
		passphrase: Some(passphrase),
	})
}

/// Write `profile` to `path` as plaintext save data.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn save(profile: &Profile, path: &Path) -> Result<(), Error> {
	let expected = profile.save_size();
	let data = profile.save_data();

	write_file(path, &data, expected)
}

/// Write `profile` to `path` sealed under `passphrase`.
///
/// The file isn't touched until encryption has succeeded, so a refusal leaves whatever was
/// there before intact.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn save_encrypted(
	engine: &Engine,
	profile: &Profile,
	path: &Path,
	passphrase: &SecretString,
) -> Result<(), Error> {
	let expected = profile.save_size() + ENCRYPTION_EXTRA_LENGTH;

	let ciphertext = {
		let plaintext = profile.save_data();
		engine
			.encrypt(&plaintext, passphrase.expose_secret().as_bytes())
			.map_err(Error::encryption)?
	};

	if ciphertext.len() != expected {
		return Err(Error::CiphertextLength {
			expected,
			actual: ciphertext.len(),
		});
	}

	write_file(path, &ciphertext, expected)
}

/// Rewrite an encrypted profile file in plaintext.
pub fn decrypt_in_place(loaded: &mut LoadedProfile) -> Result<(), Error> {
	if !loaded.was_encrypted {
		return Err(Error::already_decrypted(&loaded.path));
	}

	save(&loaded.profile, &loaded.path)?;
	loaded.was_encrypted = false;
	loaded.passphrase = None;

	Ok(())
}

/// Rewrite a profile file sealed under `passphrase`, which becomes the profile's passphrase
/// from here on.
pub fn encrypt_in_place(
	engine: &Engine,
	loaded: &mut LoadedProfile,
	passphrase: SecretString,
) -> Result<(), Error> {
	save_encrypted(engine, &loaded.profile, &loaded.path, &passphrase)?;
	loaded.was_encrypted = true;
	loaded.passphrase = Some(passphrase);

	Ok(())
}

/// Write the profile back where it came from, in the form it was in.
pub fn save_back(engine: &Engine, loaded: &LoadedProfile) -> Result<(), Error> {
	match &loaded.passphrase {
		Some(passphrase) if loaded.was_encrypted => {
			save_encrypted(engine, &loaded.profile, &loaded.path, passphrase)
		}
		_ => save(&loaded.profile, &loaded.path),
	}
}

fn write_file(path: &Path, data: &[u8], expected: usize) -> Result<(), Error> {
	let mut file = File::create(path).map_err(|e| Error::write_open(path, e))?;
	write_exactly(&mut file, path, data, expected)?;
	file.sync_all().map_err(|e| Error::write(path, e))
}

/// Write `data` and make sure exactly `expected` bytes of it went out.  A writer that stops
/// taking data partway is a failure, never a partial success.
pub(crate) fn write_exactly(
	w: &mut impl Write,
	path: &Path,
	data: &[u8],
	expected: usize,
) -> Result<(), Error> {
	let written = write_counted(w, data).map_err(|e| Error::write(path, e))?;
	if written != expected {
		return Err(Error::short_write(path, expected, written));
	}

	w.flush().map_err(|e| Error::write(path, e))
}

fn write_counted(w: &mut impl Write, data: &[u8]) -> io::Result<usize> {
	let mut written = 0;

	while written < data.len() {
		match w.write(&data[written..]) {
			Ok(0) => break,
			Ok(n) => written += n,
			Err(e) if e.kind() == io::ErrorKind::Interrupted => (),
			Err(e) => return Err(e),
		}
	}

	Ok(written)
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Takes at most `room` bytes, then refuses any more.
	struct Cramped {
		buf: Vec<u8>,
		room: usize,
	}

	impl Write for Cramped {
		fn write(&mut self, data: &[u8]) -> io::Result<usize> {
			let n = data.len().min(self.room - self.buf.len()).min(3);
			self.buf.extend_from_slice(&data[..n]);
			Ok(n)
		}

		fn flush(&mut self) -> io::Result<()> {
			Ok(())
		}
	}

	#[test]
	fn dribbling_writer_is_fine() {
		let mut w = Cramped {
			buf: Vec::new(),
			room: 100,
		};

		write_exactly(&mut w, Path::new("x"), b"0123456789", 10).unwrap();
		assert_eq!(b"0123456789", &w.buf[..]);
	}

	#[test]
	fn short_write_is_an_error() {
		let mut w = Cramped {
			buf: Vec::new(),
			room: 7,
		};

		assert!(matches!(
			write_exactly(&mut w, Path::new("x"), b"0123456789", 10),
			Err(Error::ShortWrite {
				expected: 10,
				written: 7,
				..
			})
		));
	}

	#[test]
	fn length_mismatch_is_an_error() {
		let mut w = Vec::new();

		assert!(matches!(
			write_exactly(&mut w, Path::new("x"), b"0123456789", 12),
			Err(Error::ShortWrite {
				expected: 12,
				written: 10,
				..
			})
		));
	}
}
