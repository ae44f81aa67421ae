use scrypt::Params;
use zeroize::Zeroizing;

use crate::{pass, Error, Profile};

/// The entry point for everything that turns bytes into profiles and back.
///
/// Whether passphrase encryption is available is a property of the engine rather than of how
/// the crate was compiled, so callers ask [`supports_encryption`](Self::supports_encryption)
/// instead of sprinkling `cfg`s around.
///
#[derive(Clone, Debug)]
pub struct Engine {
	encryption: bool,
	/// `None` means the cost every Tox client uses.
	kdf_params: Option<Params>,
}

impl Default for Engine {
	fn default() -> Self {
		Self {
			encryption: true,
			kdf_params: None,
		}
	}
}

impl Engine {
	/// An engine that can read and write plaintext profiles only.
	#[must_use]
	pub fn without_encryption() -> Self {
		Self {
			encryption: false,
			..Self::default()
		}
	}

	/// Use different scrypt cost parameters for passphrase key derivation.
	///
	/// Blobs encrypted under one set of parameters can only be decrypted under the same set, and
	/// Tox clients only ever use the default one.
	#[must_use]
	pub fn with_kdf_params(mut self, params: Params) -> Self {
		self.kdf_params = Some(params);
		self
	}

	#[must_use]
	pub fn supports_encryption(&self) -> bool {
		self.encryption
	}

	/// Bring a profile into being, either from plaintext save data or from nothing at all.
	pub fn new_profile(&self, saved: Option<&[u8]>) -> Result<Profile, Error> {
		match saved {
			Some(data) => Profile::from_save_data(data),
			None => Profile::generate(),
		}
	}

	/// Whether `data` looks like an encrypted blob.  This works without encryption support, so
	/// that such an engine can at least say *why* it can't load a file.
	#[must_use]
	pub fn is_encrypted(&self, data: &[u8]) -> bool {
		pass::is_encrypted(data)
	}

	pub fn encrypt(&self, plaintext: &[u8], passphrase: &[u8]) -> Result<Vec<u8>, Error> {
		self.require_encryption()?;
		pass::encrypt(&self.kdf_params()?, plaintext, passphrase)
	}

	pub fn decrypt(&self, data: &[u8], passphrase: &[u8]) -> Result<Zeroizing<Vec<u8>>, Error> {
		self.require_encryption()?;
		pass::decrypt(&self.kdf_params()?, data, passphrase)
	}

	fn kdf_params(&self) -> Result<Params, Error> {
		match &self.kdf_params {
			Some(params) => Ok(params.clone()),
			None => pass::tox_kdf_params(),
		}
	}

	fn require_encryption(&self) -> Result<(), Error> {
		if self.encryption {
			Ok(())
		} else {
			Err(Error::EncryptionUnsupported)
		}
	}
}
