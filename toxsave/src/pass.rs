//! Passphrase encryption of save data, in the format Tox clients use.
//!
//! An encrypted blob is the magic, a random salt, a random nonce, and then the save data sealed
//! in an XSalsa20-Poly1305 secretbox (tag first).  The key is scrypt applied to the SHA-256 of
//! the passphrase.  The overhead is always [`ENCRYPTION_EXTRA_LENGTH`] bytes, whatever the size
//! of the save data.
//!
use crypto_secretbox::{
	aead::{generic_array::GenericArray, Aead, KeyInit},
	XSalsa20Poly1305,
};
use rand::{rngs::OsRng, RngCore};
use scrypt::Params;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::Error;

pub const MAGIC_LENGTH: usize = 8;
pub const ENCRYPTION_MAGIC: &[u8; MAGIC_LENGTH] = b"toxEsave";
pub const SALT_LENGTH: usize = 32;
pub const NONCE_LENGTH: usize = 24;
pub const TAG_LENGTH: usize = 16;
pub const KEY_LENGTH: usize = 32;
pub const ENCRYPTION_EXTRA_LENGTH: usize = MAGIC_LENGTH + SALT_LENGTH + NONCE_LENGTH + TAG_LENGTH;

// libsodium's "interactive" scrypt limits, doubled, as Tox uses them
const TOX_SCRYPT_LOG_N: u8 = 15;
const TOX_SCRYPT_R: u32 = 8;
const TOX_SCRYPT_P: u32 = 1;

const HEADER_LENGTH: usize = MAGIC_LENGTH + SALT_LENGTH + NONCE_LENGTH;

#[must_use]
pub fn is_encrypted(data: &[u8]) -> bool {
	data.starts_with(ENCRYPTION_MAGIC)
}

/// The scrypt cost every Tox client derives its save data key with.
pub fn tox_kdf_params() -> Result<Params, Error> {
	Params::new(TOX_SCRYPT_LOG_N, TOX_SCRYPT_R, TOX_SCRYPT_P, KEY_LENGTH)
		.map_err(|e| Error::key_derivation(e.to_string()))
}

pub(crate) fn encrypt(
	params: &Params,
	plaintext: &[u8],
	passphrase: &[u8],
) -> Result<Vec<u8>, Error> {
	let mut salt = [0u8; SALT_LENGTH];
	let mut nonce = [0u8; NONCE_LENGTH];
	OsRng
		.try_fill_bytes(&mut salt)
		.map_err(|e| Error::random(e.to_string()))?;
	OsRng
		.try_fill_bytes(&mut nonce)
		.map_err(|e| Error::random(e.to_string()))?;

	let sealed = secretbox(params, passphrase, &salt)?
		.encrypt(GenericArray::from_slice(&nonce), plaintext)
		.map_err(|_| Error::EncryptionFailed)?;

	let mut out = Vec::with_capacity(HEADER_LENGTH + sealed.len());
	out.extend_from_slice(ENCRYPTION_MAGIC);
	out.extend_from_slice(&salt);
	out.extend_from_slice(&nonce);
	out.extend_from_slice(&sealed);

	Ok(out)
}

pub(crate) fn decrypt(
	params: &Params,
	data: &[u8],
	passphrase: &[u8],
) -> Result<Zeroizing<Vec<u8>>, Error> {
	if !is_encrypted(data) {
		return Err(Error::NotEncrypted);
	}
	if data.len() < ENCRYPTION_EXTRA_LENGTH {
		return Err(Error::DecryptionFailed);
	}

	let (salt, rest) = data[MAGIC_LENGTH..].split_at(SALT_LENGTH);
	let (nonce, sealed) = rest.split_at(NONCE_LENGTH);

	secretbox(params, passphrase, salt)?
		.decrypt(GenericArray::from_slice(nonce), sealed)
		.map(Zeroizing::new)
		.map_err(|_| Error::DecryptionFailed)
}

fn secretbox(params: &Params, passphrase: &[u8], salt: &[u8]) -> Result<XSalsa20Poly1305, Error> {
	let key = derive_key(params, passphrase, salt)?;

	XSalsa20Poly1305::new_from_slice(&key[..]).map_err(|e| Error::key_derivation(e.to_string()))
}

fn derive_key(
	params: &Params,
	passphrase: &[u8],
	salt: &[u8],
) -> Result<Zeroizing<[u8; KEY_LENGTH]>, Error> {
	let mut prehash = Zeroizing::new([0u8; KEY_LENGTH]);
	prehash.copy_from_slice(&Sha256::digest(passphrase));

	let mut key = Zeroizing::new([0u8; KEY_LENGTH]);
	scrypt::scrypt(&prehash[..], salt, params, &mut key[..])
		.map_err(|e| Error::key_derivation(e.to_string()))?;

	Ok(key)
}
