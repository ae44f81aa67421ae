//! Tox profile save data.
//!
//! A profile is a keypair, a nospam value, a name, a status message and a user status.  This crate
//! reads and writes the plaintext save data layout, derives the Tox address, and seals save data
//! under a passphrase.  It does no networking whatsoever.
//!
//! ```
//! let engine = toxsave::Engine::default();
//! let profile = engine.new_profile(None)?;
//! let reloaded = engine.new_profile(Some(&profile.save_data()[..]))?;
//!
//! assert_eq!(profile.address(), reloaded.address());
//! # Ok::<(), toxsave::Error>(())
//! ```
//!
mod engine;
pub use engine::Engine;

mod error;
pub use error::Error;

pub mod pass;
pub use pass::ENCRYPTION_EXTRA_LENGTH;

mod profile;
pub use profile::{
	Profile, UserStatus, ADDRESS_SIZE, MAX_NAME_LENGTH, MAX_STATUS_MESSAGE_LENGTH, NOSPAM_SIZE,
	PUBLIC_KEY_SIZE, SECRET_KEY_SIZE,
};

/// scrypt cost parameters, for callers that need cheaper (or dearer) passphrase stretching.
pub use scrypt::Params as KdfParams;
