#[derive(Debug, thiserror::Error, thiserror_ext::Construct)]
#[non_exhaustive]
pub enum Error {
	#[error("failed to read save data: {0}")]
	Truncated(#[from] std::io::Error),

	#[error("not a profile: bad magic {magic:#010X}")]
	BadMagic { magic: u32 },

	#[error("section of type {section_type} has a bad cookie {cookie:#06X}")]
	BadCookie { section_type: u16, cookie: u16 },

	#[error("invalid {section} section: {reason}")]
	InvalidSection { section: String, reason: String },

	#[error("save data has no key section")]
	MissingKeys,

	#[error("{field} is {len} bytes long, but at most {max} bytes are allowed")]
	FieldTooLong {
		field: String,
		len: usize,
		max: usize,
	},

	#[error("invalid user status value {0}")]
	InvalidStatus(u8),

	#[error("key derivation failed: {0}")]
	KeyDerivation(String),

	#[error("data is not encrypted")]
	NotEncrypted,

	#[error("encryption failed")]
	EncryptionFailed,

	#[error("decryption failed (wrong passphrase, or corrupted data)")]
	DecryptionFailed,

	#[error("this engine was built without encryption support")]
	EncryptionUnsupported,

	#[error("failed to generate randomness: {0}")]
	Random(String),
}
