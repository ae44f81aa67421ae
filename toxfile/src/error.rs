use thiserror::Error;

use std::{
	fmt::{Debug, Display},
	io,
	path::{Path, PathBuf},
};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
	#[error("failed to parse value {value} for {name}: {cause}")]
	ConfigValueParse {
		value: String,
		name: String,
		cause: String,
	},

	#[error("no profile file given (try --help)")]
	NoProfilePath,

	#[error("could not read {}: {source}", .path.display())]
	Open { path: PathBuf, source: io::Error },

	#[error("could not load profile from {}: {source}", .path.display())]
	Load {
		path: PathBuf,
		source: toxsave::Error,
	},

	#[error("could not open {} for writing: {source}", .path.display())]
	WriteOpen { path: PathBuf, source: io::Error },

	#[error("error while saving {}: {source}", .path.display())]
	Write { path: PathBuf, source: io::Error },

	#[error("count mismatch while saving {}: wrote {written} bytes, expected {expected}", .path.display())]
	ShortWrite {
		path: PathBuf,
		expected: usize,
		written: usize,
	},

	#[error("encryption failed: {source}")]
	Encryption { source: toxsave::Error },

	#[error("encryption produced {actual} bytes, expected {expected}")]
	CiphertextLength { expected: usize, actual: usize },

	#[error("this build of toxfile has no encryption support")]
	EncryptionUnsupported,

	#[error("{} is already unencrypted", .path.display())]
	AlreadyDecrypted { path: PathBuf },

	#[error("{} exists and is not a regular file", .path.display())]
	NotRegularFile { path: PathBuf },

	#[error("error prompting for input: {source}")]
	Prompt { source: io::Error },

	#[error("passphrase is longer than {max} bytes")]
	PassphraseTooLong { max: usize },

	#[error("could not create a new profile: {source}")]
	EngineInit { source: toxsave::Error },

	#[error("could not set {field}: {source}")]
	Edit {
		field: String,
		source: toxsave::Error,
	},

	#[error("{field} is {len} bytes long, but at most {max} bytes are allowed")]
	FieldTooLong {
		field: String,
		len: usize,
		max: usize,
	},

	#[error("failed to write output: {source}")]
	Output { source: io::Error },
}

impl Error {
	/// Whether this error should end the run.  Asking to decrypt something that isn't
	/// encrypted is a request that has nothing to do, not a failure.
	#[must_use]
	pub fn is_fatal(&self) -> bool {
		!matches!(self, Error::AlreadyDecrypted { .. })
	}

	/// Whether this is output failing because the other end of a pipe went away.
	#[must_use]
	pub fn is_broken_pipe(&self) -> bool {
		matches!(self, Error::Output { source } if source.kind() == io::ErrorKind::BrokenPipe)
	}

	#[must_use]
	pub fn config_value_parse(name: &str, value: impl Debug, cause: impl Display) -> Error {
		Error::ConfigValueParse {
			name: name.to_string(),
			value: format!("{value:?}"),
			cause: cause.to_string(),
		}
	}

	#[must_use]
	pub fn open(path: &Path, source: io::Error) -> Error {
		Error::Open {
			path: path.to_path_buf(),
			source,
		}
	}

	#[must_use]
	pub fn load(path: &Path, source: toxsave::Error) -> Error {
		Error::Load {
			path: path.to_path_buf(),
			source,
		}
	}

	#[must_use]
	pub fn write_open(path: &Path, source: io::Error) -> Error {
		Error::WriteOpen {
			path: path.to_path_buf(),
			source,
		}
	}

	#[must_use]
	pub fn write(path: &Path, source: io::Error) -> Error {
		Error::Write {
			path: path.to_path_buf(),
			source,
		}
	}

	#[must_use]
	pub fn short_write(path: &Path, expected: usize, written: usize) -> Error {
		Error::ShortWrite {
			path: path.to_path_buf(),
			expected,
			written,
		}
	}

	#[must_use]
	pub fn encryption(source: toxsave::Error) -> Error {
		Error::Encryption { source }
	}

	#[must_use]
	pub fn already_decrypted(path: &Path) -> Error {
		Error::AlreadyDecrypted {
			path: path.to_path_buf(),
		}
	}

	#[must_use]
	pub fn not_regular_file(path: &Path) -> Error {
		Error::NotRegularFile {
			path: path.to_path_buf(),
		}
	}

	#[must_use]
	pub fn prompt(source: io::Error) -> Error {
		Error::Prompt { source }
	}

	#[must_use]
	pub fn engine_init(source: toxsave::Error) -> Error {
		Error::EngineInit { source }
	}

	#[must_use]
	pub fn edit(field: &str, source: toxsave::Error) -> Error {
		Error::Edit {
			field: field.to_string(),
			source,
		}
	}

	#[must_use]
	pub fn field_too_long(field: &str, len: usize, max: usize) -> Error {
		Error::FieldTooLong {
			field: field.to_string(),
			len,
			max,
		}
	}

	#[must_use]
	pub fn output(source: io::Error) -> Error {
		Error::Output { source }
	}
}
