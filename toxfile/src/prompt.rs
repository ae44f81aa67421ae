use secrecy::{ExposeSecret as _, SecretString};
use zeroize::Zeroize as _;

use std::io::{self, BufRead, Write};

use crate::{config::Config, Error};

/// The longest passphrase we'll accept, in bytes.
pub const MAX_PASSPHRASE_LENGTH: usize = 1024;

/// Anything that can ask the operator a question.
pub trait Prompt {
	/// Ask a yes/no question, where anything other than a clear "yes" is a no.
	fn confirm(&mut self, question: &str) -> Result<bool, Error>;

	/// Ask for a passphrase.
	fn passphrase(&mut self, prompt: &str) -> Result<SecretString, Error>;
}

/// Asks on the controlling terminal, unless the configuration has already answered.
#[derive(Debug)]
pub struct Terminal {
	overwrite: Option<bool>,
	passphrase: Option<SecretString>,
}

impl Terminal {
	#[must_use]
	pub fn new(cfg: &Config) -> Self {
		Terminal {
			overwrite: cfg.overwrite,
			passphrase: cfg.passphrase.clone(),
		}
	}
}

impl Prompt for Terminal {
	fn confirm(&mut self, question: &str) -> Result<bool, Error> {
		if let Some(answer) = self.overwrite {
			tracing::debug!("answering {question:?} from configuration");
			return Ok(answer);
		}

		ask(&mut io::stdin().lock(), &mut io::stderr(), question)
	}

	fn passphrase(&mut self, prompt: &str) -> Result<SecretString, Error> {
		if let Some(passphrase) = &self.passphrase {
			tracing::debug!("using passphrase from configuration");
			check_length(passphrase.expose_secret().len())?;
			return Ok(passphrase.clone());
		}

		let mut entered = rpassword::prompt_password(prompt).map_err(Error::prompt)?;
		if let Err(e) = check_length(entered.len()) {
			entered.zeroize();
			return Err(e);
		}

		Ok(SecretString::new(entered))
	}
}

/// Put `question` to `output`, and read a one-line answer from `input`.
///
/// End of input counts as an empty answer, and so as a no.
pub fn ask(input: &mut impl BufRead, output: &mut impl Write, question: &str) -> Result<bool, Error> {
	write!(output, "{question}").map_err(Error::prompt)?;
	output.flush().map_err(Error::prompt)?;

	let mut answer = String::new();
	input.read_line(&mut answer).map_err(Error::prompt)?;

	Ok(is_yes(&answer))
}

#[must_use]
pub fn is_yes(answer: &str) -> bool {
	matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn check_length(len: usize) -> Result<(), Error> {
	if len > MAX_PASSPHRASE_LENGTH {
		Err(Error::PassphraseTooLong {
			max: MAX_PASSPHRASE_LENGTH,
		})
	} else {
		Ok(())
	}
}
