#![allow(dead_code)] // Not every test file uses every helper

use secrecy::SecretString;
use toxfile::{prompt::Prompt, Error};
use toxsave::{Engine, KdfParams};

use std::{collections::VecDeque, io};

/// An engine with cheap key stretching, so encryption doesn't take forever in debug builds.
pub fn engine() -> Engine {
	Engine::default().with_kdf_params(KdfParams::new(4, 8, 1, 32).unwrap())
}

pub fn plain_engine() -> Engine {
	Engine::without_encryption()
}

/// Answers prompts from a script, and remembers what it was asked.
#[derive(Debug, Default)]
pub struct Scripted {
	pub answers: VecDeque<bool>,
	pub passphrases: VecDeque<String>,
	pub asked: Vec<String>,
}

impl Scripted {
	pub fn answering(answer: bool) -> Self {
		Scripted {
			answers: VecDeque::from([answer]),
			..Scripted::default()
		}
	}

	pub fn with_passphrases(passphrases: &[&str]) -> Self {
		Scripted {
			passphrases: passphrases.iter().map(|p| p.to_string()).collect(),
			..Scripted::default()
		}
	}
}

impl Prompt for Scripted {
	fn confirm(&mut self, question: &str) -> Result<bool, Error> {
		self.asked.push(question.to_string());
		self.answers.pop_front().ok_or_else(out_of_script)
	}

	fn passphrase(&mut self, prompt: &str) -> Result<SecretString, Error> {
		self.asked.push(prompt.to_string());
		self.passphrases
			.pop_front()
			.map(SecretString::new)
			.ok_or_else(out_of_script)
	}
}

fn out_of_script() -> Error {
	Error::prompt(io::Error::new(
		io::ErrorKind::UnexpectedEof,
		"ran out of scripted answers",
	))
}
