mod common;

use common::Scripted;
use toxfile::{
	args::{parse, Request},
	codec, run, Error,
};
use toxsave::Engine;

use std::{
	fs,
	io::{self, Write},
	path::Path,
};

fn request(engine: &Engine, args: &[&str]) -> Request {
	parse(engine, std::iter::once("toxfile").chain(args.iter().copied())).unwrap()
}

fn run_to_string(
	engine: &Engine,
	args: &[&str],
	prompt: &mut Scripted,
) -> Result<String, Error> {
	let mut out = Vec::new();
	run(engine, &request(engine, args), prompt, &mut out)?;

	Ok(String::from_utf8(out).unwrap())
}

fn make_profile(engine: &Engine, path: &Path) {
	let mut profile = engine.new_profile(None).unwrap();
	profile.set_name(b"Alice").unwrap();
	profile.set_status_message(b"around").unwrap();
	codec::save(&profile, path).unwrap();
}

#[test]
fn test_dump() {
	let engine = common::engine();
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("p.tox");
	make_profile(&engine, &path);
	let path = path.to_str().unwrap();

	let out = run_to_string(&engine, &[path], &mut Scripted::default()).unwrap();
	let lines: Vec<&str> = out.lines().collect();

	assert_eq!("Basic Info:", lines[0]);
	assert!(lines[1].starts_with(" Address:    "));
	assert_eq!(" Tox Name:   Alice", lines[2]);
	assert_eq!(" Tox Status: around", lines[3]);
	assert_eq!("Crypto Info:", lines[4]);
	assert!(lines[5].starts_with(" Public key:  "));
	assert_eq!(6, lines.len());

	let secret = run_to_string(&engine, &["-x", path], &mut Scripted::default()).unwrap();
	assert!(!out.contains(secret.trim_end()));
}

#[test]
fn test_exclusive_print() {
	let engine = common::engine();
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("p.tox");
	make_profile(&engine, &path);
	let path = path.to_str().unwrap();
	let mut prompt = Scripted::default();

	let address = run_to_string(&engine, &["-a", path], &mut prompt).unwrap();
	assert_eq!(1, address.lines().count());
	assert_eq!(76, address.trim_end().len());
	assert!(address
		.trim_end()
		.chars()
		.all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));

	let key = run_to_string(&engine, &["-k", path], &mut prompt).unwrap();
	assert!(address.starts_with(key.trim_end()));
	assert_eq!(64, key.trim_end().len());

	assert_eq!("Alice\n", run_to_string(&engine, &["-m", path], &mut prompt).unwrap());
	assert_eq!("around\n", run_to_string(&engine, &["-s", path], &mut prompt).unwrap());
	assert_eq!("none\n", run_to_string(&engine, &["-u", path], &mut prompt).unwrap());
	assert_eq!("Alice\n", run_to_string(&engine, &["-a", path, "-m"], &mut prompt).unwrap());
	assert!(prompt.asked.is_empty());
}

#[test]
fn test_secret_key_matches_public_key() {
	let engine = common::engine();
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("p.tox");
	make_profile(&engine, &path);
	let path_str = path.to_str().unwrap();
	let mut prompt = Scripted::default();

	let secret = run_to_string(&engine, &["-x", path_str], &mut prompt).unwrap();
	let public = run_to_string(&engine, &["-k", path_str], &mut prompt).unwrap();

	let other = dir.path().join("other.tox");
	make_profile(&engine, &other);
	run_to_string(
		&engine,
		&["-X", secret.trim_end(), other.to_str().unwrap()],
		&mut prompt,
	)
	.unwrap();

	assert_eq!(
		public,
		run_to_string(&engine, &["-k", other.to_str().unwrap()], &mut prompt).unwrap()
	);
}

#[test]
fn test_encrypt_then_print() {
	let engine = common::engine();
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("p.tox");
	make_profile(&engine, &path);
	let path = path.to_str().unwrap();
	let mut prompt = Scripted::with_passphrases(&["pw", "pw", "pw"]);

	assert_eq!(
		"Alice\n",
		run_to_string(&engine, &["-e", "-m", path], &mut prompt).unwrap()
	);
	assert!(engine.is_encrypted(&fs::read(path).unwrap()));
	assert_eq!(vec!["Encrypt with password: ".to_string()], prompt.asked);

	assert_eq!("", run_to_string(&engine, &["-d", path], &mut prompt).unwrap());
	assert!(!engine.is_encrypted(&fs::read(path).unwrap()));
	assert_eq!(
		"Alice\n",
		run_to_string(&engine, &["-m", path], &mut prompt).unwrap()
	);
}

#[test]
fn test_decrypting_plaintext_is_not_fatal() {
	let engine = common::engine();
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("p.tox");
	make_profile(&engine, &path);
	let before = fs::read(&path).unwrap();

	let out = run_to_string(
		&engine,
		&["-d", "-m", path.to_str().unwrap()],
		&mut Scripted::default(),
	)
	.unwrap();

	assert_eq!("Alice\n", out);
	assert_eq!(before, fs::read(&path).unwrap());
}

#[test]
fn test_edits_are_saved() {
	let engine = common::engine();
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("p.tox");
	make_profile(&engine, &path);
	let path = path.to_str().unwrap();
	let mut prompt = Scripted::default();

	let out = run_to_string(&engine, &["-M", "Bob", "-U", "away", path], &mut prompt).unwrap();
	assert_eq!("", out);

	assert_eq!("Bob\n", run_to_string(&engine, &["-m", path], &mut prompt).unwrap());
	assert_eq!("away\n", run_to_string(&engine, &["-u", path], &mut prompt).unwrap());
	assert_eq!("around\n", run_to_string(&engine, &["-s", path], &mut prompt).unwrap());
}

#[test]
fn test_edits_keep_encryption() {
	let engine = common::engine();
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("p.tox");
	let profile = engine.new_profile(None).unwrap();
	codec::save_encrypted(
		&engine,
		&profile,
		&path,
		&secrecy::SecretString::new("pw".into()),
	)
	.unwrap();
	let path = path.to_str().unwrap();
	let mut prompt = Scripted::with_passphrases(&["pw", "pw"]);

	run_to_string(&engine, &["-S", "busy busy", path], &mut prompt).unwrap();

	assert!(engine.is_encrypted(&fs::read(path).unwrap()));
	assert_eq!(
		"busy busy\n",
		run_to_string(&engine, &["-s", path], &mut prompt).unwrap()
	);
}

#[test]
fn test_overlong_edit_is_refused() {
	let engine = common::engine();
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("p.tox");
	make_profile(&engine, &path);
	let before = fs::read(&path).unwrap();
	let long_name = "x".repeat(toxsave::MAX_NAME_LENGTH + 1);

	assert!(matches!(
		run_to_string(
			&engine,
			&["-M", &long_name, path.to_str().unwrap()],
			&mut Scripted::default()
		),
		Err(Error::Edit { .. })
	));
	assert_eq!(before, fs::read(&path).unwrap());
}

#[test]
fn test_new_ignores_target() {
	let engine = common::engine();
	let dir = tempfile::tempdir().unwrap();
	let new = dir.path().join("new.tox");
	let target = dir.path().join("untouched.tox");

	let out = run_to_string(
		&engine,
		&["-N", new.to_str().unwrap(), "-a", target.to_str().unwrap()],
		&mut Scripted::default(),
	)
	.unwrap();

	assert_eq!("", out);
	assert!(new.is_file());
	assert!(!target.exists());
}

#[test]
fn test_help_and_version() {
	let engine = common::engine();
	let mut prompt = Scripted::default();

	let help = run_to_string(&engine, &["-?", "no-such-file.tox"], &mut prompt).unwrap();
	assert!(help.contains("--print-address"));
	assert!(help.contains("--new"));

	assert_eq!(
		format!("toxfile v{}\n", env!("CARGO_PKG_VERSION")),
		run_to_string(&engine, &["-v"], &mut prompt).unwrap()
	);
}

#[test]
fn test_no_file() {
	assert!(matches!(
		run_to_string(&common::engine(), &["-a"], &mut Scripted::default()),
		Err(Error::NoProfilePath)
	));
}

#[test]
fn test_encryption_disabled() {
	let engine = common::plain_engine();
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("p.tox");
	make_profile(&engine, &path);
	let before = fs::read(&path).unwrap();

	let out = run_to_string(
		&engine,
		&["-e", "-m", path.to_str().unwrap()],
		&mut Scripted::default(),
	)
	.unwrap();

	assert_eq!("Alice\n", out);
	assert_eq!(before, fs::read(&path).unwrap());
}

#[test]
fn test_edits_keep_unknown_sections() {
	let engine = common::engine();
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("p.tox");
	make_profile(&engine, &path);

	let data = fs::read(&path).unwrap();
	let friends = [4, 0, 0, 0, 0x03, 0x00, 0xCE, 0x01, 0xDE, 0xAD, 0xBE, 0xEF];
	let mut spliced = data[..8].to_vec();
	spliced.extend_from_slice(&friends);
	spliced.extend_from_slice(&data[8..]);
	fs::write(&path, &spliced).unwrap();

	run_to_string(
		&engine,
		&["-M", "Bob", path.to_str().unwrap()],
		&mut Scripted::default(),
	)
	.unwrap();

	let after = fs::read(&path).unwrap();
	assert_eq!(spliced.len() - 2, after.len());
	assert!(after.windows(friends.len()).any(|w| w == friends));
}

#[test]
fn test_name_stops_at_nul() {
	let engine = common::engine();
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("p.tox");
	let mut profile = engine.new_profile(None).unwrap();
	profile.set_name(b"Bob\0junk").unwrap();
	codec::save(&profile, &path).unwrap();

	assert_eq!(
		"Bob\n",
		run_to_string(&engine, &["-m", path.to_str().unwrap()], &mut Scripted::default())
			.unwrap()
	);
}

/// Behaves like stdout piped into something that has already exited.
struct ClosedPipe;

impl Write for ClosedPipe {
	fn write(&mut self, _: &[u8]) -> io::Result<usize> {
		Err(io::ErrorKind::BrokenPipe.into())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

#[test]
fn test_closed_pipe_is_recognised() {
	let engine = common::engine();
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("p.tox");
	make_profile(&engine, &path);
	let request = request(&engine, &[path.to_str().unwrap()]);

	let err = run(&engine, &request, &mut Scripted::default(), &mut ClosedPipe).unwrap_err();

	assert!(err.is_broken_pipe());
	assert!(!Error::NoProfilePath.is_broken_pipe());
}
