use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

mod error;
mod generate;
mod random;
mod wordlist;

pub use error::Error;
pub use generate::{generate, generate_many, next_index, GenerationRequest, Mode};
pub use random::{RandomSource, SecureRandom};
pub use wordlist::{WordDictionary, WordListCache, WORD_COUNT};

const QUIET_MESSAGE: &str = "Quiet argument was chosen. Passwords will not be printed.";

#[derive(Parser, Debug)]
#[command(version, about = "generate passphrases, passwords and pins")]
pub struct Args {
    /// kind of secret to generate
    #[clap(short, long, value_enum, default_value_t = Mode::Passphrase)]
    kind: Mode,

    /// words in a passphrase, characters in a
    /// password or pin (defaults 6, 12, 4)
    #[clap(short, long, allow_negative_numbers = true)]
    length: Option<i64>,

    /// number to generate
    #[clap(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    repeat: u32,

    /// passphrase word separator (default space)
    #[clap(short, long, default_value = " ")]
    separator: String,

    /// put a random special character into
    /// one word of the passphrase
    #[clap(short, long)]
    character: bool,

    /// word list to use, one INDEX,WORD per line
    /// (7776 lines). without a path, or when
    /// omitted, the eff large list is used
    /// (fetched once into ~/.pw)
    #[clap(short, long, num_args = 0..=1)]
    provide: Option<Option<PathBuf>>,

    /// don't print the results
    #[clap(short, long)]
    quiet: bool,

    /// write results to a file, replacing
    /// anything already there
    /// (default passwords.txt)
    #[clap(short, long, num_args = 0..=1, default_missing_value = "passwords.txt")]
    write: Option<PathBuf>,

    /// debug logging
    #[clap(long)]
    pub debug: bool,
}

impl Args {
    pub fn request(&self) -> GenerationRequest {
        GenerationRequest {
            mode: self.kind,
            length: self.kind.resolve_length(self.length),
            inject_special: self.character,
            separator: self.separator.clone(),
            repeat: self.repeat,
        }
    }
}

pub fn run(args: Args) -> Result<()> {
    let request = args.request();
    // only passphrases need the word list
    let dictionary = match request.mode {
        Mode::Passphrase => {
            let path = word_list_path(args.provide.as_ref())?;
            Some(WordDictionary::load(&path)?)
        }
        Mode::Password | Mode::Pin => None,
    };
    let mut rng = SecureRandom::new();
    let secrets = generate_many(&request, dictionary.as_ref(), &mut rng)?;

    print_secrets(&mut io::stdout().lock(), &secrets, args.quiet)?;
    if let Some(path) = &args.write {
        write_secrets(path, &secrets)?;
    }
    Ok(())
}

fn word_list_path(provide: Option<&Option<PathBuf>>) -> Result<PathBuf> {
    match provide.and_then(Option::as_ref) {
        Some(path) => Ok(path.clone()),
        None => WordListCache::new()?.large_list(),
    }
}

fn print_secrets(out: &mut impl Write, secrets: &[String], quiet: bool) -> Result<()> {
    if quiet {
        writeln!(out, "{QUIET_MESSAGE}")?;
    } else {
        writeln!(out, "{}", secrets.join("\n"))?;
    }
    Ok(())
}

fn write_secrets(path: &Path, secrets: &[String]) -> Result<()> {
    if path.is_file() {
        fs::remove_file(path).with_context(|| format!("failed to remove {:?}", path))?;
    }
    let mut file = File::create(path).with_context(|| format!("failed to create {:?}", path))?;
    file.write_all(secrets.join("\n").as_bytes())?;
    debug!("wrote {} secret(s) to {:?}", secrets.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordlist::tests::{full_list, write_list};

    fn secrets() -> Vec<String> {
        vec!["password1".into(), "password2".into(), "password3".into()]
    }

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("pw").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let args = parse(&[]);
        assert_eq!(args.request(), GenerationRequest::default());
        assert!(args.provide.is_none());
        assert!(args.write.is_none());
        assert!(!args.quiet);
    }

    #[test]
    fn flags_map_onto_request() {
        let args = parse(&["-k", "password", "-l", "22", "-r", "3", "-s", "-", "-c"]);
        let request = args.request();
        assert_eq!(request.mode, Mode::Password);
        assert_eq!(request.length, 22);
        assert_eq!(request.repeat, 3);
        assert_eq!(request.separator, "-");
        assert!(request.inject_special);
    }

    #[test]
    fn mode_default_length_applies() {
        assert_eq!(parse(&["--kind", "pin"]).request().length, 4);
        assert_eq!(parse(&["--kind", "password"]).request().length, 12);
    }

    #[test]
    fn negative_length_is_accepted() {
        assert_eq!(parse(&["-k", "pin", "-l", "-3"]).request().length, -3);
    }

    #[test]
    fn zero_repeat_is_rejected() {
        assert!(Args::try_parse_from(["pw", "-r", "0"]).is_err());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(Args::try_parse_from(["pw", "-k", "pattern"]).is_err());
    }

    #[test]
    fn bare_write_uses_default_file() {
        assert_eq!(parse(&["-w"]).write, Some(PathBuf::from("passwords.txt")));
        assert_eq!(parse(&["-w", "out.txt"]).write, Some(PathBuf::from("out.txt")));
    }

    #[test]
    fn bare_provide_means_default_list() {
        assert_eq!(parse(&["-p"]).provide, Some(None));
        assert_eq!(
            parse(&["-p", "words.txt"]).provide,
            Some(Some(PathBuf::from("words.txt")))
        );
    }

    #[test]
    fn quiet_prints_notice_only() {
        let mut out = Vec::new();
        print_secrets(&mut out, &secrets(), true).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("{QUIET_MESSAGE}\n"));
    }

    #[test]
    fn prints_one_per_line() {
        let mut out = Vec::new();
        print_secrets(&mut out, &secrets(), false).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "password1\npassword2\npassword3\n"
        );
    }

    #[test]
    fn write_creates_file_with_every_secret() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_write_passwords.txt");
        write_secrets(&path, &secrets()).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "password1\npassword2\npassword3");
        assert_eq!(written.lines().count(), 3);
    }

    #[test]
    fn write_replaces_existing_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passwords.txt");
        fs::write(&path, "old\nold\nold\nold\nold\n").unwrap();
        write_secrets(&path, &secrets()[..1]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "password1");
    }

    #[test]
    fn run_writes_pins_without_word_list() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("pins.txt");
        let args = parse(&["-k", "pin", "-r", "3", "-q", "-w", out.to_str().unwrap()]);
        run(args).unwrap();
        let written = fs::read_to_string(&out).unwrap();
        let pins: Vec<&str> = written.lines().collect();
        assert_eq!(pins.len(), 3);
        assert!(pins.iter().all(|p| p.len() == 4 && p.chars().all(|c| c.is_ascii_digit())));
    }

    #[test]
    fn run_uses_provided_word_list() {
        let list = write_list(&full_list());
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("phrases.txt");
        let args = parse(&[
            "-p",
            list.path().to_str().unwrap(),
            "-l",
            "4",
            "-r",
            "2",
            "-s",
            "_",
            "-q",
            "-w",
            out.to_str().unwrap(),
        ]);
        run(args).unwrap();
        let written = fs::read_to_string(&out).unwrap();
        for phrase in written.lines() {
            assert_eq!(phrase.split('_').count(), 4, "{phrase}");
        }
        assert_eq!(written.lines().count(), 2);
    }

    #[test]
    fn run_fails_before_writing_on_missing_word_list() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("phrases.txt");
        let missing = dir.path().join("non_existent_file.txt");
        let args = parse(&[
            "-p",
            missing.to_str().unwrap(),
            "-q",
            "-w",
            out.to_str().unwrap(),
        ]);
        let err = run(args).unwrap_err();
        assert!(
            matches!(err.downcast_ref::<Error>(), Some(Error::ResourceNotFound(_))),
            "{err:?}"
        );
        assert!(!out.exists());
    }

    #[test]
    fn run_rejects_malformed_word_list() {
        let list = write_list("not\na\nword\nlist\n");
        let args = parse(&["-p", list.path().to_str().unwrap(), "-q"]);
        let err = run(args).unwrap_err();
        assert!(
            matches!(err.downcast_ref::<Error>(), Some(Error::ResourceMalformed { .. })),
            "{err:?}"
        );
    }
}
