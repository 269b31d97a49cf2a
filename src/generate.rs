use std::fmt::{Display, Formatter};

use clap::ValueEnum;
use log::debug;

use crate::error::{Error, Result};
use crate::random::{pick, RandomSource};
use crate::wordlist::WordDictionary;

const PASSWORD_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const PIN_ALPHABET: &[u8] = b"0123456789";
// digits then ascii punctuation
const SPECIAL_CHARACTERS: &[u8] = b"0123456789!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

const INDEX_ROLLS: usize = 5;
const DIE_FACES: usize = 6;

/// What kind of secret to make.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    #[default]
    Passphrase,
    Password,
    Pin,
}

impl Mode {
    /// Words for a passphrase, characters otherwise.
    pub fn default_length(self) -> i64 {
        match self {
            Mode::Passphrase => 6,
            Mode::Password => 12,
            Mode::Pin => 4,
        }
    }

    /// A length the user gave wins as-is, even zero or negative.
    pub fn resolve_length(self, user: Option<i64>) -> i64 {
        user.unwrap_or_else(|| self.default_length())
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Mode::Passphrase => "passphrase",
                Mode::Password => "password",
                Mode::Pin => "pin",
            }
        )
    }
}

/// Fully resolved settings for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub mode: Mode,
    /// words for passphrases, characters for passwords and pins
    pub length: i64,
    /// passphrase only
    pub inject_special: bool,
    /// passphrase only
    pub separator: String,
    pub repeat: u32,
}

impl GenerationRequest {
    /// Defaults for `mode`, with the length resolved from `length`.
    pub fn new(mode: Mode, length: Option<i64>) -> Self {
        GenerationRequest {
            mode,
            length: mode.resolve_length(length),
            inject_special: false,
            separator: " ".to_string(),
            repeat: 1,
        }
    }
}

impl Default for GenerationRequest {
    fn default() -> Self {
        GenerationRequest::new(Mode::default(), None)
    }
}

/// Five dice rolls written out as a diceware index, e.g. "25146".
pub fn next_index<R: RandomSource + ?Sized>(rng: &mut R) -> String {
    (0..INDEX_ROLLS)
        .map(|_| char::from(b'1' + rng.below(DIE_FACES) as u8))
        .collect()
}

/// Generate one secret.
///
/// `dictionary` is only consulted (and only required) for passphrases.
pub fn generate<R: RandomSource + ?Sized>(
    request: &GenerationRequest,
    dictionary: Option<&WordDictionary>,
    rng: &mut R,
) -> Result<String> {
    // non-positive lengths give an empty secret
    let length = usize::try_from(request.length).unwrap_or(0);
    match request.mode {
        Mode::Password => Ok(draw_chars(rng, PASSWORD_ALPHABET, length)),
        Mode::Pin => Ok(draw_chars(rng, PIN_ALPHABET, length)),
        Mode::Passphrase => {
            let dictionary = dictionary.ok_or(Error::MissingWordList)?;
            passphrase(dictionary, length, request, rng)
        }
    }
}

/// Generate `request.repeat` independent secrets. Any failure fails the batch.
pub fn generate_many<R: RandomSource + ?Sized>(
    request: &GenerationRequest,
    dictionary: Option<&WordDictionary>,
    rng: &mut R,
) -> Result<Vec<String>> {
    debug!(
        "generating {} {}(s) of length {}",
        request.repeat, request.mode, request.length
    );
    (0..request.repeat)
        .map(|_| generate(request, dictionary, rng))
        .collect()
}

fn draw_chars<R: RandomSource + ?Sized>(rng: &mut R, alphabet: &[u8], length: usize) -> String {
    (0..length).map(|_| char::from(pick(rng, alphabet))).collect()
}

fn passphrase<R: RandomSource + ?Sized>(
    dictionary: &WordDictionary,
    length: usize,
    request: &GenerationRequest,
    rng: &mut R,
) -> Result<String> {
    let mut words = (0..length)
        .map(|_| {
            let index = next_index(rng);
            dictionary
                .get(&index)
                .map(str::to_string)
                .ok_or(Error::KeyNotFound(index))
        })
        .collect::<Result<Vec<_>>>()?;
    if request.inject_special {
        inject_special(&mut words, &request.separator, rng);
    }
    Ok(words.join(&request.separator))
}

/// Put one symbol inside one word, never in front of it.
///
/// Single-character words have nowhere to put it, so they're left out of the
/// draw. If nothing is left the words are untouched. Symbols that occur in
/// `separator` are never drawn, so the separator count stays fixed.
fn inject_special<R: RandomSource + ?Sized>(
    words: &mut [String],
    separator: &str,
    rng: &mut R,
) {
    let symbols: Vec<u8> = SPECIAL_CHARACTERS
        .iter()
        .copied()
        .filter(|b| !separator.contains(char::from(*b)))
        .collect();
    let eligible: Vec<usize> = words
        .iter()
        .enumerate()
        .filter(|(_, word)| word.chars().count() > 1)
        .map(|(i, _)| i)
        .collect();
    if eligible.is_empty() || symbols.is_empty() {
        debug!("nowhere to put a special character, skipping");
        return;
    }
    let word = &mut words[pick(rng, &eligible)];
    let offset = 1 + rng.below(word.chars().count() - 1);
    let symbol = char::from(pick(rng, &symbols));
    let at = word
        .char_indices()
        .nth(offset)
        .map_or(word.len(), |(i, _)| i);
    word.insert(at, symbol);
}
