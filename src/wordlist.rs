use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context};
use log::{debug, info};

use crate::error::{Error, Result};

/// Entries in a diceware list, one per five-roll index (6^5).
pub const WORD_COUNT: usize = 7776;

/// Index -> word lookup built from an `INDEX,WORD` file.
///
/// Never mutated after loading, so a shared reference can be handed to as
/// many generators as needed.
#[derive(Debug, Clone, Default)]
pub struct WordDictionary {
    words: HashMap<String, String>,
}

impl WordDictionary {
    /// Read and validate a word list.
    ///
    /// The whole file is read up front; nothing stays open once this returns.
    /// Unreadable files count as not found, non UTF-8 ones as malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::ResourceNotFound(path.to_path_buf()));
        }
        let data = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::PermissionDenied | io::ErrorKind::NotFound => {
                Error::ResourceNotFound(path.to_path_buf())
            }
            io::ErrorKind::InvalidData => malformed(path, "not valid UTF-8".to_string()),
            _ => Error::Io(e),
        })?;
        let dict = Self::parse(path, &data)?;
        debug!("loaded {} words from {:?}", dict.len(), path);
        Ok(dict)
    }

    pub(crate) fn parse(path: &Path, data: &str) -> Result<Self> {
        let count = data.lines().count();
        if count != WORD_COUNT {
            return Err(malformed(
                path,
                format!("expected {WORD_COUNT} lines, found {count}"),
            ));
        }
        let mut words = HashMap::with_capacity(WORD_COUNT);
        for (n, line) in data.lines().enumerate() {
            let (index, word) = line
                .trim_end()
                .split_once(',')
                .ok_or_else(|| malformed(path, format!("line {} has no comma", n + 1)))?;
            words.insert(index.to_string(), word.to_string());
        }
        Ok(WordDictionary { words })
    }

    pub fn get(&self, index: &str) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn malformed(path: &Path, reason: String) -> Error {
    Error::ResourceMalformed {
        path: path.to_path_buf(),
        reason,
    }
}

/// Keeps the default word list under `~/.pw`, fetching it the first time.
#[derive(Debug)]
pub struct WordListCache {
    client: reqwest::blocking::Client,
    path: PathBuf,
}

impl WordListCache {
    const LARGE_LIST_SOURCE: &str = "https://www.eff.org/files/2016/07/18/eff_large_wordlist.txt";
    const LARGE_LIST: &str = "eff_large_wordlist.txt";

    pub fn new() -> anyhow::Result<Self> {
        let mut path = dirs::home_dir().ok_or_else(|| anyhow!("no home directory found"))?;
        path.push(".pw");
        Self::with_dir(path)
    }

    pub fn with_dir(path: PathBuf) -> anyhow::Result<Self> {
        fs::create_dir_all(&path)
            .with_context(|| format!("failed to create word list directory {:?}", path))?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("failed to create http client")?;
        Ok(WordListCache { client, path })
    }

    /// Path to the EFF large list, downloading it if it isn't cached yet.
    pub fn large_list(&self) -> anyhow::Result<PathBuf> {
        let resource_path = self.path.join(Self::LARGE_LIST);
        if resource_path.exists() {
            return Ok(resource_path);
        }
        info!("fetching word list from {}", Self::LARGE_LIST_SOURCE);
        let res = self.client.get(Self::LARGE_LIST_SOURCE).send()?;
        if !res.status().is_success() {
            return Err(anyhow!(
                "unexpected status: {:?}",
                res.status().canonical_reason()
            ));
        }
        self.store(&eff_to_indexed(&res.text()?))
    }

    /// Validate a converted list and move it into place. A bad or partial
    /// download never lands at the cached path.
    fn store(&self, list: &str) -> anyhow::Result<PathBuf> {
        let resource_path = self.path.join(Self::LARGE_LIST);
        WordDictionary::parse(&resource_path, list)
            .context("downloaded word list is not usable")?;
        let partial = resource_path.with_extension("part");
        fs::write(&partial, list)
            .with_context(|| format!("failed to write word list to {:?}", partial))?;
        fs::rename(&partial, &resource_path)
            .with_context(|| format!("failed to cache word list at {:?}", resource_path))?;
        debug!("cached word list at {:?}", resource_path);
        Ok(resource_path)
    }
}

/// EFF publishes `INDEX<TAB>WORD`; we store `INDEX,WORD`.
fn eff_to_indexed(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once(char::is_whitespace) {
            Some((index, word)) => format!("{},{}", index, word.trim()),
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
