use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading word lists or generating secrets.
#[derive(Debug, Error)]
pub enum Error {
    /// The word list path isn't an existing file.
    #[error("word list not found: {0:?}")]
    ResourceNotFound(PathBuf),

    /// The word list exists but doesn't look like a diceware list.
    #[error("malformed word list {path:?}: {reason}")]
    ResourceMalformed { path: PathBuf, reason: String },

    /// A generated index has no word behind it.
    #[error("no word for index {0} (is the word list complete?)")]
    KeyNotFound(String),

    /// Passphrase requested without loading a word list first.
    #[error("passphrase generation needs a word list")]
    MissingWordList,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
