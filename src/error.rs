use crate::lookup::LookupError;
use thiserror::Error;

/// Crate-wide error type. Storage failures are unrecoverable for the call in
/// progress; the domain variants are recoverable by the caller.
#[derive(Debug, Error)]
pub enum Error {
    #[error("'{0}' is already in the vocabulary")]
    DuplicateWord(String),

    #[error("need at least {need} words to build a quiz, have {have}")]
    NotEnoughWords { have: usize, need: usize },

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Db(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
