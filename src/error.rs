use std::io;
use thiserror::Error;

/// Failures while reading or writing the game protocol. All of them are
/// fatal: the game only sends well-formed input.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("i/o failure on game stream: {0}")]
    Io(#[from] io::Error),
    #[error("input ended while reading {expected}")]
    UnexpectedEof { expected: &'static str },
    #[error("expected {expected}, found {token:?}")]
    InvalidToken { expected: &'static str, token: String },
    #[error("unknown structure type {0}")]
    UnknownStructureType(i64),
    #[error("unknown owner {0}")]
    UnknownOwner(i64),
    #[error("unknown unit type {0}")]
    UnknownUnitType(i64),
    #[error("unknown site {0}")]
    UnknownSite(i64),
}
