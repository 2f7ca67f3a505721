use std::num::ParseIntError;

#[derive(thiserror::Error, Debug)]
pub enum ParseDigestError {
    #[error("invalid digest length: expected 32 hex digits, got {0}")]
    InvalidLength(usize),

    #[error("invalid digest token: \"{0}\"")]
    InvalidToken(String),

    #[error(transparent)]
    IntError(#[from] ParseIntError),
}
