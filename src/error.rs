// SPDX-License-Identifier: MIT
//!
//! Error type shared by every stage of a translation run
//!

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Glossary or input file is missing or can not be opened
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// Expected column is absent
    #[error("schema error: {0}")]
    Schema(String),

    /// Input file exists but can not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Remote translation call failed
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Remote translation call succeeded but the result field is absent
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Upstream(err.to_string())
        }
    }
}
