//! Error types for catalog construction

use thiserror::Error;

/// What is wrong with a malformed post
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Malformation {
    #[error("missing frontmatter opening '---'")]
    MissingOpeningDelimiter,

    #[error("missing frontmatter closing '---'")]
    MissingClosingDelimiter,

    #[error("missing required frontmatter field '{0}'")]
    MissingField(&'static str),

    #[error("missing required content body")]
    EmptyBody,

    #[error("duplicate post id '{id}', already used by {first}")]
    DuplicateId { id: String, first: String },
}

/// Library error
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid post {path}: {reason}")]
    MalformedPost { path: String, reason: Malformation },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(path: &str, reason: Malformation) -> Self {
        Error::MalformedPost {
            path: path.to_string(),
            reason,
        }
    }

    /// The malformation behind a `MalformedPost`, if that is what this is
    pub fn malformation(&self) -> Option<&Malformation> {
        match self {
            Error::MalformedPost { reason, .. } => Some(reason),
            Error::Io(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
