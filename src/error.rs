//! Errors raised while building a query or reading its results

use css::SelectorToken;
use nom::error::ErrorKind;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Which input failed to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Html,
    Selector,
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Html => f.write_str("HTML"),
            Input::Selector => f.write_str("selector"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Could not parse {input} at byte {offset}: {kind}")]
    Parse {
        input: Input,
        offset: usize,
        kind: String,
    },

    #[error("Unsupported selector token: {0}")]
    UnsupportedSelectorToken(SelectorToken),

    #[error("No element found")]
    NoElement,
}

impl Error {
    /// Convert a nom failure on `text` into a [`Error::Parse`]
    pub(crate) fn from_nom(
        what: Input,
        text: &str,
        err: nom::Err<nom::error::Error<&str>>,
    ) -> Self {
        match err {
            nom::Err::Incomplete(_) => Error::Parse {
                input: what,
                offset: text.len(),
                kind: "unexpected end of input".to_string(),
            },
            nom::Err::Error(e) | nom::Err::Failure(e) => Error::Parse {
                input: what,
                offset: text.len() - e.input.len(),
                kind: match e.code {
                    ErrorKind::Eof => "unexpected input".to_string(),
                    code => code.description().to_string(),
                },
            },
        }
    }
}
