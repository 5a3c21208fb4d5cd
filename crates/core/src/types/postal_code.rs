//! Postal code (CEP) type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PostalCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PostalCodeError {
    /// The input string is empty.
    #[error("postal code cannot be empty")]
    Empty,
    /// The digit count is wrong.
    #[error("postal code must have exactly {expected} digits")]
    InvalidLength {
        /// Required number of digits.
        expected: usize,
    },
    /// A character that is neither a digit nor an accepted separator.
    #[error("postal code contains an invalid character: {0:?}")]
    InvalidCharacter(char),
}

/// A Brazilian postal code (CEP).
///
/// Stored as the bare 8 digits; the conventional hyphen (`01310-100`) is
/// accepted on input and re-inserted on display. Deserialization goes
/// through [`PostalCode::parse`], so every constructed value holds exactly
/// 8 digits. Address directory lookups are keyed by [`PostalCode::digits`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PostalCode(String);

impl PostalCode {
    /// Number of digits in a CEP.
    pub const DIGITS: usize = 8;

    /// Parse a `PostalCode` from a string, with or without the hyphen.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains anything other than
    /// digits, hyphens, and spaces, or does not have exactly 8 digits.
    pub fn parse(s: &str) -> Result<Self, PostalCodeError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(PostalCodeError::Empty);
        }

        let mut digits = String::with_capacity(Self::DIGITS);
        for c in s.chars() {
            match c {
                '0'..='9' => digits.push(c),
                '-' | ' ' | '.' => {}
                other => return Err(PostalCodeError::InvalidCharacter(other)),
            }
        }

        if digits.len() != Self::DIGITS {
            return Err(PostalCodeError::InvalidLength {
                expected: Self::DIGITS,
            });
        }

        Ok(Self(digits))
    }

    /// Returns the bare 8 digits, suitable for lookup URLs.
    #[must_use]
    pub fn digits(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (prefix, suffix) = self.0.split_at(5);
        write!(f, "{prefix}-{suffix}")
    }
}

impl std::str::FromStr for PostalCode {
    type Err = PostalCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PostalCode {
    type Error = PostalCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PostalCode> for String {
    fn from(code: PostalCode) -> Self {
        code.0
    }
}

impl AsRef<str> for PostalCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
