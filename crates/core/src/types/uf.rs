//! Two-letter state/province code (UF).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Uf`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UfError {
    /// The input string is empty.
    #[error("state code cannot be empty")]
    Empty,
    /// The input is not exactly two ASCII letters.
    #[error("state code must be exactly two letters")]
    InvalidFormat,
}

/// A two-letter state code (Brazilian UF, e.g. `SP`, `RJ`).
///
/// Normalized to uppercase on parse. Membership in the official state list
/// is not checked here; the geography directory is the source of truth.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Uf([u8; 2]);

impl Uf {
    /// Parse a `Uf` from a string, normalizing to uppercase.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or not exactly two ASCII
    /// letters.
    pub fn parse(s: &str) -> Result<Self, UfError> {
        if s.is_empty() {
            return Err(UfError::Empty);
        }

        let bytes = s.as_bytes();
        match bytes {
            [a, b] if a.is_ascii_alphabetic() && b.is_ascii_alphabetic() => {
                Ok(Self([a.to_ascii_uppercase(), b.to_ascii_uppercase()]))
            }
            _ => Err(UfError::InvalidFormat),
        }
    }

    /// Returns the state code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Both bytes are ASCII letters by construction.
        std::str::from_utf8(&self.0).unwrap_or("??")
    }
}

impl fmt::Display for Uf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Uf {
    type Err = UfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Uf {
    type Error = UfError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Uf> for String {
    fn from(uf: Uf) -> Self {
        uf.as_str().to_owned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(Uf::parse("SP").unwrap().as_str(), "SP");
        assert_eq!(Uf::parse("rj").unwrap().as_str(), "RJ");
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(Uf::parse(""), Err(UfError::Empty));
        assert_eq!(Uf::parse("S"), Err(UfError::InvalidFormat));
        assert_eq!(Uf::parse("SPX"), Err(UfError::InvalidFormat));
        assert_eq!(Uf::parse("S1"), Err(UfError::InvalidFormat));
        // Multibyte input must not panic
        assert_eq!(Uf::parse("ãé"), Err(UfError::InvalidFormat));
    }

    #[test]
    fn test_serde_roundtrip() {
        let uf = Uf::parse("mg").unwrap();
        let json = serde_json::to_string(&uf).unwrap();
        assert_eq!(json, "\"MG\"");

        let parsed: Uf = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, uf);
    }

    #[test]
    fn test_deserialize_rejects_invalid() {
        assert!(serde_json::from_str::<Uf>("\"São Paulo\"").is_err());
    }
}
