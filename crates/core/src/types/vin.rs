//! Vehicle Identification Number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Vin`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum VinParseError {
    /// The input string is empty (or whitespace only).
    #[error("VIN cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("VIN must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[A-Za-z0-9]`.
    #[error("VIN contains invalid character '{0}'")]
    InvalidCharacter(char),
}

/// A Vehicle Identification Number.
///
/// The subject reference of an order and the lookup key for the NHTSA vPIC
/// decoder. Full VINs are 17 characters, but vPIC also accepts partial VINs,
/// so this type only enforces structure:
///
/// ## Constraints
///
/// - Non-empty after trimming surrounding whitespace
/// - At most 17 characters
/// - ASCII alphanumeric only
///
/// Stored uppercased; vPIC treats VINs case-insensitively.
///
/// ## Examples
///
/// ```
/// use benchlab_core::Vin;
///
/// assert!(Vin::parse("1HGCM82633A004352").is_ok());
/// assert!(Vin::parse("5UXWX7C5*BA").is_err()); // '*' is not alphanumeric
/// assert!(Vin::parse("").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Vin(String);

impl Vin {
    /// Maximum length of a VIN.
    pub const MAX_LENGTH: usize = 17;

    /// Parse a `Vin` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty or whitespace only
    /// - Is longer than 17 characters
    /// - Contains non-alphanumeric characters
    pub fn parse(s: &str) -> Result<Self, VinParseError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(VinParseError::Empty);
        }

        if trimmed.len() > Self::MAX_LENGTH {
            return Err(VinParseError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = trimmed.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(VinParseError::InvalidCharacter(c));
        }

        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Returns the VIN as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Vin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_vin() {
        let vin = Vin::parse("1HGCM82633A004352").expect("valid VIN");
        assert_eq!(vin.as_str(), "1HGCM82633A004352");
    }

    #[test]
    fn test_parse_uppercases() {
        let vin = Vin::parse("1hgcm82633a004352").expect("valid VIN");
        assert_eq!(vin.as_str(), "1HGCM82633A004352");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let vin = Vin::parse("  WBA3A5C51CF256987 ").expect("valid VIN");
        assert_eq!(vin.as_str(), "WBA3A5C51CF256987");
    }

    #[test]
    fn test_parse_partial_vin_allowed() {
        // vPIC supports partial VIN decoding
        assert!(Vin::parse("1HGCM").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(Vin::parse(""), Err(VinParseError::Empty)));
        assert!(matches!(Vin::parse("   "), Err(VinParseError::Empty)));
    }

    #[test]
    fn test_parse_too_long() {
        let result = Vin::parse("1HGCM82633A0043521X");
        assert!(matches!(result, Err(VinParseError::TooLong { max: 17 })));
    }

    #[test]
    fn test_parse_invalid_character() {
        let result = Vin::parse("1HGCM-82633");
        assert!(matches!(
            result,
            Err(VinParseError::InvalidCharacter('-'))
        ));
    }
}
