//! Download token type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A single-use, time-limited secret authorizing exactly one report download.
///
/// The value is opaque to everything except the order store, which mints
/// tokens from 32 bytes of OS randomness and compares them on presentation.
/// `Debug` output is redacted so tokens never leak into logs or error
/// reports; serialization is transparent because the store persists tokens
/// as part of the order record, but API response DTOs must never embed this
/// type directly.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct DownloadToken(String);

impl DownloadToken {
    /// Wrap an already-encoded token value.
    ///
    /// Used by the store when minting (from random bytes) and when matching
    /// a presented bearer value against persisted orders.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the token as a string slice.
    ///
    /// Callers embed this in the download URL handed to the paying party;
    /// it must not appear anywhere else.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DownloadToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DownloadToken").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_value() {
        let token = DownloadToken::new("super-secret-token-value");
        let debug = format!("{token:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-token-value"));
    }

    #[test]
    fn test_equality_on_value() {
        let a = DownloadToken::new("abc");
        let b = DownloadToken::new("abc");
        let c = DownloadToken::new("xyz");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_serde_transparent() {
        let token = DownloadToken::new("abc123");
        let json = serde_json::to_string(&token).expect("serialize");
        assert_eq!(json, "\"abc123\"");
    }
}
