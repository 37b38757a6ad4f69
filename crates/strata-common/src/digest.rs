//! Content-addressable digests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use crate::error::{StrataError, StrataResult};

/// A content-addressable digest (e.g., `sha256:abc123...`).
///
/// Digests must:
/// - Have a non-empty algorithm made of `[a-z0-9+._-]`
/// - Have a non-empty encoded part made of `[a-zA-Z0-9=_-]`
/// - Use 64 (`sha256`) or 128 (`sha512`) lowercase hex characters for the
///   registered algorithms
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest {
    algorithm: String,
    encoded: String,
}

impl Digest {
    /// The SHA-256 algorithm name.
    pub const SHA256: &'static str = "sha256";
    /// The SHA-512 algorithm name.
    pub const SHA512: &'static str = "sha512";

    /// Create a new digest, validating both parts.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::InvalidDigest`] if either part is malformed.
    pub fn new(algorithm: impl Into<String>, encoded: impl Into<String>) -> StrataResult<Self> {
        let digest = Self {
            algorithm: algorithm.into(),
            encoded: encoded.into(),
        };
        digest.validate()?;
        Ok(digest)
    }

    /// Compute the SHA-256 digest of `data`.
    #[must_use]
    pub fn sha256_of(data: &[u8]) -> Self {
        Self {
            algorithm: Self::SHA256.to_string(),
            encoded: hex::encode(Sha256::digest(data)),
        }
    }

    /// The algorithm part (e.g., `sha256`).
    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// The encoded hash part.
    #[must_use]
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// Returns a short version of the hash (first 12 characters).
    #[must_use]
    pub fn short(&self) -> &str {
        self.encoded.get(..12).unwrap_or(self.encoded.as_str())
    }

    fn validate(&self) -> StrataResult<()> {
        let invalid = || StrataError::InvalidDigest {
            digest: self.to_string(),
        };

        let algorithm_ok = !self.algorithm.is_empty()
            && self
                .algorithm
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "+._-".contains(c));
        if !algorithm_ok {
            return Err(invalid());
        }

        let encoded_ok = !self.encoded.is_empty()
            && self
                .encoded
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "=_-".contains(c));
        if !encoded_ok {
            return Err(invalid());
        }

        let hex_len = match self.algorithm.as_str() {
            Self::SHA256 => Some(64),
            Self::SHA512 => Some(128),
            _ => None,
        };
        if let Some(len) = hex_len {
            let lower_hex = self
                .encoded
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
            if self.encoded.len() != len || !lower_hex || hex::decode(&self.encoded).is_err() {
                return Err(invalid());
            }
        }

        Ok(())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.encoded)
    }
}

impl FromStr for Digest {
    type Err = StrataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (algorithm, encoded) = s.split_once(':').ok_or_else(|| StrataError::InvalidDigest {
            digest: s.to_string(),
        })?;
        Self::new(algorithm, encoded)
    }
}

impl TryFrom<String> for Digest {
    type Error = StrataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.to_string()
    }
}
