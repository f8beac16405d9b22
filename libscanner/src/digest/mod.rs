//! Content digest validation and verification.
//!
//! Digests are validated with `oci_spec::image::Digest` and downloaded content
//! is checked against them before it is trusted.

use crate::error::{Result, ScanError};
use oci_spec::image::Digest as OciDigest;
use sha2::{Digest as Sha2Digest, Sha256, Sha512};
use std::fmt;
use std::str::FromStr;

#[cfg(test)]
mod tests;

/// A validated content digest (`algorithm:hex`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    algorithm: String,
    hex: String,
}

impl FromStr for Digest {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        OciDigest::from_str(s).map_err(|e| {
            ScanError::validation_with_source(format!("Invalid digest format: {}", s), e)
        })?;

        let (algorithm, hex) = s
            .split_once(':')
            .ok_or_else(|| ScanError::validation(format!("Invalid digest format: {}", s)))?;

        Ok(Self {
            algorithm: algorithm.to_string(),
            hex: hex.to_string(),
        })
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.hex)
    }
}

impl Digest {
    /// Returns the algorithm part (e.g. `sha256`).
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Returns the encoded hash part.
    pub fn hex(&self) -> &str {
        &self.hex
    }

    /// Checks that `content` hashes to this digest.
    ///
    /// # Examples
    ///
    /// ```
    /// use libscanner::Digest;
    /// use std::str::FromStr;
    ///
    /// let digest = Digest::from_str(
    ///     "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
    /// )
    /// .unwrap();
    /// assert!(digest.verify(b"").is_ok());
    /// assert!(digest.verify(b"tampered").is_err());
    /// ```
    pub fn verify(&self, content: &[u8]) -> Result<()> {
        let computed = match self.algorithm.as_str() {
            "sha256" => format!("{:x}", Sha256::digest(content)),
            "sha512" => format!("{:x}", Sha512::digest(content)),
            other => {
                return Err(ScanError::validation(format!(
                    "Unsupported digest algorithm: {}",
                    other
                )));
            }
        };

        if computed != self.hex {
            return Err(ScanError::validation(format!(
                "Blob digest mismatch: expected {}, computed {}:{}",
                self, self.algorithm, computed
            )));
        }

        Ok(())
    }
}
