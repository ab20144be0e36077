//! API keys that stay out of logs.
//!
//! Keys live in a `secrecy` box that zeroes memory on drop. `Debug` and
//! `Display` print a placeholder, so a key inside a logged config is safe.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

use crate::error::{HarvestError, Result};

const REDACTED: &str = "[REDACTED]";

/// An API key or other credential.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(value.into().into_boxed_str()))
    }

    /// The raw value. Only for building request headers.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_blank(&self) -> bool {
        self.expose().trim().is_empty()
    }

    /// The raw value, or [`HarvestError::MissingCredential`] naming the
    /// environment variable when it is blank.
    pub fn require(&self, name: &'static str) -> Result<&str> {
        match self.expose().trim() {
            "" => Err(HarvestError::MissingCredential { name }),
            key => Ok(key),
        }
    }
}

impl Default for SecretString {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString({})", REDACTED)
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
