//! Credential handling and URL blocklisting.

pub mod blocklist;
pub mod credentials;

pub use blocklist::{UrlBlocklist, DEFAULT_BLOCKED_HOSTS};
pub use credentials::SecretString;
