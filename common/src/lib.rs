//! Shared building blocks for the Hibiscus client.
//!
//! This crate holds the small types every other crate leans on: error
//! locations for structured errors, HTTP status classification for the
//! identity core, and a redacted holder for access credentials.
//!
//! ## Architecture
//!
//! - **common** (this crate): location-tagged errors and credential wrappers
//! - **hibiscus-core**: protocol, connection state machine, synchronizer, probe pool
//! - **hibiscus**: command-line front end wiring everything together

pub mod error;
pub mod http_status;
pub mod redacted_token;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use http_status::HttpStatusCode;
pub use redacted_token::RedactedToken;
