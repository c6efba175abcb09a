//! Bullhorn Core Components
//!
//! HTTP transport, URL helpers and wire constants.

pub mod transport;
pub mod urls;

pub use transport::*;

/// Header carrying the REST session token on every authenticated call.
pub const SESSION_HEADER: &str = "BhRestToken";
