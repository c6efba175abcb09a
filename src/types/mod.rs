//! Bullhorn Types
//!
//! Configuration, credential, query and event data structures.

pub mod config;
pub mod credential;
pub mod event;
pub mod query;

pub use config::*;
pub use credential::*;
pub use event::*;
pub use query::*;
