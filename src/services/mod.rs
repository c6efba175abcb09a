//! Bullhorn REST service implementations.

mod entity;
mod events;
mod search;

pub use entity::*;
pub use events::*;
pub use search::*;
