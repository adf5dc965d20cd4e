//! Route handlers for the REST API
//!
//! - [`decks`] — Package creation
//! - [`system`] — Health and OpenAPI

mod decks;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use decks::*;
pub use system::*;
