//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod expenses;
pub mod generation;
pub mod plans;
pub mod suggestions;
pub mod templates;

// Re-export all handlers for use in router
pub use expenses::*;
pub use generation::*;
pub use plans::*;
pub use suggestions::*;
pub use templates::*;
