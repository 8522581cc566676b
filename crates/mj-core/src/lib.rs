//! magazine-journal/crates/mj-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Magazine Journal:
//! issue model, page segmentation, inline markup, export layout and the flip
//! transition state machine.

pub mod models;
pub mod traits;
pub mod error;
pub mod validation;
pub mod library;
pub mod pages;
pub mod markup;
pub mod flip;
pub mod prompts;
pub mod export;

// Re-exporting for easier access in other crates
pub use models::*;
pub use traits::*;
pub use error::*;
