//! Hashing, line store and serde helpers

pub mod base64_data;
mod content_hash;
pub mod line_store;

pub use content_hash::{ContentHash, ContentHashError};
pub use line_store::{IndexError, IndexRecord};
