//! Shared helpers
//!
//! - Text: lookup-key normalization for districts, soil textures and months

pub mod text;

pub use text::{capitalize, normalize_key, normalize_month};
