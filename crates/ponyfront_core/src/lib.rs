//! ponyfront_core: Core utilities for the ponyfront compiler front end.
//!
//! Provides text spans, line maps, ordered collections, and the standard
//! library locator used by the rest of the pipeline.

pub mod collections;
pub mod stdlib;
pub mod text;

// Re-export commonly used types
pub use collections::OrderedMap;
pub use text::{LineAndColumn, LineMap, TextSpan};
