//! Key Module
//!
//! Argument model and cycle-safe key canonicalization.

mod args;
mod canonical;
mod value;


// Re-export public types
pub use args::{ArgConverter, ArgVector};
pub use canonical::{
    canonicalize, decycle, primitive_text, KeyStrategy, CYCLE_MARKER, MAX_DEPTH, REF_MARKER,
};
pub use value::{Node, Value};
