//! Bindings and the shared type environment consumed by the passes.

mod env;
pub mod mappings;

pub use env::*;
