//! arclower
//!
//! The AST lowering core of a source-to-source compiler that turns a
//! garbage-collected, class-based language into a reference-counted target.
//! A front end (out of scope here) parses and type-checks source into the
//! tree and bindings this crate consumes; a back end serializes the lowered
//! tree to target-language text.
//!
//! ## Architecture
//!
//! - **ast**: owned mutable tree the passes rewrite in place
//! - **sem**: read-only type environment and the core-library type map
//! - **translate**: the lowering passes and the pipeline that sequences them
//! - **diagnostics**: non-fatal, location-keyed diagnostic collection
//!
//! ## Lowering Flow
//!
//! ```text
//! Typed AST → Lambda Naming → Reference Rewrites → Pruning → RC Rewrites
//!           → Varargs → Stripping → Reference Map → Synthesized Members
//!           → Expression Hoisting → Target Types → Declaration Sort
//! ```

pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod sem;
pub mod translate;

pub use config::{MemoryModel, Options};
pub use diagnostics::{Diagnostic, DiagnosticSink, Severity};
pub use error::{Error, Result};
pub use translate::{CodeReferenceMap, TranslationPipeline};

use ast::CompilationUnit;
use sem::TypeEnvironment;

/// Lower one compilation unit in place and return its reference map.
///
/// Convenience wrapper for callers that do not hold a pipeline across units.
pub fn lower_unit(
    unit: &mut CompilationUnit,
    env: &TypeEnvironment,
    options: &Options,
    sink: &mut DiagnosticSink,
) -> Result<CodeReferenceMap> {
    TranslationPipeline::new(env, options).run(unit, sink)
}
