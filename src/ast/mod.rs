//! Abstract Syntax Tree for the lowering pipeline
//!
//! This module defines the tree the front end hands to the pipeline: an owned,
//! mutable structure that passes rewrite in place. Structural mutation is
//! expressed through slot assignment (`*expr = ...`) and the statement-list
//! rewriting helpers in [`rewrite`].

mod nodes;
pub mod rewrite;
mod visitor;

pub use nodes::*;
pub use visitor::*;

use std::fmt;

/// Source location information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Location {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }
}

/// Span of source code (start and end locations)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Location,
    pub end: Location,
}

impl Span {
    pub fn new(start: Location, end: Location) -> Self {
        Self { start, end }
    }

    pub fn from_to(start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Self {
        Self {
            start: Location::new(start_line, start_col, 0),
            end: Location::new(end_line, end_col, 0),
        }
    }

    /// Span for nodes synthesized by a pass; carries no source position.
    pub fn synthetic() -> Self {
        Self::default()
    }
}

/// Root of one compilation unit's tree.
///
/// Owns the ordered sequence of top-level type declarations. Passes may
/// reorder `types` in place, but only the passes whose contract says so may
/// add or remove declarations and members.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub package: Option<String>,
    pub types: Vec<TypeDecl>,
    pub span: Span,
}

impl CompilationUnit {
    pub fn new(package: Option<String>, types: Vec<TypeDecl>) -> Self {
        Self { package, types, span: Span::default() }
    }
}

impl fmt::Display for CompilationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref package) = self.package {
            writeln!(f, "package {};", package)?;
        }
        for type_decl in &self.types {
            writeln!(f, "{}", type_decl)?;
        }
        Ok(())
    }
}
