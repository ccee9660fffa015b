//! Pipeline configuration
//!
//! Options are constructed once by the driver and threaded by reference into
//! the pipeline and into individual passes. Tests build an `Options` with the
//! overrides they need instead of mutating shared state.

/// Memory management model of the target runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryModel {
    /// Manual retain/release. Assignments to reference fields must be
    /// rewritten into explicit bookkeeping calls, and field-copy methods are
    /// synthesized for clone support.
    ReferenceCounting,
    /// Automatic reference counting handled by the target compiler.
    Arc,
}

/// Configuration consumed by the lowering passes.
#[derive(Debug, Clone)]
pub struct Options {
    /// Maximum expression nesting depth tolerated by the target compiler.
    /// Deeper method-call/infix chains are flattened into temporaries.
    pub max_expression_depth: usize,
    /// Selected memory management model.
    pub memory_model: MemoryModel,
    /// Omit reflection metadata from the output. Enables serialization
    /// stripping and unsafe-reflection diagnostics.
    pub strip_reflection: bool,
    /// Print per-phase progress to stderr.
    pub verbose: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_expression_depth: 50,
            memory_model: MemoryModel::ReferenceCounting,
            strip_reflection: false,
            verbose: false,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_expression_depth(mut self, depth: usize) -> Self {
        self.max_expression_depth = depth;
        self
    }

    pub fn with_memory_model(mut self, model: MemoryModel) -> Self {
        self.memory_model = model;
        self
    }

    pub fn with_strip_reflection(mut self, strip: bool) -> Self {
        self.strip_reflection = strip;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Whether assignments need explicit retain/release call rewriting.
    pub fn use_reference_counting(&self) -> bool {
        self.memory_model == MemoryModel::ReferenceCounting
    }
}
