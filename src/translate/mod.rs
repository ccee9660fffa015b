//! AST lowering pipeline
//!
//! Each pass is a small struct that rewrites the tree in place. The pipeline
//! runs them in a fixed order, since several passes depend on what an earlier
//! one established:
//!
//! - lambda numbering must precede the declaring-class fixup, which must
//!   precede the constructor-reference rewrite that reads both;
//! - constant branches are pruned before the reference-counting rewrite so
//!   dead assignments never reach the setter form;
//! - varargs normalization runs before the handoff shape is fixed;
//! - reference accumulation happens after stripping so stripped members do
//!   not appear referenced;
//! - synthesized members are added before expression hoisting and type
//!   conversion so they get the same treatment as hand-written code;
//! - the dependency sort runs last, on the final set of declarations.

pub mod boilerplate;
pub mod complex_expressions;
pub mod constant_branches;
pub mod lambdas;
pub mod metadata;
pub mod method_references;
pub mod operators;
pub mod type_mapping;
pub mod type_sorter;
pub mod varargs;

pub use boilerplate::{CopyAllFieldsWriter, DefaultConstructorAdder, NumberMethodRewriter};
pub use complex_expressions::ComplexExpressionExtractor;
pub use constant_branches::ConstantBranchPruner;
pub use lambdas::{LambdaTypeBindingFixer, LambdaTypeElementAdder};
pub use metadata::{
    CodeReferenceMap, CodeReferenceMapBuilder, ElementReferenceMapper, ReflectionCodeDetector,
    SerializationStripper,
};
pub use method_references::MethodReferenceRewriter;
pub use operators::OperatorRewriter;
pub use type_mapping::TargetTypeConverter;
pub use type_sorter::TypeSorter;
pub use varargs::VarargsRewriter;

use crate::ast::CompilationUnit;
use crate::config::Options;
use crate::diagnostics::DiagnosticSink;
use crate::error::Result;
use crate::sem::TypeEnvironment;

/// Runs the full lowering pipeline over one compilation unit.
///
/// Pass-local state lives and dies inside `run`; only the tree, the sink,
/// and the returned reference map survive. The type environment is read-only
/// throughout.
pub struct TranslationPipeline<'a> {
    env: &'a TypeEnvironment,
    options: &'a Options,
}

impl<'a> TranslationPipeline<'a> {
    pub fn new(env: &'a TypeEnvironment, options: &'a Options) -> Self {
        Self { env, options }
    }

    pub fn run(
        &self,
        unit: &mut CompilationUnit,
        sink: &mut DiagnosticSink,
    ) -> Result<CodeReferenceMap> {
        self.trace("lambda type elements");
        LambdaTypeElementAdder::new().run(unit)?;
        self.trace("lambda declaring classes");
        LambdaTypeBindingFixer::new().run(unit)?;
        self.trace("constructor references");
        MethodReferenceRewriter::new(self.env).run(unit)?;
        self.trace("constant branches");
        ConstantBranchPruner::new().run(unit)?;
        if self.options.use_reference_counting() {
            self.trace("retained assignments");
            OperatorRewriter::new(self.env).run(unit)?;
        }
        self.trace("varargs");
        VarargsRewriter::new(self.env).run(unit)?;
        if self.options.strip_reflection {
            self.trace("serialization stripping");
            SerializationStripper::new().run(unit)?;
            self.trace("reflection detection");
            ReflectionCodeDetector::new(sink).run(unit)?;
        }
        self.trace("element references");
        let references = ElementReferenceMapper::new(self.env).run(unit)?;
        self.trace("default constructors");
        DefaultConstructorAdder::new(self.env).run(unit)?;
        if self.options.use_reference_counting() {
            self.trace("field copying");
            CopyAllFieldsWriter::new().run(unit)?;
        }
        self.trace("number methods");
        NumberMethodRewriter::new(self.env).run(unit)?;
        self.trace("expression hoisting");
        ComplexExpressionExtractor::new(self.env, self.options.max_expression_depth).run(unit)?;
        self.trace("target types");
        TargetTypeConverter::new(sink).run(unit)?;
        self.trace("declaration order");
        TypeSorter::new().run(unit)?;
        Ok(references)
    }

    fn trace(&self, pass: &str) {
        if self.options.verbose {
            eprintln!("LOWER: {pass}");
        }
    }
}
