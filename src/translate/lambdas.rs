//! Functional-literal type synthesis
//!
//! Two passes over every functional literal (inline lambda or method
//! reference). The element adder assigns each literal a synthesized
//! anonymous type identity, `$Lambda$N`, numbered per enclosing type in
//! encounter order starting at 1. The binding fixer then records the nearest
//! lexically enclosing named or anonymous type as the literal's declaring
//! class; meeting a functional literal with an empty enclosing-type stack is
//! a front-end contract violation and aborts the unit.

use crate::ast::{
    walk_class_decl, walk_enum_decl, walk_expr, walk_interface_decl, ClassDecl, CompilationUnit,
    EnumDecl, Expr, InterfaceDecl, MutVisitor,
};
use crate::error::{Error, Result};

#[derive(Debug, Default)]
pub struct LambdaStats {
    pub typed_literals: usize,
}

/// Assigns `$Lambda$N` type identities.
pub struct LambdaTypeElementAdder {
    // (enclosing type name, running literal count)
    type_stack: Vec<(String, usize)>,
    pub stats: LambdaStats,
}

impl LambdaTypeElementAdder {
    pub fn new() -> Self {
        Self { type_stack: Vec::new(), stats: LambdaStats::default() }
    }

    pub fn run(&mut self, unit: &mut CompilationUnit) -> Result<()> {
        self.visit_unit(unit)
    }

    fn next_name(&mut self, span_hint: &str) -> Result<String> {
        let (_, count) = self
            .type_stack
            .last_mut()
            .ok_or_else(|| {
                Error::internal(format!(
                    "functional literal outside of any type declaration ({})",
                    span_hint
                ))
            })?;
        *count += 1;
        self.stats.typed_literals += 1;
        Ok(format!("$Lambda${}", count))
    }
}

impl MutVisitor for LambdaTypeElementAdder {
    fn visit_class_decl(&mut self, class: &mut ClassDecl) -> Result<()> {
        self.type_stack.push((class.name.clone(), 0));
        walk_class_decl(self, class)?;
        self.type_stack.pop();
        Ok(())
    }

    fn visit_interface_decl(&mut self, interface: &mut InterfaceDecl) -> Result<()> {
        self.type_stack.push((interface.name.clone(), 0));
        walk_interface_decl(self, interface)?;
        self.type_stack.pop();
        Ok(())
    }

    fn visit_enum_decl(&mut self, enum_decl: &mut EnumDecl) -> Result<()> {
        self.type_stack.push((enum_decl.name.clone(), 0));
        walk_enum_decl(self, enum_decl)?;
        self.type_stack.pop();
        Ok(())
    }

    fn visit_expr(&mut self, expr: &mut Expr) -> Result<()> {
        match expr {
            Expr::Lambda(lambda) => {
                lambda.type_name = Some(self.next_name("lambda")?);
            }
            Expr::MethodRef(mr) => {
                mr.type_name = Some(self.next_name("method reference")?);
            }
            _ => {}
        }
        walk_expr(self, expr)
    }
}

impl Default for LambdaTypeElementAdder {
    fn default() -> Self {
        Self::new()
    }
}

/// Records each functional literal's declaring class.
pub struct LambdaTypeBindingFixer {
    type_stack: Vec<String>,
    pub stats: LambdaStats,
}

impl LambdaTypeBindingFixer {
    pub fn new() -> Self {
        Self { type_stack: Vec::new(), stats: LambdaStats::default() }
    }

    pub fn run(&mut self, unit: &mut CompilationUnit) -> Result<()> {
        self.visit_unit(unit)?;
        if !self.type_stack.is_empty() {
            return Err(Error::internal(
                "enclosing-type stack not empty after lambda binding fixup",
            ));
        }
        Ok(())
    }

    fn enclosing_type(&self) -> Result<String> {
        self.type_stack.last().cloned().ok_or_else(|| {
            Error::internal("functional literal with an empty enclosing-type stack")
        })
    }
}

impl MutVisitor for LambdaTypeBindingFixer {
    fn visit_class_decl(&mut self, class: &mut ClassDecl) -> Result<()> {
        self.type_stack.push(class.name.clone());
        walk_class_decl(self, class)?;
        self.type_stack.pop();
        Ok(())
    }

    fn visit_interface_decl(&mut self, interface: &mut InterfaceDecl) -> Result<()> {
        self.type_stack.push(interface.name.clone());
        walk_interface_decl(self, interface)?;
        self.type_stack.pop();
        Ok(())
    }

    fn visit_enum_decl(&mut self, enum_decl: &mut EnumDecl) -> Result<()> {
        self.type_stack.push(enum_decl.name.clone());
        walk_enum_decl(self, enum_decl)?;
        self.type_stack.pop();
        Ok(())
    }

    fn visit_expr(&mut self, expr: &mut Expr) -> Result<()> {
        match expr {
            Expr::Lambda(lambda) => {
                lambda.declaring_class = Some(self.enclosing_type()?);
                self.stats.typed_literals += 1;
            }
            Expr::MethodRef(mr) => {
                mr.declaring_class = Some(self.enclosing_type()?);
                self.stats.typed_literals += 1;
            }
            _ => {}
        }
        walk_expr(self, expr)
    }
}

impl Default for LambdaTypeBindingFixer {
    fn default() -> Self {
        Self::new()
    }
}
