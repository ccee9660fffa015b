//! Constant branch pruning
//!
//! Folds boolean expressions with statically known operands and removes the
//! branches and loops they make dead. Evaluation is bottom-up, so inner
//! constants are folded before the enclosing node is inspected, and the pass
//! is idempotent on output containing no remaining constant conditionals.

use crate::ast::rewrite::{self, StmtRewrite};
use crate::ast::{
    Block, ClassDecl, ClassMember, CompilationUnit, EnumDecl, Expr, InterfaceDecl, LambdaBody,
    Stmt, TypeDecl, UnaryOp, BinaryOp,
};
use crate::error::Result;

/// Ternary truth value of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriState {
    True,
    False,
    Unknown,
}

#[derive(Debug, Default)]
pub struct PruneStats {
    pub folded_expressions: usize,
    pub pruned_branches: usize,
    pub removed_statements: usize,
}

pub struct ConstantBranchPruner {
    pub stats: PruneStats,
}

impl ConstantBranchPruner {
    pub fn new() -> Self {
        Self { stats: PruneStats::default() }
    }

    pub fn run(&mut self, unit: &mut CompilationUnit) -> Result<()> {
        for type_decl in &mut unit.types {
            self.process_type(type_decl)?;
        }
        Ok(())
    }

    /// Statically known boolean value of an expression, if any.
    pub fn value(expr: &Expr) -> TriState {
        match expr {
            Expr::Literal(lit) => match lit.value {
                crate::ast::Literal::Boolean(true) => TriState::True,
                crate::ast::Literal::Boolean(false) => TriState::False,
                _ => TriState::Unknown,
            },
            _ => TriState::Unknown,
        }
    }

    fn process_type(&mut self, type_decl: &mut TypeDecl) -> Result<()> {
        match type_decl {
            TypeDecl::Class(class) => self.process_class(class),
            TypeDecl::Interface(interface) => self.process_interface(interface),
            TypeDecl::Enum(enum_decl) => self.process_enum(enum_decl),
        }
    }

    fn process_class(&mut self, class: &mut ClassDecl) -> Result<()> {
        self.process_members(&mut class.body)
    }

    fn process_interface(&mut self, interface: &mut InterfaceDecl) -> Result<()> {
        self.process_members(&mut interface.body)
    }

    fn process_enum(&mut self, enum_decl: &mut EnumDecl) -> Result<()> {
        for constant in &mut enum_decl.constants {
            for arg in &mut constant.arguments {
                self.fold_expr(arg)?;
            }
        }
        self.process_members(&mut enum_decl.body)
    }

    fn process_members(&mut self, members: &mut [ClassMember]) -> Result<()> {
        for member in members {
            match member {
                ClassMember::Field(field) => {
                    if let Some(init) = &mut field.initializer {
                        self.fold_expr(init)?;
                    }
                }
                ClassMember::Method(method) => {
                    if let Some(body) = &mut method.body {
                        self.prune_block(body)?;
                    }
                }
                ClassMember::Constructor(ctor) => {
                    if let Some(invocation) = &mut ctor.explicit_invocation {
                        for arg in &mut invocation.arguments {
                            self.fold_expr(arg)?;
                        }
                    }
                    self.prune_block(&mut ctor.body)?;
                }
                ClassMember::Initializer(init) => self.prune_block(&mut init.body)?,
                ClassMember::Type(nested) => self.process_type(nested)?,
            }
        }
        Ok(())
    }

    fn prune_block(&mut self, block: &mut Block) -> Result<()> {
        rewrite::rewrite_stmts(&mut block.statements, &mut |stmt| self.prune_stmt(stmt))
    }

    fn prune_slot(&mut self, slot: &mut Stmt) -> Result<()> {
        let rewrite = self.prune_stmt(slot)?;
        rewrite::apply_to_slot(slot, rewrite);
        Ok(())
    }

    /// Rewrite one statement. Children are pruned first so that a branch
    /// selected by a constant condition is already in normalized form when it
    /// replaces its parent.
    fn prune_stmt(&mut self, stmt: &mut Stmt) -> Result<StmtRewrite> {
        match stmt {
            Stmt::Expression(es) => {
                self.fold_expr(&mut es.expr)?;
                Ok(StmtRewrite::Keep)
            }
            Stmt::Declaration(decl) => {
                for var in &mut decl.variables {
                    if let Some(init) = &mut var.initializer {
                        self.fold_expr(init)?;
                    }
                }
                Ok(StmtRewrite::Keep)
            }
            Stmt::Block(block) => {
                self.prune_block(block)?;
                Ok(StmtRewrite::Keep)
            }
            Stmt::If(ifs) => {
                self.fold_expr(&mut ifs.condition)?;
                self.prune_slot(&mut ifs.then_branch)?;
                if let Some(els) = &mut ifs.else_branch {
                    self.prune_slot(els)?;
                }
                match Self::value(&ifs.condition) {
                    TriState::True => {
                        self.stats.pruned_branches += 1;
                        let then = std::mem::replace(&mut *ifs.then_branch, Stmt::Empty);
                        Ok(StmtRewrite::Replace(then))
                    }
                    TriState::False => {
                        self.stats.pruned_branches += 1;
                        match ifs.else_branch.take() {
                            Some(els) => Ok(StmtRewrite::Replace(*els)),
                            None => {
                                self.stats.removed_statements += 1;
                                Ok(StmtRewrite::Remove)
                            }
                        }
                    }
                    TriState::Unknown => Ok(StmtRewrite::Keep),
                }
            }
            Stmt::While(ws) => {
                self.fold_expr(&mut ws.condition)?;
                self.prune_slot(&mut ws.body)?;
                if Self::value(&ws.condition) == TriState::False {
                    self.stats.removed_statements += 1;
                    Ok(StmtRewrite::Remove)
                } else {
                    Ok(StmtRewrite::Keep)
                }
            }
            Stmt::DoWhile(dws) => {
                self.prune_slot(&mut dws.body)?;
                self.fold_expr(&mut dws.condition)?;
                if Self::value(&dws.condition) == TriState::False {
                    self.stats.removed_statements += 1;
                    Ok(StmtRewrite::Remove)
                } else {
                    Ok(StmtRewrite::Keep)
                }
            }
            Stmt::For(fs) => {
                rewrite::rewrite_stmts(&mut fs.init, &mut |s| self.prune_stmt(s))?;
                if let Some(cond) = &mut fs.condition {
                    self.fold_expr(cond)?;
                }
                for update in &mut fs.update {
                    self.fold_expr(update)?;
                }
                self.prune_slot(&mut fs.body)?;
                Ok(StmtRewrite::Keep)
            }
            Stmt::Return(rs) => {
                if let Some(value) = &mut rs.value {
                    self.fold_expr(value)?;
                }
                Ok(StmtRewrite::Keep)
            }
            Stmt::Throw(ts) => {
                self.fold_expr(&mut ts.expr)?;
                Ok(StmtRewrite::Keep)
            }
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty => Ok(StmtRewrite::Keep),
        }
    }

    /// Fold constant boolean subexpressions bottom-up.
    fn fold_expr(&mut self, expr: &mut Expr) -> Result<()> {
        // Children first, so that inner constants surface before the node
        // itself is inspected.
        match expr {
            Expr::Binary(b) => {
                self.fold_expr(&mut b.left)?;
                self.fold_expr(&mut b.right)?;
            }
            Expr::Unary(u) => self.fold_expr(&mut u.operand)?,
            Expr::Parenthesized(p) => self.fold_expr(&mut p.expr)?,
            Expr::Assignment(a) => {
                self.fold_expr(&mut a.target)?;
                self.fold_expr(&mut a.value)?;
            }
            Expr::MethodCall(mc) => {
                if let Some(receiver) = &mut mc.receiver {
                    self.fold_expr(receiver)?;
                }
                for arg in &mut mc.arguments {
                    self.fold_expr(arg)?;
                }
            }
            Expr::SuperMethodCall(sc) => {
                for arg in &mut sc.arguments {
                    self.fold_expr(arg)?;
                }
            }
            Expr::FunctionCall(fc) => {
                for arg in &mut fc.arguments {
                    self.fold_expr(arg)?;
                }
            }
            Expr::FieldAccess(fa) => {
                if let Some(receiver) = &mut fa.receiver {
                    self.fold_expr(receiver)?;
                }
            }
            Expr::ArrayAccess(aa) => {
                self.fold_expr(&mut aa.array)?;
                self.fold_expr(&mut aa.index)?;
            }
            Expr::ArrayCreation(ac) => {
                for dim in &mut ac.dimensions {
                    self.fold_expr(dim)?;
                }
                if let Some(init) = &mut ac.initializer {
                    self.fold_expr(init)?;
                }
            }
            Expr::ArrayInitializer(ai) => {
                for element in &mut ai.elements {
                    self.fold_expr(element)?;
                }
            }
            Expr::Cast(c) => self.fold_expr(&mut c.expr)?,
            Expr::InstanceOf(io) => self.fold_expr(&mut io.expr)?,
            Expr::Conditional(c) => {
                self.fold_expr(&mut c.condition)?;
                self.fold_expr(&mut c.then_expr)?;
                self.fold_expr(&mut c.else_expr)?;
            }
            Expr::New(ne) => {
                for arg in &mut ne.arguments {
                    self.fold_expr(arg)?;
                }
                if let Some(body) = &mut ne.anonymous_body {
                    self.process_class(body)?;
                }
            }
            Expr::Lambda(lambda) => match &mut lambda.body {
                LambdaBody::Expression(e) => self.fold_expr(e)?,
                LambdaBody::Block(block) => self.prune_block(block)?,
            },
            Expr::Literal(_)
            | Expr::Identifier(_)
            | Expr::This(_)
            | Expr::MethodRef(_) => {}
        }

        // Fold the node itself.
        match expr {
            Expr::Unary(u) if u.operator == UnaryOp::Not => {
                let inverted = match Self::value(&u.operand) {
                    TriState::True => Some(false),
                    TriState::False => Some(true),
                    TriState::Unknown => None,
                };
                if let Some(value) = inverted {
                    self.stats.folded_expressions += 1;
                    *expr = Expr::boolean(value, expr.span());
                }
            }
            Expr::Parenthesized(p) => {
                if Self::value(&p.expr) != TriState::Unknown {
                    self.stats.folded_expressions += 1;
                    let inner = rewrite::take_expr(&mut p.expr);
                    *expr = inner;
                }
            }
            Expr::Binary(b) if b.operator == BinaryOp::CondAnd => {
                let left = Self::value(&b.left);
                let right = Self::value(&b.right);
                if left == TriState::False || right == TriState::False {
                    self.stats.folded_expressions += 1;
                    *expr = Expr::boolean(false, expr.span());
                } else if left == TriState::True {
                    self.stats.folded_expressions += 1;
                    let keep = rewrite::take_expr(&mut b.right);
                    *expr = keep;
                } else if right == TriState::True {
                    self.stats.folded_expressions += 1;
                    let keep = rewrite::take_expr(&mut b.left);
                    *expr = keep;
                }
            }
            Expr::Binary(b) if b.operator == BinaryOp::CondOr => {
                let left = Self::value(&b.left);
                let right = Self::value(&b.right);
                if left == TriState::True || right == TriState::True {
                    self.stats.folded_expressions += 1;
                    *expr = Expr::boolean(true, expr.span());
                } else if left == TriState::False {
                    self.stats.folded_expressions += 1;
                    let keep = rewrite::take_expr(&mut b.right);
                    *expr = keep;
                } else if right == TriState::False {
                    self.stats.folded_expressions += 1;
                    let keep = rewrite::take_expr(&mut b.left);
                    *expr = keep;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl Default for ConstantBranchPruner {
    fn default() -> Self {
        Self::new()
    }
}
