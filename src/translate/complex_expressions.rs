//! Expression depth bounding
//!
//! The target compiler fails on deeply nested expressions, so method-call and
//! infix chains past a configured depth are flattened: the offending
//! subexpression is hoisted into a fresh temporary declared immediately
//! before the enclosing statement, and the original slot becomes a reference
//! to the temporary. Depths are computed bottom-up during the same walk;
//! a hoisted occurrence counts as a leaf afterwards, so extraction cascades
//! outward only as far as needed.

use crate::ast::rewrite::{self, StmtRewrite};
use crate::ast::{
    Block, ClassDecl, ClassMember, CompilationUnit, EnumDecl, Expr, InterfaceDecl, LambdaBody,
    Span, Stmt, TypeDecl, TypeRef,
};
use crate::error::{Error, Result};
use crate::sem::{TypeEnvironment, VariableBinding};

#[derive(Debug, Default)]
pub struct ExtractStats {
    pub hoisted_temporaries: usize,
}

pub struct ComplexExpressionExtractor<'a> {
    env: &'a TypeEnvironment,
    max_depth: usize,
    count: usize,
    current_class: Vec<String>,
    current_method: Option<String>,
    /// Bindings synthesized for the hoisted temporaries, pass-local.
    pub generated: Vec<VariableBinding>,
    pub stats: ExtractStats,
}

impl<'a> ComplexExpressionExtractor<'a> {
    pub fn new(env: &'a TypeEnvironment, max_depth: usize) -> Self {
        Self {
            env,
            max_depth,
            count: 0,
            current_class: Vec::new(),
            current_method: None,
            generated: Vec::new(),
            stats: ExtractStats::default(),
        }
    }

    pub fn run(&mut self, unit: &mut CompilationUnit) -> Result<()> {
        for type_decl in &mut unit.types {
            self.process_type(type_decl)?;
        }
        Ok(())
    }

    fn process_type(&mut self, type_decl: &mut TypeDecl) -> Result<()> {
        match type_decl {
            TypeDecl::Class(class) => self.process_class(class),
            TypeDecl::Interface(interface) => self.process_interface(interface),
            TypeDecl::Enum(enum_decl) => self.process_enum(enum_decl),
        }
    }

    fn process_class(&mut self, class: &mut ClassDecl) -> Result<()> {
        self.current_class.push(class.name.clone());
        self.process_members(&mut class.body)?;
        self.current_class.pop();
        Ok(())
    }

    fn process_interface(&mut self, interface: &mut InterfaceDecl) -> Result<()> {
        self.current_class.push(interface.name.clone());
        self.process_members(&mut interface.body)?;
        self.current_class.pop();
        Ok(())
    }

    fn process_enum(&mut self, enum_decl: &mut EnumDecl) -> Result<()> {
        self.current_class.push(enum_decl.name.clone());
        self.process_members(&mut enum_decl.body)?;
        self.current_class.pop();
        Ok(())
    }

    fn process_members(&mut self, members: &mut [ClassMember]) -> Result<()> {
        let class = self.current_class.last().cloned().unwrap_or_default();
        for member in members {
            match member {
                ClassMember::Method(method) => {
                    if let Some(body) = &mut method.body {
                        self.current_method = Some(format!("{}.{}", class, method.name));
                        self.process_block(body)?;
                        self.current_method = None;
                    }
                }
                ClassMember::Constructor(ctor) => {
                    self.current_method = Some(format!("{}.<init>", class));
                    // The explicit super/this invocation must stay the first
                    // statement, so nothing can anchor a temporary before it;
                    // its arguments are left to the emitter's own limits.
                    self.process_block(&mut ctor.body)?;
                    self.current_method = None;
                }
                ClassMember::Initializer(init) => {
                    self.current_method = Some(format!("{}.<init>", class));
                    self.process_block(&mut init.body)?;
                    self.current_method = None;
                }
                // Field initializers have no enclosing statement to anchor a
                // temporary on; the front end moves complex initializers into
                // constructors before this pass runs.
                ClassMember::Field(_) => {}
                ClassMember::Type(nested) => self.process_type(nested)?,
            }
        }
        Ok(())
    }

    fn process_block(&mut self, block: &mut Block) -> Result<()> {
        rewrite::rewrite_stmts(&mut block.statements, &mut |stmt| {
            let mut pending = Vec::new();
            self.process_stmt(stmt, &mut pending)?;
            if pending.is_empty() {
                Ok(StmtRewrite::Keep)
            } else {
                pending.push(std::mem::replace(stmt, Stmt::Empty));
                Ok(StmtRewrite::Splice(pending))
            }
        })
    }

    /// Walk a statement's expressions, accumulating hoisted declarations into
    /// `pending` (inserted before the innermost block-level statement).
    /// Non-block child statements share the parent's anchor.
    fn process_stmt(&mut self, stmt: &mut Stmt, pending: &mut Vec<Stmt>) -> Result<()> {
        match stmt {
            Stmt::Expression(es) => {
                self.scan(&mut es.expr, true, pending)?;
            }
            Stmt::Declaration(decl) => {
                for var in &mut decl.variables {
                    if let Some(init) = &mut var.initializer {
                        self.scan(init, false, pending)?;
                    }
                }
            }
            Stmt::If(ifs) => {
                self.scan(&mut ifs.condition, true, pending)?;
                self.process_child_stmt(&mut ifs.then_branch, pending)?;
                if let Some(els) = &mut ifs.else_branch {
                    self.process_child_stmt(els, pending)?;
                }
            }
            Stmt::While(ws) => {
                self.scan(&mut ws.condition, true, pending)?;
                self.process_child_stmt(&mut ws.body, pending)?;
            }
            Stmt::DoWhile(dws) => {
                self.process_child_stmt(&mut dws.body, pending)?;
                self.scan(&mut dws.condition, true, pending)?;
            }
            Stmt::For(fs) => {
                for init in &mut fs.init {
                    self.process_stmt(init, pending)?;
                }
                if let Some(cond) = &mut fs.condition {
                    self.scan(cond, true, pending)?;
                }
                for update in &mut fs.update {
                    self.scan(update, true, pending)?;
                }
                self.process_child_stmt(&mut fs.body, pending)?;
            }
            Stmt::Return(rs) => {
                if let Some(value) = &mut rs.value {
                    self.scan(value, true, pending)?;
                }
            }
            Stmt::Throw(ts) => {
                self.scan(&mut ts.expr, true, pending)?;
            }
            Stmt::Block(block) => self.process_block(block)?,
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty => {}
        }
        Ok(())
    }

    fn process_child_stmt(&mut self, stmt: &mut Stmt, pending: &mut Vec<Stmt>) -> Result<()> {
        if let Stmt::Block(block) = stmt {
            self.process_block(block)
        } else {
            self.process_stmt(stmt, pending)
        }
    }

    /// Compute the nesting depth of an expression, hoisting method-call and
    /// infix nodes one level before the bound, so every surviving subtree,
    /// hoisted initializers included, stays below it. Only those two kinds
    /// carry a recorded depth; every other node counts as a leaf of depth 1
    /// for its parent, matching the already-extracted-child rule.
    fn scan(&mut self, expr: &mut Expr, at_stmt: bool, pending: &mut Vec<Stmt>) -> Result<usize> {
        let depth = match expr {
            Expr::MethodCall(mc) => {
                let mut max = 0;
                if let Some(receiver) = &mut mc.receiver {
                    max = max.max(self.scan(receiver, false, pending)?);
                }
                for arg in &mut mc.arguments {
                    max = max.max(self.scan(arg, false, pending)?);
                }
                max.max(1) + 1
            }
            Expr::SuperMethodCall(sc) => {
                let mut max = 0;
                for arg in &mut sc.arguments {
                    max = max.max(self.scan(arg, false, pending)?);
                }
                max.max(1) + 1
            }
            Expr::FunctionCall(fc) => {
                let mut max = 0;
                for arg in &mut fc.arguments {
                    max = max.max(self.scan(arg, false, pending)?);
                }
                max.max(1) + 1
            }
            Expr::Binary(b) => {
                let left = self.scan(&mut b.left, false, pending)?;
                let right = self.scan(&mut b.right, false, pending)?;
                left.max(right) + 1
            }
            Expr::Unary(u) => {
                self.scan(&mut u.operand, false, pending)?;
                1
            }
            Expr::Assignment(a) => {
                self.scan(&mut a.target, false, pending)?;
                self.scan(&mut a.value, false, pending)?;
                1
            }
            Expr::FieldAccess(fa) => {
                if let Some(receiver) = &mut fa.receiver {
                    self.scan(receiver, false, pending)?;
                }
                1
            }
            Expr::ArrayAccess(aa) => {
                self.scan(&mut aa.array, false, pending)?;
                self.scan(&mut aa.index, false, pending)?;
                1
            }
            Expr::ArrayCreation(ac) => {
                for dim in &mut ac.dimensions {
                    self.scan(dim, false, pending)?;
                }
                if let Some(init) = &mut ac.initializer {
                    self.scan(init, false, pending)?;
                }
                1
            }
            Expr::ArrayInitializer(ai) => {
                for element in &mut ai.elements {
                    self.scan(element, false, pending)?;
                }
                1
            }
            Expr::Cast(c) => {
                self.scan(&mut c.expr, false, pending)?;
                1
            }
            Expr::InstanceOf(io) => {
                self.scan(&mut io.expr, false, pending)?;
                1
            }
            Expr::Conditional(c) => {
                self.scan(&mut c.condition, false, pending)?;
                self.scan(&mut c.then_expr, false, pending)?;
                self.scan(&mut c.else_expr, false, pending)?;
                1
            }
            Expr::New(ne) => {
                for arg in &mut ne.arguments {
                    self.scan(arg, false, pending)?;
                }
                if let Some(body) = &mut ne.anonymous_body {
                    self.process_class(body)?;
                }
                1
            }
            Expr::Lambda(lambda) => {
                match &mut lambda.body {
                    // Block bodies carry their own insertion anchors.
                    LambdaBody::Block(block) => self.process_block(block)?,
                    // Expression bodies have no statement to anchor a
                    // temporary on; hoisting past the lambda would change
                    // when the expression runs, so they are left intact.
                    LambdaBody::Expression(_) => {}
                }
                1
            }
            Expr::Parenthesized(p) => {
                self.scan(&mut p.expr, false, pending)?;
                1
            }
            Expr::Literal(_)
            | Expr::Identifier(_)
            | Expr::This(_)
            | Expr::MethodRef(_) => 1,
        };

        let trackable = matches!(
            expr,
            Expr::MethodCall(_) | Expr::SuperMethodCall(_) | Expr::FunctionCall(_) | Expr::Binary(_)
        );
        if trackable && depth + 1 >= self.max_depth && !at_stmt {
            self.hoist(expr, pending)?;
            return Ok(1);
        }
        Ok(depth)
    }

    fn hoist(&mut self, expr: &mut Expr, pending: &mut Vec<Stmt>) -> Result<()> {
        let context = self.current_method.clone().ok_or_else(|| {
            Error::internal("complex expression extraction outside of a method context")
        })?;
        let var_type = self
            .env
            .expression_type(expr)
            .unwrap_or_else(|| "id".to_string());
        let name = format!("complex${}", self.count);
        self.count += 1;

        let initializer = std::mem::replace(expr, Expr::ident(name.clone(), Span::synthetic()));
        pending.push(rewrite::temp_declaration(
            type_ref_for(&var_type),
            &name,
            initializer,
        ));
        self.generated.push(VariableBinding {
            name,
            var_type,
            declaring_context: context,
            is_parameter: false,
            is_final: true,
        });
        self.stats.hoisted_temporaries += 1;
        Ok(())
    }
}

/// Parse a `T[]...` type name into a reference with array dimensions.
fn type_ref_for(name: &str) -> TypeRef {
    let mut base = name;
    let mut dims = 0;
    while let Some(stripped) = base.strip_suffix("[]") {
        base = stripped;
        dims += 1;
    }
    TypeRef::array(base, dims)
}
