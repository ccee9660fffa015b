//! Varargs call-site normalization
//!
//! Every call bound to a variable-arity method leaves this pass with an
//! explicit trailing array argument: the trailing arguments beyond the fixed
//! parameters are collected into one array literal of the erased element
//! type (an empty array when there are none). A call that already passes a
//! compatible array is left untouched, so the pass is idempotent on
//! normalized input. Separately, any array-initializer literal that is not
//! the direct child of an array-creation node is wrapped in one, a
//! structural invariant the emitter depends on.

use crate::ast::{
    walk_expr, ArrayCreationExpr, ArrayInitializerExpr, ClassMember, CompilationUnit,
    ConstructorDecl, EnumDecl, Expr, Literal, MutVisitor, Span, TypeRef,
};
use crate::error::Result;
use crate::sem::{array_element_type, TypeEnvironment};

#[derive(Debug, Default)]
pub struct VarargsStats {
    pub normalized_calls: usize,
    pub wrapped_initializers: usize,
}

pub struct VarargsRewriter<'a> {
    env: &'a TypeEnvironment,
    pub stats: VarargsStats,
}

impl<'a> VarargsRewriter<'a> {
    pub fn new(env: &'a TypeEnvironment) -> Self {
        Self { env, stats: VarargsStats::default() }
    }

    pub fn run(&mut self, unit: &mut CompilationUnit) -> Result<()> {
        self.visit_unit(unit)
    }

    fn rewrite_call(&mut self, binding: Option<&str>, args: &mut Vec<Expr>) {
        let Some(method) = binding.and_then(|key| self.env.method(key)) else {
            return;
        };
        if !method.is_varargs {
            return;
        }
        let param_count = method.param_types.len();
        let Some(array_type) = method.param_types.last() else {
            return;
        };
        let varargs_size = args.len() as i64 - param_count as i64 + 1;

        if varargs_size == 1 {
            if let Some(last) = args.last() {
                if self.is_compatible_array_argument(last, array_type) {
                    return;
                }
            }
        }

        let element_type = array_element_type(array_type).unwrap_or(array_type);
        let trailing = args.split_off(param_count.saturating_sub(1).min(args.len()));
        let span = trailing.first().map(Expr::span).unwrap_or_else(Span::synthetic);
        args.push(Expr::ArrayCreation(ArrayCreationExpr {
            element_type: TypeRef::named(element_type),
            dimensions: vec![],
            initializer: Some(Box::new(Expr::ArrayInitializer(ArrayInitializerExpr {
                elements: trailing,
                span,
            }))),
            span,
        }));
        self.stats.normalized_calls += 1;
    }

    /// A single trailing argument already assignment-compatible with the
    /// array parameter passes through untouched. A zero-argument `clone()`
    /// call is judged by its receiver type instead of its imprecise declared
    /// return type: a compatible array receiver reproduces the right array,
    /// an unresolvable receiver is given the benefit of the doubt, and
    /// anything else gets wrapped like an ordinary argument.
    fn is_compatible_array_argument(&self, arg: &Expr, array_type: &str) -> bool {
        if matches!(arg, Expr::Literal(lit) if lit.value == Literal::Null) {
            return true;
        }
        if let Expr::MethodCall(mc) = arg {
            if mc.name == "clone" && mc.arguments.is_empty() {
                return match mc.receiver.as_deref().and_then(|r| self.env.expression_type(r)) {
                    Some(receiver_type) => {
                        array_element_type(&receiver_type).is_some()
                            && self.env.is_subtype(&receiver_type, array_type)
                    }
                    None => true,
                };
            }
        }
        match self.env.expression_type(arg) {
            Some(arg_type) => {
                array_element_type(&arg_type).is_some() && self.env.is_subtype(&arg_type, array_type)
            }
            None => false,
        }
    }
}

impl MutVisitor for VarargsRewriter<'_> {
    fn visit_expr(&mut self, expr: &mut Expr) -> Result<()> {
        // The initializer slot of an array creation is the one place an
        // array-initializer literal belongs; descend into its elements
        // without re-inspecting the initializer node itself.
        if let Expr::ArrayCreation(ac) = expr {
            for dim in &mut ac.dimensions {
                self.visit_expr(dim)?;
            }
            if let Some(init) = &mut ac.initializer {
                if let Expr::ArrayInitializer(ai) = &mut **init {
                    for element in &mut ai.elements {
                        self.visit_expr(element)?;
                    }
                } else {
                    self.visit_expr(init)?;
                }
            }
            return Ok(());
        }

        walk_expr(self, expr)?;

        match expr {
            Expr::MethodCall(mc) => {
                let binding = mc.binding.clone();
                self.rewrite_call(binding.as_deref(), &mut mc.arguments);
            }
            Expr::SuperMethodCall(sc) => {
                let binding = sc.binding.clone();
                self.rewrite_call(binding.as_deref(), &mut sc.arguments);
            }
            Expr::New(ne) => {
                let binding = ne.binding.clone();
                self.rewrite_call(binding.as_deref(), &mut ne.arguments);
            }
            Expr::ArrayInitializer(_) => {
                // Reached only when the initializer is not directly under an
                // array creation; wrap it in one.
                let Expr::ArrayInitializer(ai) = std::mem::replace(
                    expr,
                    Expr::null(Span::synthetic()),
                ) else {
                    unreachable!()
                };
                let span = ai.span;
                let element_type = ai
                    .elements
                    .first()
                    .and_then(|e| self.env.expression_type(e))
                    .unwrap_or_else(|| "id".to_string());
                *expr = Expr::ArrayCreation(ArrayCreationExpr {
                    element_type: TypeRef::named(element_type),
                    dimensions: vec![],
                    initializer: Some(Box::new(Expr::ArrayInitializer(ai))),
                    span,
                });
                self.stats.wrapped_initializers += 1;
            }
            _ => {}
        }
        Ok(())
    }

    fn visit_constructor_decl(&mut self, ctor: &mut ConstructorDecl) -> Result<()> {
        if let Some(invocation) = &mut ctor.explicit_invocation {
            for arg in &mut invocation.arguments {
                self.visit_expr(arg)?;
            }
            let binding = invocation.binding.clone();
            self.rewrite_call(binding.as_deref(), &mut invocation.arguments);
        }
        self.visit_block(&mut ctor.body)
    }

    fn visit_enum_decl(&mut self, enum_decl: &mut EnumDecl) -> Result<()> {
        for constant in &mut enum_decl.constants {
            for arg in &mut constant.arguments {
                self.visit_expr(arg)?;
            }
            let binding = constant.binding.clone();
            self.rewrite_call(binding.as_deref(), &mut constant.arguments);
        }
        for member in &mut enum_decl.body {
            self.visit_member(member)?;
        }
        Ok(())
    }
}
