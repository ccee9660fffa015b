//! Reference-counted assignment rewriting
//!
//! Under manual retain/release, a plain assignment to a reference field must
//! go through an explicit call so the emitter can insert the ownership
//! bookkeeping. Instance fields become a setter-style function call taking
//! (instance, value); static fields become a call to the global
//! retained-assign helper taking (&storage, placeholder, value). Weak fields
//! and primitive-typed fields keep the direct assignment.

use crate::ast::{
    walk_class_decl, walk_enum_decl, walk_expr, walk_interface_decl, AssignOp, ClassDecl,
    CompilationUnit, EnumDecl, Expr, FunctionCallExpr, InterfaceDecl, MutVisitor, Span, ThisExpr,
    UnaryExpr, UnaryOp,
};
use crate::error::Result;
use crate::sem::{FieldBinding, TypeEnvironment};

/// Global helper invoked for static reference-field stores.
const RETAINED_ASSIGN_FN: &str = "JreOperatorRetainedAssign";

#[derive(Debug, Default)]
pub struct OperatorStats {
    pub instance_setters: usize,
    pub static_assigns: usize,
}

pub struct OperatorRewriter<'a> {
    env: &'a TypeEnvironment,
    class_stack: Vec<String>,
    pub stats: OperatorStats,
}

impl<'a> OperatorRewriter<'a> {
    pub fn new(env: &'a TypeEnvironment) -> Self {
        Self { env, class_stack: Vec::new(), stats: OperatorStats::default() }
    }

    pub fn run(&mut self, unit: &mut CompilationUnit) -> Result<()> {
        self.visit_unit(unit)
    }

    /// Resolve the field a plain assignment writes, if its target is a field
    /// reference. Identifier targets are local variables by front-end
    /// contract; unqualified field writes arrive as receiver-less field
    /// accesses.
    fn target_field(&self, target: &Expr) -> Option<FieldBinding> {
        let Expr::FieldAccess(fa) = target else {
            return None;
        };
        // Only unqualified and `this`-qualified writes need the enclosing
        // type; a class-qualified static store resolves on its own.
        let field = match &fa.receiver {
            None => self.env.field(self.class_stack.last()?, &fa.name),
            Some(receiver) => match &**receiver {
                Expr::This(_) => self.env.field(self.class_stack.last()?, &fa.name),
                // Qualified name: the qualifier is a class for static
                // fields, otherwise an expression whose type declares it.
                Expr::Identifier(q) if self.env.class(&q.name).is_some() => {
                    self.env.field(&q.name, &fa.name)
                }
                other => self
                    .env
                    .expression_type(other)
                    .and_then(|t| self.env.field(&t, &fa.name)),
            },
        };
        field.cloned()
    }

    fn rewrite_assignment(&mut self, expr: &mut Expr) {
        let field = {
            let Expr::Assignment(a) = &*expr else { return };
            if a.operator != AssignOp::Assign {
                return;
            }
            match self.target_field(&a.target) {
                Some(f) if !f.is_primitive() && !f.is_weak => f,
                _ => return,
            }
        };

        let assignment = match std::mem::replace(expr, Expr::null(Span::synthetic())) {
            Expr::Assignment(a) => a,
            other => {
                *expr = other;
                return;
            }
        };
        let span = assignment.span;
        let value = *assignment.value;

        if field.is_static {
            let storage = format!("{}_{}", field.declaring_class, field.name);
            *expr = Expr::FunctionCall(FunctionCallExpr {
                name: RETAINED_ASSIGN_FN.to_string(),
                arguments: vec![
                    Expr::Unary(UnaryExpr {
                        operator: UnaryOp::AddressOf,
                        operand: Box::new(Expr::ident(storage, span)),
                        span,
                    }),
                    Expr::null(span),
                    value,
                ],
                span,
            });
            self.stats.static_assigns += 1;
        } else {
            // Unqualified field writes synthesize the implicit `this`,
            // typed to the field's declaring class.
            let instance = match *assignment.target {
                Expr::FieldAccess(fa) => fa.receiver.map(|r| *r),
                _ => None,
            }
            .unwrap_or_else(|| {
                Expr::This(ThisExpr { qualifier: Some(field.declaring_class.clone()), span })
            });
            *expr = Expr::FunctionCall(FunctionCallExpr {
                name: format!("{}_set_{}", field.declaring_class, field.name),
                arguments: vec![instance, value],
                span,
            });
            self.stats.instance_setters += 1;
        }
    }
}

impl MutVisitor for OperatorRewriter<'_> {
    fn visit_class_decl(&mut self, class: &mut ClassDecl) -> Result<()> {
        self.class_stack.push(class.name.clone());
        walk_class_decl(self, class)?;
        self.class_stack.pop();
        Ok(())
    }

    fn visit_interface_decl(&mut self, interface: &mut InterfaceDecl) -> Result<()> {
        self.class_stack.push(interface.name.clone());
        walk_interface_decl(self, interface)?;
        self.class_stack.pop();
        Ok(())
    }

    fn visit_enum_decl(&mut self, enum_decl: &mut EnumDecl) -> Result<()> {
        self.class_stack.push(enum_decl.name.clone());
        walk_enum_decl(self, enum_decl)?;
        self.class_stack.pop();
        Ok(())
    }

    fn visit_expr(&mut self, expr: &mut Expr) -> Result<()> {
        walk_expr(self, expr)?;
        self.rewrite_assignment(expr);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;

    fn env_with_fields() -> TypeEnvironment {
        let mut env = TypeEnvironment::new();
        env.add_class(crate::sem::TypeBinding::class("C", Some("Object")));
        for (name, field_type, is_static, is_weak) in [
            ("name", "String", false, false),
            ("parent", "C", false, true),
            ("shared", "Object", true, false),
            ("count", "int", false, false),
        ] {
            env.add_field(FieldBinding {
                name: name.to_string(),
                declaring_class: "C".to_string(),
                field_type: field_type.to_string(),
                is_static,
                is_weak,
            });
        }
        env
    }

    fn assign_field(receiver: Option<Expr>, field: &str, value: Expr) -> Expr {
        Expr::Assignment(AssignmentExpr {
            target: Box::new(Expr::FieldAccess(FieldAccessExpr {
                receiver: receiver.map(Box::new),
                name: field.to_string(),
                span: Span::synthetic(),
            })),
            operator: AssignOp::Assign,
            value: Box::new(value),
            span: Span::synthetic(),
        })
    }

    fn rewrite_in_class(env: &TypeEnvironment, mut expr: Expr) -> Expr {
        let mut rewriter = OperatorRewriter::new(env);
        rewriter.class_stack.push("C".to_string());
        rewriter.visit_expr(&mut expr).expect("rewrite");
        expr
    }

    #[test]
    fn unqualified_instance_field_becomes_setter_with_implicit_this() {
        let env = env_with_fields();
        let out = rewrite_in_class(
            &env,
            assign_field(None, "name", Expr::ident("value", Span::synthetic())),
        );
        let Expr::FunctionCall(fc) = &out else { panic!("expected call, got {:?}", out) };
        assert_eq!(fc.name, "C_set_name");
        assert_eq!(fc.arguments.len(), 2);
        let Expr::This(this) = &fc.arguments[0] else { panic!("implicit this") };
        assert_eq!(this.qualifier.as_deref(), Some("C"));
    }

    #[test]
    fn receiver_expression_becomes_setter_instance() {
        let env = env_with_fields();
        let receiver = Expr::ident("other", Span::synthetic());
        // `other` has no resolvable type here, so resolution falls back to
        // the qualified-name rule only for class names; use `this` instead.
        let out = rewrite_in_class(
            &env,
            assign_field(
                Some(Expr::This(ThisExpr { qualifier: None, span: Span::synthetic() })),
                "name",
                receiver,
            ),
        );
        let Expr::FunctionCall(fc) = &out else { panic!("expected call") };
        assert_eq!(fc.name, "C_set_name");
        assert!(matches!(&fc.arguments[0], Expr::This(_)));
    }

    #[test]
    fn static_field_uses_retained_assign_helper() {
        let env = env_with_fields();
        let out = rewrite_in_class(
            &env,
            assign_field(
                Some(Expr::ident("C", Span::synthetic())),
                "shared",
                Expr::ident("value", Span::synthetic()),
            ),
        );
        let Expr::FunctionCall(fc) = &out else { panic!("expected call") };
        assert_eq!(fc.name, RETAINED_ASSIGN_FN);
        assert_eq!(fc.arguments.len(), 3);
        let Expr::Unary(u) = &fc.arguments[0] else { panic!("address-of") };
        assert_eq!(u.operator, UnaryOp::AddressOf);
        assert!(matches!(&*u.operand, Expr::Identifier(i) if i.name == "C_shared"));
    }

    #[test]
    fn qualified_static_store_resolves_without_enclosing_class() {
        let env = env_with_fields();
        let mut expr = assign_field(
            Some(Expr::ident("C", Span::synthetic())),
            "shared",
            Expr::ident("value", Span::synthetic()),
        );
        let mut rewriter = OperatorRewriter::new(&env);
        rewriter.visit_expr(&mut expr).expect("rewrite");
        let Expr::FunctionCall(fc) = &expr else { panic!("expected call") };
        assert_eq!(fc.name, RETAINED_ASSIGN_FN);
    }

    #[test]
    fn static_store_inside_interface_method_is_rewritten() {
        let env = env_with_fields();
        let store = Stmt::Expression(ExprStmt {
            expr: assign_field(
                Some(Expr::ident("C", Span::synthetic())),
                "shared",
                Expr::null(Span::synthetic()),
            ),
            span: Span::synthetic(),
        });
        let mut unit = CompilationUnit::new(
            None,
            vec![TypeDecl::Interface(InterfaceDecl {
                modifiers: vec![Modifier::Public],
                annotations: Vec::new(),
                name: "Registry".to_string(),
                extends: Vec::new(),
                body: vec![ClassMember::Method(MethodDecl {
                    modifiers: vec![Modifier::Static],
                    annotations: Vec::new(),
                    return_type: Some(TypeRef::named("void")),
                    name: "install".to_string(),
                    parameters: Vec::new(),
                    body: Some(Block::new(vec![store])),
                    span: Span::synthetic(),
                })],
                span: Span::synthetic(),
            })],
        );
        let mut rewriter = OperatorRewriter::new(&env);
        rewriter.run(&mut unit).expect("run");
        assert_eq!(rewriter.stats.static_assigns, 1);
    }

    #[test]
    fn weak_and_primitive_fields_keep_direct_assignment() {
        let env = env_with_fields();
        let weak = rewrite_in_class(
            &env,
            assign_field(None, "parent", Expr::null(Span::synthetic())),
        );
        assert!(matches!(weak, Expr::Assignment(_)));

        let primitive = rewrite_in_class(
            &env,
            assign_field(
                None,
                "count",
                Expr::Literal(LiteralExpr {
                    value: Literal::Integer(1),
                    span: Span::synthetic(),
                }),
            ),
        );
        assert!(matches!(primitive, Expr::Assignment(_)));
    }

    #[test]
    fn local_variable_assignment_is_untouched() {
        let env = env_with_fields();
        let out = rewrite_in_class(
            &env,
            Expr::Assignment(AssignmentExpr {
                target: Box::new(Expr::ident("local", Span::synthetic())),
                operator: AssignOp::Assign,
                value: Box::new(Expr::null(Span::synthetic())),
                span: Span::synthetic(),
            }),
        );
        assert!(matches!(out, Expr::Assignment(_)));
    }
}
