//! Synthesized members
//!
//! Three declaration-level passes that add members the emitter relies on:
//! a default constructor for classes that declare none, the field-copy
//! method backing `clone()` under manual reference counting, and identity
//! `equals`/`hashCode` overrides for numeric wrapper subclasses.

use crate::ast::{
    Block, ClassDecl, ClassMember, CompilationUnit, ConstructorDecl, Expr, ExprStmt, MethodCallExpr,
    MethodDecl, Modifier, Parameter, ReturnStmt, Stmt, SuperMethodCallExpr, ThisExpr, TypeDecl,
    TypeRef,
};
use crate::ast::{AssignOp, AssignmentExpr, BinaryExpr, BinaryOp, FieldAccessExpr};
use crate::error::Result;
use crate::sem::TypeEnvironment;

const COPY_FIELDS_METHOD: &str = "copyAllFieldsTo";

fn for_each_class(
    types: &mut [TypeDecl],
    f: &mut impl FnMut(&mut ClassDecl) -> Result<()>,
) -> Result<()> {
    for type_decl in types {
        if let TypeDecl::Class(class) = type_decl {
            f(class)?;
        }
        let body = match type_decl {
            TypeDecl::Class(c) => &mut c.body,
            TypeDecl::Interface(i) => &mut i.body,
            TypeDecl::Enum(e) => &mut e.body,
        };
        for member in body {
            if let ClassMember::Type(nested) = member {
                for_each_class(std::slice::from_mut(nested), f)?;
            }
        }
    }
    Ok(())
}

fn declares_method(class: &ClassDecl, name: &str, param_count: usize) -> bool {
    class.body.iter().any(|m| {
        matches!(m, ClassMember::Method(method)
            if method.name == name && method.parameters.len() == param_count)
    })
}

/// Materializes the implicit default constructor as a tree declaration.
///
/// The front end records implicit default constructors as bindings only, so
/// a zero-parameter constructor binding with no matching declaration gets an
/// empty public body here. A class the environment has never seen is given
/// the same treatment when its tree declares no constructor either.
pub struct DefaultConstructorAdder<'a> {
    env: &'a TypeEnvironment,
    pub added_constructors: usize,
}

impl<'a> DefaultConstructorAdder<'a> {
    pub fn new(env: &'a TypeEnvironment) -> Self {
        Self { env, added_constructors: 0 }
    }

    pub fn run(&mut self, unit: &mut CompilationUnit) -> Result<()> {
        let env = self.env;
        let mut added = 0usize;
        for_each_class(&mut unit.types, &mut |class| {
            let declares_default = class
                .body
                .iter()
                .any(|m| matches!(m, ClassMember::Constructor(c) if c.parameters.is_empty()));
            if declares_default {
                return Ok(());
            }
            let mut bindings = env.constructors_of(&class.name).peekable();
            let class_is_known = bindings.peek().is_some();
            let has_default_binding = bindings.any(|b| b.param_types.is_empty());
            let has_tree_ctor = class
                .body
                .iter()
                .any(|m| matches!(m, ClassMember::Constructor(_)));
            if has_default_binding || (!class_is_known && !has_tree_ctor) {
                class.body.push(ClassMember::Constructor(ConstructorDecl {
                    modifiers: vec![Modifier::Public],
                    name: class.name.clone(),
                    parameters: Vec::new(),
                    explicit_invocation: None,
                    body: Block::empty(),
                    span: class.span,
                }));
                added += 1;
            }
            Ok(())
        })?;
        self.added_constructors = added;
        Ok(())
    }
}

/// Writes the `copyAllFieldsTo` method used by the reference-counted
/// rendition of `clone()`: delegate to the superclass, then assign each of
/// this class's instance fields onto the target object.
pub struct CopyAllFieldsWriter {
    pub written_methods: usize,
}

impl Default for CopyAllFieldsWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CopyAllFieldsWriter {
    pub fn new() -> Self {
        Self { written_methods: 0 }
    }

    pub fn run(&mut self, unit: &mut CompilationUnit) -> Result<()> {
        let mut written = 0usize;
        for_each_class(&mut unit.types, &mut |class| {
            if declares_method(class, COPY_FIELDS_METHOD, 1) {
                return Ok(());
            }
            let instance_fields: Vec<String> = class
                .body
                .iter()
                .filter_map(|m| match m {
                    ClassMember::Field(f) if !f.is_static() => Some(f.name.clone()),
                    _ => None,
                })
                .collect();
            if instance_fields.is_empty() {
                return Ok(());
            }

            let span = class.span;
            let mut statements = vec![Stmt::Expression(ExprStmt {
                expr: Expr::SuperMethodCall(SuperMethodCallExpr {
                    name: COPY_FIELDS_METHOD.to_string(),
                    arguments: vec![Expr::ident("other", span)],
                    binding: None,
                    span,
                }),
                span,
            })];
            for field in instance_fields {
                statements.push(Stmt::Expression(ExprStmt {
                    expr: Expr::Assignment(AssignmentExpr {
                        target: Box::new(Expr::FieldAccess(FieldAccessExpr {
                            receiver: Some(Box::new(Expr::ident("other", span))),
                            name: field.clone(),
                            span,
                        })),
                        operator: AssignOp::Assign,
                        value: Box::new(Expr::ident(field, span)),
                        span,
                    }),
                    span,
                }));
            }

            class.body.push(ClassMember::Method(MethodDecl {
                modifiers: vec![Modifier::Public],
                annotations: Vec::new(),
                return_type: Some(TypeRef::named("void")),
                name: COPY_FIELDS_METHOD.to_string(),
                parameters: vec![Parameter::new(TypeRef::named(class.name.clone()), "other")],
                body: Some(Block::new(statements)),
                span,
            }));
            written += 1;
            Ok(())
        })?;
        self.written_methods = written;
        Ok(())
    }
}

/// Gives numeric wrapper subclasses identity-based `equals` and `hashCode`
/// when the class does not override them itself. The emitter cannot fall
/// back to the source-language defaults, so the overrides are spelled out.
pub struct NumberMethodRewriter<'a> {
    env: &'a TypeEnvironment,
    pub added_methods: usize,
}

impl<'a> NumberMethodRewriter<'a> {
    pub fn new(env: &'a TypeEnvironment) -> Self {
        Self { env, added_methods: 0 }
    }

    pub fn run(&mut self, unit: &mut CompilationUnit) -> Result<()> {
        let env = self.env;
        let mut added = 0usize;
        for_each_class(&mut unit.types, &mut |class| {
            if !env.is_subtype(&class.name, "Number") || class.name == "Number" {
                return Ok(());
            }
            let span = class.span;
            if !declares_method(class, "equals", 1) {
                class.body.push(ClassMember::Method(identity_equals(span)));
                added += 1;
            }
            if !declares_method(class, "hashCode", 0) {
                class.body.push(ClassMember::Method(identity_hash_code(span)));
                added += 1;
            }
            Ok(())
        })?;
        self.added_methods = added;
        Ok(())
    }
}

fn identity_equals(span: crate::ast::Span) -> MethodDecl {
    MethodDecl {
        modifiers: vec![Modifier::Public],
        annotations: Vec::new(),
        return_type: Some(TypeRef::named("boolean")),
        name: "equals".to_string(),
        parameters: vec![Parameter::new(TypeRef::named("Object"), "other")],
        body: Some(Block::new(vec![Stmt::Return(ReturnStmt {
            value: Some(Expr::Binary(BinaryExpr {
                left: Box::new(Expr::This(ThisExpr { qualifier: None, span })),
                operator: BinaryOp::Eq,
                right: Box::new(Expr::ident("other", span)),
                span,
            })),
            span,
        })])),
        span,
    }
}

fn identity_hash_code(span: crate::ast::Span) -> MethodDecl {
    MethodDecl {
        modifiers: vec![Modifier::Public],
        annotations: Vec::new(),
        return_type: Some(TypeRef::named("int")),
        name: "hashCode".to_string(),
        parameters: Vec::new(),
        body: Some(Block::new(vec![Stmt::Return(ReturnStmt {
            value: Some(Expr::MethodCall(MethodCallExpr {
                receiver: Some(Box::new(Expr::ident("System", span))),
                name: "identityHashCode".to_string(),
                arguments: vec![Expr::This(ThisExpr { qualifier: None, span })],
                binding: None,
                span,
            })),
            span,
        })])),
        span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Span;
    use crate::sem::{MethodBinding, TypeBinding};

    fn class_named(name: &str, extends: Option<&str>, body: Vec<ClassMember>) -> TypeDecl {
        TypeDecl::Class(ClassDecl {
            modifiers: Vec::new(),
            annotations: Vec::new(),
            name: name.to_string(),
            extends: extends.map(TypeRef::named),
            implements: Vec::new(),
            body,
            span: Span::synthetic(),
        })
    }

    fn field_named(name: &str, type_name: &str, is_static: bool) -> ClassMember {
        ClassMember::Field(crate::ast::FieldDecl {
            modifiers: if is_static { vec![Modifier::Static] } else { Vec::new() },
            annotations: Vec::new(),
            type_ref: TypeRef::named(type_name),
            name: name.to_string(),
            initializer: None,
            span: Span::synthetic(),
        })
    }

    fn unit(types: Vec<TypeDecl>) -> CompilationUnit {
        CompilationUnit { package: None, types, span: Span::synthetic() }
    }

    #[test]
    fn ctor_added_only_when_class_declares_none() {
        let explicit = ClassMember::Constructor(ConstructorDecl {
            modifiers: vec![Modifier::Public],
            name: "B".to_string(),
            parameters: vec![Parameter::new(TypeRef::named("int"), "x")],
            explicit_invocation: None,
            body: Block::empty(),
            span: Span::synthetic(),
        });
        let mut unit = unit(vec![
            class_named("A", None, Vec::new()),
            class_named("B", None, vec![explicit]),
        ]);
        let env = TypeEnvironment::new();
        let mut adder = DefaultConstructorAdder::new(&env);
        adder.run(&mut unit).expect("run");
        assert_eq!(adder.added_constructors, 1);

        let TypeDecl::Class(a) = &unit.types[0] else { panic!("class") };
        let ctors: Vec<_> = a
            .body
            .iter()
            .filter_map(|m| match m {
                ClassMember::Constructor(c) => Some(c),
                _ => None,
            })
            .collect();
        assert_eq!(ctors.len(), 1);
        assert!(ctors[0].parameters.is_empty());
        assert!(ctors[0].modifiers.contains(&Modifier::Public));

        let TypeDecl::Class(b) = &unit.types[1] else { panic!("class") };
        let b_ctors = b
            .body
            .iter()
            .filter(|m| matches!(m, ClassMember::Constructor(_)))
            .count();
        assert_eq!(b_ctors, 1);
    }

    #[test]
    fn bound_but_undeclared_default_ctor_is_materialized() {
        let mut env = TypeEnvironment::new();
        env.add_class(TypeBinding::class("A", Some("Object")));
        env.add_method(MethodBinding {
            name: "A".to_string(),
            declaring_class: "A".to_string(),
            param_types: Vec::new(),
            return_type: "A".to_string(),
            is_varargs: false,
            is_static: false,
            is_constructor: true,
        });
        let mut unit = unit(vec![class_named("A", Some("Object"), Vec::new())]);
        let mut adder = DefaultConstructorAdder::new(&env);
        adder.run(&mut unit).expect("run");
        assert_eq!(adder.added_constructors, 1);

        let TypeDecl::Class(a) = &unit.types[0] else { panic!("class") };
        let ctors: Vec<_> = a
            .body
            .iter()
            .filter_map(|m| match m {
                ClassMember::Constructor(c) => Some(c),
                _ => None,
            })
            .collect();
        assert_eq!(ctors.len(), 1);
        assert!(ctors[0].parameters.is_empty());
    }

    #[test]
    fn parameterized_only_bindings_suppress_the_default_ctor() {
        let mut env = TypeEnvironment::new();
        env.add_class(TypeBinding::class("B", Some("Object")));
        env.add_method(MethodBinding {
            name: "B".to_string(),
            declaring_class: "B".to_string(),
            param_types: vec!["int".to_string()],
            return_type: "B".to_string(),
            is_varargs: false,
            is_static: false,
            is_constructor: true,
        });
        let mut unit = unit(vec![class_named("B", Some("Object"), Vec::new())]);
        let mut adder = DefaultConstructorAdder::new(&env);
        adder.run(&mut unit).expect("run");
        assert_eq!(adder.added_constructors, 0);
    }

    #[test]
    fn copy_fields_delegates_to_super_then_assigns_each_instance_field() {
        let mut unit = unit(vec![class_named(
            "C",
            None,
            vec![
                field_named("x", "int", false),
                field_named("name", "String", false),
                field_named("SHARED", "int", true),
            ],
        )]);
        let mut writer = CopyAllFieldsWriter::new();
        writer.run(&mut unit).expect("run");
        assert_eq!(writer.written_methods, 1);

        let TypeDecl::Class(class) = &unit.types[0] else { panic!("class") };
        let method = class
            .body
            .iter()
            .find_map(|m| match m {
                ClassMember::Method(method) if method.name == COPY_FIELDS_METHOD => Some(method),
                _ => None,
            })
            .expect("copy method");
        assert_eq!(method.parameters[0].type_ref.name, "C");
        let body = method.body.as_ref().expect("body");
        assert_eq!(body.statements.len(), 3);
        let Stmt::Expression(first) = &body.statements[0] else { panic!("super call") };
        assert!(matches!(&first.expr, Expr::SuperMethodCall(sc) if sc.name == COPY_FIELDS_METHOD));
        let Stmt::Expression(second) = &body.statements[1] else { panic!("assignment") };
        let Expr::Assignment(assign) = &second.expr else { panic!("assignment") };
        let Expr::FieldAccess(fa) = &*assign.target else { panic!("field access") };
        assert_eq!(fa.name, "x");
        assert!(matches!(&*assign.value, Expr::Identifier(i) if i.name == "x"));
    }

    #[test]
    fn static_only_class_gets_no_copy_method() {
        let mut unit = unit(vec![class_named("C", None, vec![field_named("S", "int", true)])]);
        let mut writer = CopyAllFieldsWriter::new();
        writer.run(&mut unit).expect("run");
        assert_eq!(writer.written_methods, 0);
    }

    #[test]
    fn number_subclass_gets_identity_equals_and_hash_code() {
        let mut env = TypeEnvironment::new();
        env.add_class(TypeBinding::class("Rational", Some("Number")));
        let mut unit = unit(vec![class_named("Rational", Some("Number"), Vec::new())]);
        let mut rewriter = NumberMethodRewriter::new(&env);
        rewriter.run(&mut unit).expect("run");
        assert_eq!(rewriter.added_methods, 2);

        let TypeDecl::Class(class) = &unit.types[0] else { panic!("class") };
        assert!(declares_method(class, "equals", 1));
        assert!(declares_method(class, "hashCode", 0));
    }

    #[test]
    fn explicit_equals_suppresses_the_synthesized_override() {
        let mut env = TypeEnvironment::new();
        env.add_class(TypeBinding::class("Rational", Some("Number")));
        let explicit = ClassMember::Method(identity_equals(Span::synthetic()));
        let mut unit = unit(vec![class_named("Rational", Some("Number"), vec![explicit])]);
        let mut rewriter = NumberMethodRewriter::new(&env);
        rewriter.run(&mut unit).expect("run");
        assert_eq!(rewriter.added_methods, 1);
    }

    #[test]
    fn unrelated_class_is_untouched_by_number_rewriter() {
        let env = TypeEnvironment::new();
        let mut unit = unit(vec![class_named("Plain", None, Vec::new())]);
        let mut rewriter = NumberMethodRewriter::new(&env);
        rewriter.run(&mut unit).expect("run");
        assert_eq!(rewriter.added_methods, 0);
    }
}
