//! Shared tree-building helpers for the integration tests.

#![allow(dead_code)]

use arclower::ast::*;
use arclower::sem::TypeEnvironment;
use arclower::{CodeReferenceMap, DiagnosticSink, Options, TranslationPipeline};

pub fn unit(types: Vec<TypeDecl>) -> CompilationUnit {
    CompilationUnit { package: Some("demo".to_string()), types, span: Span::synthetic() }
}

pub fn class(name: &str, body: Vec<ClassMember>) -> TypeDecl {
    class_extending(name, None, &[], body)
}

pub fn class_extending(
    name: &str,
    extends: Option<&str>,
    implements: &[&str],
    body: Vec<ClassMember>,
) -> TypeDecl {
    TypeDecl::Class(ClassDecl {
        modifiers: vec![Modifier::Public],
        annotations: Vec::new(),
        name: name.to_string(),
        extends: extends.map(TypeRef::named),
        implements: implements.iter().map(|n| TypeRef::named(*n)).collect(),
        body,
        span: Span::synthetic(),
    })
}

pub fn field(name: &str, type_name: &str) -> ClassMember {
    ClassMember::Field(FieldDecl {
        modifiers: Vec::new(),
        annotations: Vec::new(),
        type_ref: TypeRef::named(type_name),
        name: name.to_string(),
        initializer: None,
        span: Span::synthetic(),
    })
}

pub fn void_method(name: &str, statements: Vec<Stmt>) -> ClassMember {
    ClassMember::Method(MethodDecl {
        modifiers: vec![Modifier::Public],
        annotations: Vec::new(),
        return_type: Some(TypeRef::named("void")),
        name: name.to_string(),
        parameters: Vec::new(),
        body: Some(Block::new(statements)),
        span: Span::synthetic(),
    })
}

pub fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::Expression(ExprStmt { expr, span: Span::synthetic() })
}

pub fn call(name: &str, arguments: Vec<Expr>) -> Expr {
    Expr::MethodCall(MethodCallExpr {
        receiver: None,
        name: name.to_string(),
        arguments,
        binding: None,
        span: Span::synthetic(),
    })
}

pub fn and(left: Expr, right: Expr) -> Expr {
    binary(left, BinaryOp::CondAnd, right)
}

pub fn or(left: Expr, right: Expr) -> Expr {
    binary(left, BinaryOp::CondOr, right)
}

pub fn binary(left: Expr, operator: BinaryOp, right: Expr) -> Expr {
    Expr::Binary(BinaryExpr {
        left: Box::new(left),
        operator,
        right: Box::new(right),
        span: Span::synthetic(),
    })
}

pub fn if_stmt(condition: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Stmt {
    Stmt::If(IfStmt {
        condition,
        then_branch: Box::new(then_branch),
        else_branch: else_branch.map(Box::new),
        span: Span::synthetic(),
    })
}

pub fn run_pipeline(
    unit: &mut CompilationUnit,
    env: &TypeEnvironment,
    options: &Options,
) -> (CodeReferenceMap, DiagnosticSink) {
    let mut sink = DiagnosticSink::new();
    let map = TranslationPipeline::new(env, options)
        .run(unit, &mut sink)
        .expect("pipeline run");
    (map, sink)
}

pub fn first_class(unit: &CompilationUnit) -> &ClassDecl {
    match &unit.types[0] {
        TypeDecl::Class(class) => class,
        other => panic!("expected a class, got {other}"),
    }
}

pub fn methods_named<'a>(class: &'a ClassDecl, name: &str) -> Vec<&'a MethodDecl> {
    class
        .body
        .iter()
        .filter_map(|m| match m {
            ClassMember::Method(method) if method.name == name => Some(method),
            _ => None,
        })
        .collect()
}
