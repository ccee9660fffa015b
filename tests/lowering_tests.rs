//! End-to-end runs of the lowering pipeline over hand-built trees.

mod common;

use arclower::ast::*;
use arclower::sem::{TypeBinding, TypeEnvironment};
use arclower::{MemoryModel, Options};
use common::*;

#[test]
fn constant_if_keeps_only_the_taken_branch() {
    let taken = expr_stmt(call("taken", Vec::new()));
    let dropped = expr_stmt(call("dropped", Vec::new()));
    let body = vec![if_stmt(
        Expr::boolean(true, Span::synthetic()),
        Stmt::Block(Block::new(vec![taken])),
        Some(Stmt::Block(Block::new(vec![dropped]))),
    )];
    let mut unit = unit(vec![class("C", vec![void_method("m", body)])]);

    let env = TypeEnvironment::new();
    run_pipeline(&mut unit, &env, &Options::new());

    let method = methods_named(first_class(&unit), "m")[0];
    let statements = &method.body.as_ref().expect("body").statements;
    assert_eq!(statements.len(), 1);
    let Stmt::Block(block) = &statements[0] else { panic!("taken branch") };
    let Stmt::Expression(es) = &block.statements[0] else { panic!("call") };
    assert!(matches!(&es.expr, Expr::MethodCall(mc) if mc.name == "taken"));
}

#[test]
fn constant_false_loop_disappears() {
    let body = vec![Stmt::While(WhileStmt {
        condition: Expr::boolean(false, Span::synthetic()),
        body: Box::new(expr_stmt(call("spin", Vec::new()))),
        span: Span::synthetic(),
    })];
    let mut unit = unit(vec![class("C", vec![void_method("m", body)])]);

    let env = TypeEnvironment::new();
    run_pipeline(&mut unit, &env, &Options::new());

    let method = methods_named(first_class(&unit), "m")[0];
    assert!(method.body.as_ref().expect("body").statements.is_empty());
}

#[test]
fn short_circuit_folding_respects_side_effects() {
    // true && f() reduces to f(); f() && true reduces to f();
    // false || f() reduces to f(); f() is never dropped.
    let cases = vec![
        and(Expr::boolean(true, Span::synthetic()), call("f", Vec::new())),
        and(call("f", Vec::new()), Expr::boolean(true, Span::synthetic())),
        or(Expr::boolean(false, Span::synthetic()), call("f", Vec::new())),
    ];
    let body = cases.into_iter().map(expr_stmt).collect();
    let mut unit = unit(vec![class("C", vec![void_method("m", body)])]);

    let env = TypeEnvironment::new();
    run_pipeline(&mut unit, &env, &Options::new());

    let method = methods_named(first_class(&unit), "m")[0];
    for stmt in &method.body.as_ref().expect("body").statements {
        let Stmt::Expression(es) = stmt else { panic!("expression") };
        assert!(matches!(&es.expr, Expr::MethodCall(mc) if mc.name == "f"), "{:?}", es.expr);
    }
}

#[test]
fn cloneable_class_gains_ctor_and_field_copy_under_reference_counting() {
    let mut unit = unit(vec![class_extending(
        "C",
        None,
        &["Cloneable"],
        vec![field("x", "int")],
    )]);
    let env = TypeEnvironment::new();
    run_pipeline(&mut unit, &env, &Options::new());

    let class = first_class(&unit);
    assert_eq!(class.implements[0].name, "NSCopying");

    let ctors: Vec<_> = class
        .body
        .iter()
        .filter_map(|m| match m {
            ClassMember::Constructor(c) => Some(c),
            _ => None,
        })
        .collect();
    assert_eq!(ctors.len(), 1);
    assert!(ctors[0].parameters.is_empty());

    let copy = methods_named(class, "copyAllFieldsTo");
    assert_eq!(copy.len(), 1);
    let statements = &copy[0].body.as_ref().expect("body").statements;
    assert_eq!(statements.len(), 2);
    let Stmt::Expression(first) = &statements[0] else { panic!("super call") };
    assert!(matches!(&first.expr, Expr::SuperMethodCall(sc) if sc.name == "copyAllFieldsTo"));
    let Stmt::Expression(second) = &statements[1] else { panic!("assignment") };
    let Expr::Assignment(assign) = &second.expr else { panic!("assignment") };
    assert!(matches!(&*assign.target, Expr::FieldAccess(fa) if fa.name == "x"));
}

#[test]
fn arc_mode_skips_field_copy_but_still_adds_the_constructor() {
    let mut unit = unit(vec![class("C", vec![field("x", "int")])]);
    let env = TypeEnvironment::new();
    let options = Options::new().with_memory_model(MemoryModel::Arc);
    run_pipeline(&mut unit, &env, &options);

    let class = first_class(&unit);
    assert!(methods_named(class, "copyAllFieldsTo").is_empty());
    assert!(class
        .body
        .iter()
        .any(|m| matches!(m, ClassMember::Constructor(c) if c.parameters.is_empty())));
}

#[test]
fn number_subclass_gets_identity_methods_unless_it_declares_them() {
    let mut env = TypeEnvironment::new();
    env.add_class(TypeBinding::class("Rational", Some("Number")));
    env.add_class(TypeBinding::class("Complex", Some("Number")));

    let explicit_equals = ClassMember::Method(MethodDecl {
        modifiers: vec![Modifier::Public],
        annotations: Vec::new(),
        return_type: Some(TypeRef::named("boolean")),
        name: "equals".to_string(),
        parameters: vec![Parameter::new(TypeRef::named("Object"), "o")],
        body: Some(Block::empty()),
        span: Span::synthetic(),
    });

    let mut unit = unit(vec![
        class_extending("Rational", Some("Number"), &[], Vec::new()),
        class_extending("Complex", Some("Number"), &[], vec![explicit_equals]),
    ]);
    run_pipeline(&mut unit, &env, &Options::new());

    let rational = match unit.types.iter().find(|t| t.name() == "Rational") {
        Some(TypeDecl::Class(c)) => c,
        _ => panic!("Rational"),
    };
    assert_eq!(methods_named(rational, "equals").len(), 1);
    assert_eq!(methods_named(rational, "hashCode").len(), 1);

    let complex = match unit.types.iter().find(|t| t.name() == "Complex") {
        Some(TypeDecl::Class(c)) => c,
        _ => panic!("Complex"),
    };
    assert_eq!(methods_named(complex, "equals").len(), 1);
    assert_eq!(methods_named(complex, "hashCode").len(), 1);
}

#[test]
fn subclass_moves_below_its_superclass() {
    let mut unit = unit(vec![
        class_extending("Sub", Some("Super"), &[], Vec::new()),
        class_extending("Super", None, &[], Vec::new()),
        class_extending("Other", None, &[], Vec::new()),
    ]);
    let env = TypeEnvironment::new();
    run_pipeline(&mut unit, &env, &Options::new());

    let order: Vec<&str> = unit.types.iter().map(TypeDecl::name).collect();
    let pos = |n: &str| order.iter().position(|x| *x == n).expect("present");
    assert!(pos("Super") < pos("Sub"));
}

#[test]
fn lambdas_are_numbered_per_type_with_declaring_class() {
    let lambda = || {
        Expr::Lambda(LambdaExpr {
            parameters: Vec::new(),
            body: LambdaBody::Block(Block::empty()),
            type_name: None,
            functional_interface: Some("Runnable".to_string()),
            declaring_class: None,
            span: Span::synthetic(),
        })
    };
    let body = vec![expr_stmt(lambda()), expr_stmt(lambda())];
    let mut unit = unit(vec![class("C", vec![void_method("m", body)])]);
    let env = TypeEnvironment::new();
    run_pipeline(&mut unit, &env, &Options::new());

    let method = methods_named(first_class(&unit), "m")[0];
    let mut names = Vec::new();
    for stmt in &method.body.as_ref().expect("body").statements {
        let Stmt::Expression(es) = stmt else { panic!("expression") };
        let Expr::Lambda(l) = &es.expr else { panic!("lambda, got {:?}", es.expr) };
        names.push(l.type_name.clone().expect("type name"));
        assert_eq!(l.declaring_class.as_deref(), Some("C"));
    }
    assert_eq!(names, vec!["$Lambda$1".to_string(), "$Lambda$2".to_string()]);
}

#[test]
fn pipeline_is_idempotent_on_an_already_lowered_unit() {
    let mut unit = unit(vec![class_extending(
        "C",
        None,
        &["Cloneable"],
        vec![field("x", "int"), void_method("m", Vec::new())],
    )]);
    let env = TypeEnvironment::new();

    run_pipeline(&mut unit, &env, &Options::new());
    let once = format!("{unit:?}");
    run_pipeline(&mut unit, &env, &Options::new());
    let twice = format!("{unit:?}");
    assert_eq!(once, twice);
}
