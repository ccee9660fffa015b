//! Constructor-reference desugaring
//!
//! A constructor reference (`T::new`, `T[]::new`) is rewritten into the
//! equivalent lambda: one synthesized parameter per functional-interface
//! parameter type, and a body that constructs the object (parameters as
//! constructor arguments) or the array (first parameter as the dimension).
//! The synthesized type identity and declaring class assigned by the lambda
//! passes carry over onto the replacement, so this pass must run after them.

use crate::ast::{
    walk_expr, ArrayCreationExpr, CompilationUnit, Expr, LambdaBody, LambdaExpr, MethodRefExpr,
    MethodRefKind, MutVisitor, NewExpr, Parameter, Span, TypeRef,
};
use crate::error::{Error, Result};
use crate::sem::{TypeEnvironment, VariableBinding};

#[derive(Debug, Default)]
pub struct MethodRefStats {
    pub rewritten_references: usize,
}

pub struct MethodReferenceRewriter<'a> {
    env: &'a TypeEnvironment,
    /// Parameter bindings synthesized for the replacement lambdas.
    pub generated: Vec<VariableBinding>,
    pub stats: MethodRefStats,
}

impl<'a> MethodReferenceRewriter<'a> {
    pub fn new(env: &'a TypeEnvironment) -> Self {
        Self { env, generated: Vec::new(), stats: MethodRefStats::default() }
    }

    pub fn run(&mut self, unit: &mut CompilationUnit) -> Result<()> {
        self.visit_unit(unit)
    }

    fn rewrite(&mut self, mr: &MethodRefExpr) -> Result<LambdaExpr> {
        let interface = mr.functional_interface.as_deref().ok_or_else(|| {
            Error::internal(format!(
                "constructor reference {}::new has no target functional interface",
                mr.qualifier
            ))
        })?;
        let sam = self.env.functional_method(interface).ok_or_else(|| {
            Error::internal(format!(
                "no functional method registered for interface {}",
                interface
            ))
        })?;

        let mut parameters = Vec::with_capacity(sam.param_types.len());
        for (i, param_type) in sam.param_types.iter().enumerate() {
            let name = parameter_name(i);
            parameters.push(Parameter::new(TypeRef::named(param_type.clone()), name.clone()));
            self.generated.push(VariableBinding {
                name,
                var_type: param_type.clone(),
                declaring_context: mr
                    .type_name
                    .clone()
                    .unwrap_or_else(|| mr.qualifier.clone()),
                is_parameter: true,
                is_final: false,
            });
        }

        let body = if mr.array_dims > 0 {
            // T[]::new takes the array length as its single argument.
            let dimension = parameters
                .first()
                .map(|p| Expr::ident(p.name.clone(), Span::synthetic()))
                .ok_or_else(|| {
                    Error::internal(format!(
                        "array constructor reference {}[]::new bound to a zero-parameter interface",
                        mr.qualifier
                    ))
                })?;
            Expr::ArrayCreation(ArrayCreationExpr {
                element_type: TypeRef::array(mr.qualifier.clone(), mr.array_dims - 1),
                dimensions: vec![dimension],
                initializer: None,
                span: mr.span,
            })
        } else {
            let arguments = parameters
                .iter()
                .map(|p| Expr::ident(p.name.clone(), Span::synthetic()))
                .collect();
            Expr::New(NewExpr {
                target_type: TypeRef::named(mr.qualifier.clone()),
                arguments,
                anonymous_body: None,
                binding: None,
                span: mr.span,
            })
        };

        self.stats.rewritten_references += 1;
        Ok(LambdaExpr {
            parameters,
            body: LambdaBody::Expression(Box::new(body)),
            type_name: mr.type_name.clone(),
            functional_interface: mr.functional_interface.clone(),
            declaring_class: mr.declaring_class.clone(),
            span: mr.span,
        })
    }
}

impl MutVisitor for MethodReferenceRewriter<'_> {
    fn visit_expr(&mut self, expr: &mut Expr) -> Result<()> {
        walk_expr(self, expr)?;
        if let Expr::MethodRef(mr) = expr {
            if mr.kind == MethodRefKind::Constructor {
                let lambda = self.rewrite(mr)?;
                *expr = Expr::Lambda(lambda);
            }
        }
        Ok(())
    }
}

/// Parameter names follow the base-identifier sequence a, b, ..., z, aa, ab.
fn parameter_name(mut index: usize) -> String {
    let mut name = String::new();
    loop {
        name.insert(0, (b'a' + (index % 26) as u8) as char);
        index /= 26;
        if index == 0 {
            break;
        }
        index -= 1;
    }
    name
}
