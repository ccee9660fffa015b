//! Core-library type conversion
//!
//! Rewrites every type reference naming a mapped core-library type to its
//! target runtime counterpart, using the shared mapping table. Also validates
//! native-protocol annotations while it has the declarations in hand: the
//! annotation requires a protocol name, and a missing one is reported as a
//! diagnostic without stopping the pass.

use crate::ast::{
    walk_class_decl, walk_enum_decl, walk_field_decl, walk_interface_decl, walk_method_decl,
    Annotation, AnnotationArg, ClassDecl, CompilationUnit, EnumDecl, FieldDecl, InterfaceDecl,
    MethodDecl, MutVisitor, TypeRef,
};
use crate::diagnostics::DiagnosticSink;
use crate::error::Result;
use crate::sem::mappings::target_type;

const NATIVE_PROTOCOL: &str = "NativeProtocol";

#[derive(Debug, Default)]
pub struct ConvertStats {
    pub renamed_refs: usize,
}

pub struct TargetTypeConverter<'a> {
    sink: &'a mut DiagnosticSink,
    pub stats: ConvertStats,
}

impl<'a> TargetTypeConverter<'a> {
    pub fn new(sink: &'a mut DiagnosticSink) -> Self {
        Self { sink, stats: ConvertStats::default() }
    }

    pub fn run(&mut self, unit: &mut CompilationUnit) -> Result<()> {
        self.visit_unit(unit)
    }

    /// Annotations sit outside the visitor's walk, so their names and
    /// argument expressions are converted here.
    fn convert_annotations(&mut self, annotations: &mut [Annotation]) -> Result<()> {
        for annotation in annotations {
            if let Some(mapped) = target_type(&annotation.name) {
                annotation.name = mapped.to_string();
                self.stats.renamed_refs += 1;
            }
            for arg in &mut annotation.arguments {
                match arg {
                    AnnotationArg::Value(expr) | AnnotationArg::Named(_, expr) => {
                        self.visit_expr(expr)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn check_native_protocol(&mut self, type_name: &str, annotations: &[Annotation]) {
        for annotation in annotations {
            if annotation.name != NATIVE_PROTOCOL {
                continue;
            }
            let has_name =
                annotation.value_arg().is_some() || annotation.named_arg("name").is_some();
            if !has_name {
                self.sink.error(
                    annotation.span,
                    format!("{NATIVE_PROTOCOL} on {type_name} is missing a protocol name"),
                );
            }
        }
    }
}

impl MutVisitor for TargetTypeConverter<'_> {
    fn visit_class_decl(&mut self, class: &mut ClassDecl) -> Result<()> {
        self.check_native_protocol(&class.name, &class.annotations);
        self.convert_annotations(&mut class.annotations)?;
        walk_class_decl(self, class)
    }

    fn visit_interface_decl(&mut self, interface: &mut InterfaceDecl) -> Result<()> {
        self.check_native_protocol(&interface.name, &interface.annotations);
        self.convert_annotations(&mut interface.annotations)?;
        walk_interface_decl(self, interface)
    }

    fn visit_enum_decl(&mut self, enum_decl: &mut EnumDecl) -> Result<()> {
        self.check_native_protocol(&enum_decl.name, &enum_decl.annotations);
        self.convert_annotations(&mut enum_decl.annotations)?;
        walk_enum_decl(self, enum_decl)
    }

    fn visit_method_decl(&mut self, method: &mut MethodDecl) -> Result<()> {
        self.convert_annotations(&mut method.annotations)?;
        walk_method_decl(self, method)
    }

    fn visit_field_decl(&mut self, field: &mut FieldDecl) -> Result<()> {
        self.convert_annotations(&mut field.annotations)?;
        walk_field_decl(self, field)
    }

    fn visit_type_ref(&mut self, type_ref: &mut TypeRef) -> Result<()> {
        if let Some(mapped) = target_type(&type_ref.name) {
            type_ref.name = mapped.to_string();
            self.stats.renamed_refs += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;

    fn class_with(
        annotations: Vec<Annotation>,
        extends: Option<&str>,
        implements: &[&str],
    ) -> CompilationUnit {
        CompilationUnit {
            package: None,
            types: vec![TypeDecl::Class(ClassDecl {
                modifiers: Vec::new(),
                annotations,
                name: "C".to_string(),
                extends: extends.map(TypeRef::named),
                implements: implements.iter().map(|n| TypeRef::named(*n)).collect(),
                body: Vec::new(),
                span: Span::synthetic(),
            })],
            span: Span::synthetic(),
        }
    }

    #[test]
    fn mapped_supertypes_are_renamed() {
        let mut unit = class_with(Vec::new(), Some("Object"), &["Cloneable", "Runnable"]);
        let mut sink = DiagnosticSink::new();
        let mut converter = TargetTypeConverter::new(&mut sink);
        converter.run(&mut unit).expect("convert");

        let TypeDecl::Class(class) = &unit.types[0] else { panic!("class") };
        assert_eq!(class.extends.as_ref().map(|t| t.name.as_str()), Some("NSObject"));
        assert_eq!(class.implements[0].name, "NSCopying");
        assert_eq!(class.implements[1].name, "Runnable");
        assert_eq!(converter.stats.renamed_refs, 2);
    }

    #[test]
    fn qualified_names_map_like_simple_names() {
        let mut unit = class_with(Vec::new(), Some("java.lang.String"), &[]);
        let mut sink = DiagnosticSink::new();
        TargetTypeConverter::new(&mut sink).run(&mut unit).expect("convert");
        let TypeDecl::Class(class) = &unit.types[0] else { panic!("class") };
        assert_eq!(class.extends.as_ref().map(|t| t.name.as_str()), Some("NSString"));
    }

    #[test]
    fn nameless_native_protocol_annotation_is_reported() {
        let annotation = Annotation {
            name: NATIVE_PROTOCOL.to_string(),
            arguments: Vec::new(),
            span: Span::synthetic(),
        };
        let mut unit = class_with(vec![annotation], None, &[]);
        let mut sink = DiagnosticSink::new();
        TargetTypeConverter::new(&mut sink).run(&mut unit).expect("convert");
        assert_eq!(sink.error_count(), 1);
        assert!(sink.diagnostics()[0].message.contains("protocol name"));
    }

    #[test]
    fn annotation_arguments_are_converted_like_other_references() {
        let annotation = Annotation {
            name: "Adapter".to_string(),
            arguments: vec![AnnotationArg::Named(
                "prototype".to_string(),
                Expr::Cast(CastExpr {
                    target_type: TypeRef::named("String"),
                    expr: Box::new(Expr::null(Span::synthetic())),
                    span: Span::synthetic(),
                }),
            )],
            span: Span::synthetic(),
        };
        let mut unit = class_with(vec![annotation], None, &[]);
        let mut sink = DiagnosticSink::new();
        let mut converter = TargetTypeConverter::new(&mut sink);
        converter.run(&mut unit).expect("convert");

        let TypeDecl::Class(class) = &unit.types[0] else { panic!("class") };
        assert_eq!(class.annotations[0].name, "Adapter");
        let AnnotationArg::Named(_, Expr::Cast(cast)) = &class.annotations[0].arguments[0] else {
            panic!("cast argument")
        };
        assert_eq!(cast.target_type.name, "NSString");
        assert_eq!(converter.stats.renamed_refs, 1);
    }

    #[test]
    fn named_native_protocol_annotation_is_accepted() {
        let annotation = Annotation {
            name: NATIVE_PROTOCOL.to_string(),
            arguments: vec![AnnotationArg::Value(Expr::Literal(LiteralExpr {
                value: Literal::String("NSFastEnumeration".to_string()),
                span: Span::synthetic(),
            }))],
            span: Span::synthetic(),
        };
        let mut unit = class_with(vec![annotation], None, &[]);
        let mut sink = DiagnosticSink::new();
        TargetTypeConverter::new(&mut sink).run(&mut unit).expect("convert");
        assert!(sink.is_empty());
    }
}
