//! Metadata stripping and reference accumulation
//!
//! When stripped binaries are requested, serialization support members are
//! removed outright and reflective call sites are flagged, since both depend
//! on metadata the emitter will not write. Independently of stripping, the
//! reference mapper records every declared and referenced program element so
//! a later dead-code pass can work from one table.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::ast::{
    walk_class_decl, walk_enum_decl, walk_expr, walk_field_decl, walk_interface_decl,
    walk_method_decl, ClassDecl, ClassMember, CompilationUnit, EnumDecl, Expr, FieldDecl,
    InterfaceDecl, MethodDecl, MutVisitor, TypeDecl, TypeRef,
};
use crate::diagnostics::DiagnosticSink;
use crate::error::Result;
use crate::sem::TypeEnvironment;

const SERIALIZABLE: &str = "Serializable";
const SERIALIZABLE_QUALIFIED: &str = "java.io.Serializable";
const SERIAL_VERSION_FIELD: &str = "serialVersionUID";

static SERIALIZATION_METHODS: &[&str] = &[
    "readObject",
    "writeObject",
    "readObjectNoData",
    "readResolve",
    "writeReplace",
];

/// Reflective calls that read metadata a stripped binary no longer carries.
static REFLECTION_METHODS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "forName",
        "getMethod",
        "getDeclaredMethod",
        "getField",
        "getDeclaredField",
        "getConstructor",
        "getDeclaredConstructor",
        "getAnnotation",
        "getAnnotations",
        "newInstance",
    ]
    .into_iter()
    .collect()
});

fn is_serializable_ref(type_ref: &TypeRef) -> bool {
    type_ref.name == SERIALIZABLE || type_ref.name == SERIALIZABLE_QUALIFIED
}

#[derive(Debug, Default)]
pub struct StripStats {
    pub removed_members: usize,
    pub detached_interfaces: usize,
}

/// Removes serialization support from every type that implements
/// `Serializable`: the magic stream methods, the version-stamp field, and
/// the interface reference itself.
pub struct SerializationStripper {
    pub stats: StripStats,
}

impl Default for SerializationStripper {
    fn default() -> Self {
        Self::new()
    }
}

impl SerializationStripper {
    pub fn new() -> Self {
        Self { stats: StripStats::default() }
    }

    pub fn run(&mut self, unit: &mut CompilationUnit) -> Result<()> {
        for type_decl in &mut unit.types {
            self.strip_type(type_decl);
        }
        Ok(())
    }

    fn strip_type(&mut self, type_decl: &mut TypeDecl) {
        let (implements, body) = match type_decl {
            TypeDecl::Class(c) => (&mut c.implements, &mut c.body),
            TypeDecl::Enum(e) => (&mut e.implements, &mut e.body),
            // For interfaces the marker sits in the extends list.
            TypeDecl::Interface(i) => (&mut i.extends, &mut i.body),
        };

        if implements.iter().any(is_serializable_ref) {
            implements.retain(|t| !is_serializable_ref(t));
            self.stats.detached_interfaces += 1;

            let before = body.len();
            body.retain(|member| !Self::is_serialization_member(member));
            self.stats.removed_members += before - body.len();
        }

        for member in body {
            if let ClassMember::Type(nested) = member {
                self.strip_type(nested);
            }
        }
    }

    fn is_serialization_member(member: &ClassMember) -> bool {
        match member {
            ClassMember::Method(method) => {
                SERIALIZATION_METHODS.contains(&method.name.as_str())
            }
            ClassMember::Field(field) => field.name == SERIAL_VERSION_FIELD,
            _ => false,
        }
    }
}

/// Flags calls into the reflection API. Stripped binaries fail these at
/// runtime, so each site gets its own warning and the pass keeps going.
pub struct ReflectionCodeDetector<'a> {
    sink: &'a mut DiagnosticSink,
    pub flagged_calls: usize,
}

impl<'a> ReflectionCodeDetector<'a> {
    pub fn new(sink: &'a mut DiagnosticSink) -> Self {
        Self { sink, flagged_calls: 0 }
    }

    pub fn run(&mut self, unit: &mut CompilationUnit) -> Result<()> {
        self.visit_unit(unit)
    }
}

impl MutVisitor for ReflectionCodeDetector<'_> {
    fn visit_expr(&mut self, expr: &mut Expr) -> Result<()> {
        if let Expr::MethodCall(call) = expr {
            if REFLECTION_METHODS.contains(call.name.as_str()) {
                self.sink.warning(
                    call.span,
                    format!("reflective call to {} requires metadata that will be stripped", call.name),
                );
                self.flagged_calls += 1;
            }
        }
        walk_expr(self, expr)
    }
}

/// Declared and referenced program elements, keyed the way the environment
/// keys bindings: methods by (class, "name(p1,p2)"), fields by (class, name).
#[derive(Debug, Default)]
pub struct CodeReferenceMap {
    classes: HashSet<String>,
    methods: HashSet<(String, String)>,
    fields: HashSet<(String, String)>,
}

impl CodeReferenceMap {
    pub fn builder() -> CodeReferenceMapBuilder {
        CodeReferenceMapBuilder::default()
    }

    pub fn contains_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn contains_method(&self, class: &str, signature: &str) -> bool {
        self.methods
            .contains(&(class.to_string(), signature.to_string()))
    }

    pub fn contains_field(&self, class: &str, field: &str) -> bool {
        self.fields.contains(&(class.to_string(), field.to_string()))
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
}

#[derive(Debug, Default)]
pub struct CodeReferenceMapBuilder {
    map: CodeReferenceMap,
}

impl CodeReferenceMapBuilder {
    pub fn add_class(&mut self, class: impl Into<String>) {
        self.map.classes.insert(class.into());
    }

    pub fn add_method(&mut self, class: impl Into<String>, signature: impl Into<String>) {
        self.map.methods.insert((class.into(), signature.into()));
    }

    pub fn add_field(&mut self, class: impl Into<String>, field: impl Into<String>) {
        self.map.fields.insert((class.into(), field.into()));
    }

    /// Record a method key of the form "Class.name(params)".
    pub fn add_method_key(&mut self, key: &str) {
        if let Some((class, signature)) = key.split_once('.') {
            self.add_method(class, signature);
        }
    }

    pub fn build(self) -> CodeReferenceMap {
        self.map
    }
}

/// Walks a unit and accumulates every element it declares or refers to.
pub struct ElementReferenceMapper<'a> {
    env: &'a TypeEnvironment,
    class_stack: Vec<String>,
    builder: CodeReferenceMapBuilder,
}

impl<'a> ElementReferenceMapper<'a> {
    pub fn new(env: &'a TypeEnvironment) -> Self {
        Self { env, class_stack: Vec::new(), builder: CodeReferenceMap::builder() }
    }

    pub fn run(mut self, unit: &mut CompilationUnit) -> Result<CodeReferenceMap> {
        self.visit_unit(unit)?;
        Ok(self.builder.build())
    }

    fn signature(method: &MethodDecl) -> String {
        let params: Vec<&str> =
            method.parameters.iter().map(|p| p.type_ref.name.as_str()).collect();
        format!("{}({})", method.name, params.join(","))
    }

    fn record_field_access(&mut self, receiver: Option<&Expr>, name: &str) {
        let declaring = match receiver {
            None => self.class_stack.last().cloned(),
            Some(Expr::This(_)) => self.class_stack.last().cloned(),
            Some(Expr::Identifier(q)) if self.env.class(&q.name).is_some() => {
                Some(q.name.clone())
            }
            Some(other) => self.env.expression_type(other),
        };
        if let Some(class) = declaring {
            if let Some(field) = self.env.field(&class, name) {
                self.builder
                    .add_field(field.declaring_class.clone(), field.name.clone());
            }
        }
    }
}

impl MutVisitor for ElementReferenceMapper<'_> {
    fn visit_class_decl(&mut self, class: &mut ClassDecl) -> Result<()> {
        self.builder.add_class(class.name.clone());
        self.class_stack.push(class.name.clone());
        walk_class_decl(self, class)?;
        self.class_stack.pop();
        Ok(())
    }

    fn visit_interface_decl(&mut self, interface: &mut InterfaceDecl) -> Result<()> {
        self.builder.add_class(interface.name.clone());
        self.class_stack.push(interface.name.clone());
        walk_interface_decl(self, interface)?;
        self.class_stack.pop();
        Ok(())
    }

    fn visit_enum_decl(&mut self, enum_decl: &mut EnumDecl) -> Result<()> {
        self.builder.add_class(enum_decl.name.clone());
        self.class_stack.push(enum_decl.name.clone());
        walk_enum_decl(self, enum_decl)?;
        self.class_stack.pop();
        Ok(())
    }

    fn visit_method_decl(&mut self, method: &mut MethodDecl) -> Result<()> {
        if let Some(class) = self.class_stack.last() {
            self.builder.add_method(class.clone(), Self::signature(method));
        }
        walk_method_decl(self, method)
    }

    fn visit_field_decl(&mut self, field: &mut FieldDecl) -> Result<()> {
        if let Some(class) = self.class_stack.last() {
            self.builder.add_field(class.clone(), field.name.clone());
        }
        walk_field_decl(self, field)
    }

    fn visit_expr(&mut self, expr: &mut Expr) -> Result<()> {
        match &*expr {
            Expr::MethodCall(call) => {
                if let Some(key) = &call.binding {
                    self.builder.add_method_key(key);
                }
            }
            Expr::SuperMethodCall(call) => {
                if let Some(key) = &call.binding {
                    self.builder.add_method_key(key);
                }
            }
            Expr::New(new) => {
                self.builder.add_class(new.target_type.name.clone());
                if let Some(key) = &new.binding {
                    self.builder.add_method_key(key);
                }
            }
            Expr::FieldAccess(fa) => {
                self.record_field_access(fa.receiver.as_deref(), &fa.name);
            }
            _ => {}
        }
        walk_expr(self, expr)
    }

    fn visit_type_ref(&mut self, type_ref: &mut TypeRef) -> Result<()> {
        if !type_ref.is_primitive() {
            self.builder.add_class(type_ref.name.clone());
        }
        Ok(())
    }
}
