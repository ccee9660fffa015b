//! Type environment and bindings
//!
//! Bindings are resolved identities for declared entities, produced by the
//! external front end and consumed read-only by every pass. Types, methods
//! and fields are keyed by name strings; method keys carry the erased
//! parameter descriptor so overloads stay distinct.

use crate::ast::{self, Expr, Literal};
use std::collections::HashMap;

use super::mappings;

/// Resolved identity of a declared type.
#[derive(Debug, Clone)]
pub struct TypeBinding {
    pub name: String,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub is_interface: bool,
    /// Method key of the single abstract method, for functional interfaces.
    pub functional_method: Option<String>,
}

impl TypeBinding {
    pub fn class(name: impl Into<String>, superclass: Option<&str>) -> Self {
        Self {
            name: name.into(),
            superclass: superclass.map(str::to_string),
            interfaces: Vec::new(),
            is_interface: false,
            functional_method: None,
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            interfaces: Vec::new(),
            is_interface: true,
            functional_method: None,
        }
    }

    pub fn with_interfaces(mut self, interfaces: &[&str]) -> Self {
        self.interfaces = interfaces.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_functional_method(mut self, key: impl Into<String>) -> Self {
        self.functional_method = Some(key.into());
        self
    }
}

/// Resolved identity of a declared method or constructor.
#[derive(Debug, Clone)]
pub struct MethodBinding {
    pub name: String,
    pub declaring_class: String,
    pub param_types: Vec<String>,
    pub return_type: String,
    pub is_varargs: bool,
    pub is_static: bool,
    pub is_constructor: bool,
}

impl MethodBinding {
    /// Stable lookup key: `Class.name(param,param,...)`.
    pub fn key(&self) -> String {
        format!(
            "{}.{}({})",
            self.declaring_class,
            self.name,
            self.param_types.join(",")
        )
    }

    /// Erased element type of the trailing varargs array parameter.
    pub fn varargs_element_type(&self) -> Option<&str> {
        if !self.is_varargs {
            return None;
        }
        self.param_types.last().and_then(|t| array_element_type(t))
    }
}

/// Resolved identity of a declared field.
#[derive(Debug, Clone)]
pub struct FieldBinding {
    pub name: String,
    pub declaring_class: String,
    pub field_type: String,
    pub is_static: bool,
    pub is_weak: bool,
}

impl FieldBinding {
    pub fn key(&self) -> String {
        format!("{}.{}", self.declaring_class, self.name)
    }

    pub fn is_primitive(&self) -> bool {
        ast::is_primitive_name(&self.field_type)
    }
}

/// A binding synthesized by a pass rather than the front end: a hoisted
/// temporary or a lambda parameter. Registered in a pass-local table, never
/// in the shared environment.
#[derive(Debug, Clone)]
pub struct VariableBinding {
    pub name: String,
    pub var_type: String,
    pub declaring_context: String,
    pub is_parameter: bool,
    pub is_final: bool,
}

/// Strip one array dimension from a type name (`T[]` -> `T`).
pub fn array_element_type(name: &str) -> Option<&str> {
    name.strip_suffix("[]")
}

/// Shared type environment, read-only during the pipeline.
///
/// The core-library hierarchy the passes depend on (Object at the root, the
/// string and numeric wrapper classes, the clone and serialization marker
/// interfaces) is preregistered.
#[derive(Debug, Default)]
pub struct TypeEnvironment {
    classes: HashMap<String, TypeBinding>,
    methods: HashMap<String, MethodBinding>,
    fields: HashMap<String, FieldBinding>,
}

impl TypeEnvironment {
    pub fn new() -> Self {
        let mut env = Self::default();
        env.add_class(TypeBinding::class("Object", None));
        env.add_class(TypeBinding::class("String", Some("Object")));
        env.add_class(TypeBinding::class("Number", Some("Object")));
        env.add_class(TypeBinding::interface("Cloneable"));
        env.add_class(TypeBinding::interface("Serializable"));
        env
    }

    pub fn add_class(&mut self, binding: TypeBinding) {
        self.classes.insert(binding.name.clone(), binding);
    }

    /// Register a method binding, returning its lookup key.
    pub fn add_method(&mut self, binding: MethodBinding) -> String {
        let key = binding.key();
        self.methods.insert(key.clone(), binding);
        key
    }

    pub fn add_field(&mut self, binding: FieldBinding) {
        self.fields.insert(binding.key(), binding);
    }

    pub fn class(&self, name: &str) -> Option<&TypeBinding> {
        self.classes.get(name)
    }

    pub fn method(&self, key: &str) -> Option<&MethodBinding> {
        self.methods.get(key)
    }

    /// Field lookup by declaring-or-inherited class, walking the superclass
    /// chain the way an unqualified field reference resolves.
    pub fn field(&self, class: &str, name: &str) -> Option<&FieldBinding> {
        let mut current = Some(class.to_string());
        while let Some(cls) = current {
            if let Some(field) = self.fields.get(&format!("{}.{}", cls, name)) {
                return Some(field);
            }
            current = self.class(&cls).and_then(|c| c.superclass.clone());
        }
        None
    }

    /// All constructor bindings declared for a class.
    pub fn constructors_of<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a MethodBinding> {
        self.methods
            .values()
            .filter(move |m| m.is_constructor && m.declaring_class == class)
    }

    /// Reflexive, transitive subtype check over the declared hierarchy.
    pub fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        if sub == sup {
            return true;
        }
        // Array covariance: T[] <: S[] iff T <: S.
        if let (Some(sub_elem), Some(sup_elem)) =
            (array_element_type(sub), array_element_type(sup))
        {
            return self.is_subtype(sub_elem, sup_elem);
        }
        let Some(binding) = self.class(sub) else {
            return false;
        };
        if let Some(superclass) = &binding.superclass {
            if self.is_subtype(superclass, sup) {
                return true;
            }
        }
        binding.interfaces.iter().any(|i| self.is_subtype(i, sup))
    }

    /// The single abstract method of a functional interface.
    pub fn functional_method(&self, interface: &str) -> Option<&MethodBinding> {
        self.class(interface)
            .and_then(|c| c.functional_method.as_deref())
            .and_then(|key| self.method(key))
    }

    /// Target runtime name for a mapped core-library type.
    pub fn target_type(&self, source_name: &str) -> Option<&'static str> {
        mappings::target_type(source_name)
    }

    /// Best-effort static type of an expression, as a type name string.
    /// Identifier and field reads resolve through no symbol table here, so
    /// they report unknown; the callers fall back to the dynamic object type.
    pub fn expression_type(&self, expr: &Expr) -> Option<String> {
        match expr {
            Expr::Literal(lit) => match &lit.value {
                Literal::Integer(_) => Some("int".to_string()),
                Literal::Float(_) => Some("double".to_string()),
                Literal::Boolean(_) => Some("boolean".to_string()),
                Literal::String(_) => Some("String".to_string()),
                Literal::Char(_) => Some("char".to_string()),
                Literal::Null => None,
            },
            Expr::MethodCall(mc) => {
                let key = mc.binding.as_deref()?;
                Some(self.method(key)?.return_type.clone())
            }
            Expr::SuperMethodCall(sc) => {
                let key = sc.binding.as_deref()?;
                Some(self.method(key)?.return_type.clone())
            }
            Expr::New(ne) => Some(ne.target_type.to_string()),
            Expr::Cast(c) => Some(c.target_type.to_string()),
            Expr::Parenthesized(p) => self.expression_type(&p.expr),
            Expr::Binary(b) => {
                if b.operator.is_boolean() {
                    Some("boolean".to_string())
                } else {
                    self.expression_type(&b.left)
                        .or_else(|| self.expression_type(&b.right))
                }
            }
            Expr::Unary(u) => match u.operator {
                ast::UnaryOp::Not => Some("boolean".to_string()),
                _ => self.expression_type(&u.operand),
            },
            Expr::Conditional(c) => self
                .expression_type(&c.then_expr)
                .or_else(|| self.expression_type(&c.else_expr)),
            Expr::ArrayCreation(ac) => Some(format!(
                "{}{}",
                ac.element_type.name,
                "[]".repeat(ac.element_type.array_dims + 1)
            )),
            Expr::InstanceOf(_) => Some("boolean".to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preregistered_hierarchy_is_rooted_at_object() {
        let env = TypeEnvironment::new();
        assert!(env.is_subtype("String", "Object"));
        assert!(env.is_subtype("Number", "Object"));
        assert!(!env.is_subtype("Object", "String"));
    }

    #[test]
    fn subtype_walks_interfaces_transitively() {
        let mut env = TypeEnvironment::new();
        env.add_class(TypeBinding::interface("Marker"));
        env.add_class(TypeBinding::class("Base", Some("Object")).with_interfaces(&["Marker"]));
        env.add_class(TypeBinding::class("Derived", Some("Base")));
        assert!(env.is_subtype("Derived", "Marker"));
        assert!(env.is_subtype("Derived", "Object"));
        assert!(!env.is_subtype("Base", "Derived"));
    }

    #[test]
    fn array_covariance() {
        let env = TypeEnvironment::new();
        assert!(env.is_subtype("String[]", "Object[]"));
        assert!(!env.is_subtype("Object[]", "String[]"));
    }

    #[test]
    fn field_lookup_walks_superclasses() {
        let mut env = TypeEnvironment::new();
        env.add_class(TypeBinding::class("Base", Some("Object")));
        env.add_class(TypeBinding::class("Derived", Some("Base")));
        env.add_field(FieldBinding {
            name: "count".to_string(),
            declaring_class: "Base".to_string(),
            field_type: "int".to_string(),
            is_static: false,
            is_weak: false,
        });
        let field = env.field("Derived", "count").expect("inherited field");
        assert_eq!(field.declaring_class, "Base");
    }

    #[test]
    fn method_keys_distinguish_overloads() {
        let mut env = TypeEnvironment::new();
        let k1 = env.add_method(MethodBinding {
            name: "run".to_string(),
            declaring_class: "C".to_string(),
            param_types: vec!["int".to_string()],
            return_type: "void".to_string(),
            is_varargs: false,
            is_static: false,
            is_constructor: false,
        });
        let k2 = env.add_method(MethodBinding {
            name: "run".to_string(),
            declaring_class: "C".to_string(),
            param_types: vec!["String".to_string()],
            return_type: "void".to_string(),
            is_varargs: false,
            is_static: false,
            is_constructor: false,
        });
        assert_ne!(k1, k2);
        assert!(env.method(&k1).is_some());
        assert!(env.method(&k2).is_some());
    }
}
