use super::Span;
use std::fmt;

// Type Declarations

#[derive(Debug, Clone)]
pub enum TypeDecl {
    Class(ClassDecl),
    Interface(InterfaceDecl),
    Enum(EnumDecl),
}

impl TypeDecl {
    pub fn name(&self) -> &str {
        match self {
            TypeDecl::Class(c) => &c.name,
            TypeDecl::Interface(i) => &i.name,
            TypeDecl::Enum(e) => &e.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TypeDecl::Class(c) => c.span,
            TypeDecl::Interface(i) => i.span,
            TypeDecl::Enum(e) => e.span,
        }
    }

    /// Names of the declared supertypes (extends plus implements), in source
    /// order. Used by the dependency sort over a unit's declarations.
    pub fn super_names(&self) -> Vec<&str> {
        match self {
            TypeDecl::Class(c) => c
                .extends
                .iter()
                .map(|t| t.name.as_str())
                .chain(c.implements.iter().map(|t| t.name.as_str()))
                .collect(),
            TypeDecl::Interface(i) => i.extends.iter().map(|t| t.name.as_str()).collect(),
            TypeDecl::Enum(e) => e.implements.iter().map(|t| t.name.as_str()).collect(),
        }
    }
}

impl fmt::Display for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDecl::Class(c) => write!(f, "class {}", c.name),
            TypeDecl::Interface(i) => write!(f, "interface {}", i.name),
            TypeDecl::Enum(e) => write!(f, "enum {}", e.name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub extends: Option<TypeRef>,
    pub implements: Vec<TypeRef>,
    pub body: Vec<ClassMember>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct InterfaceDecl {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub extends: Vec<TypeRef>,
    pub body: Vec<ClassMember>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub implements: Vec<TypeRef>,
    pub constants: Vec<EnumConstant>,
    pub body: Vec<ClassMember>,
    pub span: Span,
}

/// An enum constant. Its arguments form a constructor call, so varargs
/// normalization applies to them like any other call site.
#[derive(Debug, Clone)]
pub struct EnumConstant {
    pub name: String,
    pub arguments: Vec<Expr>,
    /// Method key of the constructor binding, resolved by the front end.
    pub binding: Option<String>,
    pub span: Span,
}

// Modifiers and Annotations

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Abstract,
    Static,
    Final,
    Native,
    Synchronized,
    Transient,
    Volatile,
}

#[derive(Debug, Clone)]
pub struct Annotation {
    pub name: String,
    pub arguments: Vec<AnnotationArg>,
    pub span: Span,
}

impl Annotation {
    /// Look up a named argument's expression.
    pub fn named_arg(&self, name: &str) -> Option<&Expr> {
        self.arguments.iter().find_map(|a| match a {
            AnnotationArg::Named(n, e) if n == name => Some(e),
            _ => None,
        })
    }

    /// The single positional argument, if the annotation has exactly one.
    pub fn value_arg(&self) -> Option<&Expr> {
        match self.arguments.as_slice() {
            [AnnotationArg::Value(e)] => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum AnnotationArg {
    Value(Expr),
    Named(String, Expr),
}

// Type References

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub name: String,
    pub array_dims: usize,
    pub span: Span,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), array_dims: 0, span: Span::synthetic() }
    }

    pub fn array(name: impl Into<String>, dims: usize) -> Self {
        Self { name: name.into(), array_dims: dims, span: Span::synthetic() }
    }

    pub fn is_primitive(&self) -> bool {
        self.array_dims == 0 && is_primitive_name(&self.name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for _ in 0..self.array_dims {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

pub fn is_primitive_name(name: &str) -> bool {
    matches!(
        name,
        "boolean" | "byte" | "char" | "short" | "int" | "long" | "float" | "double" | "void"
    )
}

// Class Members

#[derive(Debug, Clone)]
pub enum ClassMember {
    Field(FieldDecl),
    Method(MethodDecl),
    Constructor(ConstructorDecl),
    Initializer(InitializerBlock),
    Type(TypeDecl),
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub type_ref: TypeRef,
    pub name: String,
    pub initializer: Option<Expr>,
    pub span: Span,
}

impl FieldDecl {
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(&Modifier::Static)
    }
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    /// None for constructors represented as methods; Some(void) for void.
    pub return_type: Option<TypeRef>,
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub body: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ConstructorDecl {
    pub modifiers: Vec<Modifier>,
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub explicit_invocation: Option<ExplicitCtorInvocation>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct InitializerBlock {
    pub is_static: bool,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub type_ref: TypeRef,
    pub name: String,
    pub varargs: bool,
    pub span: Span,
}

impl Parameter {
    pub fn new(type_ref: TypeRef, name: impl Into<String>) -> Self {
        Self { type_ref, name: name.into(), varargs: false, span: Span::synthetic() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtorInvocationKind {
    This,
    Super,
}

/// `this(...)` or `super(...)` at the head of a constructor body.
#[derive(Debug, Clone)]
pub struct ExplicitCtorInvocation {
    pub kind: CtorInvocationKind,
    pub arguments: Vec<Expr>,
    /// Method key of the invoked constructor binding.
    pub binding: Option<String>,
    pub span: Span,
}

// Statements

#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self { statements, span: Span::synthetic() }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Expression(ExprStmt),
    Declaration(VarDeclStmt),
    If(IfStmt),
    While(WhileStmt),
    DoWhile(DoWhileStmt),
    For(ForStmt),
    Return(ReturnStmt),
    Break(BreakStmt),
    Continue(ContinueStmt),
    Throw(ThrowStmt),
    Block(Block),
    Empty,
}

#[derive(Debug, Clone)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct VarDeclStmt {
    pub modifiers: Vec<Modifier>,
    pub type_ref: TypeRef,
    pub variables: Vec<VariableDeclarator>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct VariableDeclarator {
    pub name: String,
    pub initializer: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct DoWhileStmt {
    pub body: Box<Stmt>,
    pub condition: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    pub init: Vec<Stmt>,
    pub condition: Option<Expr>,
    pub update: Vec<Expr>,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BreakStmt {
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ContinueStmt {
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ThrowStmt {
    pub expr: Expr,
    pub span: Span,
}

// Expressions

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(LiteralExpr),
    Identifier(IdentifierExpr),
    This(ThisExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Assignment(AssignmentExpr),
    MethodCall(MethodCallExpr),
    SuperMethodCall(SuperMethodCallExpr),
    /// Call to a target-runtime C-style helper function, synthesized by the
    /// reference-counting rewrites. Never produced by the front end.
    FunctionCall(FunctionCallExpr),
    FieldAccess(FieldAccessExpr),
    ArrayAccess(ArrayAccessExpr),
    ArrayCreation(ArrayCreationExpr),
    ArrayInitializer(ArrayInitializerExpr),
    Cast(CastExpr),
    InstanceOf(InstanceOfExpr),
    Conditional(ConditionalExpr),
    New(NewExpr),
    Lambda(LambdaExpr),
    MethodRef(MethodRefExpr),
    Parenthesized(ParenExpr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(e) => e.span,
            Expr::Identifier(e) => e.span,
            Expr::This(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Assignment(e) => e.span,
            Expr::MethodCall(e) => e.span,
            Expr::SuperMethodCall(e) => e.span,
            Expr::FunctionCall(e) => e.span,
            Expr::FieldAccess(e) => e.span,
            Expr::ArrayAccess(e) => e.span,
            Expr::ArrayCreation(e) => e.span,
            Expr::ArrayInitializer(e) => e.span,
            Expr::Cast(e) => e.span,
            Expr::InstanceOf(e) => e.span,
            Expr::Conditional(e) => e.span,
            Expr::New(e) => e.span,
            Expr::Lambda(e) => e.span,
            Expr::MethodRef(e) => e.span,
            Expr::Parenthesized(e) => e.span,
        }
    }

    pub fn boolean(value: bool, span: Span) -> Expr {
        Expr::Literal(LiteralExpr { value: Literal::Boolean(value), span })
    }

    pub fn ident(name: impl Into<String>, span: Span) -> Expr {
        Expr::Identifier(IdentifierExpr { name: name.into(), span })
    }

    pub fn null(span: Span) -> Expr {
        Expr::Literal(LiteralExpr { value: Literal::Null, span })
    }
}

#[derive(Debug, Clone)]
pub struct LiteralExpr {
    pub value: Literal,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    Char(char),
    Null,
}

#[derive(Debug, Clone)]
pub struct IdentifierExpr {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ThisExpr {
    /// Qualified `Outer.this`, or None for plain `this`. The reference
    /// counting rewrite sets this to the declaring class of an implicitly
    /// targeted field.
    pub qualifier: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: BinaryOp,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add, Sub, Mul, Div, Mod,
    Lt, Le, Gt, Ge, Eq, Ne,
    CondAnd, CondOr,
    BitAnd, BitOr, BitXor, Shl, Shr,
}

impl BinaryOp {
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge | BinaryOp::Eq
                | BinaryOp::Ne | BinaryOp::CondAnd | BinaryOp::CondOr
        )
    }
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub operator: UnaryOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
    /// `&storage` on a static field slot, synthesized for the retained-assign
    /// helper call. Never produced by the front end.
    AddressOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

#[derive(Debug, Clone)]
pub struct AssignmentExpr {
    pub target: Box<Expr>,
    pub operator: AssignOp,
    pub value: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MethodCallExpr {
    pub receiver: Option<Box<Expr>>,
    pub name: String,
    pub arguments: Vec<Expr>,
    /// Method key of the resolved binding ("Class.name(params)").
    pub binding: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct SuperMethodCallExpr {
    pub name: String,
    pub arguments: Vec<Expr>,
    pub binding: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionCallExpr {
    pub name: String,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FieldAccessExpr {
    /// None for an unqualified field read/write inside the declaring class.
    pub receiver: Option<Box<Expr>>,
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ArrayAccessExpr {
    pub array: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ArrayCreationExpr {
    pub element_type: TypeRef,
    pub dimensions: Vec<Expr>,
    /// Always an `Expr::ArrayInitializer` when present.
    pub initializer: Option<Box<Expr>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ArrayInitializerExpr {
    pub elements: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CastExpr {
    pub target_type: TypeRef,
    pub expr: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct InstanceOfExpr {
    pub expr: Box<Expr>,
    pub target_type: TypeRef,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ConditionalExpr {
    pub condition: Box<Expr>,
    pub then_expr: Box<Expr>,
    pub else_expr: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct NewExpr {
    pub target_type: TypeRef,
    pub arguments: Vec<Expr>,
    /// Body of an anonymous class. The front end assigns these a synthetic
    /// name (Outer$1 style) before the pipeline runs.
    pub anonymous_body: Option<Box<ClassDecl>>,
    /// Method key of the resolved constructor binding.
    pub binding: Option<String>,
    pub span: Span,
}

// Functional literals

#[derive(Debug, Clone)]
pub struct LambdaExpr {
    pub parameters: Vec<Parameter>,
    pub body: LambdaBody,
    /// Synthesized anonymous type identity ($Lambda$N), assigned by the
    /// lambda type element pass.
    pub type_name: Option<String>,
    /// Target functional interface, resolved by the front end.
    pub functional_interface: Option<String>,
    /// Nearest lexically enclosing type, fixed up by the binding pass.
    pub declaring_class: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum LambdaBody {
    Expression(Box<Expr>),
    Block(Block),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodRefKind {
    Static,
    Instance,
    Super,
    Constructor,
}

#[derive(Debug, Clone)]
pub struct MethodRefExpr {
    pub kind: MethodRefKind,
    /// Type or receiver name to the left of `::`.
    pub qualifier: String,
    /// Referenced method name; "new" for constructor references.
    pub name: String,
    /// Nonzero for array constructor references (`T[]::new`).
    pub array_dims: usize,
    pub type_name: Option<String>,
    pub functional_interface: Option<String>,
    pub declaring_class: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ParenExpr {
    pub expr: Box<Expr>,
    pub span: Span,
}
