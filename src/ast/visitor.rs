use super::*;
use crate::error::Result;

/// Mutable AST visitor used by the lowering passes.
///
/// Every hook defaults to the corresponding `walk_*` function, so a pass
/// overrides only the node kinds it cares about. Code placed before the
/// `walk_*` call runs pre-order, code after it runs post-order. Hooks return
/// `Result` so a pass can abort the unit on an invariant violation.
pub trait MutVisitor {
    fn visit_unit(&mut self, unit: &mut CompilationUnit) -> Result<()> {
        walk_unit(self, unit)
    }

    fn visit_type_decl(&mut self, type_decl: &mut TypeDecl) -> Result<()> {
        walk_type_decl(self, type_decl)
    }

    fn visit_class_decl(&mut self, class: &mut ClassDecl) -> Result<()> {
        walk_class_decl(self, class)
    }

    fn visit_interface_decl(&mut self, interface: &mut InterfaceDecl) -> Result<()> {
        walk_interface_decl(self, interface)
    }

    fn visit_enum_decl(&mut self, enum_decl: &mut EnumDecl) -> Result<()> {
        walk_enum_decl(self, enum_decl)
    }

    fn visit_member(&mut self, member: &mut ClassMember) -> Result<()> {
        walk_member(self, member)
    }

    fn visit_field_decl(&mut self, field: &mut FieldDecl) -> Result<()> {
        walk_field_decl(self, field)
    }

    fn visit_method_decl(&mut self, method: &mut MethodDecl) -> Result<()> {
        walk_method_decl(self, method)
    }

    fn visit_constructor_decl(&mut self, constructor: &mut ConstructorDecl) -> Result<()> {
        walk_constructor_decl(self, constructor)
    }

    fn visit_block(&mut self, block: &mut Block) -> Result<()> {
        walk_block(self, block)
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) -> Result<()> {
        walk_stmt(self, stmt)
    }

    fn visit_expr(&mut self, expr: &mut Expr) -> Result<()> {
        walk_expr(self, expr)
    }

    fn visit_type_ref(&mut self, _type_ref: &mut TypeRef) -> Result<()> {
        Ok(())
    }
}

pub fn walk_unit<V: MutVisitor + ?Sized>(v: &mut V, unit: &mut CompilationUnit) -> Result<()> {
    for type_decl in &mut unit.types {
        v.visit_type_decl(type_decl)?;
    }
    Ok(())
}

pub fn walk_type_decl<V: MutVisitor + ?Sized>(v: &mut V, type_decl: &mut TypeDecl) -> Result<()> {
    match type_decl {
        TypeDecl::Class(c) => v.visit_class_decl(c),
        TypeDecl::Interface(i) => v.visit_interface_decl(i),
        TypeDecl::Enum(e) => v.visit_enum_decl(e),
    }
}

pub fn walk_class_decl<V: MutVisitor + ?Sized>(v: &mut V, class: &mut ClassDecl) -> Result<()> {
    if let Some(extends) = &mut class.extends {
        v.visit_type_ref(extends)?;
    }
    for iface in &mut class.implements {
        v.visit_type_ref(iface)?;
    }
    for member in &mut class.body {
        v.visit_member(member)?;
    }
    Ok(())
}

pub fn walk_interface_decl<V: MutVisitor + ?Sized>(
    v: &mut V,
    interface: &mut InterfaceDecl,
) -> Result<()> {
    for parent in &mut interface.extends {
        v.visit_type_ref(parent)?;
    }
    for member in &mut interface.body {
        v.visit_member(member)?;
    }
    Ok(())
}

pub fn walk_enum_decl<V: MutVisitor + ?Sized>(v: &mut V, enum_decl: &mut EnumDecl) -> Result<()> {
    for iface in &mut enum_decl.implements {
        v.visit_type_ref(iface)?;
    }
    for constant in &mut enum_decl.constants {
        for arg in &mut constant.arguments {
            v.visit_expr(arg)?;
        }
    }
    for member in &mut enum_decl.body {
        v.visit_member(member)?;
    }
    Ok(())
}

pub fn walk_member<V: MutVisitor + ?Sized>(v: &mut V, member: &mut ClassMember) -> Result<()> {
    match member {
        ClassMember::Field(field) => v.visit_field_decl(field),
        ClassMember::Method(method) => v.visit_method_decl(method),
        ClassMember::Constructor(constructor) => v.visit_constructor_decl(constructor),
        ClassMember::Initializer(init) => v.visit_block(&mut init.body),
        ClassMember::Type(nested) => v.visit_type_decl(nested),
    }
}

pub fn walk_field_decl<V: MutVisitor + ?Sized>(v: &mut V, field: &mut FieldDecl) -> Result<()> {
    v.visit_type_ref(&mut field.type_ref)?;
    if let Some(init) = &mut field.initializer {
        v.visit_expr(init)?;
    }
    Ok(())
}

pub fn walk_method_decl<V: MutVisitor + ?Sized>(v: &mut V, method: &mut MethodDecl) -> Result<()> {
    if let Some(ret) = &mut method.return_type {
        v.visit_type_ref(ret)?;
    }
    for param in &mut method.parameters {
        v.visit_type_ref(&mut param.type_ref)?;
    }
    if let Some(body) = &mut method.body {
        v.visit_block(body)?;
    }
    Ok(())
}

pub fn walk_constructor_decl<V: MutVisitor + ?Sized>(
    v: &mut V,
    constructor: &mut ConstructorDecl,
) -> Result<()> {
    for param in &mut constructor.parameters {
        v.visit_type_ref(&mut param.type_ref)?;
    }
    if let Some(invocation) = &mut constructor.explicit_invocation {
        for arg in &mut invocation.arguments {
            v.visit_expr(arg)?;
        }
    }
    v.visit_block(&mut constructor.body)
}

pub fn walk_block<V: MutVisitor + ?Sized>(v: &mut V, block: &mut Block) -> Result<()> {
    for stmt in &mut block.statements {
        v.visit_stmt(stmt)?;
    }
    Ok(())
}

pub fn walk_stmt<V: MutVisitor + ?Sized>(v: &mut V, stmt: &mut Stmt) -> Result<()> {
    match stmt {
        Stmt::Expression(es) => v.visit_expr(&mut es.expr),
        Stmt::Declaration(decl) => {
            v.visit_type_ref(&mut decl.type_ref)?;
            for var in &mut decl.variables {
                if let Some(init) = &mut var.initializer {
                    v.visit_expr(init)?;
                }
            }
            Ok(())
        }
        Stmt::If(ifs) => {
            v.visit_expr(&mut ifs.condition)?;
            v.visit_stmt(&mut ifs.then_branch)?;
            if let Some(els) = &mut ifs.else_branch {
                v.visit_stmt(els)?;
            }
            Ok(())
        }
        Stmt::While(ws) => {
            v.visit_expr(&mut ws.condition)?;
            v.visit_stmt(&mut ws.body)
        }
        Stmt::DoWhile(dws) => {
            v.visit_stmt(&mut dws.body)?;
            v.visit_expr(&mut dws.condition)
        }
        Stmt::For(fs) => {
            for init in &mut fs.init {
                v.visit_stmt(init)?;
            }
            if let Some(cond) = &mut fs.condition {
                v.visit_expr(cond)?;
            }
            for update in &mut fs.update {
                v.visit_expr(update)?;
            }
            v.visit_stmt(&mut fs.body)
        }
        Stmt::Return(rs) => {
            if let Some(value) = &mut rs.value {
                v.visit_expr(value)?;
            }
            Ok(())
        }
        Stmt::Throw(ts) => v.visit_expr(&mut ts.expr),
        Stmt::Block(block) => v.visit_block(block),
        Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty => Ok(()),
    }
}

pub fn walk_expr<V: MutVisitor + ?Sized>(v: &mut V, expr: &mut Expr) -> Result<()> {
    match expr {
        Expr::Literal(_) | Expr::Identifier(_) | Expr::This(_) => Ok(()),
        Expr::Binary(b) => {
            v.visit_expr(&mut b.left)?;
            v.visit_expr(&mut b.right)
        }
        Expr::Unary(u) => v.visit_expr(&mut u.operand),
        Expr::Assignment(a) => {
            v.visit_expr(&mut a.target)?;
            v.visit_expr(&mut a.value)
        }
        Expr::MethodCall(mc) => {
            if let Some(receiver) = &mut mc.receiver {
                v.visit_expr(receiver)?;
            }
            for arg in &mut mc.arguments {
                v.visit_expr(arg)?;
            }
            Ok(())
        }
        Expr::SuperMethodCall(sc) => {
            for arg in &mut sc.arguments {
                v.visit_expr(arg)?;
            }
            Ok(())
        }
        Expr::FunctionCall(fc) => {
            for arg in &mut fc.arguments {
                v.visit_expr(arg)?;
            }
            Ok(())
        }
        Expr::FieldAccess(fa) => {
            if let Some(receiver) = &mut fa.receiver {
                v.visit_expr(receiver)?;
            }
            Ok(())
        }
        Expr::ArrayAccess(aa) => {
            v.visit_expr(&mut aa.array)?;
            v.visit_expr(&mut aa.index)
        }
        Expr::ArrayCreation(ac) => {
            v.visit_type_ref(&mut ac.element_type)?;
            for dim in &mut ac.dimensions {
                v.visit_expr(dim)?;
            }
            if let Some(init) = &mut ac.initializer {
                v.visit_expr(init)?;
            }
            Ok(())
        }
        Expr::ArrayInitializer(ai) => {
            for element in &mut ai.elements {
                v.visit_expr(element)?;
            }
            Ok(())
        }
        Expr::Cast(c) => {
            v.visit_type_ref(&mut c.target_type)?;
            v.visit_expr(&mut c.expr)
        }
        Expr::InstanceOf(io) => {
            v.visit_expr(&mut io.expr)?;
            v.visit_type_ref(&mut io.target_type)
        }
        Expr::Conditional(c) => {
            v.visit_expr(&mut c.condition)?;
            v.visit_expr(&mut c.then_expr)?;
            v.visit_expr(&mut c.else_expr)
        }
        Expr::New(ne) => {
            v.visit_type_ref(&mut ne.target_type)?;
            for arg in &mut ne.arguments {
                v.visit_expr(arg)?;
            }
            if let Some(body) = &mut ne.anonymous_body {
                v.visit_class_decl(body)?;
            }
            Ok(())
        }
        Expr::Lambda(lambda) => {
            for param in &mut lambda.parameters {
                v.visit_type_ref(&mut param.type_ref)?;
            }
            match &mut lambda.body {
                LambdaBody::Expression(e) => v.visit_expr(e),
                LambdaBody::Block(block) => v.visit_block(block),
            }
        }
        Expr::MethodRef(_) => Ok(()),
        Expr::Parenthesized(p) => v.visit_expr(&mut p.expr),
    }
}
