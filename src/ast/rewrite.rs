//! Structural tree mutation helpers
//!
//! Statement lists are never mutated while being iterated. `rewrite_stmts`
//! drains the list and rebuilds it, so a callback may remove its statement,
//! replace it, or splice new statements (hoisted temporaries) in front of it
//! without corrupting sibling iteration. Expression slots are replaced in
//! place with `std::mem::replace` during `&mut` recursion.

use super::{Block, Expr, Modifier, Span, Stmt, TypeRef, VarDeclStmt, VariableDeclarator};
use crate::error::Result;

/// Outcome of rewriting one statement slot.
pub enum StmtRewrite {
    /// Leave the (possibly internally mutated) statement where it is.
    Keep,
    /// Detach the statement from its block.
    Remove,
    /// Install a different statement in the same slot.
    Replace(Stmt),
    /// Replace the slot with a run of statements, preserving order.
    Splice(Vec<Stmt>),
}

/// Rebuild a statement list by applying `f` to each statement in order.
pub fn rewrite_stmts(
    stmts: &mut Vec<Stmt>,
    f: &mut dyn FnMut(&mut Stmt) -> Result<StmtRewrite>,
) -> Result<()> {
    let old = std::mem::take(stmts);
    let mut rebuilt = Vec::with_capacity(old.len());
    for mut stmt in old {
        match f(&mut stmt)? {
            StmtRewrite::Keep => rebuilt.push(stmt),
            StmtRewrite::Remove => {}
            StmtRewrite::Replace(new) => rebuilt.push(new),
            StmtRewrite::Splice(run) => rebuilt.extend(run),
        }
    }
    *stmts = rebuilt;
    Ok(())
}

/// Apply a statement rewrite to a single-statement slot (a loop or branch
/// body), where removal degrades to the empty statement and a splice becomes
/// a block.
pub fn apply_to_slot(slot: &mut Stmt, rewrite: StmtRewrite) {
    match rewrite {
        StmtRewrite::Keep => {}
        StmtRewrite::Remove => *slot = Stmt::Empty,
        StmtRewrite::Replace(new) => *slot = new,
        StmtRewrite::Splice(run) => *slot = Stmt::Block(Block::new(run)),
    }
}

/// Take ownership of an expression slot, leaving a null literal behind.
/// The caller installs the replacement immediately after.
pub fn take_expr(slot: &mut Expr) -> Expr {
    std::mem::replace(slot, Expr::null(Span::synthetic()))
}

/// Build a `final T name = init;` declaration for a hoisted temporary.
pub fn temp_declaration(type_ref: TypeRef, name: &str, initializer: Expr) -> Stmt {
    Stmt::Declaration(VarDeclStmt {
        modifiers: vec![Modifier::Final],
        type_ref,
        variables: vec![VariableDeclarator {
            name: name.to_string(),
            initializer: Some(initializer),
            span: Span::synthetic(),
        }],
        span: Span::synthetic(),
    })
}
