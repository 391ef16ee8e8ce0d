//! Structural predicate for the append loop
//!
//! Only the shape of the loop body is inspected. `push` is trusted by name:
//! a receiver that merely happens to have a `push` method still matches.

use swc_core::ecma::ast::{CallExpr, Callee, Expr, ForOfStmt, Ident, MemberProp, Stmt};

/// A statement of the form `<identifier>.push(...)`
#[derive(Debug, Clone, Copy)]
pub struct AppendCall<'a> {
    /// The collection being appended to
    pub target: &'a Ident,
    pub call: &'a CallExpr,
}

/// Check whether a `for ... of` loop only feeds another array.
///
/// The loop matches when its body is a single append statement, or a
/// non-empty block whose last statement is an append. Statements before the
/// last one are not inspected, so a `break` or a second `push` earlier in the
/// block does not prevent a match.
pub fn matches(for_of: &ForOfStmt) -> bool {
    last_body_statement(for_of)
        .and_then(as_append_call)
        .is_some()
}

/// The statement the loop body ends with, or `None` for an empty block
pub(crate) fn last_body_statement(for_of: &ForOfStmt) -> Option<&Stmt> {
    match &*for_of.body {
        Stmt::Block(block) => block.stmts.last(),
        stmt => Some(stmt),
    }
}

/// Recognize `<identifier>.push(...)` as a bare expression statement
pub fn as_append_call(stmt: &Stmt) -> Option<AppendCall<'_>> {
    let Stmt::Expr(expr_stmt) = stmt else {
        return None;
    };
    let Expr::Call(call) = &*expr_stmt.expr else {
        return None;
    };
    let Callee::Expr(callee) = &call.callee else {
        return None;
    };
    let Expr::Member(member) = &**callee else {
        return None;
    };
    // `output["push"](x)` is a computed access, not a property access
    let MemberProp::Ident(method) = &member.prop else {
        return None;
    };
    if &*method.sym != "push" {
        return None;
    }
    let Expr::Ident(target) = &*member.obj else {
        return None;
    };

    Some(AppendCall { target, call })
}
