//! Rebuild a matched append loop as a `map` assignment

use crate::error::RewriteError;
use crate::idiom::matcher::as_append_call;
use swc_core::common::{SyntaxContext, DUMMY_SP};
use swc_core::ecma::ast::{
    ArrowExpr, AssignExpr, AssignOp, AssignTarget, AssignTargetPat, BindingIdent, BlockStmt,
    BlockStmtOrExpr, CallExpr, Callee, Expr, ExprOrSpread, ExprStmt, ForHead, ForOfStmt, Ident,
    IdentName, Lit, MemberExpr, MemberProp, OptChainBase, ParenExpr, Pat, ReturnStmt,
    SimpleAssignTarget, Stmt,
};

/// The parts of an append loop that the replacement is built from
#[derive(Debug, Clone, Copy)]
pub struct ExtractedIdiom<'a> {
    /// Name of the per-iteration variable
    pub bound_name: &'a str,
    /// The iterated collection
    pub source: &'a Expr,
    /// Statements executed before the append, in source order
    pub preceding: &'a [Stmt],
    /// Name of the collection being appended to
    pub target: &'a str,
    /// The appended value
    pub value: &'a Expr,
}

/// Take a matched loop apart.
///
/// Fails with [`RewriteError::NotAnAppendLoop`] when the loop does not match,
/// and with the other variants when it matches but has no faithful map form.
pub fn extract(for_of: &ForOfStmt) -> Result<ExtractedIdiom<'_>, RewriteError> {
    let (preceding, last) = split_body(&for_of.body).ok_or(RewriteError::NotAnAppendLoop)?;
    let append = as_append_call(last).ok_or(RewriteError::NotAnAppendLoop)?;
    let target: &str = &append.target.sym;

    let value = match append.call.args.first() {
        None => {
            return Err(RewriteError::MissingPushArgument {
                target: target.to_string(),
            })
        }
        Some(arg) if arg.spread.is_some() => {
            return Err(RewriteError::SpreadPushArgument {
                target: target.to_string(),
            })
        }
        Some(arg) => &*arg.expr,
    };

    // `map` does not await its callback
    if for_of.is_await {
        return Err(RewriteError::AsyncIteration {
            target: target.to_string(),
        });
    }

    Ok(ExtractedIdiom {
        bound_name: bound_name(&for_of.left)?,
        source: &for_of.right,
        preceding,
        target,
        value,
    })
}

/// Rewrite a matched loop into `target = source.map(...)`, or into
/// `target = target.concat(source.map(...))` when `use_concat` is set.
pub fn rewrite(for_of: &ForOfStmt, use_concat: bool) -> Result<ExprStmt, RewriteError> {
    let idiom = extract(for_of)?;
    Ok(build_replacement(&idiom, use_concat))
}

/// Build the replacement statement from extracted parts
pub fn build_replacement(idiom: &ExtractedIdiom<'_>, use_concat: bool) -> ExprStmt {
    let mapped = method_call(as_receiver(idiom.source), "map", map_function(idiom));

    let value = if use_concat {
        method_call(Box::new(Expr::Ident(ident(idiom.target))), "concat", mapped)
    } else {
        mapped
    };

    ExprStmt {
        span: DUMMY_SP,
        expr: Box::new(Expr::Assign(AssignExpr {
            span: DUMMY_SP,
            op: AssignOp::Assign,
            left: AssignTarget::Simple(SimpleAssignTarget::Ident(BindingIdent {
                id: ident(idiom.target),
                type_ann: None,
            })),
            right: Box::new(value),
        })),
    }
}

/// Split a loop body into the statements before the last one and the last one
fn split_body(body: &Stmt) -> Option<(&[Stmt], &Stmt)> {
    match body {
        Stmt::Block(block) => block
            .stmts
            .split_last()
            .map(|(last, preceding)| (preceding, last)),
        stmt => {
            let preceding: &[Stmt] = &[];
            Some((preceding, stmt))
        }
    }
}

fn bound_name(head: &ForHead) -> Result<&str, RewriteError> {
    match head {
        ForHead::VarDecl(var_decl) => match var_decl.decls.as_slice() {
            [declarator] => match &declarator.name {
                Pat::Ident(binding) => Ok(&*binding.id.sym),
                _ => Err(RewriteError::UnsupportedBinding(
                    "destructuring pattern".to_string(),
                )),
            },
            decls => Err(RewriteError::UnsupportedBinding(format!(
                "{} declarators",
                decls.len()
            ))),
        },
        ForHead::Pat(pat) => match &**pat {
            Pat::Ident(binding) => Ok(&*binding.id.sym),
            Pat::Expr(expr) => match &**expr {
                Expr::Ident(name) => Ok(&*name.sym),
                _ => Err(RewriteError::UnsupportedBinding(
                    "assignment to a non-identifier".to_string(),
                )),
            },
            _ => Err(RewriteError::UnsupportedBinding(
                "destructuring pattern".to_string(),
            )),
        },
        ForHead::UsingDecl(_) => Err(RewriteError::UnsupportedBinding(
            "`using` declaration".to_string(),
        )),
    }
}

/// `bound_name => value` or `bound_name => { ...preceding; return value; }`
fn map_function(idiom: &ExtractedIdiom<'_>) -> Expr {
    let body = if idiom.preceding.is_empty() {
        BlockStmtOrExpr::Expr(as_concise_body(idiom.value))
    } else {
        let mut stmts = idiom.preceding.to_vec();
        stmts.push(Stmt::Return(ReturnStmt {
            span: DUMMY_SP,
            arg: Some(Box::new(idiom.value.clone())),
        }));
        BlockStmtOrExpr::BlockStmt(BlockStmt {
            span: DUMMY_SP,
            ctxt: SyntaxContext::empty(),
            stmts,
        })
    };

    Expr::Arrow(ArrowExpr {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        params: vec![Pat::Ident(BindingIdent {
            id: ident(idiom.bound_name),
            type_ann: None,
        })],
        body: Box::new(body),
        is_async: false,
        is_generator: false,
        type_params: None,
        return_type: None,
    })
}

/// `receiver.method(arg)`
fn method_call(receiver: Box<Expr>, method: &str, arg: Expr) -> Expr {
    Expr::Call(CallExpr {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        callee: Callee::Expr(Box::new(Expr::Member(MemberExpr {
            span: DUMMY_SP,
            obj: receiver,
            prop: MemberProp::Ident(IdentName::new(method.into(), DUMMY_SP)),
        }))),
        args: vec![ExprOrSpread {
            spread: None,
            expr: Box::new(arg),
        }],
        type_args: None,
    })
}

fn ident(name: &str) -> Ident {
    Ident::new(name.into(), DUMMY_SP, SyntaxContext::empty())
}

fn parenthesized(expr: &Expr) -> Box<Expr> {
    Box::new(Expr::Paren(ParenExpr {
        span: DUMMY_SP,
        expr: Box::new(expr.clone()),
    }))
}

/// The iterated expression as the object of `.map`.
///
/// `for (x of a || b)` has no parentheses around `a || b`; they are needed
/// once it becomes a member access receiver.
fn as_receiver(source: &Expr) -> Box<Expr> {
    let binds_tight = match source {
        Expr::Ident(_)
        | Expr::This(_)
        | Expr::Member(_)
        | Expr::SuperProp(_)
        | Expr::Call(_)
        | Expr::Paren(_)
        | Expr::Array(_)
        | Expr::Object(_)
        | Expr::Tpl(_)
        | Expr::TaggedTpl(_) => true,
        Expr::Lit(Lit::Str(_)) => true,
        _ => false,
    };
    if binds_tight {
        Box::new(source.clone())
    } else {
        parenthesized(source)
    }
}

/// An arrow body starting with `{` would be read as a block
fn as_concise_body(value: &Expr) -> Box<Expr> {
    if matches!(value, Expr::Seq(_)) || starts_with_object(value) {
        parenthesized(value)
    } else {
        Box::new(value.clone())
    }
}

/// Whether the printed form of `expr` begins with an object literal, as in
/// `{ a: el }.a` or `{ ...el } as Item`
fn starts_with_object(expr: &Expr) -> bool {
    match expr {
        Expr::Object(_) => true,
        Expr::Member(member) => starts_with_object(&member.obj),
        Expr::Call(call) => match &call.callee {
            Callee::Expr(callee) => starts_with_object(callee),
            _ => false,
        },
        Expr::OptChain(chain) => match &*chain.base {
            OptChainBase::Member(member) => starts_with_object(&member.obj),
            OptChainBase::Call(call) => starts_with_object(&call.callee),
        },
        Expr::Bin(bin) => starts_with_object(&bin.left),
        Expr::Cond(cond) => starts_with_object(&cond.test),
        Expr::Seq(seq) => seq.exprs.first().is_some_and(|e| starts_with_object(e)),
        Expr::Assign(assign) => match &assign.left {
            AssignTarget::Simple(SimpleAssignTarget::Member(member)) => {
                starts_with_object(&member.obj)
            }
            AssignTarget::Pat(AssignTargetPat::Object(_)) => true,
            _ => false,
        },
        Expr::Update(update) => !update.prefix && starts_with_object(&update.arg),
        Expr::TaggedTpl(tagged) => starts_with_object(&tagged.tag),
        Expr::TsAs(ts_as) => starts_with_object(&ts_as.expr),
        Expr::TsSatisfies(ts_satisfies) => starts_with_object(&ts_satisfies.expr),
        Expr::TsNonNull(ts_non_null) => starts_with_object(&ts_non_null.expr),
        Expr::TsConstAssertion(ts_const) => starts_with_object(&ts_const.expr),
        Expr::TsInstantiation(ts_inst) => starts_with_object(&ts_inst.expr),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idiom::render::render_stmt;
    use crate::{parse_module, ParsedModule};
    use swc_core::ecma::ast::ModuleItem;
    use swc_core::ecma::visit::{Visit, VisitWith};

    /// Find the first `for ... of` loop, however deeply nested
    struct FirstLoop(Option<ForOfStmt>);

    impl Visit for FirstLoop {
        fn visit_for_of_stmt(&mut self, for_of: &ForOfStmt) {
            if self.0.is_none() {
                self.0 = Some(for_of.clone());
            }
        }
    }

    fn parse_loop(code: &str) -> (ParsedModule, ForOfStmt) {
        let parsed = parse_module("test.ts", code).unwrap();
        let mut finder = FirstLoop(None);
        parsed.module.visit_with(&mut finder);
        let for_of = finder.0.expect("code has no for-of loop");
        (parsed, for_of)
    }

    fn rewrite_code(code: &str, use_concat: bool) -> String {
        let (parsed, for_of) = parse_loop(code);
        let replacement = rewrite(&for_of, use_concat).unwrap();
        render_stmt(&parsed.source_map, None, &replacement).unwrap()
    }

    /// Print `code` (a single expression statement) the way replacements are printed
    fn normalized(code: &str) -> String {
        let parsed = parse_module("expected.ts", code).unwrap();
        let stmt = match &parsed.module.body[0] {
            ModuleItem::Stmt(Stmt::Expr(expr_stmt)) => expr_stmt.clone(),
            other => panic!("expected an expression statement, got {:?}", other),
        };
        render_stmt(&parsed.source_map, None, &stmt).unwrap()
    }

    #[test]
    fn test_concise_map() {
        let code = "for (let el of input()) { output.push(el*2); }";
        assert_eq!(
            rewrite_code(code, false),
            normalized("output = input().map(el => el*2);")
        );
    }

    #[test]
    fn test_concat_mode() {
        let code = "for (let el of input()) { output.push(el*2); }";
        assert_eq!(
            rewrite_code(code, true),
            normalized("output = output.concat(input().map(el => el*2));")
        );
    }

    #[test]
    fn test_block_body_keeps_preceding_statements() {
        let code = r#"
for (const el of arr) {
    const x = el + 1;
    const y = x * 2;
    output.push(y);
}
"#;
        assert_eq!(
            rewrite_code(code, false),
            normalized("output = arr.map(el => { const x = el + 1; const y = x * 2; return y; });")
        );
    }

    #[test]
    fn test_block_body_in_concat_mode() {
        let code = "for (const el of arr) { const x = f(el); output.push(x); }";
        assert_eq!(
            rewrite_code(code, true),
            normalized("output = output.concat(arr.map(el => { const x = f(el); return x; }));")
        );
    }

    #[test]
    fn test_single_statement_body() {
        let code = "for (const item of items) result.push(item.name);";
        assert_eq!(
            rewrite_code(code, false),
            normalized("result = items.map(item => item.name);")
        );
    }

    #[test]
    fn test_bare_identifier_binding() {
        let code = "let el; for (el of arr) { out.push(el + 1); }";
        assert_eq!(
            rewrite_code(code, false),
            normalized("out = arr.map(el => el + 1);")
        );
    }

    #[test]
    fn test_replacement_never_copies_push() {
        let code = "for (const el of arr) { log(el); output.push(el); }";
        let text = rewrite_code(code, false);
        assert!(!text.contains("push"));
        assert!(text.contains("return el"));
    }

    #[test]
    fn test_extract_parts() {
        let (_parsed, for_of) =
            parse_loop("for (const el of arr) { const x = el + 1; output.push(x); }");
        let idiom = extract(&for_of).unwrap();
        assert_eq!(idiom.bound_name, "el");
        assert_eq!(idiom.target, "output");
        assert_eq!(idiom.preceding.len(), 1);
        assert!(matches!(idiom.source, Expr::Ident(name) if &*name.sym == "arr"));
        assert!(matches!(idiom.value, Expr::Ident(name) if &*name.sym == "x"));
    }

    #[test]
    fn test_extra_push_arguments_are_ignored() {
        let (_parsed, for_of) = parse_loop("for (const el of arr) { output.push(el, 0); }");
        let idiom = extract(&for_of).unwrap();
        assert!(matches!(idiom.value, Expr::Ident(name) if &*name.sym == "el"));
    }

    #[test]
    fn test_rewrite_is_deterministic() {
        let (_parsed, for_of) =
            parse_loop("for (const el of arr) { const x = el + 1; output.push(x); }");
        assert_eq!(rewrite(&for_of, false).unwrap(), rewrite(&for_of, false).unwrap());
        assert_eq!(rewrite(&for_of, true).unwrap(), rewrite(&for_of, true).unwrap());
    }

    #[test]
    fn test_non_matching_loop_is_rejected() {
        let (_parsed, for_of) = parse_loop("for (const el of arr) { output.pop(); }");
        assert_eq!(rewrite(&for_of, false), Err(RewriteError::NotAnAppendLoop));

        let (_parsed, for_of) = parse_loop("for (const el of arr) {}");
        assert_eq!(rewrite(&for_of, false), Err(RewriteError::NotAnAppendLoop));
    }

    #[test]
    fn test_destructuring_is_unsupported() {
        let (_parsed, for_of) = parse_loop("for (const [k, v] of entries) { out.push(k); }");
        assert!(matches!(
            rewrite(&for_of, false),
            Err(RewriteError::UnsupportedBinding(_))
        ));
    }

    #[test]
    fn test_push_without_value() {
        let (_parsed, for_of) = parse_loop("for (const el of arr) { out.push(); }");
        assert_eq!(
            rewrite(&for_of, false),
            Err(RewriteError::MissingPushArgument {
                target: "out".to_string()
            })
        );
    }

    #[test]
    fn test_spread_push() {
        let (_parsed, for_of) = parse_loop("for (const el of arr) { out.push(...el); }");
        assert_eq!(
            rewrite(&for_of, false),
            Err(RewriteError::SpreadPushArgument {
                target: "out".to_string()
            })
        );
    }

    #[test]
    fn test_low_precedence_source_is_parenthesized() {
        let code = "for (const el of a || b) { out.push(el); }";
        assert_eq!(
            rewrite_code(code, false),
            normalized("out = (a || b).map(el => el);")
        );
    }

    #[test]
    fn test_object_literal_value_is_parenthesized() {
        let code = "for (const el of arr) { out.push({ id: el }); }";
        assert_eq!(
            rewrite_code(code, false),
            normalized("out = arr.map(el => ({ id: el }));")
        );
    }

    #[test]
    fn test_for_await_has_no_map_form() {
        let code = "async function f() { for await (const chunk of stream) { out.push(chunk); } }";
        let (_parsed, for_of) = parse_loop(code);
        assert_eq!(
            rewrite(&for_of, false),
            Err(RewriteError::AsyncIteration {
                target: "out".to_string()
            })
        );
    }

    #[test]
    fn test_value_starting_with_object_is_parenthesized() {
        let code = "for (const el of arr) { out.push({ a: el }.a); }";
        let text = rewrite_code(code, false);
        assert_eq!(text, normalized("out = arr.map(el => ({ a: el }.a));"));
        assert!(parse_module("fixed.ts", &text).is_ok());

        let code = "for (const el of arr) { out.push({ ...el }.id ? 1 : 0); }";
        let text = rewrite_code(code, false);
        assert_eq!(text, normalized("out = arr.map(el => ({ ...el }.id ? 1 : 0));"));
        assert!(parse_module("fixed.ts", &text).is_ok());

        let code = "for (const el of arr) { out.push({ id: el } as Item); }";
        let text = rewrite_code(code, false);
        assert_eq!(text, normalized("out = arr.map(el => ({ id: el } as Item));"));
        assert!(parse_module("fixed.ts", &text).is_ok());
    }

    #[test]
    fn test_starts_with_object() {
        fn assigned(code: &str) -> Expr {
            let parsed = parse_module("test.ts", code).unwrap();
            match &parsed.module.body[0] {
                ModuleItem::Stmt(Stmt::Expr(ExprStmt { expr, .. })) => match &**expr {
                    Expr::Assign(assign) => *assign.right.clone(),
                    other => panic!("expected an assignment, got {:?}", other),
                },
                other => panic!("expected an expression statement, got {:?}", other),
            }
        }

        assert!(starts_with_object(&assigned("x = { a: 1 }.a + 1")));
        assert!(starts_with_object(&assigned("x = { a: 1 }.f().g")));
        assert!(starts_with_object(&assigned("x = { a: 1 }?.a")));
        assert!(starts_with_object(&assigned("x = { a: 1 }.a ? 1 : 2")));
        assert!(!starts_with_object(&assigned("x = a + { b: 1 }.b")));
        assert!(!starts_with_object(&assigned("x = ({ a: 1 }).a")));
        assert!(!starts_with_object(&assigned("x = f({ a: 1 })")));
    }
}
