//! Print a replacement node back to source text

use crate::error::RenderError;
use swc_core::common::comments::{Comments, SingleThreadedComments};
use swc_core::common::{sync::Lrc, SourceMap, Span, DUMMY_SP};
use swc_core::ecma::ast::{ExprStmt, Module, ModuleItem, Stmt};
use swc_core::ecma::codegen::{text_writer::JsWriter, Config, Emitter};

/// Render a statement with the swc code generator.
///
/// `source_map` must be the map the statement's non-synthetic spans point
/// into, since literals without a raw form are looked up there. Comments in
/// `comments` are printed before the node whose span starts at their key.
pub fn render_stmt(
    source_map: &Lrc<SourceMap>,
    comments: Option<&dyn Comments>,
    stmt: &ExprStmt,
) -> Result<String, RenderError> {
    let module = Module {
        span: DUMMY_SP,
        body: vec![ModuleItem::Stmt(Stmt::Expr(stmt.clone()))],
        shebang: None,
    };

    let mut buf = Vec::new();
    {
        let mut emitter = Emitter {
            cfg: Config::default(),
            cm: source_map.clone(),
            comments,
            wr: JsWriter::new(source_map.clone(), "\n", &mut buf, None),
        };
        emitter.emit_module(&module)?;
    }

    let text = String::from_utf8(buf)?;
    Ok(text.trim_end().to_string())
}

/// The comments a rewrite of `region` can carry over.
///
/// Only comments leading a node inside one of the `kept` spans are printed
/// again. Returns `None` when `region` holds any other comment, which the
/// rewrite would lose. The result is a fresh store, since the emitter takes
/// comments out of the store it prints from.
pub fn carried_comments(
    comments: &SingleThreadedComments,
    region: Span,
    kept: &[Span],
) -> Option<SingleThreadedComments> {
    let inside = |span: Span| region.lo <= span.lo && span.hi <= region.hi;
    let (leading, trailing) = comments.borrow_all();

    if trailing.values().flatten().any(|c| inside(c.span)) {
        return None;
    }

    let carried = SingleThreadedComments::default();
    for (pos, attached) in leading.iter() {
        for comment in attached {
            if !inside(comment.span) {
                continue;
            }
            if !kept.iter().any(|span| span.lo <= *pos && *pos < span.hi) {
                return None;
            }
            carried.add_leading(*pos, comment.clone());
        }
    }

    Some(carried)
}

/// Indent every line after the first by `indent`.
///
/// The emitter starts at column zero; the first line takes the place of the
/// original loop, which already sits at its indentation.
pub fn indent_continuation(text: &str, indent: &str) -> String {
    if indent.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(indent);
            }
        }
        out.push_str(line);
    }
    out
}

/// Leading whitespace of the line containing byte `offset`
pub fn line_indent(source: &str, offset: usize) -> &str {
    let offset = offset.min(source.len());
    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line = &source[line_start..];
    let width = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..width]
}
