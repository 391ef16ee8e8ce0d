//! Error types for the idiom rewriter and renderer

use thiserror::Error;

/// Reasons a loop cannot be rewritten into a map expression.
///
/// `NotAnAppendLoop` is a caller bug: the rewriter was invoked on a loop the
/// matcher rejects. The other variants describe loops the matcher accepts but
/// whose parts have no faithful map form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RewriteError {
    #[error("loop body does not end with `<identifier>.push(<value>)`")]
    NotAnAppendLoop,

    #[error("loop binding is not a single identifier: {0}")]
    UnsupportedBinding(String),

    #[error("`{target}.push()` is called without a value")]
    MissingPushArgument { target: String },

    #[error("`{target}.push(...)` spreads its argument")]
    SpreadPushArgument { target: String },

    #[error("`for await` fills `{target}` asynchronously, `map` would not await")]
    AsyncIteration { target: String },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to emit code: {0}")]
    Emit(#[from] std::io::Error),

    #[error("emitted code is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A syntax error reported by the parser
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} (line {line})")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
}
