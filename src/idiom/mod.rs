//! The push-accumulating `for ... of` idiom
//!
//! ```js
//! for (const el of input) {
//!     const x = el * 2;
//!     output.push(x);
//! }
//! ```
//!
//! is recognized by [`matcher`], taken apart and rebuilt as
//!
//! ```js
//! output = input.map(el => {
//!     const x = el * 2;
//!     return x;
//! });
//! ```
//!
//! by [`rewriter`], and printed back to source text by [`render`].

pub mod matcher;
pub mod render;
pub mod rewriter;

pub use matcher::{as_append_call, matches, AppendCall};
pub use render::render_stmt;
pub use rewriter::{extract, rewrite, ExtractedIdiom};
