//! Annotated Markdown Renderer
//!
//! Parses GFM into a typed tree, pairs every color literal found in
//! paragraphs, list items, strong spans and untagged code with a swatch,
//! and renders the result to HTML or plain text.

pub mod annotate;
pub mod autolink;
pub mod code_block;
pub mod color;
pub mod ir;
pub mod renderer;

pub use annotate::{annotate, render_document};
pub use autolink::link_literals;
pub use code_block::CodeBlockAnalyzer;
pub use color::{
    ColorKind, ColorMatch, ColorToken, TextSegment, find_color_tokens, normalize_hex, split_colors,
};
pub use ir::{ColumnAlign, IrParser, MarkdownNode};
pub use renderer::Renderer;
