//! Color Annotation Pass
//!
//! Depth-first rewrite of the parsed tree. Text directly inside paragraphs,
//! list items, strong spans and code without a language is split around
//! color literals; every other node passes through with its own text intact.

use crate::color::{TextSegment, split_colors};
use crate::ir::{IrParser, MarkdownNode};

/// Parses `markdown` and annotates every color literal in scope.
pub fn render_document(markdown: &str) -> Vec<MarkdownNode> {
    annotate(IrParser::parse(markdown))
}

/// Annotates an already-parsed tree.
pub fn annotate(nodes: Vec<MarkdownNode>) -> Vec<MarkdownNode> {
    nodes.into_iter().map(rewrite).collect()
}

fn rewrite(node: MarkdownNode) -> MarkdownNode {
    match node {
        MarkdownNode::Paragraph(_)
        | MarkdownNode::ListItem(_)
        | MarkdownNode::Strong(_)
        | MarkdownNode::Code(_)
        | MarkdownNode::CodeBlock(None, _) => node.map_children(annotate_children),
        other => other.map_children(annotate),
    }
}

fn annotate_children(children: Vec<MarkdownNode>) -> Vec<MarkdownNode> {
    let mut out = Vec::with_capacity(children.len());
    let mut run = TextRun::default();
    for child in children {
        match child {
            MarkdownNode::Text(text) => run.text.push_str(&text),
            MarkdownNode::SoftBreak => run.push_break(),
            other => {
                run.flush(&mut out);
                out.push(rewrite(other));
            }
        }
    }
    run.flush(&mut out);
    out
}

/// Consecutive text and soft breaks, scanned as one string so a literal
/// wrapped across lines still matches. Breaks are held as `\n` at the
/// recorded offsets.
#[derive(Default)]
struct TextRun {
    text: String,
    breaks: Vec<usize>,
}

impl TextRun {
    fn push_break(&mut self) {
        self.breaks.push(self.text.len());
        self.text.push('\n');
    }

    fn flush(&mut self, out: &mut Vec<MarkdownNode>) {
        let text = std::mem::take(&mut self.text);
        let breaks = std::mem::take(&mut self.breaks);
        if text.is_empty() {
            return;
        }
        let mut offset = 0;
        for segment in split_colors(&text) {
            match segment {
                TextSegment::Plain(plain) => {
                    push_plain(plain, offset, &breaks, out);
                    offset += plain.len();
                }
                TextSegment::Color(token) => {
                    offset += token.literal.len();
                    out.push(MarkdownNode::Color(token));
                }
            }
        }
    }
}

/// Emits `plain` (found at `offset` in the run), restoring soft breaks.
fn push_plain(plain: &str, offset: usize, breaks: &[usize], out: &mut Vec<MarkdownNode>) {
    let mut start = 0;
    for &at in breaks {
        if at < offset || at >= offset + plain.len() {
            continue;
        }
        let local = at - offset;
        if local > start {
            out.push(MarkdownNode::Text(plain[start..local].to_string()));
        }
        out.push(MarkdownNode::SoftBreak);
        start = local + 1;
    }
    if start < plain.len() {
        out.push(MarkdownNode::Text(plain[start..].to_string()));
    }
}
