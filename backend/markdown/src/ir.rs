//! Markdown Intermediate Representation
//!
//! Parses GitHub-flavored markdown into a strongly-typed tree that the
//! color annotation pass and the renderers walk.

use pulldown_cmark::{Alignment, Event, Options, Parser, Tag};
use serde::{Deserialize, Serialize};

use crate::autolink::link_literals;
use crate::code_block::CodeBlockAnalyzer;
use crate::color::ColorToken;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColumnAlign {
    None,
    Left,
    Center,
    Right,
}

impl From<Alignment> for ColumnAlign {
    fn from(align: Alignment) -> Self {
        match align {
            Alignment::None => ColumnAlign::None,
            Alignment::Left => ColumnAlign::Left,
            Alignment::Center => ColumnAlign::Center,
            Alignment::Right => ColumnAlign::Right,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum MarkdownNode {
    Heading(u32, Vec<MarkdownNode>),
    Paragraph(Vec<MarkdownNode>),
    Text(String),
    /// A color literal paired with its swatch fill.
    Color(ColorToken),
    /// Inline code span.
    Code(Vec<MarkdownNode>),
    CodeBlock(Option<String>, Vec<MarkdownNode>), // language, content
    List(Option<u64>, Vec<MarkdownNode>),          // start number for ordered lists
    ListItem(Vec<MarkdownNode>),
    TaskMarker(bool),
    Blockquote(Vec<MarkdownNode>),
    Emphasis(Vec<MarkdownNode>),
    Strong(Vec<MarkdownNode>),
    Strikethrough(Vec<MarkdownNode>),
    Link(String, Vec<MarkdownNode>), // url, content
    Image(String, String),           // url, alt_text
    Table(Vec<ColumnAlign>, Vec<MarkdownNode>),
    TableHead(Vec<MarkdownNode>),
    TableRow(Vec<MarkdownNode>),
    TableCell(Vec<MarkdownNode>),
    Html(String),
    FootnoteReference(String),
    FootnoteDefinition(String, Vec<MarkdownNode>),
    SoftBreak,
    HardBreak,
    Rule,
}

impl MarkdownNode {
    /// Child nodes of a container, `None` for leaves.
    pub fn children(&self) -> Option<&[MarkdownNode]> {
        match self {
            MarkdownNode::Heading(_, c)
            | MarkdownNode::Paragraph(c)
            | MarkdownNode::Code(c)
            | MarkdownNode::CodeBlock(_, c)
            | MarkdownNode::List(_, c)
            | MarkdownNode::ListItem(c)
            | MarkdownNode::Blockquote(c)
            | MarkdownNode::Emphasis(c)
            | MarkdownNode::Strong(c)
            | MarkdownNode::Strikethrough(c)
            | MarkdownNode::Link(_, c)
            | MarkdownNode::Table(_, c)
            | MarkdownNode::TableHead(c)
            | MarkdownNode::TableRow(c)
            | MarkdownNode::TableCell(c)
            | MarkdownNode::FootnoteDefinition(_, c) => Some(c),
            _ => None,
        }
    }

    /// Rebuilds a container with `f` applied to its children list.
    /// Leaves are returned as-is.
    pub fn map_children<F>(self, f: F) -> MarkdownNode
    where
        F: FnOnce(Vec<MarkdownNode>) -> Vec<MarkdownNode>,
    {
        match self {
            MarkdownNode::Heading(level, c) => MarkdownNode::Heading(level, f(c)),
            MarkdownNode::Paragraph(c) => MarkdownNode::Paragraph(f(c)),
            MarkdownNode::Code(c) => MarkdownNode::Code(f(c)),
            MarkdownNode::CodeBlock(lang, c) => MarkdownNode::CodeBlock(lang, f(c)),
            MarkdownNode::List(start, c) => MarkdownNode::List(start, f(c)),
            MarkdownNode::ListItem(c) => MarkdownNode::ListItem(f(c)),
            MarkdownNode::Blockquote(c) => MarkdownNode::Blockquote(f(c)),
            MarkdownNode::Emphasis(c) => MarkdownNode::Emphasis(f(c)),
            MarkdownNode::Strong(c) => MarkdownNode::Strong(f(c)),
            MarkdownNode::Strikethrough(c) => MarkdownNode::Strikethrough(f(c)),
            MarkdownNode::Link(url, c) => MarkdownNode::Link(url, f(c)),
            MarkdownNode::Table(aligns, c) => MarkdownNode::Table(aligns, f(c)),
            MarkdownNode::TableHead(c) => MarkdownNode::TableHead(f(c)),
            MarkdownNode::TableRow(c) => MarkdownNode::TableRow(f(c)),
            MarkdownNode::TableCell(c) => MarkdownNode::TableCell(f(c)),
            MarkdownNode::FootnoteDefinition(label, c) => {
                MarkdownNode::FootnoteDefinition(label, f(c))
            }
            leaf => leaf,
        }
    }
}

/// Parser options matching GitHub-flavored markdown.
pub fn gfm_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options
}

pub struct IrParser;

impl IrParser {
    /// Tokenizes standard GFM markdown into the intermediate representation,
    /// including autolink literals. No color annotation happens here.
    pub fn parse(markdown: &str) -> Vec<MarkdownNode> {
        let mut builder = TreeBuilder::default();
        for event in Parser::new_ext(markdown, gfm_options()) {
            builder.push(event);
        }
        link_literals(builder.finish())
    }
}

/// Folds the flat pulldown-cmark event stream into nested nodes.
#[derive(Default)]
struct TreeBuilder<'a> {
    root: Vec<MarkdownNode>,
    stack: Vec<(Tag<'a>, Vec<MarkdownNode>)>,
}

impl<'a> TreeBuilder<'a> {
    fn current(&mut self) -> &mut Vec<MarkdownNode> {
        match self.stack.last_mut() {
            Some((_, children)) => children,
            None => &mut self.root,
        }
    }

    fn push(&mut self, event: Event<'a>) {
        match event {
            Event::Start(tag) => self.stack.push((tag, Vec::new())),
            Event::End(_) => {
                if let Some((tag, children)) = self.stack.pop() {
                    let node = close_tag(tag, children);
                    self.current().push(node);
                }
            }
            Event::Text(text) => self.push_text(&text),
            Event::Code(code) => {
                let node = MarkdownNode::Code(vec![MarkdownNode::Text(code.to_string())]);
                self.current().push(node);
            }
            Event::Html(html) => self.current().push(MarkdownNode::Html(html.to_string())),
            Event::FootnoteReference(label) => {
                self.current().push(MarkdownNode::FootnoteReference(label.to_string()))
            }
            Event::SoftBreak => self.current().push(MarkdownNode::SoftBreak),
            Event::HardBreak => self.current().push(MarkdownNode::HardBreak),
            Event::Rule => self.current().push(MarkdownNode::Rule),
            Event::TaskListMarker(checked) => {
                self.current().push(MarkdownNode::TaskMarker(checked))
            }
        }
    }

    /// The parser may split one run of text across several events
    /// (entities, escapes, brackets). Adjacent runs are merged.
    fn push_text(&mut self, text: &str) {
        let children = self.current();
        if let Some(MarkdownNode::Text(last)) = children.last_mut() {
            last.push_str(text);
        } else {
            children.push(MarkdownNode::Text(text.to_string()));
        }
    }

    fn finish(mut self) -> Vec<MarkdownNode> {
        // Close anything left open.
        while let Some((tag, children)) = self.stack.pop() {
            let node = close_tag(tag, children);
            self.current().push(node);
        }
        self.root
    }
}

fn close_tag(tag: Tag<'_>, children: Vec<MarkdownNode>) -> MarkdownNode {
    match tag {
        Tag::Paragraph => MarkdownNode::Paragraph(children),
        Tag::Heading(level, _, _) => MarkdownNode::Heading(level as u32, children),
        Tag::BlockQuote => MarkdownNode::Blockquote(children),
        Tag::CodeBlock(kind) => MarkdownNode::CodeBlock(CodeBlockAnalyzer::language(&kind), children),
        Tag::List(start) => MarkdownNode::List(start, children),
        Tag::Item => MarkdownNode::ListItem(children),
        Tag::FootnoteDefinition(label) => MarkdownNode::FootnoteDefinition(label.to_string(), children),
        Tag::Table(aligns) => {
            MarkdownNode::Table(aligns.into_iter().map(ColumnAlign::from).collect(), children)
        }
        Tag::TableHead => MarkdownNode::TableHead(children),
        Tag::TableRow => MarkdownNode::TableRow(children),
        Tag::TableCell => MarkdownNode::TableCell(children),
        Tag::Emphasis => MarkdownNode::Emphasis(children),
        Tag::Strong => MarkdownNode::Strong(children),
        Tag::Strikethrough => MarkdownNode::Strikethrough(children),
        Tag::Link(_, url, _) => MarkdownNode::Link(url.to_string(), children),
        Tag::Image(_, url, _) => {
            MarkdownNode::Image(url.to_string(), crate::renderer::Renderer::text_content(&children))
        }
    }
}
