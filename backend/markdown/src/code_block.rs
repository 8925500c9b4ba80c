//! Code Block Semantic Utility
//!
//! Resolves the language of fenced blocks and collects code from a tree.

use pulldown_cmark::CodeBlockKind;

use crate::ir::MarkdownNode;
use crate::renderer::Renderer;

pub struct CodeBlockAnalyzer;

impl CodeBlockAnalyzer {
    /// Language named by a fence's info string: its first word.
    /// Indented blocks and bare fences have none.
    pub fn language(kind: &CodeBlockKind<'_>) -> Option<String> {
        match kind {
            CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_string),
            CodeBlockKind::Indented => None,
        }
    }

    /// Extracts every code block in the tree as `(language, source)`,
    /// depth-first.
    pub fn extract_blocks(nodes: &[MarkdownNode]) -> Vec<(Option<String>, String)> {
        let mut blocks = Vec::new();
        collect_blocks(nodes, &mut blocks);
        blocks
    }
}

fn collect_blocks(nodes: &[MarkdownNode], blocks: &mut Vec<(Option<String>, String)>) {
    for node in nodes {
        match node {
            MarkdownNode::CodeBlock(lang, content) => {
                blocks.push((lang.clone(), Renderer::text_content(content)));
            }
            other => {
                if let Some(children) = other.children() {
                    collect_blocks(children, blocks);
                }
            }
        }
    }
}
