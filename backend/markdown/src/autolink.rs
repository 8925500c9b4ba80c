//! GFM Autolink Literals
//!
//! pulldown-cmark only links `<...>` autolinks. This pass turns bare
//! `www.`, `http(s)://` and email literals in text into links, skipping
//! text already inside links, images, code and raw HTML.

use regex::Regex;
use std::sync::LazyLock;

use crate::ir::MarkdownNode;

static LITERAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:https?://|www\.)[^\s<]+|[a-z0-9.+_-]+@[a-z0-9_-]+(?:\.[a-z0-9_-]+)+")
        .unwrap()
});

/// Rewrites literal URLs and emails in `nodes` into `Link` nodes.
pub fn link_literals(nodes: Vec<MarkdownNode>) -> Vec<MarkdownNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            MarkdownNode::Text(text) => out.extend(split_literals(text)),
            MarkdownNode::Link(..)
            | MarkdownNode::Image(..)
            | MarkdownNode::Code(_)
            | MarkdownNode::CodeBlock(..)
            | MarkdownNode::Html(_) => out.push(node),
            other => out.push(other.map_children(link_literals)),
        }
    }
    out
}

fn split_literals(text: String) -> Vec<MarkdownNode> {
    let mut out = Vec::new();
    let mut last = 0;
    for m in LITERAL_RE.find_iter(&text) {
        let Some((len, href)) = literal_link(&text[..m.start()], m.as_str()) else {
            continue;
        };
        if m.start() > last {
            out.push(MarkdownNode::Text(text[last..m.start()].to_string()));
        }
        let end = m.start() + len;
        out.push(MarkdownNode::Link(
            href,
            vec![MarkdownNode::Text(text[m.start()..end].to_string())],
        ));
        last = end;
    }
    if out.is_empty() {
        return vec![MarkdownNode::Text(text)];
    }
    if last < text.len() {
        out.push(MarkdownNode::Text(text[last..].to_string()));
    }
    out
}

/// Length of the linked part of `candidate` and its href, or `None` when
/// the candidate is not a valid literal.
fn literal_link(before: &str, candidate: &str) -> Option<(usize, String)> {
    let lower = candidate.to_ascii_lowercase();
    let scheme_len = ["http://", "https://"]
        .iter()
        .find(|scheme| lower.starts_with(**scheme))
        .map(|scheme| scheme.len());

    if scheme_len.is_none() && !lower.starts_with("www.") {
        if candidate.ends_with(['-', '_']) {
            return None;
        }
        return Some((candidate.len(), format!("mailto:{candidate}")));
    }

    // URL literals start a word or follow `*`, `_`, `~` or `(`.
    if before
        .chars()
        .last()
        .is_some_and(|c| !(c.is_whitespace() || matches!(c, '*' | '_' | '~' | '(')))
    {
        return None;
    }

    let len = trim_trailing(candidate);
    let literal = &candidate[..len];
    let host = literal[scheme_len.unwrap_or(0)..]
        .split(['/', '?', '#', ':'])
        .next()
        .unwrap_or("");
    if !host.contains('.') || host.ends_with('.') {
        return None;
    }
    let href = match scheme_len {
        Some(_) => literal.to_string(),
        None => format!("http://{literal}"),
    };
    Some((len, href))
}

/// Drops trailing punctuation, unbalanced closing parens and a trailing
/// entity reference.
fn trim_trailing(candidate: &str) -> usize {
    let mut end = candidate.len();
    loop {
        let s = &candidate[..end];
        match s.chars().last() {
            Some('?' | '!' | '.' | ',' | ':' | '*' | '_' | '~') => end -= 1,
            Some(')') if s.matches(')').count() > s.matches('(').count() => end -= 1,
            Some(';') => match s.rfind('&') {
                Some(amp)
                    if amp + 1 < end - 1
                        && s[amp + 1..end - 1].chars().all(|c| c.is_ascii_alphanumeric()) =>
                {
                    end = amp
                }
                _ => break,
            },
            _ => break,
        }
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::IrParser;

    fn text(s: &str) -> MarkdownNode {
        MarkdownNode::Text(s.into())
    }

    fn link(href: &str, label: &str) -> MarkdownNode {
        MarkdownNode::Link(href.into(), vec![text(label)])
    }

    #[test]
    fn links_www_and_scheme_literals() {
        let nodes = IrParser::parse("Visit www.example.com. Or https://x.test/a_(b)) now");
        assert_eq!(
            nodes,
            vec![MarkdownNode::Paragraph(vec![
                text("Visit "),
                link("http://www.example.com", "www.example.com"),
                text(". Or "),
                link("https://x.test/a_(b)", "https://x.test/a_(b)"),
                text(") now"),
            ])]
        );
    }

    #[test]
    fn links_emails() {
        let nodes = IrParser::parse("Write to hi@example.com today");
        assert_eq!(
            nodes,
            vec![MarkdownNode::Paragraph(vec![
                text("Write to "),
                link("mailto:hi@example.com", "hi@example.com"),
                text(" today"),
            ])]
        );
    }

    #[test]
    fn leaves_code_links_and_non_literals_alone() {
        let nodes = IrParser::parse("`https://a.test` [b](https://b.test) xhttps://c.test http://localhost:3000");
        let MarkdownNode::Paragraph(children) = &nodes[0] else {
            panic!("expected paragraph");
        };
        let links: Vec<_> = children
            .iter()
            .filter(|n| matches!(n, MarkdownNode::Link(..)))
            .collect();
        assert_eq!(links, vec![&link("https://b.test", "b")]);
    }

    #[test]
    fn trims_trailing_entity() {
        assert_eq!(trim_trailing("www.x.test&amp;"), "www.x.test".len());
        assert_eq!(trim_trailing("www.x.test/?q=1"), "www.x.test/?q=1".len());
    }
}
