//! Renderers for the Markdown IR
//!
//! Transforms the tree into GFM-equivalent HTML (with color badges) or
//! plain text.

use crate::color::ColorToken;
use crate::ir::{ColumnAlign, MarkdownNode};

pub struct Renderer;

impl Renderer {
    /// Concatenated literal text of a subtree. Swatches contribute nothing;
    /// a color unit contributes its literal.
    pub fn text_content(nodes: &[MarkdownNode]) -> String {
        let mut output = String::new();
        push_text_content(nodes, &mut output);
        output
    }

    /// Renders to plain text, one line per block, stripping all formatting.
    pub fn to_plain_text(nodes: &[MarkdownNode]) -> String {
        let mut output = String::new();
        for node in nodes {
            match node {
                MarkdownNode::Text(text) => output.push_str(text),
                MarkdownNode::Color(token) => output.push_str(&token.literal),
                MarkdownNode::Image(_, alt) => output.push_str(alt),
                MarkdownNode::FootnoteReference(label) => {
                    output.push_str(&format!("[{label}]"));
                }
                MarkdownNode::SoftBreak => output.push(' '),
                MarkdownNode::HardBreak => output.push('\n'),
                MarkdownNode::Rule => output.push_str("---\n"),
                MarkdownNode::TaskMarker(checked) => {
                    output.push_str(if *checked { "[x] " } else { "[ ] " });
                }
                MarkdownNode::Heading(_, children)
                | MarkdownNode::Paragraph(children)
                | MarkdownNode::ListItem(children)
                | MarkdownNode::TableHead(children)
                | MarkdownNode::TableRow(children) => {
                    output.push_str(&Self::to_plain_text(children));
                    if !output.ends_with('\n') {
                        output.push('\n');
                    }
                }
                MarkdownNode::TableCell(children) => {
                    output.push_str(&Self::to_plain_text(children));
                    output.push('\t');
                }
                MarkdownNode::CodeBlock(_, children) => {
                    output.push_str(&Self::text_content(children));
                }
                MarkdownNode::Html(_) => {}
                other => {
                    if let Some(children) = other.children() {
                        output.push_str(&Self::to_plain_text(children));
                    }
                }
            }
        }
        output
    }

    /// Renders to HTML the way a GFM renderer would, with every color unit
    /// emitted as a badge holding a swatch and the literal.
    pub fn to_html(nodes: &[MarkdownNode]) -> String {
        let mut output = String::new();
        push_html(nodes, &mut output);
        output
    }
}

fn push_text_content(nodes: &[MarkdownNode], out: &mut String) {
    for node in nodes {
        match node {
            MarkdownNode::Text(text) => out.push_str(text),
            MarkdownNode::Color(token) => out.push_str(&token.literal),
            other => {
                if let Some(children) = other.children() {
                    push_text_content(children, out);
                }
            }
        }
    }
}

fn push_html(nodes: &[MarkdownNode], out: &mut String) {
    for node in nodes {
        match node {
            MarkdownNode::Text(text) => escape_html(out, text),
            MarkdownNode::Color(token) => push_color_badge(token, out),
            MarkdownNode::Heading(level, children) => {
                out.push_str(&format!("<h{level}>"));
                push_html(children, out);
                out.push_str(&format!("</h{level}>\n"));
            }
            MarkdownNode::Paragraph(children) => wrap("p", children, out),
            MarkdownNode::Code(children) => wrap("code", children, out),
            MarkdownNode::CodeBlock(lang, children) => {
                match lang {
                    Some(lang) => {
                        out.push_str("<pre><code class=\"language-");
                        escape_html(out, lang);
                        out.push_str("\">");
                    }
                    None => out.push_str("<pre><code>"),
                }
                push_html(children, out);
                out.push_str("</code></pre>\n");
            }
            MarkdownNode::List(start, items) => {
                let tag = match start {
                    Some(1) => {
                        out.push_str("<ol>\n");
                        "ol"
                    }
                    Some(n) => {
                        out.push_str(&format!("<ol start=\"{n}\">\n"));
                        "ol"
                    }
                    None => {
                        out.push_str("<ul>\n");
                        "ul"
                    }
                };
                push_html(items, out);
                out.push_str(&format!("</{tag}>\n"));
            }
            MarkdownNode::ListItem(children) => {
                out.push_str("<li>");
                push_html(children, out);
                out.push_str("</li>\n");
            }
            MarkdownNode::TaskMarker(checked) => {
                out.push_str("<input disabled=\"\" type=\"checkbox\"");
                if *checked {
                    out.push_str(" checked=\"\"");
                }
                out.push_str("/>\n");
            }
            MarkdownNode::Blockquote(children) => {
                out.push_str("<blockquote>\n");
                push_html(children, out);
                out.push_str("</blockquote>\n");
            }
            MarkdownNode::Emphasis(children) => wrap("em", children, out),
            MarkdownNode::Strong(children) => wrap("strong", children, out),
            MarkdownNode::Strikethrough(children) => wrap("del", children, out),
            MarkdownNode::Link(url, children) => {
                out.push_str("<a href=\"");
                escape_html(out, safe_url(url));
                out.push_str("\">");
                push_html(children, out);
                out.push_str("</a>");
            }
            MarkdownNode::Image(url, alt) => {
                out.push_str("<img src=\"");
                escape_html(out, safe_url(url));
                out.push_str("\" alt=\"");
                escape_html(out, alt);
                out.push_str("\" />");
            }
            MarkdownNode::Table(aligns, rows) => push_table(aligns, rows, out),
            // Rows and cells are only meaningful inside a table.
            MarkdownNode::TableHead(cells) | MarkdownNode::TableRow(cells) => {
                push_row(cells, "td", &[], out)
            }
            MarkdownNode::TableCell(children) => wrap("td", children, out),
            // Raw HTML is shown as text, never interpreted.
            MarkdownNode::Html(raw) => escape_html(out, raw),
            MarkdownNode::FootnoteReference(label) => {
                out.push_str("<sup class=\"footnote-reference\"><a href=\"#");
                escape_html(out, label);
                out.push_str("\">");
                escape_html(out, label);
                out.push_str("</a></sup>");
            }
            MarkdownNode::FootnoteDefinition(label, children) => {
                out.push_str("<div class=\"footnote-definition\" id=\"");
                escape_html(out, label);
                out.push_str("\"><sup class=\"footnote-definition-label\">");
                escape_html(out, label);
                out.push_str("</sup>\n");
                push_html(children, out);
                out.push_str("</div>\n");
            }
            MarkdownNode::SoftBreak => out.push('\n'),
            MarkdownNode::HardBreak => out.push_str("<br />\n"),
            MarkdownNode::Rule => out.push_str("<hr />\n"),
        }
    }
}

fn wrap(tag: &str, children: &[MarkdownNode], out: &mut String) {
    out.push_str(&format!("<{tag}>"));
    push_html(children, out);
    out.push_str(&format!("</{tag}>"));
    if tag == "p" {
        out.push('\n');
    }
}

fn push_color_badge(token: &ColorToken, out: &mut String) {
    out.push_str("<span class=\"color-code\"><span class=\"color-swatch\" style=\"background-color:");
    escape_html(out, &token.fill);
    out.push_str("\"></span>");
    escape_html(out, &token.literal);
    out.push_str("</span>");
}

fn push_table(aligns: &[ColumnAlign], rows: &[MarkdownNode], out: &mut String) {
    out.push_str("<table>");
    let mut body_open = false;
    for row in rows {
        match row {
            MarkdownNode::TableHead(cells) => {
                out.push_str("<thead>");
                push_row(cells, "th", aligns, out);
                out.push_str("</thead>\n");
            }
            MarkdownNode::TableRow(cells) => {
                if !body_open {
                    out.push_str("<tbody>\n");
                    body_open = true;
                }
                push_row(cells, "td", aligns, out);
            }
            other => push_html(std::slice::from_ref(other), out),
        }
    }
    if body_open {
        out.push_str("</tbody>");
    }
    out.push_str("</table>\n");
}

fn push_row(cells: &[MarkdownNode], cell_tag: &str, aligns: &[ColumnAlign], out: &mut String) {
    out.push_str("<tr>");
    for (i, cell) in cells.iter().enumerate() {
        let children = cell.children().unwrap_or_default();
        let style = match aligns.get(i) {
            Some(ColumnAlign::Left) => " style=\"text-align: left\"",
            Some(ColumnAlign::Center) => " style=\"text-align: center\"",
            Some(ColumnAlign::Right) => " style=\"text-align: right\"",
            _ => "",
        };
        out.push_str(&format!("<{cell_tag}{style}>"));
        push_html(children, out);
        out.push_str(&format!("</{cell_tag}>"));
    }
    out.push_str("</tr>\n");
}

/// URL schemes that survive into `href` and `src`.
const SAFE_PROTOCOLS: &[&str] = &["http", "https", "mailto", "irc", "ircs", "xmpp"];

/// Relative URLs and URLs with a safe scheme pass through; anything else
/// (`javascript:`, `data:`, ...) becomes empty.
fn safe_url(url: &str) -> &str {
    let Some(colon) = url.find(':') else {
        return url;
    };
    // A colon after the first path, query or fragment delimiter is not a scheme.
    if url.find(['/', '?', '#']).is_some_and(|delim| delim < colon) {
        return url;
    }
    let scheme = &url[..colon];
    if SAFE_PROTOCOLS.iter().any(|p| p.eq_ignore_ascii_case(scheme)) {
        url
    } else {
        ""
    }
}

fn escape_html(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::render_document;
    use crate::ir::IrParser;

    #[test]
    fn renders_color_badge() {
        let html = Renderer::to_html(&render_document("Accent #f60 here"));
        assert_eq!(
            html,
            "<p>Accent <span class=\"color-code\"><span class=\"color-swatch\" \
             style=\"background-color:#ff6600\"></span>#f60</span> here</p>\n"
        );
    }

    #[test]
    fn renders_plain_gfm() {
        let html = Renderer::to_html(&IrParser::parse("# Hi\n\n- a\n- **b**\n\n~~old~~"));
        assert_eq!(
            html,
            "<h1>Hi</h1>\n<ul>\n<li>a</li>\n<li><strong>b</strong></li>\n</ul>\n<p><del>old</del></p>\n"
        );
    }

    #[test]
    fn escapes_text_and_attributes() {
        let html = Renderer::to_html(&IrParser::parse("[a & b](https://x.test/?a=1&b=2)"));
        assert_eq!(html, "<p><a href=\"https://x.test/?a=1&amp;b=2\">a &amp; b</a></p>\n");

        let html = Renderer::to_html(&IrParser::parse("`<div>` & more"));
        assert_eq!(html, "<p><code>&lt;div&gt;</code> &amp; more</p>\n");
    }

    #[test]
    fn raw_html_is_escaped() {
        let html = Renderer::to_html(&render_document(
            "Hi <img src=x onerror=alert(1)>\n\n<script>alert(1)</script>\n",
        ));
        assert!(!html.contains("<img"));
        assert!(!html.contains("<script"));
        assert!(html.contains("<p>Hi &lt;img src=x onerror=alert(1)&gt;</p>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn unsafe_link_targets_are_emptied() {
        let html = Renderer::to_html(&render_document("[x](javascript:alert(1)) ![i](data:image/png;base64,AA)"));
        assert_eq!(html, "<p><a href=\"\">x</a> <img src=\"\" alt=\"i\" /></p>\n");

        let html = Renderer::to_html(&render_document("[a](/docs?x=a:b) [m](MAILTO:me@x.test) [h](HTTPS://x.test)"));
        assert!(html.contains("href=\"/docs?x=a:b\""));
        assert!(html.contains("href=\"MAILTO:me@x.test\""));
        assert!(html.contains("href=\"HTTPS://x.test\""));
    }

    #[test]
    fn renders_table_with_alignment() {
        let html = Renderer::to_html(&render_document("| name | hex |\n|:-----|----:|\n| bg | #fff |\n"));
        assert!(html.starts_with("<table><thead><tr><th style=\"text-align: left\">name</th>"));
        assert!(html.contains("<tbody>\n<tr><td style=\"text-align: left\">bg</td>"));
        // Table cells are outside the annotation scope.
        assert!(!html.contains("color-swatch"));
    }

    #[test]
    fn fenced_code_keeps_language_class() {
        let html = Renderer::to_html(&render_document("```css\na { color: #fff; }\n```"));
        assert_eq!(
            html,
            "<pre><code class=\"language-css\">a { color: #fff; }\n</code></pre>\n"
        );
    }

    #[test]
    fn plain_text_uses_literals() {
        let text = Renderer::to_plain_text(&render_document("# Colors\n\nPrimary **#111111** and rgb(1, 2, 3)"));
        assert_eq!(text, "Colors\nPrimary #111111 and rgb(1, 2, 3)\n");
    }
}
