//! `stylescout render`: run markdown through the annotated renderer.

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use stylescout_markdown::{Renderer, render_document};
use tokio::io::AsyncReadExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Html,
    Json,
    Text,
}

pub async fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            tokio::io::stdin()
                .read_to_string(&mut input)
                .await
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

pub fn render(markdown: &str, format: OutputFormat) -> Result<String> {
    let document = render_document(markdown);
    Ok(match format {
        OutputFormat::Html => Renderer::to_html(&document),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&document)?;
            json.push('\n');
            json
        }
        OutputFormat::Text => Renderer::to_plain_text(&document),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn html_has_swatch() {
        let html = render("Brand #ff5500", OutputFormat::Html).unwrap();
        assert!(html.contains("background-color:#ff5500"));
    }

    #[test]
    fn text_drops_swatches() {
        let text = render("Brand #ff5500", OutputFormat::Text).unwrap();
        assert!(text.contains("Brand #ff5500"));
        assert!(!text.contains("swatch"));
    }

    #[test]
    fn json_is_a_node_array() {
        let json = render("# Title", OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.is_array());
    }

    #[tokio::test]
    async fn reads_file_input() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "rgb(1, 2, 3)").unwrap();
        let input = read_input(Some(file.path())).await.unwrap();
        assert_eq!(input, "rgb(1, 2, 3)");
    }
}
