//! Anki field HTML → Markdown.

use std::sync::LazyLock;

use htmd::{
    options::{
        BulletListMarker,
        CodeBlockStyle,
        HeadingStyle,
        Options,
    },
    HtmlToMarkdown,
};
use log::warn;
use regex::Regex;

static TRAILING_WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)[ \t]+$").unwrap());
static BLANK_LINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

fn converter() -> HtmlToMarkdown {
    HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "head"])
        .options(Options {
            heading_style: HeadingStyle::Atx,
            code_block_style: CodeBlockStyle::Fenced,
            bullet_list_marker: BulletListMarker::Dash,
            ..Default::default()
        })
        .build()
}

/// Convert a rich-text field value into the Markdown used in documents.
///
/// Hard breaks come out as plain newlines and blank-line runs collapse to one.
pub fn to_plain_text(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let markdown = match converter().convert(html) {
        Ok(markdown) => markdown,
        Err(e) => {
            warn!("Could not convert field HTML, keeping it verbatim: {}", e);
            html.to_string()
        }
    };

    let text = TRAILING_WS_RE.replace_all(&markdown, "");
    let text = BLANK_LINES_RE.replace_all(&text, "\n\n");
    text.trim().to_string()
}
