//! Document Markdown → Anki field HTML.
//!
//! CommonMark with pipe tables. Every newline inside a paragraph is a hard
//! break, since Anki shows fields as typed.

use pulldown_cmark::{
    html,
    Event,
    Options,
    Parser,
};

fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH
}

/// Convert document Markdown into HTML suitable for an Anki field.
pub fn to_rich_text(markdown: &str) -> String {
    if markdown.trim().is_empty() {
        return String::new();
    }

    let events = Parser::new_ext(markdown, options()).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out.trim_end().to_string()
}
