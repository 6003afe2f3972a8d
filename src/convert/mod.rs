//! Conversion between Anki field HTML and document Markdown.
//!
//! The two directions are not exact inverses. Headings, line breaks, fenced
//! code, tables and lists keep their structure across a round trip; anything
//! else may degrade.

mod html_to_md;
mod md_to_html;

pub use html_to_md::to_plain_text;
pub use md_to_html::to_rich_text;
