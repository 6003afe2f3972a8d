//! Encode notes as Markdown documents with a frontmatter header, and decode
//! them back.
//!
//! The on-disk layout is the durable contract with the vault:
//!
//! ```text
//! ---
//! type: AnkiCards
//! title: Capital of France
//! date: 2024-05-01
//! tags:
//!   - geo/europe
//! id: 42
//! ---
//!
//! # Card: Capital of France
//!
//! ## Question
//! Capital of France
//!
//! ## Answer
//! Paris
//! ```
//!
//! All structural parsing lives here so the rest of the crate only sees
//! [`DecodedDocument`].

use std::sync::LazyLock;

use chrono::{
    Local,
    NaiveDate,
};
use log::warn;
use regex::Regex;

use crate::{
    anki::{
        Note,
        NoteId,
    },
    convert::to_plain_text,
};

pub mod title;

pub use title::{
    derive_title,
    document_filename,
    title_or_fallback,
};

pub const DOCUMENT_TYPE: &str = "AnkiCards";
/// `id` value left in hand-written templates.
pub const TEMPLATE_PLACEHOLDER: &str = "id番号";
/// `id` value for a card drafted in the vault.
pub const NEW_CARD_PLACEHOLDER: &str = "新規カード";

const REMOTE_TAG_SEPARATOR: &str = "::";
const LOCAL_TAG_SEPARATOR: &str = "/";

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A---\s*\n(.*?)\n---").unwrap());
static TAG_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s+(.+?)\s*$").unwrap());
static QUESTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)## Question\s*\n(.*?)\n## Answer").unwrap());
static ANSWER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)## Answer\s*\n(.*)").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub struct EncodedDocument {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedDocument {
    /// `None` for drafts that are not bound to a note yet
    pub id: Option<NoteId>,
    /// Anki form, `Parent::Child`
    pub tags: Vec<String>,
    pub front: String,
    pub back: String,
}

pub fn is_placeholder(value: &str) -> bool {
    value.is_empty() || value == TEMPLATE_PLACEHOLDER || value == NEW_CARD_PLACEHOLDER
}

pub fn to_local_tag(tag: &str) -> String {
    tag.replace(REMOTE_TAG_SEPARATOR, LOCAL_TAG_SEPARATOR)
}

pub fn to_remote_tag(tag: &str) -> String {
    tag.replace(LOCAL_TAG_SEPARATOR, REMOTE_TAG_SEPARATOR)
}

/// Render a note as a document dated today.
pub fn encode(note: &Note, field_front: &str, field_back: &str) -> EncodedDocument {
    encode_on(note, field_front, field_back, Local::now().date_naive())
}

pub fn encode_on(
    note: &Note,
    field_front: &str,
    field_back: &str,
    date: NaiveDate,
) -> EncodedDocument {
    let front = to_plain_text(note.field_value(field_front));
    let back = to_plain_text(note.field_value(field_back));

    let title = title_or_fallback(derive_title(&front), note.note_id);

    let tags = note
        .tags
        .iter()
        .map(|tag| format!("  - {}", to_local_tag(tag)))
        .collect::<Vec<_>>()
        .join("\n");

    let content = format!(
        "---\n\
         type: {DOCUMENT_TYPE}\n\
         title: {title}\n\
         date: {date}\n\
         tags:\n\
         {tags}\n\
         id: {id}\n\
         ---\n\
         \n\
         # Card: {title}\n\
         \n\
         ## Question\n\
         {front}\n\
         \n\
         ## Answer\n\
         {back}\n",
        date = date.format("%Y-%m-%d"),
        id = note.note_id,
    );

    EncodedDocument { title, content }
}

/// Parse a document. Never fails: anything missing or malformed comes back empty.
pub fn decode(content: &str) -> DecodedDocument {
    let mut document = DecodedDocument::default();

    let body = match HEADER_RE.captures(content) {
        Some(caps) => {
            parse_header(&caps[1], &mut document);
            caps.get(0).map(|m| &content[m.end()..]).unwrap_or("")
        }
        None => content,
    };

    if let Some(caps) = QUESTION_RE.captures(body) {
        document.front = caps[1].trim().to_string();
    }
    if let Some(caps) = ANSWER_RE.captures(body) {
        document.back = caps[1].trim().to_string();
    }

    document
}

fn parse_header(header: &str, document: &mut DecodedDocument) {
    let mut id_seen = false;
    let mut lines = header.lines().peekable();

    while let Some(line) = lines.next() {
        if let Some(value) = line.strip_prefix("id:") {
            if !id_seen {
                id_seen = true;
                document.id = parse_id(value.trim());
            }
        } else if let Some(value) = line.strip_prefix("tags:") {
            let value = value.trim();
            if value.starts_with('[') {
                document.tags = parse_inline_list(value).iter().map(|t| to_remote_tag(t)).collect();
                continue;
            }
            while let Some(next) = lines.peek() {
                if next.trim().is_empty() {
                    lines.next();
                    continue;
                }
                let Some(caps) = TAG_ITEM_RE.captures(next) else { break };
                document.tags.push(to_remote_tag(&unquote(&caps[1])));
                lines.next();
            }
        }
    }
}

fn parse_id(raw: &str) -> Option<NoteId> {
    if is_placeholder(raw) {
        return None;
    }
    match raw.parse::<NoteId>() {
        Ok(id) => Some(id),
        Err(_) => {
            warn!("Invalid id '{}' in document header, treating as a new card", raw);
            None
        }
    }
}

/// Remove surrounding quotes from a string
fn unquote(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
    {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

/// Parse an inline YAML list like [foo, bar, "baz qux"]
fn parse_inline_list(s: &str) -> Vec<String> {
    let s = s.trim();
    let inner = s.strip_prefix('[').and_then(|s| s.strip_suffix(']')).unwrap_or(s);

    inner.split(',').map(unquote).filter(|item| !item.is_empty()).collect()
}
