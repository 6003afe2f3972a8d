use crate::anki::NoteId;

pub const MAX_TITLE_CHARS: usize = 50;

const ILLEGAL_CHARS: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Filesystem-safe title from the front field's Markdown.
///
/// Strips characters that are illegal in filenames, turns newlines into
/// spaces, truncates to [`MAX_TITLE_CHARS`] and trims. Applying it twice
/// changes nothing.
pub fn derive_title(front: &str) -> String {
    let cleaned: String = front
        .chars()
        .filter(|c| !ILLEGAL_CHARS.contains(c) && *c != '\r')
        .map(|c| if c == '\n' { ' ' } else { c })
        .take(MAX_TITLE_CHARS)
        .collect();
    cleaned.trim().to_string()
}

pub fn title_or_fallback(title: String, note_id: NoteId) -> String {
    if title.is_empty() {
        format!("NoTitle_{}", note_id)
    } else {
        title
    }
}

/// `{title}_{id}.md`, with whitespace in the title replaced by underscores.
pub fn document_filename(title: &str, note_id: NoteId) -> String {
    let stem = title.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{}_{}.md", stem, note_id)
}
