//! File operations on the document folder
//!
//! Builds the id → filename index, stamps identifiers into drafts, and
//! reads/writes whole documents.

use std::{
    collections::HashMap,
    fs,
    io,
    path::{
        Path,
        PathBuf,
    },
    sync::LazyLock,
};

use log::{
    info,
    warn,
};
use regex::Regex;

use crate::anki::NoteId;

static BOUND_FILENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_(\d+)\.md$").unwrap());
static UNBOUND_ID_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^id:[ \t]*(?:id番号|新規カード)?[ \t]*(?P<eol>\r?)$").unwrap()
});

/// Map every bound document in `dir` from its note id to its filename.
///
/// Drafts without a trailing `_{id}.md` are not indexed. A missing directory
/// is an empty index.
pub fn scan(dir: &Path) -> HashMap<NoteId, String> {
    let mut index = HashMap::new();
    if !dir.exists() {
        return index;
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Could not read {}: {}", dir.display(), e);
            return index;
        }
    };

    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.ends_with(".md") {
            continue;
        }
        let Some(caps) = BOUND_FILENAME_RE.captures(&name) else { continue };
        match caps[1].parse::<NoteId>() {
            Ok(note_id) => {
                index.insert(note_id, name);
            }
            Err(_) => warn!("Ignoring {}: id suffix out of range", name),
        }
    }

    index
}

/// Replace the first unbound `id:` line of a document with `id: {note_id}`.
///
/// Already-bound documents are left untouched. Returns whether the file was
/// rewritten; failures are logged, never returned.
pub fn stamp_identifier(path: &Path, note_id: NoteId) -> bool {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Could not read {} to stamp id {}: {}", path.display(), note_id, e);
            return false;
        }
    };

    let stamped = UNBOUND_ID_LINE_RE
        .replacen(&content, 1, |caps: &regex::Captures| format!("id: {}{}", note_id, &caps["eol"]));
    if stamped == content {
        return false;
    }

    match fs::write(path, stamped.as_bytes()) {
        Ok(()) => {
            info!("Wrote id {} into {}", note_id, path.display());
            true
        }
        Err(e) => {
            warn!("Could not write id {} into {}: {}", note_id, path.display(), e);
            false
        }
    }
}

/// List the markdown documents directly inside `dir`, sorted by path.
pub fn list_documents(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == "md"))
        .collect();
    files.sort();
    Ok(files)
}

pub fn read_document(path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
}

/// Write a document in one go (creates parent directories as needed)
pub fn write_document(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}
