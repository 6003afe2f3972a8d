//! Push documents from the vault into the note store.
//!
//! Each document is decoded, bound to a note (by its header `id`, or by an
//! exact front-field match when it has none) and then either created or
//! updated. New identifiers are stamped back into the file so the next run
//! goes straight to the update path.

use std::{
    collections::HashMap,
    path::{
        Path,
        PathBuf,
    },
    sync::LazyLock,
};

use log::{
    debug,
    error,
    info,
    warn,
};
use regex::Regex;

use crate::{
    anki::{
        api::{
            model_query,
            model_text_query,
        },
        types::field_map,
        NewNote,
        NoteFieldsUpdate,
        NoteId,
        NoteStore,
    },
    convert::{
        to_plain_text,
        to_rich_text,
    },
    core::AnkiMdError,
    document::{
        self,
        DecodedDocument,
    },
    vault,
};

mod targets;


pub use targets::resolve_targets;

static MARKUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<[^>]*>|&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z][a-zA-Z0-9]*);").unwrap()
});

/// Longest run of the first rendered line that carries no tags or entities.
///
/// Fields are searched as stored, so a term taken from the Markdown would
/// miss any front with inline markup.
fn search_term(html: &str) -> Option<String> {
    let first_line = html.lines().next()?;
    let mut best: Option<&str> = None;
    for run in MARKUP_RE.split(first_line).map(str::trim) {
        if run.chars().count() > best.map_or(0, |b| b.chars().count()) {
            best = Some(run);
        }
    }
    best.map(str::to_string)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    pub deck_name: String,
    pub model_name: String,
    pub field_front: String,
    pub field_back: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Question or answer missing, nothing sent
    Skipped,
    Created(NoteId),
    /// `deduplicated` when the id came from a content match rather than the header
    Updated { id: NoteId, deduplicated: bool },
    Failed(String),
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: Vec<(PathBuf, String)>,
}

impl SyncReport {
    fn record(&mut self, path: &Path, outcome: SyncOutcome) {
        match outcome {
            SyncOutcome::Skipped => self.skipped += 1,
            SyncOutcome::Created(_) => self.created += 1,
            SyncOutcome::Updated { .. } => self.updated += 1,
            SyncOutcome::Failed(reason) => self.failed.push((path.to_path_buf(), reason)),
        }
    }

    pub fn total(&self) -> usize {
        self.created + self.updated + self.skipped + self.failed.len()
    }
}

pub struct Reconciler<S: NoteStore> {
    store: S,
    config: SyncConfig,
}

impl<S: NoteStore> Reconciler<S> {
    pub fn new(store: S, config: SyncConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Sync every path in order. A failing document is logged and recorded;
    /// the rest of the batch still runs.
    pub async fn sync_all(&self, paths: &[PathBuf]) -> SyncReport {
        let mut report = SyncReport::default();

        for path in paths {
            match self.sync_file(path).await {
                Ok(outcome) => report.record(path, outcome),
                Err(e) => {
                    error!("Error ({}): {}", path.display(), e);
                    report.failed.push((path.clone(), e.to_string()));
                }
            }
        }

        info!(
            "Sync finished: {} created, {} updated, {} skipped, {} failed",
            report.created,
            report.updated,
            report.skipped,
            report.failed.len()
        );
        report
    }

    pub async fn sync_file(&self, path: &Path) -> Result<SyncOutcome, AnkiMdError> {
        info!("Processing: {}", path.display());
        let content = vault::read_document(path)?;
        let document = document::decode(&content);

        if document.front.is_empty() || document.back.is_empty() {
            warn!("{}: Question or Answer not found, skipping", path.display());
            return Ok(SyncOutcome::Skipped);
        }

        let (note_id, deduplicated) = match document.id {
            Some(id) => (Some(id), false),
            None => match self.find_duplicate(&document.front).await? {
                Some(id) => {
                    warn!("Existing note found (id {}), binding {} to it", id, path.display());
                    vault::stamp_identifier(path, id);
                    (Some(id), true)
                }
                None => (None, false),
            },
        };

        match note_id {
            None => self.create(path, &document).await,
            Some(id) => {
                self.update(id, &document).await?;
                Ok(SyncOutcome::Updated { id, deduplicated })
            }
        }
    }

    /// First note of the configured model whose front field holds `front`.
    ///
    /// A stored field matches when it is exactly what a sync of `front` would
    /// write, or when both convert back to the same Markdown.
    async fn find_duplicate(&self, front: &str) -> Result<Option<NoteId>, AnkiMdError> {
        let expected_html = to_rich_text(front);
        let query = match search_term(&expected_html) {
            Some(term) => model_text_query(&self.config.model_name, &term),
            None => model_query(&self.config.model_name),
        };
        debug!("Duplicate search: {}", query);

        let candidates = self.store.find_notes(&query).await?;
        if candidates.is_empty() {
            return Ok(None);
        }

        let expected_text = to_plain_text(&expected_html);
        let notes = self.store.notes_info(&candidates).await?;
        Ok(notes
            .iter()
            .find(|note| {
                let stored = note.field_value(&self.config.field_front);
                if stored == expected_html {
                    return true;
                }
                let stored_text = to_plain_text(stored);
                stored_text == front || stored_text == expected_text
            })
            .map(|note| note.note_id))
    }

    async fn create(
        &self,
        path: &Path,
        document: &DecodedDocument,
    ) -> Result<SyncOutcome, AnkiMdError> {
        info!("Registering {} as a new note", path.display());
        let note = NewNote {
            deck_name: self.config.deck_name.clone(),
            model_name: self.config.model_name.clone(),
            fields: self.fields(document),
            tags: document.tags.clone(),
        };

        match self.store.add_note(&note).await? {
            Some(id) => {
                info!("Registered, note id {}", id);
                vault::stamp_identifier(path, id);
                Ok(SyncOutcome::Created(id))
            }
            None => {
                error!("{}: the store returned no note id", path.display());
                Ok(SyncOutcome::Failed("no note id returned".to_string()))
            }
        }
    }

    // Fields only: tags on an existing note are left as they are.
    async fn update(&self, note_id: NoteId, document: &DecodedDocument) -> Result<(), AnkiMdError> {
        info!("Updating existing note {}", note_id);
        let update = NoteFieldsUpdate { id: note_id, fields: self.fields(document) };
        self.store.update_note_fields(&update).await?;
        info!("Updated note {}", note_id);
        Ok(())
    }

    fn fields(&self, document: &DecodedDocument) -> HashMap<String, String> {
        field_map(
            &self.config.field_front,
            to_rich_text(&document.front),
            &self.config.field_back,
            to_rich_text(&document.back),
        )
    }
}
