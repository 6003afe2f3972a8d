//! Materialise a deck as documents in the output directory.

use std::{
    fs,
    path::PathBuf,
};

use log::{
    info,
    warn,
};

use crate::{
    anki::{
        api::deck_query,
        Note,
        NoteId,
        NoteStore,
    },
    core::AnkiMdError,
    document::{
        self,
        document_filename,
    },
    vault,
};

const PROGRESS_EVERY: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    pub deck_name: String,
    pub output_dir: PathBuf,
    pub field_front: String,
    pub field_back: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExportReport {
    pub created: usize,
    pub updated: usize,
    pub renamed: usize,
    pub failed: Vec<(NoteId, String)>,
}

impl ExportReport {
    pub fn total(&self) -> usize {
        self.created + self.updated + self.renamed
    }

    /// Notes handled so far, written or failed.
    pub fn processed(&self) -> usize {
        self.total() + self.failed.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    Create,
    Overwrite,
    Rename,
}

pub struct Exporter<S: NoteStore> {
    store: S,
    config: ExportConfig,
}

impl<S: NoteStore> Exporter<S> {
    pub fn new(store: S, config: ExportConfig) -> Self {
        Self { store, config }
    }

    pub async fn export_deck(&self) -> Result<ExportReport, AnkiMdError> {
        let output_dir = &self.config.output_dir;
        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
            info!("Created folder: {}", output_dir.display());
        }

        info!("Searching deck '{}' for cards...", self.config.deck_name);
        let note_ids = self.store.find_notes(&deck_query(&self.config.deck_name)).await?;
        if note_ids.is_empty() {
            warn!("No cards found in deck '{}'", self.config.deck_name);
            return Ok(ExportReport::default());
        }

        info!("Found {} cards, fetching details...", note_ids.len());
        let notes = self.store.notes_info(&note_ids).await?;
        let index = vault::scan(output_dir);

        let mut report = ExportReport::default();
        for note in &notes {
            match self.export_note(note, index.get(&note.note_id)) {
                Ok(Action::Create) => report.created += 1,
                Ok(Action::Overwrite) => report.updated += 1,
                Ok(Action::Rename) => report.renamed += 1,
                Err(e) => {
                    warn!("Failed to write note {}: {}", note.note_id, e);
                    report.failed.push((note.note_id, e.to_string()));
                }
            }

            let processed = report.processed();
            if processed % PROGRESS_EVERY == 0 {
                info!("Processing... {}/{}", processed, notes.len());
            }
        }

        info!(
            "Done: {} new, {} updated, {} renamed, {} total",
            report.created,
            report.updated,
            report.renamed,
            report.total()
        );
        if !report.failed.is_empty() {
            warn!("{} notes could not be written", report.failed.len());
        }
        Ok(report)
    }

    fn export_note(&self, note: &Note, existing: Option<&String>) -> Result<Action, AnkiMdError> {
        let encoded = document::encode(note, &self.config.field_front, &self.config.field_back);
        let new_filename = document_filename(&encoded.title, note.note_id);

        let action = match existing {
            None => Action::Create,
            Some(old) if *old == new_filename => Action::Overwrite,
            Some(old) => {
                // The stale copy is best effort; the new file is what counts.
                let old_path = self.config.output_dir.join(old);
                match fs::remove_file(&old_path) {
                    Ok(()) => info!("Renamed: '{}' -> '{}'", old, new_filename),
                    Err(e) => warn!("Could not delete old file '{}': {}", old, e),
                }
                Action::Rename
            }
        };

        vault::write_document(&self.config.output_dir.join(&new_filename), &encoded.content)?;
        Ok(action)
    }
}
