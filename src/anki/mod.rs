use crate::core::AnkiMdError;

pub mod api;
#[cfg(test)]
pub mod mock;
pub mod types;

pub use api::AnkiConnect;
pub use types::{
    NewNote,
    Note,
    NoteFieldsUpdate,
    NoteId,
};

/// The remote note database as seen by the sync and export engines.
///
/// Every method maps to one AnkiConnect action and returns an already-typed
/// result, so nothing downstream handles raw JSON.
#[allow(async_fn_in_trait)]
pub trait NoteStore {
    /// `findNotes`
    async fn find_notes(&self, query: &str) -> Result<Vec<NoteId>, AnkiMdError>;

    /// `notesInfo`
    async fn notes_info(&self, note_ids: &[NoteId]) -> Result<Vec<Note>, AnkiMdError>;

    /// `addNote`; `None` when the store produced no identifier.
    async fn add_note(&self, note: &NewNote) -> Result<Option<NoteId>, AnkiMdError>;

    /// `updateNoteFields`
    async fn update_note_fields(&self, update: &NoteFieldsUpdate) -> Result<(), AnkiMdError>;

    /// `addTags`, tags space separated
    async fn add_tags(&self, note_ids: &[NoteId], tags: &str) -> Result<(), AnkiMdError>;

    /// `removeTags`, tags space separated
    async fn remove_tags(&self, note_ids: &[NoteId], tags: &str) -> Result<(), AnkiMdError>;
}
