//! In-memory `NoteStore` used by the engine tests.

use std::{
    collections::HashMap,
    sync::Mutex,
};

use super::{
    types::Field,
    NewNote,
    Note,
    NoteFieldsUpdate,
    NoteId,
    NoteStore,
};
use crate::core::AnkiMdError;

#[derive(Default)]
struct MockState {
    notes: Vec<(String, Note)>,
    next_id: NoteId,
    calls: Vec<String>,
}

#[derive(Default)]
pub struct MockStore {
    state: Mutex<MockState>,
    add_returns_none: bool,
    unreachable: bool,
}

impl MockStore {
    pub fn new() -> Self {
        let store = Self::default();
        store.state.lock().unwrap().next_id = 1000;
        store
    }

    /// `addNote` answers with a null result.
    pub fn returning_no_id(mut self) -> Self {
        self.add_returns_none = true;
        self
    }

    /// Every action fails as if the endpoint were down.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn with_note(
        self,
        deck: &str,
        note_id: NoteId,
        model: &str,
        fields: &[(&str, &str)],
        tags: &[&str],
    ) -> Self {
        let fields = fields
            .iter()
            .enumerate()
            .map(|(order, (name, value))| {
                (name.to_string(), Field { value: value.to_string(), order: order as u32 })
            })
            .collect();
        let note = Note {
            note_id,
            model_name: model.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            fields,
            cards: vec![note_id + 1],
            modified: 0,
        };
        self.state.lock().unwrap().notes.push((deck.to_string(), note));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count_calls(&self, action: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == action).count()
    }

    pub fn note(&self, note_id: NoteId) -> Option<Note> {
        self.state
            .lock()
            .unwrap()
            .notes
            .iter()
            .find(|(_, n)| n.note_id == note_id)
            .map(|(_, n)| n.clone())
    }

    pub fn note_count(&self) -> usize {
        self.state.lock().unwrap().notes.len()
    }

    pub fn set_field(&self, note_id: NoteId, name: &str, value: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some((_, note)) = state.notes.iter_mut().find(|(_, n)| n.note_id == note_id) {
            if let Some(field) = note.fields.get_mut(name) {
                field.value = value.to_string();
            }
        }
    }

    fn record(&self, action: &str) -> Result<(), AnkiMdError> {
        self.state.lock().unwrap().calls.push(action.to_string());
        if self.unreachable {
            return Err(AnkiMdError::Custom("connection refused".to_string()));
        }
        Ok(())
    }
}

/// Quoted terms of a search query, with backslash escapes removed.
fn query_terms(query: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut chars = query.chars();
    while let Some(c) = chars.next() {
        if c != '"' {
            continue;
        }
        let mut term = String::new();
        while let Some(c) = chars.next() {
            match c {
                '\\' => term.extend(chars.next()),
                '"' => break,
                _ => term.push(c),
            }
        }
        terms.push(term);
    }
    terms
}

// Free text matches raw field content, markup included.
fn term_matches(term: &str, deck: &str, note: &Note) -> bool {
    if let Some(name) = term.strip_prefix("deck:") {
        return name == deck;
    }
    if let Some(name) = term.strip_prefix("note:") {
        return name == note.model_name;
    }
    note.fields.values().any(|field| field.value.contains(term))
}

impl NoteStore for MockStore {
    async fn find_notes(&self, query: &str) -> Result<Vec<NoteId>, AnkiMdError> {
        self.record("findNotes")?;
        let terms = query_terms(query);
        let state = self.state.lock().unwrap();
        Ok(state
            .notes
            .iter()
            .filter(|(deck, note)| terms.iter().all(|term| term_matches(term, deck, note)))
            .map(|(_, note)| note.note_id)
            .collect())
    }

    async fn notes_info(&self, note_ids: &[NoteId]) -> Result<Vec<Note>, AnkiMdError> {
        self.record("notesInfo")?;
        let state = self.state.lock().unwrap();
        Ok(note_ids
            .iter()
            .filter_map(|id| state.notes.iter().find(|(_, n)| n.note_id == *id))
            .map(|(_, n)| n.clone())
            .collect())
    }

    async fn add_note(&self, note: &NewNote) -> Result<Option<NoteId>, AnkiMdError> {
        self.record("addNote")?;
        if self.add_returns_none {
            return Ok(None);
        }
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let note_id = state.next_id;
        let fields: HashMap<String, Field> = note
            .fields
            .iter()
            .enumerate()
            .map(|(order, (k, v))| (k.clone(), Field { value: v.clone(), order: order as u32 }))
            .collect();
        state.notes.push((
            note.deck_name.clone(),
            Note {
                note_id,
                model_name: note.model_name.clone(),
                tags: note.tags.clone(),
                fields,
                cards: Vec::new(),
                modified: 0,
            },
        ));
        Ok(Some(note_id))
    }

    async fn update_note_fields(&self, update: &NoteFieldsUpdate) -> Result<(), AnkiMdError> {
        self.record("updateNoteFields")?;
        let mut state = self.state.lock().unwrap();
        let Some((_, note)) = state.notes.iter_mut().find(|(_, n)| n.note_id == update.id) else {
            return Err(AnkiMdError::AnkiConnect("note was not found".to_string()));
        };
        for (name, value) in &update.fields {
            let order = note.fields.len() as u32;
            note.fields
                .entry(name.clone())
                .and_modify(|f| f.value = value.clone())
                .or_insert(Field { value: value.clone(), order });
        }
        Ok(())
    }

    async fn add_tags(&self, note_ids: &[NoteId], tags: &str) -> Result<(), AnkiMdError> {
        self.record("addTags")?;
        let mut state = self.state.lock().unwrap();
        for (_, note) in state.notes.iter_mut().filter(|(_, n)| note_ids.contains(&n.note_id)) {
            for tag in tags.split_whitespace() {
                if !note.tags.iter().any(|t| t == tag) {
                    note.tags.push(tag.to_string());
                }
            }
        }
        Ok(())
    }

    async fn remove_tags(&self, note_ids: &[NoteId], tags: &str) -> Result<(), AnkiMdError> {
        self.record("removeTags")?;
        let removed: Vec<&str> = tags.split_whitespace().collect();
        let mut state = self.state.lock().unwrap();
        for (_, note) in state.notes.iter_mut().filter(|(_, n)| note_ids.contains(&n.note_id)) {
            note.tags.retain(|t| !removed.contains(&t.as_str()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anki::api::{
        deck_query,
        model_text_query,
    };

    #[test]
    fn test_query_terms_unescape() {
        let query = model_text_query("Basic", "2*3: \"six\"");
        assert_eq!(query_terms(&query), vec!["note:Basic", "2*3: \"six\""]);
    }

    #[tokio::test]
    async fn test_free_text_matches_raw_field_content() {
        let store = MockStore::new()
            .with_note("Geo", 1, "Basic", &[("Front", "<b>Paris</b> &amp; Lyon")], &[])
            .with_note("Geo", 2, "Basic", &[("Front", "Berlin")], &[])
            .with_note("Other", 3, "Cloze", &[("Front", "Paris")], &[]);

        assert_eq!(store.find_notes(&model_text_query("Basic", "Paris")).await.unwrap(), vec![1]);
        assert!(store.find_notes(&model_text_query("Basic", "**Paris**")).await.unwrap().is_empty());
        assert_eq!(store.find_notes(&deck_query("Geo")).await.unwrap(), vec![1, 2]);
    }
}
