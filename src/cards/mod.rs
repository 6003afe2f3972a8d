//! Card operations on a deck: listing, creating and editing notes with
//! Markdown fields, plus AI-assisted drafting and rewriting.

use std::collections::HashMap;

use log::{
    info,
    warn,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    anki::{
        api::deck_query,
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
    gemini::TextGenerator,
};

mod prompts;

#[derive(Debug, Clone, PartialEq)]
pub struct CardConfig {
    pub deck_name: String,
    pub model_name: String,
    pub field_front: String,
    pub field_back: String,
}

/// A note with its fields rendered as Markdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub id: NoteId,
    pub front: String,
    pub back: String,
    pub tags: Vec<String>,
    pub model_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CardDraft {
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Configured deck when `None`
    #[serde(default)]
    pub deck_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratedCard {
    pub chat: String,
    pub front: String,
    pub back: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifiedCard {
    pub front: String,
    pub back: String,
}

pub struct CardService<S: NoteStore, G: TextGenerator> {
    store: S,
    generator: G,
    config: CardConfig,
}

impl<S: NoteStore, G: TextGenerator> CardService<S, G> {
    pub fn new(store: S, generator: G, config: CardConfig) -> Self {
        Self { store, generator, config }
    }

    pub async fn list_cards(&self, deck: Option<&str>) -> Result<Vec<CardView>, AnkiMdError> {
        let deck = deck.unwrap_or(&self.config.deck_name);
        let note_ids = self.store.find_notes(&deck_query(deck)).await?;
        if note_ids.is_empty() {
            return Ok(Vec::new());
        }

        let notes = self.store.notes_info(&note_ids).await?;
        Ok(notes
            .into_iter()
            .map(|note| CardView {
                id: note.note_id,
                front: to_plain_text(note.field_value(&self.config.field_front)),
                back: to_plain_text(note.field_value(&self.config.field_back)),
                tags: note.tags,
                model_name: note.model_name,
            })
            .collect())
    }

    pub async fn create_card(&self, draft: CardDraft) -> Result<NoteId, AnkiMdError> {
        let note = NewNote {
            deck_name: draft.deck_name.unwrap_or_else(|| self.config.deck_name.clone()),
            model_name: self.config.model_name.clone(),
            fields: self.fields(&draft.front, &draft.back),
            tags: draft.tags,
        };

        match self.store.add_note(&note).await? {
            Some(note_id) => {
                info!("Created card {} in deck '{}'", note_id, note.deck_name);
                Ok(note_id)
            }
            None => Err(AnkiMdError::AnkiConnect("failed to create card".to_string())),
        }
    }

    /// Overwrite both fields and replace the tag set.
    pub async fn update_card(&self, note_id: NoteId, draft: CardDraft) -> Result<(), AnkiMdError> {
        let update = NoteFieldsUpdate { id: note_id, fields: self.fields(&draft.front, &draft.back) };
        self.store.update_note_fields(&update).await?;

        let current = self.store.notes_info(&[note_id]).await?;
        let Some(note) = current.first() else {
            warn!("Card {} vanished before its tags could be updated", note_id);
            return Ok(());
        };

        if !note.tags.is_empty() {
            self.store.remove_tags(&[note_id], &note.tags.join(" ")).await?;
        }
        if !draft.tags.is_empty() {
            self.store.add_tags(&[note_id], &draft.tags.join(" ")).await?;
        }

        info!("Updated card {}", note_id);
        Ok(())
    }

    /// Draft a card from a topic. A reply that is not JSON comes back as chat only.
    pub async fn generate_card(&self, prompt: &str) -> Result<GeneratedCard, AnkiMdError> {
        let raw = self.generator.generate(&prompts::generate_prompt(prompt)).await?;

        match prompts::parse_json_reply::<GeneratedCard>(&raw) {
            Ok(card) => Ok(card),
            Err(e) => {
                warn!("Generated reply was not JSON ({}), returning it as chat", e);
                Ok(GeneratedCard { chat: raw, ..Default::default() })
            }
        }
    }

    pub async fn modify_card(
        &self,
        front: &str,
        back: &str,
        instruction: &str,
    ) -> Result<ModifiedCard, AnkiMdError> {
        let raw = self.generator.generate(&prompts::modify_prompt(front, back, instruction)).await?;

        prompts::parse_json_reply::<ModifiedCard>(&raw).map_err(|e| {
            AnkiMdError::Custom(format!("Failed to parse AI response as JSON: {}", e))
        })
    }

    fn fields(&self, front: &str, back: &str) -> HashMap<String, String> {
        field_map(
            &self.config.field_front,
            to_rich_text(front),
            &self.config.field_back,
            to_rich_text(back),
        )
    }
}
