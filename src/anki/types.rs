use std::collections::HashMap;

use serde::{
    Deserialize,
    Serialize,
};

pub type NoteId = u64;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Field {
    pub value: String,
    pub order: u32,
}

/// A note as reported by `notesInfo`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub note_id: NoteId,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub fields: HashMap<String, Field>,
    #[serde(default)]
    pub cards: Vec<u64>,
    #[serde(rename = "mod", default)]
    pub modified: u64,
}

impl Note {
    /// Raw HTML of a field, or an empty string when the model has no such field.
    pub fn field_value(&self, name: &str) -> &str {
        self.fields.get(name).map(|f| f.value.as_str()).unwrap_or("")
    }
}

/// Payload for `addNote`.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    pub deck_name: String,
    pub model_name: String,
    pub fields: HashMap<String, String>,
    pub tags: Vec<String>,
}

/// Payload for `updateNoteFields`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NoteFieldsUpdate {
    pub id: NoteId,
    pub fields: HashMap<String, String>,
}

/// Front/back field pair converted to HTML, keyed by the model's field names.
pub fn field_map(
    field_front: &str,
    front_html: String,
    field_back: &str,
    back_html: String,
) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    fields.insert(field_front.to_string(), front_html);
    fields.insert(field_back.to_string(), back_html);
    fields
}
