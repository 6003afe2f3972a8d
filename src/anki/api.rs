use log::debug;
use reqwest::Client;
use serde::{
    de::DeserializeOwned,
    Deserialize,
    Serialize,
};

use super::{
    types::{
        NewNote,
        Note,
        NoteFieldsUpdate,
        NoteId,
    },
    NoteStore,
};
use crate::core::AnkiMdError;

const API_VERSION: u32 = 6;

pub const DEFAULT_URL: &str = "http://localhost:8765";

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub result: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// A non-null `error` is a failure; a null `result` is simply "nothing produced".
    pub fn into_result(self) -> Result<Option<T>, AnkiMdError> {
        if let Some(error) = self.error {
            return Err(AnkiMdError::AnkiConnect(error));
        }
        Ok(self.result)
    }
}

#[derive(Debug, Clone)]
pub struct AnkiConnect {
    url: String,
    client: Client,
}

impl Default for AnkiConnect {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

impl AnkiConnect {
    pub fn new(url: &str) -> Self {
        Self { url: url.to_string(), client: Client::new() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn make_request<T: DeserializeOwned>(
        &self,
        action: &str,
        params: Option<serde_json::Value>,
    ) -> Result<ApiResponse<T>, AnkiMdError> {
        let mut body = serde_json::Map::new();
        body.insert("action".to_string(), serde_json::Value::String(action.to_string()));
        body.insert("version".to_string(), serde_json::Value::Number(API_VERSION.into()));

        if let Some(params) = params {
            body.insert("params".to_string(), params);
        }

        debug!("AnkiConnect request: {}", action);
        let response: ApiResponse<T> =
            self.client.post(&self.url).json(&body).send().await?.json().await?;

        Ok(response)
    }

    /// Used to check if AnkiConnect is online.
    pub async fn version(&self) -> Result<u32, AnkiMdError> {
        let response: ApiResponse<u32> = self.make_request("version", None).await?;
        Ok(response.into_result()?.unwrap_or_default())
    }
}

impl NoteStore for AnkiConnect {
    async fn find_notes(&self, query: &str) -> Result<Vec<NoteId>, AnkiMdError> {
        let params = serde_json::json!({ "query": query });
        let response: ApiResponse<Vec<NoteId>> =
            self.make_request("findNotes", Some(params)).await?;
        Ok(response.into_result()?.unwrap_or_default())
    }

    async fn notes_info(&self, note_ids: &[NoteId]) -> Result<Vec<Note>, AnkiMdError> {
        if note_ids.is_empty() {
            return Ok(Vec::new());
        }
        let params = serde_json::json!({ "notes": note_ids });
        let response: ApiResponse<Vec<Note>> =
            self.make_request("notesInfo", Some(params)).await?;
        Ok(response.into_result()?.unwrap_or_default())
    }

    async fn add_note(&self, note: &NewNote) -> Result<Option<NoteId>, AnkiMdError> {
        let params = serde_json::json!({ "note": note });
        let response: ApiResponse<NoteId> = self.make_request("addNote", Some(params)).await?;
        response.into_result()
    }

    async fn update_note_fields(&self, update: &NoteFieldsUpdate) -> Result<(), AnkiMdError> {
        let params = serde_json::json!({ "note": update });
        let response: ApiResponse<serde_json::Value> =
            self.make_request("updateNoteFields", Some(params)).await?;
        response.into_result().map(|_| ())
    }

    async fn add_tags(&self, note_ids: &[NoteId], tags: &str) -> Result<(), AnkiMdError> {
        let params = serde_json::json!({ "notes": note_ids, "tags": tags });
        let response: ApiResponse<serde_json::Value> =
            self.make_request("addTags", Some(params)).await?;
        response.into_result().map(|_| ())
    }

    async fn remove_tags(&self, note_ids: &[NoteId], tags: &str) -> Result<(), AnkiMdError> {
        let params = serde_json::json!({ "notes": note_ids, "tags": tags });
        let response: ApiResponse<serde_json::Value> =
            self.make_request("removeTags", Some(params)).await?;
        response.into_result().map(|_| ())
    }
}

/// `"deck:My Deck"`
pub fn deck_query(deck_name: &str) -> String {
    format!("\"deck:{}\"", escape_quoted(deck_name))
}

/// `"note:Basic"`
pub fn model_query(model_name: &str) -> String {
    format!("\"note:{}\"", escape_quoted(model_name))
}

/// `"note:Basic" "some text"`: notes of a model containing the given text anywhere.
pub fn model_text_query(model_name: &str, text: &str) -> String {
    format!("\"note:{}\" \"{}\"", escape_quoted(model_name), escape_search_text(text))
}

fn escape_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

// Wildcards and the field separator must be literal inside a free-text term.
fn escape_search_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '*' | '_' | ':') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
