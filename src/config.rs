use std::{
    env,
    fmt,
    path::{
        Path,
        PathBuf,
    },
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    cards::CardConfig,
    core::AnkiMdError,
    export::ExportConfig,
    persistence,
    sync::SyncConfig,
};

/// Environment variable names
pub mod env_vars {
    pub const ANKI_CONNECT_URL: &str = "ANKI_CONNECT_URL";
    pub const ANKI_DECK_NAME: &str = "ANKI_DECK_NAME";
    pub const ANKI_MODEL_NAME: &str = "ANKI_MODEL_NAME";
    /// Where `export` writes documents
    pub const OUTPUT_DIR: &str = "OUTPUT_DIR";
    /// `sync --dir` is resolved relative to this
    pub const SYNC_BASE_DIR: &str = "SYNC_BASE_DIR";
    /// Document synced when neither `--dir` nor `--file` is given
    pub const TARGET_FILE: &str = "TARGET_FILE";
    pub const FIELD_FRONT: &str = "FIELD_FRONT";
    pub const FIELD_BACK: &str = "FIELD_BACK";
    pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
    pub const GEMINI_MODEL_NAME: &str = "GEMINI_MODEL_NAME";
}

/// Default values
pub mod defaults {
    pub const ANKI_CONNECT_URL: &str = crate::anki::api::DEFAULT_URL;
    pub const OUTPUT_DIR: &str = "export_sample";
    pub const SYNC_BASE_DIR: &str = ".";
    pub const TARGET_FILE: &str = "sample_anki_card.md";
    pub const FIELD_FRONT: &str = "表面";
    pub const FIELD_BACK: &str = "裏面";
    pub const GEMINI_MODEL_NAME: &str = crate::gemini::DEFAULT_MODEL;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub anki_connect_url: String,
    pub deck_name: Option<String>,
    pub model_name: Option<String>,
    pub output_dir: PathBuf,
    pub sync_base_dir: PathBuf,
    pub target_file: Option<PathBuf>,
    pub field_front: String,
    pub field_back: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            anki_connect_url: defaults::ANKI_CONNECT_URL.to_string(),
            deck_name: None,
            model_name: None,
            output_dir: PathBuf::from(defaults::OUTPUT_DIR),
            sync_base_dir: PathBuf::from(defaults::SYNC_BASE_DIR),
            target_file: Some(PathBuf::from(defaults::TARGET_FILE)),
            field_front: defaults::FIELD_FRONT.to_string(),
            field_back: defaults::FIELD_BACK.to_string(),
            gemini_api_key: None,
            gemini_model_name: defaults::GEMINI_MODEL_NAME.to_string(),
        }
    }
}

impl Settings {
    /// Defaults, then the settings file, then the process environment.
    ///
    /// `.env` must already have been loaded by the caller.
    pub fn load(settings_file: Option<&Path>) -> Self {
        let path = persistence::settings_path(settings_file);
        let mut settings: Settings = persistence::load_json_or_default(&path);
        settings.apply_env(|key| env::var(key).ok());
        settings
    }

    pub fn save(&self, settings_file: Option<&Path>) -> Result<PathBuf, AnkiMdError> {
        let path = persistence::settings_path(settings_file);
        persistence::save_json(self, &path)?;
        Ok(path)
    }

    /// Overlay every variable that `lookup` reports as set and non-empty.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get(env_vars::ANKI_CONNECT_URL) {
            self.anki_connect_url = v;
        }
        if let Some(v) = get(env_vars::ANKI_DECK_NAME) {
            self.deck_name = Some(v);
        }
        if let Some(v) = get(env_vars::ANKI_MODEL_NAME) {
            self.model_name = Some(v);
        }
        if let Some(v) = get(env_vars::OUTPUT_DIR) {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = get(env_vars::SYNC_BASE_DIR) {
            self.sync_base_dir = PathBuf::from(v);
        }
        if let Some(v) = get(env_vars::TARGET_FILE) {
            self.target_file = Some(PathBuf::from(v));
        }
        if let Some(v) = get(env_vars::FIELD_FRONT) {
            self.field_front = v;
        }
        if let Some(v) = get(env_vars::FIELD_BACK) {
            self.field_back = v;
        }
        if let Some(v) = get(env_vars::GEMINI_API_KEY) {
            self.gemini_api_key = Some(v);
        }
        if let Some(v) = get(env_vars::GEMINI_MODEL_NAME) {
            self.gemini_model_name = v;
        }
    }

    pub fn require_deck(&self) -> Result<&str, AnkiMdError> {
        required(self.deck_name.as_deref(), env_vars::ANKI_DECK_NAME)
    }

    pub fn require_model(&self) -> Result<&str, AnkiMdError> {
        required(self.model_name.as_deref(), env_vars::ANKI_MODEL_NAME)
    }

    pub fn sync_config(&self) -> Result<SyncConfig, AnkiMdError> {
        Ok(SyncConfig {
            deck_name: self.require_deck()?.to_string(),
            model_name: self.require_model()?.to_string(),
            field_front: self.field_front.clone(),
            field_back: self.field_back.clone(),
        })
    }

    pub fn export_config(&self, deck_override: Option<&str>) -> Result<ExportConfig, AnkiMdError> {
        let deck_name = match deck_override {
            Some(deck) => deck.to_string(),
            None => self.require_deck()?.to_string(),
        };
        Ok(ExportConfig {
            deck_name,
            output_dir: self.output_dir.clone(),
            field_front: self.field_front.clone(),
            field_back: self.field_back.clone(),
        })
    }

    pub fn card_config(&self) -> Result<CardConfig, AnkiMdError> {
        Ok(CardConfig {
            deck_name: self.require_deck()?.to_string(),
            model_name: self.require_model()?.to_string(),
            field_front: self.field_front.clone(),
            field_back: self.field_back.clone(),
        })
    }

    /// Same settings with the API key masked, for display.
    pub fn redacted(&self) -> Settings {
        let mut copy = self.clone();
        copy.gemini_api_key = copy.gemini_api_key.as_deref().map(mask);
        copy
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let none = "<unset>";
        writeln!(f, "AnkiConnect URL: {}", self.anki_connect_url)?;
        writeln!(f, "Deck:            {}", self.deck_name.as_deref().unwrap_or(none))?;
        writeln!(f, "Model:           {}", self.model_name.as_deref().unwrap_or(none))?;
        writeln!(f, "Fields:          {} / {}", self.field_front, self.field_back)?;
        writeln!(f, "Output dir:      {}", self.output_dir.display())?;
        writeln!(f, "Sync base dir:   {}", self.sync_base_dir.display())?;
        match &self.target_file {
            Some(path) => writeln!(f, "Target file:     {}", path.display())?,
            None => writeln!(f, "Target file:     {}", none)?,
        }
        write!(f, "Gemini model:    {}", self.gemini_model_name)
    }
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, AnkiMdError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AnkiMdError::Config(format!("{} is not set", name))),
    }
}

fn mask(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{}****", visible)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.anki_connect_url, "http://localhost:8765");
        assert_eq!(settings.output_dir, PathBuf::from("export_sample"));
        assert_eq!(settings.sync_base_dir, PathBuf::from("."));
        assert_eq!(settings.target_file, Some(PathBuf::from("sample_anki_card.md")));
        assert_eq!(settings.field_front, "表面");
        assert_eq!(settings.field_back, "裏面");
        assert_eq!(settings.gemini_model_name, "gemini-2.0-flash");
        assert!(settings.deck_name.is_none());
    }

    #[test]
    fn test_env_overrides_non_empty_values() {
        let mut settings = Settings::default();
        settings.apply_env(env_of(&[
            ("ANKI_DECK_NAME", "Geography"),
            ("ANKI_MODEL_NAME", "Basic"),
            ("FIELD_FRONT", "Front"),
            ("FIELD_BACK", ""),
            ("OUTPUT_DIR", "vault/cards"),
        ]));

        assert_eq!(settings.deck_name.as_deref(), Some("Geography"));
        assert_eq!(settings.model_name.as_deref(), Some("Basic"));
        assert_eq!(settings.field_front, "Front");
        assert_eq!(settings.field_back, "裏面");
        assert_eq!(settings.output_dir, PathBuf::from("vault/cards"));
    }

    #[test]
    fn test_missing_deck_or_model_is_config_error() {
        let settings = Settings::default();
        assert!(matches!(settings.require_deck(), Err(AnkiMdError::Config(_))));
        assert!(matches!(settings.sync_config(), Err(AnkiMdError::Config(_))));

        let export = settings.export_config(Some("Override")).unwrap();
        assert_eq!(export.deck_name, "Override");
    }

    #[test]
    fn test_partial_settings_file_keeps_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"deck_name":"Kanji"}"#).unwrap();
        assert_eq!(settings.deck_name.as_deref(), Some("Kanji"));
        assert_eq!(settings.field_front, "表面");
    }

    #[test]
    fn test_redacted_masks_key() {
        let settings =
            Settings { gemini_api_key: Some("AIzaSecret".to_string()), ..Default::default() };
        assert_eq!(settings.redacted().gemini_api_key.as_deref(), Some("AIza****"));
        assert!(!settings.to_string().contains("AIzaSecret"));
    }
}
