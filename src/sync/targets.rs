use std::path::{
    Path,
    PathBuf,
};

use log::info;

use crate::{
    config::Settings,
    core::AnkiMdError,
    vault,
};

/// Documents a sync run should visit.
///
/// `dir` is relative to the configured sync base directory and selects all
/// `.md` files in it; `file` selects a single document; with neither, the
/// configured target file is used.
pub fn resolve_targets(
    settings: &Settings,
    dir: Option<&Path>,
    file: Option<&Path>,
) -> Result<Vec<PathBuf>, AnkiMdError> {
    if let Some(dir) = dir {
        let target_dir = settings.sync_base_dir.join(dir);
        if !target_dir.is_dir() {
            return Err(AnkiMdError::Config(format!(
                "directory '{}' was not found",
                target_dir.display()
            )));
        }

        let files = vault::list_documents(&target_dir)?;
        if files.is_empty() {
            return Err(AnkiMdError::Config(format!(
                "no Markdown files found in '{}'",
                target_dir.display()
            )));
        }
        info!("Directory sync: {} files from '{}'", files.len(), target_dir.display());
        return Ok(files);
    }

    if let Some(file) = file {
        return Ok(vec![file.to_path_buf()]);
    }

    match &settings.target_file {
        Some(target) => Ok(vec![target.clone()]),
        None => Err(AnkiMdError::Config("specify a target file or directory".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn settings_in(base: &Path) -> Settings {
        Settings { sync_base_dir: base.to_path_buf(), ..Default::default() }
    }

    #[test]
    fn test_dir_lists_markdown_files() {
        let base = tempdir().unwrap();
        let deck = base.path().join("deck");
        fs::create_dir(&deck).unwrap();
        fs::write(deck.join("b.md"), "").unwrap();
        fs::write(deck.join("a.md"), "").unwrap();
        fs::write(deck.join("notes.txt"), "").unwrap();

        let files = resolve_targets(&settings_in(base.path()), Some(Path::new("deck")), None).unwrap();
        assert_eq!(files, vec![deck.join("a.md"), deck.join("b.md")]);
    }

    #[test]
    fn test_missing_or_empty_dir_is_config_error() {
        let base = tempdir().unwrap();
        fs::create_dir(base.path().join("empty")).unwrap();
        let settings = settings_in(base.path());

        let missing = resolve_targets(&settings, Some(Path::new("nope")), None);
        assert!(matches!(missing, Err(AnkiMdError::Config(_))));
        let empty = resolve_targets(&settings, Some(Path::new("empty")), None);
        assert!(matches!(empty, Err(AnkiMdError::Config(_))));
    }

    #[test]
    fn test_file_then_configured_target() {
        let settings = Settings::default();
        let files = resolve_targets(&settings, None, Some(Path::new("card.md"))).unwrap();
        assert_eq!(files, vec![PathBuf::from("card.md")]);

        let files = resolve_targets(&settings, None, None).unwrap();
        assert_eq!(files, vec![PathBuf::from("sample_anki_card.md")]);

        let none = Settings { target_file: None, ..Default::default() };
        assert!(matches!(resolve_targets(&none, None, None), Err(AnkiMdError::Config(_))));
    }
}
