use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use sv_core::{SaveBridge, SaveData, StoryViewError};
use tracing::{debug, info};

use crate::{
    map_cli_save_encode, map_cli_save_invalid, map_cli_save_read, map_cli_save_write, SaveFile,
    SAVE_DATA_SCHEMA,
};

pub(crate) fn write_save_file(path: &Path, save: &SaveFile) -> Result<(), StoryViewError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(map_cli_save_write)?;

    let payload = serde_json::to_string_pretty(save).map_err(map_cli_save_encode)?;
    fs::write(path, payload).map_err(map_cli_save_write)
}

pub(crate) fn read_save_file(path: &Path) -> Result<SaveFile, StoryViewError> {
    if !path.exists() {
        return Err(StoryViewError::new(
            "CLI_SAVE_NOT_FOUND",
            format!("Save file does not exist: {}", path.display()),
        ));
    }

    let raw = fs::read_to_string(path).map_err(map_cli_save_read)?;
    let save: SaveFile = serde_json::from_str(&raw).map_err(map_cli_save_invalid)?;

    if save.schema_version != SAVE_DATA_SCHEMA {
        return Err(StoryViewError::new(
            "CLI_SAVE_SCHEMA",
            format!("Unsupported save schema: {}", save.schema_version),
        ));
    }

    Ok(save)
}

/// File name for a story title: lowercase alphanumerics joined by dashes.
pub(crate) fn save_slug(title: &str) -> String {
    let mut slug = String::new();
    for ch in title.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "story".to_string()
    } else {
        slug.to_string()
    }
}

/// Save bridge keeping one JSON file per story title under a directory.
#[derive(Debug)]
pub(crate) struct FileSaveStore {
    dir: PathBuf,
    title: Option<String>,
    data: Option<SaveData>,
    preferences: BTreeMap<String, Value>,
}

impl FileSaveStore {
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            title: None,
            data: None,
            preferences: BTreeMap::new(),
        }
    }

    pub(crate) fn path(&self) -> Option<PathBuf> {
        self.title
            .as_deref()
            .map(|title| self.dir.join(format!("{}.json", save_slug(title))))
    }

    fn bound_path(&self) -> Result<PathBuf, StoryViewError> {
        self.path().ok_or_else(|| {
            StoryViewError::new("SAVE_NOT_BOUND", "Save store has no story title yet.")
        })
    }
}

impl SaveBridge for FileSaveStore {
    fn init(&mut self, title: &str) -> Result<bool, StoryViewError> {
        self.title = Some(title.to_string());
        let path = self.bound_path()?;
        let exists = path.is_file();
        debug!(path = %path.display(), exists, "save store bound");
        Ok(exists)
    }

    fn load(&mut self) -> Result<(), StoryViewError> {
        let path = self.bound_path()?;
        let save = read_save_file(&path)?;
        self.preferences = save.preferences;
        self.data = Some(SaveData { state: save.state });
        info!(path = %path.display(), "save loaded");
        Ok(())
    }

    fn data(&self) -> Option<&SaveData> {
        self.data.as_ref()
    }

    fn save(&mut self, state: String) -> Result<(), StoryViewError> {
        let path = self.bound_path()?;
        write_save_file(
            &path,
            &SaveFile {
                schema_version: SAVE_DATA_SCHEMA.to_string(),
                title: self.title.clone(),
                state: state.clone(),
                preferences: self.preferences.clone(),
            },
        )?;
        self.data = Some(SaveData { state });
        debug!(path = %path.display(), "save written");
        Ok(())
    }

    fn preference(&self, name: &str) -> Option<Value> {
        self.preferences.get(name).cloned()
    }
}
