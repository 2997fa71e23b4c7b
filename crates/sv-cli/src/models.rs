use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub(crate) const SAVE_DATA_SCHEMA: &str = "save-data.v1";
pub(crate) const DEFAULT_ENTRY: &str = "main";
pub(crate) const DEFAULT_SAVE_DIR: &str = ".storyview";

#[derive(Debug, Clone)]
pub(crate) struct LoadedStory {
    pub(crate) id: String,
    pub(crate) path: PathBuf,
    pub(crate) entry: String,
    pub(crate) source: String,
}

/// On-disk save: the opaque engine state plus reader preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SaveFile {
    pub(crate) schema_version: String,
    #[serde(default)]
    pub(crate) title: Option<String>,
    pub(crate) state: String,
    #[serde(default)]
    pub(crate) preferences: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BatchEvent {
    Choices,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NodeLine {
    pub(crate) kind: &'static str,
    pub(crate) classes: Vec<String>,
    pub(crate) text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BatchOutcome {
    pub(crate) event: BatchEvent,
    pub(crate) nodes: Vec<NodeLine>,
    pub(crate) choices: Vec<(usize, String)>,
    pub(crate) cleared: bool,
    pub(crate) restarted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TuiCommandAction {
    NotHandled,
    Continue,
    RefreshBatch,
    Quit,
}
