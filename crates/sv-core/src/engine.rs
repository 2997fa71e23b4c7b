use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoryViewError;
use crate::types::{Choice, Paragraph};

/// Pull-based narrative engine contract consumed by the renderer.
pub trait NarrativeEngine {
    fn can_continue(&self) -> bool;

    /// Produces the next paragraph text. Failures here are integrity failures:
    /// the story cannot advance from its current state.
    fn continue_paragraph(&mut self) -> Result<String, StoryViewError>;

    /// Tags attached to the paragraph most recently produced.
    fn current_tags(&self) -> &[String];

    fn global_tags(&self) -> &[String];

    fn current_choices(&self) -> Vec<Choice>;

    fn choose_choice_index(&mut self, index: usize) -> Result<(), StoryViewError>;

    fn reset_state(&mut self);

    fn save_state(&self) -> Result<String, StoryViewError>;

    fn load_state(&mut self, state: &str) -> Result<(), StoryViewError>;

    fn next_paragraph(&mut self) -> Result<Paragraph, StoryViewError> {
        let text = self.continue_paragraph()?;
        Ok(Paragraph {
            text,
            tags: self.current_tags().to_vec(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveData {
    pub state: String,
}

/// Persistence boundary for engine state and reader preferences.
pub trait SaveBridge {
    /// Binds the bridge to a story title; returns whether a save exists.
    fn init(&mut self, title: &str) -> Result<bool, StoryViewError>;

    fn load(&mut self) -> Result<(), StoryViewError>;

    fn data(&self) -> Option<&SaveData>;

    fn save(&mut self, state: String) -> Result<(), StoryViewError>;

    fn preference(&self, name: &str) -> Option<Value>;
}

/// Bridge used when a story has no title and saving is disabled.
#[derive(Debug, Default)]
pub struct DisabledSaveBridge;

impl SaveBridge for DisabledSaveBridge {
    fn init(&mut self, _title: &str) -> Result<bool, StoryViewError> {
        Ok(false)
    }

    fn load(&mut self) -> Result<(), StoryViewError> {
        Err(StoryViewError::new(
            "SAVE_DISABLED",
            "Saving is disabled for this story.",
        ))
    }

    fn data(&self) -> Option<&SaveData> {
        None
    }

    fn save(&mut self, _state: String) -> Result<(), StoryViewError> {
        Ok(())
    }

    fn preference(&self, _name: &str) -> Option<Value> {
        None
    }
}
