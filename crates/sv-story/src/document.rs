use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sv_core::StoryViewError;

/// Divert target that ends the story.
pub const END_KNOT: &str = "END";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryDocument {
    #[serde(default)]
    pub global_tags: Vec<String>,
    pub start: String,
    pub knots: BTreeMap<String, Knot>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Knot {
    #[serde(default)]
    pub content: Vec<ParagraphSource>,
    #[serde(default)]
    pub choices: Vec<KnotChoice>,
    #[serde(default)]
    pub divert: Option<String>,
}

/// A paragraph is either a bare string or a `{ "text", "tags" }` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParagraphSource {
    Plain(String),
    Tagged {
        text: String,
        #[serde(default)]
        tags: Vec<String>,
    },
}

impl ParagraphSource {
    pub fn text(&self) -> &str {
        match self {
            ParagraphSource::Plain(text) => text,
            ParagraphSource::Tagged { text, .. } => text,
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            ParagraphSource::Plain(_) => &[],
            ParagraphSource::Tagged { tags, .. } => tags,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnotChoice {
    pub text: String,
    pub divert: String,
    /// Once-only choices disappear after they have been taken.
    #[serde(default)]
    pub once: bool,
}

impl StoryDocument {
    pub fn from_json(raw: &str) -> Result<Self, StoryViewError> {
        let document: StoryDocument = serde_json::from_str(raw)
            .map_err(|error| StoryViewError::new("STORY_PARSE", error.to_string()))?;
        document.validate()?;
        Ok(document)
    }

    pub fn knot(&self, name: &str) -> Result<&Knot, StoryViewError> {
        self.knots.get(name).ok_or_else(|| {
            StoryViewError::new("STORY_KNOT_MISSING", format!("Unknown knot: {}", name))
        })
    }

    fn validate(&self) -> Result<(), StoryViewError> {
        self.knot(&self.start)?;
        for (name, knot) in &self.knots {
            if let Some(target) = &knot.divert {
                self.check_target(name, target)?;
            }
            for choice in &knot.choices {
                self.check_target(name, &choice.divert)?;
            }
        }
        Ok(())
    }

    fn check_target(&self, from: &str, target: &str) -> Result<(), StoryViewError> {
        if target == END_KNOT || self.knots.contains_key(target) {
            return Ok(());
        }
        Err(StoryViewError::new(
            "STORY_KNOT_MISSING",
            format!("Knot {} diverts to unknown knot {}", from, target),
        ))
    }
}
