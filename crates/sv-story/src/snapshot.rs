use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sv_core::StoryViewError;

use crate::document::StoryDocument;
use crate::engine::Position;

pub const STORY_STATE_SCHEMA: &str = "story-state.v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoryStateV1 {
    schema_version: String,
    knot: String,
    cursor: usize,
    ended: bool,
    #[serde(default)]
    current_tags: Vec<String>,
    #[serde(default)]
    taken_once: BTreeSet<String>,
}

pub(crate) fn encode(position: &Position) -> Result<String, StoryViewError> {
    let state = StoryStateV1 {
        schema_version: STORY_STATE_SCHEMA.to_string(),
        knot: position.knot.clone(),
        cursor: position.cursor,
        ended: position.ended,
        current_tags: position.current_tags.clone(),
        taken_once: position.taken_once.clone(),
    };
    serde_json::to_string(&state)
        .map_err(|error| StoryViewError::new("STORY_STATE_ENCODE", error.to_string()))
}

pub(crate) fn decode(document: &StoryDocument, raw: &str) -> Result<Position, StoryViewError> {
    let state: StoryStateV1 = serde_json::from_str(raw)
        .map_err(|error| StoryViewError::new("STORY_STATE_INVALID", error.to_string()))?;

    if state.schema_version != STORY_STATE_SCHEMA {
        return Err(StoryViewError::new(
            "STORY_STATE_INVALID",
            format!("Unsupported story state schema: {}", state.schema_version),
        ));
    }

    let knot = document.knots.get(&state.knot).ok_or_else(|| {
        StoryViewError::new(
            "STORY_STATE_INVALID",
            format!("Saved knot does not exist: {}", state.knot),
        )
    })?;
    if state.cursor > knot.content.len() {
        return Err(StoryViewError::new(
            "STORY_STATE_INVALID",
            format!(
                "Saved cursor {} is past the end of knot {}",
                state.cursor, state.knot
            ),
        ));
    }

    Ok(Position {
        knot: state.knot,
        cursor: state.cursor,
        ended: state.ended,
        current_tags: state.current_tags,
        taken_once: state.taken_once,
    })
}
