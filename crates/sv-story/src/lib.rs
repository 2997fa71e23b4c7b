//! Reference narrative engine: a JSON graph of knots holding tagged
//! paragraphs, choices and automatic diverts.

mod document;
mod engine;
mod snapshot;

pub use document::{Knot, KnotChoice, ParagraphSource, StoryDocument, END_KNOT};
pub use engine::StoryEngine;
pub use snapshot::STORY_STATE_SCHEMA;
