use std::collections::BTreeSet;

use sv_core::{Choice, NarrativeEngine, StoryViewError};
use tracing::debug;

use crate::document::{KnotChoice, StoryDocument, END_KNOT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Position {
    pub(crate) knot: String,
    pub(crate) cursor: usize,
    pub(crate) ended: bool,
    pub(crate) current_tags: Vec<String>,
    pub(crate) taken_once: BTreeSet<String>,
}

/// Narrative engine over a JSON story graph.
#[derive(Debug, Clone)]
pub struct StoryEngine {
    pub(crate) document: StoryDocument,
    pub(crate) initial: Position,
    pub(crate) position: Position,
}

impl StoryEngine {
    pub fn new(document: StoryDocument) -> Result<Self, StoryViewError> {
        let mut position = Position {
            knot: document.start.clone(),
            cursor: 0,
            ended: false,
            current_tags: Vec::new(),
            taken_once: BTreeSet::new(),
        };
        settle(&document, &mut position)?;
        Ok(Self {
            document,
            initial: position.clone(),
            position,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, StoryViewError> {
        Self::new(StoryDocument::from_json(raw)?)
    }

    pub fn current_knot(&self) -> &str {
        &self.position.knot
    }

    pub fn has_ended(&self) -> bool {
        self.position.ended
    }

    fn visible_choices(&self) -> Vec<(usize, &KnotChoice)> {
        visible_choices(&self.document, &self.position)
    }
}

impl NarrativeEngine for StoryEngine {
    fn can_continue(&self) -> bool {
        if self.position.ended {
            return false;
        }
        self.document
            .knots
            .get(&self.position.knot)
            .is_some_and(|knot| self.position.cursor < knot.content.len())
    }

    fn continue_paragraph(&mut self) -> Result<String, StoryViewError> {
        if !self.can_continue() {
            return Err(StoryViewError::new(
                "STORY_CANNOT_CONTINUE",
                format!(
                    "No content left at {}:{}",
                    self.position.knot, self.position.cursor
                ),
            ));
        }
        let knot = self.document.knot(&self.position.knot)?;
        let paragraph = knot.content[self.position.cursor].clone();
        self.position.cursor += 1;
        self.position.current_tags = paragraph.tags().to_vec();
        settle(&self.document, &mut self.position)?;
        Ok(paragraph.text().to_string())
    }

    fn current_tags(&self) -> &[String] {
        &self.position.current_tags
    }

    fn global_tags(&self) -> &[String] {
        &self.document.global_tags
    }

    fn current_choices(&self) -> Vec<Choice> {
        if self.can_continue() || self.position.ended {
            return Vec::new();
        }
        self.visible_choices()
            .into_iter()
            .enumerate()
            .map(|(index, (_, choice))| Choice {
                text: choice.text.clone(),
                index,
            })
            .collect()
    }

    fn choose_choice_index(&mut self, index: usize) -> Result<(), StoryViewError> {
        if self.can_continue() {
            return Err(StoryViewError::new(
                "STORY_CHOICE_INVALID",
                "Cannot choose while content is still pending.",
            ));
        }
        let (raw_index, choice) = self
            .visible_choices()
            .get(index)
            .map(|(raw_index, choice)| (*raw_index, (*choice).clone()))
            .ok_or_else(|| {
                StoryViewError::new(
                    "STORY_CHOICE_INVALID",
                    format!("Choice index {} is not offered", index),
                )
            })?;

        debug!(
            knot = %self.position.knot,
            index,
            divert = %choice.divert,
            "choice taken"
        );
        if choice.once {
            self.position
                .taken_once
                .insert(once_key(&self.position.knot, raw_index));
        }
        enter(&mut self.position, &choice.divert);
        self.position.current_tags.clear();
        settle(&self.document, &mut self.position)
    }

    fn reset_state(&mut self) {
        self.position = self.initial.clone();
    }

    fn save_state(&self) -> Result<String, StoryViewError> {
        crate::snapshot::encode(&self.position)
    }

    fn load_state(&mut self, state: &str) -> Result<(), StoryViewError> {
        let position = crate::snapshot::decode(&self.document, state)?;
        self.position = position;
        Ok(())
    }
}

pub(crate) fn once_key(knot: &str, raw_index: usize) -> String {
    format!("{}#{}", knot, raw_index)
}

fn visible_choices<'a>(
    document: &'a StoryDocument,
    position: &Position,
) -> Vec<(usize, &'a KnotChoice)> {
    let Some(knot) = document.knots.get(&position.knot) else {
        return Vec::new();
    };
    knot.choices
        .iter()
        .enumerate()
        .filter(|(raw_index, choice)| {
            !(choice.once
                && position
                    .taken_once
                    .contains(&once_key(&position.knot, *raw_index)))
        })
        .collect()
}

fn enter(position: &mut Position, target: &str) {
    if target == END_KNOT {
        position.ended = true;
        return;
    }
    position.knot = target.to_string();
    position.cursor = 0;
}

/// Follows automatic diverts until the position rests on pending content,
/// offered choices, or the end of the story.
fn settle(document: &StoryDocument, position: &mut Position) -> Result<(), StoryViewError> {
    let mut hops = 0usize;
    loop {
        if position.ended {
            return Ok(());
        }
        let knot = document.knot(&position.knot)?;
        if position.cursor < knot.content.len() || !visible_choices(document, position).is_empty()
        {
            return Ok(());
        }
        match &knot.divert {
            Some(target) => {
                if hops > document.knots.len() {
                    return Err(StoryViewError::new(
                        "STORY_DIVERT_LOOP",
                        format!("Divert loop without content at knot {}", position.knot),
                    ));
                }
                hops += 1;
                debug!(from = %position.knot, to = %target, "divert");
                enter(position, target);
            }
            None => {
                position.ended = true;
                return Ok(());
            }
        }
    }
}
