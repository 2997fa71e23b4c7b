use sv_core::{Choice, NarrativeEngine, NodeId, NodeKind, StoryViewError, VisualNode};
use tracing::debug;

use crate::surface::PresentationSurface;

/// Selection handle for one rendered choice: the container it lives in plus
/// the engine choice it resumes with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceBinding {
    pub container: NodeId,
    pub node: NodeId,
    pub choice: Choice,
}

#[derive(Debug, Clone, Default)]
pub struct ChoiceController {
    bindings: Vec<ChoiceBinding>,
}

impl ChoiceController {
    pub fn bindings(&self) -> &[ChoiceBinding] {
        &self.bindings
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    /// Registers one binding per choice child of an appended container.
    pub fn bind(&mut self, container: &VisualNode) {
        self.bindings.extend(container.children.iter().filter_map(|child| {
            let NodeKind::Choice { index } = child.kind else {
                return None;
            };
            Some(ChoiceBinding {
                container: container.id,
                node: child.id,
                choice: Choice {
                    text: child.text.clone(),
                    index,
                },
            })
        }));
    }

    /// Hands the chosen index to the engine, then removes the offered choices
    /// from the surface. Returns `false` without touching anything when the
    /// binding's container is already gone. A rejected choice leaves the
    /// container and its bindings in place.
    pub fn select<E: NarrativeEngine>(
        &mut self,
        binding: &ChoiceBinding,
        surface: &mut PresentationSurface,
        engine: &mut E,
    ) -> Result<bool, StoryViewError> {
        if !surface.contains(binding.container) {
            debug!(index = binding.choice.index, "stale choice ignored");
            return Ok(false);
        }
        engine.choose_choice_index(binding.choice.index)?;
        surface.remove_choice_containers();
        self.bindings.clear();
        Ok(true)
    }
}
