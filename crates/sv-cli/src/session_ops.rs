use std::time::Instant;

use sv_core::{NarrativeEngine, StoryViewError};
use sv_render::{persist, NarrativeRenderer, RendererConfig};
use sv_story::StoryEngine;
use tracing::warn;

use crate::{create_engine, FileSaveStore, LoadedStory};

pub(crate) type StoryRenderer = NarrativeRenderer<StoryEngine>;

/// Monotonic millisecond clock handed to the renderer each frame.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SessionClock {
    started: Instant,
}

impl SessionClock {
    pub(crate) fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub(crate) fn now_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

pub(crate) fn renderer_config(reveal_interval_ms: Option<u64>) -> RendererConfig {
    let mut config = RendererConfig::default();
    if let Some(interval) = reveal_interval_ms {
        config.reveal_interval_ms = interval;
    }
    config
}

pub(crate) fn create_renderer(
    story: &LoadedStory,
    config: &RendererConfig,
) -> Result<StoryRenderer, StoryViewError> {
    Ok(NarrativeRenderer::new(create_engine(story)?, config))
}

/// Restores an agent state file into a fresh renderer and renders the pending
/// choices so they can be selected.
pub(crate) fn resume_renderer(
    story: &LoadedStory,
    state: &str,
) -> Result<StoryRenderer, StoryViewError> {
    let mut engine = create_engine(story)?;
    engine.load_state(state)?;
    let mut renderer = NarrativeRenderer::new(engine, &RendererConfig::default());
    renderer.continue_story(true, 0)?;
    renderer.show_all_now();
    Ok(renderer)
}

/// Writes the current engine state after a choice. Failures are reported but
/// never interrupt the story.
pub(crate) fn autosave(renderer: &StoryRenderer, saves: &mut FileSaveStore) -> Option<String> {
    match persist(renderer, saves) {
        Ok(true) => saves
            .path()
            .map(|path| format!("autosaved to {}", path.display())),
        Ok(false) => None,
        Err(error) => {
            warn!(code = %error.code, message = %error.message, "autosave failed");
            Some(format!("autosave failed: {}", error.message))
        }
    }
}
