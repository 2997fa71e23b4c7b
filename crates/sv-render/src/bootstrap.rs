use sv_core::{NarrativeEngine, SaveBridge, StoryViewError};
use tracing::{debug, info};

use crate::renderer::{BatchReport, NarrativeRenderer};

pub const AUTOLOAD_NOTICE: &str = "<save automatically loaded>";

#[derive(Debug, Clone, PartialEq)]
pub struct SessionStart {
    pub restored: bool,
    pub report: BatchReport,
}

/// Restores a prior save when the story has a title and one exists, then runs
/// the opening continuation cycle. A story without a title never touches the
/// save bridge.
pub fn start_session<E: NarrativeEngine>(
    renderer: &mut NarrativeRenderer<E>,
    saves: &mut dyn SaveBridge,
    now_ms: u64,
) -> Result<SessionStart, StoryViewError> {
    let mut restored = false;

    if let Some(title) = renderer.title().map(str::to_string) {
        if saves.init(&title)? {
            saves.load()?;
            let state = saves
                .data()
                .map(|data| data.state.clone())
                .ok_or_else(|| {
                    StoryViewError::new(
                        "SAVE_EMPTY",
                        "Save bridge reported a save but holds no data.",
                    )
                })?;
            renderer.engine_mut().load_state(&state)?;
            renderer.announce(AUTOLOAD_NOTICE, now_ms);
            restored = true;
            info!(title = %title, "save restored");
        }
        if let Some(delay) = saves.preference("delay") {
            debug!(%delay, "delay preference present");
        }
    } else {
        debug!("story has no title; saving disabled");
    }

    let report = renderer.continue_story(!restored, now_ms)?;
    Ok(SessionStart { restored, report })
}

/// Writes the engine state through the bridge. Returns `false` when saving is
/// disabled because the story has no title.
pub fn persist<E: NarrativeEngine>(
    renderer: &NarrativeRenderer<E>,
    saves: &mut dyn SaveBridge,
) -> Result<bool, StoryViewError> {
    if renderer.title().is_none() {
        return Ok(false);
    }
    let state = renderer.engine().save_state()?;
    saves.save(state)?;
    Ok(true)
}
