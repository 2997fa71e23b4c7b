//! Presentation pipeline: tag interpretation, the continuation loop, staggered
//! reveal with auto-scroll, and choice selection.

pub mod bootstrap;
pub mod choice;
pub mod renderer;
pub mod reveal;
pub mod surface;
pub mod tags;

pub use bootstrap::{persist, start_session, SessionStart, AUTOLOAD_NOTICE};
pub use choice::{ChoiceBinding, ChoiceController};
pub use renderer::{BatchReport, NarrativeRenderer, RendererConfig, RendererState};
pub use reveal::{
    scroll_target, smoothstep, RevealScheduler, ScrollAnimation, TickOutcome,
    DEFAULT_REVEAL_INTERVAL_MS,
};
pub use surface::{wrap_words, PresentationSurface, RowRole, SurfaceRow};
pub use tags::{DirectiveConstructor, DirectiveRegistry, TagInterpreter};
