use sv_core::{NarrativeEngine, RenderBatch, StoryViewError, VisualNode};
use tracing::{debug, info};

use crate::choice::{ChoiceBinding, ChoiceController};
use crate::reveal::{
    RevealScheduler, TickOutcome, DEFAULT_REVEAL_INTERVAL_MS, DEFAULT_SCROLL_BASE_MS,
    DEFAULT_SCROLL_MS_PER_ROW,
};
use crate::surface::PresentationSurface;
use crate::tags::{DirectiveRegistry, TagInterpreter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
    /// Nothing left to pull and nothing to choose.
    Idle,
    Continuing,
    AwaitingChoice,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    pub reveal_interval_ms: u64,
    pub scroll_base_ms: f64,
    pub scroll_ms_per_row: f64,
    pub width: u16,
    pub visible_height: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            reveal_interval_ms: DEFAULT_REVEAL_INTERVAL_MS,
            scroll_base_ms: DEFAULT_SCROLL_BASE_MS,
            scroll_ms_per_row: DEFAULT_SCROLL_MS_PER_ROW,
            width: 80,
            visible_height: 24,
        }
    }
}

/// What one continuation cycle produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub nodes: usize,
    pub choices: usize,
    pub cumulative_delay_ms: u64,
    pub scroll_target: Option<u32>,
    pub cleared: bool,
    pub restarted: bool,
}

struct PulledBatch {
    batch: RenderBatch,
    clear: bool,
    restart: bool,
}

/// Drives the narrative engine batch by batch onto a presentation surface.
pub struct NarrativeRenderer<E: NarrativeEngine> {
    engine: E,
    tags: TagInterpreter,
    surface: PresentationSurface,
    scheduler: RevealScheduler,
    choices: ChoiceController,
    state: RendererState,
    title: Option<String>,
    restarting: bool,
}

impl<E: NarrativeEngine> NarrativeRenderer<E> {
    pub fn new(engine: E, config: &RendererConfig) -> Self {
        Self::with_directives(engine, config, DirectiveRegistry::default())
    }

    pub fn with_directives(
        engine: E,
        config: &RendererConfig,
        directives: DirectiveRegistry,
    ) -> Self {
        let tags = TagInterpreter::new(directives);
        let title = tags.parse(engine.global_tags()).title;
        let mut surface = PresentationSurface::new(config.width, config.visible_height);
        if let Some(title) = &title {
            surface.set_title(title);
        }
        Self {
            engine,
            tags,
            surface,
            scheduler: RevealScheduler::new(config.reveal_interval_ms)
                .with_scroll_timing(config.scroll_base_ms, config.scroll_ms_per_row),
            choices: ChoiceController::default(),
            state: RendererState::Continuing,
            title,
            restarting: false,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn surface(&self) -> &PresentationSurface {
        &self.surface
    }

    pub fn scheduler(&self) -> &RevealScheduler {
        &self.scheduler
    }

    pub fn state(&self) -> RendererState {
        self.state
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn choice_bindings(&self) -> &[ChoiceBinding] {
        self.choices.bindings()
    }

    pub fn resize(&mut self, width: u16, visible_height: u32) {
        self.surface.resize(width, visible_height);
    }

    /// Pulls everything the engine has up to the next choice point and hands it
    /// to the reveal scheduler. Engine failures abort the cycle before anything
    /// of the batch reaches the surface.
    pub fn continue_story(
        &mut self,
        is_first_run: bool,
        now_ms: u64,
    ) -> Result<BatchReport, StoryViewError> {
        if self.state == RendererState::AwaitingChoice {
            return Err(StoryViewError::new(
                "RENDER_CHOICE_PENDING",
                "The current batch is still waiting for a choice.",
            ));
        }
        self.state = RendererState::Continuing;
        self.choices.clear();
        let mut watermark = if is_first_run {
            0
        } else {
            self.surface.content_bottom_edge()
        };

        let pulled = match self.pull_batch() {
            Ok(pulled) => pulled,
            Err(error) => {
                self.state = RendererState::Idle;
                return Err(error);
            }
        };
        if pulled.restart {
            return self.restart(now_ms);
        }

        if pulled.clear {
            debug!("clearing surface");
            self.scheduler.cancel();
            self.surface.clear_content();
            self.surface.set_header_visible(false);
            self.surface.set_scroll_offset(0.0);
            watermark = 0;
        }

        let mut batch = pulled.batch;
        let offered = self.engine.current_choices();
        if !offered.is_empty() {
            batch.push(VisualNode::choice_container(&offered));
        }

        let projected = self.surface.projected_bottom_edge(batch.nodes());
        self.surface.grow_reserved_height(projected);
        self.surface.set_watermark(watermark);

        let nodes = batch.len();
        let cumulative_delay_ms = self.scheduler.reveal(&mut self.surface, batch, now_ms);
        if let Some(container) = self
            .surface
            .nodes()
            .last()
            .filter(|node| node.is_choice_container())
        {
            self.choices.bind(container);
        }

        let scroll_target = if is_first_run {
            None
        } else {
            Some(self.scheduler.auto_scroll(watermark, &self.surface, now_ms))
        };

        self.state = if offered.is_empty() {
            RendererState::Idle
        } else {
            RendererState::AwaitingChoice
        };
        debug!(nodes, choices = offered.len(), watermark, "batch committed");

        Ok(BatchReport {
            nodes,
            choices: offered.len(),
            cumulative_delay_ms,
            scroll_target,
            cleared: pulled.clear,
            restarted: false,
        })
    }

    fn pull_batch(&mut self) -> Result<PulledBatch, StoryViewError> {
        let mut pulled = PulledBatch {
            batch: RenderBatch::new(),
            clear: false,
            restart: false,
        };

        while self.engine.can_continue() {
            let paragraph = self.engine.next_paragraph()?;
            let tags = self.tags.parse(&paragraph.tags);
            if tags.restart_requested {
                pulled.restart = true;
                return Ok(pulled);
            }
            if tags.clear_requested {
                pulled.batch.clear();
                pulled.clear = true;
            }

            let mut node = VisualNode::text(paragraph.text);
            node.classes.extend(tags.classes_to_add);
            pulled.batch.push(node);
            pulled.batch.extend(tags.elements_to_insert);
        }

        Ok(pulled)
    }

    /// Resets the engine and the surface and renders the opening batch again.
    pub fn restart(&mut self, now_ms: u64) -> Result<BatchReport, StoryViewError> {
        if self.restarting {
            self.state = RendererState::Idle;
            return Err(StoryViewError::new(
                "RENDER_RESTART_LOOP",
                "Story requested a restart from its opening batch.",
            ));
        }
        info!("restarting story");
        self.scheduler.cancel();
        self.choices.clear();
        self.engine.reset_state();
        self.surface.clear_content();
        self.surface.set_header_visible(true);
        self.state = RendererState::Continuing;

        self.restarting = true;
        let result = self.continue_story(true, now_ms);
        self.restarting = false;

        let mut report = result?;
        self.surface.set_scroll_offset(0.0);
        report.restarted = true;
        Ok(report)
    }

    /// Reveals a one-off notice, e.g. after a save was restored.
    pub fn announce(&mut self, text: &str, now_ms: u64) {
        let mut batch = RenderBatch::new();
        batch.push(VisualNode::text(text));
        self.scheduler.reveal(&mut self.surface, batch, now_ms);
    }

    /// Resolves a choice and continues the story. Stale bindings are no-ops.
    pub fn select_choice(
        &mut self,
        binding: &ChoiceBinding,
        now_ms: u64,
    ) -> Result<Option<BatchReport>, StoryViewError> {
        if !self
            .choices
            .select(binding, &mut self.surface, &mut self.engine)?
        {
            return Ok(None);
        }
        self.state = RendererState::Continuing;
        info!(index = binding.choice.index, text = %binding.choice.text, "choice selected");
        self.continue_story(false, now_ms).map(Some)
    }

    /// Selects the `position`-th offered choice, if any.
    pub fn select_offered(
        &mut self,
        position: usize,
        now_ms: u64,
    ) -> Result<BatchReport, StoryViewError> {
        let binding = self
            .choices
            .bindings()
            .get(position)
            .cloned()
            .ok_or_else(|| {
                StoryViewError::new(
                    "RENDER_NO_CHOICE",
                    format!("No choice offered at position {}", position),
                )
            })?;
        self.select_choice(&binding, now_ms)?.ok_or_else(|| {
            StoryViewError::new("RENDER_NO_CHOICE", "Choice is no longer on the surface.")
        })
    }

    pub fn show_all_now(&mut self) -> usize {
        self.scheduler.show_all_now(&mut self.surface)
    }

    pub fn tick(&mut self, now_ms: u64) -> TickOutcome {
        self.scheduler.tick(&mut self.surface, now_ms)
    }
}
