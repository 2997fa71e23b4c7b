use sv_core::{class, NodeId, RenderBatch};
use tracing::debug;

use crate::surface::PresentationSurface;

pub const DEFAULT_REVEAL_INTERVAL_MS: u64 = 200;
pub const DEFAULT_SCROLL_BASE_MS: f64 = 300.0;
pub const DEFAULT_SCROLL_MS_PER_ROW: f64 = 3.0;

/// Ease-in/ease-out curve `3t^2 - 2t^3`, with `t` clamped to `[0, 1]`.
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    3.0 * t * t - 2.0 * t * t * t
}

/// Target offset for an auto-scroll: the previous bottom edge, but never past
/// the bottom of the scrollable area.
pub fn scroll_target(
    previous_bottom_edge: u32,
    scrollable_height: u32,
    visible_height: u32,
) -> u32 {
    previous_bottom_edge.min(scrollable_height.saturating_sub(visible_height))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrollAnimation {
    start: f64,
    target: f64,
    duration_ms: f64,
    elapsed_ms: f64,
}

impl ScrollAnimation {
    pub fn new(start: f64, target: f64, base_ms: f64, ms_per_row: f64) -> Self {
        let distance = (target - start).abs();
        Self {
            start,
            target,
            duration_ms: base_ms + ms_per_row * distance,
            elapsed_ms: 0.0,
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn offset(&self) -> f64 {
        let lerp = smoothstep(self.progress());
        (1.0 - lerp) * self.start + lerp * self.target
    }

    fn progress(&self) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        self.elapsed_ms / self.duration_ms
    }

    /// Advances the animation; returns `true` once it has reached its target.
    pub fn update(&mut self, delta_ms: f64) -> bool {
        self.elapsed_ms += delta_ms.max(0.0);
        self.progress() >= 1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingReveal {
    node: NodeId,
    fire_at_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub revealed: usize,
    pub scrolled: bool,
}

/// Staggers node visibility over time and drives the auto-scroll animation.
/// Time is supplied by the caller in milliseconds.
#[derive(Debug, Clone)]
pub struct RevealScheduler {
    interval_ms: u64,
    scroll_base_ms: f64,
    scroll_ms_per_row: f64,
    pending: Vec<PendingReveal>,
    animation: Option<(ScrollAnimation, u64)>,
}

impl Default for RevealScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_REVEAL_INTERVAL_MS)
    }
}

impl RevealScheduler {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            scroll_base_ms: DEFAULT_SCROLL_BASE_MS,
            scroll_ms_per_row: DEFAULT_SCROLL_MS_PER_ROW,
            pending: Vec::new(),
            animation: None,
        }
    }

    pub fn with_scroll_timing(mut self, base_ms: f64, ms_per_row: f64) -> Self {
        self.scroll_base_ms = base_ms;
        self.scroll_ms_per_row = ms_per_row;
        self
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_scrolling(&self) -> bool {
        self.animation.is_some()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.animation.is_none()
    }

    /// Appends the batch hidden and schedules node `i` to appear at
    /// `now_ms + i * interval`. Returns the delay of the last node.
    pub fn reveal(
        &mut self,
        surface: &mut PresentationSurface,
        batch: RenderBatch,
        now_ms: u64,
    ) -> u64 {
        let mut delay = 0u64;
        for (position, mut node) in batch.into_nodes().into_iter().enumerate() {
            node.add_class(class::SCENE);
            node.add_class(class::HIDE);
            let id = surface.append(node);
            delay = (position as u64).saturating_mul(self.interval_ms);
            self.schedule(PendingReveal {
                node: id,
                fire_at_ms: now_ms.saturating_add(delay),
            });
        }
        debug!(
            pending = self.pending.len(),
            cumulative_delay_ms = delay,
            "batch scheduled"
        );
        delay
    }

    fn schedule(&mut self, reveal: PendingReveal) {
        let at = self
            .pending
            .partition_point(|pending| pending.fire_at_ms <= reveal.fire_at_ms);
        self.pending.insert(at, reveal);
    }

    /// Fires every reveal due at `now_ms`, in schedule order, and advances the
    /// scroll animation by the time since the previous frame.
    pub fn tick(&mut self, surface: &mut PresentationSurface, now_ms: u64) -> TickOutcome {
        let due = self
            .pending
            .partition_point(|pending| pending.fire_at_ms <= now_ms);
        let mut outcome = TickOutcome::default();
        for reveal in self.pending.drain(..due) {
            if let Some(node) = surface.node_mut(reveal.node) {
                if node.remove_class(class::HIDE) {
                    outcome.revealed += 1;
                }
            }
        }

        if let Some((animation, last_frame_ms)) = self.animation.as_mut() {
            let delta = now_ms.saturating_sub(*last_frame_ms) as f64;
            *last_frame_ms = now_ms;
            let done = animation.update(delta);
            surface.set_scroll_offset(animation.offset());
            outcome.scrolled = true;
            if done {
                self.animation = None;
            }
        }

        outcome
    }

    /// Makes every hidden node visible at once and drops pending timers.
    pub fn show_all_now(&mut self, surface: &mut PresentationSurface) -> usize {
        self.pending.clear();
        let ids = surface
            .nodes()
            .iter()
            .filter(|node| node.is_hidden())
            .map(|node| node.id)
            .collect::<Vec<_>>();
        for id in &ids {
            if let Some(node) = surface.node_mut(*id) {
                node.remove_class(class::HIDE);
            }
        }
        ids.len()
    }

    /// Starts scrolling toward `previous_bottom_edge`; an animation already in
    /// flight is replaced. Returns the clamped target.
    pub fn auto_scroll(
        &mut self,
        previous_bottom_edge: u32,
        surface: &PresentationSurface,
        now_ms: u64,
    ) -> u32 {
        let target = scroll_target(
            previous_bottom_edge,
            surface.scrollable_height(),
            surface.visible_height(),
        );
        let animation = ScrollAnimation::new(
            surface.scroll().offset,
            f64::from(target),
            self.scroll_base_ms,
            self.scroll_ms_per_row,
        );
        debug!(
            from = surface.scroll().offset,
            target,
            duration_ms = animation.duration_ms(),
            "auto scroll"
        );
        self.animation = Some((animation, now_ms));
        target
    }

    /// Drops pending reveals and any running scroll animation.
    pub fn cancel(&mut self) {
        self.pending.clear();
        self.animation = None;
    }
}

#[cfg(test)]
mod reveal_tests {
    use super::*;
    use sv_core::VisualNode;

    fn batch(count: usize) -> RenderBatch {
        let mut batch = RenderBatch::new();
        for index in 0..count {
            batch.push(VisualNode::text(format!("node {}", index)));
        }
        batch
    }

    fn hidden_flags(surface: &PresentationSurface) -> Vec<bool> {
        surface.nodes().iter().map(|node| node.is_hidden()).collect()
    }

    #[test]
    fn nodes_appear_at_index_times_interval() {
        let mut surface = PresentationSurface::new(40, 10);
        let mut scheduler = RevealScheduler::default();
        let delay = scheduler.reveal(&mut surface, batch(3), 1_000);
        assert_eq!(delay, 400);
        assert_eq!(hidden_flags(&surface), vec![true, true, true]);
        assert!(surface.nodes().iter().all(|node| node.has_class(class::SCENE)));

        assert_eq!(scheduler.tick(&mut surface, 1_000).revealed, 1);
        assert_eq!(hidden_flags(&surface), vec![false, true, true]);
        assert_eq!(scheduler.tick(&mut surface, 1_199).revealed, 0);
        assert_eq!(scheduler.tick(&mut surface, 1_200).revealed, 1);
        assert_eq!(scheduler.tick(&mut surface, 5_000).revealed, 1);
        assert_eq!(hidden_flags(&surface), vec![false, false, false]);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn late_tick_fires_due_reveals_in_index_order() {
        let mut surface = PresentationSurface::new(40, 10);
        let mut scheduler = RevealScheduler::new(50);
        scheduler.reveal(&mut surface, batch(4), 0);
        assert_eq!(scheduler.tick(&mut surface, 120).revealed, 3);
        assert_eq!(hidden_flags(&surface), vec![false, false, false, true]);
    }

    #[test]
    fn huge_intervals_saturate_and_keep_index_order() {
        let mut surface = PresentationSurface::new(40, 10);
        let mut scheduler = RevealScheduler::new(u64::MAX);
        let delay = scheduler.reveal(&mut surface, batch(3), 5);
        assert_eq!(delay, u64::MAX);
        assert_eq!(scheduler.tick(&mut surface, 5).revealed, 1);
        assert_eq!(hidden_flags(&surface), vec![false, true, true]);

        let ids = surface.nodes().iter().map(|node| node.id).collect::<Vec<_>>();
        let order = scheduler
            .pending
            .iter()
            .map(|pending| pending.node)
            .collect::<Vec<_>>();
        assert_eq!(order, ids[1..].to_vec());
        assert_eq!(scheduler.tick(&mut surface, u64::MAX).revealed, 2);
    }

    #[test]
    fn empty_batch_has_no_delay() {
        let mut surface = PresentationSurface::new(40, 10);
        let mut scheduler = RevealScheduler::default();
        assert_eq!(scheduler.reveal(&mut surface, RenderBatch::new(), 0), 0);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn show_all_now_reveals_everything_and_cancels_timers() {
        let mut surface = PresentationSurface::new(40, 10);
        let mut scheduler = RevealScheduler::default();
        scheduler.reveal(&mut surface, batch(3), 0);
        assert_eq!(scheduler.show_all_now(&mut surface), 3);
        assert_eq!(hidden_flags(&surface), vec![false, false, false]);
        assert_eq!(scheduler.pending_count(), 0);
        assert_eq!(scheduler.tick(&mut surface, 10_000).revealed, 0);
    }

    #[test]
    fn reveals_for_removed_nodes_are_ignored() {
        let mut surface = PresentationSurface::new(40, 10);
        let mut scheduler = RevealScheduler::default();
        scheduler.reveal(&mut surface, batch(2), 0);
        surface.clear_content();
        assert_eq!(scheduler.tick(&mut surface, 1_000).revealed, 0);
    }

    #[test]
    fn scroll_target_is_clamped_to_the_scrollable_range() {
        assert_eq!(scroll_target(500, 400, 100), 300);
        assert_eq!(scroll_target(120, 400, 100), 120);
        assert_eq!(scroll_target(50, 20, 100), 0);
    }

    #[test]
    fn smoothstep_eases_between_endpoints() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(1.5), 1.0);
        assert!(smoothstep(0.25) < 0.25);
    }

    #[test]
    fn scroll_animation_duration_grows_with_distance() {
        let animation = ScrollAnimation::new(0.0, 100.0, 300.0, 3.0);
        assert_eq!(animation.duration_ms(), 600.0);
        let upward = ScrollAnimation::new(100.0, 0.0, 300.0, 3.0);
        assert_eq!(upward.duration_ms(), 600.0);
    }

    #[test]
    fn scroll_animation_stops_at_target() {
        let mut animation = ScrollAnimation::new(10.0, 30.0, 300.0, 3.0);
        assert_eq!(animation.offset(), 10.0);
        assert!(!animation.update(180.0));
        assert_eq!(animation.offset(), 20.0);
        assert!(animation.update(200.0));
        assert_eq!(animation.offset(), 30.0);
    }

    #[test]
    fn auto_scroll_animates_surface_offset() {
        let mut surface = PresentationSurface::new(40, 4);
        surface.grow_reserved_height(20);
        let mut scheduler = RevealScheduler::default();
        let target = scheduler.auto_scroll(500, &surface, 0);
        assert_eq!(target, 16);
        assert!(scheduler.is_scrolling());

        let duration = 300 + 3 * 16;
        scheduler.tick(&mut surface, duration / 2);
        assert_eq!(surface.scroll().offset, 8.0);
        let outcome = scheduler.tick(&mut surface, duration);
        assert!(outcome.scrolled);
        assert_eq!(surface.scroll().offset, 16.0);
        assert!(!scheduler.is_scrolling());
    }

    #[test]
    fn a_new_scroll_replaces_the_running_one() {
        let mut surface = PresentationSurface::new(40, 4);
        surface.grow_reserved_height(40);
        let mut scheduler = RevealScheduler::default();
        scheduler.auto_scroll(30, &surface, 0);
        scheduler.tick(&mut surface, 100);
        let midway = surface.scroll().offset;
        assert!(midway > 0.0 && midway < 30.0);

        scheduler.auto_scroll(10, &surface, 100);
        scheduler.tick(&mut surface, 10_000);
        assert_eq!(surface.scroll().offset, 10.0);
        assert!(!scheduler.is_scrolling());
    }
}
