use crate::foundation::core::FrameIndex;

/// Raw scroll geometry sampled from the document on a scroll event.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScrollMetrics {
    /// Current vertical scroll offset of the document.
    pub scroll_top: f64,
    /// Full scrollable height of the scroll container.
    pub scroll_height: f64,
    /// Height of the viewport.
    pub viewport_height: f64,
}

impl ScrollMetrics {
    pub fn max_scroll_top(&self) -> f64 {
        self.scroll_height - self.viewport_height
    }
}

/// Progress reported when the scroll container is not taller than the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonScrollablePolicy {
    /// Pin to the first frame.
    #[default]
    Top,
    /// Pin to the last frame.
    Bottom,
}

impl NonScrollablePolicy {
    pub fn progress(self) -> f64 {
        match self {
            Self::Top => 0.0,
            Self::Bottom => 1.0,
        }
    }
}

/// Normalized scroll position in `[0, 1]`. Never NaN.
pub fn progress(metrics: &ScrollMetrics, policy: NonScrollablePolicy) -> f64 {
    let max = metrics.max_scroll_top();
    // `!(max > 0.0)` also catches NaN geometry.
    if !(max > 0.0) {
        return policy.progress();
    }
    let fraction = metrics.scroll_top / max;
    if fraction.is_nan() {
        return policy.progress();
    }
    fraction.clamp(0.0, 1.0)
}

/// `min(N - 1, ceil(progress * (N - 1)))`, with `progress` clamped to `[0, 1]`.
pub fn frame_index_for_progress(progress: f64, frame_count: u32) -> FrameIndex {
    let last = frame_count.saturating_sub(1);
    let p = if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    };
    let idx = (p * f64::from(last)).ceil() as u32;
    FrameIndex(idx.min(last))
}

/// Result of mapping one scroll event.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ScrollUpdate {
    pub progress: f64,
    pub frame: FrameIndex,
    /// True when `frame` differs from the previously displayed frame.
    pub frame_changed: bool,
}

/// Owns the displayed frame index and the redraw scheduled for the next animation frame.
#[derive(Clone, Debug)]
pub struct ScrollMapper {
    frame_count: u32,
    policy: NonScrollablePolicy,
    current: FrameIndex,
    pending: Option<FrameIndex>,
}

impl ScrollMapper {
    pub fn new(frame_count: u32, policy: NonScrollablePolicy) -> Self {
        Self {
            frame_count,
            policy,
            current: FrameIndex(0),
            pending: None,
        }
    }

    /// Frame index currently displayed (or about to be).
    pub fn current(&self) -> FrameIndex {
        self.current
    }

    /// Redraw scheduled for the next tick, if any.
    pub fn pending(&self) -> Option<FrameIndex> {
        self.pending
    }

    /// Map a scroll event. Schedules a redraw only when the frame index changes; several
    /// changes before the next tick collapse into one redraw of the latest frame.
    pub fn on_scroll(&mut self, metrics: &ScrollMetrics) -> ScrollUpdate {
        let progress = progress(metrics, self.policy);
        let frame = frame_index_for_progress(progress, self.frame_count);
        let frame_changed = frame != self.current;
        if frame_changed {
            self.current = frame;
            self.pending = Some(frame);
        }
        ScrollUpdate {
            progress,
            frame,
            frame_changed,
        }
    }

    /// Consume the scheduled redraw on an animation-frame tick.
    pub fn take_pending(&mut self) -> Option<FrameIndex> {
        self.pending.take()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/mapper.rs"]
mod tests;
