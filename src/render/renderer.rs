use crate::{
    assets::store::{FrameStore, LoadState},
    foundation::core::{Canvas, FrameIndex},
    foundation::error::ReelResult,
    render::cover::CoverFit,
    render::surface::{FrameRGBA, Surface},
};

/// What a draw request did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawOutcome {
    /// The frame was drawn with the given placement.
    Drawn(CoverFit),
    /// The frame is not loaded yet; it is drawn once its load completes, unless a newer
    /// request replaces it first.
    Deferred,
    /// Nothing to draw: the frame failed to load or the canvas has no area.
    Skipped,
}

/// Draw counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RenderStats {
    pub draws: u64,
    pub deferred: u64,
    pub skipped: u64,
}

/// Draws sequence frames onto the canvas surface with cover fit.
///
/// All draws go through [`Renderer::draw_frame`]: a ready frame is drawn immediately, a
/// pending one is remembered and drawn by [`Renderer::on_loaded`]. Only the most recently
/// requested frame is ever remembered, so a slow load can never paint over a newer frame.
///
/// Frames are painted straight from the store's pixmaps; the renderer keeps no pixels of
/// its own besides the surface.
#[derive(Debug)]
pub struct Renderer {
    surface: Surface,
    awaiting: Option<FrameIndex>,
    stats: RenderStats,
}

impl Renderer {
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            awaiting: None,
            stats: RenderStats::default(),
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn canvas(&self) -> Canvas {
        self.surface.canvas()
    }

    pub fn resize(&mut self, canvas: Canvas) -> ReelResult<()> {
        self.surface.resize(canvas)
    }

    /// Frame waiting for its load to complete before it can be drawn.
    pub fn awaiting(&self) -> Option<FrameIndex> {
        self.awaiting
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn snapshot(&self) -> FrameRGBA {
        self.surface.snapshot()
    }

    /// Ensure `index` is ready, then draw it; defer if it is still loading.
    #[tracing::instrument(level = "trace", skip(self, store))]
    pub fn draw_frame(&mut self, index: FrameIndex, store: &FrameStore) -> ReelResult<DrawOutcome> {
        let frame = match store.state(index) {
            Some(LoadState::Ready(frame)) => frame,
            Some(LoadState::Pending) => {
                self.awaiting = Some(index);
                self.stats.deferred += 1;
                tracing::debug!(frame = %index, "frame not loaded, deferring draw");
                return Ok(DrawOutcome::Deferred);
            }
            Some(LoadState::Failed(_)) | None => {
                self.awaiting = None;
                self.stats.skipped += 1;
                tracing::debug!(frame = %index, "frame unavailable, skipping draw");
                return Ok(DrawOutcome::Skipped);
            }
        };

        self.awaiting = None;
        match self.surface.draw_cover(&frame.paint(), frame.width, frame.height) {
            Some(fit) => {
                self.stats.draws += 1;
                Ok(DrawOutcome::Drawn(fit))
            }
            None => {
                self.stats.skipped += 1;
                Ok(DrawOutcome::Skipped)
            }
        }
    }

    /// React to settled loads: draw the awaited frame if it is among them.
    pub fn on_loaded(
        &mut self,
        settled: &[FrameIndex],
        store: &FrameStore,
    ) -> ReelResult<Option<DrawOutcome>> {
        match self.awaiting {
            Some(want) if settled.contains(&want) => self.draw_frame(want, store).map(Some),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
