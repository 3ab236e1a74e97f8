use std::sync::Arc;

use crate::{
    assets::source::FrameSource,
    assets::store::FrameStore,
    config::reel::ReelConfig,
    foundation::core::FrameIndex,
    foundation::error::{ReelError, ReelResult},
    host::document::Document,
    overlay::animator::OverlayAnimator,
    render::renderer::{DrawOutcome, RenderStats, Renderer},
    render::surface::{FrameRGBA, Surface},
    scroll::mapper::{ScrollMetrics, ScrollMapper, ScrollUpdate},
};

/// A mounted scroll-scrubbed hero animation.
///
/// `Stage` owns every piece of mutable state (displayed frame, pending redraw, canvas,
/// frame store) and is driven by the host's event loop through the `on_*` methods:
///
/// - [`Stage::on_scroll`] for scroll events,
/// - [`Stage::on_animation_frame`] once per display refresh,
/// - [`Stage::on_resize`] for viewport changes,
/// - [`Stage::pump_loads`] whenever convenient, to pick up finished image loads.
pub struct Stage<D: Document> {
    config: ReelConfig,
    document: D,
    store: FrameStore,
    renderer: Renderer,
    mapper: ScrollMapper,
    overlays: OverlayAnimator,
}

impl<D: Document> Stage<D> {
    /// Validate `config` against `document`, size the canvas to the viewport, and start
    /// preloading the sequence from `source`.
    ///
    /// Fails with [`ReelError::MissingElement`] if the document lacks any required element.
    #[tracing::instrument(skip_all)]
    pub fn mount(
        config: ReelConfig,
        document: D,
        source: Arc<dyn FrameSource>,
    ) -> ReelResult<Self> {
        config.validate()?;
        if let Some(id) = config.required_elements().find(|id| !document.has_element(id)) {
            return Err(ReelError::missing_element(id));
        }

        let surface = Surface::new(config.initial_canvas, config.clear_rgba)?;
        let store = FrameStore::new(config.sequence.clone(), source);
        let mapper = ScrollMapper::new(config.sequence.frame_count, config.non_scrollable);
        let overlays = OverlayAnimator::new(config.overlays.clone());

        let mut stage = Self {
            config,
            document,
            store,
            renderer: Renderer::new(surface),
            mapper,
            overlays,
        };
        stage.on_resize()?;
        stage.store.preload();
        tracing::info!(
            frames = stage.store.len(),
            canvas_w = stage.renderer.canvas().width,
            canvas_h = stage.renderer.canvas().height,
            "stage mounted"
        );
        Ok(stage)
    }

    /// Map the document's scroll position to progress and frame, restyle every overlay,
    /// and schedule a redraw if the frame changed.
    pub fn on_scroll(&mut self) -> ReelResult<ScrollUpdate> {
        let metrics = ScrollMetrics {
            scroll_top: self.document.scroll_top(),
            scroll_height: self
                .document
                .scroll_height(&self.config.elements.scroll_container)?,
            viewport_height: f64::from(self.document.viewport().height),
        };
        let update = self.mapper.on_scroll(&metrics);
        if update.frame_changed {
            tracing::trace!(frame = %update.frame, progress = update.progress, "frame changed");
        }

        for u in self.overlays.update(update.progress) {
            self.document.set_overlay_style(&u.id, &u.style)?;
        }
        Ok(update)
    }

    /// Run the redraw scheduled by the last frame change, if any.
    pub fn on_animation_frame(&mut self) -> ReelResult<Option<DrawOutcome>> {
        match self.mapper.take_pending() {
            Some(index) => self.renderer.draw_frame(index, &self.store).map(Some),
            None => Ok(None),
        }
    }

    /// Match the canvas to the viewport and redraw the displayed frame immediately.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn on_resize(&mut self) -> ReelResult<DrawOutcome> {
        let viewport = self.document.viewport();
        self.renderer.resize(viewport.as_canvas())?;
        self.renderer.draw_frame(self.mapper.current(), &self.store)
    }

    /// Apply finished loads; draws the deferred frame if it just became ready.
    pub fn pump_loads(&mut self) -> ReelResult<Option<DrawOutcome>> {
        let settled = self.store.poll();
        self.renderer.on_loaded(&settled, &self.store)
    }

    /// Like [`Stage::pump_loads`], but blocks until every started load has settled.
    pub fn wait_for_frames(&mut self) -> ReelResult<Option<DrawOutcome>> {
        let settled = self.store.wait_all();
        self.renderer.on_loaded(&settled, &self.store)
    }

    pub fn current_frame(&self) -> FrameIndex {
        self.mapper.current()
    }

    pub fn pending_redraw(&self) -> Option<FrameIndex> {
        self.mapper.pending()
    }

    pub fn stats(&self) -> RenderStats {
        self.renderer.stats()
    }

    pub fn snapshot(&self) -> FrameRGBA {
        self.renderer.snapshot()
    }

    pub fn config(&self) -> &ReelConfig {
        &self.config
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stage/runtime.rs"]
mod tests;
