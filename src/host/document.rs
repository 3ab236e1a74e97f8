use std::collections::BTreeMap;

use crate::{
    config::reel::ReelConfig,
    foundation::core::Viewport,
    foundation::error::{ReelError, ReelResult},
    overlay::animator::OverlayStyle,
};

/// The page hosting the animation: element lookup, scroll geometry, and overlay styling.
pub trait Document {
    fn has_element(&self, id: &str) -> bool;

    fn viewport(&self) -> Viewport;

    /// Vertical scroll offset of the document.
    fn scroll_top(&self) -> f64;

    /// Scrollable height of element `id`.
    fn scroll_height(&self, id: &str) -> ReelResult<f64>;

    /// Write inline opacity/transform on element `id`.
    fn set_overlay_style(&mut self, id: &str, style: &OverlayStyle) -> ReelResult<()>;
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Element {
    scroll_height: f64,
    style: Option<OverlayStyle>,
}

/// In-memory [`Document`] used by the CLI and tests.
#[derive(Clone, Debug)]
pub struct HeadlessDocument {
    viewport: Viewport,
    scroll_top: f64,
    elements: BTreeMap<String, Element>,
}

impl HeadlessDocument {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            scroll_top: 0.0,
            elements: BTreeMap::new(),
        }
    }

    /// Document with every element `config` needs; the scroll container is
    /// `scroll_height` tall.
    pub fn for_config(config: &ReelConfig, viewport: Viewport, scroll_height: f64) -> Self {
        let mut doc = Self::new(viewport);
        for id in config.required_elements() {
            doc = doc.with_element(id);
        }
        doc.with_scroll_container(&config.elements.scroll_container, scroll_height)
    }

    pub fn with_element(mut self, id: &str) -> Self {
        self.elements.entry(id.to_string()).or_default();
        self
    }

    pub fn with_scroll_container(mut self, id: &str, scroll_height: f64) -> Self {
        self.elements.entry(id.to_string()).or_default().scroll_height = scroll_height;
        self
    }

    pub fn set_scroll_top(&mut self, scroll_top: f64) {
        self.scroll_top = scroll_top;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Last style written to element `id`.
    pub fn style(&self, id: &str) -> Option<OverlayStyle> {
        self.elements.get(id).and_then(|e| e.style)
    }

    /// Scroll offset at which the container is scrolled to the bottom.
    pub fn max_scroll_top(&self, container: &str) -> f64 {
        let height = self.elements.get(container).map_or(0.0, |e| e.scroll_height);
        (height - f64::from(self.viewport.height)).max(0.0)
    }
}

impl Document for HeadlessDocument {
    fn has_element(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn scroll_height(&self, id: &str) -> ReelResult<f64> {
        self.elements
            .get(id)
            .map(|e| e.scroll_height)
            .ok_or_else(|| ReelError::missing_element(id))
    }

    fn set_overlay_style(&mut self, id: &str, style: &OverlayStyle) -> ReelResult<()> {
        let el = self
            .elements
            .get_mut(id)
            .ok_or_else(|| ReelError::missing_element(id))?;
        el.style = Some(*style);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/document.rs"]
mod tests;
