use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::{
    foundation::core::{Canvas, FrameIndex},
    foundation::error::{ReelError, ReelResult},
    overlay::animator::OverlaySpec,
    scroll::mapper::NonScrollablePolicy,
};

/// Where the sequence frames live and how their file names are built.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SequenceSpec {
    /// Directory relative to the frame source root. Empty means the root itself.
    pub dir: String,
    pub prefix: String,
    pub extension: String,
    /// Minimum digit count of the zero-padded index.
    pub pad: usize,
    pub frame_count: u32,
}

impl Default for SequenceSpec {
    fn default() -> Self {
        Self {
            dir: "sequence".to_string(),
            prefix: "frame_".to_string(),
            extension: "png".to_string(),
            pad: 2,
            frame_count: 90,
        }
    }
}

impl SequenceSpec {
    /// Relative resource path of `index`, e.g. `sequence/frame_07.png`.
    pub fn frame_path(&self, index: FrameIndex) -> String {
        let file = format!(
            "{}{:0pad$}.{}",
            self.prefix,
            index.0,
            self.extension,
            pad = self.pad
        );
        let dir = self.dir.trim_end_matches('/');
        if dir.is_empty() {
            file
        } else {
            format!("{dir}/{file}")
        }
    }

    pub fn indices(&self) -> impl Iterator<Item = FrameIndex> + use<> {
        (0..self.frame_count).map(FrameIndex)
    }
}

/// Ids of the document elements the stage needs besides the overlays.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ElementIds {
    pub canvas: String,
    pub scroll_container: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            canvas: "hero-canvas".to_string(),
            scroll_container: "scroll-container".to_string(),
        }
    }
}

/// Complete stage configuration. [`Default`] reproduces the stock hero animation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ReelConfig {
    pub sequence: SequenceSpec,
    /// Canvas size before the first resize.
    pub initial_canvas: Canvas,
    pub elements: ElementIds,
    pub overlays: Vec<OverlaySpec>,
    pub non_scrollable: NonScrollablePolicy,
    /// Straight-alpha RGBA used when clearing the canvas. `None` clears to transparent.
    pub clear_rgba: Option<[u8; 4]>,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            sequence: SequenceSpec::default(),
            initial_canvas: Canvas::new(1920, 1080),
            elements: ElementIds::default(),
            overlays: OverlaySpec::defaults(),
            non_scrollable: NonScrollablePolicy::default(),
            clear_rgba: None,
        }
    }
}

impl ReelConfig {
    /// Parse a configuration from a JSON reader. Missing fields take their defaults.
    pub fn from_reader<R: std::io::Read>(r: R) -> ReelResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| ReelError::serde(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn to_json_pretty(&self) -> ReelResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ReelError::serde(e.to_string()))
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.sequence.frame_count == 0 {
            return Err(ReelError::validation("sequence frame_count must be >= 1"));
        }
        if self.sequence.pad == 0 {
            return Err(ReelError::validation("sequence pad must be >= 1"));
        }
        if self.sequence.extension.is_empty() {
            return Err(ReelError::validation("sequence extension must be non-empty"));
        }
        if self.initial_canvas.is_empty() {
            return Err(ReelError::validation("initial_canvas must be non-empty"));
        }
        if self.initial_canvas.width > u32::from(u16::MAX)
            || self.initial_canvas.height > u32::from(u16::MAX)
        {
            return Err(ReelError::validation(
                "initial_canvas dimensions must fit in u16",
            ));
        }

        let mut seen = BTreeSet::new();
        for id in self.required_elements() {
            if id.trim().is_empty() {
                return Err(ReelError::validation("element ids must be non-empty"));
            }
            if !seen.insert(id) {
                return Err(ReelError::validation(format!(
                    "element id '{id}' is used more than once"
                )));
            }
        }
        for overlay in &self.overlays {
            overlay.curve.validate().map_err(|e| {
                ReelError::validation(format!("overlay '{}': {e}", overlay.id))
            })?;
        }
        Ok(())
    }

    /// Every element id the document must provide, canvas first.
    pub fn required_elements(&self) -> impl Iterator<Item = &str> {
        [
            self.elements.canvas.as_str(),
            self.elements.scroll_container.as_str(),
        ]
        .into_iter()
        .chain(self.overlays.iter().map(|o| o.id.as_str()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/reel.rs"]
mod tests;
