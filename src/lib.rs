//! scrollreel renders a scroll-scrubbed image sequence ("scrollytelling" hero animation)
//! onto a CPU canvas, with parallax text overlays driven by the same scroll progress.
//!
//! # Event flow
//!
//! 1. **Scroll**: `ScrollMetrics -> progress -> FrameIndex`; a changed frame schedules one redraw
//!    for the next animation-frame tick, and every overlay is restyled.
//! 2. **Animation frame**: the scheduled frame is drawn with cover fit.
//! 3. **Resize**: the canvas follows the viewport and the displayed frame is redrawn at once.
//! 4. **Load completion**: a frame that was requested before it finished loading is drawn as
//!    soon as it is ready, unless a newer frame has been requested since.
//!
//! [`Stage`] owns all of this state and is driven by the host through a [`Document`]
//! implementation. [`HeadlessDocument`] covers the CLI and tests.
#![forbid(unsafe_code)]

mod assets;
mod config;
mod foundation;
mod host;
mod overlay;
mod render;
mod scroll;
mod stage;

pub use assets::decode::{PreparedFrame, decode_frame};
pub use assets::source::{DirSource, FrameSource, MemorySource, normalize_rel_path};
pub use assets::store::{FrameStore, LoadState};
pub use config::reel::{ElementIds, ReelConfig, SequenceSpec};
pub use foundation::core::{Affine, Canvas, FrameIndex, Rect, Vec2, Viewport};
pub use foundation::error::{ReelError, ReelResult};
pub use host::document::{Document, HeadlessDocument};
pub use overlay::animator::{
    OverlayAnimator, OverlayCurve, OverlaySpec, OverlayStyle, OverlayUpdate,
};
pub use render::cover::{CoverFit, cover_fit};
pub use render::renderer::{DrawOutcome, RenderStats, Renderer};
pub use render::surface::{FrameRGBA, Surface};
pub use scroll::mapper::{
    NonScrollablePolicy, ScrollMapper, ScrollMetrics, ScrollUpdate, frame_index_for_progress,
    progress,
};
pub use stage::runtime::Stage;
