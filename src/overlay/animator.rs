use crate::foundation::error::{ReelError, ReelResult};

/// Inline style written to an overlay element on every scroll event.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayStyle {
    /// Element opacity in `[0, 1]`.
    pub opacity: f64,
    /// Vertical translation in pixels (negative moves up).
    pub translate_y_px: f64,
}

impl OverlayStyle {
    /// CSS `transform` value for this style, e.g. `translateY(-12.5px)`.
    pub fn css_transform(&self) -> String {
        // Avoid printing "-0px" at the resting position.
        let y = if self.translate_y_px == 0.0 {
            0.0
        } else {
            self.translate_y_px
        };
        format!("translateY({y}px)")
    }
}

/// Piecewise-linear mapping from scroll progress to an [`OverlayStyle`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlayCurve {
    /// Fully visible at the top, fading out with `rate` per unit progress.
    ///
    /// `opacity = clamp(1 - p * rate, 0, 1)`, `translateY = p * -drift_px`.
    FadeOut { rate: f64, drift_px: f64 },
    /// Fades in and out around `peak`, invisible outside the open interval `(start, end)`.
    ///
    /// Rises as `(p - start) * slope` below `peak` and falls as `1 - (p - peak) * slope`
    /// from `peak` on. `translateY = (p - peak) * -drift_px` everywhere.
    Triangle {
        start: f64,
        peak: f64,
        end: f64,
        slope: f64,
        drift_px: f64,
    },
}

impl OverlayCurve {
    pub fn style_at(&self, progress: f64) -> OverlayStyle {
        match *self {
            Self::FadeOut { rate, drift_px } => OverlayStyle {
                opacity: (1.0 - progress * rate).clamp(0.0, 1.0),
                translate_y_px: progress * -drift_px,
            },
            Self::Triangle {
                start,
                peak,
                end,
                slope,
                drift_px,
            } => {
                let mut opacity = 0.0;
                if progress > start && progress < end {
                    opacity = if progress < peak {
                        (progress - start) * slope
                    } else {
                        1.0 - (progress - peak) * slope
                    };
                }
                OverlayStyle {
                    opacity: opacity.clamp(0.0, 1.0),
                    translate_y_px: (progress - peak) * -drift_px,
                }
            }
        }
    }

    pub fn validate(&self) -> ReelResult<()> {
        match *self {
            Self::FadeOut { rate, drift_px } => {
                if !rate.is_finite() || !drift_px.is_finite() {
                    return Err(ReelError::validation(
                        "fade_out curve parameters must be finite",
                    ));
                }
            }
            Self::Triangle {
                start,
                peak,
                end,
                slope,
                drift_px,
            } => {
                if ![start, peak, end, slope, drift_px]
                    .iter()
                    .all(|v| v.is_finite())
                {
                    return Err(ReelError::validation(
                        "triangle curve parameters must be finite",
                    ));
                }
                if !(start < peak && peak < end) {
                    return Err(ReelError::validation(
                        "triangle curve requires start < peak < end",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Binds a document element id to the curve that animates it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlaySpec {
    pub id: String,
    pub curve: OverlayCurve,
}

impl OverlaySpec {
    /// The three hero sections: a fade-out intro followed by two bells peaking at 35% and 65%.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self {
                id: "section-1".to_string(),
                curve: OverlayCurve::FadeOut {
                    rate: 5.0,
                    drift_px: 100.0,
                },
            },
            Self {
                id: "section-2".to_string(),
                curve: OverlayCurve::Triangle {
                    start: 0.15,
                    peak: 0.35,
                    end: 0.55,
                    slope: 5.0,
                    drift_px: 50.0,
                },
            },
            Self {
                id: "section-3".to_string(),
                curve: OverlayCurve::Triangle {
                    start: 0.45,
                    peak: 0.65,
                    end: 0.85,
                    slope: 5.0,
                    drift_px: 50.0,
                },
            },
        ]
    }
}

/// One overlay's computed style for a given progress.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct OverlayUpdate {
    pub id: String,
    pub style: OverlayStyle,
}

/// Maps scroll progress to styles for a fixed set of overlays.
#[derive(Clone, Debug)]
pub struct OverlayAnimator {
    overlays: Vec<OverlaySpec>,
}

impl OverlayAnimator {
    pub fn new(overlays: Vec<OverlaySpec>) -> Self {
        Self { overlays }
    }

    pub fn overlays(&self) -> &[OverlaySpec] {
        &self.overlays
    }

    /// Compute every overlay's style for `progress`, in declaration order.
    pub fn update(&self, progress: f64) -> Vec<OverlayUpdate> {
        self.overlays
            .iter()
            .map(|o| OverlayUpdate {
                id: o.id.clone(),
                style: o.curve.style_at(progress),
            })
            .collect()
    }
}

impl Default for OverlayAnimator {
    fn default() -> Self {
        Self::new(OverlaySpec::defaults())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/animator.rs"]
mod tests;
