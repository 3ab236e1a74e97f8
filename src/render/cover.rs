use crate::foundation::core::{Affine, Rect, Vec2};

/// Placement of an image scaled to cover a canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    /// Uniform scale applied to the image.
    pub scale: f64,
    /// Destination rectangle in canvas space; may extend past the canvas edges.
    pub dest: Rect,
}

impl CoverFit {
    /// Transform from image space to canvas space.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(Vec2::new(self.dest.x0, self.dest.y0)) * Affine::scale(self.scale)
    }

    /// Whether `dest` contains `[0, canvas_w] x [0, canvas_h]`, within `eps`.
    pub fn covers(&self, canvas_w: f64, canvas_h: f64, eps: f64) -> bool {
        self.dest.x0 <= eps
            && self.dest.y0 <= eps
            && self.dest.x1 >= canvas_w - eps
            && self.dest.y1 >= canvas_h - eps
    }
}

/// Scale `img_w x img_h` so it fills `canvas_w x canvas_h` completely, preserving aspect
/// ratio and centering the overflow on both axes.
pub fn cover_fit(img_w: f64, img_h: f64, canvas_w: f64, canvas_h: f64) -> CoverFit {
    let scale = (canvas_w / img_w).max(canvas_h / img_h);
    let w = img_w * scale;
    let h = img_h * scale;
    let x = (canvas_w - w) / 2.0;
    let y = (canvas_h - h) / 2.0;
    CoverFit {
        scale,
        dest: Rect::new(x, y, x + w, y + h),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cover.rs"]
mod tests;
