use crate::{
    foundation::core::{Affine, Canvas},
    foundation::error::{ReelError, ReelResult},
    foundation::math::{premul_rgba8, unpremultiply_rgba8_in_place},
    render::cover::{CoverFit, cover_fit},
};

/// Pixels read back from a [`Surface`].
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8, `width * height * 4` bytes.
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Convert to straight alpha, as expected by PNG encoders.
    pub fn into_straight(mut self) -> Self {
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut self.data);
            self.premultiplied = false;
        }
        self
    }

    /// Straight-alpha RGBA8 of the pixel at `(x, y)`, if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let mut px = [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]];
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut px);
        }
        Some(px)
    }
}

/// CPU raster canvas backed by a `vello_cpu` pixmap.
///
/// A zero-sized surface holds no pixmap; drawing onto it is a no-op.
pub struct Surface {
    width: u16,
    height: u16,
    clear_straight: [u8; 4],
    pixmap: Option<vello_cpu::Pixmap>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("clear_rgba", &self.clear_straight)
            .finish()
    }
}

impl Surface {
    pub fn new(canvas: Canvas, clear_rgba: Option<[u8; 4]>) -> ReelResult<Self> {
        let mut surface = Self {
            width: 0,
            height: 0,
            clear_straight: clear_rgba.unwrap_or([0, 0, 0, 0]),
            pixmap: None,
        };
        surface.resize(canvas)?;
        Ok(surface)
    }

    pub fn canvas(&self) -> Canvas {
        Canvas::new(u32::from(self.width), u32::from(self.height))
    }

    /// Reallocate at `canvas` size. Contents are reset to the clear color.
    pub fn resize(&mut self, canvas: Canvas) -> ReelResult<()> {
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| ReelError::render("surface width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| ReelError::render("surface height exceeds u16"))?;

        self.width = width;
        self.height = height;
        self.pixmap = if canvas.is_empty() {
            None
        } else {
            Some(vello_cpu::Pixmap::new(width, height))
        };
        self.clear();
        Ok(())
    }

    pub fn clear(&mut self) {
        let [r, g, b, a] = self.clear_straight;
        let premul = premul_rgba8(r, g, b, a);
        if let Some(pixmap) = self.pixmap.as_mut() {
            clear_pixmap(pixmap, premul);
        }
    }

    /// Clear, then draw `paint` (an image of `img_w x img_h`) with cover fit.
    ///
    /// Returns `None` when the surface is empty.
    pub fn draw_cover(
        &mut self,
        paint: &vello_cpu::Image,
        img_w: u32,
        img_h: u32,
    ) -> Option<CoverFit> {
        let (width, height) = (self.width, self.height);
        let [r, g, b, a] = self.clear_straight;
        let pixmap = self.pixmap.as_mut()?;
        let (w, h) = (f64::from(img_w), f64::from(img_h));
        let fit = cover_fit(w, h, f64::from(width), f64::from(height));

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        if a > 0 {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            ));
        }
        ctx.set_transform(affine_to_cpu(fit.to_affine()));
        ctx.set_paint(paint.clone());
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
        ctx.flush();

        clear_pixmap(pixmap, [0, 0, 0, 0]);
        ctx.render_to_pixmap(pixmap);
        Some(fit)
    }

    /// Copy out the current premultiplied pixels.
    pub fn snapshot(&self) -> FrameRGBA {
        let data = self
            .pixmap
            .as_ref()
            .map(|p| p.data_as_u8_slice().to_vec())
            .unwrap_or_default();
        FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data,
            premultiplied: true,
        }
    }
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, premul: [u8; 4]) {
    for px in pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&premul);
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
