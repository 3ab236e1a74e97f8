use std::sync::Arc;

use anyhow::Context;

use crate::foundation::{
    error::{ReelError, ReelResult},
    math::premultiply_rgba8_in_place,
};

/// Decoded sequence frame, held as a premultiplied `vello_cpu` pixmap.
///
/// The pixmap is shared: painting a frame never copies its pixels.
#[derive(Clone, Debug)]
pub struct PreparedFrame {
    /// Intrinsic width in pixels.
    pub width: u32,
    /// Intrinsic height in pixels.
    pub height: u32,
    pixmap: Arc<vello_cpu::Pixmap>,
}

impl PreparedFrame {
    /// Build a frame from row-major premultiplied RGBA8 bytes.
    ///
    /// Frames wider or taller than `u16::MAX` cannot be rasterized and are rejected here.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: &[u8]) -> ReelResult<Self> {
        let w: u16 = width
            .try_into()
            .map_err(|_| ReelError::asset(format!("frame width {width} exceeds u16")))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| ReelError::asset(format!("frame height {height} exceeds u16")))?;
        if rgba8_premul.len() != width as usize * height as usize * 4 {
            return Err(ReelError::asset("frame byte length mismatch"));
        }

        let mut may_have_opacities = false;
        let pixels = rgba8_premul
            .chunks_exact(4)
            .map(|px| {
                may_have_opacities |= px[3] != 255;
                vello_cpu::peniko::color::PremulRgba8 {
                    r: px[0],
                    g: px[1],
                    b: px[2],
                    a: px[3],
                }
            })
            .collect();

        Ok(Self {
            width,
            height,
            pixmap: Arc::new(vello_cpu::Pixmap::from_parts_with_opacity(
                pixels,
                w,
                h,
                may_have_opacities,
            )),
        })
    }

    /// Pixel bytes in row-major premultiplied RGBA8.
    pub fn rgba8_premul(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Image paint sharing this frame's pixmap.
    pub fn paint(&self) -> vello_cpu::Image {
        vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::clone(&self.pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        }
    }

    pub(crate) fn pixmap(&self) -> &Arc<vello_cpu::Pixmap> {
        &self.pixmap
    }
}

/// Decode encoded image bytes (PNG, JPEG, ...) into a premultiplied frame.
pub fn decode_frame(bytes: &[u8]) -> ReelResult<PreparedFrame> {
    let dyn_img = image::load_from_memory(bytes).context("decode frame from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    PreparedFrame::from_premul(width, height, &rgba8_premul)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
