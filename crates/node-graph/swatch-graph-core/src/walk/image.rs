//! Reduce an image to one representative color.

use swatch_api_core::Color;

use super::Quantity;

/// Averages the visible pixels of a flat RGBA buffer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ImageSampler {
    /// Pixels with alpha below this are ignored.
    pub alpha_threshold: f32,
}

impl Default for ImageSampler {
    fn default() -> Self {
        ImageSampler {
            alpha_threshold: Self::DEFAULT_ALPHA_THRESHOLD,
        }
    }
}

impl ImageSampler {
    pub const DEFAULT_ALPHA_THRESHOLD: f32 = 0.7;

    pub fn new(alpha_threshold: f32) -> Self {
        ImageSampler { alpha_threshold }
    }

    /// Per-channel mean of the RGB of every pixel whose alpha reaches the
    /// threshold. `None` when no pixel qualifies or the mean is not finite.
    /// A trailing partial pixel is ignored.
    pub fn mean_visible(&self, pixels: &[f32]) -> Option<Color> {
        let mut sum = [0.0f64; 3];
        let mut count = 0usize;
        for px in pixels.chunks_exact(4) {
            if px[3] >= self.alpha_threshold {
                sum[0] += f64::from(px[0]);
                sum[1] += f64::from(px[1]);
                sum[2] += f64::from(px[2]);
                count += 1;
            }
        }
        if count == 0 {
            return None;
        }
        let n = count as f64;
        let mean = Color::rgb((sum[0] / n) as f32, (sum[1] / n) as f32, (sum[2] / n) as f32);
        mean.is_finite().then_some(mean)
    }

    /// Sample an optional image as a `T`.
    ///
    /// No image gives [`Quantity::MISSING_TEXTURE`]; an image with nothing
    /// visible gives `default`. Colors keep the mean, scalars take the
    /// brightest channel of the mean.
    pub fn sample<T: Quantity>(&self, pixels: Option<&[f32]>, default: T) -> T {
        match pixels {
            None => T::MISSING_TEXTURE,
            Some(pixels) => self
                .mean_visible(pixels)
                .map(T::from_color)
                .unwrap_or(default),
        }
    }
}
