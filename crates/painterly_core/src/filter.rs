//! CPU reference implementation of the painterly filter.
//!
//! This is the normative description of the effect: a pure function from a
//! linear-color reference image plus a structure-tensor field to an output
//! color, fed by explicit per-call parameters. The GPU pass in
//! `painterly_gpu` evaluates the same arithmetic per fragment; tests run it
//! here against synthetic buffers without a device.

use crate::color::encode_rgb;
use crate::kernel::{
    sector_statistics, select_sector, SectorSummary, SECTOR_COUNT,
};
use crate::params::EffectParams;
use crate::tensor::{dominant_orientation, warp_matrix, TensorField, Vec2};
use crate::BufferSizeError;

/// A linear-color RGB image in row-major order.
///
/// Alpha is constant 1.0 through the whole pipeline, so the CPU reference
/// carries three channels; the GPU targets stay RGBA for attachment
/// compatibility.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 3]>,
}

impl ImageBuffer {
    /// An image filled with a single color.
    ///
    /// Zero dimensions are bumped to one pixel, as in [`Resolution::new`],
    /// so clamped indexing always has a pixel to land on.
    ///
    /// [`Resolution::new`]: crate::params::Resolution::new
    pub fn filled(width: u32, height: u32, color: [f32; 3]) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            pixels: vec![color; (width * height) as usize],
        }
    }

    /// Wrap an existing pixel buffer, verifying its dimensions. Zero-sized
    /// dimensions are rejected: the expected length is computed from the
    /// bumped (minimum 1x1) size, which an empty buffer cannot match.
    pub fn from_pixels(
        width: u32,
        height: u32,
        pixels: Vec<[f32; 3]>,
    ) -> Result<Self, BufferSizeError> {
        let width = width.max(1);
        let height = height.max(1);
        let expected = (width * height) as usize;
        if pixels.len() != expected {
            return Err(BufferSizeError {
                expected,
                actual: pixels.len(),
                width,
                height,
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set(&mut self, x: u32, y: u32, color: [f32; 3]) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    pub fn get(&self, x: u32, y: u32) -> [f32; 3] {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Pixel at (x, y) with coordinates clamped to the image bounds,
    /// matching clamp-to-edge sampling on the GPU.
    pub fn get_clamped(&self, x: i32, y: i32) -> [f32; 3] {
        let x = x.clamp(0, self.width as i32 - 1) as u32;
        let y = y.clamp(0, self.height as i32 - 1) as u32;
        self.get(x, y)
    }

    /// Nearest pixel under a fractional offset from the center of (x, y).
    fn sample_offset(&self, x: u32, y: u32, offset: Vec2) -> [f32; 3] {
        let sx = (x as f32 + 0.5 + offset.x).floor() as i32;
        let sy = (y as f32 + 0.5 + offset.y).floor() as i32;
        self.get_clamped(sx, sy)
    }
}

/// Per-sector summaries for one pixel, exposed for tests and debugging.
pub fn sector_summaries(
    image: &ImageBuffer,
    tensors: &TensorField,
    x: u32,
    y: u32,
    radius: u32,
) -> [SectorSummary; SECTOR_COUNT] {
    let orientation = dominant_orientation(tensors.get(x as i32, y as i32));
    let warp = warp_matrix(orientation.direction, orientation.anisotropy());
    let center = image.get_clamped(x as i32, y as i32);

    std::array::from_fn(|sector| {
        sector_statistics(sector, radius, warp, |warped| {
            image.sample_offset(x, y, warped)
        })
        .resolve(center)
    })
}

/// Filter a single pixel, returning the selected sector's linear average
/// color (gamma encoding is applied by [`kuwahara_filter`], as the GPU pass
/// applies it on write-out).
pub fn kuwahara_pixel(
    image: &ImageBuffer,
    tensors: &TensorField,
    x: u32,
    y: u32,
    radius: u32,
) -> [f32; 3] {
    let summaries = sector_summaries(image, tensors, x, y, radius);
    summaries[select_sector(&summaries)].average
}

/// Filter a whole image, producing the display-encoded (sRGB) result.
pub fn kuwahara_filter(
    image: &ImageBuffer,
    tensors: &TensorField,
    params: EffectParams,
) -> ImageBuffer {
    let mut output = ImageBuffer::filled(image.width(), image.height(), [0.0; 3]);
    for y in 0..image.height() {
        for x in 0..image.width() {
            let linear = kuwahara_pixel(image, tensors, x, y, params.radius());
            output.set(x, y, encode_rgb(linear));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::linear_to_srgb;
    use crate::tensor::StructureTensor;

    fn checkerboard(width: u32, height: u32, cell: u32, a: [f32; 3], b: [f32; 3]) -> ImageBuffer {
        let mut image = ImageBuffer::filled(width, height, a);
        for y in 0..height {
            for x in 0..width {
                if ((x / cell) + (y / cell)) % 2 == 1 {
                    image.set(x, y, b);
                }
            }
        }
        image
    }

    #[test]
    fn test_buffer_dimension_check() {
        assert!(ImageBuffer::from_pixels(3, 3, vec![[0.0; 3]; 8]).is_err());
        assert!(ImageBuffer::from_pixels(3, 3, vec![[0.0; 3]; 9]).is_ok());
    }

    #[test]
    fn test_zero_dimensions_are_bumped_not_fatal() {
        // A 0x0 request yields a 1x1 image; clamped access must not panic.
        let image = ImageBuffer::filled(0, 0, [0.5, 0.5, 0.5]);
        assert_eq!((image.width(), image.height()), (1, 1));
        assert_eq!(image.get_clamped(0, 0), [0.5, 0.5, 0.5]);
        assert_eq!(image.get_clamped(-3, 7), [0.5, 0.5, 0.5]);

        // An empty wrapped buffer cannot satisfy the bumped 1x1 size.
        assert!(ImageBuffer::from_pixels(0, 0, vec![]).is_err());
    }

    #[test]
    fn test_uniform_image_round_trips() {
        // Uniform input must produce uniform output equal to the input,
        // regardless of the tensor field.
        let color = [0.2, 0.4, 0.8];
        let image = ImageBuffer::filled(32, 32, color);
        let tensors = TensorField::splat(32, 32, StructureTensor::new(2.0, 0.5, 1.0));

        let summaries = sector_summaries(&image, &tensors, 16, 16, 6);
        for summary in &summaries {
            for c in 0..3 {
                assert!((summary.average[c] - color[c]).abs() < 1e-5);
            }
            assert!(summary.variance.abs() < 1e-5);
        }

        let out = kuwahara_pixel(&image, &tensors, 16, 16, 6);
        for c in 0..3 {
            assert!((out[c] - color[c]).abs() < 1e-5);
        }
    }

    #[test]
    fn test_filter_output_is_gamma_encoded() {
        let color = [0.25, 0.25, 0.25];
        let image = ImageBuffer::filled(8, 8, color);
        let tensors = TensorField::zeroed(8, 8);
        let params = EffectParams::new(2, true);

        let output = kuwahara_filter(&image, &tensors, params);
        let expected = linear_to_srgb(0.25);
        let got = output.get(4, 4);
        for c in 0..3 {
            assert!((got[c] - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn test_checkerboard_selects_dominant_side() {
        // 800x600 viewport, radius 4, isotropic tensors, flat checkerboard
        // with 4px cells: every sector footprint crosses at least one cell
        // edge, so even the winning sector observes a non-uniform
        // neighborhood (variance strictly positive), and its average leans
        // toward the locally dominant checker color.
        let a = [0.1, 0.1, 0.1];
        let b = [0.9, 0.9, 0.9];
        let image = checkerboard(800, 600, 4, a, b);
        let tensors = TensorField::splat(800, 600, StructureTensor::new(1.0, 1.0, 0.0));
        let radius = 4;

        for &(x, y) in &[(100u32, 100u32), (403, 217), (7, 591), (640, 480)] {
            let summaries = sector_summaries(&image, &tensors, x, y, radius);
            let selected = select_sector(&summaries);
            let out = summaries[selected].average;

            // Leans clearly toward one of the two colors, not the midpoint.
            let dist_a: f32 = (0..3).map(|c| (out[c] - a[c]).abs()).sum();
            let dist_b: f32 = (0..3).map(|c| (out[c] - b[c]).abs()).sum();
            let midpoint_dist = 3.0 * (b[0] - a[0]).abs() / 2.0;
            assert!(
                dist_a.min(dist_b) < midpoint_dist,
                "output at ({x},{y}) does not lean to either checker color: {out:?}"
            );

            assert!(
                summaries[selected].variance > 0.0,
                "winning sector at ({x},{y}) saw a uniform neighborhood"
            );
        }
    }

    #[test]
    fn test_edge_pixels_clamp_instead_of_wrapping() {
        let mut image = ImageBuffer::filled(16, 16, [0.0; 3]);
        // Bright column on the far right; a kernel at x=0 must not see it
        // through coordinate wrap-around.
        for y in 0..16 {
            image.set(15, y, [1.0, 1.0, 1.0]);
        }
        let tensors = TensorField::zeroed(16, 16);
        let out = kuwahara_pixel(&image, &tensors, 0, 8, 4);
        for c in 0..3 {
            assert!(out[c] < 0.01, "edge clamp leaked the far column: {out:?}");
        }
    }

    #[test]
    fn test_degenerate_everything_falls_back_to_center() {
        // All-zero tensors and a tiny image: output must be finite and equal
        // to some observed color, never NaN.
        let image = ImageBuffer::filled(1, 1, [0.7, 0.2, 0.4]);
        let tensors = TensorField::zeroed(1, 1);
        let out = kuwahara_pixel(&image, &tensors, 0, 0, 15);
        for c in 0..3 {
            assert!(out[c].is_finite());
            assert!((out[c] - [0.7, 0.2, 0.4][c]).abs() < 1e-5);
        }
    }
}
