//! Structure-tensor analysis: eigenvalues, dominant orientation, anisotropy,
//! and the anisotropic warp applied to kernel sample offsets.
//!
//! A structure tensor is a 2x2 symmetric matrix summarizing local gradient
//! orientation and strength. Being symmetric it is stored as three
//! components (Jxx, Jyy, Jxy); its eigen-decomposition has a closed form
//! through the trace and determinant.

use crate::filter::ImageBuffer;
use crate::BufferSizeError;

/// Guard against division by zero on flat (zero-gradient) regions.
pub const TENSOR_EPSILON: f32 = 1e-7;

/// Tuning constant controlling how strongly anisotropy elongates the
/// sampling kernel.
pub const KERNEL_ALPHA: f32 = 25.0;

/// 2D vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn normalized(self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self::new(self.x / len, self.y / len)
        } else {
            self
        }
    }

    pub fn scale(self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s)
    }
}

/// Row-major 2x2 matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat2 {
    pub m00: f32,
    pub m01: f32,
    pub m10: f32,
    pub m11: f32,
}

impl Mat2 {
    pub const IDENTITY: Mat2 = Mat2 {
        m00: 1.0,
        m01: 0.0,
        m10: 0.0,
        m11: 1.0,
    };

    pub fn mul_vec(self, v: Vec2) -> Vec2 {
        Vec2::new(
            self.m00 * v.x + self.m01 * v.y,
            self.m10 * v.x + self.m11 * v.y,
        )
    }
}

/// One pixel's 2x2 symmetric structure tensor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StructureTensor {
    pub jxx: f32,
    pub jyy: f32,
    pub jxy: f32,
}

impl StructureTensor {
    pub const ZERO: StructureTensor = StructureTensor {
        jxx: 0.0,
        jyy: 0.0,
        jxy: 0.0,
    };

    pub const fn new(jxx: f32, jyy: f32, jxy: f32) -> Self {
        Self { jxx, jyy, jxy }
    }
}

/// Result of the eigen-analysis of a structure tensor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orientation {
    /// Dominant eigenvector, normalized. Defaults to (0, 1) when the tensor
    /// has no meaningful off-diagonal component.
    pub direction: Vec2,
    /// Larger eigenvalue.
    pub lambda1: f32,
    /// Smaller eigenvalue.
    pub lambda2: f32,
}

impl Orientation {
    /// Directional strength in roughly [0, 1): 0 for isotropic regions,
    /// approaching 1 for strong one-directional structure.
    pub fn anisotropy(&self) -> f32 {
        (self.lambda1 - self.lambda2) / (self.lambda1 + self.lambda2 + TENSOR_EPSILON)
    }
}

/// Eigen-decompose a structure tensor via the trace/determinant closed form.
pub fn dominant_orientation(tensor: StructureTensor) -> Orientation {
    let trace = tensor.jxx + tensor.jyy;
    let det = tensor.jxx * tensor.jyy - tensor.jxy * tensor.jxy;

    // Symmetric matrices have a non-negative discriminant; the max guards
    // against floating-point noise pushing it slightly below zero.
    let disc = (trace * trace * 0.25 - det).max(0.0).sqrt();
    let lambda1 = trace * 0.5 + disc;
    let lambda2 = trace * 0.5 - disc;

    let jxy_strength = tensor.jxy.abs()
        / (tensor.jxx.abs() + tensor.jyy.abs() + tensor.jxy.abs() + TENSOR_EPSILON);

    let direction = if jxy_strength > 0.0 {
        Vec2::new(-tensor.jxy, tensor.jxx - lambda1).normalized()
    } else {
        // Isotropic or degenerate: no preferred direction.
        Vec2::new(0.0, 1.0)
    };

    Orientation {
        direction,
        lambda1,
        lambda2,
    }
}

/// Kernel scale factors for a given anisotropy: elongate along the dominant
/// direction, compress across it. Both are 1 when the tensor is isotropic.
pub fn kernel_scales(anisotropy: f32) -> (f32, f32) {
    let scale_x = KERNEL_ALPHA / (anisotropy + KERNEL_ALPHA);
    let scale_y = (anisotropy + KERNEL_ALPHA) / KERNEL_ALPHA;
    (scale_x, scale_y)
}

/// Build the warp applied to kernel sample offsets: a rotation into the
/// dominant-orientation frame composed with the anisotropic scale.
pub fn warp_matrix(orientation: Vec2, anisotropy: f32) -> Mat2 {
    let (scale_x, scale_y) = kernel_scales(anisotropy);
    Mat2 {
        m00: orientation.x * scale_x,
        m01: -orientation.y * scale_x,
        m10: orientation.y * scale_y,
        m11: orientation.x * scale_y,
    }
}

/// A per-pixel tensor image matching the viewport resolution.
#[derive(Clone, Debug)]
pub struct TensorField {
    width: u32,
    height: u32,
    tensors: Vec<StructureTensor>,
}

impl TensorField {
    /// A field of all-zero tensors. Zero dimensions are bumped to 1x1 so
    /// clamped lookups always have a tensor to land on.
    pub fn zeroed(width: u32, height: u32) -> Self {
        Self::splat(width, height, StructureTensor::ZERO)
    }

    /// A field holding the same tensor at every pixel.
    pub fn splat(width: u32, height: u32, tensor: StructureTensor) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            tensors: vec![tensor; (width * height) as usize],
        }
    }

    /// Wrap an existing tensor buffer, verifying its dimensions. Zero-sized
    /// dimensions are rejected: the expected length is computed from the
    /// bumped (minimum 1x1) size, which an empty buffer cannot match.
    pub fn from_tensors(
        width: u32,
        height: u32,
        tensors: Vec<StructureTensor>,
    ) -> Result<Self, BufferSizeError> {
        let width = width.max(1);
        let height = height.max(1);
        let expected = (width * height) as usize;
        if tensors.len() != expected {
            return Err(BufferSizeError {
                expected,
                actual: tensors.len(),
                width,
                height,
            });
        }
        Ok(Self {
            width,
            height,
            tensors,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Tensor at (x, y), clamped to the field bounds.
    pub fn get(&self, x: i32, y: i32) -> StructureTensor {
        let x = x.clamp(0, self.width as i32 - 1) as u32;
        let y = y.clamp(0, self.height as i32 - 1) as u32;
        self.tensors[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, tensor: StructureTensor) {
        self.tensors[(y * self.width + x) as usize] = tensor;
    }
}

/// Per-channel Sobel kernels applied to a pixel neighborhood of `image`,
/// with border pixels clamped.
fn sobel_gradients(image: &ImageBuffer, x: i32, y: i32) -> ([f32; 3], [f32; 3]) {
    let mut gx = [0.0f32; 3];
    let mut gy = [0.0f32; 3];

    // Sobel taps, row by row.
    const KX: [[f32; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
    const KY: [[f32; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

    for (row, dy) in (-1..=1).enumerate() {
        for (col, dx) in (-1..=1).enumerate() {
            let rgb = image.get_clamped(x + dx, y + dy);
            for c in 0..3 {
                gx[c] += rgb[c] * KX[row][col];
                gy[c] += rgb[c] * KY[row][col];
            }
        }
    }

    (gx, gy)
}

/// Compute a structure-tensor field from an image via per-channel Sobel
/// derivatives (Jxx = gx.gx, Jyy = gy.gy, Jxy = gx.gy, summed over RGB).
///
/// This is the upstream producer the effect's input slot assumes; the GPU
/// tensor pass computes the same quantity per fragment.
pub fn sobel_tensor_field(image: &ImageBuffer) -> TensorField {
    let width = image.width();
    let height = image.height();
    let mut field = TensorField::zeroed(width, height);

    for y in 0..height {
        for x in 0..width {
            let (gx, gy) = sobel_gradients(image, x as i32, y as i32);
            let mut tensor = StructureTensor::ZERO;
            for c in 0..3 {
                tensor.jxx += gx[c] * gx[c];
                tensor.jyy += gy[c] * gy[c];
                tensor.jxy += gx[c] * gy[c];
            }
            field.set(x, y, tensor);
        }
    }

    field
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isotropic_tensor_has_zero_anisotropy() {
        // Jxx = Jyy = c, Jxy = 0 must be isotropic for any c.
        for c in [0.0, 0.5, 1.0, 100.0] {
            let orientation = dominant_orientation(StructureTensor::new(c, c, 0.0));
            assert!(
                orientation.anisotropy().abs() < 1e-6,
                "anisotropy nonzero for c={c}"
            );
            assert_eq!(orientation.direction, Vec2::new(0.0, 1.0));
        }
    }

    #[test]
    fn test_isotropic_warp_is_unit_scale() {
        let orientation = dominant_orientation(StructureTensor::new(3.0, 3.0, 0.0));
        let (scale_x, scale_y) = kernel_scales(orientation.anisotropy());
        assert!((scale_x - 1.0).abs() < 1e-6);
        assert!((scale_y - 1.0).abs() < 1e-6);

        // With unit scales the warp is a pure rotation: lengths preserved.
        let warp = warp_matrix(orientation.direction, orientation.anisotropy());
        let v = warp.mul_vec(Vec2::new(3.0, 4.0));
        assert!((v.length() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_eigenvalues_of_diagonal_tensor() {
        let orientation = dominant_orientation(StructureTensor::new(4.0, 1.0, 0.0));
        assert!((orientation.lambda1 - 4.0).abs() < 1e-6);
        assert!((orientation.lambda2 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_dominant_direction_follows_edge() {
        // Strong gradient along x (Jxx large) means the edge itself runs
        // along y; the eigenvector for lambda1 must be x-aligned, so the
        // kernel elongation axis (perpendicular frame) picks it up.
        let tensor = StructureTensor::new(9.0, 1.0, 0.5);
        let orientation = dominant_orientation(tensor);
        assert!(orientation.lambda1 > orientation.lambda2);
        assert!(orientation.anisotropy() > 0.5);
        // Eigenvector check: (J - lambda1 I) v = 0.
        let v = orientation.direction;
        let rx = (tensor.jxx - orientation.lambda1) * v.x + tensor.jxy * v.y;
        let ry = tensor.jxy * v.x + (tensor.jyy - orientation.lambda1) * v.y;
        assert!(rx.abs() < 1e-4 && ry.abs() < 1e-4);
    }

    #[test]
    fn test_zero_tensor_is_safe() {
        let orientation = dominant_orientation(StructureTensor::ZERO);
        assert!(orientation.anisotropy().abs() < 1e-6);
        assert_eq!(orientation.direction, Vec2::new(0.0, 1.0));
        let warp = warp_matrix(orientation.direction, orientation.anisotropy());
        let v = warp.mul_vec(Vec2::new(1.0, 0.0));
        assert!(v.x.is_finite() && v.y.is_finite());
    }

    #[test]
    fn test_tensor_field_dimension_check() {
        let err = TensorField::from_tensors(4, 4, vec![StructureTensor::ZERO; 15]);
        assert!(err.is_err());
        let ok = TensorField::from_tensors(4, 4, vec![StructureTensor::ZERO; 16]);
        assert!(ok.is_ok());
    }

    #[test]
    fn test_zero_sized_field_is_bumped_not_fatal() {
        // Zero dimensions become 1x1; clamped lookups must not panic.
        let field = TensorField::zeroed(0, 4);
        assert_eq!((field.width(), field.height()), (1, 4));
        assert_eq!(field.get(0, 0), StructureTensor::ZERO);

        let splat = TensorField::splat(0, 0, StructureTensor::new(1.0, 2.0, 3.0));
        assert_eq!(splat.get(-5, 9), StructureTensor::new(1.0, 2.0, 3.0));

        assert!(TensorField::from_tensors(0, 0, vec![]).is_err());
    }

    #[test]
    fn test_sobel_flat_image_yields_zero_tensors() {
        let image = ImageBuffer::filled(8, 8, [0.25, 0.5, 0.75]);
        let field = sobel_tensor_field(&image);
        for y in 0..8 {
            for x in 0..8 {
                let t = field.get(x, y);
                assert!(t.jxx.abs() < 1e-6 && t.jyy.abs() < 1e-6 && t.jxy.abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_sobel_vertical_edge_gradient_is_horizontal() {
        // Left half black, right half white: gradient along x only.
        let mut image = ImageBuffer::filled(8, 8, [0.0, 0.0, 0.0]);
        for y in 0..8 {
            for x in 4..8 {
                image.set(x, y, [1.0, 1.0, 1.0]);
            }
        }
        let field = sobel_tensor_field(&image);
        let t = field.get(4, 4);
        assert!(t.jxx > 0.0);
        assert!(t.jyy.abs() < 1e-6);
    }
}
