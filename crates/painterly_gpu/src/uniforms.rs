//! GPU uniform layouts.
//!
//! All structures use `#[repr(C)]` and implement `bytemuck::Pod` for safe
//! GPU buffer copies; field order and padding must match the WGSL structs
//! in [`crate::shaders`].

use painterly_core::{EffectParams, Resolution};

/// Uniforms for the painterly fragment pass.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PainterlyUniforms {
    /// (width, height, 1/width, 1/height) of the render target.
    pub resolution: [f32; 4],
    /// Kernel radius, already clamped to [1, 15].
    pub radius: u32,
    pub _pad0: u32,
    pub _pad1: u32,
    pub _pad2: u32,
}

impl PainterlyUniforms {
    pub fn new(resolution: Resolution, params: EffectParams) -> Self {
        Self {
            resolution: [
                resolution.width as f32,
                resolution.height as f32,
                resolution.inv_width,
                resolution.inv_height,
            ],
            radius: params.radius(),
            _pad0: 0,
            _pad1: 0,
            _pad2: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_size_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<PainterlyUniforms>() % 16, 0);
    }

    #[test]
    fn test_painterly_uniforms_carry_clamped_radius() {
        let uniforms =
            PainterlyUniforms::new(Resolution::new(800, 600), EffectParams::new(99, true));
        assert_eq!(uniforms.radius, 15);
        assert_eq!(uniforms.resolution[0], 800.0);
        assert!((uniforms.resolution[2] - 1.0 / 800.0).abs() < 1e-9);
    }
}
