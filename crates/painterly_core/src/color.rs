//! Linear/sRGB conversion and luminance.
//!
//! Scene rendering and all kernel arithmetic happen in linear color; the
//! selected sector color is gamma-encoded only at the very end of the
//! painterly pass.

/// Linear values below this use the linear segment of the sRGB curve.
const SRGB_LINEAR_CUTOFF: f32 = 0.003_130_8;

/// Encoded values below this decode through the linear segment.
const SRGB_ENCODED_CUTOFF: f32 = 0.040_45;

/// Rec.601 luminance weights, used to collapse per-channel variance into a
/// scalar comparable across sectors.
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Encode one linear channel to sRGB.
pub fn linear_to_srgb(value: f32) -> f32 {
    if value < SRGB_LINEAR_CUTOFF {
        value * 12.92
    } else {
        1.055 * value.powf(1.0 / 2.4) - 0.055
    }
}

/// Decode one sRGB channel back to linear.
pub fn srgb_to_linear(value: f32) -> f32 {
    if value < SRGB_ENCODED_CUTOFF {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

/// Encode a linear RGB triple to sRGB. Alpha, when present, is never encoded.
pub fn encode_rgb(rgb: [f32; 3]) -> [f32; 3] {
    [
        linear_to_srgb(rgb[0]),
        linear_to_srgb(rgb[1]),
        linear_to_srgb(rgb[2]),
    ]
}

/// Rec.601 luminance of a linear RGB triple.
pub fn luminance(rgb: [f32; 3]) -> f32 {
    rgb[0] * LUMA_WEIGHTS[0] + rgb[1] * LUMA_WEIGHTS[1] + rgb[2] * LUMA_WEIGHTS[2]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srgb_round_trip() {
        // decode(encode(x)) must stay within 1e-4 across [0, 1].
        for i in 0..=1000 {
            let x = i as f32 / 1000.0;
            let back = srgb_to_linear(linear_to_srgb(x));
            assert!(
                (back - x).abs() < 1e-4,
                "round trip drifted at {x}: {back}"
            );
        }
    }

    #[test]
    fn test_srgb_endpoints() {
        assert_eq!(linear_to_srgb(0.0), 0.0);
        assert!((linear_to_srgb(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_srgb_segments_meet() {
        // The piecewise segments agree at the cutoff.
        let below = linear_to_srgb(SRGB_LINEAR_CUTOFF - 1e-7);
        let above = linear_to_srgb(SRGB_LINEAR_CUTOFF + 1e-7);
        assert!((below - above).abs() < 1e-4);
    }

    #[test]
    fn test_luminance_weights_sum_to_one() {
        let sum: f32 = LUMA_WEIGHTS.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!((luminance([1.0, 1.0, 1.0]) - 1.0).abs() < 1e-6);
    }
}
