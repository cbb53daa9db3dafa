//! User-tunable effect parameters and the per-frame resolution context.
//!
//! Both types are plain value snapshots: the host owns the live settings and
//! hands copies to the renderer once per frame, so the two scene passes can
//! never observe different values mid-frame.

/// Smallest permitted kernel radius. A radius of zero would yield zero
/// samples in every sector.
pub const MIN_RADIUS: u32 = 1;

/// Largest permitted kernel radius. Sample count and per-pixel cost scale
/// linearly with the radius, so it is hard-capped.
pub const MAX_RADIUS: u32 = 15;

/// Default kernel radius.
pub const DEFAULT_RADIUS: u32 = 4;

/// Device pixel ratios above this are clamped; super-sampling beyond 2x
/// doubles fill cost for no visible gain in this effect.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Per-frame snapshot of the user-facing effect controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectParams {
    radius: u32,
    /// Whether the painterly pass composites to the screen this frame.
    pub enabled: bool,
}

impl EffectParams {
    /// Create parameters with the radius clamped to `[MIN_RADIUS, MAX_RADIUS]`.
    ///
    /// Out-of-range radii are recovered locally, never reported as errors.
    pub fn new(radius: u32, enabled: bool) -> Self {
        Self {
            radius: radius.clamp(MIN_RADIUS, MAX_RADIUS),
            enabled,
        }
    }

    /// The clamped kernel radius, always in `[MIN_RADIUS, MAX_RADIUS]`.
    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Replace the radius, clamping the new value.
    pub fn set_radius(&mut self, radius: u32) {
        self.radius = radius.clamp(MIN_RADIUS, MAX_RADIUS);
    }
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            enabled: true,
        }
    }
}

/// Render target dimensions plus their reciprocals, recomputed whenever the
/// drawable size or pixel ratio changes and threaded explicitly into both
/// scene passes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
    pub inv_width: f32,
    pub inv_height: f32,
}

impl Resolution {
    /// Build a resolution from physical pixel dimensions.
    ///
    /// Zero dimensions are bumped to one pixel so reciprocals stay finite.
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            inv_width: 1.0 / width as f32,
            inv_height: 1.0 / height as f32,
        }
    }

    /// Build a resolution from logical drawable size and device pixel ratio.
    ///
    /// The ratio is clamped to [`MAX_PIXEL_RATIO`] before scaling.
    pub fn from_logical(width: f32, height: f32, pixel_ratio: f32) -> Self {
        let ratio = pixel_ratio.clamp(0.0, MAX_PIXEL_RATIO);
        Self::new(
            (width * ratio).round() as u32,
            (height * ratio).round() as u32,
        )
    }

    /// Physical size as a `(width, height)` pair.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
