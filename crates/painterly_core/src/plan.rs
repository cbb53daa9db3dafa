//! Pure per-frame planning for the two-pass orchestration.
//!
//! The orchestrator computes a [`FramePlan`] once per frame before touching
//! the GPU: whether the offscreen targets must be reallocated, and the two
//! pass descriptors in the order they must run. Keeping the decision a plain
//! value makes the capture/composite ordering and the resize behavior
//! testable without a device.

use crate::params::{EffectParams, Resolution};

/// Which target a pass writes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassTarget {
    /// The offscreen reference image.
    Reference,
    /// The visible framebuffer.
    Screen,
}

/// One scene render within a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassDesc {
    pub target: PassTarget,
    /// Whether the painterly stage runs on this pass. Always false for the
    /// capture pass: the effect samples the capture, so the capture itself
    /// must be unfiltered.
    pub effect_enabled: bool,
}

/// The per-frame decision record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FramePlan {
    /// Size both passes render at this frame.
    pub resolution: Resolution,
    /// True when the offscreen targets must be (re)created before the
    /// capture pass: either they do not exist yet or their size no longer
    /// matches the viewport. Sampling a stale-sized target misaligns pixel
    /// coordinates between the passes.
    pub reallocate_targets: bool,
    /// First pass: unfiltered render into the reference target.
    pub capture: PassDesc,
    /// Second pass: render to the screen, effect per the user toggle.
    pub composite: PassDesc,
}

/// Plan one frame. `current_target_size` is the offscreen target's size from
/// the previous frame, or `None` before first allocation.
pub fn plan_frame(
    resolution: Resolution,
    params: EffectParams,
    current_target_size: Option<(u32, u32)>,
) -> FramePlan {
    let reallocate_targets = current_target_size != Some(resolution.size());
    FramePlan {
        resolution,
        reallocate_targets,
        capture: PassDesc {
            target: PassTarget::Reference,
            effect_enabled: false,
        },
        composite: PassDesc {
            target: PassTarget::Screen,
            effect_enabled: params.enabled,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_is_always_unfiltered() {
        for enabled in [false, true] {
            let plan = plan_frame(
                Resolution::new(800, 600),
                EffectParams::new(4, enabled),
                Some((800, 600)),
            );
            assert!(!plan.capture.effect_enabled);
            assert_eq!(plan.capture.target, PassTarget::Reference);
            assert_eq!(plan.composite.effect_enabled, enabled);
            assert_eq!(plan.composite.target, PassTarget::Screen);
        }
    }

    #[test]
    fn test_plans_are_comparable_values() {
        // Same inputs yield the same plan; differing params change it.
        let a = plan_frame(Resolution::new(800, 600), EffectParams::new(4, true), None);
        let b = plan_frame(Resolution::new(800, 600), EffectParams::new(4, true), None);
        assert_eq!(a, b);

        let c = plan_frame(Resolution::new(800, 600), EffectParams::new(4, false), None);
        assert_ne!(a, c);
    }

    #[test]
    fn test_first_frame_allocates() {
        let plan = plan_frame(Resolution::new(800, 600), EffectParams::default(), None);
        assert!(plan.reallocate_targets);
    }

    #[test]
    fn test_matching_size_skips_reallocation() {
        let plan = plan_frame(
            Resolution::new(800, 600),
            EffectParams::default(),
            Some((800, 600)),
        );
        assert!(!plan.reallocate_targets);
    }

    #[test]
    fn test_resize_forces_reallocation() {
        // Mid-session resize 800x600 -> 1600x1200: the next frame must
        // reallocate before any sampling, and both passes share the new
        // resolution.
        let plan = plan_frame(
            Resolution::new(1600, 1200),
            EffectParams::default(),
            Some((800, 600)),
        );
        assert!(plan.reallocate_targets);
        assert_eq!(plan.resolution.size(), (1600, 1200));
    }
}
