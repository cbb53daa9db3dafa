//! Painterly Filter Core
//!
//! GPU-independent domain logic for the painterly (anisotropic Kuwahara)
//! post-processing effect:
//!
//! - **Structure tensors**: eigen-analysis, dominant orientation, anisotropy
//! - **Sampling kernel**: angular sectors, polynomial weighting, variance
//!   minimization
//! - **CPU reference filter**: the pure-function form of the whole effect,
//!   used as the normative description and by tests
//! - **Frame planning**: the per-frame capture/composite decision record
//!
//! The wgpu implementation lives in `painterly_gpu` and evaluates the same
//! arithmetic per fragment.

use thiserror::Error;

pub mod color;
pub mod filter;
pub mod kernel;
pub mod params;
pub mod plan;
pub mod tensor;

pub use filter::{kuwahara_filter, kuwahara_pixel, ImageBuffer};
pub use kernel::{SectorSummary, SECTOR_COUNT};
pub use params::{EffectParams, Resolution, DEFAULT_RADIUS, MAX_RADIUS, MIN_RADIUS};
pub use plan::{plan_frame, FramePlan, PassDesc, PassTarget};
pub use tensor::{dominant_orientation, sobel_tensor_field, StructureTensor, TensorField};

/// A pixel buffer whose length does not match its declared dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("buffer holds {actual} elements, expected {expected} for {width}x{height}")]
pub struct BufferSizeError {
    pub expected: usize,
    pub actual: usize,
    pub width: u32,
    pub height: u32,
}
