//! Painterly GPU Pipeline
//!
//! wgpu implementation of the painterly post-processing effect: two-pass
//! frame orchestration, structure-tensor derivation, and the anisotropic
//! Kuwahara composite. The filter math lives in `painterly_core`.

pub mod camera;
pub mod effect;
pub mod error;
pub mod orchestrator;
pub mod shaders;
pub mod target;
pub mod uniforms;

pub use camera::{Camera, Vec3};
pub use error::RendererError;
pub use orchestrator::{FrameOrchestrator, GpuContext, OrchestratorConfig, SceneRenderer};
