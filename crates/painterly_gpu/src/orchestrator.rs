//! Two-pass frame orchestration.
//!
//! Each frame renders the scene twice: once into the offscreen reference
//! target with the effect forced off, then once into the scene-color target
//! for display. The tensor pass derives the structure-tensor image from the
//! display render, and either the painterly pass or the gamma blit writes
//! the final image to the surface. After submission the camera is re-aimed
//! at the focal point so host-side controls cannot drift it between the two
//! renders of the next frame.

use crate::camera::{Camera, Vec3};
use crate::effect::{BlitPass, PainterlyPass, TensorPass};
use crate::error::RendererError;
use crate::target::FrameTargets;
use crate::uniforms::PainterlyUniforms;
use painterly_core::{plan_frame, EffectParams, Resolution};

fn env_u32(name: &str) -> Option<u32> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u32>().ok())
}

/// Get the preferred backend for the current platform
///
/// Using the primary backend instead of all backends reduces memory usage
/// by avoiding initialization of multiple GPU driver stacks. Set
/// `PAINTERLY_WGPU_BACKEND` (vulkan, metal, dx12, gl) to override.
fn preferred_backends() -> wgpu::Backends {
    if let Ok(name) = std::env::var("PAINTERLY_WGPU_BACKEND") {
        match name.trim().to_ascii_lowercase().as_str() {
            "vulkan" => return wgpu::Backends::VULKAN,
            "metal" => return wgpu::Backends::METAL,
            "dx12" => return wgpu::Backends::DX12,
            "gl" => return wgpu::Backends::GL,
            other => {
                tracing::warn!("unknown PAINTERLY_WGPU_BACKEND '{}', using default", other);
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        wgpu::Backends::METAL
    }
    #[cfg(target_os = "windows")]
    {
        wgpu::Backends::DX12
    }
    #[cfg(target_os = "linux")]
    {
        wgpu::Backends::VULKAN
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        wgpu::Backends::PRIMARY
    }
}

/// Static configuration for the orchestrator.
#[derive(Clone, Copy, Debug)]
pub struct OrchestratorConfig {
    /// Format of the reference and scene-color targets. Linear; gamma
    /// encoding happens in the painterly and blit shaders.
    pub color_format: wgpu::TextureFormat,
    /// Format of the structure-tensor target.
    pub tensor_format: wgpu::TextureFormat,
    /// Surface format the final passes write to. Must not be an sRGB
    /// format, the shaders encode gamma themselves.
    pub surface_format: wgpu::TextureFormat,
    /// Point the camera is re-aimed at after every frame.
    pub focal_point: Vec3,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            color_format: wgpu::TextureFormat::Rgba16Float,
            tensor_format: wgpu::TextureFormat::Rgba16Float,
            surface_format: wgpu::TextureFormat::Bgra8Unorm,
            focal_point: Vec3::ZERO,
        }
    }
}

/// GPU device handle shared by the orchestrator and scene renderers.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Create a headless context, blocking on adapter and device requests.
    pub fn new_blocking() -> Result<Self, RendererError> {
        pollster::block_on(Self::new())
    }

    /// Create a headless context.
    pub async fn new() -> Result<Self, RendererError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: preferred_backends(),
            ..Default::default()
        });
        Self::from_instance(instance, None).await
    }

    /// Create a surface for `window` and a context whose adapter is
    /// compatible with it.
    pub async fn for_window<W>(
        window: std::sync::Arc<W>,
    ) -> Result<(Self, wgpu::Surface<'static>), RendererError>
    where
        W: raw_window_handle::HasWindowHandle
            + raw_window_handle::HasDisplayHandle
            + Send
            + Sync
            + 'static,
    {
        let instance = Self::instance();
        let surface = instance
            .create_surface(window)
            .map_err(RendererError::CreateSurfaceError)?;
        let context = Self::from_instance(instance, Some(&surface)).await?;
        Ok((context, surface))
    }

    /// Create a context whose adapter is compatible with `surface`.
    pub async fn for_surface(
        instance: wgpu::Instance,
        surface: &wgpu::Surface<'_>,
    ) -> Result<Self, RendererError> {
        Self::from_instance(instance, Some(surface)).await
    }

    async fn from_instance(
        instance: wgpu::Instance,
        surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<Self, RendererError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: surface,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RendererError::AdapterNotFound)?;

        tracing::info!(
            "gpu adapter: {} ({:?})",
            adapter.get_info().name,
            adapter.get_info().backend
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Painterly GPU Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                },
                None,
            )
            .await
            .map_err(RendererError::DeviceError)?;

        Ok(Self { device, queue })
    }

    /// Create a wgpu instance with the platform-preferred backends, for
    /// hosts that need to build a surface before the context.
    pub fn instance() -> wgpu::Instance {
        wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: preferred_backends(),
            ..Default::default()
        })
    }
}

/// Hosts implement this to draw their 3D scene into a color/depth pair.
///
/// The implementation begins and ends its own render pass and is expected
/// to clear both attachments. It is called twice per frame with identical
/// camera state, so the reference and display renders stay aligned.
pub trait SceneRenderer {
    fn render_scene(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        camera: &Camera,
        resolution: Resolution,
    );
}

/// Owns the per-frame pipeline: offscreen targets, the three post passes,
/// the effect parameters, and the camera.
pub struct FrameOrchestrator {
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: OrchestratorConfig,
    params: EffectParams,
    camera: Camera,
    targets: Option<FrameTargets>,
    tensor_pass: TensorPass,
    painterly_pass: PainterlyPass,
    blit_pass: BlitPass,
}

impl FrameOrchestrator {
    /// `PAINTERLY_RADIUS` overrides the initial kernel radius; it is
    /// clamped like any other radius value.
    pub fn new(context: GpuContext, config: OrchestratorConfig) -> Self {
        let mut params = EffectParams::default();
        if let Some(radius) = env_u32("PAINTERLY_RADIUS") {
            params.set_radius(radius);
        }
        tracing::info!(
            "painterly effect: radius={}, enabled={}",
            params.radius(),
            params.enabled
        );

        let tensor_pass = TensorPass::new(&context.device, config.tensor_format);
        let painterly_pass = PainterlyPass::new(&context.device, config.surface_format);
        let blit_pass = BlitPass::new(&context.device, config.surface_format);

        Self {
            device: context.device,
            queue: context.queue,
            config,
            params,
            camera: Camera::default(),
            targets: None,
            tensor_pass,
            painterly_pass,
            blit_pass,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn params(&self) -> EffectParams {
        self.params
    }

    pub fn set_radius(&mut self, radius: u32) {
        self.params.set_radius(radius);
    }

    pub fn set_effect_enabled(&mut self, enabled: bool) {
        self.params.enabled = enabled;
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Surface configuration matching the orchestrator's output format.
    pub fn surface_configuration(&self, resolution: Resolution) -> wgpu::SurfaceConfiguration {
        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: self.config.surface_format,
            width: resolution.width,
            height: resolution.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    /// Render one frame into `surface_view`, which must match `resolution`.
    pub fn render_frame<S: SceneRenderer>(
        &mut self,
        scene: &mut S,
        surface_view: &wgpu::TextureView,
        resolution: Resolution,
    ) {
        let plan = plan_frame(
            resolution,
            self.params,
            self.targets.as_ref().map(|t| t.size()),
        );

        // Targets are reallocated before any pass runs, so a stale-sized
        // reference or tensor image is never sampled.
        if plan.reallocate_targets {
            let (width, height) = plan.resolution.size();
            let targets = FrameTargets::new(
                &self.device,
                width,
                height,
                self.config.color_format,
                self.config.tensor_format,
            );
            self.tensor_pass
                .set_inputs(&self.device, targets.scene_color.view());
            self.painterly_pass.set_inputs(
                &self.device,
                targets.tensor.view(),
                targets.reference.view(),
            );
            self.blit_pass
                .set_inputs(&self.device, targets.scene_color.view());
            self.targets = Some(targets);
        }
        let targets = self
            .targets
            .as_ref()
            .expect("targets allocated by plan.reallocate_targets");

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        // Capture pass: unfiltered scene into the reference target.
        debug_assert!(!plan.capture.effect_enabled);
        scene.render_scene(
            &self.device,
            &self.queue,
            &mut encoder,
            targets.reference.view(),
            targets.depth_view(),
            &self.camera,
            plan.resolution,
        );

        // Display pass: same scene again, feeding the tensor pass. This
        // render happens whether or not the effect is enabled.
        scene.render_scene(
            &self.device,
            &self.queue,
            &mut encoder,
            targets.scene_color.view(),
            targets.depth_view(),
            &self.camera,
            plan.resolution,
        );

        self.tensor_pass.encode(&mut encoder, targets.tensor.view());

        if plan.composite.effect_enabled {
            self.painterly_pass.update_uniforms(
                &self.queue,
                PainterlyUniforms::new(plan.resolution, self.params),
            );
            self.painterly_pass.encode(&mut encoder, surface_view);
        } else {
            self.blit_pass.encode(&mut encoder, surface_view);
        }

        self.queue.submit(std::iter::once(encoder.finish()));

        self.camera.look_at(self.config.focal_point);
    }

    /// Acquire the next swapchain image, render into it, and present.
    ///
    /// A failed acquire is reported and the frame skipped; the host should
    /// reconfigure the surface on `Lost`/`Outdated` and try again next
    /// frame.
    pub fn render_to_surface<S: SceneRenderer>(
        &mut self,
        scene: &mut S,
        surface: &wgpu::Surface<'_>,
        resolution: Resolution,
    ) -> Result<(), RendererError> {
        let frame = surface.get_current_texture().map_err(|e| {
            tracing::warn!("skipping frame, surface acquire failed: {}", e);
            RendererError::SurfaceError(e)
        })?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.render_frame(scene, &view, resolution);
        frame.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_linear_intermediates() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.color_format, wgpu::TextureFormat::Rgba16Float);
        assert_eq!(config.tensor_format, wgpu::TextureFormat::Rgba16Float);
        // A non-sRGB surface format: the shaders gamma-encode themselves.
        assert!(!config.surface_format.is_srgb());
    }
}
