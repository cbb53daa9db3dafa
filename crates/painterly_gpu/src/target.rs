//! Offscreen target management for the two-pass orchestration.
//!
//! Three color targets back the effect, all sized to the device-pixel
//! viewport: the reference image (unfiltered capture), the scene color of
//! the display pass (tensor input), and the structure-tensor image. A
//! shared depth buffer serves both scene renders. Stale-size targets are
//! never sampled: the orchestrator reallocates the whole set before the
//! capture pass whenever the viewport size changes.

/// A single offscreen color target.
pub struct OffscreenTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
}

impl OffscreenTarget {
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            width,
            height,
            format,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// The full set of per-frame targets, allocated and resized together so the
/// capture and composite passes always agree on pixel coordinates.
pub struct FrameTargets {
    /// Unfiltered render of the scene, sampled by the painterly pass.
    pub reference: OffscreenTarget,
    /// Color output of the display pass, consumed by the tensor pass.
    pub scene_color: OffscreenTarget,
    /// Structure-tensor image (Jxx, Jyy, Jxy in rgb).
    pub tensor: OffscreenTarget,
    /// Depth buffer shared by both scene renders.
    depth_view: wgpu::TextureView,
    /// Kept alive for the view.
    _depth_texture: wgpu::Texture,
    width: u32,
    height: u32,
}

/// Depth format used for both scene renders.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

impl FrameTargets {
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        color_format: wgpu::TextureFormat,
        tensor_format: wgpu::TextureFormat,
    ) -> Self {
        tracing::info!("allocating frame targets at {}x{}", width, height);

        let reference = OffscreenTarget::new(device, "Reference Target", width, height, color_format);
        let scene_color =
            OffscreenTarget::new(device, "Scene Color Target", width, height, color_format);
        let tensor = OffscreenTarget::new(device, "Tensor Target", width, height, tensor_format);

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene Depth"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            reference,
            scene_color,
            tensor,
            depth_view,
            _depth_texture: depth,
            width,
            height,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }
}
