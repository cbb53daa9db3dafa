//! Renderer error type.

/// Error type for renderer operations
#[derive(Debug)]
pub enum RendererError {
    /// Failed to request GPU adapter
    AdapterNotFound,
    /// Failed to request GPU device
    DeviceError(wgpu::RequestDeviceError),
    /// Failed to create surface
    CreateSurfaceError(wgpu::CreateSurfaceError),
    /// Failed to acquire the next swapchain texture
    SurfaceError(wgpu::SurfaceError),
}

impl std::fmt::Display for RendererError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RendererError::AdapterNotFound => write!(f, "No suitable GPU adapter found"),
            RendererError::DeviceError(e) => write!(f, "Failed to request GPU device: {}", e),
            RendererError::CreateSurfaceError(e) => write!(f, "Failed to create surface: {}", e),
            RendererError::SurfaceError(e) => {
                write!(f, "Failed to acquire surface texture: {}", e)
            }
        }
    }
}

impl std::error::Error for RendererError {}
