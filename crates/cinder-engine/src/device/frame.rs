/// An acquired swapchain image plus the encoder recording into it.
///
/// Hand it back to `Gpu::submit` within the same frame; while it is held no
/// further surface texture can be acquired.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

/// What the frame driver should do after a failed acquire.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// The surface was configured again; the next frame can proceed.
    Reconfigured,
    /// Drop this frame only.
    SkipFrame,
    /// The device is out of memory or otherwise unusable.
    Fatal,
}
