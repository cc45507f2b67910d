//! GPU rendering plumbing shared by renderers.
//!
//! Each renderer owns its own GPU resources (pipelines, buffers) and records
//! its passes into the frame's `RenderTarget`.
//!
//! Convention:
//! - world space is right-handed, +Y up
//! - clip-space depth is `[0, 1]` (wgpu)
//! - matrices are uploaded column-major unless a renderer is told otherwise

mod ctx;
mod texture;

pub use ctx::{RenderCtx, RenderTarget};
pub use texture::Texture;
