use winit::dpi::PhysicalSize;
use winit::window::WindowId;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by the binary.
pub trait App {
    /// Called after the runtime has resized the surface of `window_id`.
    fn on_resize(&mut self, window_id: WindowId, size: PhysicalSize<u32>) {
        let _ = (window_id, size);
    }

    /// Called once per rendered frame per window.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
