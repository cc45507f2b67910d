use std::path::PathBuf;

use anyhow::Result;
use winit::dpi::PhysicalSize;
use winit::window::WindowId;

use cinder_engine::camera::{Camera, CameraConfig, CameraController};
use cinder_engine::core::{App, AppControl, FrameCtx};
use cinder_engine::device::GpuInit;
use cinder_engine::input::Key;
use cinder_engine::logging::{init_logging, LoggingConfig};
use cinder_engine::particles::{Emitter, EmitterConfig, ParticleShader};
use cinder_engine::render::{RenderCtx, Texture};
use cinder_engine::window::{Runtime, RuntimeConfig};

const CLEAR: wgpu::Color = wgpu::Color { r: 0.4, g: 0.6, b: 0.75, a: 1.0 };
const SOFT_DISC_SIZE: u32 = 64;

/// GPU-backed parts of the demo, created on the first frame.
struct Scene {
    // Held for the lifetime of the emitter's bind group.
    _texture: Texture,
    emitter: Emitter,
}

impl Scene {
    fn new(ctx: &RenderCtx<'_>, texture_path: Option<&PathBuf>) -> Result<Self> {
        let texture = match texture_path {
            Some(path) => Texture::from_path(ctx.device, ctx.queue, path)?,
            None => Texture::soft_disc(ctx.device, ctx.queue, SOFT_DISC_SIZE)?,
        };
        let shader = ParticleShader::builtin(ctx.device);
        let emitter = Emitter::new(EmitterConfig::default(), ctx, &shader, &texture)?;

        Ok(Self { _texture: texture, emitter })
    }
}

struct Demo {
    texture_path: Option<PathBuf>,
    camera: Camera,
    controller: CameraController,
    scene: Option<Scene>,
}

impl Demo {
    fn new(texture_path: Option<PathBuf>, size: PhysicalSize<u32>) -> Self {
        Self {
            texture_path,
            camera: Camera::new(CameraConfig::default(), size.width, size.height),
            controller: CameraController::default(),
            scene: None,
        }
    }
}

impl App for Demo {
    fn on_resize(&mut self, _window_id: WindowId, size: PhysicalSize<u32>) {
        self.camera.update_projection(size.width, size.height);
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input_frame.pressed(Key::Escape) {
            return AppControl::Exit;
        }

        if self.scene.is_none() {
            let size = ctx.window.physical_size();
            self.camera.update_projection(size.width, size.height);

            match Scene::new(&ctx.render_ctx(), self.texture_path.as_ref()) {
                Ok(scene) => self.scene = Some(scene),
                Err(e) => {
                    log::error!("failed to set up the particle scene: {e:#}");
                    return AppControl::Exit;
                }
            }
        }
        let Some(scene) = self.scene.as_mut() else {
            return AppControl::Exit;
        };

        if ctx.input_frame.pressed(Key::F1) {
            let enabled = !scene.emitter.debug_overlay();
            scene.emitter.set_debug_overlay(enabled);
            log::info!("debug overlay {}", if enabled { "on" } else { "off" });
        }

        let (dt, now) = (ctx.time.dt, ctx.time.total);
        self.controller.update(&mut self.camera, ctx.input, dt);
        scene.emitter.update(dt, now);

        if ctx.time.frame_index % 600 == 0 {
            let stats = scene.emitter.state().stats();
            log::debug!(
                "frame {}: {} alive, {} spawned, {} dropped",
                ctx.time.frame_index,
                scene.emitter.state().living_count(),
                stats.spawned,
                stats.dropped
            );
        }

        let camera = &self.camera;
        ctx.render(CLEAR, |rctx, target| {
            scene.emitter.draw(rctx, target, camera, now);
        })
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let texture_path = std::env::args_os().nth(1).map(PathBuf::from);
    let runtime = RuntimeConfig {
        title: "cinder".to_string(),
        ..RuntimeConfig::default()
    };
    let initial = PhysicalSize::new(
        runtime.initial_size.width as u32,
        runtime.initial_size.height as u32,
    );

    log::info!(
        "W/S/A/D move, Space/X up/down, arrows look, Shift boost, F1 overlay, Esc quit"
    );

    Runtime::run(runtime, GpuInit::default(), Demo::new(texture_path, initial))
}
