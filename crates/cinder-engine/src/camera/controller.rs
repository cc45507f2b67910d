use glam::Vec3;

use crate::input::{InputState, Key};

use super::Camera;

/// Keyboard fly controls.
///
/// W/S move along the view direction, A/D strafe, Space/X move up/down and
/// the arrow keys turn. Shift triples the movement speed.
#[derive(Debug, Clone)]
pub struct CameraController {
    /// World units per second.
    pub move_speed: f32,
    /// Radians per second.
    pub turn_speed: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            turn_speed: 1.5,
        }
    }
}

impl CameraController {
    pub fn update(&self, camera: &mut Camera, input: &InputState, dt: f32) {
        let axis = |pos: Key, neg: Key| {
            (input.key_down(pos) as i32 - input.key_down(neg) as i32) as f32
        };

        let forward = axis(Key::W, Key::S);
        let strafe = axis(Key::D, Key::A);
        let lift = axis(Key::Space, Key::X);

        let mut speed = self.move_speed * dt;
        if input.key_down(Key::Shift) {
            speed *= 3.0;
        }

        let offset =
            camera.forward() * forward + camera.right() * strafe + Vec3::Y * lift;
        if offset != Vec3::ZERO {
            camera.translate(offset * speed);
        }

        let yaw = axis(Key::ArrowRight, Key::ArrowLeft);
        let pitch = axis(Key::ArrowUp, Key::ArrowDown);
        if yaw != 0.0 || pitch != 0.0 {
            camera.rotate(yaw * self.turn_speed * dt, pitch * self.turn_speed * dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraConfig;
    use crate::input::{InputEvent, InputFrame, KeyState};

    fn held(keys: &[Key]) -> InputState {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        for &key in keys {
            state.apply_event(&mut frame, InputEvent::Key { key, state: KeyState::Pressed, repeat: false });
        }
        state
    }

    #[test]
    fn forward_key_moves_along_view_direction() {
        let mut cam = Camera::new(CameraConfig::default(), 1, 1);
        let ctl = CameraController { move_speed: 2.0, turn_speed: 1.0 };
        ctl.update(&mut cam, &held(&[Key::W]), 0.5);
        assert!((cam.position() - Vec3::new(0.0, 0.0, 4.0)).length() < 1e-5);
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut cam = Camera::new(CameraConfig::default(), 1, 1);
        let before = cam.position();
        CameraController::default().update(&mut cam, &held(&[Key::A, Key::D]), 1.0);
        assert_eq!(cam.position(), before);
    }

    #[test]
    fn space_lifts_and_shift_boosts() {
        let mut cam = Camera::new(CameraConfig::default(), 1, 1);
        let ctl = CameraController { move_speed: 1.0, turn_speed: 1.0 };
        ctl.update(&mut cam, &held(&[Key::Space, Key::Shift]), 1.0);
        assert!((cam.position().y - 3.0).abs() < 1e-5);
    }

    #[test]
    fn arrow_keys_turn() {
        let mut cam = Camera::new(CameraConfig::default(), 1, 1);
        let ctl = CameraController { move_speed: 1.0, turn_speed: std::f32::consts::FRAC_PI_2 };
        ctl.update(&mut cam, &held(&[Key::ArrowRight]), 1.0);
        assert!((cam.forward() - Vec3::X).length() < 1e-5);
    }
}
