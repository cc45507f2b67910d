use glam::{Mat4, Vec3};

/// Memory order expected by the shading language for uploaded matrices.
///
/// glam stores matrices column-major and WGSL reads `mat4x4<f32>` column-major,
/// so `ColumnMajor` uploads as-is. `RowMajor` transposes before upload, for
/// shaders declared with the opposite convention.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum MatrixLayout {
    #[default]
    ColumnMajor,
    RowMajor,
}

impl MatrixLayout {
    /// Returns `m` as four 4-float arrays in the order the shader will read them.
    pub fn arrange(self, m: Mat4) -> [[f32; 4]; 4] {
        match self {
            MatrixLayout::ColumnMajor => m.to_cols_array_2d(),
            MatrixLayout::RowMajor => m.transpose().to_cols_array_2d(),
        }
    }
}

/// Perspective camera parameters.
#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub position: Vec3,
    /// Radians around +Y; zero looks down -Z.
    pub yaw: f32,
    /// Radians above the horizon.
    pub pitch: f32,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            yaw: 0.0,
            pitch: 0.0,
            fov_y: std::f32::consts::FRAC_PI_4,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Right-handed, +Y up perspective camera.
///
/// The projection maps depth to `[0, 1]` as wgpu expects.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
}

/// Keeps the camera from flipping over the poles.
const PITCH_LIMIT: f32 = 89.0 * std::f32::consts::PI / 180.0;

impl Camera {
    pub fn new(config: CameraConfig, width: u32, height: u32) -> Self {
        let mut camera = Self {
            position: config.position,
            yaw: config.yaw,
            pitch: config.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            fov_y: config.fov_y,
            aspect: 1.0,
            near: config.near,
            far: config.far,
        };
        camera.update_projection(width, height);
        camera
    }

    /// Recomputes the aspect ratio after a resize.
    ///
    /// A zero-sized (minimized) window keeps the previous aspect.
    pub fn update_projection(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(sy * cp, sp, -cy * cp)
    }

    /// Unit vector to the camera's right, parallel to the ground plane.
    pub fn right(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        Vec3::new(cy, 0.0, sy)
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    pub fn rotate(&mut self, yaw: f32, pitch: f32) {
        self.yaw = (self.yaw + yaw) % std::f32::consts::TAU;
        self.pitch = (self.pitch + pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }
}
