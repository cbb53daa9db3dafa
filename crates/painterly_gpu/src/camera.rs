//! Minimal perspective camera for the two-pass orchestration.
//!
//! The orchestrator reapplies a fixed look-at constraint after every frame
//! so interactive controls (owned by the host) cannot drift the camera
//! between the capture and composite renders of the next frame.

/// 3D vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    pub fn dot(self, rhs: Vec3) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn cross(self, rhs: Vec3) -> Vec3 {
        Vec3::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len > 0.0 {
            Vec3::new(self.x / len, self.y / len, self.z / len)
        } else {
            self
        }
    }
}

/// Perspective camera with position, orientation target, and projection
/// parameters. Scene renderers consume the view/projection matrices; the
/// orchestrator only ever calls [`Camera::look_at`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(7.0, 7.0, 7.0),
            target: Vec3::ZERO,
            up: Vec3::new(0.0, 1.0, 0.0),
            fov_y_deg: 45.0,
            near: 1.0,
            far: 1000.0,
        }
    }
}

impl Camera {
    /// Re-orient the camera toward a fixed focal point.
    pub fn look_at(&mut self, focal_point: Vec3) {
        self.target = focal_point;
    }

    /// Normalized view direction.
    pub fn forward(&self) -> Vec3 {
        self.target.sub(self.position).normalized()
    }

    /// Right-handed look-at view matrix, column-major.
    pub fn view_matrix(&self) -> [f32; 16] {
        let f = self.forward();
        let s = f.cross(self.up).normalized();
        let u = s.cross(f);

        [
            s.x,
            u.x,
            -f.x,
            0.0,
            s.y,
            u.y,
            -f.y,
            0.0,
            s.z,
            u.z,
            -f.z,
            0.0,
            -s.dot(self.position),
            -u.dot(self.position),
            f.dot(self.position),
            1.0,
        ]
    }

    /// Perspective projection matrix (wgpu clip space, depth 0..1),
    /// column-major.
    pub fn projection_matrix(&self, aspect: f32) -> [f32; 16] {
        let fov_y = self.fov_y_deg.to_radians();
        let focal = 1.0 / (fov_y * 0.5).tan();
        let depth_scale = self.far / (self.near - self.far);

        [
            focal / aspect,
            0.0,
            0.0,
            0.0,
            0.0,
            focal,
            0.0,
            0.0,
            0.0,
            0.0,
            depth_scale,
            -1.0,
            0.0,
            0.0,
            self.near * depth_scale,
            0.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera_matches_scene_setup() {
        let camera = Camera::default();
        assert_eq!(camera.position, Vec3::new(7.0, 7.0, 7.0));
        assert_eq!(camera.fov_y_deg, 45.0);
        assert_eq!(camera.near, 1.0);
        assert_eq!(camera.far, 1000.0);
    }

    #[test]
    fn test_look_at_resets_drift() {
        let mut camera = Camera::default();
        camera.target = Vec3::new(3.0, -2.0, 5.0);
        camera.look_at(Vec3::ZERO);
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_forward_is_normalized() {
        let camera = Camera::default();
        assert!((camera.forward().length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_view_matrix_moves_focal_point_onto_axis() {
        // The focal point must land on the -z axis in view space.
        let camera = Camera::default();
        let m = camera.view_matrix();
        let t = camera.target;
        let view_x = m[0] * t.x + m[4] * t.y + m[8] * t.z + m[12];
        let view_y = m[1] * t.x + m[5] * t.y + m[9] * t.z + m[13];
        let view_z = m[2] * t.x + m[6] * t.y + m[10] * t.z + m[14];
        assert!(view_x.abs() < 1e-5);
        assert!(view_y.abs() < 1e-5);
        assert!(view_z < 0.0);
    }

    #[test]
    fn test_projection_depth_range() {
        // Near plane maps to depth 0, far plane to 1 (after perspective
        // divide), per wgpu clip-space conventions.
        let camera = Camera::default();
        let m = camera.projection_matrix(4.0 / 3.0);

        let project_z = |z: f32| {
            let clip_z = m[10] * z + m[14];
            let clip_w = m[11] * z;
            clip_z / clip_w
        };

        assert!((project_z(-camera.near) - 0.0).abs() < 1e-5);
        assert!((project_z(-camera.far) - 1.0).abs() < 1e-4);
    }
}
