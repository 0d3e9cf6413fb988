use glam::{Mat4, Vec2, Vec3};

use crate::constants::{CAMERA_FAR, CAMERA_FRUSTUM_SIZE, CAMERA_NEAR, CAMERA_POSITION};

/// World-space ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Right-handed orthographic camera with a fixed look-at.
#[derive(Clone, Debug)]
pub struct OrthoCamera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Visible world height; width follows the aspect ratio.
    pub frustum_size: f32,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl OrthoCamera {
    /// The grid demo's camera: elevated corner view of the origin.
    pub fn grid_view(aspect: f32) -> Self {
        Self {
            eye: Vec3::from_array(CAMERA_POSITION),
            target: Vec3::ZERO,
            up: Vec3::Y,
            frustum_size: CAMERA_FRUSTUM_SIZE,
            aspect: sanitize_aspect(aspect),
            znear: CAMERA_NEAR,
            zfar: CAMERA_FAR,
        }
    }

    /// Track a resized surface.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = sanitize_aspect(width as f32 / height as f32);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let half_h = self.frustum_size * 0.5;
        let half_w = half_h * self.aspect;
        Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, self.znear, self.zfar)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Unproject an NDC position into a world-space ray starting on the
    /// near plane. All rays share the view direction.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_proj().inverse();
        let p_near = inv.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        let p_far = inv.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        Ray {
            origin: p_near,
            dir: (p_far - p_near).normalize_or_zero(),
        }
    }
}

#[inline]
fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_ray_points_at_target() {
        let cam = OrthoCamera::grid_view(16.0 / 9.0);
        let ray = cam.ray_from_ndc(Vec2::ZERO);
        let to_target = (cam.target - cam.eye).normalize();
        assert!(ray.dir.dot(to_target) > 0.9999);
        // target lies on the ray
        let t = (cam.target - ray.origin).dot(ray.dir);
        assert!((ray.at(t) - cam.target).length() < 1e-2);
    }

    #[test]
    fn zero_sized_viewport_keeps_previous_aspect() {
        let mut cam = OrthoCamera::grid_view(2.0);
        cam.set_viewport(0, 900);
        assert_eq!(cam.aspect, 2.0);
        cam.set_viewport(1600, 900);
        assert!((cam.aspect - 16.0 / 9.0).abs() < 1e-6);
    }
}
