use glam::{Quat, Vec2};

use crate::camera::{OrthoCamera, Ray};
use crate::tiles::{GridLayout, TileId};

/// Distance along `ray` to the horizontal plane `y = height`, if ahead.
#[inline]
pub fn ray_plane_y(ray: &Ray, height: f32) -> Option<f32> {
    if ray.dir.y.abs() < 1e-6 {
        return None;
    }
    let t = (height - ray.origin.y) / ray.dir.y;
    (t >= 0.0).then_some(t)
}

/// Maps pointer NDC to the tile under it. Stateless: all tiles share one
/// plane, so the nearest hit is the single plane intersection, resolved to a
/// cell in constant time.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerHitTester {
    layout: GridLayout,
}

impl PointerHitTester {
    pub fn new(layout: GridLayout) -> Self {
        Self { layout }
    }

    /// `yaw` is the scene rotation about +Y currently applied when drawing.
    pub fn hit_test(&self, camera: &OrthoCamera, yaw: f32, ndc: Vec2) -> Option<TileId> {
        if !(ndc.x.is_finite() && ndc.y.is_finite()) {
            return None;
        }
        let world = camera.ray_from_ndc(ndc);
        // undo the scene rotation so the ray lives in tile space
        let inv = Quat::from_rotation_y(-yaw);
        let local = Ray {
            origin: inv * world.origin,
            dir: inv * world.dir,
        };
        let t = ray_plane_y(&local, self.layout.elevation)?;
        let hit = local.at(t);
        self.layout.cell_at(hit.x, hit.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn plane_behind_ray_is_missed() {
        let ray = Ray {
            origin: Vec3::new(0.0, 5.0, 0.0),
            dir: Vec3::Y,
        };
        assert_eq!(ray_plane_y(&ray, 0.0), None);
        let down = Ray {
            origin: Vec3::new(0.0, 5.0, 0.0),
            dir: -Vec3::Y,
        };
        assert_eq!(ray_plane_y(&down, 1.0), Some(4.0));
    }

    #[test]
    fn grazing_ray_never_hits() {
        let ray = Ray {
            origin: Vec3::new(0.0, 1.0, 0.0),
            dir: Vec3::X,
        };
        assert_eq!(ray_plane_y(&ray, 0.0), None);
    }
}
