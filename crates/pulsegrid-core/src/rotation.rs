use crate::constants::{ROTATION_DECAY_PER_FRAME, ROTATION_DRAG_GAIN, ROTATION_LIMIT_RAD};

/// Drag-to-tilt yaw with a hard clamp on the way in and a geometric decay
/// back to rest once released.
#[derive(Clone, Copy, Debug, Default)]
pub struct RotationDamper {
    yaw: f32,
    held: bool,
}

impl RotationDamper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// `delta_x` is the horizontal NDC distance from the press point.
    pub fn on_drag_move(&mut self, delta_x: f32) {
        self.held = true;
        if delta_x.is_finite() {
            self.yaw = (delta_x * ROTATION_DRAG_GAIN).clamp(-ROTATION_LIMIT_RAD, ROTATION_LIMIT_RAD);
        }
    }

    pub fn on_drag_end(&mut self) {
        self.held = false;
    }

    /// One frame of decay while released. Asymptotic, never snapped to 0.
    pub fn tick(&mut self) {
        if !self.held {
            self.yaw *= ROTATION_DECAY_PER_FRAME;
        }
    }
}
