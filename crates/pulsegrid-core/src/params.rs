//! User-adjustable visualizer parameters.

use crate::constants::*;

/// Sign of time flow in the fractal shader. The only signed control.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Direction::Forward => 1.0,
            Direction::Reverse => -1.0,
        }
    }

    #[inline]
    pub fn toggled(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Forward => "Forward",
            Direction::Reverse => "Reverse",
        }
    }
}

/// The slider-driven half of the shader parameter set. Time, resolution and
/// audio level are per-frame inputs and live in `FrameInputs`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShaderParams {
    amplitude: f32,
    speed: f32,
    color_shift: f32,
    iterations: f32,
    uv_scale: f32,
    direction: Direction,
}

impl Default for ShaderParams {
    fn default() -> Self {
        Self {
            amplitude: DEFAULT_AMPLITUDE,
            speed: DEFAULT_SPEED,
            color_shift: DEFAULT_COLOR_SHIFT,
            iterations: DEFAULT_ITERATIONS,
            uv_scale: DEFAULT_UV_SCALE,
            direction: Direction::Forward,
        }
    }
}

#[inline]
fn clamp_finite(value: f32, range: (f32, f32), previous: f32) -> f32 {
    if value.is_finite() {
        value.clamp(range.0, range.1)
    } else {
        previous
    }
}

impl ShaderParams {
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }
    /// Always non-negative; direction carries the sign.
    pub fn speed(&self) -> f32 {
        self.speed
    }
    pub fn color_shift(&self) -> f32 {
        self.color_shift
    }
    pub fn iterations(&self) -> f32 {
        self.iterations
    }
    pub fn uv_scale(&self) -> f32 {
        self.uv_scale
    }
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_amplitude(&mut self, v: f32) {
        self.amplitude = clamp_finite(v, AMPLITUDE_RANGE, self.amplitude);
    }

    pub fn set_speed(&mut self, v: f32) {
        self.speed = clamp_finite(v.abs(), SPEED_RANGE, self.speed);
    }

    pub fn set_color_shift(&mut self, v: f32) {
        self.color_shift = clamp_finite(v, COLOR_SHIFT_RANGE, self.color_shift);
    }

    pub fn set_iterations(&mut self, v: f32) {
        self.iterations = clamp_finite(v, ITERATIONS_RANGE, self.iterations);
    }

    pub fn set_uv_scale(&mut self, v: f32) {
        self.uv_scale = clamp_finite(v, UV_SCALE_RANGE, self.uv_scale);
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn toggle_direction(&mut self) -> Direction {
        self.direction = self.direction.toggled();
        self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_slider_defaults() {
        let p = ShaderParams::default();
        assert_eq!(p.amplitude(), 0.5);
        assert_eq!(p.speed(), 2.0);
        assert_eq!(p.color_shift(), 0.4);
        assert_eq!(p.iterations(), 1.0);
        assert_eq!(p.uv_scale(), 1.5);
        assert_eq!(p.direction(), Direction::Forward);
    }

    #[test]
    fn negative_speed_is_stored_as_magnitude() {
        let mut p = ShaderParams::default();
        p.set_speed(-3.25);
        assert_eq!(p.speed(), 3.25);
        assert_eq!(p.direction(), Direction::Forward);
    }

    #[test]
    fn setters_clamp_and_ignore_non_finite() {
        let mut p = ShaderParams::default();
        p.set_uv_scale(0.0);
        assert_eq!(p.uv_scale(), UV_SCALE_RANGE.0);
        p.set_amplitude(f32::NAN);
        assert_eq!(p.amplitude(), DEFAULT_AMPLITUDE);
        p.set_color_shift(4.0);
        assert_eq!(p.color_shift(), 1.0);
    }

    #[test]
    fn direction_toggle_is_an_involution() {
        for start in [Direction::Forward, Direction::Reverse] {
            assert_eq!(start.toggled().toggled(), start);
            assert_eq!(start.toggled().sign(), -start.sign());
        }
    }
}
