//! Mapping of the visualizer parameter set onto shader uniform slots.

use crate::params::ShaderParams;

/// Named uniform inputs of the visualizer shader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UniformSlot {
    Time,
    Resolution,
    Amplitude,
    Speed,
    ColorShift,
    Iterations,
    AudioLevel,
    UvScale,
    Direction,
}

impl UniformSlot {
    pub const CONTROLS: [UniformSlot; 6] = [
        UniformSlot::Amplitude,
        UniformSlot::Speed,
        UniformSlot::ColorShift,
        UniformSlot::Iterations,
        UniformSlot::UvScale,
        UniformSlot::Direction,
    ];
    pub const PER_FRAME: [UniformSlot; 3] = [
        UniformSlot::Time,
        UniformSlot::Resolution,
        UniformSlot::AudioLevel,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
}

/// Anything holding a table of uniform locations. Slots the target does not
/// expose (e.g. optimized out, or a failed upstream compile) are skipped.
pub trait UniformTarget {
    fn has_slot(&self, slot: UniformSlot) -> bool;
    fn write(&mut self, slot: UniformSlot, value: UniformValue);
}

/// Values that change every frame regardless of user input.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInputs {
    pub time_sec: f32,
    pub audio_level: f32,
    pub resolution: [u32; 2],
}

#[derive(Default, Debug)]
pub struct ShaderUniformBinder {
    skipped: u64,
}

impl ShaderUniformBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the slider-driven uniforms. Returns the number of slots written.
    pub fn bind_controls<T: UniformTarget + ?Sized>(
        &mut self,
        params: &ShaderParams,
        target: &mut T,
    ) -> usize {
        UniformSlot::CONTROLS
            .iter()
            .filter(|slot| self.put(&mut *target, **slot, control_value(params, **slot)))
            .count()
    }

    /// Push time, live resolution and audio level.
    pub fn bind_frame<T: UniformTarget + ?Sized>(
        &mut self,
        inputs: &FrameInputs,
        target: &mut T,
    ) -> usize {
        let values = [
            UniformValue::Float(inputs.time_sec.max(0.0)),
            UniformValue::Vec2([inputs.resolution[0] as f32, inputs.resolution[1] as f32]),
            UniformValue::Float(inputs.audio_level.clamp(0.0, 1.0)),
        ];
        UniformSlot::PER_FRAME
            .iter()
            .zip(values)
            .filter(|(slot, value)| self.put(&mut *target, **slot, *value))
            .count()
    }

    pub fn bind_all<T: UniformTarget + ?Sized>(
        &mut self,
        params: &ShaderParams,
        inputs: &FrameInputs,
        target: &mut T,
    ) -> usize {
        self.bind_controls(params, &mut *target) + self.bind_frame(inputs, target)
    }

    /// Total writes skipped because the target lacked the slot.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn put<T: UniformTarget + ?Sized>(
        &mut self,
        target: &mut T,
        slot: UniformSlot,
        value: UniformValue,
    ) -> bool {
        if !target.has_slot(slot) {
            if self.skipped == 0 {
                log::debug!("[uniforms] target has no slot for {:?}; skipping", slot);
            }
            self.skipped += 1;
            return false;
        }
        target.write(slot, value);
        true
    }
}

fn control_value(params: &ShaderParams, slot: UniformSlot) -> UniformValue {
    let v = match slot {
        UniformSlot::Amplitude => params.amplitude(),
        // direction must never leak into the speed channel
        UniformSlot::Speed => params.speed().abs(),
        UniformSlot::ColorShift => params.color_shift(),
        UniformSlot::Iterations => params.iterations(),
        UniformSlot::UvScale => params.uv_scale(),
        UniformSlot::Direction => params.direction().sign(),
        UniformSlot::Time | UniformSlot::Resolution | UniformSlot::AudioLevel => 0.0,
    };
    UniformValue::Float(v)
}

/// CPU mirror of the `Params` uniform block in `visualizer.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VisualizerUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub amplitude: f32,
    pub speed: f32,
    pub color_shift: f32,
    pub iterations: f32,
    pub audio_level: f32,
    pub uv_scale: f32,
    pub direction: f32,
    pub _pad: [f32; 2],
}

impl UniformTarget for VisualizerUniforms {
    fn has_slot(&self, _slot: UniformSlot) -> bool {
        true
    }

    fn write(&mut self, slot: UniformSlot, value: UniformValue) {
        match (slot, value) {
            (UniformSlot::Resolution, UniformValue::Vec2(v)) => self.resolution = v,
            (UniformSlot::Time, UniformValue::Float(v)) => self.time = v,
            (UniformSlot::Amplitude, UniformValue::Float(v)) => self.amplitude = v,
            (UniformSlot::Speed, UniformValue::Float(v)) => self.speed = v,
            (UniformSlot::ColorShift, UniformValue::Float(v)) => self.color_shift = v,
            (UniformSlot::Iterations, UniformValue::Float(v)) => self.iterations = v,
            (UniformSlot::AudioLevel, UniformValue::Float(v)) => self.audio_level = v,
            (UniformSlot::UvScale, UniformValue::Float(v)) => self.uv_scale = v,
            (UniformSlot::Direction, UniformValue::Float(v)) => self.direction = v,
            (slot, value) => log::warn!("[uniforms] {:?} cannot hold {:?}", slot, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Direction;
    use fnv::FnvHashMap;

    #[derive(Default)]
    struct Recording {
        missing: Vec<UniformSlot>,
        values: FnvHashMap<UniformSlot, UniformValue>,
    }

    impl UniformTarget for Recording {
        fn has_slot(&self, slot: UniformSlot) -> bool {
            !self.missing.contains(&slot)
        }
        fn write(&mut self, slot: UniformSlot, value: UniformValue) {
            self.values.insert(slot, value);
        }
    }

    #[test]
    fn speed_slot_carries_magnitude_only() {
        let mut binder = ShaderUniformBinder::new();
        let mut target = Recording::default();
        let mut params = ShaderParams::default();
        params.set_speed(-4.0);
        params.set_direction(Direction::Reverse);
        binder.bind_controls(&params, &mut target);
        assert_eq!(target.values[&UniformSlot::Speed], UniformValue::Float(4.0));
        assert_eq!(target.values[&UniformSlot::Direction], UniformValue::Float(-1.0));
    }

    #[test]
    fn missing_slots_are_skipped_silently() {
        let mut binder = ShaderUniformBinder::new();
        let mut target = Recording {
            missing: vec![UniformSlot::ColorShift, UniformSlot::Time],
            ..Default::default()
        };
        let written = binder.bind_all(
            &ShaderParams::default(),
            &FrameInputs {
                time_sec: 1.0,
                audio_level: 0.5,
                resolution: [800, 600],
            },
            &mut target,
        );
        assert_eq!(written, 7);
        assert_eq!(binder.skipped(), 2);
        assert!(!target.values.contains_key(&UniformSlot::ColorShift));
    }

    #[test]
    fn uniform_block_layout_is_48_bytes() {
        assert_eq!(std::mem::size_of::<VisualizerUniforms>(), 48);
    }
}
