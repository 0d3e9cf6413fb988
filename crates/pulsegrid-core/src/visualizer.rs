//! Owned state of the audio-reactive visualizer.
//!
//! Event handlers call the setters; the frame callback calls
//! [`VisualizerState::frame`] and uploads [`VisualizerState::uniforms`].

use crate::analysis::AudioFeatureExtractor;
use crate::error::PlaybackError;
use crate::params::{Direction, ShaderParams};
use crate::session::{AudioSession, DecodeTicket, PlayPause, PlaybackController, PlaybackPhase};
use crate::time::TimeSource;
use crate::uniforms::{FrameInputs, ShaderUniformBinder, VisualizerUniforms};

pub struct VisualizerState<S: AudioSession, T: TimeSource> {
    params: ShaderParams,
    playback: PlaybackController<S>,
    extractor: AudioFeatureExtractor,
    binder: ShaderUniformBinder,
    uniforms: VisualizerUniforms,
    clock: T,
    epoch: f32,
    last_level: f32,
}

impl<S: AudioSession, T: TimeSource> VisualizerState<S, T> {
    pub fn new(clock: T) -> Self {
        let mut state = Self {
            params: ShaderParams::default(),
            playback: PlaybackController::new(),
            extractor: AudioFeatureExtractor::new(),
            binder: ShaderUniformBinder::new(),
            uniforms: VisualizerUniforms::default(),
            epoch: clock.elapsed_sec(),
            clock,
            last_level: 0.0,
        };
        state.rebind_controls();
        state
    }

    pub fn params(&self) -> &ShaderParams {
        &self.params
    }

    pub fn uniforms(&self) -> &VisualizerUniforms {
        &self.uniforms
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.playback.phase()
    }

    pub fn audio_level(&self) -> f32 {
        self.last_level
    }

    /// Shader time: seconds since the latest playback start, or since
    /// construction if nothing has played yet.
    pub fn shader_time(&self) -> f32 {
        (self.clock.elapsed_sec() - self.epoch).max(0.0)
    }

    pub fn set_amplitude(&mut self, v: f32) {
        self.params.set_amplitude(v);
        self.rebind_controls();
    }

    pub fn set_speed(&mut self, v: f32) {
        self.params.set_speed(v);
        self.rebind_controls();
    }

    pub fn set_color_shift(&mut self, v: f32) {
        self.params.set_color_shift(v);
        self.rebind_controls();
    }

    pub fn set_iterations(&mut self, v: f32) {
        self.params.set_iterations(v);
        self.rebind_controls();
    }

    pub fn set_uv_scale(&mut self, v: f32) {
        self.params.set_uv_scale(v);
        self.rebind_controls();
    }

    pub fn toggle_direction(&mut self) -> Direction {
        let d = self.params.toggle_direction();
        self.rebind_controls();
        d
    }

    pub fn select_file(&mut self) {
        self.playback.select_file();
    }

    pub fn play_pause(&mut self) -> Result<PlayPause, PlaybackError> {
        self.playback.play_pause()
    }

    pub fn complete_decode(&mut self, ticket: DecodeTicket, session: S) -> Result<(), PlaybackError> {
        self.playback.complete_decode(ticket, session)?;
        self.epoch = self.clock.elapsed_sec();
        log::info!("[visualizer] playback started");
        Ok(())
    }

    pub fn fail_decode(&mut self, ticket: DecodeTicket) {
        self.playback.fail_decode(ticket);
    }

    /// Per-frame inputs: elapsed time, audio level and the live surface size.
    pub fn frame(&mut self, resolution: [u32; 2]) -> &VisualizerUniforms {
        self.last_level = self.extractor.sample(self.playback.session());
        let inputs = FrameInputs {
            time_sec: self.shader_time(),
            audio_level: self.last_level,
            resolution,
        };
        self.binder.bind_frame(&inputs, &mut self.uniforms);
        &self.uniforms
    }

    pub fn teardown(&mut self) {
        self.playback.teardown();
        self.last_level = 0.0;
    }

    fn rebind_controls(&mut self) {
        self.binder.bind_controls(&self.params, &mut self.uniforms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;

    struct Silent;

    impl AudioSession for Silent {
        fn is_playing(&self) -> bool {
            false
        }
        fn bin_count(&self) -> usize {
            0
        }
        fn frequency_bins(&self, _out: &mut [u8]) {}
        fn start(&mut self) {}
        fn suspend(&mut self) {}
        fn resume(&mut self) {}
        fn stop(&mut self) {}
    }

    #[test]
    fn setters_reach_uniforms_without_a_frame() {
        let clock = ManualClock::new(0.0);
        let mut v: VisualizerState<Silent, _> = VisualizerState::new(&clock);
        v.set_amplitude(1.25);
        assert_eq!(v.uniforms().amplitude, 1.25);
        v.toggle_direction();
        assert_eq!(v.uniforms().direction, -1.0);
        assert_eq!(v.uniforms().speed, 2.0);
    }

    #[test]
    fn frame_reads_live_resolution() {
        let clock = ManualClock::new(0.0);
        let mut v: VisualizerState<Silent, _> = VisualizerState::new(&clock);
        clock.advance(0.5);
        assert_eq!(v.frame([800, 600]).resolution, [800.0, 600.0]);
        assert_eq!(v.frame([1600, 900]).resolution, [1600.0, 900.0]);
        assert_eq!(v.uniforms().time, 0.5);
        assert_eq!(v.audio_level(), 0.0);
    }
}
