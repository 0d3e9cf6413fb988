//! Synth/reverb settings and the pure DSP helpers behind the grid's audio
//! chain: envelope breakpoints, procedural impulse response, debouncing.

use crate::constants::*;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SynthSettings {
    volume_db: f32,
    reverb_decay_sec: f32,
    reverb_pre_delay_sec: f32,
    reverb_wet: f32,
}

impl Default for SynthSettings {
    fn default() -> Self {
        Self {
            volume_db: DEFAULT_VOLUME_DB,
            reverb_decay_sec: DEFAULT_REVERB_DECAY_SEC,
            reverb_pre_delay_sec: DEFAULT_REVERB_PRE_DELAY_SEC,
            reverb_wet: DEFAULT_REVERB_WET,
        }
    }
}

#[inline]
fn clamp_or(value: f32, range: (f32, f32), previous: f32) -> f32 {
    if value.is_finite() {
        value.clamp(range.0, range.1)
    } else {
        previous
    }
}

impl SynthSettings {
    pub fn volume_db(&self) -> f32 {
        self.volume_db
    }
    pub fn reverb_decay_sec(&self) -> f32 {
        self.reverb_decay_sec
    }
    pub fn reverb_pre_delay_sec(&self) -> f32 {
        self.reverb_pre_delay_sec
    }
    pub fn reverb_wet(&self) -> f32 {
        self.reverb_wet
    }

    pub fn master_gain(&self) -> f32 {
        db_to_gain(self.volume_db)
    }

    /// Level of the unprocessed signal inside the reverb send.
    pub fn reverb_dry(&self) -> f32 {
        1.0 - self.reverb_wet
    }

    pub fn set_volume_db(&mut self, v: f32) {
        self.volume_db = clamp_or(v, VOLUME_DB_RANGE, self.volume_db);
    }

    /// Returns true if the impulse response needs rebuilding.
    pub fn set_reverb_decay_sec(&mut self, v: f32) -> bool {
        let next = clamp_or(v, REVERB_DECAY_RANGE, self.reverb_decay_sec);
        let changed = (next - self.reverb_decay_sec).abs() > f32::EPSILON;
        self.reverb_decay_sec = next;
        changed
    }

    pub fn set_reverb_pre_delay_sec(&mut self, v: f32) {
        self.reverb_pre_delay_sec = clamp_or(v, REVERB_PRE_DELAY_RANGE, self.reverb_pre_delay_sec);
    }

    pub fn set_reverb_wet(&mut self, v: f32) {
        self.reverb_wet = clamp_or(v, REVERB_WET_RANGE, self.reverb_wet);
    }
}

#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// ADSR envelope expressed as gain ramps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
    pub attack_sec: f32,
    pub decay_sec: f32,
    pub sustain: f32,
    pub release_sec: f32,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            attack_sec: SYNTH_ATTACK_SEC,
            decay_sec: SYNTH_DECAY_SEC,
            sustain: SYNTH_SUSTAIN_LEVEL,
            release_sec: SYNTH_RELEASE_SEC,
        }
    }
}

impl Envelope {
    /// `(time, gain)` ramp targets for a note starting at `start` (gain 0)
    /// and released after `hold_sec`. Times never decrease.
    pub fn breakpoints(&self, start: f64, hold_sec: f32, peak: f32) -> [(f64, f32); 4] {
        let attack_end = start + self.attack_sec as f64;
        let release_at = start + hold_sec.max(self.attack_sec) as f64;
        let decay_end = (attack_end + self.decay_sec as f64).min(release_at);
        let sustain = peak * self.sustain;
        [
            (attack_end, peak),
            (decay_end, sustain),
            (release_at, sustain),
            (release_at + self.release_sec as f64, 0.0),
        ]
    }

    /// When the oscillator can be stopped.
    pub fn end_time(&self, start: f64, hold_sec: f32) -> f64 {
        start + hold_sec.max(self.attack_sec) as f64 + self.release_sec as f64
    }
}

/// Stereo decaying noise reaching `REVERB_TAIL_DB` at `decay_sec`.
/// Deterministic (fixed xorshift seeds per channel).
pub fn reverb_impulse_response(sample_rate: f32, decay_sec: f32) -> [Vec<f32>; 2] {
    let len = ((sample_rate.max(1.0) * decay_sec.max(0.0)).round() as usize).max(1);
    let dt = 1.0 / sample_rate.max(1.0);
    // ln of the tail gain, spread over the decay window
    let k = (REVERB_TAIL_DB / 20.0) * std::f32::consts::LN_10 / decay_sec.max(1e-3);
    let mut seeds: [u32; 2] = [0x1234ABCD, 0x7890FEDC];
    let mut out = [Vec::with_capacity(len), Vec::with_capacity(len)];
    for (ch, buf) in out.iter_mut().enumerate() {
        let s = &mut seeds[ch];
        for i in 0..len {
            let mut x = *s;
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            *s = x;
            let n = (x as f32 / u32::MAX as f32) * 2.0 - 1.0;
            let t = i as f32 * dt;
            buf.push(n * (k * t).exp());
        }
    }
    out
}

/// Coalesces bursts of changes into one action after a quiet period.
#[derive(Clone, Copy, Debug)]
pub struct Debouncer {
    delay_sec: f32,
    deadline: Option<f32>,
}

impl Debouncer {
    pub fn new(delay_sec: f32) -> Self {
        Self {
            delay_sec,
            deadline: None,
        }
    }

    /// Note a change at `now`, pushing the deadline out.
    pub fn poke(&mut self, now: f32) {
        self.deadline = Some(now + self.delay_sec);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once when the quiet period has elapsed.
    pub fn poll(&mut self, now: f32) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(REVERB_REBUILD_DEBOUNCE_SEC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_volume_is_quarter_gain() {
        let s = SynthSettings::default();
        assert!((s.master_gain() - 0.2512).abs() < 1e-3);
        assert_eq!(s.reverb_dry(), 0.0);
    }

    #[test]
    fn decay_change_reports_rebuild_only_when_value_moves() {
        let mut s = SynthSettings::default();
        assert!(!s.set_reverb_decay_sec(30.0));
        assert!(!s.set_reverb_decay_sec(99.0)); // clamps back to 30
        assert!(s.set_reverb_decay_sec(4.0));
        assert_eq!(s.reverb_decay_sec(), 4.0);
    }

    #[test]
    fn short_hold_clips_decay_segment() {
        let env = Envelope::default();
        let bp = env.breakpoints(0.0, 0.05, 1.0);
        assert!(bp[1].0 <= bp[2].0);
        assert!((bp[2].0 - 0.05).abs() < 1e-9);
    }
}
