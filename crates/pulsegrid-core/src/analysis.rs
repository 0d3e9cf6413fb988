//! Frequency spectrum → single loudness scalar.

use crate::constants::MAX_BIN_MAGNITUDE;
use crate::session::AudioSession;

/// Mean of all byte bins normalized by the largest possible magnitude.
/// Empty input reads as silence.
#[inline]
pub fn mean_level(bins: &[u8]) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    let sum: u64 = bins.iter().map(|b| *b as u64).sum();
    (sum as f64 / (bins.len() as f64 * MAX_BIN_MAGNITUDE as f64)) as f32
}

/// Reusable scratch buffer for reading analyser bins each frame.
#[derive(Default, Debug)]
pub struct AudioFeatureExtractor {
    bins: Vec<u8>,
}

impl AudioFeatureExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current loudness in [0,1]; 0 when there is no session or it is not
    /// playing (nothing selected, decode pending, suspended).
    pub fn sample<S: AudioSession + ?Sized>(&mut self, session: Option<&S>) -> f32 {
        let Some(session) = session else {
            return 0.0;
        };
        if !session.is_playing() {
            return 0.0;
        }
        let count = session.bin_count();
        if self.bins.len() != count {
            self.bins.resize(count, 0);
        }
        session.frequency_bins(&mut self.bins);
        mean_level(&self.bins).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_scale_bins_read_as_one() {
        assert_eq!(mean_level(&[255; 1024]), 1.0);
    }

    #[test]
    fn silent_bins_read_as_zero() {
        assert_eq!(mean_level(&[0; 1024]), 0.0);
        assert_eq!(mean_level(&[]), 0.0);
    }

    #[test]
    fn mixed_bins_average() {
        let level = mean_level(&[0, 255, 51, 102]);
        assert!((level - 408.0 / 1020.0).abs() < 1e-6);
    }
}
