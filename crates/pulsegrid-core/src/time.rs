//! Monotonic elapsed-time sources.
//!
//! Every time-based decision in a frame (shader time, fade progress,
//! debounce windows) reads one `TimeSource` so all of them agree.

use instant::Instant;
use std::cell::Cell;

pub trait TimeSource {
    /// Seconds elapsed since the source was created or last restarted.
    fn elapsed_sec(&self) -> f32;
}

/// Wall clock backed by `instant::Instant` (performance.now() on wasm).
#[derive(Clone, Debug)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn restart(&mut self) {
        self.origin = Instant::now();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for Clock {
    fn elapsed_sec(&self) -> f32 {
        self.origin.elapsed().as_secs_f32()
    }
}

/// Hand-advanced clock for deterministic stepping.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f32>,
}

impl ManualClock {
    pub fn new(start_sec: f32) -> Self {
        Self {
            now: Cell::new(start_sec),
        }
    }

    pub fn advance(&self, dt_sec: f32) {
        self.now.set(self.now.get() + dt_sec.max(0.0));
    }

    pub fn set(&self, now_sec: f32) {
        self.now.set(now_sec);
    }
}

impl TimeSource for ManualClock {
    fn elapsed_sec(&self) -> f32 {
        self.now.get()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn elapsed_sec(&self) -> f32 {
        (**self).elapsed_sec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_never_runs_backwards_on_advance() {
        let clock = ManualClock::new(1.0);
        clock.advance(-5.0);
        assert_eq!(clock.elapsed_sec(), 1.0);
        clock.advance(0.5);
        assert!((clock.elapsed_sec() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn wall_clock_is_monotonic() {
        let clock = Clock::new();
        let a = clock.elapsed_sec();
        let b = clock.elapsed_sec();
        assert!(b >= a);
    }
}
