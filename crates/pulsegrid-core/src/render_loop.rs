//! Cancellable frame loop bookkeeping.
//!
//! The host's frame callback asks [`RenderLoop::on_frame`] whether to run.
//! The next frame is requested before the frame body runs, so a body that
//! fails still leaves the loop armed, and a `stop()` issued from inside the
//! body cancels that request.

use crate::error::LoopError;

pub type FrameRequest = i32;

/// Host frame-presentation callback (e.g. `requestAnimationFrame`).
pub trait FrameScheduler {
    /// `None` if the host refused the request.
    fn request_frame(&mut self) -> Option<FrameRequest>;
    fn cancel_frame(&mut self, id: FrameRequest);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running {
        generation: u64,
        pending: Option<FrameRequest>,
    },
}

pub struct RenderLoop<S: FrameScheduler> {
    scheduler: S,
    state: LoopState,
    generation: u64,
    frames: u64,
}

impl<S: FrameScheduler> RenderLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            state: LoopState::Idle,
            generation: 0,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running { .. })
    }

    /// Frames run since construction.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Arms the first frame. The returned generation must be passed back to
    /// [`on_frame`](Self::on_frame).
    pub fn start(&mut self) -> Result<u64, LoopError> {
        match self.state {
            LoopState::Running { .. } => Err(LoopError::AlreadyRunning),
            LoopState::Idle => {
                self.generation = self.generation.wrapping_add(1);
                let pending = self.scheduler.request_frame();
                self.state = LoopState::Running {
                    generation: self.generation,
                    pending,
                };
                log::info!("[loop] started (generation {})", self.generation);
                Ok(self.generation)
            }
        }
    }

    /// Idempotent. Cancels the pending request, if any.
    pub fn stop(&mut self) {
        if let LoopState::Running { pending, .. } = self.state {
            if let Some(id) = pending {
                self.scheduler.cancel_frame(id);
            }
            self.state = LoopState::Idle;
            log::info!("[loop] stopped after {} frames", self.frames);
        }
    }

    /// Called from the frame callback. Returns true if the frame body should
    /// run; in that case the next frame is already requested.
    pub fn on_frame(&mut self, generation: u64) -> bool {
        let LoopState::Running {
            generation: current,
            ..
        } = self.state
        else {
            return false;
        };
        if current != generation {
            return false;
        }
        let pending = self.scheduler.request_frame();
        if pending.is_none() {
            log::warn!("[loop] host refused the next frame request");
        }
        self.state = LoopState::Running {
            generation: current,
            pending,
        };
        self.frames += 1;
        true
    }
}

impl<S: FrameScheduler> Drop for RenderLoop<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        next: FrameRequest,
        live: Vec<FrameRequest>,
    }

    impl FrameScheduler for Counter {
        fn request_frame(&mut self) -> Option<FrameRequest> {
            self.next += 1;
            self.live.push(self.next);
            Some(self.next)
        }
        fn cancel_frame(&mut self, id: FrameRequest) {
            self.live.retain(|x| *x != id);
        }
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut l = RenderLoop::new(Counter::default());
        assert!(l.start().is_ok());
        assert_eq!(l.start(), Err(LoopError::AlreadyRunning));
    }

    #[test]
    fn nothing_is_requested_before_start() {
        let mut l = RenderLoop::new(Counter::default());
        assert_eq!(l.state(), LoopState::Idle);
        assert!(!l.on_frame(0));
        assert!(l.scheduler().live.is_empty());
        assert_eq!(l.frames(), 0);
    }

    #[test]
    fn restart_invalidates_old_callbacks() {
        let mut l = RenderLoop::new(Counter::default());
        let g1 = l.start().unwrap();
        l.stop();
        let g2 = l.start().unwrap();
        assert!(!l.on_frame(g1));
        assert!(l.on_frame(g2));
    }
}
