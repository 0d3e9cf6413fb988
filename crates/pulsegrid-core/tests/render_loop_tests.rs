// Host-side tests for frame loop cancellation.

use pulsegrid_core::*;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct HostFrames {
    next: FrameRequest,
    pending: Vec<FrameRequest>,
    cancelled: Vec<FrameRequest>,
}

#[derive(Clone, Default)]
struct SharedHost(Rc<RefCell<HostFrames>>);

impl FrameScheduler for SharedHost {
    fn request_frame(&mut self) -> Option<FrameRequest> {
        let mut h = self.0.borrow_mut();
        h.next += 1;
        let id = h.next;
        h.pending.push(id);
        Some(id)
    }

    fn cancel_frame(&mut self, id: FrameRequest) {
        let mut h = self.0.borrow_mut();
        h.pending.retain(|p| *p != id);
        h.cancelled.push(id);
    }
}

impl SharedHost {
    /// Fire the oldest pending frame, as the browser would.
    fn fire(&self) -> Option<FrameRequest> {
        let mut h = self.0.borrow_mut();
        if h.pending.is_empty() {
            None
        } else {
            Some(h.pending.remove(0))
        }
    }

    fn pending(&self) -> usize {
        self.0.borrow().pending.len()
    }
}

#[test]
fn loop_rearms_every_frame_while_running() {
    let host = SharedHost::default();
    let mut lp = RenderLoop::new(host.clone());
    let gen = lp.start().unwrap();
    for _ in 0..5 {
        assert!(host.fire().is_some());
        assert!(lp.on_frame(gen));
        assert_eq!(host.pending(), 1);
    }
    assert_eq!(lp.frames(), 5);
}

#[test]
fn stop_cancels_pending_and_late_frames_do_not_rearm() {
    let host = SharedHost::default();
    let mut lp = RenderLoop::new(host.clone());
    let gen = lp.start().unwrap();
    lp.stop();
    assert_eq!(host.pending(), 0);
    assert_eq!(host.0.borrow().cancelled.len(), 1);

    // a callback that was already queued by the host still arrives
    assert!(!lp.on_frame(gen));
    assert_eq!(host.pending(), 0);

    lp.stop();
    assert_eq!(lp.state(), LoopState::Idle);
}

#[test]
fn stop_from_inside_frame_body_cancels_the_rearm() {
    let host = SharedHost::default();
    let mut lp = RenderLoop::new(host.clone());
    let gen = lp.start().unwrap();
    host.fire();
    assert!(lp.on_frame(gen));
    // frame body decides to tear down
    lp.stop();
    assert_eq!(host.pending(), 0);
    assert!(!lp.is_running());
}

#[test]
fn dropping_the_loop_cancels_its_frame() {
    let host = SharedHost::default();
    {
        let mut lp = RenderLoop::new(host.clone());
        lp.start().unwrap();
        assert_eq!(host.pending(), 1);
    }
    assert_eq!(host.pending(), 0);
}
