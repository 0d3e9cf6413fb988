// Host-side tests for playback ownership, decode tickets and the
// visualizer's per-frame audio level.

use pulsegrid_core::*;
use pulsegrid_core::constants::FREQUENCY_BIN_COUNT;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Log = Rc<RefCell<Vec<String>>>;
/// True while the shared audio output is suspended.
type Output = Rc<Cell<bool>>;

struct FakeSession {
    name: &'static str,
    playing: bool,
    bins: Vec<u8>,
    log: Log,
    output: Output,
}

impl FakeSession {
    fn new(name: &'static str, level: u8, log: &Log) -> Self {
        Self::on_output(name, level, log, &Output::default())
    }

    fn on_output(name: &'static str, level: u8, log: &Log, output: &Output) -> Self {
        Self {
            name,
            playing: false,
            bins: vec![level; FREQUENCY_BIN_COUNT],
            log: log.clone(),
            output: output.clone(),
        }
    }

    fn audible(&self) -> bool {
        self.playing && !self.output.get()
    }

    fn note(&self, what: &str) {
        self.log.borrow_mut().push(format!("{}:{}", self.name, what));
    }
}

impl AudioSession for FakeSession {
    fn is_playing(&self) -> bool {
        self.playing
    }
    fn bin_count(&self) -> usize {
        self.bins.len()
    }
    fn frequency_bins(&self, out: &mut [u8]) {
        out.copy_from_slice(&self.bins[..out.len()]);
    }
    fn start(&mut self) {
        self.playing = true;
        self.note("start");
    }
    fn suspend(&mut self) {
        self.output.set(true);
        self.playing = false;
        self.note("suspend");
    }
    fn resume(&mut self) {
        self.output.set(false);
        self.playing = true;
        self.note("resume");
    }
    fn stop(&mut self) {
        self.playing = false;
        self.note("stop");
    }
}

fn start_playing(
    ctl: &mut PlaybackController<FakeSession>,
    name: &'static str,
    level: u8,
    log: &Log,
) {
    ctl.select_file();
    let PlayPause::StartDecode(ticket) = ctl.play_pause().unwrap() else {
        panic!("expected a decode to start");
    };
    ctl.complete_decode(ticket, FakeSession::new(name, level, log))
        .unwrap();
}

#[test]
fn play_without_file_is_reported_not_fatal() {
    let mut ctl: PlaybackController<FakeSession> = PlaybackController::new();
    assert_eq!(ctl.play_pause(), Err(PlaybackError::NoFileSelected));
    assert_eq!(ctl.phase(), PlaybackPhase::Empty);
}

#[test]
fn new_file_stops_old_session_before_new_start() {
    let log: Log = Rc::default();
    let mut ctl = PlaybackController::new();
    start_playing(&mut ctl, "a", 10, &log);
    start_playing(&mut ctl, "b", 10, &log);
    let events = log.borrow().clone();
    let stop_a = events.iter().position(|e| e == "a:stop").unwrap();
    let start_b = events.iter().position(|e| e == "b:start").unwrap();
    assert!(stop_a < start_b, "{:?}", events);
    assert_eq!(ctl.phase(), PlaybackPhase::Playing);
}

#[test]
fn stale_decode_never_plays() {
    let log: Log = Rc::default();
    let mut ctl = PlaybackController::new();
    ctl.select_file();
    let PlayPause::StartDecode(old) = ctl.play_pause().unwrap() else {
        panic!("expected decode");
    };
    // user picks another file while the first decode is in flight
    ctl.select_file();
    let PlayPause::StartDecode(fresh) = ctl.play_pause().unwrap() else {
        panic!("expected decode");
    };
    assert_eq!(
        ctl.complete_decode(old, FakeSession::new("old", 200, &log)),
        Err(PlaybackError::StaleDecode)
    );
    assert!(!log.borrow().iter().any(|e| e == "old:start"));
    assert_eq!(ctl.phase(), PlaybackPhase::Decoding);
    ctl.complete_decode(fresh, FakeSession::new("fresh", 0, &log))
        .unwrap();
    assert_eq!(ctl.phase(), PlaybackPhase::Playing);
}

#[test]
fn second_press_while_decoding_does_not_start_another() {
    let mut ctl: PlaybackController<FakeSession> = PlaybackController::new();
    ctl.select_file();
    assert!(matches!(ctl.play_pause(), Ok(PlayPause::StartDecode(_))));
    assert_eq!(ctl.play_pause(), Ok(PlayPause::AlreadyDecoding));
}

#[test]
fn failed_decode_allows_retry() {
    let mut ctl: PlaybackController<FakeSession> = PlaybackController::new();
    ctl.select_file();
    let Ok(PlayPause::StartDecode(t)) = ctl.play_pause() else {
        panic!("expected decode");
    };
    ctl.fail_decode(t);
    assert_eq!(ctl.phase(), PlaybackPhase::Selected);
    assert!(matches!(ctl.play_pause(), Ok(PlayPause::StartDecode(_))));
}

#[test]
fn play_pause_toggles_suspend_and_resume() {
    let log: Log = Rc::default();
    let mut ctl = PlaybackController::new();
    start_playing(&mut ctl, "a", 0, &log);
    assert_eq!(ctl.play_pause(), Ok(PlayPause::Suspended));
    assert_eq!(ctl.phase(), PlaybackPhase::Paused);
    assert_eq!(ctl.play_pause(), Ok(PlayPause::Resumed));
    assert!(ctl.is_playing());
}

#[test]
fn new_file_after_pause_is_audible_on_first_press() {
    let log: Log = Rc::default();
    let output: Output = Rc::default();
    let mut ctl = PlaybackController::new();
    ctl.select_file();
    let Ok(PlayPause::StartDecode(t)) = ctl.play_pause() else {
        panic!("expected decode");
    };
    ctl.complete_decode(t, FakeSession::on_output("a", 0, &log, &output))
        .unwrap();
    assert_eq!(ctl.play_pause(), Ok(PlayPause::Suspended));
    assert!(output.get());

    ctl.select_file();
    let Ok(PlayPause::StartDecode(t)) = ctl.play_pause() else {
        panic!("expected decode");
    };
    ctl.complete_decode(t, FakeSession::on_output("b", 0, &log, &output))
        .unwrap();
    assert!(!output.get(), "output still suspended: {:?}", log.borrow());
    assert!(ctl.session().is_some_and(|s| s.audible()));
    assert_eq!(ctl.phase(), PlaybackPhase::Playing);
}

#[test]
fn teardown_and_drop_stop_the_session() {
    let log: Log = Rc::default();
    {
        let mut ctl = PlaybackController::new();
        start_playing(&mut ctl, "a", 0, &log);
        ctl.teardown();
        assert_eq!(ctl.phase(), PlaybackPhase::Empty);
    }
    {
        let mut ctl = PlaybackController::new();
        start_playing(&mut ctl, "b", 0, &log);
    }
    let events = log.borrow();
    assert!(events.contains(&"a:stop".to_string()));
    assert!(events.contains(&"b:stop".to_string()));
}

#[test]
fn audio_level_is_zero_until_playing_then_tracks_bins() {
    let log: Log = Rc::default();
    let clock = ManualClock::new(0.0);
    let mut vis: VisualizerState<FakeSession, _> = VisualizerState::new(&clock);
    vis.frame([640, 480]);
    assert_eq!(vis.audio_level(), 0.0);

    vis.select_file();
    let Ok(PlayPause::StartDecode(t)) = vis.play_pause() else {
        panic!("expected decode");
    };
    vis.frame([640, 480]);
    assert_eq!(vis.audio_level(), 0.0, "decode pending reads as silence");

    vis.complete_decode(t, FakeSession::new("song", 51, &log))
        .unwrap();
    let u = *vis.frame([640, 480]);
    assert!((u.audio_level - 0.2).abs() < 1e-6);

    vis.play_pause().unwrap();
    assert_eq!(vis.frame([640, 480]).audio_level, 0.0);
}

#[test]
fn shader_time_restarts_with_playback() {
    let log: Log = Rc::default();
    let clock = ManualClock::new(0.0);
    let mut vis: VisualizerState<FakeSession, _> = VisualizerState::new(&clock);
    clock.advance(10.0);
    assert_eq!(vis.frame([1, 1]).time, 10.0);

    vis.select_file();
    let Ok(PlayPause::StartDecode(t)) = vis.play_pause() else {
        panic!("expected decode");
    };
    vis.complete_decode(t, FakeSession::new("song", 0, &log))
        .unwrap();
    clock.advance(1.5);
    assert_eq!(vis.frame([1, 1]).time, 1.5);
}
