//! Ownership of the single live audio session.
//!
//! At most one session exists. Choosing a new file tears the previous one
//! down before anything else happens, and decodes are tagged with a ticket
//! so a slow decode for an abandoned file can never start playing.

use crate::error::PlaybackError;

/// Handle to decoded audio routed through a frequency analyser.
pub trait AudioSession {
    fn is_playing(&self) -> bool;
    /// Number of byte bins (half the analysis window).
    fn bin_count(&self) -> usize;
    /// Fill `out` with current bin magnitudes, 0..=255.
    fn frequency_bins(&self, out: &mut [u8]);
    fn start(&mut self);
    /// Suspends the shared output, not just this session.
    fn suspend(&mut self);
    /// Resumes the shared output. Never reports playing before `start`.
    fn resume(&mut self);
    /// Stop playback and release the source. Must be safe to call twice.
    fn stop(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeTicket(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackPhase {
    Empty,
    Selected,
    Decoding,
    Playing,
    Paused,
}

/// What the caller must do after a play/pause press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayPause {
    StartDecode(DecodeTicket),
    AlreadyDecoding,
    Suspended,
    Resumed,
}

pub struct PlaybackController<S: AudioSession> {
    session: Option<S>,
    file_selected: bool,
    generation: u64,
    decoding: Option<DecodeTicket>,
}

impl<S: AudioSession> Default for PlaybackController<S> {
    fn default() -> Self {
        Self {
            session: None,
            file_selected: false,
            generation: 0,
            decoding: None,
        }
    }
}

impl<S: AudioSession> PlaybackController<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> PlaybackPhase {
        match (&self.session, self.decoding, self.file_selected) {
            (Some(s), _, _) if s.is_playing() => PlaybackPhase::Playing,
            (Some(_), _, _) => PlaybackPhase::Paused,
            (None, Some(_), _) => PlaybackPhase::Decoding,
            (None, None, true) => PlaybackPhase::Selected,
            (None, None, false) => PlaybackPhase::Empty,
        }
    }

    pub fn session(&self) -> Option<&S> {
        self.session.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_playing())
    }

    /// A new file was chosen: release the current session first.
    pub fn select_file(&mut self) {
        self.release();
        self.file_selected = true;
        log::info!("[audio] file selected (generation {})", self.generation);
    }

    pub fn play_pause(&mut self) -> Result<PlayPause, PlaybackError> {
        if let Some(s) = self.session.as_mut() {
            return Ok(if s.is_playing() {
                s.suspend();
                PlayPause::Suspended
            } else {
                s.resume();
                PlayPause::Resumed
            });
        }
        if !self.file_selected {
            return Err(PlaybackError::NoFileSelected);
        }
        if self.decoding.is_some() {
            return Ok(PlayPause::AlreadyDecoding);
        }
        let ticket = DecodeTicket(self.generation);
        self.decoding = Some(ticket);
        Ok(PlayPause::StartDecode(ticket))
    }

    /// Decode finished. Starts playback only if the ticket is still current;
    /// otherwise the fresh session is stopped and dropped.
    pub fn complete_decode(
        &mut self,
        ticket: DecodeTicket,
        mut session: S,
    ) -> Result<(), PlaybackError> {
        if self.decoding != Some(ticket) {
            session.stop();
            log::warn!("[audio] dropping stale decode {:?}", ticket);
            return Err(PlaybackError::StaleDecode);
        }
        self.decoding = None;
        if let Some(mut old) = self.session.take() {
            old.stop();
        }
        // a pause before the file change leaves the shared output suspended
        session.resume();
        session.start();
        self.session = Some(session);
        Ok(())
    }

    /// Decode failed; allow another attempt for the same file.
    pub fn fail_decode(&mut self, ticket: DecodeTicket) {
        if self.decoding == Some(ticket) {
            self.decoding = None;
        }
    }

    /// Stop everything and forget the selected file.
    pub fn teardown(&mut self) {
        self.release();
        self.file_selected = false;
    }

    fn release(&mut self) {
        if let Some(mut s) = self.session.take() {
            s.stop();
        }
        self.decoding = None;
        self.generation = self.generation.wrapping_add(1);
    }
}

impl<S: AudioSession> Drop for PlaybackController<S> {
    fn drop(&mut self) {
        if let Some(s) = self.session.as_mut() {
            s.stop();
        }
    }
}
