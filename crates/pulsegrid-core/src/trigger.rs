use rand::Rng;
use smallvec::SmallVec;

use crate::constants::{cluster_note_duration_sec, NOTES_PER_CLUSTER};
use crate::error::TriggerError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Note {
    pub name: &'static str,
    pub midi: u8,
}

impl Note {
    #[inline]
    pub fn frequency_hz(&self) -> f32 {
        midi_to_hz(self.midi as f32)
    }
}

pub const D_SHARP_MINOR: [Note; 8] = [
    Note { name: "D#4", midi: 63 },
    Note { name: "F4", midi: 65 },
    Note { name: "F#4", midi: 66 },
    Note { name: "G#4", midi: 68 },
    Note { name: "A#4", midi: 70 },
    Note { name: "B4", midi: 71 },
    Note { name: "C#5", midi: 73 },
    Note { name: "D#5", midi: 75 },
];

pub type NoteCluster = SmallVec<[Note; NOTES_PER_CLUSTER]>;

/// Whatever actually makes sound.
pub trait NoteSink {
    fn play_cluster(&mut self, notes: &[Note], duration_sec: f32) -> Result<(), TriggerError>;
}

/// Fires a short random chord when an interaction starts.
pub struct AudioTrigger<R: Rng> {
    rng: R,
    scale: &'static [Note],
}

impl<R: Rng> AudioTrigger<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            scale: &D_SHARP_MINOR,
        }
    }

    /// Independent uniform picks, repeats allowed.
    pub fn pick_cluster(&mut self) -> NoteCluster {
        (0..NOTES_PER_CLUSTER)
            .map(|_| self.scale[self.rng.gen_range(0..self.scale.len())])
            .collect()
    }

    /// Returns the notes that were sent, or `None` if the sink was missing
    /// or refused them. Never fails the caller.
    pub fn on_interaction_start(&mut self, sink: Option<&mut dyn NoteSink>) -> Option<NoteCluster> {
        let Some(sink) = sink else {
            log::debug!("[synth] no audio engine yet; skipping note cluster");
            return None;
        };
        let notes = self.pick_cluster();
        match sink.play_cluster(&notes, cluster_note_duration_sec()) {
            Ok(()) => Some(notes),
            Err(e) => {
                log::warn!("[synth] note cluster dropped: {}", e);
                None
            }
        }
    }
}

pub fn midi_to_hz(midi: f32) -> f32 {
    440.0 * (2.0_f32).powf((midi - 69.0) / 12.0)
}
