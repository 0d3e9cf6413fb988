// Shared tuning constants for both demos.

// ---------------- Visualizer ----------------

// Analyser window; the analyser exposes half as many byte bins
pub const ANALYSER_FFT_SIZE: u32 = 2048;
pub const FREQUENCY_BIN_COUNT: usize = (ANALYSER_FFT_SIZE / 2) as usize;
pub const MAX_BIN_MAGNITUDE: f32 = 255.0;

// Hard loop bound inside the fractal shader
pub const SHADER_MAX_ITERATIONS: f32 = 12.0;

// Slider ranges (min, max)
pub const AMPLITUDE_RANGE: (f32, f32) = (0.0, 2.0);
pub const SPEED_RANGE: (f32, f32) = (0.0, 10.0);
pub const COLOR_SHIFT_RANGE: (f32, f32) = (0.0, 1.0);
pub const ITERATIONS_RANGE: (f32, f32) = (0.2, 3.0);
pub const UV_SCALE_RANGE: (f32, f32) = (0.1, 3.5);

// Slider defaults
pub const DEFAULT_AMPLITUDE: f32 = 0.5;
pub const DEFAULT_SPEED: f32 = 2.0;
pub const DEFAULT_COLOR_SHIFT: f32 = 0.4;
pub const DEFAULT_ITERATIONS: f32 = 1.0;
pub const DEFAULT_UV_SCALE: f32 = 1.5;

// ---------------- Grid scene ----------------

pub const GRID_SIZE: f32 = 300.0; // world units, square
pub const GRID_DIVISIONS: u32 = 40;
pub const TILE_ELEVATION: f32 = 0.01;
pub const GRID_LINE_COLOR: u32 = 0xCCCCCC;
pub const GRID_LINE_OPACITY: f32 = 0.3;

// Hover highlight
pub const FADE_DURATION_SEC: f32 = 1.0;
pub const TILE_PALETTE: [u32; 4] = [0xA084E8, 0x33BBC5, 0x85E6C5, 0xC8FFE0];
pub const TILE_NEUTRAL_COLOR: u32 = 0x000000;

// Orthographic camera
pub const CAMERA_FRUSTUM_SIZE: f32 = 100.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 2000.0;
pub const CAMERA_POSITION: [f32; 3] = [50.0, 40.0, 50.0];

// Drag-to-tilt
pub const ROTATION_LIMIT_RAD: f32 = 0.26; // ~15 degrees either way
pub const ROTATION_DRAG_GAIN: f32 = 0.5; // radians per NDC unit
pub const ROTATION_DECAY_PER_FRAME: f32 = 0.9;

// Post-process
pub const VIGNETTE_OFFSET: f32 = 0.95;
pub const VIGNETTE_DARKNESS: f32 = 1.6;

// ---------------- Synth ----------------

pub const NOTES_PER_CLUSTER: usize = 4;
pub const CLUSTER_TEMPO_BPM: f32 = 120.0;
pub const CLUSTER_NOTE_BEATS: f32 = 0.5; // an eighth note

pub const SYNTH_ATTACK_SEC: f32 = 0.005;
pub const SYNTH_DECAY_SEC: f32 = 0.1;
pub const SYNTH_SUSTAIN_LEVEL: f32 = 0.3;
pub const SYNTH_RELEASE_SEC: f32 = 1.0;
pub const SYNTH_VOICE_PEAK: f32 = 0.25; // per-note peak so a 4-note cluster stays below 1.0

pub const VOLUME_DB_RANGE: (f32, f32) = (-60.0, 0.0);
pub const REVERB_DECAY_RANGE: (f32, f32) = (1.0, 30.0);
pub const REVERB_PRE_DELAY_RANGE: (f32, f32) = (0.0, 1.0);
pub const REVERB_WET_RANGE: (f32, f32) = (0.0, 1.0);

pub const DEFAULT_VOLUME_DB: f32 = -12.0;
pub const DEFAULT_REVERB_DECAY_SEC: f32 = 30.0;
pub const DEFAULT_REVERB_PRE_DELAY_SEC: f32 = 0.1;
pub const DEFAULT_REVERB_WET: f32 = 1.0;

// Impulse response rebuilds are coalesced over this quiet period
pub const REVERB_REBUILD_DEBOUNCE_SEC: f32 = 0.1;
pub const REVERB_TAIL_DB: f32 = -60.0; // level reached at `decay` seconds

/// Split a packed 0xRRGGBB colour into linear-ish [0,1] components.
#[inline]
pub fn hex_to_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
    ]
}

/// Duration of one cluster note in seconds.
#[inline]
pub fn cluster_note_duration_sec() -> f32 {
    CLUSTER_NOTE_BEATS * 60.0 / CLUSTER_TEMPO_BPM
}
