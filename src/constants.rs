// DOM ids and browser-side tuning for the two demos.
//
// Everything here is plain data so host tests can include it directly.

// Canvases; a page hosts either demo or both
pub const VISUALIZER_CANVAS_ID: &str = "visualizer-canvas";
pub const GRID_CANVAS_ID: &str = "grid-canvas";

// Visualizer controls
pub const AUDIO_FILE_INPUT_ID: &str = "audio-file";
pub const PLAY_PAUSE_BUTTON_ID: &str = "play-pause";
pub const DIRECTION_BUTTON_ID: &str = "direction";
pub const AMPLITUDE_SLIDER_ID: &str = "amplitude";
pub const SPEED_SLIDER_ID: &str = "speed";
pub const COLOR_SHIFT_SLIDER_ID: &str = "color-shift";
pub const ITERATIONS_SLIDER_ID: &str = "iterations";
pub const UV_SCALE_SLIDER_ID: &str = "uv-scale";

// Grid synth controls
pub const VOLUME_SLIDER_ID: &str = "volume";
pub const REVERB_DECAY_SLIDER_ID: &str = "reverb-decay";
pub const REVERB_PRE_DELAY_SLIDER_ID: &str = "reverb-pre-delay";
pub const REVERB_WET_SLIDER_ID: &str = "reverb-wet";

// Audio graph
pub const MAX_PRE_DELAY_SEC: f64 = 1.0; // DelayNode capacity; matches the slider max
pub const NOTE_START_OFFSET_SEC: f64 = 0.005; // schedule slightly ahead of currentTime
pub const OSC_STOP_PADDING_SEC: f64 = 0.05;

// Render
pub const CLEAR_COLOR: [f64; 4] = [0.0, 0.0, 0.0, 1.0];
pub const MAX_TILE_INSTANCES: usize = 1600; // 40 x 40 grid
