use crate::audio::{decode_file, SynthChain, WebAudioSession};
use crate::constants::*;
use crate::dom;
use crate::frame::{SharedGrid, SharedSynth, SharedVisualizer};
use glam::Vec2;
use pulsegrid_core::{
    client_to_ndc, press_targets_scene, Clock, NoteSink, PlayPause, PlaybackError, PlaybackPhase,
    VisualizerState,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

// ===================== Visualizer controls =====================

/// Audio context plus the file the user picked. The context is created on
/// the first play press so it starts inside a user gesture.
#[derive(Default)]
pub struct PlaybackInputs {
    pub audio_ctx: Option<web::AudioContext>,
    pub file: Option<web::File>,
}

pub type SharedPlayback = Rc<RefCell<PlaybackInputs>>;

pub fn wire_visualizer_controls(
    document: &web::Document,
    state: &SharedVisualizer,
    playback: &SharedPlayback,
) {
    type Visualizer = VisualizerState<WebAudioSession, Clock>;
    let sliders: [(&str, fn(&mut Visualizer, f32)); 5] = [
        (AMPLITUDE_SLIDER_ID, |s, v| s.set_amplitude(v)),
        (SPEED_SLIDER_ID, |s, v| s.set_speed(v)),
        (COLOR_SHIFT_SLIDER_ID, |s, v| s.set_color_shift(v)),
        (ITERATIONS_SLIDER_ID, |s, v| s.set_iterations(v)),
        (UV_SCALE_SLIDER_ID, |s, v| s.set_uv_scale(v)),
    ];
    for (id, apply) in sliders {
        let state = state.clone();
        dom::add_range_listener(document, id, move |v| apply(&mut state.borrow_mut(), v));
    }

    let state_dir = state.clone();
    let doc_dir = document.clone();
    dom::add_click_listener(document, DIRECTION_BUTTON_ID, move || {
        let direction = state_dir.borrow_mut().toggle_direction();
        dom::set_text(&doc_dir, DIRECTION_BUTTON_ID, direction.label());
    });

    let state_file = state.clone();
    let playback_file = playback.clone();
    let doc_file = document.clone();
    dom::add_file_listener(document, AUDIO_FILE_INPUT_ID, move |file| {
        log::info!("[visualizer] selected {}", file.name());
        playback_file.borrow_mut().file = Some(file);
        state_file.borrow_mut().select_file();
        sync_play_label(&doc_file, &state_file);
    });

    let state_play = state.clone();
    let playback_play = playback.clone();
    let doc_play = document.clone();
    dom::add_click_listener(document, PLAY_PAUSE_BUTTON_ID, move || {
        on_play_pause(&doc_play, &state_play, &playback_play);
    });
}

fn on_play_pause(document: &web::Document, state: &SharedVisualizer, playback: &SharedPlayback) {
    let press = state.borrow_mut().play_pause();
    match press {
        Ok(PlayPause::StartDecode(ticket)) => {
            let (ctx, file) = {
                let mut inputs = playback.borrow_mut();
                if inputs.audio_ctx.is_none() {
                    match web::AudioContext::new() {
                        Ok(ctx) => inputs.audio_ctx = Some(ctx),
                        Err(e) => log::error!("[visualizer] AudioContext error: {:?}", e),
                    }
                }
                (inputs.audio_ctx.clone(), inputs.file.clone())
            };
            let (Some(ctx), Some(file)) = (ctx, file) else {
                state.borrow_mut().fail_decode(ticket);
                return;
            };
            let state = state.clone();
            let document = document.clone();
            spawn_local(async move {
                let session = match decode_file(&ctx, &file).await {
                    Ok(buffer) => WebAudioSession::new(&ctx, &buffer).map_err(anyhow::Error::from),
                    Err(e) => Err(e),
                };
                match session {
                    Ok(session) => {
                        if let Err(e) = state.borrow_mut().complete_decode(ticket, session) {
                            log::info!("[visualizer] {}", e);
                        }
                    }
                    Err(e) => {
                        log::error!("[visualizer] could not load {}: {:?}", file.name(), e);
                        state.borrow_mut().fail_decode(ticket);
                    }
                }
                sync_play_label(&document, &state);
            });
        }
        Ok(PlayPause::AlreadyDecoding) => log::debug!("[visualizer] decode already in flight"),
        Ok(PlayPause::Suspended | PlayPause::Resumed) => {}
        Err(PlaybackError::NoFileSelected) => dom::alert("Please select an audio file first."),
        Err(e) => log::warn!("[visualizer] {}", e),
    }
    sync_play_label(document, state);
}

fn sync_play_label(document: &web::Document, state: &SharedVisualizer) {
    let label = match state.borrow().phase() {
        PlaybackPhase::Playing => "Pause",
        PlaybackPhase::Decoding => "Loading…",
        _ => "Play",
    };
    dom::set_text(document, PLAY_PAUSE_BUTTON_ID, label);
}

// ===================== Grid pointer + synth =====================

/// Window client position to NDC using the viewport size.
fn event_ndc(ev: &web::MouseEvent) -> Option<Vec2> {
    let window = web::window()?;
    let width = window.inner_width().ok()?.as_f64()? as f32;
    let height = window.inner_height().ok()?.as_f64()? as f32;
    client_to_ndc(ev.client_x() as f32, ev.client_y() as f32, width, height)
}

fn press_reaches_scene(ev: &web::MouseEvent) -> bool {
    ev.target()
        .and_then(|t| t.dyn_into::<web::Element>().ok())
        .map_or(true, |el| press_targets_scene(&el.tag_name()))
}

fn add_window_mouse_listener(event: &str, handler: impl FnMut(web::MouseEvent) + 'static) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::MouseEvent)>);
    if let Some(window) = web::window() {
        _ = window.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

pub fn wire_grid_pointer(grid: &SharedGrid, synth: &SharedSynth) {
    let grid_move = grid.clone();
    add_window_mouse_listener("mousemove", move |ev| {
        if let Some(ndc) = event_ndc(&ev) {
            grid_move.borrow_mut().pointer_move(ndc);
        }
    });

    let grid_down = grid.clone();
    let synth_down = synth.clone();
    add_window_mouse_listener("mousedown", move |ev| {
        if !press_reaches_scene(&ev) {
            return;
        }
        let Some(ndc) = event_ndc(&ev) else {
            return;
        };
        let mut synth = synth_down.borrow_mut();
        if let Some(s) = synth.as_ref() {
            s.resume();
        }
        let sink = synth.as_mut().map(|s| s as &mut dyn NoteSink);
        if let Some(notes) = grid_down.borrow_mut().pointer_down(ndc, sink) {
            log::debug!("[grid] played {:?}", notes);
        }
    });

    let grid_up = grid.clone();
    add_window_mouse_listener("mouseup", move |_| grid_up.borrow_mut().pointer_up());

    let grid_leave = grid.clone();
    add_window_mouse_listener("mouseout", move |ev| {
        // only when leaving the page itself, not crossing child elements
        if ev.related_target().is_none() {
            grid_leave.borrow_mut().pointer_leave();
        }
    });
}

pub fn wire_synth_controls(document: &web::Document, synth: &SharedSynth) {
    let sliders: [(&str, fn(&mut SynthChain, f32)); 4] = [
        (VOLUME_SLIDER_ID, |s, v| s.set_volume_db(v)),
        (REVERB_DECAY_SLIDER_ID, |s, v| s.set_reverb_decay_sec(v)),
        (REVERB_PRE_DELAY_SLIDER_ID, |s, v| s.set_reverb_pre_delay_sec(v)),
        (REVERB_WET_SLIDER_ID, |s, v| s.set_reverb_wet(v)),
    ];
    for (id, apply) in sliders {
        let synth = synth.clone();
        dom::add_range_listener(document, id, move |v| {
            if let Some(s) = synth.borrow_mut().as_mut() {
                apply(s, v);
            }
        });
    }
}
