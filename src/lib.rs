#![cfg(target_arch = "wasm32")]
use crate::constants::{GRID_CANVAS_ID, VISUALIZER_CANVAS_ID};
use pulsegrid_core::{Clock, GridController, VisualizerState};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod audio;
mod constants;
mod dom;
mod events;
mod frame;
mod render;

use audio::SynthChain;
use events::{PlaybackInputs, SharedPlayback};
use frame::{GridSceneFrame, LoopHandle, SharedGrid, SharedSynth, SharedVisualizer, VisualizerFrame};
use render::{GridRenderer, VisualizerRenderer};

/// A demo that made it through setup and is drawing.
enum Demo {
    Visualizer {
        frame_loop: LoopHandle,
        state: SharedVisualizer,
        playback: SharedPlayback,
    },
    Grid {
        frame_loop: LoopHandle,
        grid: SharedGrid,
        synth: SharedSynth,
    },
}

impl Demo {
    /// Loop first, then audio, then the GPU state owned by the loop.
    fn teardown(self) {
        match self {
            Demo::Visualizer {
                frame_loop,
                state,
                playback,
            } => {
                frame_loop.stop();
                state.borrow_mut().teardown();
                if let Some(ctx) = playback.borrow_mut().audio_ctx.take() {
                    _ = ctx.close();
                }
                drop(frame_loop);
            }
            Demo::Grid {
                frame_loop,
                grid,
                synth,
            } => {
                frame_loop.stop();
                grid.borrow_mut().teardown();
                if let Some(mut s) = synth.borrow_mut().take() {
                    s.close();
                }
                drop(frame_loop);
            }
        }
        log::info!("[app] demo torn down");
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("pulsegrid-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;

    let visualizer_canvas = dom::canvas_by_id(&document, VISUALIZER_CANVAS_ID).ok();
    let grid_canvas = dom::canvas_by_id(&document, GRID_CANVAS_ID).ok();
    if visualizer_canvas.is_none() && grid_canvas.is_none() {
        anyhow::bail!("page has neither #{} nor #{}", VISUALIZER_CANVAS_ID, GRID_CANVAS_ID);
    }

    // A failed demo stays blank; the other one still runs
    let mut demos = Vec::new();
    if let Some(canvas) = visualizer_canvas {
        match start_visualizer(&document, canvas).await {
            Ok(demo) => demos.push(demo),
            Err(e) => log::error!("[visualizer] setup failed: {:?}", e),
        }
    }
    if let Some(canvas) = grid_canvas {
        match start_grid(&document, canvas).await {
            Ok(demo) => demos.push(demo),
            Err(e) => log::error!("[grid] setup failed: {:?}", e),
        }
    }

    dom::on_page_hide(move || {
        for demo in demos {
            demo.teardown();
        }
    });
    Ok(())
}

async fn start_visualizer(
    document: &web::Document,
    canvas: web::HtmlCanvasElement,
) -> anyhow::Result<Demo> {
    // the frame reads the canvas size directly; only the backing store needs syncing
    dom::wire_canvas_resize(&canvas, |_, _| {});
    let renderer = VisualizerRenderer::new(&canvas).await?;

    let state: SharedVisualizer = Rc::new(RefCell::new(VisualizerState::new(Clock::new())));
    let playback: SharedPlayback = Rc::new(RefCell::new(PlaybackInputs::default()));
    events::wire_visualizer_controls(document, &state, &playback);

    let frame_loop = frame::start_loop(VisualizerFrame {
        state: state.clone(),
        renderer,
        canvas,
    })?;
    log::info!("[visualizer] running");
    Ok(Demo::Visualizer {
        frame_loop,
        state,
        playback,
    })
}

async fn start_grid(
    document: &web::Document,
    canvas: web::HtmlCanvasElement,
) -> anyhow::Result<Demo> {
    dom::sync_canvas_backing_size(&canvas);
    let renderer = GridRenderer::new(&canvas).await?;

    let aspect = canvas.width() as f32 / canvas.height().max(1) as f32;
    let grid: SharedGrid = Rc::new(RefCell::new(GridController::new(Clock::new(), aspect)));
    let grid_resize = grid.clone();
    dom::wire_canvas_resize(&canvas, move |w, h| grid_resize.borrow_mut().resize(w, h));

    // Browsers keep the context suspended until the first press
    let synth = web::AudioContext::new()
        .map_err(|e| pulsegrid_core::SetupError::Audio(format!("{:?}", e)))
        .and_then(|ctx| SynthChain::new(&ctx));
    let synth: SharedSynth = Rc::new(RefCell::new(match synth {
        Ok(s) => Some(s),
        Err(e) => {
            log::warn!("[grid] synth unavailable, grid stays silent: {}", e);
            None
        }
    }));
    events::wire_grid_pointer(&grid, &synth);
    events::wire_synth_controls(document, &synth);

    let frame_loop = frame::start_loop(GridSceneFrame {
        grid: grid.clone(),
        synth: synth.clone(),
        renderer,
        canvas,
        instances: Vec::with_capacity(constants::MAX_TILE_INSTANCES),
    })?;
    log::info!("[grid] running");
    Ok(Demo::Grid {
        frame_loop,
        grid,
        synth,
    })
}
