use crate::audio::{SynthChain, WebAudioSession};
use crate::render::{GridRenderer, VisualizerRenderer};
use pulsegrid_core::{
    Clock, FrameRequest, FrameScheduler, GridController, GridUniforms, LoopError, RenderLoop,
    TileInstance, VisualizerState,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub type SharedVisualizer = Rc<RefCell<VisualizerState<WebAudioSession, Clock>>>;
pub type SharedGrid = Rc<RefCell<GridController<Clock>>>;
pub type SharedSynth = Rc<RefCell<Option<SynthChain>>>;

type TickSlot = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// requestAnimationFrame behind the core loop's scheduler seam.
pub struct RafScheduler {
    tick: TickSlot,
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> Option<FrameRequest> {
        let window = web::window()?;
        let tick = self.tick.borrow();
        let cb = tick.as_ref()?;
        window
            .request_animation_frame(cb.as_ref().unchecked_ref())
            .ok()
    }

    fn cancel_frame(&mut self, id: FrameRequest) {
        if let Some(w) = web::window() {
            _ = w.cancel_animation_frame(id);
        }
    }
}

/// One demo's per-frame work. Returning `false` stops its loop.
pub trait FrameBody {
    fn frame(&mut self) -> bool;
}

/// A running loop. `stop` cancels the pending frame; dropping the handle
/// also drops the frame body and the GPU state it owns.
pub struct LoopHandle {
    render_loop: Rc<RefCell<RenderLoop<RafScheduler>>>,
    tick: TickSlot,
}

impl LoopHandle {
    pub fn stop(&self) {
        if let Ok(mut rl) = self.render_loop.try_borrow_mut() {
            rl.stop();
        }
    }
}

impl Drop for LoopHandle {
    fn drop(&mut self) {
        self.stop();
        self.tick.borrow_mut().take();
    }
}

pub fn start_loop<B: FrameBody + 'static>(body: B) -> Result<LoopHandle, LoopError> {
    let tick: TickSlot = Rc::new(RefCell::new(None));
    let render_loop = Rc::new(RefCell::new(RenderLoop::new(RafScheduler {
        tick: tick.clone(),
    })));
    let generation = Rc::new(Cell::new(0_u64));

    let loop_weak = Rc::downgrade(&render_loop);
    let generation_tick = generation.clone();
    let mut body = body;
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let Some(rl) = loop_weak.upgrade() else {
            return;
        };
        // re-arms before the body so a slow frame never drops the loop
        if !rl.borrow_mut().on_frame(generation_tick.get()) {
            return;
        }
        if !body.frame() {
            log::warn!("[frame] stopping render loop");
            rl.borrow_mut().stop();
        }
    }) as Box<dyn FnMut()>));

    let started = render_loop.borrow_mut().start()?;
    generation.set(started);
    Ok(LoopHandle { render_loop, tick })
}

/// Out-of-memory is fatal to the loop; everything else skips one frame.
fn keep_running(result: Result<(), wgpu::SurfaceError>, label: &str) -> bool {
    match result {
        Ok(()) => true,
        Err(wgpu::SurfaceError::OutOfMemory) => {
            log::error!("[{}] surface out of memory", label);
            false
        }
        Err(e) => {
            log::warn!("[{}] frame skipped: {:?}", label, e);
            true
        }
    }
}

// ===================== Visualizer =====================

pub struct VisualizerFrame {
    pub state: SharedVisualizer,
    pub renderer: VisualizerRenderer,
    pub canvas: web::HtmlCanvasElement,
}

impl FrameBody for VisualizerFrame {
    fn frame(&mut self) -> bool {
        let (w, h) = (self.canvas.width(), self.canvas.height());
        self.renderer.resize_if_needed(w, h);
        let uniforms = *self.state.borrow_mut().frame([w, h]);
        keep_running(self.renderer.render(&uniforms), "visualizer")
    }
}

// ===================== Grid =====================

pub struct GridSceneFrame {
    pub grid: SharedGrid,
    pub synth: SharedSynth,
    pub renderer: GridRenderer,
    pub canvas: web::HtmlCanvasElement,
    pub instances: Vec<TileInstance>,
}

impl FrameBody for GridSceneFrame {
    fn frame(&mut self) -> bool {
        let (w, h) = (self.canvas.width(), self.canvas.height());
        self.renderer.resize_if_needed(w, h);
        if let Some(synth) = self.synth.borrow_mut().as_mut() {
            synth.poll_rebuild();
        }
        let uniforms = {
            let mut grid = self.grid.borrow_mut();
            let frame = grid.frame();
            grid.tile_instances(&mut self.instances);
            GridUniforms::new(&frame, grid.tiles().layout())
        };
        keep_running(self.renderer.render(&uniforms, &self.instances), "grid")
    }
}
