//! The interactive grid scene: hover highlights, drag-to-tilt and the note
//! cluster fired on press.

use glam::{Mat4, Vec2};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::camera::OrthoCamera;
use crate::constants::{hex_to_rgb, GRID_LINE_COLOR, GRID_LINE_OPACITY};
use crate::picking::PointerHitTester;
use crate::pointer::{PointerAction, PointerInteraction};
use crate::rotation::RotationDamper;
use crate::tiles::{GridLayout, TileGrid, TileId};
use crate::time::TimeSource;
use crate::trigger::{AudioTrigger, NoteCluster, NoteSink};

/// Per-frame output consumed by the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridFrame {
    pub now: f32,
    pub yaw: f32,
    pub view_proj: Mat4,
    pub finished_fades: usize,
}

/// Per-instance data for one lit tile in `grid.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TileInstance {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// CPU mirror of the `Scene` uniform block in `grid.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GridUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub line_color: [f32; 4],
    pub size: f32,
    pub divisions: f32,
    pub elevation: f32,
    pub _pad: f32,
}

impl GridUniforms {
    pub fn new(frame: &GridFrame, layout: &GridLayout) -> Self {
        let [r, g, b] = hex_to_rgb(GRID_LINE_COLOR);
        Self {
            view_proj: frame.view_proj.to_cols_array_2d(),
            model: Mat4::from_rotation_y(frame.yaw).to_cols_array_2d(),
            line_color: [r, g, b, GRID_LINE_OPACITY],
            size: layout.size,
            divisions: layout.divisions as f32,
            elevation: layout.elevation,
            _pad: 0.0,
        }
    }
}

pub struct GridController<T: TimeSource> {
    tiles: TileGrid,
    camera: OrthoCamera,
    hit_tester: PointerHitTester,
    pointer: PointerInteraction,
    rotation: RotationDamper,
    rng: StdRng,
    trigger: AudioTrigger<StdRng>,
    clock: T,
    // yaw of the last drawn frame; picking must match the screen
    drawn_yaw: f32,
    alive: bool,
}

impl<T: TimeSource> GridController<T> {
    /// Deterministic construction; tests pass a fixed seed.
    pub fn with_seed(clock: T, aspect: f32, seed: u64) -> Self {
        Self::build(
            clock,
            aspect,
            StdRng::seed_from_u64(seed),
            StdRng::seed_from_u64(seed.wrapping_add(1)),
        )
    }

    pub fn new(clock: T, aspect: f32) -> Self {
        Self::build(clock, aspect, StdRng::from_entropy(), StdRng::from_entropy())
    }

    fn build(clock: T, aspect: f32, rng: StdRng, note_rng: StdRng) -> Self {
        let layout = GridLayout::default();
        Self {
            tiles: TileGrid::new(layout),
            camera: OrthoCamera::grid_view(aspect),
            hit_tester: PointerHitTester::new(layout),
            pointer: PointerInteraction::new(),
            rotation: RotationDamper::new(),
            rng,
            trigger: AudioTrigger::new(note_rng),
            clock,
            drawn_yaw: 0.0,
            alive: true,
        }
    }

    pub fn tiles(&self) -> &TileGrid {
        &self.tiles
    }

    pub fn camera(&self) -> &OrthoCamera {
        &self.camera
    }

    pub fn yaw(&self) -> f32 {
        self.rotation.yaw()
    }

    pub fn drawn_yaw(&self) -> f32 {
        self.drawn_yaw
    }

    pub fn is_dragging(&self) -> bool {
        self.pointer.is_dragging()
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
    }

    /// Hover picks a tile; a held button tilts the scene instead.
    pub fn pointer_move(&mut self, ndc: Vec2) -> Option<TileId> {
        if !self.alive {
            return None;
        }
        match self.pointer.move_to(ndc) {
            PointerAction::Hover(ndc) => {
                let hit = self
                    .hit_tester
                    .hit_test(&self.camera, self.drawn_yaw, ndc);
                let now = self.clock.elapsed_sec();
                self.tiles.hover(hit, now, &mut self.rng);
                self.tiles.hovered()
            }
            PointerAction::Drag { delta_x } => {
                self.rotation.on_drag_move(delta_x);
                self.tiles.hovered()
            }
        }
    }

    /// Press starts a drag and plays a cluster through `sink` if one exists.
    pub fn pointer_down(&mut self, ndc: Vec2, sink: Option<&mut dyn NoteSink>) -> Option<NoteCluster> {
        if !self.alive || !self.pointer.down(ndc) {
            return None;
        }
        self.trigger.on_interaction_start(sink)
    }

    pub fn pointer_up(&mut self) {
        if self.pointer.up() {
            self.rotation.on_drag_end();
        }
    }

    /// Pointer left the window.
    pub fn pointer_leave(&mut self) {
        if self.alive {
            let now = self.clock.elapsed_sec();
            self.tiles.clear_hover(now);
        }
    }

    /// Advance fades, report the yaw to draw with, then decay it.
    pub fn frame(&mut self) -> GridFrame {
        let now = self.clock.elapsed_sec();
        let finished_fades = self.tiles.advance(now);
        let yaw = self.rotation.yaw();
        self.drawn_yaw = yaw;
        self.rotation.tick();
        GridFrame {
            now,
            yaw,
            view_proj: self.camera.view_proj(),
            finished_fades,
        }
    }

    /// Refill `out` with the tiles that currently have anything to draw.
    pub fn tile_instances(&self, out: &mut Vec<TileInstance>) {
        out.clear();
        out.extend(self.tiles.visible().map(|t| {
            let [r, g, b] = t.color;
            TileInstance {
                position: t.position.to_array(),
                color: [r, g, b, t.opacity],
            }
        }));
    }

    /// Later pointer events become no-ops.
    pub fn teardown(&mut self) {
        self.alive = false;
        self.pointer.up();
        self.rotation.on_drag_end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;

    #[test]
    fn events_after_teardown_are_ignored() {
        let clock = ManualClock::new(0.0);
        let mut g = GridController::with_seed(&clock, 1.0, 3);
        g.teardown();
        assert_eq!(g.pointer_move(Vec2::ZERO), None);
        assert!(g.pointer_down(Vec2::ZERO, None).is_none());
        assert!(!g.is_dragging());
    }

    #[test]
    fn frame_reports_yaw_before_decay() {
        let clock = ManualClock::new(0.0);
        let mut g = GridController::with_seed(&clock, 1.0, 3);
        g.pointer_down(Vec2::ZERO, None);
        g.pointer_move(Vec2::new(0.4, 0.0));
        g.pointer_up();
        let f = g.frame();
        assert!((f.yaw - 0.2).abs() < 1e-6);
        assert!((g.yaw() - 0.18).abs() < 1e-6);
    }

    #[test]
    fn only_lit_tiles_become_instances() {
        let clock = ManualClock::new(0.0);
        let mut g = GridController::with_seed(&clock, 1.0, 3);
        let mut out = Vec::new();
        g.tile_instances(&mut out);
        assert!(out.is_empty());
        g.pointer_move(Vec2::ZERO);
        g.tile_instances(&mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].color[3], 1.0);
        assert_eq!(std::mem::size_of::<GridUniforms>(), 160);
    }
}
