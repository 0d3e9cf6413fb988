//! Grid tiles and their hover highlight / fade state machine.
//!
//! A tile is `Idle`, `Highlighted` (the single hovered tile) or `Fading`
//! after the pointer left it. Only fading tiles are tracked in the timer set,
//! so per-frame work scales with the number of active fades, not the grid.

use fnv::FnvHashSet;
use glam::Vec3;
use rand::Rng;

use crate::constants::{
    hex_to_rgb, FADE_DURATION_SEC, GRID_DIVISIONS, GRID_SIZE, TILE_ELEVATION,
    TILE_NEUTRAL_COLOR, TILE_PALETTE,
};

/// Index into the grid, `i * divisions + j`.
pub type TileId = usize;

/// Square grid centred on the origin in the XZ plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    pub size: f32,
    pub divisions: u32,
    pub elevation: f32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            size: GRID_SIZE,
            divisions: GRID_DIVISIONS,
            elevation: TILE_ELEVATION,
        }
    }
}

impl GridLayout {
    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.size / self.divisions.max(1) as f32
    }

    #[inline]
    pub fn tile_count(&self) -> usize {
        (self.divisions * self.divisions) as usize
    }

    #[inline]
    pub fn id(&self, i: u32, j: u32) -> Option<TileId> {
        (i < self.divisions && j < self.divisions)
            .then(|| (i * self.divisions + j) as TileId)
    }

    #[inline]
    pub fn coord(&self, id: TileId) -> (u32, u32) {
        let d = self.divisions.max(1) as usize;
        ((id / d) as u32, (id % d) as u32)
    }

    pub fn tile_center(&self, i: u32, j: u32) -> Vec3 {
        let half = self.divisions as f32 / 2.0;
        let cell = self.cell_size();
        Vec3::new(
            (i as f32 - half + 0.5) * cell,
            self.elevation,
            (j as f32 - half + 0.5) * cell,
        )
    }

    /// Cell containing a scene-local point on the tile plane.
    pub fn cell_at(&self, x: f32, z: f32) -> Option<TileId> {
        let cell = self.cell_size();
        let half = self.divisions as f32 / 2.0;
        let fi = (x / cell + half).floor();
        let fj = (z / cell + half).floor();
        if !(fi.is_finite() && fj.is_finite()) || fi < 0.0 || fj < 0.0 {
            return None;
        }
        self.id(fi as u32, fj as u32)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TileState {
    Idle,
    Highlighted,
    Fading { since: f32 },
}

#[derive(Clone, Debug)]
pub struct Tile {
    pub coord: (u32, u32),
    pub position: Vec3,
    pub color: [f32; 3],
    pub opacity: f32,
    pub fade_start: Option<f32>,
}

impl Tile {
    fn clear(&mut self) {
        self.opacity = 0.0;
        self.color = hex_to_rgb(TILE_NEUTRAL_COLOR);
        self.fade_start = None;
    }
}

pub struct TileGrid {
    layout: GridLayout,
    tiles: Vec<Tile>,
    hovered: Option<TileId>,
    fading: FnvHashSet<TileId>,
    fade_duration: f32,
}

impl TileGrid {
    pub fn new(layout: GridLayout) -> Self {
        let tiles = (0..layout.divisions)
            .flat_map(|i| (0..layout.divisions).map(move |j| (i, j)))
            .map(|(i, j)| Tile {
                coord: (i, j),
                position: layout.tile_center(i, j),
                color: hex_to_rgb(TILE_NEUTRAL_COLOR),
                opacity: 0.0,
                fade_start: None,
            })
            .collect();
        Self {
            layout,
            tiles,
            hovered: None,
            fading: FnvHashSet::default(),
            fade_duration: FADE_DURATION_SEC,
        }
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id)
    }

    pub fn hovered(&self) -> Option<TileId> {
        self.hovered
    }

    pub fn fading_count(&self) -> usize {
        self.fading.len()
    }

    pub fn state(&self, id: TileId) -> TileState {
        if self.hovered == Some(id) {
            return TileState::Highlighted;
        }
        match self.tiles.get(id).and_then(|t| t.fade_start) {
            Some(since) => TileState::Fading { since },
            None => TileState::Idle,
        }
    }

    pub fn highlighted_count(&self) -> usize {
        (0..self.tiles.len())
            .filter(|id| self.state(*id) == TileState::Highlighted)
            .count()
    }

    /// Apply a hit-test result. The previously hovered tile starts fading
    /// before the new one lights up; re-hovering a fading tile cancels its
    /// fade.
    pub fn hover<R: Rng + ?Sized>(&mut self, hit: Option<TileId>, now: f32, rng: &mut R) {
        let hit = hit.filter(|id| *id < self.tiles.len());
        if hit == self.hovered {
            return;
        }
        if let Some(prev) = self.hovered.take() {
            self.tiles[prev].fade_start = Some(now);
            self.fading.insert(prev);
        }
        if let Some(id) = hit {
            let color = TILE_PALETTE[rng.gen_range(0..TILE_PALETTE.len())];
            let tile = &mut self.tiles[id];
            tile.color = hex_to_rgb(color);
            tile.opacity = 1.0;
            tile.fade_start = None;
            self.fading.remove(&id);
            self.hovered = Some(id);
        }
    }

    /// Pointer left the grid entirely.
    pub fn clear_hover(&mut self, now: f32) {
        if let Some(prev) = self.hovered.take() {
            self.tiles[prev].fade_start = Some(now);
            self.fading.insert(prev);
        }
    }

    /// Integrate fades up to `now`. Returns how many tiles finished.
    pub fn advance(&mut self, now: f32) -> usize {
        let duration = self.fade_duration;
        let mut done = smallvec::SmallVec::<[TileId; 8]>::new();
        for id in self.fading.iter().copied() {
            let tile = &mut self.tiles[id];
            let Some(start) = tile.fade_start else {
                done.push(id);
                continue;
            };
            let elapsed = (now - start).max(0.0);
            if elapsed >= duration {
                tile.clear();
                done.push(id);
            } else {
                tile.opacity = (1.0 - elapsed / duration).clamp(0.0, 1.0);
            }
        }
        for id in &done {
            self.fading.remove(id);
        }
        done.len()
    }

    /// Tiles with anything to draw (highlighted or mid-fade).
    pub fn visible(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.hovered
            .into_iter()
            .chain(self.fading.iter().copied())
            .filter_map(|id| self.tiles.get(id))
            .filter(|t| t.opacity > 0.0)
    }
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::new(GridLayout::default())
    }
}

#[inline]
pub fn neutral_color() -> [f32; 3] {
    hex_to_rgb(TILE_NEUTRAL_COLOR)
}

/// Palette colours as RGB, for membership checks.
pub fn palette_rgb() -> [[f32; 3]; 4] {
    TILE_PALETTE.map(hex_to_rgb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn layout_ids_round_trip_through_coords() {
        let layout = GridLayout::default();
        assert_eq!(layout.tile_count(), 1600);
        let id = layout.id(3, 17).unwrap();
        assert_eq!(layout.coord(id), (3, 17));
        assert_eq!(layout.id(40, 0), None);
    }

    #[test]
    fn cell_at_matches_tile_centres() {
        let layout = GridLayout::default();
        for (i, j) in [(0, 0), (39, 39), (20, 5), (7, 33)] {
            let c = layout.tile_center(i, j);
            assert_eq!(layout.cell_at(c.x, c.z), layout.id(i, j));
        }
        assert_eq!(layout.cell_at(151.0, 0.0), None);
        assert_eq!(layout.cell_at(0.0, -150.5), None);
    }

    #[test]
    fn moving_hover_fades_previous_tile_in_same_event() {
        let mut grid = TileGrid::default();
        let mut rng = StdRng::seed_from_u64(1);
        grid.hover(Some(10), 0.0, &mut rng);
        grid.hover(Some(11), 0.25, &mut rng);
        assert_eq!(grid.state(10), TileState::Fading { since: 0.25 });
        assert_eq!(grid.state(11), TileState::Highlighted);
        assert_eq!(grid.highlighted_count(), 1);
    }

    #[test]
    fn rehover_during_fade_restores_highlight() {
        let mut grid = TileGrid::default();
        let mut rng = StdRng::seed_from_u64(2);
        grid.hover(Some(5), 0.0, &mut rng);
        grid.clear_hover(0.1);
        grid.advance(0.5);
        assert!(grid.tile(5).unwrap().opacity < 1.0);
        grid.hover(Some(5), 0.5, &mut rng);
        assert_eq!(grid.state(5), TileState::Highlighted);
        assert_eq!(grid.tile(5).unwrap().opacity, 1.0);
        assert_eq!(grid.fading_count(), 0);
        grid.advance(5.0);
        assert_eq!(grid.tile(5).unwrap().opacity, 1.0);
    }

    #[test]
    fn out_of_range_hit_counts_as_no_hit() {
        let mut grid = TileGrid::default();
        let mut rng = StdRng::seed_from_u64(3);
        grid.hover(Some(2), 0.0, &mut rng);
        grid.hover(Some(999_999), 0.1, &mut rng);
        assert_eq!(grid.hovered(), None);
        assert_eq!(grid.state(2), TileState::Fading { since: 0.1 });
    }
}
