// Host-side tests for grid picking, highlight fades and scene rotation.

use glam::{Quat, Vec2};
use pulsegrid_core::constants::*;
use pulsegrid_core::*;

/// NDC at which tile `id` appears when the scene is rotated by `yaw`.
fn ndc_of(camera: &OrthoCamera, layout: &GridLayout, id: TileId, yaw: f32) -> Vec2 {
    let (i, j) = layout.coord(id);
    let world = Quat::from_rotation_y(yaw) * layout.tile_center(i, j);
    let p = camera.view_proj().project_point3(world);
    Vec2::new(p.x, p.y)
}

#[test]
fn screen_centre_hits_centre_tile() {
    let tester = PointerHitTester::default();
    let cam = OrthoCamera::grid_view(1.0);
    let layout = GridLayout::default();
    assert_eq!(tester.hit_test(&cam, 0.0, Vec2::ZERO), layout.id(20, 20));
}

#[test]
fn pointer_far_outside_grid_hits_nothing() {
    let tester = PointerHitTester::default();
    let cam = OrthoCamera::grid_view(1.0);
    assert_eq!(tester.hit_test(&cam, 0.0, Vec2::new(10.0, 10.0)), None);
    assert_eq!(tester.hit_test(&cam, 0.0, Vec2::new(f32::NAN, 0.0)), None);
}

#[test]
fn picking_matches_what_is_drawn_under_rotation() {
    let tester = PointerHitTester::default();
    let cam = OrthoCamera::grid_view(4.0 / 3.0);
    let layout = GridLayout::default();
    for &(i, j) in &[(20, 20), (25, 12), (14, 27), (18, 22)] {
        let id = layout.id(i, j).unwrap();
        for &yaw in &[0.0, 0.2, -ROTATION_LIMIT_RAD] {
            let ndc = ndc_of(&cam, &layout, id, yaw);
            assert_eq!(tester.hit_test(&cam, yaw, ndc), Some(id), "tile ({i},{j}) yaw {yaw}");
        }
    }
}

#[test]
fn resize_updates_picking_on_next_event() {
    let clock = ManualClock::new(0.0);
    let mut g = GridController::with_seed(&clock, 800.0 / 600.0, 9);
    let layout = *g.tiles().layout();
    let target = layout.id(26, 15).unwrap();

    g.resize(1600, 900);
    assert!((g.camera().aspect - 16.0 / 9.0).abs() < 1e-6);
    let ndc = ndc_of(g.camera(), &layout, target, 0.0);
    assert_eq!(g.pointer_move(ndc), Some(target));
    assert_eq!(g.pointer_move(Vec2::ZERO), layout.id(20, 20));
}

#[test]
fn only_one_tile_is_ever_highlighted() {
    let clock = ManualClock::new(0.0);
    let mut g = GridController::with_seed(&clock, 1.0, 4);
    let layout = *g.tiles().layout();
    let path = [(20, 20), (21, 20), (21, 21), (22, 21), (22, 22)];
    for &(i, j) in &path {
        clock.advance(0.05);
        let id = layout.id(i, j).unwrap();
        g.pointer_move(ndc_of(g.camera(), &layout, id, 0.0));
        g.frame();
        assert_eq!(g.tiles().highlighted_count(), 1);
        assert_eq!(g.tiles().state(id), TileState::Highlighted);
    }
    assert_eq!(g.tiles().fading_count(), path.len() - 1);
}

#[test]
fn highlighted_tile_uses_palette_and_fades_linearly() {
    let clock = ManualClock::new(0.0);
    let mut g = GridController::with_seed(&clock, 1.0, 5);
    let layout = *g.tiles().layout();
    let a = layout.id(20, 20).unwrap();
    let b = layout.id(23, 20).unwrap();

    g.pointer_move(ndc_of(g.camera(), &layout, a, 0.0));
    let lit = g.tiles().tile(a).unwrap().clone();
    assert_eq!(lit.opacity, 1.0);
    assert!(palette_rgb().contains(&lit.color));

    clock.set(1.0);
    g.pointer_move(ndc_of(g.camera(), &layout, b, 0.0));
    assert_eq!(g.tiles().state(a), TileState::Fading { since: 1.0 });

    clock.set(1.5);
    g.frame();
    assert!((g.tiles().tile(a).unwrap().opacity - 0.5).abs() < 1e-6);

    clock.set(2.0);
    let f = g.frame();
    assert_eq!(f.finished_fades, 1);
    let done = g.tiles().tile(a).unwrap();
    assert_eq!(done.opacity, 0.0);
    assert_eq!(done.color, neutral_color());
    assert_eq!(done.fade_start, None);
    assert_eq!(g.tiles().state(a), TileState::Idle);
}

#[test]
fn leaving_the_grid_fades_the_hovered_tile() {
    let clock = ManualClock::new(0.0);
    let mut g = GridController::with_seed(&clock, 1.0, 6);
    g.pointer_move(Vec2::ZERO);
    assert!(g.tiles().hovered().is_some());
    clock.set(0.3);
    assert_eq!(g.pointer_move(Vec2::new(10.0, 10.0)), None);
    assert_eq!(g.tiles().fading_count(), 1);
    assert_eq!(g.tiles().visible().count(), 1);
}

#[test]
fn released_rotation_decays_geometrically() {
    let clock = ManualClock::new(0.0);
    let mut g = GridController::with_seed(&clock, 1.0, 7);
    g.pointer_down(Vec2::ZERO, None);
    g.pointer_move(Vec2::new(2.0, 0.0));
    assert_eq!(g.yaw(), ROTATION_LIMIT_RAD);

    // held: no decay
    g.frame();
    g.frame();
    assert_eq!(g.yaw(), ROTATION_LIMIT_RAD);

    g.pointer_up();
    for _ in 0..10 {
        g.frame();
    }
    let expected = ROTATION_LIMIT_RAD * ROTATION_DECAY_PER_FRAME.powi(10);
    assert!((g.yaw() - expected).abs() < 1e-6);
    assert!(g.yaw() > 0.0);
}

#[test]
fn dragging_does_not_change_hover() {
    let clock = ManualClock::new(0.0);
    let mut g = GridController::with_seed(&clock, 1.0, 8);
    let hovered = g.pointer_move(Vec2::ZERO);
    g.pointer_down(Vec2::ZERO, None);
    assert_eq!(g.pointer_move(Vec2::new(0.3, 0.3)), hovered);
    assert!((g.yaw() - 0.15).abs() < 1e-6);
}
