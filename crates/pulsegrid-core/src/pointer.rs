//! Pointer interaction modes.
//!
//! One input stream drives two behaviours: hovering highlights tiles, while a
//! held button tilts the scene. Modelling them as a single mode enum keeps
//! the two from ever being active together.

use glam::Vec2;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PointerMode {
    #[default]
    Hovering,
    Dragging {
        anchor: Vec2,
    },
}

/// What a pointer move means in the current mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerAction {
    Hover(Vec2),
    Drag { delta_x: f32 },
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PointerInteraction {
    mode: PointerMode,
    last_ndc: Option<Vec2>,
}

impl PointerInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> PointerMode {
        self.mode
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.mode, PointerMode::Dragging { .. })
    }

    pub fn last_ndc(&self) -> Option<Vec2> {
        self.last_ndc
    }

    /// Button pressed. Returns true when this starts a new interaction.
    pub fn down(&mut self, ndc: Vec2) -> bool {
        self.last_ndc = Some(ndc);
        if self.is_dragging() {
            return false;
        }
        self.mode = PointerMode::Dragging { anchor: ndc };
        true
    }

    pub fn move_to(&mut self, ndc: Vec2) -> PointerAction {
        self.last_ndc = Some(ndc);
        match self.mode {
            PointerMode::Hovering => PointerAction::Hover(ndc),
            PointerMode::Dragging { anchor } => PointerAction::Drag {
                delta_x: ndc.x - anchor.x,
            },
        }
    }

    /// Button released. Returns true if a drag ended.
    pub fn up(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.mode = PointerMode::Hovering;
        was_dragging
    }
}

/// Client pixel position within a `width`×`height` viewport to NDC
/// (x right, y up, both in [-1,1]).
#[inline]
pub fn client_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Option<Vec2> {
    if !(width > 0.0 && height > 0.0) {
        return None;
    }
    Some(Vec2::new((x / width) * 2.0 - 1.0, -(y / height) * 2.0 + 1.0))
}

/// Presses that land on page controls (sliders, buttons) belong to those
/// controls and must not start a scene interaction. `tag_name` is the DOM
/// element's tag, in any case.
pub fn press_targets_scene(tag_name: &str) -> bool {
    const CONTROLS: [&str; 6] = ["INPUT", "BUTTON", "SELECT", "TEXTAREA", "LABEL", "OPTION"];
    !CONTROLS.iter().any(|c| c.eq_ignore_ascii_case(tag_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_delta_is_measured_from_press_point() {
        let mut p = PointerInteraction::new();
        assert!(p.down(Vec2::new(0.25, 0.0)));
        assert_eq!(
            p.move_to(Vec2::new(0.75, 0.5)),
            PointerAction::Drag { delta_x: 0.5 }
        );
        assert!(p.up());
        assert_eq!(
            p.move_to(Vec2::new(0.1, 0.1)),
            PointerAction::Hover(Vec2::new(0.1, 0.1))
        );
        assert!(!p.up());
    }

    #[test]
    fn repeated_down_keeps_first_anchor() {
        let mut p = PointerInteraction::new();
        p.down(Vec2::ZERO);
        assert!(!p.down(Vec2::ONE));
        assert_eq!(p.mode(), PointerMode::Dragging { anchor: Vec2::ZERO });
    }

    #[test]
    fn presses_on_controls_stay_out_of_the_scene() {
        assert!(!press_targets_scene("INPUT"));
        assert!(!press_targets_scene("button"));
        assert!(press_targets_scene("CANVAS"));
        assert!(press_targets_scene("DIV"));
    }

    #[test]
    fn ndc_corners() {
        assert_eq!(client_to_ndc(0.0, 0.0, 800.0, 600.0), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(client_to_ndc(800.0, 600.0, 800.0, 600.0), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(client_to_ndc(10.0, 10.0, 0.0, 600.0), None);
    }
}
