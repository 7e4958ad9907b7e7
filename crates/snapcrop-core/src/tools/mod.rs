//! Annotation tools: activation mask, key bindings and the per-tick state machine.

use crate::input::{InputState, MouseButton};
use crate::shapes::AnnotationKind;
use crate::store::AnnotationStore;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    Crosshair,
    Line,
    Rectangle,
    Arrow,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [
        ToolKind::Crosshair,
        ToolKind::Line,
        ToolKind::Rectangle,
        ToolKind::Arrow,
    ];

    /// Momentary tools stay active exactly while their key is held and place
    /// points by clicking. The others draw by dragging.
    pub fn is_momentary(self) -> bool {
        matches!(self, ToolKind::Crosshair)
    }

    /// The annotation kind this tool produces.
    pub fn annotation_kind(self) -> AnnotationKind {
        match self {
            ToolKind::Crosshair => AnnotationKind::Marker,
            ToolKind::Line => AnnotationKind::Line,
            ToolKind::Rectangle => AnnotationKind::Rectangle,
            ToolKind::Arrow => AnnotationKind::Arrow,
        }
    }

    pub fn from_annotation_kind(kind: AnnotationKind) -> Self {
        match kind {
            AnnotationKind::Marker => ToolKind::Crosshair,
            AnnotationKind::Line => ToolKind::Line,
            AnnotationKind::Rectangle => ToolKind::Rectangle,
            AnnotationKind::Arrow => ToolKind::Arrow,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Crosshair => "Crosshair",
            ToolKind::Line => "Line",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Arrow => "Arrow",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of active tools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolSet(u8);

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&mut self, tool: ToolKind) {
        self.0 |= tool.bit();
    }

    pub fn deactivate(&mut self, tool: ToolKind) {
        self.0 &= !tool.bit();
    }

    pub fn is_active(&self, tool: ToolKind) -> bool {
        self.0 & tool.bit() != 0
    }

    /// Whether the tool producing `kind` is active.
    pub fn is_kind_active(&self, kind: AnnotationKind) -> bool {
        self.is_active(ToolKind::from_annotation_kind(kind))
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = ToolKind> + '_ {
        ToolKind::ALL.into_iter().filter(|t| self.is_active(*t))
    }
}

/// Key names that drive the tools and the session.
///
/// Character keys are lower-case; named keys use their winit names
/// (`Escape`, `Enter`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolBindings {
    pub crosshair: String,
    pub line: String,
    pub rectangle: String,
    pub arrow: String,
    pub cancel: Vec<String>,
    pub export: Vec<String>,
    pub quit: Vec<String>,
}

impl Default for ToolBindings {
    fn default() -> Self {
        Self {
            crosshair: "f".to_string(),
            line: "l".to_string(),
            rectangle: "r".to_string(),
            arrow: "a".to_string(),
            cancel: vec!["Escape".to_string()],
            export: vec!["Enter".to_string(), "c".to_string()],
            quit: vec!["q".to_string()],
        }
    }
}

impl ToolBindings {
    /// Trigger key for a tool.
    pub fn key_for(&self, tool: ToolKind) -> &str {
        match tool {
            ToolKind::Crosshair => &self.crosshair,
            ToolKind::Line => &self.line,
            ToolKind::Rectangle => &self.rectangle,
            ToolKind::Arrow => &self.arrow,
        }
    }
}

/// Drives the annotation store from per-frame input.
#[derive(Debug, Clone, Default)]
pub struct ToolStateMachine {
    tools: ToolSet,
    bindings: ToolBindings,
    /// A marker was pinned by click during the current crosshair hold.
    pinned_this_hold: bool,
}

impl ToolStateMachine {
    pub fn new(bindings: ToolBindings) -> Self {
        Self {
            bindings,
            ..Self::default()
        }
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    pub fn bindings(&self) -> &ToolBindings {
        &self.bindings
    }

    /// Some tool's trigger key is held, so the pointer buttons belong to the tools.
    pub fn armed(&self, input: &InputState) -> bool {
        ToolKind::ALL
            .iter()
            .any(|t| input.is_key_pressed(self.bindings.key_for(*t)))
    }

    /// Run one tick. `pointer` is the pointer position in canvas space.
    pub fn tick(&mut self, input: &InputState, pointer: Point, store: &mut AnnotationStore) {
        let primary_click = input.is_button_just_pressed(MouseButton::Left);
        let secondary_click = input.is_button_just_pressed(MouseButton::Right);

        for tool in ToolKind::ALL {
            let kind = tool.annotation_kind();
            let key = self.bindings.key_for(tool);
            let held = input.is_key_pressed(key);

            if input.is_key_just_pressed(key) && !self.tools.is_active(tool) {
                self.tools.activate(tool);
                store.begin_draft(kind, pointer);
                if tool.is_momentary() {
                    self.pinned_this_hold = false;
                }
                log::debug!("{} tool activated at {:?}", tool.name(), pointer);
            }

            if held && secondary_click {
                if let Some(removed) = store.pop_committed(kind, self.tools.is_active(tool)) {
                    log::debug!("Removed {:?}", removed.kind());
                }
            }

            if !self.tools.is_active(tool) {
                continue;
            }

            if !held {
                // Focus loss reports the same edge through `release_all`.
                if input.is_key_just_released(key) {
                    self.release(tool, store);
                }
                continue;
            }

            store.update_draft(kind, pointer);

            if primary_click {
                if tool.is_momentary() {
                    // Pin the current marker and start a fresh one under the pointer.
                    store.begin_draft(kind, pointer);
                    self.pinned_this_hold = true;
                } else {
                    store.finalize_draft(kind);
                    self.tools.deactivate(tool);
                    log::debug!("{} committed by click", tool.name());
                }
            }
        }
    }

    /// Handle the trigger key going up for an active tool.
    fn release(&mut self, tool: ToolKind, store: &mut AnnotationStore) {
        let kind = tool.annotation_kind();
        if tool.is_momentary() && self.pinned_this_hold {
            // The trailing marker only followed the pointer after the last pin.
            store.discard_draft(kind);
        } else {
            store.finalize_draft(kind);
        }
        self.tools.deactivate(tool);
        log::debug!("{} tool released", tool.name());
    }

    /// Deactivate every tool, discarding live drafts. Committed annotations stay.
    pub fn cancel(&mut self, store: &mut AnnotationStore) {
        for tool in self.tools.iter().collect::<Vec<_>>() {
            store.discard_draft(tool.annotation_kind());
        }
        self.tools.clear();
        self.pinned_this_hold = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KeyEvent, PointerEvent};
    use crate::shapes::{Annotation, Line, Marker, Rectangle};

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    struct Harness {
        input: InputState,
        machine: ToolStateMachine,
        store: AnnotationStore,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                input: InputState::new(),
                machine: ToolStateMachine::new(ToolBindings::default()),
                store: AnnotationStore::new(),
            }
        }

        fn key(&mut self, key: &str, down: bool) {
            let event = if down {
                KeyEvent::Pressed(key.to_string())
            } else {
                KeyEvent::Released(key.to_string())
            };
            self.input.handle_key_event(event);
        }

        fn click(&mut self, button: MouseButton, at: Point) {
            self.input.handle_pointer_event(PointerEvent::Down { position: at, button });
            self.input.handle_pointer_event(PointerEvent::Up { position: at, button });
        }

        fn move_to(&mut self, at: Point) {
            self.input.handle_pointer_event(PointerEvent::Move { position: at });
        }

        /// Identity camera: screen and canvas coincide.
        fn tick(&mut self) {
            let pointer = self.input.pointer_position;
            self.machine.tick(&self.input, pointer, &mut self.store);
            self.input.begin_frame();
        }

        fn active(&self, tool: ToolKind) -> bool {
            self.machine.tools().is_active(tool)
        }
    }

    #[test]
    fn test_tool_set_bits() {
        let mut set = ToolSet::new();
        set.activate(ToolKind::Arrow);
        set.activate(ToolKind::Line);
        assert!(set.is_active(ToolKind::Arrow));
        assert!(!set.is_active(ToolKind::Rectangle));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![ToolKind::Line, ToolKind::Arrow]);

        set.deactivate(ToolKind::Arrow);
        assert!(!set.is_active(ToolKind::Arrow));
        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn test_rectangle_drag_commits_on_release() {
        let mut h = Harness::new();
        h.move_to(p(50.0, 50.0));
        h.key("r", true);
        h.tick();
        assert!(h.active(ToolKind::Rectangle));

        h.move_to(p(150.0, 90.0));
        h.tick();
        h.key("r", false);
        h.tick();

        assert!(!h.active(ToolKind::Rectangle));
        assert_eq!(
            h.store.committed(AnnotationKind::Rectangle, false),
            &[Annotation::Rectangle(Rectangle::new(p(50.0, 50.0), p(150.0, 90.0)))]
        );
    }

    #[test]
    fn test_secondary_click_with_key_held_removes_committed() {
        let mut h = Harness::new();
        h.move_to(p(50.0, 50.0));
        h.key("r", true);
        h.tick();
        h.move_to(p(150.0, 90.0));
        h.tick();
        h.key("r", false);
        h.tick();

        // Hold the trigger again and right-click to undo.
        h.key("r", true);
        h.click(MouseButton::Right, p(150.0, 90.0));
        assert!(h.machine.armed(&h.input));
        h.tick();
        h.key("r", false);
        h.tick();

        assert_eq!(h.store.len(AnnotationKind::Rectangle), 0);
    }

    #[test]
    fn test_primary_click_commits_drag_early() {
        let mut h = Harness::new();
        h.move_to(p(0.0, 0.0));
        h.key("l", true);
        h.tick();
        h.move_to(p(30.0, 40.0));
        h.click(MouseButton::Left, p(30.0, 40.0));
        h.tick();

        assert!(!h.active(ToolKind::Line));
        assert_eq!(
            h.store.committed(AnnotationKind::Line, false),
            &[Annotation::Line(Line::new(p(0.0, 0.0), p(30.0, 40.0)))]
        );

        // Releasing afterwards must not add or remove anything.
        h.key("l", false);
        h.tick();
        assert_eq!(h.store.len(AnnotationKind::Line), 1);
    }

    #[test]
    fn test_focus_loss_commits_held_drag() {
        let mut h = Harness::new();
        h.move_to(p(5.0, 5.0));
        h.key("r", true);
        h.tick();
        h.move_to(p(25.0, 45.0));
        h.tick();

        h.input.release_all();
        assert!(!h.machine.armed(&h.input));
        h.tick();

        assert!(!h.active(ToolKind::Rectangle));
        assert_eq!(
            h.store.committed(AnnotationKind::Rectangle, false),
            &[Annotation::Rectangle(Rectangle::new(p(5.0, 5.0), p(25.0, 45.0)))]
        );
    }

    #[test]
    fn test_drag_without_movement_is_discarded() {
        let mut h = Harness::new();
        h.move_to(p(10.0, 10.0));
        h.key("a", true);
        h.tick();
        h.key("a", false);
        h.tick();
        assert_eq!(h.store.len(AnnotationKind::Arrow), 0);
    }

    #[test]
    fn test_crosshair_two_clicks_then_release() {
        let mut h = Harness::new();
        h.move_to(p(10.0, 10.0));
        h.key("f", true);
        h.tick();
        h.click(MouseButton::Left, p(10.0, 10.0));
        h.tick();
        h.move_to(p(20.0, 20.0));
        h.click(MouseButton::Left, p(20.0, 20.0));
        h.tick();
        assert!(h.active(ToolKind::Crosshair));

        h.key("f", false);
        h.tick();

        assert_eq!(
            h.store.committed(AnnotationKind::Marker, false),
            &[
                Annotation::Marker(Marker::new(p(10.0, 10.0))),
                Annotation::Marker(Marker::new(p(20.0, 20.0))),
            ]
        );
    }

    #[test]
    fn test_crosshair_secondary_click_removes_last_pinned() {
        let mut h = Harness::new();
        h.move_to(p(10.0, 10.0));
        h.key("f", true);
        h.tick();
        h.click(MouseButton::Left, p(10.0, 10.0));
        h.tick();
        h.move_to(p(20.0, 20.0));
        h.click(MouseButton::Left, p(20.0, 20.0));
        h.tick();

        h.click(MouseButton::Right, p(25.0, 25.0));
        h.tick();
        // The live draft is untouched and still follows the pointer.
        assert_eq!(h.store.committed_len(AnnotationKind::Marker, true), 1);
        assert_eq!(
            h.store.draft(AnnotationKind::Marker, true),
            Some(&Annotation::Marker(Marker::new(p(25.0, 25.0))))
        );

        h.key("f", false);
        h.tick();
        assert_eq!(
            h.store.committed(AnnotationKind::Marker, false),
            &[Annotation::Marker(Marker::new(p(10.0, 10.0)))]
        );
    }

    #[test]
    fn test_crosshair_hold_and_release_drops_one_marker() {
        let mut h = Harness::new();
        h.move_to(p(5.0, 5.0));
        h.key("f", true);
        h.tick();
        h.move_to(p(42.0, 17.0));
        h.tick();
        h.key("f", false);
        h.tick();

        assert_eq!(
            h.store.committed(AnnotationKind::Marker, false),
            &[Annotation::Marker(Marker::new(p(42.0, 17.0)))]
        );
    }

    #[test]
    fn test_cancel_discards_drafts_keeps_committed() {
        let mut h = Harness::new();
        h.move_to(p(0.0, 0.0));
        h.key("l", true);
        h.tick();
        h.move_to(p(10.0, 0.0));
        h.tick();
        h.key("l", false);
        h.tick();

        h.key("r", true);
        h.tick();
        h.move_to(p(40.0, 40.0));
        h.tick();

        h.machine.cancel(&mut h.store);
        assert!(h.machine.tools().is_empty());
        assert_eq!(h.store.len(AnnotationKind::Line), 1);
        assert_eq!(h.store.len(AnnotationKind::Rectangle), 0);

        // Still holding the key does not re-arm the tool.
        h.move_to(p(60.0, 60.0));
        h.tick();
        assert!(!h.active(ToolKind::Rectangle));
    }

    #[test]
    fn test_at_most_one_draft_per_kind() {
        let mut h = Harness::new();
        h.key("l", true);
        h.key("a", true);
        h.tick();
        h.move_to(p(30.0, 30.0));
        h.tick();

        for kind in [AnnotationKind::Line, AnnotationKind::Arrow] {
            let live: Vec<bool> = h.store.visible(kind, true).map(|v| v.live).collect();
            assert_eq!(live, vec![true]);
        }
        let drafts = h
            .store
            .visible_all(h.machine.tools())
            .filter(|v| v.live)
            .count();
        assert_eq!(drafts, 2);
    }

    #[test]
    fn test_bindings_deserialize_with_defaults() {
        let bindings: ToolBindings = serde_json::from_str(r#"{"rectangle": "b"}"#).unwrap();
        assert_eq!(bindings.key_for(ToolKind::Rectangle), "b");
        assert_eq!(bindings.key_for(ToolKind::Crosshair), "f");
        assert_eq!(bindings.export, vec!["Enter".to_string(), "c".to_string()]);
    }
}
