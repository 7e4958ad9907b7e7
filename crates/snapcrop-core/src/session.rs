//! The interactive session: everything one capture-annotate-export run owns.

use crate::camera::Camera;
use crate::canvas::Canvas;
use crate::input::{InputState, MouseButton};
use crate::selection::SelectionRegion;
use crate::store::AnnotationStore;
use crate::tools::{ToolBindings, ToolSet, ToolStateMachine};
use kurbo::Point;

/// Result of one session tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Keep running the interactive loop.
    Continue,
    /// Composite the current state and end the loop.
    Export,
    /// End the loop without exporting.
    Quit,
}

/// Tunables for a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom delta applied per unit of scroll.
    pub zoom_step: f64,
    pub bindings: ToolBindings,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            min_zoom: crate::camera::DEFAULT_MIN_ZOOM,
            max_zoom: crate::camera::DEFAULT_MAX_ZOOM,
            zoom_step: 1.0,
            bindings: ToolBindings::default(),
        }
    }
}

/// Owns the canvas and all interactive state for one run.
#[derive(Debug, Clone)]
pub struct Session {
    canvas: Canvas,
    pub camera: Camera,
    pub selection: SelectionRegion,
    pub store: AnnotationStore,
    tools: ToolStateMachine,
    zoom_step: f64,
    selecting: bool,
    pointer_canvas: Point,
}

impl Session {
    pub fn new(canvas: Canvas, options: SessionOptions) -> Self {
        let selection = SelectionRegion::new(canvas.size());
        Self {
            canvas,
            camera: Camera::with_zoom_bounds(options.min_zoom, options.max_zoom),
            selection,
            store: AnnotationStore::new(),
            tools: ToolStateMachine::new(options.bindings),
            zoom_step: options.zoom_step,
            selecting: false,
            pointer_canvas: Point::ZERO,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn bindings(&self) -> &ToolBindings {
        self.tools.bindings()
    }

    pub fn active_tools(&self) -> &ToolSet {
        self.tools.tools()
    }

    /// Pointer position in canvas space as of the last tick.
    pub fn pointer_canvas(&self) -> Point {
        self.pointer_canvas
    }

    /// The secondary button is currently dragging out a selection.
    pub fn is_selecting(&self) -> bool {
        self.selecting
    }

    /// Run one frame of input through the camera, tools and selection.
    pub fn update(&mut self, input: &InputState) -> FrameOutcome {
        let bindings = self.tools.bindings();
        if input.any_just_pressed(&bindings.quit) {
            log::info!("Quit requested");
            return FrameOutcome::Quit;
        }
        if input.any_just_pressed(&bindings.export) {
            log::info!("Export requested");
            return FrameOutcome::Export;
        }
        let cancel = input.any_just_pressed(&bindings.cancel);

        let armed = self.tools.armed(input);

        self.update_camera(input, armed);
        self.pointer_canvas = self.camera.screen_to_canvas(input.pointer_position);

        if cancel {
            self.tools.cancel(&mut self.store);
            log::debug!("Tools cancelled");
        }

        self.tools.tick(input, self.pointer_canvas, &mut self.store);
        if !armed {
            self.update_selection(input);
        }

        FrameOutcome::Continue
    }

    fn update_camera(&mut self, input: &InputState, armed: bool) {
        if input.scroll_delta.y != 0.0 {
            self.camera
                .apply_zoom_delta(input.scroll_delta.y * self.zoom_step, input.pointer_position);
        }

        let dragging = input.is_button_pressed(MouseButton::Middle)
            || (input.is_button_pressed(MouseButton::Left) && !armed);
        let delta = -input.pointer_delta();
        if dragging && delta.hypot2() > 0.0 {
            self.camera.pan(delta);
        }
    }

    fn update_selection(&mut self, input: &InputState) {
        if self.selecting && input.is_button_just_released(MouseButton::Right) {
            let rect = self.selection.region().map(|r| r.rect());
            log::debug!("Selection gesture ended at {:?}", rect);
        }
        if !input.is_button_pressed(MouseButton::Right) {
            self.selecting = false;
            return;
        }
        if !self.selecting {
            self.selection.begin_new_selection();
            self.selecting = true;
        }
        if self.selection.first().is_none() {
            self.selection.set_first(self.pointer_canvas);
        }
        self.selection.set_second(self.pointer_canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KeyEvent, PointerEvent};
    use crate::tools::ToolKind;
    use kurbo::Vec2;

    fn session() -> Session {
        let canvas = Canvas::new(800, 600, vec![0; 800 * 600 * 3]).unwrap();
        Session::new(canvas, SessionOptions::default())
    }

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_selection_drag() {
        let mut s = session();
        let mut input = InputState::new();
        input.handle_pointer_event(PointerEvent::Down { position: p(100.0, 100.0), button: MouseButton::Right });
        s.update(&input);
        input.begin_frame();
        assert!(s.is_selecting());

        input.handle_pointer_event(PointerEvent::Move { position: p(400.0, 500.0) });
        s.update(&input);
        input.begin_frame();
        input.handle_pointer_event(PointerEvent::Up { position: p(400.0, 500.0), button: MouseButton::Right });
        s.update(&input);

        assert!(!s.is_selecting());
        let region = s.selection.region().unwrap();
        assert_eq!(region.min, p(100.0, 100.0));
        assert_eq!(region.max, p(400.0, 500.0));
    }

    #[test]
    fn test_new_gesture_restarts_selection() {
        let mut s = session();
        let mut input = InputState::new();
        for (from, to) in [(p(10.0, 10.0), p(50.0, 50.0)), (p(300.0, 300.0), p(320.0, 310.0))] {
            input.handle_pointer_event(PointerEvent::Down { position: from, button: MouseButton::Right });
            s.update(&input);
            input.begin_frame();
            input.handle_pointer_event(PointerEvent::Move { position: to });
            s.update(&input);
            input.begin_frame();
            input.handle_pointer_event(PointerEvent::Up { position: to, button: MouseButton::Right });
            s.update(&input);
            input.begin_frame();
        }
        let region = s.selection.region().unwrap();
        assert_eq!(region.min, p(300.0, 300.0));
        assert_eq!(region.max, p(320.0, 310.0));
    }

    #[test]
    fn test_primary_drag_pans() {
        let mut s = session();
        let mut input = InputState::new();
        input.handle_pointer_event(PointerEvent::Move { position: p(100.0, 100.0) });
        input.begin_frame();
        input.handle_pointer_event(PointerEvent::Down { position: p(100.0, 100.0), button: MouseButton::Left });
        s.update(&input);
        input.begin_frame();
        input.handle_pointer_event(PointerEvent::Move { position: p(130.0, 110.0) });
        s.update(&input);

        // Content follows the pointer.
        let moved = s.camera.canvas_to_screen(p(100.0, 100.0));
        assert!((moved.x - 130.0).abs() < 1e-9);
        assert!((moved.y - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_drawing_happens_in_canvas_space() {
        let mut s = session();
        let mut input = InputState::new();
        input.handle_pointer_event(PointerEvent::Scroll { position: p(0.0, 0.0), delta: Vec2::new(0.0, 1.0) });
        s.update(&input);
        input.begin_frame();
        let zoom = s.camera.zoom;
        assert!(zoom > 1.0);

        input.handle_pointer_event(PointerEvent::Move { position: p(100.0, 100.0) });
        input.handle_key_event(KeyEvent::Pressed("l".to_string()));
        s.update(&input);
        input.begin_frame();
        input.handle_pointer_event(PointerEvent::Move { position: p(200.0, 100.0) });
        s.update(&input);
        input.begin_frame();
        input.handle_key_event(KeyEvent::Released("l".to_string()));
        s.update(&input);

        let lines = s.store.committed(crate::shapes::AnnotationKind::Line, false);
        assert_eq!(lines.len(), 1);
        let crate::shapes::Annotation::Line(line) = &lines[0] else {
            panic!("expected a line");
        };
        assert_eq!(line.start, (p(100.0, 100.0).to_vec2() / zoom).to_point().round());
        assert_eq!(line.end, (p(200.0, 100.0).to_vec2() / zoom).to_point().round());
    }

    #[test]
    fn test_export_and_quit_keys() {
        let mut s = session();
        let mut input = InputState::new();
        input.handle_key_event(KeyEvent::Pressed("Enter".to_string()));
        assert_eq!(s.update(&input), FrameOutcome::Export);
        input.begin_frame();
        input.handle_key_event(KeyEvent::Pressed("q".to_string()));
        assert_eq!(s.update(&input), FrameOutcome::Quit);
        input.begin_frame();
        assert_eq!(s.update(&input), FrameOutcome::Continue);
    }

    #[test]
    fn test_cancel_key_clears_tools() {
        let mut s = session();
        let mut input = InputState::new();
        input.handle_key_event(KeyEvent::Pressed("r".to_string()));
        s.update(&input);
        input.begin_frame();
        assert!(s.active_tools().is_active(ToolKind::Rectangle));

        input.handle_key_event(KeyEvent::Pressed("Escape".to_string()));
        s.update(&input);
        assert!(s.active_tools().is_empty());
    }

    #[test]
    fn test_zero_min_zoom_recovers() {
        let canvas = Canvas::new(800, 600, vec![0; 800 * 600 * 3]).unwrap();
        let options = SessionOptions {
            min_zoom: 0.0,
            zoom_step: 5.0,
            ..SessionOptions::default()
        };
        let mut s = Session::new(canvas, options);
        let mut input = InputState::new();
        for dy in [-1.0, -1.0, -1.0, 1.0, 1.0, 1.0] {
            input.handle_pointer_event(PointerEvent::Scroll { position: p(400.0, 300.0), delta: Vec2::new(0.0, dy) });
            s.update(&input);
            input.begin_frame();
            assert!(s.camera.zoom > 0.0);
        }
        assert!(s.camera.zoom > 1.0);
        let corner = s.camera.screen_to_canvas(p(0.0, 0.0));
        assert!(corner.x.is_finite() && corner.y.is_finite());
    }
}
