//! SnapCrop Core Library
//!
//! Platform-agnostic interactive engine for SnapCrop: the captured canvas,
//! the pan/zoom camera, the crop selection, the annotation tools and the
//! per-session state that ties them together.

pub mod camera;
pub mod canvas;
pub mod input;
pub mod selection;
pub mod session;
pub mod shapes;
pub mod store;
pub mod tools;

pub use camera::Camera;
pub use canvas::{Canvas, CanvasError};
pub use input::{InputState, KeyEvent, MouseButton, PointerEvent};
pub use selection::{Region, SelectionRegion, ShadingBands};
pub use session::{FrameOutcome, Session};
pub use shapes::{Annotation, AnnotationKind, Arrow, Line, Marker, Rectangle, SerializableColor};
pub use store::{AnnotationStore, Visible};
pub use tools::{ToolBindings, ToolKind, ToolSet, ToolStateMachine};
