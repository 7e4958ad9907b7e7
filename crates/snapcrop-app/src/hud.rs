//! Status overlay drawn with egui.

use crate::shortcuts::ShortcutRegistry;
use egui::{Align2, Color32, Context, CornerRadius, Frame, Margin, RichText};
use snapcrop_core::session::Session;
use snapcrop_core::shapes::AnnotationKind;

/// HUD visibility and content that doesn't change per frame.
pub struct HudState {
    pub visible: bool,
    shortcuts: ShortcutRegistry,
}

impl HudState {
    pub fn new(visible: bool, shortcuts: ShortcutRegistry) -> Self {
        Self { visible, shortcuts }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        log::debug!("HUD {}", if self.visible { "shown" } else { "hidden" });
    }
}

/// One-line summaries of the session state.
pub fn status_lines(session: &Session) -> Vec<String> {
    let cursor = session.pointer_canvas();
    let zoom = format!(
        "Zoom {:.0}%  Cursor ({:.0}, {:.0})",
        session.camera.zoom * 100.0,
        cursor.x,
        cursor.y
    );

    let selection = match session.selection.region() {
        Some(region) if !region.is_degenerate() && region.rect().area() > 0.0 => {
            let rect = region.rect();
            format!(
                "Selection {}x{} at ({}, {})",
                rect.width(),
                rect.height(),
                rect.x0,
                rect.y0
            )
        }
        _ => "Selection: full screen".to_string(),
    };

    let tools = session.active_tools();
    let tools = if tools.is_empty() {
        "Tools: none".to_string()
    } else {
        let names: Vec<_> = tools.iter().map(|t| t.name()).collect();
        format!("Tools: {}", names.join(", "))
    };

    let counts: Vec<_> = [
        AnnotationKind::Marker,
        AnnotationKind::Line,
        AnnotationKind::Arrow,
        AnnotationKind::Rectangle,
    ]
    .iter()
    .map(|kind| {
        let active = session.active_tools().is_kind_active(*kind);
        format!("{} {}", kind.name(), session.store.committed_len(*kind, active))
    })
    .collect();

    vec![zoom, selection, tools, counts.join("  ")]
}

/// Draw the HUD in the top-left corner.
pub fn render_hud(ctx: &Context, session: &Session, hud: &HudState) {
    if !hud.visible {
        return;
    }

    egui::Area::new(egui::Id::new("hud"))
        .anchor(Align2::LEFT_TOP, [8.0, 8.0])
        .interactable(false)
        .show(ctx, |ui| {
            Frame::new()
                .fill(Color32::from_black_alpha(170))
                .corner_radius(CornerRadius::same(6))
                .inner_margin(Margin::same(8))
                .show(ui, |ui| {
                    for line in status_lines(session) {
                        ui.label(RichText::new(line).size(13.0).color(Color32::from_gray(235)));
                    }
                    ui.add_space(4.0);
                    for shortcut in hud.shortcuts.all() {
                        ui.label(
                            RichText::new(format!("{:18} {}", shortcut.format(), shortcut.description))
                                .size(11.0)
                                .monospace()
                                .color(Color32::from_gray(180)),
                        );
                    }
                });
        });
}
