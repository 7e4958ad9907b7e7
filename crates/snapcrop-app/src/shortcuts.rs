//! Keyboard shortcut registry and documentation.

use snapcrop_core::tools::{ToolBindings, ToolKind};

/// A keyboard or mouse shortcut definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    pub keys: Vec<String>,
    pub description: &'static str,
}

impl Shortcut {
    pub fn new(keys: Vec<String>, description: &'static str) -> Self {
        Self { keys, description }
    }

    fn single(key: &str, description: &'static str) -> Self {
        Self::new(vec![key.to_string()], description)
    }

    /// Format the shortcut for display (e.g., "Enter/C").
    pub fn format(&self) -> String {
        self.keys
            .iter()
            .map(|k| {
                let mut chars = k.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Registry of all shortcuts for a set of bindings.
pub struct ShortcutRegistry {
    shortcuts: Vec<Shortcut>,
}

impl ShortcutRegistry {
    pub fn new(bindings: &ToolBindings, hud_keys: &[String]) -> Self {
        let mut shortcuts: Vec<Shortcut> = ToolKind::ALL
            .iter()
            .map(|tool| {
                let description = match tool {
                    ToolKind::Crosshair => "Hold for crosshair, click to pin",
                    ToolKind::Line => "Hold and move to draw a line",
                    ToolKind::Rectangle => "Hold and move to draw a rectangle",
                    ToolKind::Arrow => "Hold and move to draw an arrow",
                };
                Shortcut::single(bindings.key_for(*tool), description)
            })
            .collect();
        shortcuts.push(Shortcut::single("Right drag", "Select crop region"));
        shortcuts.push(Shortcut::single("Left/Middle drag", "Pan"));
        shortcuts.push(Shortcut::single("Wheel", "Zoom at cursor"));
        shortcuts.push(Shortcut::new(bindings.cancel.clone(), "Cancel drawing"));
        shortcuts.push(Shortcut::new(bindings.export.clone(), "Export and exit"));
        shortcuts.push(Shortcut::new(bindings.quit.clone(), "Quit without export"));
        shortcuts.push(Shortcut::new(hud_keys.to_vec(), "Toggle this help"));
        Self { shortcuts }
    }

    pub fn all(&self) -> &[Shortcut] {
        &self.shortcuts
    }

    /// Log all shortcuts at info level.
    pub fn log_all(&self) {
        log::info!("Keyboard shortcuts:");
        for shortcut in &self.shortcuts {
            log::info!("  {:20} {}", shortcut.format(), shortcut.description);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let shortcut = Shortcut::new(vec!["Enter".to_string(), "c".to_string()], "Export");
        assert_eq!(shortcut.format(), "Enter/C");
    }

    #[test]
    fn test_registry_follows_bindings() {
        let bindings = ToolBindings {
            rectangle: "b".to_string(),
            ..ToolBindings::default()
        };
        let registry = ShortcutRegistry::new(&bindings, &["F1".to_string()]);
        assert!(registry.all().iter().any(|s| s.format() == "B"));
        assert!(!registry.all().iter().any(|s| s.format() == "R"));
        assert!(registry.all().iter().any(|s| s.format() == "Escape"));
        assert!(registry.all().iter().any(|s| s.format() == "F1"));
    }
}
