use std::collections::HashSet;
use std::sync::Mutex;

use crate::window_mode::WindowMode;

/// UI components currently reporting mouse hover, by opaque id.
///
/// Only meaningful in pet mode: while nothing is hovered the overlay is
/// click-through, and the first hovered component makes it interactive again.
#[derive(Default)]
pub struct HoverTracker {
    components: Mutex<HashSet<String>>,
}

impl HoverTracker {
    pub fn set_hovering(&self, component_id: &str, hovering: bool) {
        let Ok(mut components) = self.components.lock() else {
            return;
        };
        if hovering {
            components.insert(component_id.to_string());
        } else {
            components.remove(component_id);
        }
    }

    pub fn any_hovered(&self) -> bool {
        self.components
            .lock()
            .map(|components| !components.is_empty())
            .unwrap_or(false)
    }

    pub fn clear(&self) {
        if let Ok(mut components) = self.components.lock() {
            components.clear();
        }
    }
}

/// Whether the window should forward mouse input to whatever is beneath it.
///
/// Recomputed on every hover change, force toggle and mode change; window mode
/// is never click-through.
pub fn should_ignore_mouse(mode: WindowMode, force_ignore: bool, any_hovered: bool) -> bool {
    force_ignore || (mode == WindowMode::Pet && !any_hovered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_add_remove() {
        let tracker = HoverTracker::default();
        assert!(!tracker.any_hovered());

        tracker.set_hovering("input-box", true);
        tracker.set_hovering("subtitle", true);
        assert!(tracker.any_hovered());

        tracker.set_hovering("input-box", false);
        assert!(tracker.any_hovered());
        tracker.set_hovering("subtitle", false);
        assert!(!tracker.any_hovered());

        // Removing an id that was never added is harmless.
        tracker.set_hovering("ghost", false);
        assert!(!tracker.any_hovered());
    }

    #[test]
    fn test_pet_mode_ignores_when_nothing_hovered() {
        assert!(should_ignore_mouse(WindowMode::Pet, false, false));
        assert!(!should_ignore_mouse(WindowMode::Pet, false, true));
    }

    #[test]
    fn test_window_mode_never_click_through() {
        assert!(!should_ignore_mouse(WindowMode::Window, false, false));
        assert!(!should_ignore_mouse(WindowMode::Window, false, true));
    }

    #[test]
    fn test_force_override_dominates() {
        assert!(should_ignore_mouse(WindowMode::Pet, true, true));
        // The override also wins in window mode; the controller clears the
        // effective state on mode commit instead.
        assert!(should_ignore_mouse(WindowMode::Window, true, false));
    }
}
