use arc_swap::ArcSwapOption;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Window geometry in physical pixels (virtual desktop coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    /// Whether this rectangle fills the given work area. Matches the derived
    /// maximized check: a window dragged to cover the work area counts as
    /// maximized even if the OS flag was never set.
    pub fn covers(&self, work_area: &Bounds) -> bool {
        self.width >= work_area.width && self.height >= work_area.height
    }
}

/// Last known windowed-mode geometry.
///
/// Written when leaving window mode or before maximizing; consumed when
/// restoring. Absent on first run, which means "default size, centered".
#[derive(Default)]
pub struct BoundsStore {
    snapshot: ArcSwapOption<Bounds>,
}

impl BoundsStore {
    pub fn snapshot(&self, bounds: Bounds) {
        self.snapshot.store(Some(Arc::new(bounds)));
    }

    pub fn get(&self) -> Option<Bounds> {
        self.snapshot.load_full().map(|b| *b)
    }

    /// Consume the snapshot, leaving the store empty.
    pub fn take(&self) -> Option<Bounds> {
        self.snapshot.swap(None).map(|b| *b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORK_AREA: Bounds = Bounds {
        x: 0,
        y: 0,
        width: 1920,
        height: 1040,
    };

    #[test]
    fn test_covers_work_area() {
        let maximized = Bounds {
            x: 0,
            y: 0,
            width: 1920,
            height: 1040,
        };
        let windowed = Bounds {
            x: 120,
            y: 80,
            width: 900,
            height: 670,
        };
        assert!(maximized.covers(&WORK_AREA));
        assert!(!windowed.covers(&WORK_AREA));
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let store = BoundsStore::default();
        assert_eq!(store.get(), None);

        let bounds = Bounds {
            x: 10,
            y: 20,
            width: 800,
            height: 600,
        };
        store.snapshot(bounds);
        assert_eq!(store.get(), Some(bounds));

        // `take` consumes; a second take sees nothing.
        assert_eq!(store.take(), Some(bounds));
        assert_eq!(store.take(), None);
    }

    #[test]
    fn test_snapshot_overwrites() {
        let store = BoundsStore::default();
        store.snapshot(Bounds {
            x: 0,
            y: 0,
            width: 640,
            height: 480,
        });
        let newer = Bounds {
            x: 5,
            y: 5,
            width: 1024,
            height: 768,
        };
        store.snapshot(newer);
        assert_eq!(store.get(), Some(newer));
    }
}
