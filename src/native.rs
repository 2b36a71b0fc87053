//! Native window capability surface.
//!
//! The mode controller never touches `tauri::WebviewWindow` directly; it talks
//! to this trait so the transition logic stays platform-agnostic and can run
//! against a recording fake in tests. The Tauri implementation resolves the
//! window by label on every call, so a window destroyed mid-flight turns every
//! operation into a no-op instead of an error.

use tauri::{Emitter, Manager};

use crate::bounds::Bounds;

pub const MAIN_WINDOW_LABEL: &str = "main";

/// Per-platform switches the transition protocol branches on.
#[derive(Debug, Clone, Copy)]
pub struct PlatformCaps {
    /// The OS supports per-window visibility across virtual desktops,
    /// including full-screen spaces (macOS).
    pub per_window_workspace_visibility: bool,
    /// Ignored mouse events are forwarded to the window beneath, so hover can
    /// still be observed while click-through (Windows/Linux).
    pub forwards_ignored_mouse: bool,
}

impl PlatformCaps {
    pub fn native() -> Self {
        Self {
            per_window_workspace_visibility: cfg!(target_os = "macos"),
            forwards_ignored_mouse: !cfg!(target_os = "macos"),
        }
    }
}

/// Everything the mode controller may do to the host window.
///
/// All mutations are best-effort: implementations swallow native errors and
/// absent-window cases, matching the shell's "already closing" semantics.
pub trait NativeWindow: Send + Sync {
    fn caps(&self) -> PlatformCaps;

    /// Whether the native window handle still exists.
    fn is_open(&self) -> bool;

    fn bounds(&self) -> Option<Bounds>;
    fn set_bounds(&self, bounds: Bounds);
    fn set_size_logical(&self, width: f64, height: f64);
    fn set_position(&self, x: i32, y: i32);
    fn center(&self);

    /// Usable area of the primary display (taskbar/dock excluded where the
    /// platform lets us know).
    fn work_area(&self) -> Option<Bounds>;

    fn set_opacity(&self, opacity: f64);
    fn set_decorations(&self, decorations: bool);
    fn set_always_on_top(&self, on_top: bool);
    fn set_ignore_mouse_events(&self, ignore: bool);
    fn set_skip_taskbar(&self, skip: bool);
    fn set_resizable(&self, resizable: bool);
    fn set_focusable(&self, focusable: bool);
    fn set_transparent_background(&self, transparent: bool);

    fn is_fullscreen(&self) -> bool;
    fn set_fullscreen(&self, fullscreen: bool);
    fn set_visible_on_all_workspaces(&self, visible: bool);

    fn emit_event(&self, event: &str, payload: serde_json::Value);
}

/// `NativeWindow` backed by the Tauri main window.
pub struct TauriHost {
    app: tauri::AppHandle,
    caps: PlatformCaps,
}

impl TauriHost {
    pub fn new(app: tauri::AppHandle) -> Self {
        Self {
            app,
            caps: PlatformCaps::native(),
        }
    }

    fn window(&self) -> Option<tauri::WebviewWindow> {
        self.app.get_webview_window(MAIN_WINDOW_LABEL)
    }
}

impl NativeWindow for TauriHost {
    fn caps(&self) -> PlatformCaps {
        self.caps
    }

    fn is_open(&self) -> bool {
        self.window().is_some()
    }

    fn bounds(&self) -> Option<Bounds> {
        let window = self.window()?;
        let pos = window
            .outer_position()
            .or_else(|_| window.inner_position())
            .ok()?;
        let size = window.outer_size().or_else(|_| window.inner_size()).ok()?;
        Some(Bounds {
            x: pos.x,
            y: pos.y,
            width: size.width,
            height: size.height,
        })
    }

    fn set_bounds(&self, bounds: Bounds) {
        let Some(window) = self.window() else { return };
        let _ = window.set_size(tauri::Size::Physical(tauri::PhysicalSize {
            width: bounds.width,
            height: bounds.height,
        }));
        let _ = window.set_position(tauri::Position::Physical(tauri::PhysicalPosition {
            x: bounds.x,
            y: bounds.y,
        }));
    }

    fn set_size_logical(&self, width: f64, height: f64) {
        let Some(window) = self.window() else { return };
        let _ = window.set_size(tauri::Size::Logical(tauri::LogicalSize { width, height }));
    }

    fn set_position(&self, x: i32, y: i32) {
        let Some(window) = self.window() else { return };
        let _ = window.set_position(tauri::Position::Physical(tauri::PhysicalPosition { x, y }));
    }

    fn center(&self) {
        let Some(window) = self.window() else { return };
        let _ = window.center();
    }

    fn work_area(&self) -> Option<Bounds> {
        let window = self.window()?;

        #[cfg(target_os = "windows")]
        {
            if let Some(area) = windows_impl::primary_work_area() {
                return Some(area);
            }
        }

        let monitor = window
            .primary_monitor()
            .ok()
            .flatten()
            .or_else(|| window.current_monitor().ok().flatten())?;
        let area = monitor.work_area();
        Some(Bounds {
            x: area.position.x,
            y: area.position.y,
            width: area.size.width,
            height: area.size.height,
        })
    }

    fn set_opacity(&self, opacity: f64) {
        let Some(window) = self.window() else { return };
        let opacity = opacity.clamp(0.0, 1.0);

        #[cfg(target_os = "windows")]
        {
            if windows_impl::set_window_alpha(&window, (opacity * 255.0).round() as u8) {
                if opacity > 0.0 {
                    let _ = window.show();
                }
                return;
            }
        }

        // No per-window alpha elsewhere; visibility swap hides the same
        // property-change discontinuity the transition wants to mask.
        if opacity > 0.0 {
            let _ = window.show();
        } else {
            let _ = window.hide();
        }
    }

    fn set_decorations(&self, decorations: bool) {
        let Some(window) = self.window() else { return };
        let _ = window.set_decorations(decorations);
    }

    fn set_always_on_top(&self, on_top: bool) {
        let Some(window) = self.window() else { return };
        let _ = window.set_always_on_top(on_top);
    }

    fn set_ignore_mouse_events(&self, ignore: bool) {
        let Some(window) = self.window() else { return };
        let _ = window.set_ignore_cursor_events(ignore);
    }

    fn set_skip_taskbar(&self, skip: bool) {
        let Some(window) = self.window() else { return };
        // Unsupported on macOS; the workspace-visibility branch covers it.
        let _ = window.set_skip_taskbar(skip);
    }

    fn set_resizable(&self, resizable: bool) {
        let Some(window) = self.window() else { return };
        let _ = window.set_resizable(resizable);
    }

    fn set_focusable(&self, focusable: bool) {
        let Some(window) = self.window() else { return };
        let _ = window.set_focusable(focusable);
    }

    fn set_transparent_background(&self, transparent: bool) {
        let Some(window) = self.window() else { return };
        let color = if transparent {
            tauri::window::Color(0, 0, 0, 0)
        } else {
            tauri::window::Color(255, 255, 255, 255)
        };
        let _ = window.set_background_color(Some(color));
    }

    fn is_fullscreen(&self) -> bool {
        self.window()
            .and_then(|window| window.is_fullscreen().ok())
            .unwrap_or(false)
    }

    fn set_fullscreen(&self, fullscreen: bool) {
        let Some(window) = self.window() else { return };
        let _ = window.set_fullscreen(fullscreen);
    }

    fn set_visible_on_all_workspaces(&self, visible: bool) {
        if !self.caps.per_window_workspace_visibility {
            return;
        }
        let Some(window) = self.window() else { return };
        let _ = window.set_visible_on_all_workspaces(visible);
    }

    fn emit_event(&self, event: &str, payload: serde_json::Value) {
        let Some(window) = self.window() else { return };
        let _ = window.emit(event, payload);
    }
}

#[cfg(target_os = "windows")]
mod windows_impl {
    use windows::Win32::Foundation::{COLORREF, POINT};
    use windows::Win32::Graphics::Gdi::{
        GetMonitorInfoW, MonitorFromPoint, MONITORINFO, MONITOR_DEFAULTTOPRIMARY,
    };
    use windows::Win32::UI::WindowsAndMessaging::{
        GetWindowLongPtrW, SetLayeredWindowAttributes, SetWindowLongPtrW, GWL_EXSTYLE, LWA_ALPHA,
        WS_EX_LAYERED,
    };

    use crate::bounds::Bounds;

    pub(super) fn primary_work_area() -> Option<Bounds> {
        let hmonitor =
            unsafe { MonitorFromPoint(POINT { x: 0, y: 0 }, MONITOR_DEFAULTTOPRIMARY) };
        if hmonitor.0.is_null() {
            return None;
        }

        let mut info = MONITORINFO {
            cbSize: std::mem::size_of::<MONITORINFO>() as u32,
            ..Default::default()
        };
        if !unsafe { GetMonitorInfoW(hmonitor, &mut info) }.as_bool() {
            return None;
        }

        let rc = info.rcWork;
        Some(Bounds {
            x: rc.left,
            y: rc.top,
            width: (rc.right - rc.left).max(0) as u32,
            height: (rc.bottom - rc.top).max(0) as u32,
        })
    }

    pub(super) fn set_window_alpha(window: &tauri::WebviewWindow, alpha: u8) -> bool {
        let Ok(hwnd) = window.hwnd() else {
            return false;
        };

        let ex_style = unsafe { GetWindowLongPtrW(hwnd, GWL_EXSTYLE) };
        if ex_style & (WS_EX_LAYERED.0 as isize) == 0 {
            unsafe { SetWindowLongPtrW(hwnd, GWL_EXSTYLE, ex_style | WS_EX_LAYERED.0 as isize) };
        }

        unsafe { SetLayeredWindowAttributes(hwnd, COLORREF(0), alpha, LWA_ALPHA) }.is_ok()
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::sync::Mutex;

    use super::{NativeWindow, PlatformCaps};
    use crate::bounds::Bounds;

    /// Recording `NativeWindow` for controller tests.
    pub(crate) struct FakeWindow {
        pub(crate) caps: PlatformCaps,
        pub(crate) open: Mutex<bool>,
        pub(crate) bounds: Mutex<Bounds>,
        pub(crate) work_area: Bounds,
        pub(crate) fullscreen: Mutex<bool>,
        pub(crate) log: Mutex<Vec<String>>,
        pub(crate) events: Mutex<Vec<(String, serde_json::Value)>>,
    }

    impl FakeWindow {
        pub(crate) fn new() -> Self {
            Self {
                caps: PlatformCaps {
                    per_window_workspace_visibility: false,
                    forwards_ignored_mouse: true,
                },
                open: Mutex::new(true),
                bounds: Mutex::new(Bounds {
                    x: 120,
                    y: 80,
                    width: 900,
                    height: 670,
                }),
                work_area: Bounds {
                    x: 0,
                    y: 0,
                    width: 1920,
                    height: 1040,
                },
                fullscreen: Mutex::new(false),
                log: Mutex::new(Vec::new()),
                events: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn with_work_area(work_area: Bounds) -> Self {
            Self {
                work_area,
                ..Self::new()
            }
        }

        fn record(&self, op: String) {
            self.log.lock().unwrap().push(op);
        }

        pub(crate) fn ops(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }

        pub(crate) fn event_names(&self) -> Vec<String> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .map(|(name, _)| name.clone())
                .collect()
        }

        pub(crate) fn op_index(&self, op: &str) -> Option<usize> {
            self.ops().iter().position(|entry| entry == op)
        }
    }

    impl NativeWindow for FakeWindow {
        fn caps(&self) -> PlatformCaps {
            self.caps
        }

        fn is_open(&self) -> bool {
            *self.open.lock().unwrap()
        }

        fn bounds(&self) -> Option<Bounds> {
            self.is_open().then(|| *self.bounds.lock().unwrap())
        }

        fn set_bounds(&self, bounds: Bounds) {
            *self.bounds.lock().unwrap() = bounds;
            self.record(format!(
                "set_bounds({},{},{},{})",
                bounds.x, bounds.y, bounds.width, bounds.height
            ));
        }

        fn set_size_logical(&self, width: f64, height: f64) {
            let mut bounds = self.bounds.lock().unwrap();
            bounds.width = width as u32;
            bounds.height = height as u32;
            self.record(format!("set_size_logical({width},{height})"));
        }

        fn set_position(&self, x: i32, y: i32) {
            let mut bounds = self.bounds.lock().unwrap();
            bounds.x = x;
            bounds.y = y;
            self.record(format!("set_position({x},{y})"));
        }

        fn center(&self) {
            self.record("center".into());
        }

        fn work_area(&self) -> Option<Bounds> {
            Some(self.work_area)
        }

        fn set_opacity(&self, opacity: f64) {
            self.record(format!("set_opacity({opacity})"));
        }

        fn set_decorations(&self, decorations: bool) {
            self.record(format!("set_decorations({decorations})"));
        }

        fn set_always_on_top(&self, on_top: bool) {
            self.record(format!("set_always_on_top({on_top})"));
        }

        fn set_ignore_mouse_events(&self, ignore: bool) {
            self.record(format!("set_ignore_mouse_events({ignore})"));
        }

        fn set_skip_taskbar(&self, skip: bool) {
            self.record(format!("set_skip_taskbar({skip})"));
        }

        fn set_resizable(&self, resizable: bool) {
            self.record(format!("set_resizable({resizable})"));
        }

        fn set_focusable(&self, focusable: bool) {
            self.record(format!("set_focusable({focusable})"));
        }

        fn set_transparent_background(&self, transparent: bool) {
            self.record(format!("set_transparent_background({transparent})"));
        }

        fn is_fullscreen(&self) -> bool {
            *self.fullscreen.lock().unwrap()
        }

        fn set_fullscreen(&self, fullscreen: bool) {
            *self.fullscreen.lock().unwrap() = fullscreen;
            self.record(format!("set_fullscreen({fullscreen})"));
        }

        fn set_visible_on_all_workspaces(&self, visible: bool) {
            self.record(format!("set_visible_on_all_workspaces({visible})"));
        }

        fn emit_event(&self, event: &str, payload: serde_json::Value) {
            self.events
                .lock()
                .unwrap()
                .push((event.to_string(), payload));
        }
    }
}
