//! Window mode controller.
//!
//! Owns the window/pet mode state and drives the two-phase transition
//! protocol: hide the window, apply entry properties, notify the renderer,
//! commit geometry-dependent properties after a settle delay, and restore
//! opacity once the renderer reports the new layout is on screen.
//!
//! Transitions are serialized by an epoch counter: a newer request supersedes
//! any in-flight one, and stale settle-delay callbacks are dropped instead of
//! racing for the final window properties.

use std::sync::{
    atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering},
    Arc,
};

use serde::{Deserialize, Serialize};
use serde_json::json;
use tauri::Manager;

use crate::bounds::{Bounds, BoundsStore};
use crate::config::ShellConfig;
use crate::hover::{self, HoverTracker};
use crate::native::{NativeWindow, MAIN_WINDOW_LABEL};
use crate::{
    EVT_FORCE_IGNORE_MOUSE_CHANGED, EVT_MODE_CHANGED, EVT_PRE_MODE_CHANGED,
    EVT_WINDOW_FULLSCREEN_CHANGE, EVT_WINDOW_MAXIMIZED_CHANGE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowMode {
    /// Bordered, resizable, taskbar-visible.
    Window,
    /// Borderless always-on-top overlay, click-through by default.
    Pet,
}

impl WindowMode {
    fn as_u8(self) -> u8 {
        match self {
            WindowMode::Window => 0,
            WindowMode::Pet => 1,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => WindowMode::Pet,
            _ => WindowMode::Window,
        }
    }
}

#[derive(Clone)]
pub struct ModeController {
    inner: Arc<Inner>,
}

struct Inner {
    window: Arc<dyn NativeWindow>,
    config: ShellConfig,
    mode: AtomicU8,
    /// Bumped on every mode-change request; stale transition callbacks
    /// compare against it and drop out.
    epoch: AtomicU64,
    /// Epoch whose transition still has opacity 0, or 0 when none does.
    hidden_epoch: AtomicU64,
    /// Epoch of the last committed transition, or 0 before the first commit.
    committed_epoch: AtomicU64,
    force_ignore: AtomicBool,
    hover: HoverTracker,
    windowed_bounds: BoundsStore,
}

impl ModeController {
    pub fn new(window: Arc<dyn NativeWindow>, config: ShellConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                window,
                config,
                mode: AtomicU8::new(WindowMode::Window.as_u8()),
                epoch: AtomicU64::new(0),
                hidden_epoch: AtomicU64::new(0),
                committed_epoch: AtomicU64::new(0),
                force_ignore: AtomicBool::new(false),
                hover: HoverTracker::default(),
                windowed_bounds: BoundsStore::default(),
            }),
        }
    }

    pub fn mode(&self) -> WindowMode {
        WindowMode::from_u8(self.inner.mode.load(Ordering::SeqCst))
    }

    pub fn force_ignore_mouse(&self) -> bool {
        self.inner.force_ignore.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub(crate) fn current_epoch(&self) -> u64 {
        self.inner.epoch.load(Ordering::SeqCst)
    }

    /// Begin a mode transition (phase "pre").
    ///
    /// No-op when the native window is gone. A repeated or conflicting request
    /// before the previous transition settles supersedes it: the old epoch's
    /// commit callback becomes a no-op and the latest request wins.
    pub fn request_mode_change(&self, mode: WindowMode) {
        let window = &self.inner.window;
        if !window.is_open() {
            return;
        }

        let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.mode.store(mode.as_u8(), Ordering::SeqCst);
        self.inner.hidden_epoch.store(epoch, Ordering::SeqCst);

        log::info!("Mode transition to {mode:?} started (epoch {epoch})");

        // Hide the property-change flicker before touching anything native.
        window.set_opacity(0.0);

        match mode {
            WindowMode::Window => self.prepare_window_entry(),
            WindowMode::Pet => self.prepare_pet_entry(),
        }

        window.emit_event(EVT_PRE_MODE_CHANGED, json!(mode));

        // Liveness fallback: if the renderer never reports the new layout,
        // force the window visible again instead of leaving it invisible.
        let controller = self.clone();
        let timeout = self.inner.config.render_ack_timeout;
        tauri::async_runtime::spawn(async move {
            tokio::time::sleep(timeout).await;
            controller.force_restore_opacity(epoch);
        });
    }

    /// Renderer ack of the pre-notice; starts the settle delay before commit.
    pub fn renderer_ready(&self, mode: WindowMode) {
        if mode != self.mode() {
            log::debug!("Dropping renderer ack for superseded mode {mode:?}");
            return;
        }

        let epoch = self.inner.epoch.load(Ordering::SeqCst);
        let controller = self.clone();
        let delay = self.inner.config.settle_delay;
        tauri::async_runtime::spawn(async move {
            tokio::time::sleep(delay).await;
            controller.commit_mode_change(mode, epoch);
        });
    }

    /// Phase "commit": apply the properties that depend on final geometry.
    pub(crate) fn commit_mode_change(&self, mode: WindowMode, epoch: u64) {
        if epoch != self.inner.epoch.load(Ordering::SeqCst) || mode != self.mode() {
            log::debug!("Dropping superseded commit for {mode:?} (epoch {epoch})");
            return;
        }
        let window = &self.inner.window;
        if !window.is_open() {
            return;
        }

        match mode {
            WindowMode::Window => self.commit_window_mode(),
            WindowMode::Pet => self.commit_pet_mode(),
        }

        self.inner.committed_epoch.store(epoch, Ordering::SeqCst);
        window.emit_event(EVT_MODE_CHANGED, json!(mode));
        log::info!("Mode transition to {mode:?} committed (epoch {epoch})");
    }

    /// Renderer finished laying out the new mode; make the window visible.
    ///
    /// A rendered report can only follow the commit of its own transition, so
    /// any report arriving while a newer transition is still uncommitted is a
    /// stale ack from a superseded mode change and must not unhide the window.
    pub fn mode_change_rendered(&self) {
        let epoch = self.inner.hidden_epoch.load(Ordering::SeqCst);
        if epoch == 0 {
            return;
        }
        if self.inner.committed_epoch.load(Ordering::SeqCst) != epoch {
            log::debug!("Dropping rendered ack for uncommitted epoch {epoch}");
            return;
        }
        if self
            .inner
            .hidden_epoch
            .compare_exchange(epoch, 0, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.inner.window.set_opacity(1.0);
        }
    }

    fn force_restore_opacity(&self, epoch: u64) {
        if self
            .inner
            .hidden_epoch
            .compare_exchange(epoch, 0, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            log::warn!(
                "mode-change-rendered never arrived for epoch {epoch}; restoring opacity"
            );
            self.inner.window.set_opacity(1.0);
        }
    }

    fn prepare_window_entry(&self) {
        let window = &self.inner.window;
        window.set_always_on_top(false);
        window.set_ignore_mouse_events(false);
        window.set_skip_taskbar(false);
        window.set_resizable(true);
        window.set_focusable(true);
        window.set_transparent_background(false);
    }

    fn prepare_pet_entry(&self) {
        let window = &self.inner.window;

        if let Some(bounds) = window.bounds() {
            self.inner.windowed_bounds.snapshot(bounds);
        }
        if window.is_fullscreen() {
            window.set_fullscreen(false);
            window.emit_event(EVT_WINDOW_FULLSCREEN_CHANGE, json!(false));
        }

        window.set_transparent_background(true);
        window.set_always_on_top(true);

        let origin = window.work_area().map(|area| (area.x, area.y)).unwrap_or((0, 0));
        window.set_position(origin.0, origin.1);
    }

    fn commit_window_mode(&self) {
        let window = &self.inner.window;

        if let Some(bounds) = self.inner.windowed_bounds.get() {
            window.set_bounds(bounds);
        } else {
            window.set_size_logical(
                self.inner.config.default_window_width,
                self.inner.config.default_window_height,
            );
            window.center();
        }

        window.set_decorations(true);
        if window.caps().per_window_workspace_visibility {
            window.set_visible_on_all_workspaces(false);
        }
        window.set_ignore_mouse_events(false);
    }

    fn commit_pet_mode(&self) {
        let window = &self.inner.window;

        if let Some(area) = window.work_area() {
            window.set_bounds(area);
        }

        window.set_decorations(false);
        window.set_resizable(false);
        window.set_skip_taskbar(true);
        window.set_focusable(false);

        self.inner.hover.clear();
        window.set_ignore_mouse_events(true);

        let caps = window.caps();
        if caps.per_window_workspace_visibility {
            window.set_visible_on_all_workspaces(true);
        }
        log::debug!(
            "Pet overlay click-through (forwarded mouse events: {})",
            caps.forwards_ignored_mouse
        );
    }

    /// Hover report from a UI component; recomputes the passthrough state.
    pub fn update_component_hover(&self, component_id: &str, hovering: bool) {
        if self.mode() != WindowMode::Pet {
            return;
        }
        if self.force_ignore_mouse() {
            return;
        }

        self.inner.hover.set_hovering(component_id, hovering);
        let any_hovered = self.inner.hover.any_hovered();
        let ignore = hover::should_ignore_mouse(WindowMode::Pet, false, any_hovered);

        let window = &self.inner.window;
        window.set_ignore_mouse_events(ignore);
        if !ignore {
            // Entering an interactive region must allow keyboard focus too.
            window.set_focusable(true);
        }
    }

    /// Flip the explicit click-through override and broadcast the new value.
    pub fn toggle_force_ignore_mouse(&self) {
        let force = !self.inner.force_ignore.fetch_xor(true, Ordering::SeqCst);
        let ignore =
            hover::should_ignore_mouse(self.mode(), force, self.inner.hover.any_hovered());
        self.inner.window.set_ignore_mouse_events(ignore);
        self.inner
            .window
            .emit_event(EVT_FORCE_IGNORE_MOUSE_CHANGED, json!(force));
        log::info!("Force ignore mouse: {force}");
    }

    pub fn is_maximized(&self) -> bool {
        let window = &self.inner.window;
        match (window.bounds(), window.work_area()) {
            (Some(bounds), Some(area)) => bounds.covers(&area),
            _ => false,
        }
    }

    /// Window-mode maximize toggle. Shares the bounds snapshot with the mode
    /// transitions, so restoring yields the exact pre-maximize geometry.
    pub fn toggle_maximize(&self) {
        if self.mode() != WindowMode::Window {
            return;
        }
        let window = &self.inner.window;
        if !window.is_open() {
            return;
        }
        let Some(area) = window.work_area() else {
            return;
        };

        if self.is_maximized() {
            if let Some(bounds) = self.inner.windowed_bounds.take() {
                window.set_bounds(bounds);
                window.emit_event(EVT_WINDOW_MAXIMIZED_CHANGE, json!(false));
            }
        } else {
            if let Some(bounds) = window.bounds() {
                self.inner.windowed_bounds.snapshot(bounds);
            }
            window.set_bounds(area);
            window.emit_event(EVT_WINDOW_MAXIMIZED_CHANGE, json!(true));
        }
    }

    /// Resize notification from the host window; keeps the UI chrome's
    /// maximize indicator in sync with the derived state.
    pub fn notify_resized(&self) {
        self.inner
            .window
            .emit_event(EVT_WINDOW_MAXIMIZED_CHANGE, json!(self.is_maximized()));
    }
}

#[tauri::command]
pub(crate) fn request_window_mode(
    app: tauri::AppHandle,
    controller: tauri::State<'_, ModeController>,
    mode: WindowMode,
) {
    controller.request_mode_change(mode);
    crate::tray::sync_mode(&app, mode);
}

#[tauri::command]
pub(crate) fn renderer_ready_for_mode_change(
    controller: tauri::State<'_, ModeController>,
    mode: WindowMode,
) {
    controller.renderer_ready(mode);
}

#[tauri::command]
pub(crate) fn mode_change_rendered(controller: tauri::State<'_, ModeController>) {
    controller.mode_change_rendered();
}

#[tauri::command]
pub(crate) fn get_window_mode(controller: tauri::State<'_, ModeController>) -> WindowMode {
    controller.mode()
}

#[tauri::command]
pub(crate) fn update_component_hover(
    controller: tauri::State<'_, ModeController>,
    component_id: String,
    is_hovering: bool,
) {
    controller.update_component_hover(&component_id, is_hovering);
}

#[tauri::command]
pub(crate) fn toggle_force_ignore_mouse(controller: tauri::State<'_, ModeController>) {
    controller.toggle_force_ignore_mouse();
}

#[tauri::command]
pub(crate) fn window_maximize(controller: tauri::State<'_, ModeController>) {
    controller.toggle_maximize();
}

#[tauri::command]
pub(crate) fn window_minimize(app: tauri::AppHandle) {
    if let Some(window) = app.get_webview_window(MAIN_WINDOW_LABEL) {
        let _ = window.minimize();
    }
}

#[tauri::command]
pub(crate) fn window_close(app: tauri::AppHandle) {
    let Some(window) = app.get_webview_window(MAIN_WINDOW_LABEL) else {
        return;
    };
    // The companion lives in the tray; closing hides on macOS and closes
    // (which the close handler turns into hide) elsewhere.
    if cfg!(target_os = "macos") {
        let _ = window.hide();
    } else {
        let _ = window.close();
    }
}

#[tauri::command]
pub(crate) fn get_platform() -> &'static str {
    std::env::consts::OS
}
