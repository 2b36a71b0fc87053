use std::sync::Arc;

use tauri::Manager;
use tauri_plugin_global_shortcut::ShortcutState;

use crate::native::{NativeWindow, TauriHost, MAIN_WINDOW_LABEL};
use crate::window_mode::ModeController;

pub mod bounds;
pub mod config;
pub mod hover;
pub mod native;
pub mod tray;
pub mod window_mode;

// Host -> renderer event names. The renderer listens with `listen()`; payload
// shapes are documented next to the emitting code.
pub const EVT_PRE_MODE_CHANGED: &str = "pre-mode-changed";
pub const EVT_MODE_CHANGED: &str = "mode-changed";
pub const EVT_FORCE_IGNORE_MOUSE_CHANGED: &str = "force-ignore-mouse-changed";
pub const EVT_WINDOW_MAXIMIZED_CHANGE: &str = "window-maximized-change";
pub const EVT_WINDOW_FULLSCREEN_CHANGE: &str = "window-fullscreen-change";

pub fn run() {
    let shell_config = config::load_shell_config();

    tauri::Builder::default()
        .plugin(
            tauri_plugin_log::Builder::new()
                .level(log::LevelFilter::Info)
                .build(),
        )
        .on_menu_event(|app, event| tray::handle_menu_event(app, event.id().as_ref()))
        .invoke_handler(tauri::generate_handler![
            window_mode::request_window_mode,
            window_mode::renderer_ready_for_mode_change,
            window_mode::mode_change_rendered,
            window_mode::get_window_mode,
            window_mode::update_component_hover,
            window_mode::toggle_force_ignore_mouse,
            window_mode::window_maximize,
            window_mode::window_minimize,
            window_mode::window_close,
            window_mode::get_platform,
            tray::show_context_menu
        ])
        .setup(move |app| {
            app.handle().plugin(
                tauri_plugin_global_shortcut::Builder::new()
                    .with_shortcuts(["CmdOrCtrl+Shift+P"])?
                    .with_handler(|app, _shortcut, event| {
                        if event.state == ShortcutState::Pressed {
                            app.state::<ModeController>().toggle_force_ignore_mouse();
                        }
                    })
                    .build(),
            )?;

            // Created transparent-capable up front: transparency cannot be
            // toggled at runtime, so window mode paints an opaque background
            // over it instead.
            let window = tauri::WebviewWindowBuilder::new(
                app,
                MAIN_WINDOW_LABEL,
                tauri::WebviewUrl::App("index.html".into()),
            )
            .title("Companion")
            .inner_size(
                shell_config.default_window_width,
                shell_config.default_window_height,
            )
            .resizable(true)
            .decorations(true)
            .transparent(true)
            .visible(false)
            .center()
            .build()?;

            let host: Arc<dyn NativeWindow> = Arc::new(TauriHost::new(app.handle().clone()));
            let controller = ModeController::new(host, shell_config);
            app.manage(controller.clone());

            tray::setup_tray(app)?;

            let app_handle = app.handle().clone();
            window.on_window_event(move |event| match event {
                tauri::WindowEvent::Resized(_) => {
                    if let Some(controller) = app_handle.try_state::<ModeController>() {
                        controller.notify_resized();
                    }
                }
                tauri::WindowEvent::CloseRequested { api, .. } => {
                    // The companion keeps running in the tray; closing hides.
                    api.prevent_close();
                    if let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) {
                        let _ = window.hide();
                    }
                }
                _ => {}
            });

            let _ = window.show();
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
