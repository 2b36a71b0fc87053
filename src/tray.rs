use tauri::{
    menu::{CheckMenuItem, Menu, MenuItem, PredefinedMenuItem},
    tray::{MouseButton, TrayIconBuilder, TrayIconEvent},
    Manager,
};

use crate::native::MAIN_WINDOW_LABEL;
use crate::window_mode::{ModeController, WindowMode};

/// Handles to the mode-aware tray menu items, kept so mode changes from any
/// source (tray, context menu, renderer command) re-sync the checkmarks.
pub(crate) struct TrayState {
    window_mode_item: CheckMenuItem<tauri::Wry>,
    pet_mode_item: CheckMenuItem<tauri::Wry>,
    passthrough_item: MenuItem<tauri::Wry>,
}

impl TrayState {
    fn sync(&self, mode: WindowMode) {
        let _ = self.window_mode_item.set_checked(mode == WindowMode::Window);
        let _ = self.pet_mode_item.set_checked(mode == WindowMode::Pet);
        // Passthrough only makes sense for the overlay.
        let _ = self.passthrough_item.set_enabled(mode == WindowMode::Pet);
    }
}

/// Re-sync the tray after a mode change requested from anywhere.
pub(crate) fn sync_mode(app: &tauri::AppHandle, mode: WindowMode) {
    if let Some(state) = app.try_state::<TrayState>() {
        state.sync(mode);
    }
}

/// Shared handler for the tray menu and the popup context menu; both use the
/// same item ids.
pub(crate) fn handle_menu_event(app: &tauri::AppHandle, id: &str) {
    let controller = app.state::<ModeController>();

    match id {
        "quit" => {
            app.exit(0);
        }
        "mode_window" => {
            controller.request_mode_change(WindowMode::Window);
            sync_mode(app, WindowMode::Window);
        }
        "mode_pet" => {
            controller.request_mode_change(WindowMode::Pet);
            sync_mode(app, WindowMode::Pet);
        }
        "toggle_passthrough" => {
            controller.toggle_force_ignore_mouse();
        }
        "show" => {
            if let Some(window) = app.get_webview_window(MAIN_WINDOW_LABEL) {
                let _ = window.show();
                let _ = window.set_focus();
            }
        }
        "hide" => {
            if let Some(window) = app.get_webview_window(MAIN_WINDOW_LABEL) {
                let _ = window.hide();
            }
        }
        _ => {}
    }
}

pub(crate) fn setup_tray(app: &tauri::App) -> tauri::Result<()> {
    let window_mode_item =
        CheckMenuItem::with_id(app, "mode_window", "Window Mode", true, true, None::<&str>)?;
    let pet_mode_item =
        CheckMenuItem::with_id(app, "mode_pet", "Pet Mode", true, false, None::<&str>)?;
    let passthrough_item = MenuItem::with_id(
        app,
        "toggle_passthrough",
        "Toggle Mouse Passthrough",
        false,
        None::<&str>,
    )?;
    let show_i = MenuItem::with_id(app, "show", "Show", true, None::<&str>)?;
    let hide_i = MenuItem::with_id(app, "hide", "Hide", true, None::<&str>)?;
    let quit_i = MenuItem::with_id(app, "quit", "Exit", true, None::<&str>)?;
    let sep = PredefinedMenuItem::separator(app)?;
    let sep2 = PredefinedMenuItem::separator(app)?;
    let menu = Menu::with_items(
        app,
        &[
            &window_mode_item,
            &pet_mode_item,
            &sep,
            &passthrough_item,
            &sep2,
            &show_i,
            &hide_i,
            &quit_i,
        ],
    )?;
    let icon = app.default_window_icon().cloned();

    app.manage(TrayState {
        window_mode_item,
        pet_mode_item,
        passthrough_item,
    });

    let mut builder = TrayIconBuilder::new()
        .menu(&menu)
        .tooltip("Companion")
        .show_menu_on_left_click(false)
        .on_menu_event(move |app, event| handle_menu_event(app, event.id().as_ref()))
        .on_tray_icon_event(move |tray, event| {
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                ..
            } = event
            {
                let app = tray.app_handle();
                if let Some(window) = app.get_webview_window(MAIN_WINDOW_LABEL) {
                    let _ = window.is_visible().and_then(|is_visible| {
                        if is_visible {
                            window.hide()?;
                        } else {
                            window.show()?;
                            window.set_focus()?;
                        }
                        Ok(())
                    });
                }
            }
        });

    if let Some(i) = icon {
        builder = builder.icon(i);
    }

    builder.build(app)?;
    Ok(())
}

/// Right-click context menu for the companion surface; rebuilt per popup so
/// the entries reflect the current mode.
#[tauri::command]
pub(crate) fn show_context_menu(
    app: tauri::AppHandle,
    window: tauri::WebviewWindow,
    controller: tauri::State<'_, ModeController>,
) -> Result<(), String> {
    let mode = controller.mode();

    let window_mode_item = CheckMenuItem::with_id(
        &app,
        "mode_window",
        "Window Mode",
        true,
        mode == WindowMode::Window,
        None::<&str>,
    )
    .map_err(|e| e.to_string())?;
    let pet_mode_item = CheckMenuItem::with_id(
        &app,
        "mode_pet",
        "Pet Mode",
        true,
        mode == WindowMode::Pet,
        None::<&str>,
    )
    .map_err(|e| e.to_string())?;
    let hide_i =
        MenuItem::with_id(&app, "hide", "Hide", true, None::<&str>).map_err(|e| e.to_string())?;
    let quit_i =
        MenuItem::with_id(&app, "quit", "Exit", true, None::<&str>).map_err(|e| e.to_string())?;
    let sep = PredefinedMenuItem::separator(&app).map_err(|e| e.to_string())?;

    let menu = if mode == WindowMode::Pet {
        let passthrough_item = MenuItem::with_id(
            &app,
            "toggle_passthrough",
            "Toggle Mouse Passthrough",
            true,
            None::<&str>,
        )
        .map_err(|e| e.to_string())?;
        Menu::with_items(
            &app,
            &[
                &window_mode_item,
                &pet_mode_item,
                &sep,
                &passthrough_item,
                &hide_i,
                &quit_i,
            ],
        )
    } else {
        Menu::with_items(
            &app,
            &[&window_mode_item, &pet_mode_item, &sep, &hide_i, &quit_i],
        )
    }
    .map_err(|e| e.to_string())?;

    // Menu events land in the tray's handler (shared ids).
    window.popup_menu(&menu).map_err(|e| e.to_string())
}
