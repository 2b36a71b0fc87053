//! Shell tuning loaded from `.env`/environment.
//!
//! Everything here has a sensible default; env vars only exist so the settle
//! delay and watchdog can be tuned without a rebuild.

use std::time::Duration;

/// Runtime configuration for the window shell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShellConfig {
    /// Wait between the renderer's pre-notice ack and the commit phase.
    pub settle_delay: Duration,
    /// Maximum time a transition may keep the window invisible before the
    /// watchdog force-restores opacity.
    pub render_ack_timeout: Duration,
    /// Logical size applied when returning to window mode with no snapshot.
    pub default_window_width: f64,
    pub default_window_height: f64,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(500),
            render_ack_timeout: Duration::from_millis(3_000),
            default_window_width: 900.0,
            default_window_height: 670.0,
        }
    }
}

fn env_millis(name: &str) -> Option<Duration> {
    parse_millis(&std::env::var(name).ok()?)
}

fn parse_millis(raw: &str) -> Option<Duration> {
    let ms: u64 = raw.trim().parse().ok()?;
    // Zero would commit before the renderer has a chance to lay out.
    if ms == 0 {
        return None;
    }
    Some(Duration::from_millis(ms))
}

fn parse_dimension(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    (value.is_finite() && value >= 100.0).then_some(value)
}

/// Load shell configuration from `.env`/environment.
///
/// Reads:
/// - `COMPANION_SETTLE_DELAY_MS`
/// - `COMPANION_RENDER_ACK_TIMEOUT_MS`
/// - `COMPANION_WINDOW_WIDTH` / `COMPANION_WINDOW_HEIGHT`
pub fn load_shell_config() -> ShellConfig {
    let _ = dotenvy::dotenv();

    let mut config = ShellConfig::default();

    if let Some(delay) = env_millis("COMPANION_SETTLE_DELAY_MS") {
        config.settle_delay = delay;
    }
    if let Some(timeout) = env_millis("COMPANION_RENDER_ACK_TIMEOUT_MS") {
        config.render_ack_timeout = timeout;
    }
    if let Some(width) = std::env::var("COMPANION_WINDOW_WIDTH")
        .ok()
        .as_deref()
        .and_then(parse_dimension)
    {
        config.default_window_width = width;
    }
    if let Some(height) = std::env::var("COMPANION_WINDOW_HEIGHT")
        .ok()
        .as_deref()
        .and_then(parse_dimension)
    {
        config.default_window_height = height;
    }

    config
}
