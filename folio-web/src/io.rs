//! Browser storage and DOM side effects.

use anyhow::{anyhow, Context, Result};
use folio_core::{StateStore, Theme};
use wasm_bindgen::JsValue;

/// localStorage key holding the state document.
pub const STORAGE_KEY: &str = "readerState";

/// `log` backend that forwards to the browser console, so the core's
/// corrupt-snapshot and save-failure warnings surface in devtools.
struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Info
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("{}: {}", record.target(), record.args());
        match record.level() {
            log::Level::Error | log::Level::Warn => web_sys::console::warn_1(&line.into()),
            _ => web_sys::console::log_1(&line.into()),
        }
    }

    fn flush(&self) {}
}

/// Route the `log` facade to the console. Safe to call once at startup.
pub fn init_logging() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }
}

/// State document kept in the browser's localStorage.
pub struct WebStore;

fn storage() -> Result<web_sys::Storage> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .context("localStorage unavailable")
}

impl StateStore for WebStore {
    fn load(&self) -> Result<Option<String>> {
        storage()?
            .get_item(STORAGE_KEY)
            .map_err(|_| anyhow!("localStorage read failed"))
    }

    fn save(&mut self, json: &str) -> Result<()> {
        storage()?
            .set_item(STORAGE_KEY, json)
            .map_err(|_| anyhow!("localStorage write failed"))
    }
}

pub fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

pub fn today() -> String {
    js_sys::Date::new_0()
        .to_locale_date_string("en-US", &JsValue::UNDEFINED)
        .into()
}

/// Window width in CSS pixels, or a wide default when unavailable.
pub fn viewport_width() -> u16 {
    web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|v| v.as_f64())
        .map(|w| w as u16)
        .unwrap_or(u16::MAX)
}

fn body() -> Option<web_sys::HtmlElement> {
    web_sys::window()?.document()?.body()
}

/// The terminal grid inherits the body font size, so this rescales the
/// whole reader.
pub fn apply_font_size(px: u8) {
    if let Some(body) = body() {
        let _ = body.style().set_property("font-size", &format!("{px}px"));
    }
}

/// Keep the page around the terminal grid in step with the theme. The
/// `dark-theme` class is the hook for any page CSS outside the grid.
pub fn apply_theme(theme: Theme) {
    let (bg, fg) = match theme {
        Theme::Dark => ("#1e1e2e", "#cdd6f4"),
        Theme::Light => ("#eff1f5", "#4c4f69"),
    };
    if let Some(body) = body() {
        body.set_class_name(if theme.is_dark() { "dark-theme" } else { "" });
        let _ = body.style().set_property("background-color", bg);
        let _ = body.style().set_property("color", fg);
    }
}

/// Fire-and-forget clipboard write.
pub fn clipboard_write(text: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.navigator().clipboard().write_text(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    #[test]
    fn test_console_logger_passes_warnings_and_drops_noise() {
        let warn = log::Metadata::builder().level(log::Level::Warn).build();
        let info = log::Metadata::builder().level(log::Level::Info).build();
        let debug = log::Metadata::builder().level(log::Level::Debug).build();
        assert!(LOGGER.enabled(&warn));
        assert!(LOGGER.enabled(&info));
        assert!(!LOGGER.enabled(&debug));
    }
}
