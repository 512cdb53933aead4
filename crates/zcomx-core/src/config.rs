use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::book::ImageSize;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub reader: ReaderConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub keymap: KeymapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log file lives here)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Reading presentation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReaderMode {
    /// One page at a time, sized to the viewport
    #[default]
    Slider,
    /// All pages in one continuous vertical column
    Scroller,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Presentation used when none is given on the command line
    #[serde(default)]
    pub mode: ReaderMode,
    /// Wrap around when stepping past the first or last page
    #[serde(default)]
    pub rotate: bool,
    /// Page shown on mount (0-based)
    #[serde(default)]
    pub start_page: usize,
    /// Pixels subtracted from the viewport height for the slider container
    #[serde(default = "default_container_buffer")]
    pub container_buffer_px: u32,
    /// Minimum height of the indicia page container
    #[serde(default = "default_indicia_min_height")]
    pub indicia_min_height_px: u32,
    /// Distance of the scroller's reference line below the scroll top
    #[serde(default = "default_overlay_reference")]
    pub overlay_reference_px: u32,
    /// Vertical gap between pages in the scroller
    #[serde(default = "default_page_spacing")]
    pub page_spacing_px: u32,
    /// Delay before the controls overlay fades out
    #[serde(default = "default_controls_hide_delay")]
    pub controls_hide_delay_ms: u64,
    /// Quiet period before a resize is applied
    #[serde(default = "default_resize_debounce")]
    pub resize_debounce_ms: u64,
    /// Tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            mode: ReaderMode::default(),
            rotate: false,
            start_page: 0,
            container_buffer_px: default_container_buffer(),
            indicia_min_height_px: default_indicia_min_height(),
            overlay_reference_px: default_overlay_reference(),
            page_spacing_px: default_page_spacing(),
            controls_hide_delay_ms: default_controls_hide_delay(),
            resize_debounce_ms: default_resize_debounce(),
            tick_rate_ms: default_tick_rate(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Site serving `/images/download/{id}`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Requested rendition
    #[serde(default)]
    pub image_size: ImageSize,
    /// Attempts per image before it is abandoned
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed delay between attempts
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            image_size: ImageSize::default(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay(),
            request_timeout_secs: default_timeout(),
        }
    }
}

/// Easing curve for smooth scrolling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EasingType {
    None,
    Linear,
    #[default]
    Cubic,
    Quintic,
    EaseOut,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Animate scroller jumps instead of snapping
    #[serde(default = "default_true")]
    pub smooth_enabled: bool,
    /// Animation duration in milliseconds
    #[serde(default = "default_animation_duration")]
    pub animation_duration_ms: u64,
    #[serde(default)]
    pub easing: EasingType,
    /// Frame rate while an animation is running
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
    /// Pixels moved per wheel notch or arrow press
    #[serde(default = "default_scroll_step")]
    pub scroll_step_px: u32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            smooth_enabled: default_true(),
            animation_duration_ms: default_animation_duration(),
            easing: EasingType::default(),
            animation_fps: default_animation_fps(),
            scroll_step_px: default_scroll_step(),
        }
    }
}

/// Keymap configuration using Vim-style notation
/// Format: "l", "<C-f>" (Ctrl+f), "<S-g>" (Shift+g), "<CR>" (Enter), "<Esc>", "<Space>"
///
/// Arrow keys, Page Up/Down and Home/End are always bound in addition to these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeymapConfig {
    #[serde(default = "default_key_next_page")]
    pub next_page: String,
    #[serde(default = "default_key_prev_page")]
    pub prev_page: String,
    #[serde(default = "default_key_first_page")]
    pub first_page: String,
    #[serde(default = "default_key_last_page")]
    pub last_page: String,
    /// Open the page-number box
    #[serde(default = "default_key_goto_page")]
    pub goto_page: String,
    /// Scroller: move down/up by one scroll step
    #[serde(default = "default_key_scroll_down")]
    pub scroll_down: String,
    #[serde(default = "default_key_scroll_up")]
    pub scroll_up: String,
    /// Switch between slider and scroller
    #[serde(default = "default_key_toggle_mode")]
    pub toggle_mode: String,
    #[serde(default = "default_key_help")]
    pub help: String,
    /// Close the reader
    #[serde(default = "default_key_close")]
    pub close: String,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self {
            next_page: default_key_next_page(),
            prev_page: default_key_prev_page(),
            first_page: default_key_first_page(),
            last_page: default_key_last_page(),
            goto_page: default_key_goto_page(),
            scroll_down: default_key_scroll_down(),
            scroll_up: default_key_scroll_up(),
            toggle_mode: default_key_toggle_mode(),
            help: default_key_help(),
            close: default_key_close(),
        }
    }
}

fn default_key_next_page() -> String { "l".to_string() }
fn default_key_prev_page() -> String { "h".to_string() }
fn default_key_first_page() -> String { "gg".to_string() }
fn default_key_last_page() -> String { "G".to_string() }
fn default_key_goto_page() -> String { ":".to_string() }
fn default_key_scroll_down() -> String { "j".to_string() }
fn default_key_scroll_up() -> String { "k".to_string() }
fn default_key_toggle_mode() -> String { "m".to_string() }
fn default_key_help() -> String { "?".to_string() }
fn default_key_close() -> String { "q".to_string() }

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("zcomx")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_container_buffer() -> u32 {
    10
}

fn default_indicia_min_height() -> u32 {
    400
}

fn default_overlay_reference() -> u32 {
    60 // height of the top controls bar
}

fn default_page_spacing() -> u32 {
    16
}

fn default_controls_hide_delay() -> u64 {
    2500
}

fn default_resize_debounce() -> u64 {
    250
}

fn default_tick_rate() -> u64 {
    100
}

fn default_base_url() -> String {
    "https://zco.mx".to_string()
}

fn default_max_attempts() -> u32 {
    5
}

fn default_retry_delay() -> u64 {
    2000
}

fn default_timeout() -> u64 {
    30
}

fn default_animation_duration() -> u64 {
    150
}

fn default_animation_fps() -> u32 {
    60
}

fn default_scroll_step() -> u32 {
    80
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML document
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/zcomx/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("zcomx")
            .join("config.toml")
    }

    /// Get the log file path
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("zcomx.log")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.reader.mode, ReaderMode::Slider);
        assert!(!config.reader.rotate);
        assert_eq!(config.reader.container_buffer_px, 10);
        assert_eq!(config.loader.max_attempts, 5);
        assert_eq!(config.loader.retry_delay_ms, 2000);
        assert_eq!(config.loader.image_size, ImageSize::Web);
        assert_eq!(config.scroll.easing, EasingType::Cubic);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [reader]
            mode = "scroller"
            rotate = true

            [loader]
            image_size = "print"
            "#,
        )
        .unwrap();

        assert_eq!(config.reader.mode, ReaderMode::Scroller);
        assert!(config.reader.rotate);
        assert_eq!(config.reader.controls_hide_delay_ms, 2500);
        assert_eq!(config.loader.image_size, ImageSize::Print);
        assert_eq!(config.loader.base_url, "https://zco.mx");
        assert_eq!(config.keymap.next_page, "l");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml("[reader]\nmode = \"carousel\"").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_expand_tilde() {
        let plain = std::path::Path::new("/var/lib/zcomx");
        assert_eq!(expand_tilde(plain), PathBuf::from("/var/lib/zcomx"));

        if let Some(home) = dirs::home_dir() {
            let expanded = expand_tilde(std::path::Path::new("~/zcomx"));
            assert_eq!(expanded, home.join("zcomx"));
        }
    }
}
