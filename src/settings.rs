use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::inputs::InputAdapter;
use crate::reader::{
    DEFAULT_BLANK_FILL, DEFAULT_CACHE_SIZE, DEFAULT_SINGLE_PAGE_MAX_WIDTH, ScalePlanner,
    ViewerOptions,
};

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "koma";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read or write {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid colour {0:?}, expected six hex digits")]
    InvalidColor(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Pixel budget for one rendered page
    #[serde(default = "default_max_pixels")]
    pub max_pixels: u64,

    #[serde(default = "default_base_scale")]
    pub base_scale: f32,

    #[serde(default = "default_shrink_factor")]
    pub shrink_factor: f32,

    /// Viewports this wide or narrower show one page
    #[serde(default = "default_single_page_max_width")]
    pub single_page_max_width: u32,

    #[serde(default = "default_swipe_threshold")]
    pub swipe_threshold_px: f32,

    /// Hex RGB, with or without a leading '#'
    #[serde(default = "default_blank_fill")]
    pub blank_fill: String,

    #[serde(default = "default_page_cache_size")]
    pub page_cache_size: usize,

    /// Pixels per terminal column, used to turn columns into viewport pixels
    #[serde(default = "default_cell_width")]
    pub cell_width_px: u32,

    #[serde(default)]
    pub start_with_blank_padding: bool,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_max_pixels() -> u64 {
    ScalePlanner::DEFAULT_MAX_PIXELS as u64
}

fn default_base_scale() -> f32 {
    ScalePlanner::DEFAULT_BASE_SCALE
}

fn default_shrink_factor() -> f32 {
    ScalePlanner::DEFAULT_SHRINK_FACTOR
}

fn default_single_page_max_width() -> u32 {
    DEFAULT_SINGLE_PAGE_MAX_WIDTH
}

fn default_swipe_threshold() -> f32 {
    crate::inputs::DEFAULT_SWIPE_THRESHOLD_PX
}

fn default_blank_fill() -> String {
    let [r, g, b] = DEFAULT_BLANK_FILL;
    format!("{r:02x}{g:02x}{b:02x}")
}

fn default_page_cache_size() -> usize {
    DEFAULT_CACHE_SIZE
}

fn default_cell_width() -> u32 {
    8
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            max_pixels: default_max_pixels(),
            base_scale: default_base_scale(),
            shrink_factor: default_shrink_factor(),
            single_page_max_width: default_single_page_max_width(),
            swipe_threshold_px: default_swipe_threshold(),
            blank_fill: default_blank_fill(),
            page_cache_size: default_page_cache_size(),
            cell_width_px: default_cell_width(),
            start_with_blank_padding: false,
        }
    }
}

impl Settings {
    pub fn blank_fill_rgb(&self) -> Result<[u8; 3], SettingsError> {
        parse_hex_rgb(&self.blank_fill)
    }

    /// Viewer tunables for a viewport `viewport_width` pixels wide
    pub fn to_options(&self, viewport_width: u32) -> ViewerOptions {
        let blank_fill = self.blank_fill_rgb().unwrap_or_else(|e| {
            warn!("{e}; using the default blank fill");
            DEFAULT_BLANK_FILL
        });

        ViewerOptions {
            planner: ScalePlanner::new(self.base_scale, self.shrink_factor, self.max_pixels as f64),
            single_page_max_width: self.single_page_max_width,
            viewport_width,
            cache_size: self.page_cache_size,
            blank_fill,
            start_with_blank_padding: self.start_with_blank_padding,
        }
    }

    pub fn input_adapter(&self) -> InputAdapter {
        InputAdapter::new(self.swipe_threshold_px, self.cell_width_px)
    }
}

fn parse_hex_rgb(value: &str) -> Result<[u8; 3], SettingsError> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(SettingsError::InvalidColor(value.to_string()));
    }

    let mut rgb = [0u8; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        *channel = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|_| SettingsError::InvalidColor(value.to_string()))?;
    }
    Ok(rgb)
}

pub fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

/// Load settings from `path_override` or the default location.
///
/// A missing file is created with defaults. Unreadable or invalid files are
/// logged and defaults are used.
pub fn load_settings(path_override: Option<&Path>) -> Settings {
    let path = match path_override {
        Some(path) => path.to_path_buf(),
        None => match preferred_config_path() {
            Some(path) => path,
            None => {
                warn!("Could not determine config directory, using default settings");
                return Settings::default();
            }
        },
    };

    if !path.exists() {
        info!("Settings file not found, creating with defaults at {path:?}");
        let settings = Settings::default();
        if let Err(e) = save_settings_to_file(&settings, &path) {
            error!("{e}");
        }
        return settings;
    }

    match load_settings_from_path(&path) {
        Ok(settings) => settings,
        Err(e) => {
            error!("{e}");
            Settings::default()
        }
    }
}

pub fn load_settings_from_path(path: &Path) -> Result<Settings, SettingsError> {
    let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut settings =
        serde_yaml::from_str::<Settings>(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Loaded settings from {path:?}");

    if settings.version < CURRENT_VERSION {
        migrate_settings(&mut settings);
        if let Err(e) = save_settings_to_file(&settings, path) {
            error!("{e}");
        }
    }

    Ok(settings)
}

fn migrate_settings(settings: &mut Settings) {
    info!(
        "Migrating settings from v{} to v{}",
        settings.version, CURRENT_VERSION
    );

    // Version 0 files predate the version field; every field has a default
    settings.version = CURRENT_VERSION;
}

pub fn save_settings_to_file(settings: &Settings, path: &Path) -> Result<(), SettingsError> {
    let io_error = |source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
    }

    fs::write(path, generate_settings_yaml(settings)).map_err(io_error)?;
    debug!("Saved settings to {path:?}");
    Ok(())
}

fn generate_settings_yaml(settings: &Settings) -> String {
    let mut content = String::new();

    content.push_str(SETTINGS_HEADER);
    content.push_str(&format!("version: {}\n", settings.version));
    content.push_str(&format!("max_pixels: {}\n", settings.max_pixels));
    content.push_str(&format!("base_scale: {:?}\n", settings.base_scale));
    content.push_str(&format!("shrink_factor: {:?}\n", settings.shrink_factor));
    content.push_str(&format!(
        "single_page_max_width: {}\n",
        settings.single_page_max_width
    ));
    content.push_str(&format!(
        "swipe_threshold_px: {:?}\n",
        settings.swipe_threshold_px
    ));
    content.push_str(&format!("blank_fill: \"{}\"\n", settings.blank_fill));
    content.push_str(&format!("page_cache_size: {}\n", settings.page_cache_size));
    content.push_str(&format!("cell_width_px: {}\n", settings.cell_width_px));
    content.push_str(&format!(
        "start_with_blank_padding: {}\n",
        settings.start_with_blank_padding
    ));

    content
}

const SETTINGS_HEADER: &str = r#"# ============================================================================
# koma settings
# ============================================================================
# max_pixels:               pixel budget per rendered page; the render scale
#                           starts at base_scale and shrinks by shrink_factor
#                           until a page fits
# single_page_max_width:    viewports this wide (pixels) or narrower show
#                           one page at a time
# swipe_threshold_px:       horizontal drag distance that turns a page
# blank_fill:               colour of the padding page, hex RGB
# cell_width_px:            pixels per terminal column

"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_reader_constants() {
        let settings = Settings::default();
        assert_eq!(settings.max_pixels, 2_000_000);
        assert_eq!(settings.single_page_max_width, 768);
        assert_eq!(settings.swipe_threshold_px, 50.0);
        assert_eq!(settings.blank_fill_rgb().unwrap(), [0x34, 0x35, 0x37]);

        let options = settings.to_options(1024);
        assert_eq!(options, ViewerOptions::default());
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let settings = load_settings(Some(&path));
        assert_eq!(settings, Settings::default());
        assert!(path.exists());

        let reloaded = load_settings_from_path(&path).unwrap();
        assert_eq!(reloaded, Settings::default());
    }

    #[test]
    fn partial_file_fills_in_defaults_and_migrates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "version: 0\nsingle_page_max_width: 900\nblank_fill: \"#102030\"\n")
            .unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.version, CURRENT_VERSION);
        assert_eq!(settings.single_page_max_width, 900);
        assert_eq!(settings.page_cache_size, DEFAULT_CACHE_SIZE);
        assert_eq!(settings.blank_fill_rgb().unwrap(), [0x10, 0x20, 0x30]);

        // Migration rewrites the file
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains(&format!("version: {CURRENT_VERSION}")));
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "max_pixels: [not, a, number]\n").unwrap();

        assert!(matches!(
            load_settings_from_path(&path),
            Err(SettingsError::Parse { .. })
        ));
        assert_eq!(load_settings(Some(&path)), Settings::default());
    }

    #[test]
    fn bad_blank_fill_uses_default_colour() {
        let settings = Settings {
            blank_fill: "zz0000".to_string(),
            ..Settings::default()
        };
        assert!(matches!(
            settings.blank_fill_rgb(),
            Err(SettingsError::InvalidColor(_))
        ));
        assert_eq!(settings.to_options(800).blank_fill, DEFAULT_BLANK_FILL);
        assert!(parse_hex_rgb("12345").is_err());
    }

    #[test]
    fn zero_pixel_budget_uses_default() {
        let settings = Settings {
            max_pixels: 0,
            ..Settings::default()
        };
        assert_eq!(
            settings.to_options(1024).planner.max_pixels,
            ScalePlanner::DEFAULT_MAX_PIXELS
        );
    }
}
