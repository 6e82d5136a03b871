//! Session configuration

use std::path::Path;

use rawscreen_format::PixelFormat;
use serde::{Deserialize, Serialize};

use crate::error::ScreenError;

/// Window title used when the configuration names none
pub const DEFAULT_TITLE: &str = "rawscreen application";

/// Errors while loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading the file failed
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON for [`ScreenConfig`]
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    /// The values parse but cannot describe a frame
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ScreenError),

    /// Upscaling factor of zero
    #[error("invalid configuration: scale must be at least 1")]
    Scale,
}

/// Frame and window parameters of one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ScreenConfig {
    /// Frame width in pixels (non-zero multiple of 32)
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Format of the application's frame
    pub source_format: PixelFormat,
    /// Fail instead of converting when the display runs in another format
    pub require_exact_format: bool,
    /// Window title ([`DEFAULT_TITLE`] when `None`)
    pub title: Option<String>,
    /// Upscaling factor (1 = one window pixel per frame pixel)
    pub scale: u32,
}

impl ScreenConfig {
    /// 640×480 true-color frame, converted if needed
    pub const VGA_RGB888: Self = Self {
        width: 640,
        height: 480,
        source_format: PixelFormat::Rgb888,
        require_exact_format: false,
        title: None,
        scale: 1,
    };

    /// 640×480 grayscale frame, converted if needed
    pub const VGA_GRAY8: Self = Self {
        width: 640,
        height: 480,
        source_format: PixelFormat::Gray8,
        require_exact_format: false,
        title: None,
        scale: 1,
    };

    /// Configuration for a `width` × `height` frame in `source_format`
    pub fn new(width: u32, height: u32, source_format: PixelFormat) -> Self {
        Self {
            width,
            height,
            source_format,
            ..Self::default()
        }
    }

    /// Set the window title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Require the display to run in `source_format`
    pub fn exact(mut self) -> Self {
        self.require_exact_format = true;
        self
    }

    /// Set the upscaling factor
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    /// Title shown by the window manager
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    /// Size in bytes of one source frame, `None` on overflow
    pub fn frame_len(&self) -> Option<usize> {
        self.source_format.frame_len(self.width, self.height)
    }

    /// Check the frame geometry against a source buffer of `source_len` bytes
    ///
    /// Width is checked first so that a bad width is always reported as such.
    pub fn validate(&self, source_len: usize) -> Result<(), ScreenError> {
        if self.width == 0 || self.width % 32 != 0 {
            return Err(ScreenError::InvalidWidth(self.width));
        }
        let expected = self.frame_len();
        if self.height == 0 || expected != Some(source_len) {
            return Err(ScreenError::InvalidFrame {
                width: self.width,
                height: self.height,
                format: self.source_format,
                expected: expected.unwrap_or(0),
                actual: source_len,
            });
        }
        Ok(())
    }

    /// Parse a JSON configuration; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading screen config");
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Geometry checks that do not need a source buffer
    fn check(&self) -> Result<(), ConfigError> {
        if self.scale == 0 {
            return Err(ConfigError::Scale);
        }
        match self.frame_len() {
            Some(len) => self.validate(len).map_err(ConfigError::from),
            None => Err(ConfigError::Invalid(ScreenError::InvalidFrame {
                width: self.width,
                height: self.height,
                format: self.source_format,
                expected: 0,
                actual: 0,
            })),
        }
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self::VGA_RGB888
    }
}
