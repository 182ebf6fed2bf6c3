//! User settings and preferences for Tandem
//!
//! This module defines the `Settings` struct that holds all user-configurable
//! options, with serde support for JSON persistence.

use serde::{Deserialize, Serialize};

use crate::sync::SyncConfig;

// ─────────────────────────────────────────────────────────────────────────────
// Theme Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Available color themes for the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    System,
}

impl Theme {
    /// The next theme in the cycle.
    pub fn cycle(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::System,
            Theme::System => Theme::Light,
        }
    }

    /// Get a display label for the theme.
    pub fn label(&self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
            Theme::System => "System",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Window Size Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Window dimensions and position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSize {
    /// Window width in pixels
    pub width: f32,
    /// Window height in pixels
    pub height: f32,
    /// Window X position (optional, for restoring position)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    /// Window Y position (optional, for restoring position)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    /// Whether the window was maximized
    #[serde(default)]
    pub maximized: bool,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 1100.0,
            height: 760.0,
            x: None,
            y: None,
            maximized: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// User preferences and application settings.
///
/// This struct is serialized to JSON and persisted to the user's config directory.
/// All fields have sensible defaults via the `Default` trait and `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Appearance
    // ─────────────────────────────────────────────────────────────────────────
    /// Color theme (light, dark, or system)
    pub theme: Theme,

    /// Font size for both panes (in points)
    pub font_size: f32,

    // ─────────────────────────────────────────────────────────────────────────
    // Editor Behavior
    // ─────────────────────────────────────────────────────────────────────────
    /// Whether to enable word wrap in the editor pane
    pub word_wrap: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // Window State
    // ─────────────────────────────────────────────────────────────────────────
    /// Window size and position
    pub window_size: WindowSize,

    /// Split ratio for the editor/preview panes (fraction given to the editor)
    pub split_ratio: f32,

    // ─────────────────────────────────────────────────────────────────────────
    // Sync Scrolling
    // ─────────────────────────────────────────────────────────────────────────
    /// Whether synchronized scrolling between the panes is enabled
    pub sync_enabled: bool,

    /// Whether the vertical axis is synchronized
    pub sync_vertical: bool,

    /// Whether the horizontal axis is synchronized
    pub sync_horizontal: bool,

    /// Whether offsets are mapped proportionally (percent of each pane's
    /// range) rather than copied verbatim
    pub sync_proportional: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Appearance
            theme: Theme::default(),
            font_size: 14.0,

            // Editor Behavior
            word_wrap: true,

            // Window State
            window_size: WindowSize::default(),
            split_ratio: 0.5,

            // Sync Scrolling
            sync_enabled: true,
            sync_vertical: true,
            sync_horizontal: true,
            sync_proportional: true,
        }
    }
}

impl Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Validation Constants and Sanitization
    // ─────────────────────────────────────────────────────────────────────────

    /// Minimum allowed font size.
    pub const MIN_FONT_SIZE: f32 = 8.0;
    /// Maximum allowed font size.
    pub const MAX_FONT_SIZE: f32 = 72.0;
    /// Minimum split ratio, so neither pane collapses entirely.
    pub const MIN_SPLIT_RATIO: f32 = 0.1;
    /// Maximum split ratio.
    pub const MAX_SPLIT_RATIO: f32 = 0.9;
    /// Minimum window dimension.
    pub const MIN_WINDOW_SIZE: f32 = 200.0;
    /// Maximum window dimension.
    pub const MAX_WINDOW_SIZE: f32 = 10000.0;

    /// Sanitize settings by clamping values to valid ranges.
    ///
    /// This is useful after loading settings from a file that might have
    /// been manually edited with invalid values.
    pub fn sanitize(&mut self) {
        // Clamp font size
        self.font_size = self
            .font_size
            .clamp(Self::MIN_FONT_SIZE, Self::MAX_FONT_SIZE);

        // Clamp window size
        self.window_size.width = self
            .window_size
            .width
            .clamp(Self::MIN_WINDOW_SIZE, Self::MAX_WINDOW_SIZE);
        self.window_size.height = self
            .window_size
            .height
            .clamp(Self::MIN_WINDOW_SIZE, Self::MAX_WINDOW_SIZE);

        // Clamp split ratio
        self.split_ratio = self
            .split_ratio
            .clamp(Self::MIN_SPLIT_RATIO, Self::MAX_SPLIT_RATIO);
    }

    /// Load settings and sanitize them to ensure validity.
    ///
    /// This is a convenience method that deserializes and then sanitizes.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// The sync configuration these settings describe.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            vertical: self.sync_vertical,
            horizontal: self.sync_horizontal,
            proportional: self.sync_proportional,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
