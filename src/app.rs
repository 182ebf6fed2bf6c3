//! Main application module for Tandem
//!
//! This module implements the eframe App trait for the main application.
//! Each egui frame doubles as one sync turn: deferred work queued during the
//! previous frame runs first, completed renders are applied, and only then
//! are the toolbar and the two panes laid out.

use std::rc::Rc;

use eframe::egui;
use log::{debug, info, warn};

use crate::config::{save_config_silent, Settings, Theme, WindowSize};
use crate::editor::{EditorPane, EditorView};
use crate::preview::PreviewPane;
use crate::sync::FrameDeferrer;
use crate::ui::{Toolbar, ToolbarAction};

/// Seed document shown on launch.
const STARTER_TEXT: &str = "\
# Tandem

Markdown typed on the left is rendered on the right.

- Scroll either pane and the other follows.
- Use the toolbar to unlink the panes, gate an axis, or switch between
  proportional and direct offset mapping.
";

/// The main application struct that holds all state and implements eframe::App.
pub struct TandemApp {
    /// User settings (loaded from config)
    settings: Settings,
    /// Whether settings have been modified and need saving
    settings_dirty: bool,
    /// Shared state behind the editor and preview panes
    view: EditorView,
    /// Runs jobs deferred to the next frame
    deferrals: Rc<FrameDeferrer>,
    /// Last known window size (for detecting changes)
    last_window_size: Option<egui::Vec2>,
    /// Last known window position (for detecting changes)
    last_window_pos: Option<egui::Pos2>,
}

impl TandemApp {
    /// Create a new TandemApp instance and apply the saved theme preference.
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings) -> Self {
        info!("Initializing Tandem");

        let app = Self::with_settings(settings);
        app.apply_theme(&cc.egui_ctx);
        info!("Applied initial theme: {:?}", app.settings.theme);

        app
    }

    /// Build the application state without touching an egui context.
    fn with_settings(settings: Settings) -> Self {
        let deferrals = Rc::new(FrameDeferrer::new());

        let mut view = EditorView::with_markdown_renderer(deferrals.clone());
        view.set_text(STARTER_TEXT);
        view.set_sync_config(settings.sync_config());
        view.set_sync_enabled(settings.sync_enabled);

        Self {
            settings,
            settings_dirty: false,
            view,
            deferrals,
            last_window_size: None,
            last_window_pos: None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Window State
    // ─────────────────────────────────────────────────────────────────────────

    /// Update window size in settings if changed.
    ///
    /// Returns `true` if the window state was updated.
    fn update_window_state(&mut self, ctx: &egui::Context) -> bool {
        let mut changed = false;

        ctx.input(|i| {
            if let Some(rect) = i.viewport().outer_rect {
                let current_size = rect.size();
                let current_pos = rect.min;

                let size_changed = self
                    .last_window_size
                    .map(|s| (s - current_size).length() > 1.0)
                    .unwrap_or(true);

                let pos_changed = self
                    .last_window_pos
                    .map(|p| (p - current_pos).length() > 1.0)
                    .unwrap_or(true);

                if size_changed || pos_changed {
                    self.last_window_size = Some(current_size);
                    self.last_window_pos = Some(current_pos);
                    changed = true;
                }
            }
        });

        if changed {
            if let (Some(size), Some(pos)) = (self.last_window_size, self.last_window_pos) {
                let maximized = ctx.input(|i| i.viewport().maximized.unwrap_or(false));

                self.settings.window_size = WindowSize {
                    width: size.x,
                    height: size.y,
                    x: Some(pos.x),
                    y: Some(pos.y),
                    maximized,
                };
                self.settings_dirty = true;

                debug!(
                    "Window state updated: {}x{} at ({}, {}), maximized: {}",
                    size.x, size.y, pos.x, pos.y, maximized
                );
            }
        }

        changed
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Theme
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply the configured theme to the egui context.
    ///
    /// System follows whatever visuals the platform handed us at startup.
    fn apply_theme(&self, ctx: &egui::Context) {
        let visuals = match self.settings.theme {
            Theme::Light => egui::Visuals::light(),
            Theme::Dark => egui::Visuals::dark(),
            Theme::System => {
                if ctx.style().visuals.dark_mode {
                    egui::Visuals::dark()
                } else {
                    egui::Visuals::light()
                }
            }
        };
        ctx.set_visuals(visuals);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Toolbar Actions
    // ─────────────────────────────────────────────────────────────────────────

    fn handle_toolbar_action(&mut self, action: ToolbarAction, ctx: &egui::Context) {
        match action {
            ToolbarAction::ToggleSyncScroll => {
                debug!("Toolbar: Toggle sync scroll");
                self.settings.sync_enabled = !self.settings.sync_enabled;
                self.view.set_sync_enabled(self.settings.sync_enabled);
                self.settings_dirty = true;

                info!(
                    "Sync scrolling {}",
                    if self.settings.sync_enabled {
                        "enabled"
                    } else {
                        "disabled"
                    }
                );
            }
            ToolbarAction::ToggleVertical => {
                debug!("Toolbar: Toggle vertical sync");
                self.settings.sync_vertical = !self.settings.sync_vertical;
                self.apply_sync_config();
            }
            ToolbarAction::ToggleHorizontal => {
                debug!("Toolbar: Toggle horizontal sync");
                self.settings.sync_horizontal = !self.settings.sync_horizontal;
                self.apply_sync_config();
            }
            ToolbarAction::ToggleProportional => {
                debug!("Toolbar: Toggle proportional mapping");
                self.settings.sync_proportional = !self.settings.sync_proportional;
                self.apply_sync_config();
            }
            ToolbarAction::ToggleWordWrap => {
                debug!("Toolbar: Toggle word wrap");
                self.settings.word_wrap = !self.settings.word_wrap;
                self.settings_dirty = true;
            }
            ToolbarAction::CycleTheme => {
                debug!("Toolbar: Cycle theme");
                self.settings.theme = self.settings.theme.cycle();
                self.apply_theme(ctx);
                self.settings_dirty = true;
                info!("Theme changed to {}", self.settings.theme.label());
            }
        }
    }

    /// Push the settings' sync configuration into the running session.
    fn apply_sync_config(&mut self) {
        self.view.set_sync_config(self.settings.sync_config());
        self.settings_dirty = true;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Settings Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Save settings to the config file if modified.
    ///
    /// Returns `true` if settings were saved.
    fn save_settings_if_dirty(&mut self) -> bool {
        if self.settings_dirty {
            if save_config_silent(&self.settings) {
                self.settings_dirty = false;
                info!("Settings saved");
                return true;
            }
            warn!("Failed to save settings");
        }
        false
    }
}

impl eframe::App for TandemApp {
    /// Called each time the UI needs repainting.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Start of a new turn: release sync guards and anything else that
        // was deferred during the previous frame.
        self.deferrals.run_pending();

        // Apply completed renders so the panes below draw current markup.
        if self.view.poll_renders() {
            debug!("Preview markup updated");
        }

        // Track window size/position changes for persistence
        self.update_window_state(ctx);

        // Toolbar
        let mut toolbar_action = None;
        egui::TopBottomPanel::top("toolbar")
            .exact_height(Toolbar::height())
            .show(ctx, |ui| {
                let sync_active = self.view.session().is_some_and(|s| s.is_active());
                toolbar_action = Toolbar::show(ui, &self.settings, sync_active);
            });

        // Split view: editor pane on the left, preview fills the rest
        let total_width = ctx.available_rect().width();
        let editor_width = total_width * self.settings.split_ratio;

        let panel = egui::SidePanel::left("editor_panel")
            .resizable(true)
            .default_width(editor_width)
            .min_width(total_width * Settings::MIN_SPLIT_RATIO)
            .max_width(total_width * Settings::MAX_SPLIT_RATIO)
            .show(ctx, |ui| {
                EditorPane::new(&mut self.view)
                    .font_size(self.settings.font_size)
                    .word_wrap(self.settings.word_wrap)
                    .show(ui)
            });

        if panel.inner.changed {
            debug!("Editor content changed ({} bytes)", self.view.text().len());
        }

        // Persist split drags as a ratio of the window width
        let shown_width = panel.response.rect.width();
        if total_width > 0.0 && (shown_width - editor_width).abs() > 1.0 {
            self.settings.split_ratio = (shown_width / total_width)
                .clamp(Settings::MIN_SPLIT_RATIO, Settings::MAX_SPLIT_RATIO);
            self.settings_dirty = true;
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            PreviewPane::new(&self.view)
                .font_size(self.settings.font_size)
                .show(ui);
        });

        if let Some(action) = toolbar_action {
            self.handle_toolbar_action(action, ctx);
        }

        // Keep frames coming while renders, programmatic scrolls, or
        // deferred jobs are outstanding.
        if self.deferrals.pending() > 0 || self.view.needs_frame() {
            ctx.request_repaint();
        }
    }

    /// Called when the application is about to close.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application exiting");
        // Window geometry almost always moved since the last save.
        self.settings_dirty = true;
        self.save_settings_if_dirty();
    }

    /// Save persistent state.
    fn save(&mut self, _storage: &mut dyn eframe::Storage) {
        debug!("Saving application state");
        self.save_settings_if_dirty();
    }

    /// Whether to persist state.
    fn persist_egui_memory(&self) -> bool {
        true
    }

    /// Auto-save interval in seconds.
    fn auto_save_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(30)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use crate::sync::{ScrollOffset, ScrollRange};

    #[test]
    fn test_with_settings_honors_sync_enabled() {
        let settings = Settings {
            sync_enabled: false,
            ..Settings::default()
        };
        let app = TandemApp::with_settings(settings);
        assert!(app.view.session().is_none());

        let app = TandemApp::with_settings(Settings::default());
        assert!(app.view.session().is_some());
    }

    #[test]
    fn test_with_settings_honors_sync_config() {
        let settings = Settings {
            sync_horizontal: false,
            sync_proportional: false,
            ..Settings::default()
        };
        let app = TandemApp::with_settings(settings);

        let config = app.view.sync_config();
        assert!(config.vertical);
        assert!(!config.horizontal);
        assert!(!config.proportional);
    }

    #[test]
    fn test_deferrals_unlock_the_next_sync_turn() {
        let app = TandemApp::with_settings(Settings::default());
        app.view
            .editor_region()
            .set_range(ScrollRange::new(0.0, 100.0));
        app.view
            .preview_region()
            .set_range(ScrollRange::new(0.0, 400.0));

        // A synced scroll parks the guard release on the app's deferrer.
        app.view
            .editor_region()
            .report_scroll(ScrollOffset::new(0.0, 50.0));
        assert_eq!(app.view.preview_region().offset().y, 200.0);
        assert_eq!(app.deferrals.pending(), 1);

        // Until it runs, further scrolls move only their own region.
        app.view
            .editor_region()
            .report_scroll(ScrollOffset::new(0.0, 80.0));
        assert_eq!(app.view.preview_region().offset().y, 200.0);

        // update() drains the deferrer first thing each frame; the session
        // must come back out of it ready to mirror again.
        app.deferrals.run_pending();
        app.view
            .editor_region()
            .report_scroll(ScrollOffset::new(0.0, 25.0));
        assert_eq!(app.view.preview_region().offset().y, 100.0);
    }

    #[test]
    fn test_toggle_sync_scroll_releases_session() {
        let ctx = egui::Context::default();
        let mut app = TandemApp::with_settings(Settings::default());

        app.handle_toolbar_action(ToolbarAction::ToggleSyncScroll, &ctx);
        assert!(!app.settings.sync_enabled);
        assert!(app.view.session().is_none());
        assert!(app.settings_dirty);

        app.handle_toolbar_action(ToolbarAction::ToggleSyncScroll, &ctx);
        assert!(app.settings.sync_enabled);
        assert!(app.view.session().is_some());
    }

    #[test]
    fn test_toggle_axis_rewires_session_config() {
        let ctx = egui::Context::default();
        let mut app = TandemApp::with_settings(Settings::default());

        app.handle_toolbar_action(ToolbarAction::ToggleVertical, &ctx);
        assert!(!app.settings.sync_vertical);
        assert!(!app.view.sync_config().vertical);

        app.handle_toolbar_action(ToolbarAction::ToggleProportional, &ctx);
        assert!(!app.view.sync_config().proportional);

        // The session itself was re-established with the new config.
        let session_config = app.view.session().map(|s| s.config());
        assert_eq!(session_config, Some(app.settings.sync_config()));
    }

    #[test]
    fn test_cycle_theme_marks_settings_dirty() {
        let ctx = egui::Context::default();
        let mut app = TandemApp::with_settings(Settings::default());
        assert!(!app.settings_dirty);

        app.handle_toolbar_action(ToolbarAction::CycleTheme, &ctx);
        assert_eq!(app.settings.theme, Theme::Dark);
        assert!(app.settings_dirty);
    }

    #[test]
    fn test_save_settings_if_dirty_skips_clean_state() {
        let mut app = TandemApp::with_settings(Settings::default());
        assert!(!app.save_settings_if_dirty());
    }
}
