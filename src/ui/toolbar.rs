//! Toolbar UI component for Tandem
//!
//! A single icon-based strip above the split view with controls for scroll
//! sync, the sync axes and mapping mode, word wrap, and the theme.

use eframe::egui::{self, Color32, Response, RichText, Ui, Vec2};

use crate::config::Settings;

/// Height of the toolbar.
const TOOLBAR_HEIGHT: f32 = 36.0;

/// Size of icon buttons.
const ICON_BUTTON_SIZE: Vec2 = Vec2::new(32.0, 28.0);

/// Actions that can be triggered from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolbarAction {
    /// Toggle sync scrolling between the two panes
    ToggleSyncScroll,
    /// Toggle syncing of the vertical axis
    ToggleVertical,
    /// Toggle syncing of the horizontal axis
    ToggleHorizontal,
    /// Toggle proportional mapping (percent of range vs raw offset)
    ToggleProportional,
    /// Toggle word wrap in the editor pane
    ToggleWordWrap,
    /// Cycle through themes
    CycleTheme,
}

/// Toolbar rendering. Stateless; everything shown comes from [`Settings`].
pub struct Toolbar;

impl Toolbar {
    /// The toolbar's fixed height, for panel sizing.
    pub fn height() -> f32 {
        TOOLBAR_HEIGHT
    }

    /// Render the toolbar and return any triggered action.
    ///
    /// `sync_active` is whether a sync session is actually running, as
    /// opposed to merely enabled in the settings.
    pub fn show(ui: &mut Ui, settings: &Settings, sync_active: bool) -> Option<ToolbarAction> {
        let mut action: Option<ToolbarAction> = None;
        let is_dark = ui.visuals().dark_mode;

        let toolbar_bg = if is_dark {
            Color32::from_rgb(40, 40, 40)
        } else {
            Color32::from_rgb(248, 248, 248)
        };

        let separator_color = if is_dark {
            Color32::from_rgb(70, 70, 70)
        } else {
            Color32::from_rgb(210, 210, 210)
        };

        // Set toolbar background
        ui.painter()
            .rect_filled(ui.available_rect_before_wrap(), 0.0, toolbar_bg);

        ui.horizontal(|ui| {
            ui.set_height(TOOLBAR_HEIGHT);
            ui.spacing_mut().item_spacing.x = 2.0;

            // ═══════════════════════════════════════════════════════════════════
            // Sync Group
            // ═══════════════════════════════════════════════════════════════════
            ui.add_space(4.0);
            ui.label(
                RichText::new("Sync")
                    .size(10.0)
                    .color(ui.visuals().weak_text_color()),
            );

            let sync_icon = if settings.sync_enabled { "🔗" } else { "⛓" };
            let sync_tooltip = if settings.sync_enabled {
                "Disable Sync Scroll"
            } else {
                "Enable Sync Scroll"
            };
            if icon_button(ui, sync_icon, sync_tooltip, true, is_dark).clicked() {
                action = Some(ToolbarAction::ToggleSyncScroll);
            }

            // Axis and mode toggles apply to the running session, so they
            // are inert while sync is off.
            if toggle_button(
                ui,
                "↕",
                "Sync Vertical Scrolling",
                settings.sync_enabled,
                settings.sync_vertical,
                is_dark,
            )
            .clicked()
            {
                action = Some(ToolbarAction::ToggleVertical);
            }

            if toggle_button(
                ui,
                "↔",
                "Sync Horizontal Scrolling",
                settings.sync_enabled,
                settings.sync_horizontal,
                is_dark,
            )
            .clicked()
            {
                action = Some(ToolbarAction::ToggleHorizontal);
            }

            if toggle_button(
                ui,
                "%",
                "Proportional Mapping (match scroll percentage, not raw offset)",
                settings.sync_enabled,
                settings.sync_proportional,
                is_dark,
            )
            .clicked()
            {
                action = Some(ToolbarAction::ToggleProportional);
            }

            ui.add_space(4.0);
            vertical_separator(ui, separator_color, TOOLBAR_HEIGHT - 8.0);
            ui.add_space(4.0);

            // ═══════════════════════════════════════════════════════════════════
            // View Group
            // ═══════════════════════════════════════════════════════════════════
            ui.label(
                RichText::new("View")
                    .size(10.0)
                    .color(ui.visuals().weak_text_color()),
            );

            if toggle_button(
                ui,
                "¶",
                "Word Wrap",
                true,
                settings.word_wrap,
                is_dark,
            )
            .clicked()
            {
                action = Some(ToolbarAction::ToggleWordWrap);
            }

            if icon_button(ui, "🎨", "Change Theme", true, is_dark).clicked() {
                action = Some(ToolbarAction::CycleTheme);
            }

            // ═══════════════════════════════════════════════════════════════════
            // Status (right-aligned)
            // ═══════════════════════════════════════════════════════════════════
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.add_space(8.0);
                let status = if sync_active {
                    "sync on"
                } else if settings.sync_enabled {
                    "sync idle"
                } else {
                    "sync off"
                };
                ui.label(
                    RichText::new(status)
                        .size(10.0)
                        .color(ui.visuals().weak_text_color()),
                );
            });
        });

        // Draw bottom border
        let rect = ui.min_rect();
        ui.painter().line_segment(
            [
                egui::pos2(rect.min.x, rect.max.y),
                egui::pos2(rect.max.x, rect.max.y),
            ],
            egui::Stroke::new(1.0, separator_color),
        );

        action
    }
}

/// Render an icon button with consistent styling.
fn icon_button(ui: &mut Ui, icon: &str, tooltip: &str, enabled: bool, is_dark: bool) -> Response {
    let text_color = if enabled {
        if is_dark {
            Color32::from_rgb(220, 220, 220)
        } else {
            Color32::from_rgb(50, 50, 50)
        }
    } else if is_dark {
        Color32::from_rgb(100, 100, 100)
    } else {
        Color32::from_rgb(160, 160, 160)
    };

    let hover_bg = if is_dark {
        Color32::from_rgb(60, 60, 60)
    } else {
        Color32::from_rgb(220, 220, 220)
    };

    // Use an invisible button as the clickable area
    let btn = ui.add_enabled(
        enabled,
        egui::Button::new(RichText::new(" ").size(16.0)) // Empty space for sizing
            .frame(false)
            .min_size(ICON_BUTTON_SIZE),
    );

    // Draw hover background if hovered
    if btn.hovered() && enabled {
        ui.painter()
            .rect_filled(btn.rect, egui::Rounding::same(3.0), hover_bg);
    }

    // Always draw the icon text centered in the button rect for consistent alignment
    ui.painter().text(
        btn.rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(16.0),
        text_color,
    );

    btn.on_hover_text(tooltip)
}

/// Render a toggle button with active state highlighting.
fn toggle_button(
    ui: &mut Ui,
    icon: &str,
    tooltip: &str,
    enabled: bool,
    active: bool,
    is_dark: bool,
) -> Response {
    let text_color = if enabled {
        if is_dark {
            Color32::from_rgb(220, 220, 220)
        } else {
            Color32::from_rgb(50, 50, 50)
        }
    } else if is_dark {
        Color32::from_rgb(100, 100, 100)
    } else {
        Color32::from_rgb(160, 160, 160)
    };

    let active_bg = if is_dark {
        Color32::from_rgb(70, 90, 120) // Blue-ish highlight for dark mode
    } else {
        Color32::from_rgb(200, 220, 240) // Light blue for light mode
    };

    let hover_bg = if is_dark {
        Color32::from_rgb(60, 60, 60)
    } else {
        Color32::from_rgb(220, 220, 220)
    };

    let btn = ui.add_enabled(
        enabled,
        egui::Button::new(RichText::new(icon).size(14.0).color(text_color))
            .frame(false)
            .min_size(Vec2::new(26.0, 24.0)),
    );

    // Draw active or hover background, then redraw the icon on top
    if (active && enabled) || (btn.hovered() && enabled) {
        let bg = if active && enabled { active_bg } else { hover_bg };
        ui.painter()
            .rect_filled(btn.rect, egui::Rounding::same(3.0), bg);
        ui.painter().text(
            btn.rect.center(),
            egui::Align2::CENTER_CENTER,
            icon,
            egui::FontId::proportional(14.0),
            text_color,
        );
    }

    btn.on_hover_text(tooltip)
}

/// Draw a vertical separator line.
fn vertical_separator(ui: &mut Ui, color: Color32, height: f32) {
    let (rect, _response) = ui.allocate_exact_size(Vec2::new(1.0, height), egui::Sense::hover());
    ui.painter().line_segment(
        [rect.center_top(), rect.center_bottom()],
        egui::Stroke::new(1.0, color),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolbar_height() {
        assert_eq!(Toolbar::height(), TOOLBAR_HEIGHT);
    }

    #[test]
    fn test_toolbar_action_equality() {
        assert_eq!(
            ToolbarAction::ToggleSyncScroll,
            ToolbarAction::ToggleSyncScroll
        );
        assert_ne!(ToolbarAction::ToggleVertical, ToolbarAction::ToggleHorizontal);
    }
}
