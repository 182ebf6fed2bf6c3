//! Editor pane widget
//!
//! Wraps egui's TextEdit in a scroll surface that is bridged to the view's
//! editor scroll region: a pending programmatic offset is applied before the
//! text is laid out, and user scrolling is reported back to the region after
//! it. Edits queue a render through the view.

use std::sync::Arc;

use eframe::egui::{self, FontId, ScrollArea, TextEdit, Ui};
use log::debug;

use crate::editor::view::EditorView;
use crate::sync::{ScrollOffset, ScrollRange};

/// Scroll deltas at or below this are layout jitter, not user scrolling.
pub(crate) const SCROLL_JITTER: f32 = 1.0;

/// Result of showing the editor pane.
pub struct EditorPaneOutput {
    /// Whether the text was modified.
    pub changed: bool,
}

/// The raw-text half of the split view.
///
/// # Example
///
/// ```ignore
/// EditorPane::new(&mut view)
///     .font_size(settings.font_size)
///     .word_wrap(settings.word_wrap)
///     .show(ui);
/// ```
pub struct EditorPane<'a> {
    /// The shared view state being edited.
    view: &'a mut EditorView,
    /// Font size for the editor.
    font_size: f32,
    /// Whether word wrap is enabled.
    word_wrap: bool,
}

impl<'a> EditorPane<'a> {
    /// Create an editor pane over the given view.
    pub fn new(view: &'a mut EditorView) -> Self {
        Self {
            view,
            font_size: 14.0,
            word_wrap: true,
        }
    }

    /// Set the font size for the editor.
    #[must_use]
    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// Set whether word wrap is enabled.
    #[must_use]
    pub fn word_wrap(mut self, wrap: bool) -> Self {
        self.word_wrap = wrap;
        self
    }

    /// Show the editor pane and return the output.
    pub fn show(self, ui: &mut Ui) -> EditorPaneOutput {
        let view = self.view;
        let flush = view.editor_region().take_flush();

        // With wrap on the text has no horizontal overflow, so only the
        // vertical axis scrolls.
        let mut scroll_area = if self.word_wrap {
            ScrollArea::vertical()
        } else {
            ScrollArea::both()
        }
        .id_source("editor_pane_scroll")
        .auto_shrink([false, false]);

        if let Some(offset) = flush {
            scroll_area = scroll_area
                .horizontal_scroll_offset(offset.x)
                .vertical_scroll_offset(offset.y);
        }

        // Configure the text layout based on word wrap
        let font_size = self.font_size;
        let word_wrap = self.word_wrap;
        let mut layouter = move |ui: &Ui, text: &str, wrap_width: f32| -> Arc<egui::Galley> {
            let font_id = FontId::monospace(font_size);
            let layout_job = if word_wrap {
                egui::text::LayoutJob::simple(
                    text.to_owned(),
                    font_id,
                    ui.visuals().text_color(),
                    wrap_width,
                )
            } else {
                egui::text::LayoutJob::simple_singleline(
                    text.to_owned(),
                    font_id,
                    ui.visuals().text_color(),
                )
            };
            ui.fonts(|f| f.layout_job(layout_job))
        };

        let scroll_output = scroll_area.show(ui, |ui| {
            TextEdit::multiline(view.text_mut())
                .id(egui::Id::new("editor_pane_text"))
                .frame(false)
                .font(FontId::monospace(font_size))
                .desired_width(f32::INFINITY)
                .layouter(&mut layouter)
                .show(ui)
        });

        let changed = scroll_output.inner.response.changed();
        if changed {
            view.text_edited();
        }

        // Keep the region's scrollable extent in step with the laid-out text,
        // then report user scrolling. The frame a programmatic offset was
        // applied is never reported back, so a flush cannot echo.
        let region = view.editor_region();
        let viewport = scroll_output.inner_rect.size();
        region.set_range(ScrollRange::new(
            scroll_output.content_size.x - viewport.x,
            scroll_output.content_size.y - viewport.y,
        ));

        let seen = ScrollOffset::new(scroll_output.state.offset.x, scroll_output.state.offset.y);
        if flush.is_none() && exceeds_jitter(seen, region.offset()) {
            debug!(
                "Editor pane scrolled: ({}, {}) → ({}, {})",
                region.offset().x,
                region.offset().y,
                seen.x,
                seen.y
            );
            region.report_scroll(seen);
        }

        EditorPaneOutput { changed }
    }
}

/// Whether the surface offset has moved far enough from the region's notion
/// of it to count as a real scroll.
pub(crate) fn exceeds_jitter(seen: ScrollOffset, current: ScrollOffset) -> bool {
    (seen.x - current.x).abs() > SCROLL_JITTER || (seen.y - current.y).abs() > SCROLL_JITTER
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
