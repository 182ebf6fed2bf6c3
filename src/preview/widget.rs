//! Preview pane widget
//!
//! Shows the markup produced for the current text in a scroll surface
//! bridged to the view's preview scroll region, the same dance as the
//! editor pane: apply any pending programmatic offset first, report user
//! scrolling after.

use eframe::egui::{FontId, Label, RichText, ScrollArea, Ui};

use crate::editor::{exceeds_jitter, EditorView};
use crate::sync::{ScrollOffset, ScrollRange};

/// The rendered-markup half of the split view.
///
/// The markup is displayed verbatim in a monospace face. Lines are never
/// wrapped, so long lines scroll horizontally like the unwrapped editor.
pub struct PreviewPane<'a> {
    /// The shared view state being previewed.
    view: &'a EditorView,
    /// Font size for the markup text.
    font_size: f32,
}

impl<'a> PreviewPane<'a> {
    /// Create a preview pane over the given view.
    pub fn new(view: &'a EditorView) -> Self {
        Self {
            view,
            font_size: 14.0,
        }
    }

    /// Set the font size for the markup text.
    #[must_use]
    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    /// Show the preview pane.
    pub fn show(self, ui: &mut Ui) {
        let region = self.view.preview_region();
        let flush = region.take_flush();

        let mut scroll_area = ScrollArea::both()
            .id_source("preview_pane_scroll")
            .auto_shrink([false, false]);

        if let Some(offset) = flush {
            scroll_area = scroll_area
                .horizontal_scroll_offset(offset.x)
                .vertical_scroll_offset(offset.y);
        }

        let font_size = self.font_size;
        let markup = self.view.markup();
        let scroll_output = scroll_area.show(ui, |ui| {
            let text = RichText::new(markup).font(FontId::monospace(font_size));
            ui.add(Label::new(text).extend());
        });

        let viewport = scroll_output.inner_rect.size();
        region.set_range(ScrollRange::new(
            scroll_output.content_size.x - viewport.x,
            scroll_output.content_size.y - viewport.y,
        ));

        let seen = ScrollOffset::new(scroll_output.state.offset.x, scroll_output.state.offset.y);
        if flush.is_none() && exceeds_jitter(seen, region.offset()) {
            region.report_scroll(seen);
        }
    }
}
