//! Editor view state
//!
//! [`EditorView`] owns everything the two panes share: the source text, the
//! markup most recently produced for it, the render queue between the two,
//! and the scroll regions of both panes together with the sync session that
//! keeps them aligned. Widgets borrow this state each frame and report user
//! edits back into it.

use std::rc::Rc;

use log::debug;

use crate::editor::render::{markdown_renderer, RenderFn, RenderQueue};
use crate::sync::{Deferrer, ScrollRegion, SyncConfig, SyncSession};

/// Shared state behind the editor and preview panes.
pub struct EditorView {
    text: String,
    markup: String,
    queue: RenderQueue,
    editor_region: ScrollRegion,
    preview_region: ScrollRegion,
    session: Option<SyncSession>,
    sync_enabled: bool,
    sync_config: SyncConfig,
    deferrer: Rc<dyn Deferrer>,
}

impl EditorView {
    /// Create a view with a custom renderer. Sync starts enabled with the
    /// default configuration.
    pub fn new(renderer: Rc<RenderFn>, deferrer: Rc<dyn Deferrer>) -> Self {
        let mut view = Self {
            text: String::new(),
            markup: String::new(),
            queue: RenderQueue::new(renderer),
            editor_region: ScrollRegion::new(),
            preview_region: ScrollRegion::new(),
            session: None,
            sync_enabled: true,
            sync_config: SyncConfig::default(),
            deferrer,
        };
        view.rewire_session();
        view
    }

    /// Create a view that renders markdown to HTML fragments.
    pub fn with_markdown_renderer(deferrer: Rc<dyn Deferrer>) -> Self {
        Self::new(markdown_renderer(), deferrer)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Text and markup
    // ─────────────────────────────────────────────────────────────────────────

    /// The current source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Mutable access for the text widget. A widget that edits through this
    /// must call [`EditorView::text_edited`] afterwards.
    pub fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    /// Replace the source text, queuing a render if it actually changed.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.text {
            return;
        }
        self.text = text;
        self.queue.submit(&self.text);
    }

    /// Queue a render of the current text, after in-place edits.
    pub fn text_edited(&mut self) {
        self.queue.submit(&self.text);
    }

    /// The markup of the last completed render. Empty until the first render
    /// completes.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Advance the render queue one turn and apply completed jobs in order.
    ///
    /// Of several completions the last applied wins, so a slow job finishing
    /// after a fast one overwrites it with older markup. Returns whether the
    /// markup changed.
    pub fn poll_renders(&mut self) -> bool {
        let mut updated = false;
        for done in self.queue.pump() {
            if done.markup != self.markup {
                updated = true;
            }
            self.markup = done.markup;
        }
        updated
    }

    /// Whether renders are still in flight.
    pub fn renders_pending(&self) -> bool {
        self.queue.pending() > 0
    }

    /// Adjust how many turns future renders take. Used by hosts with slower
    /// renderers.
    #[allow(dead_code)]
    pub fn set_render_latency_turns(&mut self, turns: u32) {
        self.queue.set_latency_turns(turns);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scroll regions and sync
    // ─────────────────────────────────────────────────────────────────────────

    /// The editor pane's scroll region.
    pub fn editor_region(&self) -> &ScrollRegion {
        &self.editor_region
    }

    /// The preview pane's scroll region.
    pub fn preview_region(&self) -> &ScrollRegion {
        &self.preview_region
    }

    #[allow(dead_code)]
    pub fn sync_enabled(&self) -> bool {
        self.sync_enabled
    }

    /// Enable or disable scroll sync. Re-establishes or releases the session.
    pub fn set_sync_enabled(&mut self, enabled: bool) {
        if enabled == self.sync_enabled {
            return;
        }
        self.sync_enabled = enabled;
        self.rewire_session();
    }

    #[allow(dead_code)]
    pub fn sync_config(&self) -> SyncConfig {
        self.sync_config
    }

    /// Change the sync configuration. A session's config is fixed, so this
    /// replaces the current session with a freshly established one.
    pub fn set_sync_config(&mut self, config: SyncConfig) {
        if config == self.sync_config {
            return;
        }
        self.sync_config = config;
        if self.sync_enabled {
            self.rewire_session();
        }
    }

    /// The active sync session, if sync is enabled.
    pub fn session(&self) -> Option<&SyncSession> {
        self.session.as_ref()
    }

    /// Whether another frame is needed soon: renders in flight or
    /// programmatic scrolls not yet applied by a pane.
    pub fn needs_frame(&self) -> bool {
        self.renders_pending()
            || self.editor_region.has_pending_flush()
            || self.preview_region.has_pending_flush()
    }

    fn rewire_session(&mut self) {
        // Dropping the old session detaches its observers before the new
        // ones attach.
        self.session = None;
        if !self.sync_enabled {
            debug!("Scroll sync disabled");
            return;
        }
        let handles = [self.editor_region.handle(), self.preview_region.handle()];
        self.session = Some(SyncSession::establish(
            &handles,
            self.sync_config,
            Rc::clone(&self.deferrer),
        ));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
