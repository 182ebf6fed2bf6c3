//! Editor module for Tandem
//!
//! This module contains the source-text side of the split view: the shared
//! view state, the markdown render queue behind it, and the pane widget
//! that edits the text.

mod render;
mod view;
mod widget;

// Only export what's actually used by the app
pub use view::EditorView;
pub use widget::EditorPane;

pub(crate) use widget::exceeds_jitter;
