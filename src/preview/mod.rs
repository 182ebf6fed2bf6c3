//! Preview module for Tandem
//!
//! This module displays the markup produced for the editor's text and keeps
//! its scroll surface bridged to the shared sync session.

mod widget;

pub use widget::PreviewPane;
