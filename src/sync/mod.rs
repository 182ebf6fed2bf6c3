//! Scroll synchronization between panes
//!
//! This module keeps any number of scrollable surfaces aligned. Each pane
//! owns a [`ScrollRegion`]; a [`SyncSession`] established over handles to
//! those regions mirrors scrolls between them, proportionally or directly,
//! per axis. Guard release at turn boundaries goes through a [`Deferrer`].

mod defer;
mod region;
mod session;

pub use defer::{Deferrer, FrameDeferrer};
pub use region::{ScrollOffset, ScrollRange, ScrollRegion};
pub use session::{SyncConfig, SyncSession};
