//! UI components for Tandem
//!
//! This module contains reusable UI widgets and components.

mod toolbar;

pub use toolbar::{Toolbar, ToolbarAction};
