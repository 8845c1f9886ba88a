//! abcompose - Side-by-side A/B image comparisons
//!
//! Composes two images onto a single labelled canvas with a solid or
//! gradient background and rounded corners, and exports it as PNG. Ships a
//! TUI for editing the style and a one-shot command line mode.

pub mod color_space;
pub mod compose;
pub mod config;
pub mod export;
pub mod image_loader;
pub mod input;
pub mod state;
pub mod style_controller;
pub mod terminal_capabilities;
pub mod theme;
pub mod ui;
pub mod worker;

// Re-export commonly used types
pub use compose::style::{Background, GradientStop, StyleConfig};
pub use compose::{compose, ComposeError, Composition, Compositor};
pub use config::Config;
pub use image_loader::DecodedImage;
pub use state::AppState;
