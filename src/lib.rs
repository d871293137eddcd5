// src/lib.rs
//! GPU Game of Life
//!
//! Conway's Game of Life stepped and drawn on the GPU with wgpu. Two state
//! textures alternate as read and write generation; one tick per display
//! refresh evaluates the rule into the write texture, presents it and swaps.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod prelude;
pub mod simulation;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::LifeApp;
pub use config::LifeConfig;
pub use error::{LifeError, Result};
pub use simulation::GameOfLife;

/// Creates the windowed application with the default configuration
pub fn default() -> Result<LifeApp> {
    LifeApp::new(LifeConfig::default())
}
