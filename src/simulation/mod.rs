// src/simulation/mod.rs
//! Simulation system
//!
//! CPU-side model of the game (grid, generations, seeding, rule reference)
//! plus the GPU double buffer and the controller that drives both passes
//! once per display refresh.

pub mod buffer_pair;
pub mod context;
pub mod game;
pub mod generation;
pub mod grid;
pub mod patterns;
pub mod rules;
pub mod scheduler;
pub mod seed;
pub mod state_store;

pub use game::GameOfLife;
pub use generation::Generation;
pub use grid::GridDimensions;
pub use patterns::Pattern;
pub use rules::{EdgePolicy, RuleParameters};
pub use scheduler::{FrameScheduler, RedrawHost};
