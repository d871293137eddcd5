//! Shared, read-only handles for one run
//!
//! Built once by `GameOfLife::start` and handed by reference to the state
//! store and both passes. Nothing in here changes until the run stops.

use std::sync::Arc;

use super::{grid::GridDimensions, rules::EdgePolicy};

pub struct SimulationContext {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    pub grid: GridDimensions,
    /// Format of the views the presenter draws into.
    pub target_format: wgpu::TextureFormat,
    pub edge_policy: EdgePolicy,
}
