//! # Graphics Module
//!
//! Everything that talks to wgpu on behalf of the simulation.
//!
//! ## Architecture Overview
//!
//! - **Context** ([`context`]) - Device, queue and the surface or offscreen target
//! - **Programs** ([`program`]) - WGSL stage sources, compilation and linking
//! - **Rule Pass** ([`rule_pass`]) - Computes the next generation into the write texture
//! - **Present Pass** ([`present_pass`]) - Draws a generation to the target
//! - **UI** ([`ui`]) - imgui overlay with the rule controls
//!
//! Both passes are plain render pipelines. The rule pass renders one fragment
//! per cell into an `R8Unorm` texture; the present pass samples the same
//! textures by integer texel coordinate.

pub mod context;
pub mod present_pass;
pub mod program;
pub mod rule_pass;
pub mod ui;

pub use context::{GpuContext, HeadlessContext, SurfaceBinding};
pub use present_pass::Presenter;
pub use rule_pass::RuleEvaluator;
