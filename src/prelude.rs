//! Common imports for driving a simulation
//!
//! ```no_run
//! use gpu_life::prelude::*;
//!
//! let config = LifeConfig::default().with_pattern(Pattern::Glider);
//! LifeApp::new(config)?.run()?;
//! # Ok::<(), LifeError>(())
//! ```

pub use crate::{
    app::LifeApp,
    config::{GridSizing, LifeConfig, PresentStyle, ShaderLocation},
    error::{LifeError, Result},
    gfx::context::{GpuContext, HeadlessContext, SurfaceBinding},
    simulation::{
        EdgePolicy, GameOfLife, Generation, GridDimensions, Pattern, RedrawHost, RuleParameters,
    },
};
