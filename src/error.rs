//! Error types for the GPU Game of Life
//!
//! Start-up is the only fallible phase: a tick only records and submits GPU
//! work. Every error here aborts the `start()` call that produced it.

use thiserror::Error;

/// A single shader stage that failed to compile.
#[derive(Debug, Error)]
#[error("could not compile shader stage \"{stage}\": {message}")]
pub struct ShaderCompileError {
    pub stage: String,
    pub message: String,
}

/// A program (vertex + fragment stage pair) that failed to build.
///
/// When one of the stages failed to compile, that failure is the `source()`
/// of this error.
#[derive(Debug, Error)]
#[error("could not link program \"{program}\": {message}")]
pub struct ProgramLinkError {
    pub program: String,
    pub message: String,
    #[source]
    pub cause: Option<ShaderCompileError>,
}

#[derive(Debug, Error)]
pub enum LifeError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error(transparent)]
    ProgramLink(#[from] ProgramLinkError),

    #[error("could not read shader source \"{name}\"")]
    ShaderSource {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no suitable graphics adapter: {0}")]
    Adapter(String),

    #[error("could not create graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface error: {0}")]
    Surface(String),

    #[error("graphics context lost: {0}")]
    ContextLost(String),

    #[error("could not read generation back from the GPU: {0}")]
    Readback(String),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

pub type Result<T> = std::result::Result<T, LifeError>;
