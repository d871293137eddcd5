//! Shader programs
//!
//! A program is a vertex stage and a fragment stage, each in its own WGSL
//! source, fetched by name. Compiling the stages and linking them into a
//! pipeline both run inside a wgpu validation error scope so a bad shader
//! turns into a [`ProgramLinkError`] instead of an uncaptured device error.

use std::borrow::Cow;

use log::debug;

use crate::{
    config::ShaderLocation,
    error::{LifeError, ProgramLinkError, Result, ShaderCompileError},
};

pub const COMPUTE_VERTEX: &str = "compute-vertex";
pub const COMPUTE_FRAGMENT: &str = "compute-fragment";
pub const RENDER_VERTEX: &str = "render-vertex";
pub const RENDER_FRAGMENT: &str = "render-fragment";
pub const CELLS_VERTEX: &str = "cells-vertex";
pub const CELLS_FRAGMENT: &str = "cells-fragment";

const EMBEDDED: &[(&str, &str)] = &[
    (COMPUTE_VERTEX, include_str!("shaders/compute-vertex.wgsl")),
    (COMPUTE_FRAGMENT, include_str!("shaders/compute-fragment.wgsl")),
    (RENDER_VERTEX, include_str!("shaders/render-vertex.wgsl")),
    (RENDER_FRAGMENT, include_str!("shaders/render-fragment.wgsl")),
    (CELLS_VERTEX, include_str!("shaders/cells-vertex.wgsl")),
    (CELLS_FRAGMENT, include_str!("shaders/cells-fragment.wgsl")),
];

/// Entry points every stage source must define.
pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

#[derive(Debug, Clone)]
pub struct StageSource {
    pub name: String,
    pub code: Cow<'static, str>,
}

#[derive(Debug, Clone)]
pub struct ProgramSource {
    pub vertex: StageSource,
    pub fragment: StageSource,
}

/// Resolves stage names against the configured [`ShaderLocation`].
#[derive(Debug, Clone)]
pub struct ShaderLibrary {
    location: ShaderLocation,
}

impl ShaderLibrary {
    pub fn new(location: ShaderLocation) -> Self {
        Self { location }
    }

    pub fn stage(&self, name: &str) -> Result<StageSource> {
        let code = match &self.location {
            ShaderLocation::Embedded => EMBEDDED
                .iter()
                .find(|(stage, _)| *stage == name)
                .map(|(_, code)| Cow::Borrowed(*code))
                .ok_or_else(|| LifeError::ShaderSource {
                    name: name.to_string(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "no embedded stage with this name",
                    ),
                })?,
            ShaderLocation::Directory(dir) => {
                let path = dir.join(format!("{}.wgsl", name));
                let code = std::fs::read_to_string(&path).map_err(|source| {
                    LifeError::ShaderSource {
                        name: path.display().to_string(),
                        source,
                    }
                })?;
                Cow::Owned(code)
            }
        };

        Ok(StageSource {
            name: format!("{}.wgsl", name),
            code,
        })
    }

    pub fn program(&self, vertex: &str, fragment: &str) -> Result<ProgramSource> {
        Ok(ProgramSource {
            vertex: self.stage(vertex)?,
            fragment: self.stage(fragment)?,
        })
    }
}

pub struct ProgramModules {
    pub vertex: wgpu::ShaderModule,
    pub fragment: wgpu::ShaderModule,
}

/// Runs `f` inside a validation error scope and returns what it caught.
fn capture_validation<T>(device: &wgpu::Device, f: impl FnOnce() -> T) -> (T, Option<wgpu::Error>) {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = f();
    let error = pollster::block_on(device.pop_error_scope());
    (value, error)
}

fn compile_stage(
    device: &wgpu::Device,
    stage: &StageSource,
) -> std::result::Result<wgpu::ShaderModule, ShaderCompileError> {
    let (module, error) = capture_validation(device, || {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&stage.name),
            source: wgpu::ShaderSource::Wgsl(stage.code.clone()),
        })
    });

    match error {
        Some(error) => Err(ShaderCompileError {
            stage: stage.name.clone(),
            message: error.to_string(),
        }),
        None => Ok(module),
    }
}

/// Compiles both stages of `program`.
pub fn compile_program(
    device: &wgpu::Device,
    program: &str,
    source: &ProgramSource,
) -> std::result::Result<ProgramModules, ProgramLinkError> {
    let stage_failed = |cause: ShaderCompileError| ProgramLinkError {
        program: program.to_string(),
        message: format!("stage {} failed to compile", cause.stage),
        cause: Some(cause),
    };

    let vertex = compile_stage(device, &source.vertex).map_err(stage_failed)?;
    let fragment = compile_stage(device, &source.fragment).map_err(stage_failed)?;

    debug!(
        "Compiled program \"{}\" ({} + {})",
        program, source.vertex.name, source.fragment.name
    );
    Ok(ProgramModules { vertex, fragment })
}

/// Creates the pipeline for `program`, reporting interface mismatches between
/// the stages (or against the layout) as a link failure.
pub fn link_program(
    device: &wgpu::Device,
    program: &str,
    descriptor: &wgpu::RenderPipelineDescriptor,
) -> std::result::Result<wgpu::RenderPipeline, ProgramLinkError> {
    let (pipeline, error) = capture_validation(device, || device.create_render_pipeline(descriptor));
    match error {
        Some(error) => Err(ProgramLinkError {
            program: program.to_string(),
            message: error.to_string(),
            cause: None,
        }),
        None => Ok(pipeline),
    }
}
