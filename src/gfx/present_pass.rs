//! Present pass
//!
//! Clears the target to black and draws one generation over it, either as a
//! full-surface quad or as one square per cell.

use crate::{
    config::PresentStyle,
    error::Result,
    simulation::{
        buffer_pair::{PerSlot, Slot},
        context::SimulationContext,
        seed::CellPositions,
        state_store::StateStore,
    },
    wgpu_utils::{layout_entry, texture_2d, uniform, UniformBuffer, VertexBuffer},
};

use super::program::{
    compile_program, link_program, ShaderLibrary, CELLS_FRAGMENT, CELLS_VERTEX, FRAGMENT_ENTRY,
    RENDER_FRAGMENT, RENDER_VERTEX, VERTEX_ENTRY,
};

pub const BACKGROUND: wgpu::Color = wgpu::Color::BLACK;

/// Layout must match `PresentUniforms` in the render and cells shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PresentUniforms {
    pub alive_color: [f32; 4],
    pub dead_color: [f32; 4],
    pub grid: [u32; 2],
    pub _padding: [u32; 2],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CellVertex {
    pub position: [f32; 2],
}

impl CellVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CellVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

enum Geometry {
    Quad,
    Cells(VertexBuffer<CellVertex>),
}

pub struct Presenter {
    pipeline: wgpu::RenderPipeline,
    geometry: Geometry,
    // kept alive for the bind groups
    _uniforms: UniformBuffer<PresentUniforms>,
    bind_groups: PerSlot<wgpu::BindGroup>,
}

impl Presenter {
    pub fn new(
        context: &SimulationContext,
        shaders: &ShaderLibrary,
        store: &StateStore,
        style: PresentStyle,
        positions: &CellPositions,
        alive_color: [f32; 4],
    ) -> Result<Self> {
        let device = &context.device;
        let (program, source) = match style {
            PresentStyle::Quad => ("present-quad", shaders.program(RENDER_VERTEX, RENDER_FRAGMENT)?),
            PresentStyle::Cells => ("present-cells", shaders.program(CELLS_VERTEX, CELLS_FRAGMENT)?),
        };
        let modules = compile_program(device, program, &source)?;

        let geometry = match style {
            PresentStyle::Quad => Geometry::Quad,
            PresentStyle::Cells => {
                let vertices: Vec<CellVertex> = positions
                    .iter()
                    .map(|&position| CellVertex { position })
                    .collect();
                Geometry::Cells(VertexBuffer::new_with_data(device, &vertices))
            }
        };
        let vertex_buffers = match geometry {
            Geometry::Quad => vec![],
            Geometry::Cells(_) => vec![CellVertex::desc()],
        };

        let visibility = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Present Bind Group Layout"),
            entries: &[
                layout_entry(0, visibility, texture_2d()),
                layout_entry(1, visibility, uniform()),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Present Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = link_program(
            device,
            program,
            &wgpu::RenderPipelineDescriptor {
                label: Some("Present Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &modules.vertex,
                    entry_point: Some(VERTEX_ENTRY),
                    buffers: &vertex_buffers,
                    compilation_options: Default::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &modules.fragment,
                    entry_point: Some(FRAGMENT_ENTRY),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: context.target_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                multiview: None,
                cache: None,
            },
        )?;

        let uniforms = UniformBuffer::new_with_data(
            device,
            &PresentUniforms {
                alive_color,
                dead_color: [
                    BACKGROUND.r as f32,
                    BACKGROUND.g as f32,
                    BACKGROUND.b as f32,
                    BACKGROUND.a as f32,
                ],
                grid: [context.grid.num_x, context.grid.num_y],
                _padding: [0; 2],
            },
        );

        let bind_groups = PerSlot::new(|slot: Slot| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Present Bind Group"),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&store.get(slot).view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: uniforms.binding_resource(),
                    },
                ],
            })
        });

        Ok(Self {
            pipeline,
            geometry,
            _uniforms: uniforms,
            bind_groups,
        })
    }

    /// Draws the generation held in `slot` into `target`. Reads only.
    pub fn draw(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView, slot: Slot) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Present Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(BACKGROUND),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, self.bind_groups.get(slot), &[]);
        match &self.geometry {
            Geometry::Quad => pass.draw(0..3, 0..1),
            Geometry::Cells(cells) => {
                pass.set_vertex_buffer(0, cells.slice());
                pass.draw(0..6, 0..cells.len() as u32);
            }
        }
    }

    /// Clears `target` to the background without drawing any cells.
    pub fn clear(encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Clear Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(BACKGROUND),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
    }
}
