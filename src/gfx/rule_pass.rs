//! Rule pass
//!
//! Renders a full-screen triangle into the write generation. Each fragment is
//! one cell: it reads its neighbors from the read generation and outputs its
//! next state. The read texture is only ever bound for sampling here, so a
//! tick cannot alias its own input.

use crate::{
    error::Result,
    simulation::{
        buffer_pair::{PerSlot, Slot},
        context::SimulationContext,
        rules::{RuleParameters, RuleUniforms},
        state_store::{StateStore, STATE_FORMAT},
    },
    wgpu_utils::{layout_entry, texture_2d, uniform, UniformBuffer},
};

use super::program::{
    compile_program, link_program, ShaderLibrary, COMPUTE_FRAGMENT, COMPUTE_VERTEX,
    FRAGMENT_ENTRY, VERTEX_ENTRY,
};

pub struct RuleEvaluator {
    pipeline: wgpu::RenderPipeline,
    uniforms: UniformBuffer<RuleUniforms>,
    /// Indexed by the store's read slot.
    bind_groups: PerSlot<wgpu::BindGroup>,
}

impl RuleEvaluator {
    pub fn new(
        context: &SimulationContext,
        shaders: &ShaderLibrary,
        store: &StateStore,
        params: &RuleParameters,
    ) -> Result<Self> {
        let device = &context.device;
        let source = shaders.program(COMPUTE_VERTEX, COMPUTE_FRAGMENT)?;
        let modules = compile_program(device, "rule", &source)?;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Rule Bind Group Layout"),
            entries: &[
                layout_entry(0, wgpu::ShaderStages::FRAGMENT, texture_2d()),
                layout_entry(1, wgpu::ShaderStages::FRAGMENT, uniform()),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Rule Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = link_program(
            device,
            "rule",
            &wgpu::RenderPipelineDescriptor {
                label: Some("Rule Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &modules.vertex,
                    entry_point: Some(VERTEX_ENTRY),
                    buffers: &[],
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
                        format: STATE_FORMAT,
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
            &RuleUniforms::new(context.grid, params, context.edge_policy),
        );

        let bind_groups = PerSlot::new(|read: Slot| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(match read {
                    Slot::Front => "Rule Bind Group Front->Back",
                    Slot::Back => "Rule Bind Group Back->Front",
                }),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&store.get(read).view),
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
            uniforms,
            bind_groups,
        })
    }

    /// Queues new rule constants if they differ from the last ones uploaded.
    pub fn update_parameters(&mut self, context: &SimulationContext, params: &RuleParameters) -> bool {
        self.uniforms.update_content(
            &context.queue,
            RuleUniforms::new(context.grid, params, context.edge_policy),
        )
    }

    /// Records one generation step: read slot in, write slot out.
    pub fn apply(&self, encoder: &mut wgpu::CommandEncoder, store: &StateStore) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Rule Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &store.write().view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, self.bind_groups.get(store.read_slot()), &[]);
        pass.draw(0..3, 0..1);
    }
}
