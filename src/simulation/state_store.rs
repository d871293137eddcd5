//! Double-buffered generation storage on the GPU
//!
//! Each generation is a single-channel `R8Unorm` texture, one texel per
//! cell. The rule pass renders into the write texture while sampling the
//! read texture; the two are always separate allocations.

use log::debug;

use super::{
    buffer_pair::{BufferPair, Slot},
    context::SimulationContext,
    generation::Generation,
    grid::GridDimensions,
};
use crate::error::{LifeError, Result};

/// Format of every state texture.
pub const STATE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Unorm;

/// Texture copies need rows padded to `COPY_BYTES_PER_ROW_ALIGNMENT`.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    width.div_ceil(align) * align
}

/// One generation's texture and the view both passes bind.
pub struct GenerationTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl GenerationTexture {
    pub fn new(device: &wgpu::Device, grid: GridDimensions, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: grid.extent(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: STATE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self { texture, view }
    }
}

pub struct StateStore {
    pair: BufferPair<GenerationTexture>,
    grid: GridDimensions,
}

impl StateStore {
    /// Allocates both generations and uploads `seed` as the read side.
    pub fn create(context: &SimulationContext, seed: &Generation) -> Result<Self> {
        if seed.grid() != context.grid {
            return Err(LifeError::Configuration(format!(
                "seed is {}x{} but the grid is {}x{}",
                seed.grid().num_x,
                seed.grid().num_y,
                context.grid.num_x,
                context.grid.num_y
            )));
        }

        let pair = BufferPair::new(
            GenerationTexture::new(&context.device, context.grid, "Generation Front"),
            GenerationTexture::new(&context.device, context.grid, "Generation Back"),
        );
        let store = Self {
            pair,
            grid: context.grid,
        };
        store.upload(&context.queue, seed);

        debug!(
            "Allocated state textures for {}x{} cells",
            context.grid.num_x, context.grid.num_y
        );
        Ok(store)
    }

    pub fn grid(&self) -> GridDimensions {
        self.grid
    }

    pub fn read(&self) -> &GenerationTexture {
        self.pair.read()
    }

    pub fn write(&self) -> &GenerationTexture {
        self.pair.write()
    }

    pub fn read_slot(&self) -> Slot {
        self.pair.read_slot()
    }

    pub fn write_slot(&self) -> Slot {
        self.pair.write_slot()
    }

    pub fn get(&self, slot: Slot) -> &GenerationTexture {
        self.pair.get(slot)
    }

    /// Exchanges the read and write roles. O(1), no copy.
    pub fn swap(&mut self) {
        self.pair.swap();
    }

    /// Replaces the read generation.
    pub fn upload(&self, queue: &wgpu::Queue, generation: &Generation) {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.read().texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &generation.to_texels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.grid.num_x),
                rows_per_image: Some(self.grid.num_y),
            },
            self.grid.extent(),
        );
    }

    /// Copies the generation in `slot` back to the CPU. Blocks until the GPU
    /// has finished all submitted work.
    pub fn read_back(&self, context: &SimulationContext, slot: Slot) -> Result<Generation> {
        let padded_row = padded_bytes_per_row(self.grid.num_x);
        let staging = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Generation Staging Buffer"),
            size: padded_row as u64 * self.grid.num_y as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Generation Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.get(slot).texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(self.grid.num_y),
                },
            },
            self.grid.extent(),
        );
        context.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = futures::channel::oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = context.device.poll(wgpu::PollType::Wait);

        match futures::executor::block_on(rx) {
            Ok(Ok(())) => {
                let texels = {
                    let mapped = slice.get_mapped_range();
                    let row = self.grid.num_x as usize;
                    mapped
                        .chunks(padded_row as usize)
                        .flat_map(|padded| padded[..row].iter().copied())
                        .collect::<Vec<u8>>()
                };
                staging.unmap();
                Ok(Generation::from_texels(self.grid, &texels))
            }
            Ok(Err(e)) => Err(LifeError::Readback(e.to_string())),
            Err(_) => Err(LifeError::Readback("mapping callback was dropped".into())),
        }
    }

    /// Frees both textures now rather than when the last handle drops.
    pub fn release(self) {
        for generation in self.pair.iter() {
            generation.texture.destroy();
        }
    }
}
