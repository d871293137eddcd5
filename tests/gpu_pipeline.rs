//! End-to-end runs of both passes on a headless adapter.
//!
//! Every test returns early when the machine has no usable adapter.

use std::{cell::Cell, error::Error as _, path::PathBuf};

use gpu_life::{
    config::{GridSizing, LifeConfig, PresentStyle},
    error::LifeError,
    gfx::context::{HeadlessContext, SurfaceBinding},
    simulation::{
        rules::{self, EdgePolicy, RuleParameters},
        GameOfLife, Generation, Pattern, RedrawHost,
    },
};

const SIZE: u32 = 64;
const CELL: u32 = 8;

#[derive(Default)]
struct CountingHost {
    requests: Cell<u32>,
}

impl RedrawHost for CountingHost {
    fn request_redraw(&self) {
        self.requests.set(self.requests.get() + 1);
    }
}

fn headless() -> Option<HeadlessContext> {
    match pollster::block_on(HeadlessContext::new(SIZE, SIZE)) {
        Ok(context) => Some(context),
        Err(e) => {
            eprintln!("skipping GPU test: {}", e);
            None
        }
    }
}

fn config(edge_policy: EdgePolicy) -> LifeConfig {
    LifeConfig::default()
        .with_grid(GridSizing::CellSize(CELL))
        .with_edge_policy(edge_policy)
        .with_rng_seed(42)
}

fn gpu_step(context: &HeadlessContext, game: &mut GameOfLife) {
    let mut encoder = context
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    assert!(game.step(&mut encoder));
    context.queue().submit(std::iter::once(encoder.finish()));
}

fn cpu_step(read: &Generation, params: &RuleParameters, edge: EdgePolicy) -> Generation {
    let mut write = Generation::empty(read.grid());
    rules::step(read, &mut write, params, edge);
    write
}

/// RGBA bytes of the headless target, top row first.
fn read_target(context: &HeadlessContext) -> Vec<u8> {
    let bytes_per_row = SIZE * 4;
    assert_eq!(bytes_per_row % wgpu::COPY_BYTES_PER_ROW_ALIGNMENT, 0);

    let device = context.device();
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Target Staging Buffer"),
        size: (bytes_per_row * SIZE) as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: context.target(),
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(SIZE),
            },
        },
        wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
    );
    context.queue().submit(std::iter::once(encoder.finish()));

    let slice = staging.slice(..);
    let (tx, rx) = futures::channel::oneshot::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    let _ = device.poll(wgpu::PollType::Wait);
    futures::executor::block_on(rx).unwrap().unwrap();

    let pixels = slice.get_mapped_range().to_vec();
    staging.unmap();
    pixels
}

/// Pixel at the centre of cell `(x, y)`; row 0 of the grid is the bottom.
fn cell_pixel(pixels: &[u8], x: u32, y: u32) -> [u8; 4] {
    let px = x * CELL + CELL / 2;
    let py = SIZE - 1 - (y * CELL + CELL / 2);
    let offset = ((py * SIZE + px) * 4) as usize;
    [
        pixels[offset],
        pixels[offset + 1],
        pixels[offset + 2],
        pixels[offset + 3],
    ]
}

#[test]
fn test_glider_matches_cpu_reference() {
    let Some(context) = headless() else { return };
    let mut game = GameOfLife::new(config(EdgePolicy::Clamp));
    game.start(&context, &CountingHost::default()).unwrap();

    let grid = game.grid().unwrap();
    assert_eq!((grid.num_x, grid.num_y), (SIZE / CELL, SIZE / CELL));

    let mut expected = Generation::empty(grid);
    Pattern::Glider.stamp(&mut expected, 1, 1);
    game.load(&expected).unwrap();

    let params = game.params();
    for _ in 0..6 {
        gpu_step(&context, &mut game);
        expected = cpu_step(&expected, &params, EdgePolicy::Clamp);
        assert_eq!(game.snapshot().unwrap(), expected);
    }
    assert_eq!(game.generation(), 6);
    assert_eq!(expected.live_count(), 5);

    game.stop();
}

#[test]
fn test_random_seed_matches_cpu_reference_with_wrap() {
    let Some(context) = headless() else { return };
    let mut game = GameOfLife::new(config(EdgePolicy::Wrap).with_alive_probability(0.4));
    game.start(&context, &CountingHost::default()).unwrap();

    let mut expected = game.snapshot().unwrap();
    let params = game.params();
    for _ in 0..10 {
        gpu_step(&context, &mut game);
        expected = cpu_step(&expected, &params, EdgePolicy::Wrap);
    }
    assert_eq!(game.snapshot().unwrap(), expected);
}

#[test]
fn test_random_seed_matches_cpu_reference_with_clamp() {
    let Some(context) = headless() else { return };
    let mut game = GameOfLife::new(config(EdgePolicy::Clamp).with_alive_probability(0.4));
    game.start(&context, &CountingHost::default()).unwrap();

    let mut expected = game.snapshot().unwrap();
    let params = game.params();
    for _ in 0..10 {
        gpu_step(&context, &mut game);
        expected = cpu_step(&expected, &params, EdgePolicy::Clamp);
        assert_eq!(game.snapshot().unwrap(), expected);
    }
}

#[test]
fn test_resolution_multiplier_matches_cpu_reference() {
    for edge in [EdgePolicy::Clamp, EdgePolicy::Wrap] {
        let Some(context) = headless() else { return };
        let mut game = GameOfLife::new(config(edge).with_alive_probability(0.5));
        game.start(&context, &CountingHost::default()).unwrap();
        game.set_resolution_multiplier(2);

        let mut expected = game.snapshot().unwrap();
        let params = game.params();
        assert_eq!(params.resolution_multiplier, 2);
        for _ in 0..5 {
            gpu_step(&context, &mut game);
            expected = cpu_step(&expected, &params, edge);
            assert_eq!(game.snapshot().unwrap(), expected);
        }
    }
}

#[test]
fn test_corner_cells_see_no_neighbors_past_the_edge() {
    let Some(context) = headless() else { return };
    let mut game = GameOfLife::new(config(EdgePolicy::Clamp));
    game.start(&context, &CountingHost::default()).unwrap();

    let grid = game.grid().unwrap();
    let (last_x, last_y) = (grid.num_x - 1, grid.num_y - 1);
    let mut corners = Generation::empty(grid);
    // L-tromino in one corner grows into a block
    corners.set(0, 0, true);
    corners.set(1, 0, true);
    corners.set(0, 1, true);
    // lone cells in the other three corners; wrapping would give them neighbors
    corners.set(last_x, last_y, true);
    corners.set(last_x, 0, true);
    corners.set(0, last_y, true);
    game.load(&corners).unwrap();

    let params = game.params();
    let expected = cpu_step(&corners, &params, EdgePolicy::Clamp);
    gpu_step(&context, &mut game);
    let actual = game.snapshot().unwrap();

    assert_eq!(actual, expected);
    assert!(actual.is_alive(1, 1));
    assert!(!actual.is_alive(last_x, last_y));
    assert!(!actual.is_alive(last_x, 0));
}

#[test]
fn test_load_restarts_generation_count() {
    let Some(context) = headless() else { return };
    let mut game = GameOfLife::new(config(EdgePolicy::Clamp));
    game.start(&context, &CountingHost::default()).unwrap();

    gpu_step(&context, &mut game);
    gpu_step(&context, &mut game);
    assert_eq!(game.generation(), 2);

    let mut block = Generation::empty(game.grid().unwrap());
    Pattern::Block.stamp(&mut block, 2, 2);
    game.load(&block).unwrap();
    assert_eq!(game.generation(), 0);
    assert_eq!(game.snapshot().unwrap(), block);
}

#[test]
fn test_grid_over_buffer_limit_fails_start() {
    let Some(context) = headless() else { return };
    let limits = context.device().limits();
    let cell_bytes = 8u64;

    // smallest square grid whose instance buffer exceeds the limit
    let Some(edge) = (0..32)
        .map(|shift| 1u32 << shift)
        .take_while(|&edge| edge <= limits.max_texture_dimension_2d)
        .find(|&edge| edge as u64 * edge as u64 * cell_bytes > limits.max_buffer_size)
    else {
        eprintln!("skipping: no square grid exceeds this adapter's buffer limit");
        return;
    };

    let mut game = GameOfLife::new(
        config(EdgePolicy::Clamp)
            .with_grid(GridSizing::Square(edge))
            .with_present_style(PresentStyle::Cells),
    );
    let host = CountingHost::default();
    let err = game.start(&context, &host).unwrap_err();

    assert!(matches!(err, LifeError::Configuration(_)), "got {:?}", err);
    assert!(!game.is_running());
    assert!(game.grid().is_none());
    assert_eq!(host.requests.get(), 0);
}

#[test]
fn test_changed_rules_apply_on_next_step() {
    let Some(context) = headless() else { return };
    let mut game = GameOfLife::new(config(EdgePolicy::Clamp));
    game.start(&context, &CountingHost::default()).unwrap();

    let grid = game.grid().unwrap();
    let mut block = Generation::empty(grid);
    Pattern::Block.stamp(&mut block, 3, 3);
    game.load(&block).unwrap();

    gpu_step(&context, &mut game);
    assert_eq!(game.snapshot().unwrap(), block);

    // each block cell has three neighbors; over-population above two kills it
    game.set_over_population_limit(2);
    gpu_step(&context, &mut game);
    assert_eq!(game.snapshot().unwrap().live_count(), 0);
}

#[test]
fn test_frame_presents_new_generation() {
    let Some(context) = headless() else { return };
    let alive = [1.0, 0.0, 0.0, 1.0];
    let mut game = GameOfLife::new(config(EdgePolicy::Clamp).with_alive_color(alive));
    let host = CountingHost::default();
    game.start(&context, &host).unwrap();
    assert_eq!(host.requests.get(), 1);

    let mut blinker = Generation::empty(game.grid().unwrap());
    Pattern::Blinker.stamp(&mut blinker, 2, 4);
    game.load(&blinker).unwrap();

    let view = context.target_view();
    let mut encoder = context
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    assert!(game.frame(&host, &mut encoder, &view));
    context.queue().submit(std::iter::once(encoder.finish()));
    assert_eq!(host.requests.get(), 2);

    // vertical blinker at (3, 4..7) turns horizontal around (3, 5)
    let pixels = read_target(&context);
    for x in 2..5 {
        assert_eq!(cell_pixel(&pixels, x, 5), [255, 0, 0, 255]);
    }
    assert_eq!(cell_pixel(&pixels, 3, 4), [0, 0, 0, 255]);
    assert_eq!(cell_pixel(&pixels, 3, 6), [0, 0, 0, 255]);
    assert_eq!(cell_pixel(&pixels, 0, 0), [0, 0, 0, 255]);

    game.stop();
    let mut encoder = context
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    assert!(!game.frame(&host, &mut encoder, &view));
    assert_eq!(host.requests.get(), 2);
}

#[test]
fn test_cells_style_links_and_ticks() {
    let Some(context) = headless() else { return };
    let mut game = GameOfLife::new(config(EdgePolicy::Clamp).with_present_style(PresentStyle::Cells));
    let host = CountingHost::default();
    game.start(&context, &host).unwrap();

    let view = context.target_view();
    for _ in 0..3 {
        let mut encoder = context
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        assert!(game.frame(&host, &mut encoder, &view));
        context.queue().submit(std::iter::once(encoder.finish()));
    }
    assert_eq!(game.generation(), 3);
    assert!(game.snapshot().is_ok());
}

#[test]
fn test_restart_after_stop() {
    let Some(context) = headless() else { return };
    let mut game = GameOfLife::new(config(EdgePolicy::Clamp));
    let host = CountingHost::default();

    for _ in 0..3 {
        game.start(&context, &host).unwrap();
        assert!(game.is_running());
        gpu_step(&context, &mut game);
        assert_eq!(game.generation(), 1);
        game.stop();
        assert!(!game.is_running());
        assert!(game.grid().is_none());
        assert!(game.snapshot().is_err());
    }

    // a fresh run gets new textures holding the seed
    game.start(&context, &host).unwrap();
    assert!(game.grid().is_some());
    assert_eq!(game.generation(), 0);
    assert!(game.snapshot().is_ok());
}

#[test]
fn test_reseed_resets_generation() {
    let Some(context) = headless() else { return };
    let mut game = GameOfLife::new(config(EdgePolicy::Clamp).with_pattern(Pattern::GosperGun));
    game.start(&context, &CountingHost::default()).unwrap();

    let seeded = game.snapshot().unwrap();
    gpu_step(&context, &mut game);
    gpu_step(&context, &mut game);
    assert_eq!(game.generation(), 2);

    game.reseed().unwrap();
    assert_eq!(game.generation(), 0);
    assert_eq!(game.snapshot().unwrap(), seeded);
}

#[test]
fn test_broken_rule_shader_fails_start() {
    let Some(context) = headless() else { return };

    let dir: PathBuf = std::env::temp_dir().join(format!("gpu_life_shaders_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let shaders = [
        ("compute-vertex", include_str!("../src/gfx/shaders/compute-vertex.wgsl")),
        ("compute-fragment", "@fragment fn fs_main() -> @location(0) vec4<f32> { return nieghbors; }"),
        ("render-vertex", include_str!("../src/gfx/shaders/render-vertex.wgsl")),
        ("render-fragment", include_str!("../src/gfx/shaders/render-fragment.wgsl")),
    ];
    for (name, code) in shaders {
        std::fs::write(dir.join(format!("{}.wgsl", name)), code).unwrap();
    }

    let mut game = GameOfLife::new(config(EdgePolicy::Clamp).with_shader_directory(&dir));
    let host = CountingHost::default();
    let err = game.start(&context, &host).unwrap_err();
    std::fs::remove_dir_all(&dir).ok();

    let LifeError::ProgramLink(link) = &err else {
        panic!("expected a link error, got {:?}", err);
    };
    assert_eq!(link.program, "rule");
    let cause = link.source().expect("stage failure should be chained");
    assert!(cause.to_string().contains("compute-fragment.wgsl"));

    assert!(!game.is_running());
    assert_eq!(host.requests.get(), 0);
}

#[test]
fn test_missing_shader_directory_fails_start() {
    let Some(context) = headless() else { return };
    let mut game = GameOfLife::new(
        config(EdgePolicy::Clamp).with_shader_directory("/nonexistent/gpu_life/shaders"),
    );
    let err = game.start(&context, &CountingHost::default()).unwrap_err();
    assert!(matches!(err, LifeError::ShaderSource { .. }));
    assert!(!game.is_running());
}
