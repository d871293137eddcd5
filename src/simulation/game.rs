//! Game of Life controller
//!
//! Owns the configuration, the live rule constants, the frame scheduler and,
//! while running, every GPU resource of the run. `stop()` drops all of them,
//! so repeated start/stop cycles do not accumulate textures or pipelines.

use log::{error, info, warn};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    config::{LifeConfig, PresentStyle},
    error::{LifeError, Result},
    gfx::{
        context::SurfaceBinding,
        present_pass::{CellVertex, Presenter},
        program::ShaderLibrary,
        rule_pass::RuleEvaluator,
    },
};

use super::{
    context::SimulationContext,
    generation::Generation,
    grid::GridDimensions,
    rules::RuleParameters,
    scheduler::{FrameScheduler, RedrawHost},
    seed::InitialStateGenerator,
    state_store::{padded_bytes_per_row, StateStore},
};

/// Rejects grids whose per-run buffers would exceed the device's buffer size
/// limit: the readback staging buffer always, the cell instances with
/// [`PresentStyle::Cells`].
fn check_buffer_limit(grid: GridDimensions, style: PresentStyle, max_buffer_size: u64) -> Result<()> {
    let staging = padded_bytes_per_row(grid.num_x) as u64 * grid.num_y as u64;
    let instances = match style {
        PresentStyle::Cells => grid.num_cells() as u64 * std::mem::size_of::<CellVertex>() as u64,
        PresentStyle::Quad => 0,
    };

    for (what, size) in [("readback buffer", staging), ("cell instance buffer", instances)] {
        if size > max_buffer_size {
            return Err(LifeError::Configuration(format!(
                "{}x{} grid needs a {} of {} bytes, device allows {}",
                grid.num_x, grid.num_y, what, size, max_buffer_size
            )));
        }
    }
    Ok(())
}

/// Everything allocated for one run.
struct Simulation {
    context: SimulationContext,
    store: StateStore,
    rules: RuleEvaluator,
    presenter: Presenter,
    generation: u64,
}

impl Simulation {
    fn build(
        config: &LifeConfig,
        params: &RuleParameters,
        binding: &impl SurfaceBinding,
        rng: &mut StdRng,
    ) -> Result<Self> {
        config.validate()?;

        let (width, height) = binding.size();
        let grid = config.grid.resolve(width, height)?;
        let limits = binding.device().limits();
        grid.check_texture_limit(limits.max_texture_dimension_2d)?;
        check_buffer_limit(grid, config.present_style, limits.max_buffer_size)?;

        let seed = InitialStateGenerator::new(config.alive_probability, config.pattern)
            .seed(grid, rng);

        let context = SimulationContext {
            device: binding.device().clone(),
            queue: binding.queue().clone(),
            grid,
            target_format: binding.surface_format(),
            edge_policy: config.edge_policy,
        };
        let shaders = ShaderLibrary::new(config.shaders.clone());

        let store = StateStore::create(&context, &seed.generation)?;
        let rules = RuleEvaluator::new(&context, &shaders, &store, params)?;
        let presenter = Presenter::new(
            &context,
            &shaders,
            &store,
            config.present_style,
            &seed.positions,
            config.alive_color,
        )?;

        info!(
            "Seeded {}x{} grid with {} live cells",
            grid.num_x,
            grid.num_y,
            seed.generation.live_count()
        );

        Ok(Self {
            context,
            store,
            rules,
            presenter,
            generation: 0,
        })
    }

    fn step(&mut self, params: &RuleParameters, encoder: &mut wgpu::CommandEncoder) {
        self.rules.update_parameters(&self.context, params);
        self.rules.apply(encoder, &self.store);
    }

    fn tick(
        &mut self,
        params: &RuleParameters,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
    ) {
        self.step(params, encoder);
        self.presenter.draw(encoder, target, self.store.write_slot());
        self.store.swap();
        self.generation += 1;
    }

    fn release(self) {
        self.store.release();
    }
}

pub struct GameOfLife {
    config: LifeConfig,
    params: RuleParameters,
    scheduler: FrameScheduler,
    simulation: Option<Simulation>,
    rng: StdRng,
}

impl GameOfLife {
    pub fn new(config: LifeConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            params: config.rules,
            config,
            scheduler: FrameScheduler::new(),
            simulation: None,
            rng,
        }
    }

    /// Seeds the grid, compiles both programs and schedules the first tick.
    /// Any failure leaves the game stopped with nothing allocated.
    pub fn start(&mut self, binding: &impl SurfaceBinding, host: &impl RedrawHost) -> Result<()> {
        if self.is_running() {
            warn!("start() called while already running");
            return Ok(());
        }

        match Simulation::build(&self.config, &self.params, binding, &mut self.rng) {
            Ok(simulation) => {
                self.simulation = Some(simulation);
                self.scheduler.start(host);
                info!("Simulation started");
                Ok(())
            }
            Err(e) => {
                error!("Could not start simulation: {}", e);
                Err(e)
            }
        }
    }

    /// Ends the frame loop and releases every GPU resource of the run.
    pub fn stop(&mut self) {
        let was_running = self.scheduler.stop();
        if let Some(simulation) = self.simulation.take() {
            info!("Simulation stopped after {} generations", simulation.generation);
            simulation.release();
        } else if !was_running {
            warn!("stop() called while already stopped");
        }
    }

    /// Replaces the current generation with a fresh seed on the same grid.
    pub fn reseed(&mut self) -> Result<()> {
        let simulation = self
            .simulation
            .as_mut()
            .ok_or_else(|| LifeError::Configuration("cannot reseed a stopped simulation".into()))?;

        let seed = InitialStateGenerator::new(self.config.alive_probability, self.config.pattern)
            .seed(simulation.context.grid, &mut self.rng);
        simulation.store.upload(&simulation.context.queue, &seed.generation);
        simulation.generation = 0;

        info!("Reseeded with {} live cells", seed.generation.live_count());
        Ok(())
    }

    /// One display-refresh callback: schedule the next tick, then evaluate
    /// the rule, present the new generation into `target` and swap.
    /// Returns `false` if nothing was recorded because the game is stopped.
    pub fn frame(
        &mut self,
        host: &impl RedrawHost,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
    ) -> bool {
        if !self.scheduler.begin_tick(host) {
            return false;
        }
        let Some(simulation) = self.simulation.as_mut() else {
            return false;
        };
        simulation.tick(&self.params, encoder, target);
        true
    }

    /// Advances one generation without presenting it.
    pub fn step(&mut self, encoder: &mut wgpu::CommandEncoder) -> bool {
        let Some(simulation) = self.simulation.as_mut() else {
            return false;
        };
        simulation.step(&self.params, encoder);
        simulation.store.swap();
        simulation.generation += 1;
        true
    }

    /// Copies the current generation back to the CPU. Waits for the GPU.
    pub fn snapshot(&self) -> Result<Generation> {
        let simulation = self
            .simulation
            .as_ref()
            .ok_or_else(|| LifeError::Configuration("no generation while stopped".into()))?;
        simulation
            .store
            .read_back(&simulation.context, simulation.store.read_slot())
    }

    /// Overwrites the current generation, e.g. with a hand-made pattern.
    /// Like a reseed, this restarts the generation count.
    pub fn load(&mut self, generation: &Generation) -> Result<()> {
        let simulation = self
            .simulation
            .as_mut()
            .ok_or_else(|| LifeError::Configuration("cannot load into a stopped simulation".into()))?;
        if generation.grid() != simulation.context.grid {
            return Err(LifeError::Configuration(format!(
                "generation is {}x{} but the grid is {}x{}",
                generation.grid().num_x,
                generation.grid().num_y,
                simulation.context.grid.num_x,
                simulation.context.grid.num_y
            )));
        }
        simulation.store.upload(&simulation.context.queue, generation);
        simulation.generation = 0;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Generations computed since the last start or reseed.
    pub fn generation(&self) -> u64 {
        self.simulation.as_ref().map_or(0, |s| s.generation)
    }

    pub fn grid(&self) -> Option<GridDimensions> {
        self.simulation.as_ref().map(|s| s.context.grid)
    }

    pub fn params(&self) -> RuleParameters {
        self.params
    }

    pub fn config(&self) -> &LifeConfig {
        &self.config
    }

    pub fn set_under_population_limit(&mut self, limit: u32) {
        self.params.under_population_limit = limit;
    }

    pub fn set_over_population_limit(&mut self, limit: u32) {
        self.params.over_population_limit = limit;
    }

    pub fn set_num_neighbors_to_reproduce(&mut self, count: u32) {
        self.params.num_neighbors_to_reproduce = count;
    }

    pub fn set_resolution_multiplier(&mut self, multiplier: u32) {
        if multiplier == 0 {
            warn!("Resolution multiplier 0 clamped to 1");
        }
        self.params.resolution_multiplier = multiplier.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_is_stopped() {
        let game = GameOfLife::new(LifeConfig::default().with_rng_seed(1));
        assert!(!game.is_running());
        assert_eq!(game.generation(), 0);
        assert!(game.grid().is_none());
        assert!(game.snapshot().is_err());
    }

    #[test]
    fn test_setters_update_parameters() {
        let mut game = GameOfLife::new(LifeConfig::default());
        game.set_under_population_limit(1);
        game.set_over_population_limit(5);
        game.set_num_neighbors_to_reproduce(2);
        game.set_resolution_multiplier(3);

        assert_eq!(
            game.params(),
            RuleParameters {
                under_population_limit: 1,
                over_population_limit: 5,
                num_neighbors_to_reproduce: 2,
                resolution_multiplier: 3,
            }
        );
        // config keeps the values the run started from
        assert_eq!(game.config().rules, RuleParameters::default());
    }

    #[test]
    fn test_zero_multiplier_is_clamped() {
        let mut game = GameOfLife::new(LifeConfig::default());
        game.set_resolution_multiplier(0);
        assert_eq!(game.params().resolution_multiplier, 1);
    }

    #[test]
    fn test_buffer_limit_rejects_oversized_cells() {
        // 256 MiB, the default max_buffer_size
        let max = 1 << 28;
        let grid = GridDimensions::square(8192).unwrap();

        let err = check_buffer_limit(grid, PresentStyle::Cells, max).unwrap_err();
        assert!(matches!(err, LifeError::Configuration(_)));
        assert!(err.to_string().contains("cell instance buffer"));

        assert!(check_buffer_limit(grid, PresentStyle::Quad, max).is_ok());
    }

    #[test]
    fn test_buffer_limit_covers_readback() {
        let grid = GridDimensions::square(8192).unwrap();
        // 8192 bytes per row, 8192 rows
        assert!(check_buffer_limit(grid, PresentStyle::Quad, 1 << 26).is_ok());
        let err = check_buffer_limit(grid, PresentStyle::Quad, (1 << 26) - 1).unwrap_err();
        assert!(err.to_string().contains("readback buffer"));
    }

    #[test]
    fn test_stopped_game_ignores_reseed_and_stop() {
        let mut game = GameOfLife::new(LifeConfig::default());
        assert!(game.reseed().is_err());
        game.stop();
        assert!(!game.is_running());
        assert!(game.load(&Generation::from_rows(&[[1, 0], [0, 1]])).is_err());
    }
}
