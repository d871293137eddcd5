use gpu_life::{
    config::{GridSizing, LifeConfig},
    LifeApp,
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = LifeConfig::default();
    // GPU_LIFE_SHADERS=<dir> loads the stage sources from disk instead
    if let Some(dir) = std::env::var_os("GPU_LIFE_SHADERS") {
        config = config.with_shader_directory(dir);
    }
    if let Some(size) = std::env::var("GPU_LIFE_CELL_SIZE")
        .ok()
        .and_then(|s| s.parse().ok())
    {
        config = config.with_grid(GridSizing::CellSize(size));
    }

    LifeApp::new(config)?.run()?;
    Ok(())
}
