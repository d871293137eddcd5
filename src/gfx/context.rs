//! Graphics context and surface binding
//!
//! The simulation only needs a device, a queue, the format it draws into and
//! the current pixel size. [`GpuContext`] provides those for a window,
//! [`HeadlessContext`] for an offscreen target.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use log::{debug, info, warn};

use crate::error::{LifeError, Result};

pub trait SurfaceBinding {
    fn device(&self) -> &Arc<wgpu::Device>;
    fn queue(&self) -> &Arc<wgpu::Queue>;
    fn surface_format(&self) -> wgpu::TextureFormat;
    /// Current drawable size in pixels.
    fn size(&self) -> (u32, u32);
}

async fn request_device(
    adapter: &wgpu::Adapter,
    lost: &Arc<AtomicBool>,
) -> Result<(Arc<wgpu::Device>, Arc<wgpu::Queue>)> {
    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("Life Device"),
            required_features: wgpu::Features::empty(),
            // Large grids need the adapter's real texture size limit.
            required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::Off,
        })
        .await?;

    let flag = lost.clone();
    device.set_device_lost_callback(move |reason, message| {
        warn!("Graphics device lost ({:?}): {}", reason, message);
        flag.store(true, Ordering::SeqCst);
    });

    Ok((Arc::new(device), Arc::new(queue)))
}

/// Window-backed context. Owns the surface and its configuration.
pub struct GpuContext {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    lost: Arc<AtomicBool>,
}

impl GpuContext {
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<GpuContext> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|e| LifeError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| LifeError::Adapter(e.to_string()))?;
        info!("Using adapter {}", adapter.get_info().name);

        let lost = Arc::new(AtomicBool::new(false));
        let (device, queue) = request_device(&adapter, &lost).await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| LifeError::Surface("surface reports no formats".into()))?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        // Fifo paces presentation, and therefore every tick, to the display refresh.
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(GpuContext {
            surface,
            device,
            queue,
            config,
            lost,
        })
    }

    /// Reconfigures the surface only; the grid is not re-derived.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        debug!("Surface resized to {}x{}", width, height);
    }

    /// Next frame to draw into. `Ok(None)` means skip this frame: the surface
    /// was outdated or lost and has been reconfigured.
    pub fn acquire(&mut self) -> Result<Option<wgpu::SurfaceTexture>> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost or outdated; reconfiguring");
                self.surface.configure(&self.device, &self.config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => Ok(None),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                Err(LifeError::ContextLost("out of memory acquiring a frame".into()))
            }
            Err(other) => Err(LifeError::Surface(other.to_string())),
        }
    }

    /// True once the device reported itself lost. Only a new context recovers.
    pub fn is_lost(&self) -> bool {
        self.lost.load(Ordering::SeqCst)
    }
}

impl SurfaceBinding for GpuContext {
    fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    fn queue(&self) -> &Arc<wgpu::Queue> {
        &self.queue
    }

    fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}

/// Offscreen context drawing into an `Rgba8Unorm` texture.
pub struct HeadlessContext {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    target: wgpu::Texture,
    width: u32,
    height: u32,
}

impl HeadlessContext {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    pub async fn new(width: u32, height: u32) -> Result<HeadlessContext> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| LifeError::Adapter(e.to_string()))?;

        let lost = Arc::new(AtomicBool::new(false));
        let (device, queue) = request_device(&adapter, &lost).await?;

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Headless Target"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        Ok(HeadlessContext {
            device,
            queue,
            target,
            width,
            height,
        })
    }

    pub fn target(&self) -> &wgpu::Texture {
        &self.target
    }

    pub fn target_view(&self) -> wgpu::TextureView {
        self.target.create_view(&wgpu::TextureViewDescriptor::default())
    }
}

impl SurfaceBinding for HeadlessContext {
    fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    fn queue(&self) -> &Arc<wgpu::Queue> {
        &self.queue
    }

    fn surface_format(&self) -> wgpu::TextureFormat {
        Self::FORMAT
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
