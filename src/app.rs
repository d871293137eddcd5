use log::{error, info, warn};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::LifeConfig,
    error::{LifeError, Result},
    gfx::{
        context::{GpuContext, SurfaceBinding},
        present_pass::Presenter,
        ui::{apply_rules, control_panel, PanelAction, UiManager},
    },
    simulation::game::GameOfLife,
};

/// Window shell around [`GameOfLife`].
pub struct LifeApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    context: Option<GpuContext>,
    ui_manager: Option<UiManager>,
    game: GameOfLife,
    fatal: Option<LifeError>,
}

impl LifeApp {
    pub fn new(config: LifeConfig) -> Result<Self> {
        let event_loop = EventLoop::new()?;

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                context: None,
                ui_manager: None,
                game: GameOfLife::new(config),
                fatal: None,
            },
        })
    }

    /// Runs until the window closes. Returns the error that ended the run, if any.
    pub fn run(mut self) -> Result<()> {
        let Some(event_loop) = self.event_loop.take() else {
            return Ok(());
        };
        // Ticks are driven by redraw requests from the frame scheduler.
        event_loop.set_control_flow(ControlFlow::Wait);
        event_loop.run_app(&mut self.app_state)?;

        if self.app_state.game.is_running() {
            self.app_state.game.stop();
        }
        match self.app_state.fatal.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, e: LifeError) {
        error!("{}", e);
        self.fatal = Some(e);
        event_loop.exit();
    }

    /// Creates a fresh context and UI for the current window.
    fn create_context(&mut self) -> Result<()> {
        let Some(window) = self.window.as_ref() else {
            return Ok(());
        };
        let (width, height) = window.inner_size().into();

        let context = pollster::block_on(GpuContext::new(window.clone(), width, height))?;
        let mut ui_manager = UiManager::new(
            context.device(),
            context.queue(),
            context.surface_format(),
            window,
        );
        ui_manager.update_display_size(width, height);

        self.ui_manager = Some(ui_manager);
        self.context = Some(context);
        Ok(())
    }

    fn start_game(&mut self) -> Result<()> {
        let (Some(window), Some(context)) = (self.window.as_ref(), self.context.as_ref()) else {
            return Ok(());
        };
        self.game.start(context, &**window)
    }

    fn toggle_running(&mut self, event_loop: &ActiveEventLoop) {
        if self.game.is_running() {
            self.game.stop();
            if let Some(window) = self.window.as_ref() {
                window.request_redraw();
            }
        } else if let Err(e) = self.start_game() {
            self.fail(event_loop, e);
        }
    }

    fn reseed(&mut self) {
        if let Err(e) = self.game.reseed() {
            warn!("{}", e);
        }
    }

    /// Rebuilds everything after the device was lost.
    fn reinitialize(&mut self, event_loop: &ActiveEventLoop) {
        warn!("Reinitialising after device loss");
        let was_running = self.game.is_running();
        if was_running {
            self.game.stop();
        }
        self.ui_manager = None;
        self.context = None;

        if let Err(e) = self.create_context() {
            self.fail(event_loop, e);
            return;
        }
        if was_running {
            if let Err(e) = self.start_game() {
                self.fail(event_loop, e);
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if self.context.as_ref().is_some_and(GpuContext::is_lost) {
            self.reinitialize(event_loop);
            return;
        }

        let (Some(window), Some(context), Some(ui_manager)) = (
            self.window.as_ref(),
            self.context.as_mut(),
            self.ui_manager.as_mut(),
        ) else {
            return;
        };

        let frame = match context.acquire() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                window.request_redraw();
                return;
            }
            Err(e) => {
                warn!("{}", e);
                self.reinitialize(event_loop);
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = context
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        if !self.game.frame(&**window, &mut encoder, &view) {
            Presenter::clear(&mut encoder, &view);
        }

        let mut rules = self.game.params();
        let running = self.game.is_running();
        let generation = self.game.generation();
        let mut action = None;
        ui_manager.draw(
            context.device(),
            context.queue(),
            &mut encoder,
            window,
            &view,
            |ui| action = control_panel(ui, &mut rules, running, generation),
        );

        context.queue().submit(std::iter::once(encoder.finish()));
        frame.present();

        apply_rules(&mut self.game, rules);
        match action {
            Some(PanelAction::ToggleRunning) => self.toggle_running(event_loop),
            Some(PanelAction::Reseed) => self.reseed(),
            None => {}
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            WindowAttributes::default()
                .with_title("Game of Life")
                .with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
        ) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, LifeError::Surface(e.to_string()));
                return;
            }
        };
        self.window = Some(window);

        if let Err(e) = self.create_context() {
            self.fail(event_loop, e);
            return;
        }
        if let Err(e) = self.start_game() {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            let captured = ui_manager.handle_input(&window, &ui_event);
            // While stopped nothing else schedules frames for the panel.
            if !self.game.is_running() {
                window.request_redraw();
            }
            if captured {
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match key_code {
                KeyCode::Escape => event_loop.exit(),
                KeyCode::Space => self.toggle_running(event_loop),
                KeyCode::KeyR => self.reseed(),
                _ => {}
            },
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(context) = self.context.as_mut() {
                    context.resize(width, height);
                }
                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    ui_manager.update_display_size(width, height);
                }
                if let Some(grid) = self.game.grid() {
                    info!(
                        "Surface is now {}x{}; grid stays {}x{} until restart",
                        width, height, grid.num_x, grid.num_y
                    );
                }
            }
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }
}
