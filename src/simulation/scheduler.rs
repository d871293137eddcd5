//! Frame scheduler
//!
//! One tick per display refresh. The next tick is requested before the
//! current one does any work, so a tick that bails out early never stops
//! the loop. `stop()` is the only way to end it.

/// Whatever can ask the host for another frame at the next refresh.
pub trait RedrawHost {
    fn request_redraw(&self);
}

impl RedrawHost for winit::window::Window {
    fn request_redraw(&self) {
        winit::window::Window::request_redraw(self);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
}

#[derive(Debug)]
pub struct FrameScheduler {
    state: SchedulerState,
    ticks: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            state: SchedulerState::Stopped,
            ticks: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    /// Stopped -> Running and requests the first tick. Returns `false` if
    /// already running.
    pub fn start(&mut self, host: &impl RedrawHost) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = SchedulerState::Running;
        self.ticks = 0;
        host.request_redraw();
        true
    }

    /// Running -> Stopped. A tick already in flight still finishes.
    pub fn stop(&mut self) -> bool {
        let was_running = self.is_running();
        self.state = SchedulerState::Stopped;
        was_running
    }

    /// Called at the top of every frame callback. While running, schedules
    /// the following tick and returns `true`, meaning this tick should run.
    pub fn begin_tick(&mut self, host: &impl RedrawHost) -> bool {
        if !self.is_running() {
            return false;
        }
        host.request_redraw();
        self.ticks += 1;
        true
    }

    /// Ticks begun since the last `start`.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}
