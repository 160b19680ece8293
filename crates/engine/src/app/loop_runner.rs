use std::env;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::content::{ConfigError, ContentError};
use crate::save::SaveError;
use crate::story::GameManager;
use crate::StartupError;

use super::input::ActionStates;
use super::{
    EgaCanvas, EgaColor, InputAction, InputSnapshot, Renderer, CANVAS_HEIGHT, CANVAS_WIDTH,
};

pub const SLOW_FRAME_ENV_VAR: &str = "ISOQUEST_SLOW_FRAME_MS";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_scale: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub simulated_slow_frame_ms: u64,
    pub max_render_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Isoquest".to_string(),
            window_scale: 3,
            target_tps: 30,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(5),
            simulated_slow_frame_ms: 0,
            max_render_fps: Some(60),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window and drives `game` at a fixed tick rate until it exits or
/// the window is closed.
pub fn run_app(config: LoopConfig, mut game: GameManager) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let scale = config.window_scale.max(1);
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                (CANVAS_WIDTH * scale) as f64,
                (CANVAS_HEIGHT * scale) as f64,
            ))
            .with_min_inner_size(LogicalSize::new(CANVAS_WIDTH as f64, CANVAS_HEIGHT as f64))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(5));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let slow_frame_delay = resolve_slow_frame_delay(config.simulated_slow_frame_ms);
    let render_frame_target =
        target_frame_duration(normalize_render_fps_cap(config.max_render_fps));

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        slow_frame_delay_ms = slow_frame_delay.as_millis() as u64,
        render_fps_cap = ?config.max_render_fps,
        "loop_config"
    );

    let mut input_collector = InputCollector::default();
    let mut canvas = EgaCanvas::new(CANVAS_WIDTH, CANVAS_HEIGHT);
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut stats = LoopStats::new(metrics_log_interval);
    let window_for_loop = Arc::clone(&window);

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = window_for_loop.inner_size();
                        if let Err(error) = renderer.resize(size.width, size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::Focused(false) => input_collector.release_all(),
                    WindowEvent::KeyboardInput { event, .. } => {
                        input_collector.handle_keyboard_input(&event);
                    }
                    WindowEvent::RedrawRequested => {
                        if slow_frame_delay > Duration::ZERO {
                            thread::sleep(slow_frame_delay);
                        }

                        let now = Instant::now();
                        let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                        last_frame_instant = now;
                        accumulator = accumulator
                            .saturating_add(clamp_frame_delta(raw_frame_dt, max_frame_delta));

                        let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                        for _ in 0..step_plan.ticks_to_run {
                            let input = input_collector.snapshot_for_tick();
                            stats.record_tick();
                            if !game.tick(input) {
                                info!(reason = "game_exit", "shutdown_requested");
                                window_target.exit();
                                return;
                            }
                        }
                        accumulator = step_plan.remaining_accumulator;

                        if step_plan.dropped_backlog > Duration::ZERO {
                            stats.record_clamp();
                            warn!(
                                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                                max_ticks_per_frame,
                                "sim_clamp_triggered"
                            );
                        }

                        let cap_sleep = compute_cap_sleep(
                            Instant::now().saturating_duration_since(last_present_instant),
                            render_frame_target,
                        );
                        if cap_sleep > Duration::ZERO {
                            thread::sleep(cap_sleep);
                        }

                        canvas.clear(EgaColor::Black);
                        game.draw(&mut canvas);
                        if let Err(error) = renderer.render(&canvas) {
                            warn!(error = %error, "renderer_draw_failed");
                            window_target.exit();
                        }
                        last_present_instant = Instant::now();
                        stats.record_frame(raw_frame_dt);

                        if let Some(snapshot) = stats.maybe_snapshot(now) {
                            info!(
                                fps = snapshot.fps,
                                tps = snapshot.tps,
                                frame_time_ms = snapshot.frame_time_ms,
                                clamps = snapshot.clamps,
                                sprites = game.sprites().len(),
                                story = game.story_name().unwrap_or("none"),
                                "loop_metrics"
                            );
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window_for_loop.request_redraw();
            }
            Event::LoopExiting => {
                game.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Keyboard state between ticks: held keys plus presses not yet seen by a
/// tick.
#[derive(Debug, Default)]
struct InputCollector {
    held: ActionStates,
    pressed: ActionStates,
}

impl InputCollector {
    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        let Some(action) = action_for_key(key_event.physical_key) else {
            return;
        };
        self.set_key_state(action, key_event.state);
    }

    fn set_key_state(&mut self, action: InputAction, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.held.is_down(action) {
                    self.pressed.set(action, true);
                }
                self.held.set(action, true);
            }
            ElementState::Released => self.held.set(action, false),
        }
    }

    fn release_all(&mut self) {
        self.held = ActionStates::default();
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::from_states(self.held, self.pressed);
        self.pressed = ActionStates::default();
        snapshot
    }
}

fn action_for_key(key: PhysicalKey) -> Option<InputAction> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    match code {
        KeyCode::KeyW | KeyCode::ArrowUp => Some(InputAction::Up),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(InputAction::Down),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(InputAction::Left),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(InputAction::Right),
        KeyCode::Space | KeyCode::Enter | KeyCode::NumpadEnter => Some(InputAction::Fire),
        KeyCode::Escape => Some(InputAction::Escape),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct LoopStatsSnapshot {
    fps: f32,
    tps: f32,
    frame_time_ms: f32,
    clamps: u32,
}

#[derive(Debug)]
struct LoopStats {
    interval_start: Instant,
    interval: Duration,
    frames: u32,
    ticks: u32,
    clamps: u32,
    frame_time_sum: Duration,
}

impl LoopStats {
    fn new(interval: Duration) -> Self {
        Self {
            interval_start: Instant::now(),
            interval,
            frames: 0,
            ticks: 0,
            clamps: 0,
            frame_time_sum: Duration::ZERO,
        }
    }

    fn record_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
    }

    fn record_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    fn record_clamp(&mut self) {
        self.clamps = self.clamps.saturating_add(1);
    }

    fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopStatsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = if self.frames == 0 {
            0.0
        } else {
            (self.frame_time_sum.as_secs_f32() / self.frames as f32) * 1000.0
        };
        let snapshot = LoopStatsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            tps: self.ticks as f32 / elapsed_seconds,
            frame_time_ms,
            clamps: self.clamps,
        };

        self.interval_start = now;
        self.frames = 0;
        self.ticks = 0;
        self.clamps = 0;
        self.frame_time_sum = Duration::ZERO;
        Some(snapshot)
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn resolve_slow_frame_delay(config_slow_frame_ms: u64) -> Duration {
    match env::var(SLOW_FRAME_ENV_VAR) {
        Ok(value) => match value.parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                warn!(
                    env_var = SLOW_FRAME_ENV_VAR,
                    value = value.as_str(),
                    "slow_frame_env_invalid"
                );
                Duration::from_millis(config_slow_frame_ms)
            }
        },
        Err(env::VarError::NotPresent) => Duration::from_millis(config_slow_frame_ms),
        Err(error) => {
            warn!(env_var = SLOW_FRAME_ENV_VAR, error = %error, "slow_frame_env_unreadable");
            Duration::from_millis(config_slow_frame_ms)
        }
    }
}
