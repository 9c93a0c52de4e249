//! The frame loop: ask for a ready pipeline, draw it, schedule the next tick.
//!
//! [`LoopDriver`] is a two-state machine. While **pending** there is nothing
//! to draw; once the [`FrameSource`] hands back a [`FrameBundle`] the driver
//! is **running** and draws exactly one frame per tick.
//!
//! Ticks come from an injected [`Scheduler`]. In continuous mode every tick
//! requests the next one, whether or not a frame was drawn. In single-shot
//! mode the first tick is also the last. There is no cancel call: a host
//! stops the loop by no longer delivering the ticks it was asked for.
//!
//! # Example
//!
//! ```ignore
//! let mut driver = LoopDriver::new(WindowScheduler::new(window.clone()), LoopMode::Continuous);
//! driver.start(&mut gl, &mut display);
//!
//! // in the event loop:
//! WindowEvent::RedrawRequested => { driver.tick(&mut gl, &mut display); }
//! ```

use std::sync::Arc;

use winit::window::Window;

use crate::backend::GraphicsBackend;
use crate::descriptor::PipelineDescriptor;
use crate::render_graph::{CompiledPipeline, FrameArgs, FrameExecutor};

/// Host capability to request one future tick.
pub trait Scheduler {
    fn request_tick(&mut self);
}

impl<S: Scheduler + ?Sized> Scheduler for &mut S {
    fn request_tick(&mut self) {
        (**self).request_tick();
    }
}

/// Schedules ticks as window redraws.
#[derive(Debug, Clone)]
pub struct WindowScheduler {
    window: Arc<Window>,
}

impl WindowScheduler {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

impl Scheduler for WindowScheduler {
    fn request_tick(&mut self) {
        self.window.request_redraw();
    }
}

/// Scheduler that only counts requests; the host delivers ticks by hand.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ManualScheduler {
    pending: usize,
    requested: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one pending request. Returns `false` if none is outstanding.
    pub fn take_tick(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }
        self.pending -= 1;
        true
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Requests made since creation.
    pub fn requested(&self) -> usize {
        self.requested
    }
}

impl Scheduler for ManualScheduler {
    fn request_tick(&mut self) {
        self.pending += 1;
        self.requested += 1;
    }
}

/// A ready pipeline plus the values for the frame about to be drawn.
#[derive(Debug)]
pub struct FrameBundle<'a, B: GraphicsBackend> {
    pub pipeline: &'a CompiledPipeline<B>,
    pub descriptor: &'a PipelineDescriptor,
    pub args: FrameArgs,
}

/// Caller-side readiness check, consulted once per tick.
pub trait FrameSource<B: GraphicsBackend> {
    /// Returns the pipeline to draw this tick, or `None` if nothing is ready.
    fn next_frame(&mut self, single_shot: bool) -> Option<FrameBundle<'_, B>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    SingleShot,
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Pending,
    Running,
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was drawn.
    Rendered,
    /// The source had nothing ready.
    NotReady,
    /// A single-shot loop already finished; the tick was ignored.
    Stopped,
}

/// Drives a [`FrameSource`] from scheduler ticks.
#[derive(Debug)]
pub struct LoopDriver<S> {
    scheduler: S,
    mode: LoopMode,
    state: LoopState,
    executor: FrameExecutor,
    finished: bool,
    frames_rendered: u64,
}

impl<S: Scheduler> LoopDriver<S> {
    pub fn new(scheduler: S, mode: LoopMode) -> Self {
        Self {
            scheduler,
            mode,
            state: LoopState::Pending,
            executor: FrameExecutor::new(),
            finished: false,
            frames_rendered: 0,
        }
    }

    /// Runs the first tick immediately.
    pub fn start<B, F>(&mut self, backend: &mut B, source: &mut F) -> TickOutcome
    where
        B: GraphicsBackend,
        F: FrameSource<B>,
    {
        tracing::debug!(mode = ?self.mode, "Starting frame loop");
        self.tick(backend, source)
    }

    /// Handles one scheduler tick.
    pub fn tick<B, F>(&mut self, backend: &mut B, source: &mut F) -> TickOutcome
    where
        B: GraphicsBackend,
        F: FrameSource<B>,
    {
        if self.finished {
            return TickOutcome::Stopped;
        }

        let single_shot = self.mode == LoopMode::SingleShot;
        let outcome = match source.next_frame(single_shot) {
            Some(bundle) => {
                if self.state == LoopState::Pending {
                    tracing::debug!("Pipeline ready, frame loop running");
                }
                self.state = LoopState::Running;
                self.executor
                    .render_frame(backend, bundle.pipeline, bundle.descriptor, &bundle.args);
                self.frames_rendered += 1;
                TickOutcome::Rendered
            }
            None => {
                if self.state == LoopState::Running {
                    tracing::debug!("Pipeline withdrawn, frame loop pending");
                }
                self.state = LoopState::Pending;
                TickOutcome::NotReady
            }
        };

        if single_shot {
            self.finished = true;
        } else {
            self.scheduler.request_tick();
        }
        outcome
    }

    pub fn mode(&self) -> LoopMode {
        self.mode
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// True once a single-shot loop has run its tick.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn executor(&self) -> &FrameExecutor {
        &self.executor
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}
