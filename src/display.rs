//! Caller-side host: loads descriptors and feeds the frame loop.

use std::time::Instant;

use crate::backend::GraphicsBackend;
use crate::descriptor::PipelineDescriptor;
use crate::frame_loop::{FrameBundle, FrameSource};
use crate::render_graph::{CompileError, CompiledPipeline, FrameArgs, compile};

/// Elapsed time and frame counter for `iTime` / `iFrame`.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    frame: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            frame: 0,
        }
    }

    /// Values for the frame about to be drawn. Advances the counter.
    pub fn next(&mut self) -> FrameArgs {
        let args = FrameArgs {
            time: self.start.elapsed().as_secs_f32(),
            frame: self.frame,
        };
        self.frame += 1;
        args
    }

    pub fn reset(&mut self) {
        self.start = Instant::now();
        self.frame = 0;
    }

    /// Frames handed out so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds at most one loaded pipeline and the clock driving it.
///
/// A successful load swaps the new pipeline in and releases the old one.
/// A failed load leaves the previous pipeline loaded and drawing.
#[derive(Debug)]
pub struct ShaderDisplay<B: GraphicsBackend> {
    loaded: Option<(PipelineDescriptor, CompiledPipeline<B>)>,
    clock: FrameClock,
}

impl<B: GraphicsBackend> ShaderDisplay<B> {
    pub fn new() -> Self {
        Self {
            loaded: None,
            clock: FrameClock::new(),
        }
    }

    /// Compiles `descriptor` and installs it, releasing the previous pipeline.
    ///
    /// On error the previous pipeline stays loaded.
    pub fn load(
        &mut self,
        backend: &mut B,
        descriptor: PipelineDescriptor,
    ) -> Result<(), CompileError> {
        let pipeline = compile(backend, &descriptor)?;
        if let Some((_, previous)) = self.loaded.replace((descriptor, pipeline)) {
            previous.destroy(backend);
        }
        Ok(())
    }

    /// Releases the current pipeline, if any.
    pub fn unload(&mut self, backend: &mut B) {
        if let Some((_, pipeline)) = self.loaded.take() {
            pipeline.destroy(backend);
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn pipeline(&self) -> Option<&CompiledPipeline<B>> {
        self.loaded.as_ref().map(|(_, pipeline)| pipeline)
    }

    pub fn descriptor(&self) -> Option<&PipelineDescriptor> {
        self.loaded.as_ref().map(|(descriptor, _)| descriptor)
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut FrameClock {
        &mut self.clock
    }

    pub fn reset_clock(&mut self) {
        self.clock.reset();
    }
}

impl<B: GraphicsBackend> Default for ShaderDisplay<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: GraphicsBackend> FrameSource<B> for ShaderDisplay<B> {
    fn next_frame(&mut self, _single_shot: bool) -> Option<FrameBundle<'_, B>> {
        let (descriptor, pipeline) = self.loaded.as_ref()?;
        Some(FrameBundle {
            pipeline,
            descriptor,
            args: self.clock.next(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_loop::{LoopDriver, LoopMode, ManualScheduler, TickOutcome};
    use crate::testing::{Call, RecordingBackend, SYNTAX_ERROR};

    fn descriptor(body: &str) -> PipelineDescriptor {
        PipelineDescriptor::builder()
            .pass(Some("void main() { gl_FragColor = vec4(1.0); }"))
            .pass(Some(body))
            .build()
            .unwrap()
    }

    #[test]
    fn clock_counts_frames_from_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.next().frame, 0);
        assert_eq!(clock.next().frame, 1);
        assert_eq!(clock.frame(), 2);
        clock.reset();
        assert_eq!(clock.next().frame, 0);
    }

    #[test]
    fn clock_time_does_not_go_backwards() {
        let mut clock = FrameClock::new();
        let first = clock.next();
        let second = clock.next();
        assert!(first.time >= 0.0);
        assert!(second.time >= first.time);
    }

    #[test]
    fn unloaded_display_is_not_ready() {
        let mut display = ShaderDisplay::<RecordingBackend>::new();
        assert!(display.next_frame(false).is_none());
        assert_eq!(display.clock().frame(), 0);
    }

    #[test]
    fn reload_releases_previous_pipeline() {
        let mut backend = RecordingBackend::new();
        let mut display = ShaderDisplay::new();
        display
            .load(&mut backend, descriptor("void main() {}"))
            .unwrap();
        let first_vertex_buffer = display.pipeline().unwrap().vertex_buffer;

        display
            .load(&mut backend, descriptor("void main() { gl_FragColor = vec4(0.0); }"))
            .unwrap();

        assert!(backend.calls.contains(&Call::DeleteBuffer(first_vertex_buffer)));
        assert_ne!(display.pipeline().unwrap().vertex_buffer, first_vertex_buffer);
        assert_eq!(display.descriptor().unwrap().pass_count(), 2);
    }

    #[test]
    fn failed_reload_keeps_previous_pipeline() {
        let mut backend = RecordingBackend::new();
        let mut display = ShaderDisplay::new();
        display
            .load(&mut backend, descriptor("void main() {}"))
            .unwrap();
        let working = display.pipeline().unwrap().vertex_buffer;
        let programs: Vec<u32> = display
            .pipeline()
            .unwrap()
            .passes
            .iter()
            .map(|pass| pass.program)
            .collect();

        let err = display
            .load(&mut backend, descriptor(&format!("{SYNTAX_ERROR}\n")))
            .unwrap_err();
        assert_eq!(err.pass_index(), Some(1));

        assert!(display.is_loaded());
        assert_eq!(display.pipeline().unwrap().vertex_buffer, working);
        assert!(!backend.calls.contains(&Call::DeleteBuffer(working)));
        for program in programs {
            assert!(!backend.calls.contains(&Call::DeleteProgram(program)));
        }
        assert!(display.next_frame(false).is_some());
    }

    #[test]
    fn failed_first_load_has_nothing_to_draw() {
        let mut backend = RecordingBackend::new();
        let mut display = ShaderDisplay::new();
        display
            .load(&mut backend, descriptor(&format!("{SYNTAX_ERROR}\n")))
            .unwrap_err();
        assert!(!display.is_loaded());
        assert!(display.next_frame(false).is_none());
    }

    #[test]
    fn drives_the_loop_once_loaded() {
        let mut backend = RecordingBackend::new();
        let mut display = ShaderDisplay::new();
        let mut driver = LoopDriver::new(ManualScheduler::new(), LoopMode::Continuous);

        assert_eq!(driver.start(&mut backend, &mut display), TickOutcome::NotReady);

        display
            .load(&mut backend, descriptor("void main() { gl_FragColor = vec4(float(iFrame)); }"))
            .unwrap();
        while driver.scheduler().pending() > 0 && driver.frames_rendered() < 3 {
            driver.scheduler_mut().take_tick();
            driver.tick(&mut backend, &mut display);
        }

        assert_eq!(driver.frames_rendered(), 3);
        assert_eq!(display.clock().frame(), 3);
        let frames: Vec<i32> = backend
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Uniform1i(name, value) if name == "iFrame" => Some(*value),
                _ => None,
            })
            .collect();
        // Every pass gets the same frame number.
        assert_eq!(frames, vec![0, 0, 1, 1, 2, 2]);

        display.unload(&mut backend);
        driver.scheduler_mut().take_tick();
        assert_eq!(driver.tick(&mut backend, &mut display), TickOutcome::NotReady);
    }
}
