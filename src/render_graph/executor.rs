//! Drawing one frame of a compiled pipeline.
//!
//! Passes run in chain order. Each pass binds its target, sets the viewport
//! to the scaled size, clears, activates its program, writes `iResolution`,
//! `iTime` and `iFrame`, binds every earlier buffer and every static texture
//! to the unit chosen by [`PassSlots`](crate::slots::PassSlots), then draws
//! the shared quad as a 4-vertex triangle strip.
//!
//! Nothing carries over between passes: [`BindState`] is cleared at the start
//! of each pass and every binding the pass needs is issued again.

use std::collections::BTreeMap;

use crate::backend::GraphicsBackend;
use crate::descriptor::PipelineDescriptor;
use crate::render_graph::{CompiledPass, CompiledPipeline};

/// Per-frame values supplied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameArgs {
    /// Elapsed time in seconds.
    pub time: f32,
    /// Frame counter, starting at 0.
    pub frame: u64,
}

/// Where a pass writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTargetRef {
    Buffer(usize),
    Display,
}

/// What a texture unit was bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureInput {
    Buffer(usize),
    Static(usize),
}

/// Bindings issued by the executor for the pass currently being drawn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindState {
    pub pass: Option<usize>,
    pub target: Option<RenderTargetRef>,
    pub program: Option<usize>,
    pub active_unit: Option<u32>,
    pub units: BTreeMap<u32, TextureInput>,
}

/// Runs compiled pipelines frame by frame.
#[derive(Debug, Default)]
pub struct FrameExecutor {
    state: BindState,
}

impl FrameExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings left by the most recent pass.
    pub fn bind_state(&self) -> &BindState {
        &self.state
    }

    /// Draws every pass of `pipeline` once.
    pub fn render_frame<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        pipeline: &CompiledPipeline<B>,
        descriptor: &PipelineDescriptor,
        args: &FrameArgs,
    ) {
        for pass in &pipeline.passes {
            self.render_pass(backend, pipeline, descriptor, pass, args);
        }
    }

    /// Draws a single pass, re-issuing every binding it depends on.
    pub fn render_pass<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        pipeline: &CompiledPipeline<B>,
        descriptor: &PipelineDescriptor,
        pass: &CompiledPass<B>,
        args: &FrameArgs,
    ) {
        let i = pass.index;
        let screen = descriptor.screen();
        self.state = BindState {
            pass: Some(i),
            ..BindState::default()
        };

        let target = match pipeline.buffers.get(i) {
            Some(buffer) if i + 1 < pipeline.passes.len() => {
                backend.bind_framebuffer(Some(buffer.framebuffer));
                RenderTargetRef::Buffer(i)
            }
            _ => {
                backend.bind_framebuffer(None);
                RenderTargetRef::Display
            }
        };
        self.state.target = Some(target);

        backend.viewport(0, 0, screen.scaled.x as i32, screen.scaled.y as i32);
        backend.clear_color_buffer();

        backend.use_program(Some(pass.program));
        self.state.program = Some(i);

        let resolution = (if i == 0 { screen.flat } else { screen.scaled }).as_vec2();
        backend.uniform_3f(pass.resolution.as_ref(), resolution.x, resolution.y, 1.0);
        backend.uniform_1f(pass.time.as_ref(), args.time);
        backend.uniform_1i(
            pass.frame.as_ref(),
            i32::try_from(args.frame).unwrap_or(i32::MAX),
        );

        for (k, location) in pass.buffer_uniforms.iter().enumerate() {
            let (Some(location), Some(buffer)) = (location, pipeline.buffers.get(k)) else {
                continue;
            };
            let unit = pass.slots.buffer_unit(k);
            self.bind_unit(backend, unit, buffer.texture, TextureInput::Buffer(k));
            backend.uniform_1i(Some(location), unit as i32);
        }

        for (k, location) in pass.texture_uniforms.iter().enumerate() {
            let (Some(location), Some(texture)) = (location, pipeline.textures.get(k)) else {
                continue;
            };
            let unit = pass.slots.texture_unit(k);
            self.bind_unit(backend, unit, texture.texture, TextureInput::Static(k));
            backend.uniform_1i(Some(location), unit as i32);
        }

        backend.bind_array_buffer(Some(pipeline.vertex_buffer));
        if let Some(position) = pass.position {
            backend.enable_vertex_attrib_array(position);
            backend.vertex_attrib_pointer_f32(position, 2);
        }

        backend.draw_triangle_strip(0, 4);
        tracing::trace!(pass = i, ?target, "Drew pass");
    }

    fn bind_unit<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        unit: u32,
        texture: B::Texture,
        input: TextureInput,
    ) {
        backend.set_active_texture_unit(unit);
        backend.bind_texture(Some(texture));
        self.state.active_unit = Some(unit);
        self.state.units.insert(unit, input);
    }
}
