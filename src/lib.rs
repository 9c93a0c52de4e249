//! # shaderchain
//!
//! **Multi-pass fragment shader chains on any GL-style backend.**
//!
//! Give it a list of fragment shader bodies and a few static images. It
//! compiles every pass, renders each one into an offscreen buffer that later
//! passes can sample, and puts the last pass on screen.
//!
//! ## Quick Start
//!
//! ```no_run
//! use shaderchain::*;
//!
//! # fn demo(gl: glow::Context) -> Result<(), Box<dyn std::error::Error>> {
//! let mut backend = unsafe { GlContext::new(gl) };
//!
//! let descriptor = PipelineDescriptor::builder()
//!     .screen(ScreenSizes::uniform(800, 600))
//!     .texture(StaticImage::solid(1, 1, [255, 128, 0, 255]))
//!     .pass(Some("void main() {
//!         vec2 uv = gl_FragCoord.xy / iResolution.xy;
//!         gl_FragColor = vec4(uv, 0.5 + 0.5 * sin(iTime), 1.0);
//!     }"))
//!     .pass(Some("void main() {
//!         vec2 uv = gl_FragCoord.xy / iResolution.xy;
//!         gl_FragColor = texture2D(iBuffer0, uv) * texture2D(iTexture0, uv);
//!     }"))
//!     .build()?;
//!
//! let mut display = ShaderDisplay::new();
//! display.load(&mut backend, descriptor)?;
//!
//! let mut driver = LoopDriver::new(ManualScheduler::new(), LoopMode::SingleShot);
//! driver.start(&mut backend, &mut display);
//! # Ok(())
//! # }
//! ```
//!
//! ## What a pass sees
//!
//! Every pass body is prefixed with a generated header:
//!
//! - `iResolution`, `iTime`, `iFrame` from the prelude
//! - `iBuffer0 .. iBuffer{N-2}`: the outputs of earlier passes
//! - `iTexture0 .. iTexture{M-1}`: the static images
//! - any `#define`s and the shared common block
//!
//! Compiler messages are shifted back so line numbers point into the body
//! you wrote, not the composed source.
//!
//! ## Layout
//!
//! - [`PipelineDescriptor`] describes a chain; [`compile`] turns it into a
//!   [`CompiledPipeline`] on a [`GraphicsBackend`].
//! - [`FrameExecutor`] draws one frame of a compiled pipeline.
//! - [`LoopDriver`] runs frames off a [`Scheduler`] once a [`FrameSource`]
//!   such as [`ShaderDisplay`] reports something ready.
//! - [`GlContext`] is the `glow` backend.

mod backend;
mod descriptor;
mod diagnostics;
mod display;
mod frame_loop;
mod gpu;
mod header;
mod render_graph;
mod resource_spec;
mod slots;
#[cfg(test)]
mod testing;
mod texture;

pub use backend::{BackendError, FramebufferStatus, GraphicsBackend, ShaderStage};
pub use descriptor::{
    DescriptorError, PipelineDescriptor, PipelineDescriptorBuilder, QUAD_VERTEX_SHADER,
    ScreenSizes,
};
pub use diagnostics::remap_diagnostic;
pub use display::{FrameClock, ShaderDisplay};
pub use frame_loop::{
    FrameBundle, FrameSource, LoopDriver, LoopMode, LoopState, ManualScheduler, Scheduler,
    TickOutcome, WindowScheduler,
};
pub use gpu::GlContext;
pub use header::{DEFAULT_PRELUDE, Definition, HeaderBlock};
pub use render_graph::{
    BindState, CompileError, CompileStage, CompiledBuffer, CompiledPass, CompiledPipeline,
    CompiledTexture, FrameArgs, FrameExecutor, QUAD_VERTICES, QuadVertex, RenderTargetRef,
    TextureInput, compile,
};
pub use resource_spec::{
    FilterMode, ResourceKind, ResourceMeta, ResourceSpec, SamplingParams, SpecTables,
    merge_specs,
};
pub use slots::{
    MIN_GUARANTEED_TEXTURE_UNITS, PassSlots, buffer_uniform_name, texture_uniform_name,
};
pub use texture::StaticImage;
