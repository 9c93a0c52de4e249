//! Compiled pass chains and their per-frame execution.
//!
//! A chain of `N` fragment passes compiles into `N` programs sharing one
//! vertex stage and one full-screen quad, plus `N - 1` offscreen buffers.
//! Pass `i` writes buffer `i` and may sample buffers `0..i`; the last pass
//! writes the display.
//!
//! ```text
//! ┌────────┐     ┌────────┐     ┌────────┐
//! │ Pass 0 │────▶│ Pass 1 │────▶│ Pass 2 │────▶ display
//! └────────┘     └────────┘     └────────┘
//!     │              │              ▲
//!     ▼              ▼              │
//!  iBuffer0 ──────▶ (1) ───────────▶│
//!                 iBuffer1 ────────▶│
//! ```
//!
//! No pass reads its own output or anything written later in the chain,
//! so there is no feedback between frames.
//!
//! # Example
//!
//! ```ignore
//! let pipeline = shaderchain::compile(&mut backend, &descriptor)?;
//! let mut executor = FrameExecutor::new();
//! executor.render_frame(&mut backend, &pipeline, &descriptor, &FrameArgs { time, frame });
//! // When replacing the chain:
//! pipeline.destroy(&mut backend);
//! ```

mod compiled_pass;
mod executor;
mod graph;
mod render_target;

pub use compiled_pass::CompiledPass;
pub use executor::{BindState, FrameArgs, FrameExecutor, RenderTargetRef, TextureInput};
pub use graph::{
    CompileError, CompileStage, CompiledPipeline, QUAD_VERTICES, QuadVertex, compile,
};
pub use render_target::{CompiledBuffer, CompiledTexture};
