//! Compiling a [`PipelineDescriptor`] into live backend objects.

use crate::backend::{BackendError, GraphicsBackend, ShaderStage};
use crate::descriptor::PipelineDescriptor;
use crate::render_graph::{CompiledBuffer, CompiledPass, CompiledTexture};

/// Corner of the full-screen quad, in clip space.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
}

/// Unit quad covering the viewport, ordered for a triangle strip.
pub const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { position: [-1.0, -1.0] },
    QuadVertex { position: [1.0, -1.0] },
    QuadVertex { position: [-1.0, 1.0] },
    QuadVertex { position: [1.0, 1.0] },
];

/// Which step of compilation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileStage {
    Vertex,
    Fragment,
    Link,
}

/// Compilation failure. Fragment and link messages carry line numbers
/// relative to the caller's pass body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("vertex shader failed to compile: {message}")]
    Vertex { message: String },
    #[error("pass {pass_index} failed to compile: {message}")]
    Fragment { pass_index: usize, message: String },
    #[error("pass {pass_index} failed to link: {message}")]
    Link { pass_index: usize, message: String },
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl CompileError {
    /// The failing stage; `None` for backend object-creation failures.
    pub fn stage(&self) -> Option<CompileStage> {
        match self {
            Self::Vertex { .. } => Some(CompileStage::Vertex),
            Self::Fragment { .. } => Some(CompileStage::Fragment),
            Self::Link { .. } => Some(CompileStage::Link),
            Self::Backend(_) => None,
        }
    }

    pub fn pass_index(&self) -> Option<usize> {
        match self {
            Self::Fragment { pass_index, .. } | Self::Link { pass_index, .. } => Some(*pass_index),
            Self::Vertex { .. } | Self::Backend(_) => None,
        }
    }

    /// The remapped backend log, if the failure came from the shader compiler or linker.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Vertex { message }
            | Self::Fragment { message, .. }
            | Self::Link { message, .. } => Some(message),
            Self::Backend(_) => None,
        }
    }
}

/// Every backend object built for one load of a descriptor.
///
/// The host owns the graphics context, so objects are released explicitly
/// with [`destroy`](Self::destroy) rather than on drop.
#[derive(Debug)]
pub struct CompiledPipeline<B: GraphicsBackend> {
    pub vertex_buffer: B::Buffer,
    pub vertex_shader: B::Shader,
    pub buffers: Vec<CompiledBuffer<B>>,
    pub passes: Vec<CompiledPass<B>>,
    pub textures: Vec<CompiledTexture<B>>,
}

impl<B: GraphicsBackend> CompiledPipeline<B> {
    pub fn destroy(self, backend: &mut B) {
        for pass in self.passes {
            pass.destroy(backend);
        }
        for buffer in self.buffers {
            buffer.destroy(backend);
        }
        for texture in self.textures {
            texture.destroy(backend);
        }
        backend.delete_shader(self.vertex_shader);
        backend.delete_buffer(self.vertex_buffer);
    }
}

/// Builds the pipeline for `descriptor`: quad and vertex stage, one buffer
/// per non-final pass, one program per pass, one texture per static image.
///
/// Stops at the first failing pass; later passes are never compiled. On
/// failure everything created so far is released before returning.
pub fn compile<B: GraphicsBackend>(
    backend: &mut B,
    descriptor: &PipelineDescriptor,
) -> Result<CompiledPipeline<B>, CompileError> {
    let vertex_buffer = create_quad(backend)?;
    let vertex_shader = match compile_vertex(backend, descriptor.vertex_source()) {
        Ok(shader) => shader,
        Err(err) => {
            backend.delete_buffer(vertex_buffer);
            return Err(err);
        }
    };

    let mut pipeline = CompiledPipeline {
        vertex_buffer,
        vertex_shader,
        buffers: Vec::with_capacity(descriptor.buffer_count()),
        passes: Vec::with_capacity(descriptor.pass_count()),
        textures: Vec::with_capacity(descriptor.textures().len()),
    };

    match populate(backend, descriptor, &mut pipeline) {
        Ok(()) => {
            tracing::debug!(
                passes = pipeline.passes.len(),
                buffers = pipeline.buffers.len(),
                textures = pipeline.textures.len(),
                "Compiled shader pipeline"
            );
            Ok(pipeline)
        }
        Err(err) => {
            pipeline.destroy(backend);
            Err(err)
        }
    }
}

fn populate<B: GraphicsBackend>(
    backend: &mut B,
    descriptor: &PipelineDescriptor,
    pipeline: &mut CompiledPipeline<B>,
) -> Result<(), CompileError> {
    let size = descriptor.screen().scaled;
    for index in 0..descriptor.buffer_count() {
        let params = descriptor.buffer_params(index);
        pipeline
            .buffers
            .push(CompiledBuffer::create(backend, index, size, params)?);
    }

    let header_lines = descriptor.header().injected_line_count();
    let texture_count = descriptor.textures().len();
    for (index, source) in descriptor.passes().iter().enumerate() {
        let pass = CompiledPass::build(
            backend,
            pipeline.vertex_shader,
            index,
            source,
            header_lines,
            texture_count,
        )?;
        pipeline.passes.push(pass);
    }

    for (index, image) in descriptor.textures().iter().enumerate() {
        let params = descriptor.texture_params(index);
        pipeline
            .textures
            .push(CompiledTexture::upload(backend, image, params)?);
    }

    Ok(())
}

fn create_quad<B: GraphicsBackend>(backend: &mut B) -> Result<B::Buffer, BackendError> {
    let buffer = backend.create_buffer()?;
    backend.bind_array_buffer(Some(buffer));
    backend.upload_array_buffer(bytemuck::cast_slice(&QUAD_VERTICES));
    Ok(buffer)
}

fn compile_vertex<B: GraphicsBackend>(
    backend: &mut B,
    source: &str,
) -> Result<B::Shader, CompileError> {
    let shader = backend.create_shader(ShaderStage::Vertex)?;
    backend.shader_source(shader, source);
    backend.compile_shader(shader);

    if !backend.shader_compile_status(shader) {
        let message = backend.shader_info_log(shader);
        tracing::error!("Error compiling vertex shader: {message}");
        backend.delete_shader(shader);
        return Err(CompileError::Vertex { message });
    }

    Ok(shader)
}
