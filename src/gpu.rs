//! OpenGL backend over [`glow`].
//!
//! [`GlContext`] wraps a `glow::Context` created by the host (through
//! glutin, SDL, a WebGL canvas, ...) and implements
//! [`GraphicsBackend`] on top of it. Every call maps onto one or two GL
//! entry points; no state is cached on this side.
//!
//! # Example
//!
//! ```ignore
//! let gl = unsafe { glow::Context::from_loader_function(|s| loader(s)) };
//! let mut backend = unsafe { GlContext::new(gl) };
//! let pipeline = shaderchain::compile(&mut backend, &descriptor)?;
//! ```

use std::fmt;

use glow::HasContext;

use crate::backend::{BackendError, FramebufferStatus, GraphicsBackend, ShaderStage};
use crate::resource_spec::FilterMode;
use crate::texture::StaticImage;

type VertexArray = <glow::Context as HasContext>::VertexArray;

/// [`GraphicsBackend`] over a live GL context.
///
/// The context must stay current on the calling thread for as long as
/// this value is used.
pub struct GlContext {
    gl: glow::Context,
    vertex_array: Option<VertexArray>,
}

impl GlContext {
    /// Takes ownership of `gl`. Binds a vertex array object when the context
    /// supports them, since core profiles reject attribute state without one.
    ///
    /// # Safety
    ///
    /// `gl` must be a valid context, current on this thread.
    pub unsafe fn new(gl: glow::Context) -> Self {
        let vertex_array = match unsafe { gl.create_vertex_array() } {
            Ok(vao) => {
                unsafe { gl.bind_vertex_array(Some(vao)) };
                Some(vao)
            }
            Err(err) => {
                tracing::debug!("Vertex array objects unavailable: {err}");
                None
            }
        };
        Self { gl, vertex_array }
    }

    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    /// Releases the vertex array and hands the context back.
    pub fn into_inner(self) -> glow::Context {
        if let Some(vao) = self.vertex_array {
            unsafe {
                self.gl.bind_vertex_array(None);
                self.gl.delete_vertex_array(vao);
            }
        }
        self.gl
    }
}

impl fmt::Debug for GlContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlContext")
            .field("vertex_array", &self.vertex_array)
            .finish_non_exhaustive()
    }
}

fn gl_filter(mode: FilterMode) -> i32 {
    let filter = match mode {
        FilterMode::Linear => glow::LINEAR,
        FilterMode::Nearest => glow::NEAREST,
        FilterMode::NearestMipmapNearest => glow::NEAREST_MIPMAP_NEAREST,
        FilterMode::LinearMipmapNearest => glow::LINEAR_MIPMAP_NEAREST,
        FilterMode::NearestMipmapLinear => glow::NEAREST_MIPMAP_LINEAR,
        FilterMode::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR,
    };
    filter as i32
}

fn dimension(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl GraphicsBackend for GlContext {
    type Shader = <glow::Context as HasContext>::Shader;
    type Program = <glow::Context as HasContext>::Program;
    type Buffer = <glow::Context as HasContext>::Buffer;
    type Texture = <glow::Context as HasContext>::Texture;
    type Framebuffer = <glow::Context as HasContext>::Framebuffer;
    type UniformLocation = <glow::Context as HasContext>::UniformLocation;

    fn create_shader(&mut self, stage: ShaderStage) -> Result<Self::Shader, BackendError> {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe { self.gl.create_shader(kind) }.map_err(|err| BackendError::new("shader", err))
    }

    fn shader_source(&mut self, shader: Self::Shader, source: &str) {
        unsafe { self.gl.shader_source(shader, source) }
    }

    fn compile_shader(&mut self, shader: Self::Shader) {
        unsafe { self.gl.compile_shader(shader) }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.gl.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.gl.get_shader_info_log(shader) }
    }

    fn delete_shader(&mut self, shader: Self::Shader) {
        unsafe { self.gl.delete_shader(shader) }
    }

    fn create_program(&mut self) -> Result<Self::Program, BackendError> {
        unsafe { self.gl.create_program() }.map_err(|err| BackendError::new("program", err))
    }

    fn attach_shader(&mut self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.attach_shader(program, shader) }
    }

    fn link_program(&mut self, program: Self::Program) {
        unsafe { self.gl.link_program(program) }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.gl.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.gl.get_program_info_log(program) }
    }

    fn delete_program(&mut self, program: Self::Program) {
        unsafe { self.gl.delete_program(program) }
    }

    fn use_program(&mut self, program: Option<Self::Program>) {
        unsafe { self.gl.use_program(program) }
    }

    fn create_buffer(&mut self) -> Result<Self::Buffer, BackendError> {
        unsafe { self.gl.create_buffer() }.map_err(|err| BackendError::new("buffer", err))
    }

    fn bind_array_buffer(&mut self, buffer: Option<Self::Buffer>) {
        unsafe { self.gl.bind_buffer(glow::ARRAY_BUFFER, buffer) }
    }

    fn upload_array_buffer(&mut self, data: &[u8]) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW)
        }
    }

    fn delete_buffer(&mut self, buffer: Self::Buffer) {
        unsafe { self.gl.delete_buffer(buffer) }
    }

    fn create_texture(&mut self) -> Result<Self::Texture, BackendError> {
        unsafe { self.gl.create_texture() }.map_err(|err| BackendError::new("texture", err))
    }

    fn bind_texture(&mut self, texture: Option<Self::Texture>) {
        unsafe { self.gl.bind_texture(glow::TEXTURE_2D, texture) }
    }

    fn allocate_texture(&mut self, width: u32, height: u32) {
        unsafe {
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                dimension(width),
                dimension(height),
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                None,
            );
            // Non-power-of-two render targets are only complete when clamped.
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );
        }
    }

    fn upload_texture(&mut self, image: &StaticImage) {
        unsafe {
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                dimension(image.width),
                dimension(image.height),
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                Some(image.pixels()),
            );
        }
    }

    fn set_texture_filter(&mut self, min: FilterMode, mag: FilterMode) {
        unsafe {
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, gl_filter(min));
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, gl_filter(mag));
        }
    }

    fn generate_mipmap(&mut self) {
        unsafe { self.gl.generate_mipmap(glow::TEXTURE_2D) }
    }

    fn set_active_texture_unit(&mut self, unit: u32) {
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) }
    }

    fn delete_texture(&mut self, texture: Self::Texture) {
        unsafe { self.gl.delete_texture(texture) }
    }

    fn create_framebuffer(&mut self) -> Result<Self::Framebuffer, BackendError> {
        unsafe { self.gl.create_framebuffer() }
            .map_err(|err| BackendError::new("framebuffer", err))
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<Self::Framebuffer>) {
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, framebuffer) }
    }

    fn attach_color_texture(&mut self, texture: Self::Texture) {
        unsafe {
            self.gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(texture),
                0,
            );
        }
    }

    fn framebuffer_status(&self) -> FramebufferStatus {
        match unsafe { self.gl.check_framebuffer_status(glow::FRAMEBUFFER) } {
            glow::FRAMEBUFFER_COMPLETE => FramebufferStatus::Complete,
            status => FramebufferStatus::Incomplete(status),
        }
    }

    fn delete_framebuffer(&mut self, framebuffer: Self::Framebuffer) {
        unsafe { self.gl.delete_framebuffer(framebuffer) }
    }

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(program, name) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn uniform_3f(&mut self, location: Option<&Self::UniformLocation>, x: f32, y: f32, z: f32) {
        unsafe { self.gl.uniform_3_f32(location, x, y, z) }
    }

    fn uniform_1f(&mut self, location: Option<&Self::UniformLocation>, value: f32) {
        unsafe { self.gl.uniform_1_f32(location, value) }
    }

    fn uniform_1i(&mut self, location: Option<&Self::UniformLocation>, value: i32) {
        unsafe { self.gl.uniform_1_i32(location, value) }
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) }
    }

    fn vertex_attrib_pointer_f32(&mut self, index: u32, components: i32) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(index, components, glow::FLOAT, false, 0, 0)
        }
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn clear_color_buffer(&mut self) {
        unsafe { self.gl.clear(glow::COLOR_BUFFER_BIT) }
    }

    fn draw_triangle_strip(&mut self, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(glow::TRIANGLE_STRIP, first, count) }
    }
}
