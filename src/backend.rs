//! The graphics capability set the pipeline is compiled and drawn against.
//!
//! [`GraphicsBackend`] mirrors the small slice of a GL-style API that a
//! fullscreen multi-pass chain needs: shaders and programs, textures,
//! framebuffers, one vertex buffer, uniforms, and a triangle-strip draw.
//! Everything above this trait (descriptor building, compilation, frame
//! execution, the loop driver) is backend-agnostic.
//!
//! The crate ships one implementation, [`GlContext`](crate::GlContext), over
//! `glow`. Tests use a recording implementation that never touches a GPU.
//!
//! Handles are opaque and cheap to copy. The backend owns the implicit
//! bind-point state (current framebuffer, program, texture unit); callers
//! re-assert every binding they rely on.

use std::fmt::Debug;

use crate::resource_spec::FilterMode;
use crate::texture::StaticImage;

/// Which shader stage a shader object is created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Result of a framebuffer completeness query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferStatus {
    Complete,
    /// Backend-specific status code describing why the attachment set is unusable.
    Incomplete(u32),
}

/// Failure to create a backend object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to create {object}: {reason}")]
pub struct BackendError {
    /// Kind of object that could not be created ("shader", "texture", ...).
    pub object: &'static str,
    /// Backend-provided reason.
    pub reason: String,
}

impl BackendError {
    pub fn new(object: &'static str, reason: impl Into<String>) -> Self {
        Self {
            object,
            reason: reason.into(),
        }
    }
}

/// GL-style graphics capabilities consumed by the compiler and the frame executor.
///
/// Texture operations act on the texture currently bound with
/// [`bind_texture`](Self::bind_texture); attribute pointers act on the array
/// buffer currently bound with [`bind_array_buffer`](Self::bind_array_buffer);
/// framebuffer attachment and status act on the bound framebuffer.
pub trait GraphicsBackend {
    type Shader: Copy + Debug;
    type Program: Copy + Debug;
    type Buffer: Copy + Debug;
    type Texture: Copy + Debug;
    type Framebuffer: Copy + Debug;
    type UniformLocation: Clone + Debug;

    // Shaders

    fn create_shader(&mut self, stage: ShaderStage) -> Result<Self::Shader, BackendError>;
    fn shader_source(&mut self, shader: Self::Shader, source: &str);
    fn compile_shader(&mut self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&mut self, shader: Self::Shader);

    // Programs

    fn create_program(&mut self) -> Result<Self::Program, BackendError>;
    fn attach_shader(&mut self, program: Self::Program, shader: Self::Shader);
    fn link_program(&mut self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&mut self, program: Self::Program);
    fn use_program(&mut self, program: Option<Self::Program>);

    // Vertex data

    fn create_buffer(&mut self) -> Result<Self::Buffer, BackendError>;
    fn bind_array_buffer(&mut self, buffer: Option<Self::Buffer>);
    /// Uploads static vertex data into the bound array buffer.
    fn upload_array_buffer(&mut self, data: &[u8]);
    fn delete_buffer(&mut self, buffer: Self::Buffer);

    // Textures

    fn create_texture(&mut self) -> Result<Self::Texture, BackendError>;
    fn bind_texture(&mut self, texture: Option<Self::Texture>);
    /// Allocates uninitialised RGBA8 storage for the bound texture.
    ///
    /// The texture is used as a render target of arbitrary size, so its wrap
    /// mode is also set to clamp-to-edge on both axes. Non-power-of-two
    /// targets are incomplete under GLES 2 / WebGL 1 otherwise.
    fn allocate_texture(&mut self, width: u32, height: u32);
    /// Uploads RGBA8 pixels into the bound texture. Wrap mode is left untouched.
    fn upload_texture(&mut self, image: &StaticImage);
    fn set_texture_filter(&mut self, min: FilterMode, mag: FilterMode);
    fn generate_mipmap(&mut self);
    fn set_active_texture_unit(&mut self, unit: u32);
    fn delete_texture(&mut self, texture: Self::Texture);

    // Framebuffers

    fn create_framebuffer(&mut self) -> Result<Self::Framebuffer, BackendError>;
    /// Binds an offscreen framebuffer, or the display surface for `None`.
    fn bind_framebuffer(&mut self, framebuffer: Option<Self::Framebuffer>);
    /// Attaches a texture as colour attachment 0 of the bound framebuffer.
    fn attach_color_texture(&mut self, texture: Self::Texture);
    fn framebuffer_status(&self) -> FramebufferStatus;
    fn delete_framebuffer(&mut self, framebuffer: Self::Framebuffer);

    // Locations and uniforms

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;
    fn uniform_location(&self, program: Self::Program, name: &str)
    -> Option<Self::UniformLocation>;
    fn uniform_3f(&mut self, location: Option<&Self::UniformLocation>, x: f32, y: f32, z: f32);
    fn uniform_1f(&mut self, location: Option<&Self::UniformLocation>, value: f32);
    fn uniform_1i(&mut self, location: Option<&Self::UniformLocation>, value: i32);

    // Drawing

    fn enable_vertex_attrib_array(&mut self, index: u32);
    /// Describes tightly packed `f32` vertex data with `components` values per vertex.
    fn vertex_attrib_pointer_f32(&mut self, index: u32, components: i32);
    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color_buffer(&mut self);
    fn draw_triangle_strip(&mut self, first: i32, count: i32);
}
