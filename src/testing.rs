//! Recording backend for unit tests.
//!
//! Handles are sequential integers. Every call is appended to `calls`.
//! Compilation fails for sources containing [`SYNTAX_ERROR`]; linking fails
//! for fragment sources containing [`LINK_ERROR`]. Both produce GL-style logs
//! pointing at the marker's line in the composed source.

use std::collections::HashMap;

use crate::backend::{BackendError, FramebufferStatus, GraphicsBackend, ShaderStage};
use crate::resource_spec::FilterMode;
use crate::texture::StaticImage;

pub const SYNTAX_ERROR: &str = "SYNTAX_ERROR";
pub const LINK_ERROR: &str = "LINK_ERROR";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub program: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateShader(ShaderStage, u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader(u32, u32),
    LinkProgram(u32),
    DeleteProgram(u32),
    UseProgram(Option<u32>),
    CreateBuffer(u32),
    BindArrayBuffer(Option<u32>),
    UploadArrayBuffer(usize),
    DeleteBuffer(u32),
    CreateTexture(u32),
    BindTexture(Option<u32>),
    AllocateTexture(u32, u32),
    UploadTexture(u32, u32),
    SetTextureFilter(FilterMode, FilterMode),
    GenerateMipmap,
    ActiveTexture(u32),
    DeleteTexture(u32),
    CreateFramebuffer(u32),
    BindFramebuffer(Option<u32>),
    AttachColorTexture(u32),
    DeleteFramebuffer(u32),
    Uniform3f(String, f32, f32, f32),
    Uniform1f(String, f32),
    Uniform1i(String, i32),
    EnableVertexAttribArray(u32),
    VertexAttribPointer(u32, i32),
    Viewport(i32, i32, i32, i32),
    Clear,
    DrawTriangleStrip(i32, i32),
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<Call>,
    pub fail_vertex: bool,
    pub incomplete_framebuffers: bool,
    next_handle: u32,
    sources: HashMap<u32, (ShaderStage, String)>,
    compiled: HashMap<u32, Result<(), String>>,
    attached: HashMap<u32, Vec<u32>>,
    linked: HashMap<u32, Result<(), String>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose vertex stage never compiles.
    pub fn failing_vertex() -> Self {
        Self {
            fail_vertex: true,
            ..Self::default()
        }
    }

    /// A backend that reports every framebuffer incomplete.
    pub fn with_incomplete_framebuffers() -> Self {
        Self {
            incomplete_framebuffers: true,
            ..Self::default()
        }
    }

    fn handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| pred(call)).count()
    }

    pub fn draws(&self) -> usize {
        self.count(|call| matches!(call, Call::DrawTriangleStrip(..)))
    }

    /// Calls recorded from `start` onward.
    pub fn calls_since(&self, start: usize) -> &[Call] {
        &self.calls[start..]
    }

    fn program_source(&self, program: u32, stage: ShaderStage) -> Option<&str> {
        self.attached.get(&program)?.iter().find_map(|shader| {
            self.sources
                .get(shader)
                .filter(|(s, _)| *s == stage)
                .map(|(_, src)| src.as_str())
        })
    }
}

fn marker_log(source: &str, marker: &str, what: &str) -> Option<String> {
    source
        .lines()
        .position(|line| line.contains(marker))
        .map(|index| format!("ERROR: 0:{}: '{marker}' : {what}\n", index + 1))
}

impl GraphicsBackend for RecordingBackend {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type Texture = u32;
    type Framebuffer = u32;
    type UniformLocation = Location;

    fn create_shader(&mut self, stage: ShaderStage) -> Result<u32, BackendError> {
        let shader = self.handle();
        self.sources.insert(shader, (stage, String::new()));
        self.calls.push(Call::CreateShader(stage, shader));
        Ok(shader)
    }

    fn shader_source(&mut self, shader: u32, source: &str) {
        if let Some(entry) = self.sources.get_mut(&shader) {
            entry.1 = source.to_string();
        }
    }

    fn compile_shader(&mut self, shader: u32) {
        self.calls.push(Call::CompileShader(shader));
        let (stage, source) = &self.sources[&shader];
        let result = if *stage == ShaderStage::Vertex && self.fail_vertex {
            Err("ERROR: 0:1: vertex stage rejected\n".to_string())
        } else {
            match marker_log(source, SYNTAX_ERROR, "syntax error") {
                Some(log) => Err(log),
                None => Ok(()),
            }
        };
        self.compiled.insert(shader, result);
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        matches!(self.compiled.get(&shader), Some(Ok(())))
    }

    fn shader_info_log(&self, shader: u32) -> String {
        match self.compiled.get(&shader) {
            Some(Err(log)) => log.clone(),
            _ => String::new(),
        }
    }

    fn delete_shader(&mut self, shader: u32) {
        self.calls.push(Call::DeleteShader(shader));
    }

    fn create_program(&mut self) -> Result<u32, BackendError> {
        let program = self.handle();
        self.calls.push(Call::CreateProgram(program));
        Ok(program)
    }

    fn attach_shader(&mut self, program: u32, shader: u32) {
        self.attached.entry(program).or_default().push(shader);
        self.calls.push(Call::AttachShader(program, shader));
    }

    fn link_program(&mut self, program: u32) {
        self.calls.push(Call::LinkProgram(program));
        let fragment = self
            .program_source(program, ShaderStage::Fragment)
            .unwrap_or_default();
        let result = match marker_log(fragment, LINK_ERROR, "unresolved reference") {
            Some(log) => Err(log),
            None => Ok(()),
        };
        self.linked.insert(program, result);
    }

    fn program_link_status(&self, program: u32) -> bool {
        matches!(self.linked.get(&program), Some(Ok(())))
    }

    fn program_info_log(&self, program: u32) -> String {
        match self.linked.get(&program) {
            Some(Err(log)) => log.clone(),
            _ => String::new(),
        }
    }

    fn delete_program(&mut self, program: u32) {
        self.calls.push(Call::DeleteProgram(program));
    }

    fn use_program(&mut self, program: Option<u32>) {
        self.calls.push(Call::UseProgram(program));
    }

    fn create_buffer(&mut self) -> Result<u32, BackendError> {
        let buffer = self.handle();
        self.calls.push(Call::CreateBuffer(buffer));
        Ok(buffer)
    }

    fn bind_array_buffer(&mut self, buffer: Option<u32>) {
        self.calls.push(Call::BindArrayBuffer(buffer));
    }

    fn upload_array_buffer(&mut self, data: &[u8]) {
        self.calls.push(Call::UploadArrayBuffer(data.len()));
    }

    fn delete_buffer(&mut self, buffer: u32) {
        self.calls.push(Call::DeleteBuffer(buffer));
    }

    fn create_texture(&mut self) -> Result<u32, BackendError> {
        let texture = self.handle();
        self.calls.push(Call::CreateTexture(texture));
        Ok(texture)
    }

    fn bind_texture(&mut self, texture: Option<u32>) {
        self.calls.push(Call::BindTexture(texture));
    }

    fn allocate_texture(&mut self, width: u32, height: u32) {
        self.calls.push(Call::AllocateTexture(width, height));
    }

    fn upload_texture(&mut self, image: &StaticImage) {
        self.calls.push(Call::UploadTexture(image.width, image.height));
    }

    fn set_texture_filter(&mut self, min: FilterMode, mag: FilterMode) {
        self.calls.push(Call::SetTextureFilter(min, mag));
    }

    fn generate_mipmap(&mut self) {
        self.calls.push(Call::GenerateMipmap);
    }

    fn set_active_texture_unit(&mut self, unit: u32) {
        self.calls.push(Call::ActiveTexture(unit));
    }

    fn delete_texture(&mut self, texture: u32) {
        self.calls.push(Call::DeleteTexture(texture));
    }

    fn create_framebuffer(&mut self) -> Result<u32, BackendError> {
        let framebuffer = self.handle();
        self.calls.push(Call::CreateFramebuffer(framebuffer));
        Ok(framebuffer)
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<u32>) {
        self.calls.push(Call::BindFramebuffer(framebuffer));
    }

    fn attach_color_texture(&mut self, texture: u32) {
        self.calls.push(Call::AttachColorTexture(texture));
    }

    fn framebuffer_status(&self) -> FramebufferStatus {
        if self.incomplete_framebuffers {
            FramebufferStatus::Incomplete(0x8CD6)
        } else {
            FramebufferStatus::Complete
        }
    }

    fn delete_framebuffer(&mut self, framebuffer: u32) {
        self.calls.push(Call::DeleteFramebuffer(framebuffer));
    }

    fn attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        self.program_source(program, ShaderStage::Vertex)
            .filter(|src| src.contains(name))
            .map(|_| 0)
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<Location> {
        self.program_source(program, ShaderStage::Fragment)
            .filter(|src| src.contains(name))
            .map(|_| Location {
                program,
                name: name.to_string(),
            })
    }

    fn uniform_3f(&mut self, location: Option<&Location>, x: f32, y: f32, z: f32) {
        if let Some(loc) = location {
            self.calls.push(Call::Uniform3f(loc.name.clone(), x, y, z));
        }
    }

    fn uniform_1f(&mut self, location: Option<&Location>, value: f32) {
        if let Some(loc) = location {
            self.calls.push(Call::Uniform1f(loc.name.clone(), value));
        }
    }

    fn uniform_1i(&mut self, location: Option<&Location>, value: i32) {
        if let Some(loc) = location {
            self.calls.push(Call::Uniform1i(loc.name.clone(), value));
        }
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        self.calls.push(Call::EnableVertexAttribArray(index));
    }

    fn vertex_attrib_pointer_f32(&mut self, index: u32, components: i32) {
        self.calls.push(Call::VertexAttribPointer(index, components));
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.calls.push(Call::Viewport(x, y, width, height));
    }

    fn clear_color_buffer(&mut self) {
        self.calls.push(Call::Clear);
    }

    fn draw_triangle_strip(&mut self, first: i32, count: i32) {
        self.calls.push(Call::DrawTriangleStrip(first, count));
    }
}
