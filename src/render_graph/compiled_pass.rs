//! One linked fragment pass and its cached uniform locations.

use crate::backend::{GraphicsBackend, ShaderStage};
use crate::diagnostics::remap_diagnostic;
use crate::render_graph::CompileError;
use crate::slots::{PassSlots, buffer_uniform_name, texture_uniform_name};

/// A linked program for pass `index` of the chain.
///
/// `buffer_uniforms` has one entry per earlier buffer (`iBuffer0` up to
/// `iBuffer{index - 1}`) and `texture_uniforms` one per static texture. An
/// entry is `None` when the shader never references that sampler; such
/// inputs are skipped at draw time.
#[derive(Debug)]
pub struct CompiledPass<B: GraphicsBackend> {
    pub index: usize,
    pub program: B::Program,
    pub fragment_shader: B::Shader,
    pub position: Option<u32>,
    pub resolution: Option<B::UniformLocation>,
    pub time: Option<B::UniformLocation>,
    pub frame: Option<B::UniformLocation>,
    pub buffer_uniforms: Vec<Option<B::UniformLocation>>,
    pub texture_uniforms: Vec<Option<B::UniformLocation>>,
    pub slots: PassSlots,
}

impl<B: GraphicsBackend> CompiledPass<B> {
    /// Compiles `source`, links it against `vertex_shader` and resolves locations.
    ///
    /// Compile and link logs are remapped by `header_lines` before they are
    /// logged or returned.
    pub fn build(
        backend: &mut B,
        vertex_shader: B::Shader,
        index: usize,
        source: &str,
        header_lines: usize,
        texture_count: usize,
    ) -> Result<Self, CompileError> {
        let fragment_shader = backend.create_shader(ShaderStage::Fragment)?;
        backend.shader_source(fragment_shader, source);
        backend.compile_shader(fragment_shader);

        if !backend.shader_compile_status(fragment_shader) {
            let message = remap_diagnostic(&backend.shader_info_log(fragment_shader), header_lines);
            tracing::error!(pass = index, "Error compiling shader: {message}");
            backend.delete_shader(fragment_shader);
            return Err(CompileError::Fragment {
                pass_index: index,
                message,
            });
        }

        let program = match backend.create_program() {
            Ok(program) => program,
            Err(err) => {
                backend.delete_shader(fragment_shader);
                return Err(err.into());
            }
        };
        backend.attach_shader(program, vertex_shader);
        backend.attach_shader(program, fragment_shader);
        backend.link_program(program);

        if !backend.program_link_status(program) {
            let message = remap_diagnostic(&backend.program_info_log(program), header_lines);
            tracing::error!(pass = index, "Error linking program: {message}");
            backend.delete_program(program);
            backend.delete_shader(fragment_shader);
            return Err(CompileError::Link {
                pass_index: index,
                message,
            });
        }

        let slots = PassSlots::for_pass(index, texture_count);
        if let Some(unit) = slots.highest_unit().filter(|_| slots.exceeds_guaranteed_units()) {
            tracing::warn!(
                pass = index,
                "Pass binds texture unit {unit}, beyond the {} units every backend guarantees",
                crate::slots::MIN_GUARANTEED_TEXTURE_UNITS
            );
        }

        let buffer_uniforms = (0..slots.buffer_count)
            .map(|k| backend.uniform_location(program, &buffer_uniform_name(k)))
            .collect();
        let texture_uniforms = (0..texture_count)
            .map(|k| backend.uniform_location(program, &texture_uniform_name(k)))
            .collect();

        Ok(Self {
            index,
            program,
            fragment_shader,
            position: backend.attrib_location(program, "aPosition"),
            resolution: backend.uniform_location(program, "iResolution"),
            time: backend.uniform_location(program, "iTime"),
            frame: backend.uniform_location(program, "iFrame"),
            buffer_uniforms,
            texture_uniforms,
            slots,
        })
    }

    pub fn destroy(self, backend: &mut B) {
        backend.delete_program(self.program);
        backend.delete_shader(self.fragment_shader);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, RecordingBackend, SYNTAX_ERROR};

    fn vertex(backend: &mut RecordingBackend) -> u32 {
        let shader = backend.create_shader(ShaderStage::Vertex).unwrap();
        backend.shader_source(shader, crate::descriptor::QUAD_VERTEX_SHADER);
        backend.compile_shader(shader);
        shader
    }

    const HEADER: &str = "uniform vec3 iResolution;\nuniform sampler2D iBuffer0;\nuniform sampler2D iBuffer1;\nuniform sampler2D iTexture0;\n";

    #[test]
    fn resolves_only_earlier_buffers() {
        let mut backend = RecordingBackend::new();
        let vs = vertex(&mut backend);
        let source = format!("{HEADER}void main() {{}}");

        let first = CompiledPass::build(&mut backend, vs, 0, &source, 4, 1).unwrap();
        assert!(first.buffer_uniforms.is_empty());
        assert_eq!(first.texture_uniforms.len(), 1);

        let third = CompiledPass::build(&mut backend, vs, 2, &source, 4, 1).unwrap();
        assert_eq!(third.buffer_uniforms.len(), 2);
        assert!(third.buffer_uniforms.iter().all(Option::is_some));
        assert_eq!(third.position, Some(0));
        assert!(third.resolution.is_some());
        assert!(third.time.is_none());
    }

    #[test]
    fn unreferenced_samplers_stay_unresolved() {
        let mut backend = RecordingBackend::new();
        let vs = vertex(&mut backend);
        let pass = CompiledPass::build(&mut backend, vs, 1, "void main() {}", 0, 2).unwrap();
        assert_eq!(pass.buffer_uniforms, vec![None]);
        assert_eq!(pass.texture_uniforms, vec![None, None]);
    }

    #[test]
    fn compile_errors_point_into_the_body() {
        let mut backend = RecordingBackend::new();
        let vs = vertex(&mut backend);
        let source = format!("{HEADER}void main() {{\n  {SYNTAX_ERROR};\n}}");

        let err = CompiledPass::build(&mut backend, vs, 3, &source, 4, 1).unwrap_err();
        match err {
            CompileError::Fragment {
                pass_index,
                message,
            } => {
                assert_eq!(pass_index, 3);
                assert!(message.starts_with("ERROR: 0:2:"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(backend.count(|c| matches!(c, Call::CreateProgram(_))), 0);
    }
}
