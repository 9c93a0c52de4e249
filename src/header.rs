//! The shared header prepended to every fragment pass.
//!
//! A header is, in order: the prelude (precision and per-frame uniforms),
//! one `iBufferK` sampler per buffer-producing pass, one `iTextureK` sampler
//! per static texture, one `#define` per definition, then the caller's common
//! code. [`HeaderBlock::injected_line_count`] records how many lines this
//! adds in front of each pass body so diagnostics can be mapped back.

use serde::{Deserialize, Serialize};

use crate::slots::{buffer_uniform_name, texture_uniform_name};

/// Prelude declaring the per-frame uniforms every pass receives.
pub const DEFAULT_PRELUDE: &str = "precision mediump float;
uniform vec3 iResolution;
uniform float iTime;
uniform int iFrame;
";

/// A preprocessor definition injected as `#define NAME VALUE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub name: String,
    pub value: String,
}

impl Definition {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Composed header text and the number of lines it contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBlock {
    text: String,
    injected_line_count: usize,
}

impl HeaderBlock {
    /// Builds the header for a chain of `pass_count` passes sampling
    /// `texture_count` static textures.
    ///
    /// The final pass renders to the display, so only `pass_count - 1`
    /// buffer samplers are declared.
    pub fn compose(
        prelude: &str,
        pass_count: usize,
        texture_count: usize,
        definitions: &[Definition],
        common: &str,
    ) -> Self {
        let mut text = String::from(prelude);

        for k in 0..pass_count.saturating_sub(1) {
            text.push_str(&format!("uniform sampler2D {};\n", buffer_uniform_name(k)));
        }
        for k in 0..texture_count {
            text.push_str(&format!("uniform sampler2D {};\n", texture_uniform_name(k)));
        }
        for def in definitions {
            text.push_str(&format!("#define {} {}\n", def.name, def.value));
        }
        text.push_str(common);

        let injected_line_count = text.matches('\n').count();
        Self {
            text,
            injected_line_count,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of newline characters in the header.
    pub fn injected_line_count(&self) -> usize {
        self.injected_line_count
    }

    /// Prepends the header to a pass body.
    pub fn apply(&self, body: &str) -> String {
        let mut source = String::with_capacity(self.text.len() + body.len());
        source.push_str(&self.text);
        source.push_str(body);
        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_every_injected_line() {
        let header = HeaderBlock::compose(
            "",
            3,
            2,
            &[Definition::new("STEPS", "64")],
            "float sq(float x) { return x * x; }\nfloat cube(float x) { return x * x * x; }\n",
        );
        assert_eq!(header.injected_line_count(), 2 + 2 + 1 + 2);
    }

    #[test]
    fn emits_declarations_in_order() {
        let header = HeaderBlock::compose(
            "",
            2,
            1,
            &[Definition::new("PI", "3.14159")],
            "// common\n",
        );
        assert_eq!(
            header.text(),
            "uniform sampler2D iBuffer0;\n\
             uniform sampler2D iTexture0;\n\
             #define PI 3.14159\n\
             // common\n"
        );
    }

    #[test]
    fn single_pass_declares_no_buffers() {
        let header = HeaderBlock::compose("", 1, 0, &[], "");
        assert_eq!(header.text(), "");
        assert_eq!(header.injected_line_count(), 0);

        let empty = HeaderBlock::compose("", 0, 0, &[], "");
        assert_eq!(empty.injected_line_count(), 0);
    }

    #[test]
    fn prelude_lines_are_counted() {
        let header = HeaderBlock::compose(DEFAULT_PRELUDE, 1, 0, &[], "");
        assert_eq!(header.injected_line_count(), 4);
        assert!(header.apply("void main() {}").ends_with("uniform int iFrame;\nvoid main() {}"));
    }

    #[test]
    fn common_without_trailing_newline_counts_only_newlines() {
        let header = HeaderBlock::compose("", 1, 0, &[], "#extension GL_OES_standard_derivatives : enable");
        assert_eq!(header.injected_line_count(), 0);
    }
}
