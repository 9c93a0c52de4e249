//! Immutable description of a pass chain, built from caller input.
//!
//! [`PipelineDescriptorBuilder`] accepts the raw, loosely shaped input (a pass
//! list that may contain holes, static images, definitions, common code and
//! resource specs) and produces a [`PipelineDescriptor`]: contiguous composed
//! pass sources, merged sampling tables and the two screen sizes.
//!
//! # Example
//!
//! ```
//! use shaderchain::{PipelineDescriptor, ScreenSizes, StaticImage};
//!
//! let descriptor = PipelineDescriptor::builder()
//!     .screen(ScreenSizes::uniform(640, 360))
//!     .texture(StaticImage::solid(1, 1, [255, 0, 0, 255]))
//!     .pass(Some("void main() { gl_FragColor = texture2D(iTexture0, vec2(0.5)); }"))
//!     .pass(None::<&str>)
//!     .pass(Some("void main() { gl_FragColor = texture2D(iBuffer0, gl_FragCoord.xy / iResolution.xy); }"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(descriptor.pass_count(), 2);
//! ```

use glam::UVec2;

use crate::header::{DEFAULT_PRELUDE, Definition, HeaderBlock};
use crate::resource_spec::{ResourceSpec, SamplingParams, SpecTables, merge_specs};
use crate::texture::StaticImage;

/// Vertex stage shared by every pass: a unit quad drawn as a triangle strip.
pub const QUAD_VERTEX_SHADER: &str = "attribute vec2 aPosition;
void main() {
    gl_Position = vec4(aPosition, 0.0, 1.0);
}
";

/// The two resolutions a chain works with.
///
/// `flat` is the native size, reported as `iResolution` to the first pass
/// only. `scaled` sizes every offscreen buffer and every viewport, and is
/// what later passes see as `iResolution`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSizes {
    pub flat: UVec2,
    pub scaled: UVec2,
}

impl ScreenSizes {
    pub fn new(flat: UVec2, scaled: UVec2) -> Self {
        Self { flat, scaled }
    }

    /// Both sizes equal.
    pub fn uniform(width: u32, height: u32) -> Self {
        let size = UVec2::new(width, height);
        Self::new(size, size)
    }

    /// Native size plus a working size scaled by `factor` (rounded, at least 1px).
    pub fn scaled_by(native: UVec2, factor: f32) -> Self {
        let scaled = (native.as_vec2() * factor).round().as_uvec2().max(UVec2::ONE);
        Self::new(native, scaled)
    }
}

impl Default for ScreenSizes {
    fn default() -> Self {
        Self::uniform(1, 1)
    }
}

/// Rejected descriptor input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    #[error("pipeline has no passes")]
    NoPasses,
    #[error("scaled screen size {0}x{1} has a zero dimension")]
    EmptyScreen(u32, u32),
}

/// A validated pass chain ready for compilation.
#[derive(Debug, Clone)]
pub struct PipelineDescriptor {
    passes: Vec<String>,
    textures: Vec<StaticImage>,
    specs: SpecTables,
    screen: ScreenSizes,
    header: HeaderBlock,
    vertex_source: String,
}

impl PipelineDescriptor {
    pub fn builder() -> PipelineDescriptorBuilder {
        PipelineDescriptorBuilder::new()
    }

    /// Composed fragment sources, header included, in chain order.
    pub fn passes(&self) -> &[String] {
        &self.passes
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Number of offscreen buffers: every pass except the last writes one.
    pub fn buffer_count(&self) -> usize {
        self.passes.len().saturating_sub(1)
    }

    pub fn textures(&self) -> &[StaticImage] {
        &self.textures
    }

    pub fn screen(&self) -> ScreenSizes {
        self.screen
    }

    pub fn header(&self) -> &HeaderBlock {
        &self.header
    }

    pub fn vertex_source(&self) -> &str {
        &self.vertex_source
    }

    pub fn specs(&self) -> &SpecTables {
        &self.specs
    }

    pub fn buffer_params(&self, index: usize) -> SamplingParams {
        self.specs.buffer(index)
    }

    pub fn texture_params(&self, index: usize) -> SamplingParams {
        self.specs.texture(index)
    }
}

/// Fluent builder for [`PipelineDescriptor`].
///
/// Passes are added in chain order. `None` entries are placeholders and are
/// dropped, so the remaining passes are renumbered contiguously.
#[derive(Debug, Clone)]
pub struct PipelineDescriptorBuilder {
    passes: Vec<Option<String>>,
    textures: Vec<StaticImage>,
    definitions: Vec<Definition>,
    common: String,
    prelude: String,
    specs: Vec<ResourceSpec>,
    screen: ScreenSizes,
    vertex_source: String,
}

impl PipelineDescriptorBuilder {
    pub fn new() -> Self {
        Self {
            passes: Vec::new(),
            textures: Vec::new(),
            definitions: Vec::new(),
            common: String::new(),
            prelude: DEFAULT_PRELUDE.to_string(),
            specs: Vec::new(),
            screen: ScreenSizes::default(),
            vertex_source: QUAD_VERTEX_SHADER.to_string(),
        }
    }

    pub fn screen(mut self, screen: ScreenSizes) -> Self {
        self.screen = screen;
        self
    }

    /// Replaces the prelude placed before the generated declarations.
    pub fn prelude(mut self, prelude: impl Into<String>) -> Self {
        self.prelude = prelude.into();
        self
    }

    /// Appends a pass body, or a placeholder for `None`.
    pub fn pass<S: Into<String>>(mut self, body: Option<S>) -> Self {
        self.passes.push(body.map(Into::into));
        self
    }

    pub fn passes<I, S>(mut self, bodies: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.passes
            .extend(bodies.into_iter().map(|body| body.map(Into::into)));
        self
    }

    pub fn texture(mut self, image: StaticImage) -> Self {
        self.textures.push(image);
        self
    }

    pub fn textures(mut self, images: impl IntoIterator<Item = StaticImage>) -> Self {
        self.textures.extend(images);
        self
    }

    pub fn definition(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.definitions.push(Definition::new(name, value));
        self
    }

    /// Source shared by every pass, placed after the definitions.
    pub fn common(mut self, common: impl Into<String>) -> Self {
        self.common = common.into();
        self
    }

    pub fn spec(mut self, spec: ResourceSpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn specs(mut self, specs: impl IntoIterator<Item = ResourceSpec>) -> Self {
        self.specs.extend(specs);
        self
    }

    /// Overrides the shared vertex stage. It must declare `attribute vec2 aPosition`.
    pub fn vertex_shader(mut self, source: impl Into<String>) -> Self {
        self.vertex_source = source.into();
        self
    }

    pub fn build(self) -> Result<PipelineDescriptor, DescriptorError> {
        let bodies: Vec<String> = self.passes.into_iter().flatten().collect();
        if bodies.is_empty() {
            return Err(DescriptorError::NoPasses);
        }

        let scaled = self.screen.scaled;
        if scaled.x == 0 || scaled.y == 0 {
            return Err(DescriptorError::EmptyScreen(scaled.x, scaled.y));
        }

        let header = HeaderBlock::compose(
            &self.prelude,
            bodies.len(),
            self.textures.len(),
            &self.definitions,
            &self.common,
        );
        let passes = bodies.iter().map(|body| header.apply(body)).collect();

        Ok(PipelineDescriptor {
            passes,
            textures: self.textures,
            specs: merge_specs(&self.specs),
            screen: self.screen,
            header,
            vertex_source: self.vertex_source,
        })
    }
}

impl Default for PipelineDescriptorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
