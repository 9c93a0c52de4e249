//! Offscreen buffers and static textures owned by a compiled pipeline.

use glam::UVec2;

use crate::backend::{BackendError, FramebufferStatus, GraphicsBackend};
use crate::resource_spec::SamplingParams;
use crate::texture::StaticImage;

/// An offscreen render target (framebuffer + colour texture) written by one pass.
///
/// Pass `i` of an `N`-pass chain owns buffer `i` for `i < N - 1`. Buffers are
/// created once per compile and live until the pipeline is destroyed.
#[derive(Debug)]
pub struct CompiledBuffer<B: GraphicsBackend> {
    pub framebuffer: B::Framebuffer,
    pub texture: B::Texture,
    pub size: UVec2,
    /// Whether the backend reported the attachment set complete.
    pub complete: bool,
}

impl<B: GraphicsBackend> CompiledBuffer<B> {
    /// Allocates the target at `size` and applies `params`.
    ///
    /// An incomplete framebuffer is logged and kept.
    pub fn create(
        backend: &mut B,
        index: usize,
        size: UVec2,
        params: SamplingParams,
    ) -> Result<Self, BackendError> {
        let framebuffer = backend.create_framebuffer()?;
        let texture = match backend.create_texture() {
            Ok(texture) => texture,
            Err(err) => {
                backend.delete_framebuffer(framebuffer);
                return Err(err);
            }
        };

        backend.bind_texture(Some(texture));
        backend.allocate_texture(size.x, size.y);
        apply_sampling(backend, params);
        backend.generate_mipmap();

        backend.bind_framebuffer(Some(framebuffer));
        backend.attach_color_texture(texture);

        let complete = match backend.framebuffer_status() {
            FramebufferStatus::Complete => true,
            FramebufferStatus::Incomplete(code) => {
                tracing::warn!(buffer = index, "Framebuffer not complete (status 0x{code:x})");
                false
            }
        };

        backend.bind_framebuffer(None);
        backend.bind_texture(None);

        Ok(Self {
            framebuffer,
            texture,
            size,
            complete,
        })
    }

    pub fn destroy(self, backend: &mut B) {
        backend.delete_framebuffer(self.framebuffer);
        backend.delete_texture(self.texture);
    }
}

/// A static image uploaded to the GPU, sampled as `iTextureK`.
#[derive(Debug)]
pub struct CompiledTexture<B: GraphicsBackend> {
    pub texture: B::Texture,
    pub size: UVec2,
}

impl<B: GraphicsBackend> CompiledTexture<B> {
    pub fn upload(
        backend: &mut B,
        image: &StaticImage,
        params: SamplingParams,
    ) -> Result<Self, BackendError> {
        let texture = backend.create_texture()?;

        backend.bind_texture(Some(texture));
        backend.upload_texture(image);
        apply_sampling(backend, params);
        backend.generate_mipmap();

        Ok(Self {
            texture,
            size: UVec2::new(image.width, image.height),
        })
    }

    pub fn destroy(self, backend: &mut B) {
        backend.delete_texture(self.texture);
    }
}

/// Sets min/mag filtering on the bound texture.
fn apply_sampling<B: GraphicsBackend>(backend: &mut B, params: SamplingParams) {
    backend.set_texture_filter(params.filter, params.filter.magnification());
}
