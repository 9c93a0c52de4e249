//! Texture-unit assignment for pass inputs.
//!
//! Within pass `i` the inputs are the `i` earlier buffers followed by every
//! static texture. Buffer input `k` goes to unit `k`. Static texture `k` goes
//! to unit `k + buffer_count + i`, which for the full chain is `k + 2i`.
//!
//! The extra `+ i` keeps textures clear of buffer units but wastes units as
//! chains grow. Nothing here checks the result against the backend's unit
//! count; [`PassSlots::exceeds_guaranteed_units`] lets the compiler warn when
//! a pass goes past [`MIN_GUARANTEED_TEXTURE_UNITS`].

/// Fragment texture units every GLES 2 / WebGL 1 implementation must provide.
pub const MIN_GUARANTEED_TEXTURE_UNITS: u32 = 8;

/// Uniform name of buffer `k` as declared in the header.
pub fn buffer_uniform_name(k: usize) -> String {
    format!("iBuffer{k}")
}

/// Uniform name of static texture `k` as declared in the header.
pub fn texture_uniform_name(k: usize) -> String {
    format!("iTexture{k}")
}

/// Unit layout for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSlots {
    pub pass_index: usize,
    pub buffer_count: usize,
    pub texture_count: usize,
}

impl PassSlots {
    /// Slots for pass `pass_index` of a chain, which may read every earlier buffer.
    pub fn for_pass(pass_index: usize, texture_count: usize) -> Self {
        Self {
            pass_index,
            buffer_count: pass_index,
            texture_count,
        }
    }

    pub fn buffer_unit(&self, k: usize) -> u32 {
        k as u32
    }

    pub fn texture_unit(&self, k: usize) -> u32 {
        (k + self.buffer_count + self.pass_index) as u32
    }

    /// Highest unit this pass binds, if it binds anything.
    pub fn highest_unit(&self) -> Option<u32> {
        if self.texture_count > 0 {
            Some(self.texture_unit(self.texture_count - 1))
        } else if self.buffer_count > 0 {
            Some(self.buffer_unit(self.buffer_count - 1))
        } else {
            None
        }
    }

    pub fn exceeds_guaranteed_units(&self) -> bool {
        self.highest_unit()
            .is_some_and(|unit| unit >= MIN_GUARANTEED_TEXTURE_UNITS)
    }
}
