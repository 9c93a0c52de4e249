//! Per-resource sampling configuration.
//!
//! Callers describe buffers and static textures with loosely shaped metadata
//! (a kind tag plus a `meta` object keyed by `id`). This module turns that
//! into closed records: [`merge_specs`] drops incomplete or unrecognised
//! entries and fills every option the caller left out with its default.
//!
//! # JSON shape
//!
//! ```json
//! [
//!     { "type": "Buffer",  "meta": { "id": 0, "filter": "NEAREST" } },
//!     { "type": "Texture", "meta": { "id": 1 } }
//! ]
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Texture minification/magnification mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterMode {
    #[default]
    Linear,
    Nearest,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

impl FilterMode {
    /// The mode usable for magnification. Mipmap variants collapse to their base filter.
    pub fn magnification(self) -> Self {
        match self {
            Self::Linear | Self::LinearMipmapNearest | Self::LinearMipmapLinear => Self::Linear,
            Self::Nearest | Self::NearestMipmapNearest | Self::NearestMipmapLinear => {
                Self::Nearest
            }
        }
    }
}

/// Which keyspace a resource spec belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Buffer,
    Texture,
    /// Any other tag. Kept so deserialization succeeds; dropped by [`merge_specs`].
    #[serde(other)]
    Unknown,
}

/// Caller-provided metadata for one resource. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceMeta {
    pub id: Option<u32>,
    pub filter: Option<FilterMode>,
}

impl ResourceMeta {
    pub fn with_id(id: u32) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn filter(mut self, filter: FilterMode) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// A tagged resource spec as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    #[serde(default)]
    pub meta: Option<ResourceMeta>,
}

impl ResourceSpec {
    pub fn new(kind: ResourceKind, meta: ResourceMeta) -> Self {
        Self {
            kind,
            meta: Some(meta),
        }
    }

    pub fn buffer(meta: ResourceMeta) -> Self {
        Self::new(ResourceKind::Buffer, meta)
    }

    pub fn texture(meta: ResourceMeta) -> Self {
        Self::new(ResourceKind::Texture, meta)
    }
}

/// Resolved sampling parameters for one resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SamplingParams {
    pub filter: FilterMode,
}

impl SamplingParams {
    /// Takes each option from `meta` when present, otherwise its default.
    pub fn merged(meta: &ResourceMeta) -> Self {
        let defaults = Self::default();
        Self {
            filter: meta.filter.unwrap_or(defaults.filter),
        }
    }
}

/// Merged specs for both keyspaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecTables {
    pub buffers: BTreeMap<u32, SamplingParams>,
    pub textures: BTreeMap<u32, SamplingParams>,
}

impl SpecTables {
    /// Sampling parameters for buffer `id`, falling back to defaults.
    pub fn buffer(&self, id: usize) -> SamplingParams {
        lookup(&self.buffers, id)
    }

    /// Sampling parameters for static texture `id`, falling back to defaults.
    pub fn texture(&self, id: usize) -> SamplingParams {
        lookup(&self.textures, id)
    }
}

fn lookup(table: &BTreeMap<u32, SamplingParams>, id: usize) -> SamplingParams {
    u32::try_from(id)
        .ok()
        .and_then(|id| table.get(&id).copied())
        .unwrap_or_default()
}

/// Sorts specs into their keyspaces. Entries without an `id` and entries of
/// an unknown kind are skipped; a later entry for the same id replaces an
/// earlier one.
pub fn merge_specs<'a>(specs: impl IntoIterator<Item = &'a ResourceSpec>) -> SpecTables {
    let mut tables = SpecTables::default();

    for spec in specs {
        let Some(meta) = &spec.meta else {
            continue;
        };
        let Some(id) = meta.id else {
            continue;
        };

        let table = match spec.kind {
            ResourceKind::Buffer => &mut tables.buffers,
            ResourceKind::Texture => &mut tables.textures,
            ResourceKind::Unknown => continue,
        };
        table.insert(id, SamplingParams::merged(meta));
    }

    tables
}
