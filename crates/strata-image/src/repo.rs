//! Repository and layer browsing views.
//!
//! These are plain data carriers filled in by tooling that unpacks images
//! and walks their layer filesystems. Nothing here touches the filesystem.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::timestamp::Timestamp;

/// A tagged image and its unpacked layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    /// Tag naming the image.
    pub tag: String,
    /// Version of the engine that built the image.
    pub docker_version: String,
    /// Creation time.
    pub created: Timestamp,
    /// Layers, bottom layer first.
    pub layers: Vec<Layer>,
}

impl Repo {
    /// Sum of all layer sizes in bytes, saturating at `u64::MAX`.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.layers
            .iter()
            .map(|layer| layer.size)
            .fold(0, u64::saturating_add)
    }
}

/// One unpacked layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    /// Directory the layer was unpacked into.
    pub root: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Build command that produced the layer.
    pub command: String,
    /// Top-level entries of the layer.
    pub files: Vec<LayerFile>,
}

impl Layer {
    /// Number of entries in the layer, at any depth.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.iter().map(LayerFile::count).sum()
    }
}

/// A file or directory inside a layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerFile {
    /// Base name.
    pub name: String,
    /// Path relative to the layer root.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Entries below a directory.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayerFile>,
}

impl LayerFile {
    /// This entry plus every entry below it.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }
}
