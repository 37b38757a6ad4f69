//! Archive manifest indexes.
//!
//! An image archive (as produced by `docker save`) lists its images in a
//! `manifest.json` index: one entry per image, pointing at the serialized
//! descriptor and the layer blobs inside the archive.

use serde::{Deserialize, Serialize};
use strata_common::{Digest, StrataError, StrataResult};

use crate::image::{Image, nullable, nullable_items};

/// Location of one image's descriptor and layers inside an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Manifest {
    /// Path to the serialized [`Image`] descriptor.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub config: String,
    /// Paths to layer blobs, in the same order as the descriptor's diff IDs.
    #[serde(default, deserialize_with = "nullable_items", skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<String>,
    /// Tags naming this image.
    #[serde(default, deserialize_with = "nullable_items", skip_serializing_if = "Vec::is_empty")]
    pub repo_tags: Vec<String>,
}

impl Manifest {
    /// Digest of the descriptor, derived from its path.
    ///
    /// Understands `blobs/<algorithm>/<encoded>` and `<hex>.json` layouts.
    #[must_use]
    pub fn config_digest(&self) -> Option<Digest> {
        let path = self.config.trim_start_matches("./");
        if let Some(rest) = path.strip_prefix("blobs/") {
            let (algorithm, encoded) = rest.split_once('/')?;
            return Digest::new(algorithm, encoded).ok();
        }
        let file = path.rsplit('/').next()?;
        let hex = file.strip_suffix(".json")?;
        Digest::new(Digest::SHA256, hex).ok()
    }

    /// Returns true if `tag` names this image.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.repo_tags.iter().any(|t| t == tag)
    }

    /// Returns true if the manifest lists one blob per layer of `image`.
    #[must_use]
    pub fn matches_layers(&self, image: &Image) -> bool {
        self.layers.len() == image.layer_count()
    }
}

/// An archive manifest index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifests(Vec<Manifest>);

impl Manifests {
    /// Parse a `manifest.json` index.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::MalformedManifest`] if `src` does not decode.
    pub fn from_json(src: &[u8]) -> StrataResult<Self> {
        let manifests: Self = serde_json::from_slice(src).map_err(|e| {
            tracing::debug!(error = %e, "Manifest index does not decode");
            StrataError::malformed_manifest(&e)
        })?;
        tracing::debug!(images = manifests.len(), "Parsed manifest index");
        Ok(manifests)
    }

    /// Encode the index.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> StrataResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Number of images in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the index lists no images.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, Manifest> {
        self.0.iter()
    }

    /// Find the entry carrying `tag`.
    #[must_use]
    pub fn find_by_tag(&self, tag: &str) -> Option<&Manifest> {
        self.0.iter().find(|m| m.has_tag(tag))
    }

    /// Consume the index and return its entries.
    #[must_use]
    pub fn into_inner(self) -> Vec<Manifest> {
        self.0
    }
}

impl From<Vec<Manifest>> for Manifests {
    fn from(entries: Vec<Manifest>) -> Self {
        Self(entries)
    }
}

impl FromIterator<Manifest> for Manifests {
    fn from_iter<I: IntoIterator<Item = Manifest>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Manifests {
    type Item = &'a Manifest;
    type IntoIter = std::slice::Iter<'a, Manifest>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
