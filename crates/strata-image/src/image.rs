//! Image descriptor types.
//!
//! An image descriptor (the image "config" document) identifies an image,
//! links it to its parent and layers, and records how it was produced.
//! Descriptors are only built by [`DescriptorParser`](crate::DescriptorParser),
//! which keeps the exact bytes it parsed so the document can be stored again
//! without re-encoding drift.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use strata_common::{Digest, StrataError, StrataResult};

use crate::container_config::ContainerConfig;
use crate::timestamp::Timestamp;

/// Decode `null` as the type's default value.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode a list whose `null` members become the item's default value.
pub(crate) fn nullable_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let items = Option::<Vec<Option<T>>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(items.into_iter().map(Option::unwrap_or_default).collect())
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &i64) -> bool {
    *value == 0
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

/// A parsed image descriptor.
///
/// Fields are read through accessors only: once parsed, a descriptor and its
/// raw bytes never change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    #[serde(flatten)]
    meta: ImageMeta,
    rootfs: RootFs,
    #[serde(skip)]
    raw: Arc<[u8]>,
}

/// Every descriptor field except `rootfs`, in wire order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct ImageMeta {
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    id: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    parent: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    comment: String,
    #[serde(default)]
    created: Timestamp,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    container: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    container_config: Option<ContainerConfig>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    docker_version: String,
    #[serde(default, deserialize_with = "nullable_items", skip_serializing_if = "Vec::is_empty")]
    history: Vec<HistoryEntry>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    config: Option<ContainerConfig>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    architecture: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    os: String,
    #[serde(
        rename = "Size",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "is_zero"
    )]
    size: i64,
}

/// The decoded, not yet validated, form of a descriptor.
#[derive(Debug, Deserialize)]
pub(crate) struct ImageDocument {
    #[serde(flatten)]
    meta: ImageMeta,
    #[serde(default)]
    rootfs: Option<RootFs>,
}

impl Image {
    /// Parse a descriptor with the default parser settings.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::MalformedDescriptor`] if `src` does not decode
    /// and [`StrataError::MissingRootFs`] if it has no `rootfs`.
    pub fn from_json(src: &[u8]) -> StrataResult<Self> {
        crate::DescriptorParser::default().parse(src)
    }

    /// Validate a decoded document and attach its raw bytes.
    pub(crate) fn from_document(document: ImageDocument, raw: Arc<[u8]>) -> StrataResult<Self> {
        let rootfs = document.rootfs.ok_or(StrataError::MissingRootFs)?;
        Ok(Self {
            meta: document.meta,
            rootfs,
            raw,
        })
    }

    /// The exact bytes this descriptor was parsed from.
    #[must_use]
    pub fn raw_json(&self) -> &[u8] {
        &self.raw
    }

    /// SHA-256 digest of [`raw_json`](Self::raw_json).
    ///
    /// This is computed from the stored bytes and is independent of the
    /// carried [`id`](Self::id).
    #[must_use]
    pub fn raw_digest(&self) -> Digest {
        Digest::sha256_of(&self.raw)
    }

    /// Re-encode the descriptor fields.
    ///
    /// The output is not guaranteed to match [`raw_json`](Self::raw_json)
    /// byte for byte.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> StrataResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Image identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.meta.id
    }

    /// Parent image identifier, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        Some(self.meta.parent.as_str()).filter(|p| !p.is_empty())
    }

    /// Returns true if the image has no parent.
    #[must_use]
    pub fn is_base(&self) -> bool {
        self.meta.parent.is_empty()
    }

    /// Commit message.
    #[must_use]
    pub fn comment(&self) -> &str {
        &self.meta.comment
    }

    /// Creation time.
    #[must_use]
    pub const fn created(&self) -> Timestamp {
        self.meta.created
    }

    /// Identifier of the container the image was committed from.
    #[must_use]
    pub fn container(&self) -> &str {
        &self.meta.container
    }

    /// Configuration of the committed container.
    #[must_use]
    pub const fn container_config(&self) -> Option<&ContainerConfig> {
        self.meta.container_config.as_ref()
    }

    /// Version of the engine that built the image.
    #[must_use]
    pub fn docker_version(&self) -> &str {
        &self.meta.docker_version
    }

    /// Build history, oldest step first.
    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.meta.history
    }

    /// Author of the image.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.meta.author
    }

    /// Configuration applied when running the image.
    #[must_use]
    pub const fn config(&self) -> Option<&ContainerConfig> {
        self.meta.config.as_ref()
    }

    /// CPU architecture.
    #[must_use]
    pub fn architecture(&self) -> &str {
        &self.meta.architecture
    }

    /// Operating system.
    #[must_use]
    pub fn os(&self) -> &str {
        &self.meta.os
    }

    /// Total size of all layers in bytes.
    #[must_use]
    pub const fn size(&self) -> i64 {
        self.meta.size
    }

    /// Root filesystem layer chain.
    #[must_use]
    pub const fn rootfs(&self) -> &RootFs {
        &self.rootfs
    }

    /// Number of layers in the root filesystem.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.rootfs.diff_ids.len()
    }

    /// History entries that produced a filesystem layer.
    pub fn non_empty_history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.meta.history.iter().filter(|entry| !entry.empty_layer)
    }

    /// Returns true if every layer has exactly one non-empty history entry.
    ///
    /// Parsing never requires this unless
    /// [`ParserConfig::verify_layer_history`](crate::ParserConfig) is set.
    #[must_use]
    pub fn history_matches_layers(&self) -> bool {
        self.non_empty_history().count() == self.layer_count()
    }

    /// Check [`history_matches_layers`](Self::history_matches_layers).
    ///
    /// Descriptors without any history are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::LayerCountMismatch`] if the counts differ.
    pub fn check_layer_history(&self) -> StrataResult<()> {
        if self.meta.history.is_empty() || self.history_matches_layers() {
            return Ok(());
        }
        Err(StrataError::LayerCountMismatch {
            non_empty_history: self.non_empty_history().count(),
            diff_ids: self.layer_count(),
        })
    }
}

/// Root filesystem information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootFs {
    /// Layer chain scheme (usually "layers").
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub fs_type: String,
    /// Layer diff IDs, bottom layer first.
    #[serde(default, deserialize_with = "nullable_items", skip_serializing_if = "Vec::is_empty")]
    pub diff_ids: Vec<DiffId>,
    /// Base layer for schemes that start from a pre-existing layer.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub base_layer: String,
}

impl RootFs {
    /// The standard layer chain scheme.
    pub const TYPE_LAYERS: &'static str = "layers";

    /// Create a "layers" root filesystem.
    #[must_use]
    pub fn layers(diff_ids: impl IntoIterator<Item = DiffId>) -> Self {
        Self {
            diff_ids: diff_ids.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Base layer, if any.
    #[must_use]
    pub fn base_layer(&self) -> Option<&str> {
        Some(self.base_layer.as_str()).filter(|b| !b.is_empty())
    }
}

impl Default for RootFs {
    fn default() -> Self {
        Self {
            fs_type: Self::TYPE_LAYERS.to_string(),
            diff_ids: Vec::new(),
            base_layer: String::new(),
        }
    }
}

/// Identifier of a layer's uncompressed contents.
///
/// Carried as written; use [`DiffId::digest`] to validate it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiffId(String);

impl DiffId {
    /// Wrap a diff ID string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The diff ID as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the diff ID as a digest.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::InvalidDigest`] if it is not a valid digest.
    pub fn digest(&self) -> StrataResult<Digest> {
        self.0.parse()
    }
}

impl From<Digest> for DiffId {
    fn from(digest: Digest) -> Self {
        Self(digest.to_string())
    }
}

impl fmt::Display for DiffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One build step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Creation timestamp.
    #[serde(default)]
    pub created: Timestamp,
    /// Author.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub author: String,
    /// Command that ran in this step.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub created_by: String,
    /// Comment.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub comment: String,
    /// Whether the step left the filesystem unchanged.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "is_false")]
    pub empty_layer: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYER_A: &str = "sha256:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

    #[test]
    fn rootfs_defaults_to_layers() {
        let rootfs = RootFs::layers([DiffId::new(LAYER_A)]);
        assert_eq!(rootfs.fs_type, "layers");
        assert_eq!(rootfs.base_layer(), None);
        let json = serde_json::to_string(&rootfs).unwrap();
        assert_eq!(json, format!(r#"{{"type":"layers","diff_ids":["{LAYER_A}"]}}"#));
    }

    #[test]
    fn rootfs_type_is_always_written() {
        let rootfs = RootFs {
            fs_type: String::new(),
            diff_ids: Vec::new(),
            base_layer: String::new(),
        };
        assert_eq!(serde_json::to_string(&rootfs).unwrap(), r#"{"type":""}"#);
    }

    #[test]
    fn diff_id_digest() {
        let id = DiffId::new(LAYER_A);
        assert_eq!(id.digest().unwrap().algorithm(), "sha256");
        assert!(DiffId::new("sha256:aa..").digest().is_err());
    }

    #[test]
    fn history_entry_wire_format() {
        let entry: HistoryEntry = serde_json::from_str(
            r#"{"created":"2023-01-01T00:00:00Z","created_by":"/bin/sh -c #(nop) CMD [\"sh\"]","empty_layer":true,"author":null}"#,
        )
        .unwrap();
        assert!(entry.empty_layer);
        assert!(entry.author.is_empty());

        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"created":"2023-01-01T00:00:00Z","created_by":"/bin/sh -c #(nop) CMD [\"sh\"]","empty_layer":true}"#
        );
    }

    #[test]
    fn history_entry_omits_defaults() {
        let json = serde_json::to_string(&HistoryEntry::default()).unwrap();
        assert_eq!(json, r#"{"created":"0001-01-01T00:00:00Z"}"#);
    }

    #[test]
    fn null_list_members_decode_as_defaults() {
        let rootfs: RootFs =
            serde_json::from_str(&format!(r#"{{"type":"layers","diff_ids":[null,"{LAYER_A}"]}}"#))
                .unwrap();
        assert_eq!(rootfs.diff_ids, [DiffId::default(), DiffId::new(LAYER_A)]);

        let document: ImageDocument =
            serde_json::from_str(r#"{"history":[null],"rootfs":{"type":"layers"}}"#).unwrap();
        let image = Image::from_document(document, Arc::from(&b"{}"[..])).unwrap();
        assert_eq!(image.history(), [HistoryEntry::default()]);
    }

    #[test]
    fn missing_rootfs_is_rejected_after_decode() {
        let document: ImageDocument = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        let err = Image::from_document(document, Arc::from(&b"{}"[..])).unwrap_err();
        assert!(matches!(err, StrataError::MissingRootFs));
    }
}
