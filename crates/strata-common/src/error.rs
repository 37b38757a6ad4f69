//! Common error types for Strata.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using [`StrataError`].
pub type StrataResult<T> = Result<T, StrataError>;

/// Errors raised while decoding and validating image metadata.
#[derive(Error, Diagnostic, Debug)]
pub enum StrataError {
    /// The bytes do not decode as an image descriptor.
    #[error("Malformed image descriptor at line {line}, column {column}: {message}")]
    #[diagnostic(
        code(strata::descriptor::malformed),
        help("The descriptor must be a JSON object using the image config field layout")
    )]
    MalformedDescriptor {
        /// Decoder message.
        message: String,
        /// Line of the failure (1-based, 0 when unknown).
        line: usize,
        /// Column of the failure (1-based, 0 when unknown).
        column: usize,
    },

    /// The descriptor decoded but carries no root filesystem.
    #[error("Invalid image descriptor: no rootfs key")]
    #[diagnostic(
        code(strata::descriptor::missing_rootfs),
        help("Every image descriptor needs a \"rootfs\" object describing its layer chain")
    )]
    MissingRootFs,

    /// The history does not account for every layer in the root filesystem.
    #[error(
        "Layer history mismatch: {non_empty_history} non-empty history entries for {diff_ids} diff IDs"
    )]
    #[diagnostic(code(strata::descriptor::layer_count))]
    LayerCountMismatch {
        /// History entries that produced a layer.
        non_empty_history: usize,
        /// Diff IDs listed in the root filesystem.
        diff_ids: usize,
    },

    /// The bytes do not decode as an archive manifest index.
    #[error("Malformed manifest index: {message}")]
    #[diagnostic(
        code(strata::manifest::malformed),
        help("An archive manifest index is a JSON array of {{Config, Layers, RepoTags}} objects")
    )]
    MalformedManifest {
        /// Decoder message.
        message: String,
    },

    /// Encoding image metadata failed.
    #[error("Serialization error: {0}")]
    #[diagnostic(code(strata::serialization))]
    Serialization(String),

    /// Invalid digest format.
    #[error("Invalid digest: {digest}")]
    #[diagnostic(
        code(strata::digest::invalid),
        help("Digests look like 'sha256:' followed by 64 lowercase hex characters")
    )]
    InvalidDigest {
        /// The rejected digest string.
        digest: String,
    },
}

impl StrataError {
    /// Build a [`StrataError::MalformedDescriptor`] from a JSON decode error.
    #[must_use]
    pub fn malformed_descriptor(err: &serde_json::Error) -> Self {
        Self::MalformedDescriptor {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }

    /// Build a [`StrataError::MalformedManifest`] from a JSON decode error.
    #[must_use]
    pub fn malformed_manifest(err: &serde_json::Error) -> Self {
        Self::MalformedManifest {
            message: err.to_string(),
        }
    }

    /// Returns true if the error came from decoding rather than validation.
    #[must_use]
    pub const fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedDescriptor { .. } | Self::MalformedManifest { .. }
        )
    }
}

impl From<serde_json::Error> for StrataError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
