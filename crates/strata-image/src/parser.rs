//! Descriptor parsing.

use std::sync::Arc;

use serde_json::Value;
use strata_common::{StrataError, StrataResult};

use crate::image::{Image, ImageDocument};

/// Parser configuration options.
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    /// Require one non-empty history entry per layer.
    pub verify_layer_history: bool,
}

impl ParserConfig {
    /// Create a configuration that enables every optional check.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            verify_layer_history: true,
        }
    }

    /// Enable the layer history check.
    #[must_use]
    pub fn with_layer_history_check(mut self) -> Self {
        self.verify_layer_history = true;
        self
    }
}

/// Decodes and validates image descriptors.
///
/// Parsing runs in two phases: the bytes are decoded, then the decoded
/// document is validated. Only a document that passes validation becomes an
/// [`Image`], and it keeps a copy of the input bytes.
#[derive(Debug, Clone, Default)]
pub struct DescriptorParser {
    config: ParserConfig,
}

impl DescriptorParser {
    /// Create a parser with the given configuration.
    #[must_use]
    pub const fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// The parser configuration.
    #[must_use]
    pub const fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a descriptor.
    ///
    /// # Errors
    ///
    /// - [`StrataError::MalformedDescriptor`] if `src` does not decode.
    /// - [`StrataError::MissingRootFs`] if the descriptor has no `rootfs`.
    /// - [`StrataError::LayerCountMismatch`] if the layer history check is
    ///   enabled and fails.
    pub fn parse(&self, src: &[u8]) -> StrataResult<Image> {
        tracing::trace!(len = src.len(), "Parsing image descriptor");

        // Invalid UTF-8 becomes U+FFFD; repeated keys keep the last value.
        let text = String::from_utf8_lossy(src);
        let document = serde_json::from_str::<Value>(&text)
            .and_then(serde_json::from_value::<ImageDocument>)
            .map_err(|e| {
                tracing::debug!(error = %e, "Image descriptor does not decode");
                StrataError::malformed_descriptor(&e)
            })?;

        let image = Image::from_document(document, Arc::from(src)).inspect_err(|_| {
            tracing::debug!("Image descriptor has no rootfs");
        })?;

        if self.config.verify_layer_history {
            image.check_layer_history()?;
        }

        tracing::debug!(
            id = image.id(),
            layers = image.layer_count(),
            history = image.history().len(),
            "Parsed image descriptor"
        );

        Ok(image)
    }
}
