//! # strata-image
//!
//! Container image descriptors for Strata.
//!
//! This crate provides:
//! - The image descriptor model ([`Image`], [`RootFs`], [`HistoryEntry`])
//! - A parser that validates descriptors and keeps their exact bytes
//! - Archive manifest indexes ([`Manifest`], [`Manifests`])
//! - Data carriers for repository and layer browsing views

#![warn(missing_docs)]

pub mod container_config;
pub mod image;
pub mod manifest;
pub mod parser;
pub mod repo;
pub mod timestamp;

pub use container_config::ContainerConfig;
pub use image::{DiffId, HistoryEntry, Image, RootFs};
pub use manifest::{Manifest, Manifests};
pub use parser::{DescriptorParser, ParserConfig};
pub use repo::{Layer, LayerFile, Repo};
pub use strata_common::{Digest, StrataError, StrataResult};
pub use timestamp::Timestamp;
