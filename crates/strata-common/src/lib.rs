//! # strata-common
//!
//! Shared types for the Strata image tooling.
//!
//! This crate provides:
//! - The common error type and result alias
//! - Content-addressable digests

#![warn(missing_docs)]

pub mod digest;
pub mod error;

pub use digest::Digest;
pub use error::{StrataError, StrataResult};
