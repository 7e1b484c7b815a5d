//! Error type shared by every fallible operation on the morph tree.

use std::path::PathBuf;

use thiserror::Error;

use crate::tree::NodeId;

#[derive(Error, Debug)]
pub enum MorphError {
    /// A width, height or scale was negative, zero where not allowed, or not finite.
    #[error("invalid {field}: {value}")]
    InvalidDimension { field: &'static str, value: f32 },
    /// No asset backs the requested texture name.
    #[error("texture `{name}` not found under {}", .base.display())]
    AssetNotFound { name: String, base: PathBuf },
    /// The asset exists but could not be decoded into an RGBA raster.
    #[error("failed to decode {}: {reason}", .path.display())]
    AssetDecode { path: PathBuf, reason: String },
    #[error("property `{0}` is read-only")]
    ReadOnlyProperty(&'static str),
    #[error("property `{property}` expects a {expected} value")]
    PropertyType {
        property: &'static str,
        expected: &'static str,
    },
    #[error("node {0:?} is already registered")]
    DuplicateRegistration(NodeId),
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),
    #[error("the root node cannot be detached")]
    DetachRoot,
    #[error("text shaping failed: {0}")]
    Text(String),
    #[error("GPU error: {0}")]
    Gpu(String),
}

pub type Result<T> = std::result::Result<T, MorphError>;
