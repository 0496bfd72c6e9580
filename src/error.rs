use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while building, persisting or restoring a sequence.
///
/// Node-level contract violations (wrong buffer length, `backward` without a
/// matching `forward`) are not represented here; those panic.
#[derive(Error, Debug)]
pub enum SeqnetError {
    #[error("could not open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("incorrect file format: magic tag {found:?}")]
    BadMagic { found: [u8; 4] },

    #[error("incorrect layer count: model has {expected}, file has {found}")]
    LayerCountMismatch { expected: usize, found: usize },

    #[error("layer {layer}: {tensor} count does not match: {found} != {expected}")]
    ParameterCountMismatch {
        layer: usize,
        tensor: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("layer {layer}: {which} shape rank does not match: {found} != {expected}")]
    ShapeRankMismatch {
        layer: usize,
        which: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("layer {layer}: {which} shape dimension {dim} does not match: {found} != {expected}")]
    ShapeDimMismatch {
        layer: usize,
        which: &'static str,
        dim: usize,
        expected: u32,
        found: u32,
    },

    #[error("invalid architecture spec: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid architecture spec: node {node}: {reason}")]
    InvalidSpec { node: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, SeqnetError>;
