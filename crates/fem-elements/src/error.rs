//! Error types for fem-elements

use crate::config::Quadrature;
use crate::topology::Topology;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FemError>;

#[derive(Error, Debug)]
pub enum FemError {
    #[error("Shape function index {index} out of range for {count} nodes")]
    ShapeIndexOutOfRange { index: usize, count: usize },

    #[error("{topology:?} element needs {expected} nodes, got {actual}")]
    NodeCountMismatch {
        topology: Topology,
        expected: usize,
        actual: usize,
    },

    #[error("No element topology has {0} nodes")]
    UnsupportedNodeCount(usize),

    #[error("Node index {index} out of range (model has {len} nodes)")]
    NodeIndexOutOfRange { index: usize, len: usize },

    #[error("Block dimension mismatch: expected {expected:?}, got {actual:?}")]
    BlockDimension {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Quadrature {quadrature:?} not available for {topology:?} elements")]
    UnsupportedQuadrature {
        topology: Topology,
        quadrature: Quadrature,
    },

    #[error("No Gauss-Legendre rule with {0} points (1 to 4 supported)")]
    UnsupportedGaussOrder(usize),

    #[error("No block stored for node pair ({row}, {col})")]
    MissingBlock { row: usize, col: usize },

    #[error("Singular Jacobian in element {element} at integration point {point}")]
    SingularJacobian { element: usize, point: usize },

    #[error("Cannot triangulate a face with {0} nodes")]
    UnsupportedFace(usize),

    #[error("Numerical failure: {0}")]
    Numerical(String),

    #[error("Invalid material: {0}")]
    InvalidMaterial(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fails unless `actual` equals the `expected` block shape.
pub(crate) fn check_dims(expected: (usize, usize), actual: (usize, usize)) -> Result<()> {
    if expected != actual {
        return Err(FemError::BlockDimension { expected, actual });
    }
    Ok(())
}
