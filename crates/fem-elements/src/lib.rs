//! Element formulation and assembly core for 3D finite element models.
//!
//! This crate provides:
//! - **Topology descriptors** for linear and quadratic tetrahedra, hexahedra,
//!   wedges and pyramids, and triangular/quadrilateral shells
//! - **Shape functions**, pressure bases and natural-coordinate domains
//! - **Quadrature rules** and process-wide integration point caches
//! - **Elements** over a shared node array: Jacobians, volumes, rest data,
//!   natural coordinates, mass, rotation and nodal extrapolation
//! - **Assembly kernels** for node-pair stiffness and stress forces, with
//!   lock-guarded node-pair storage for parallel assembly
//!
//! Warnings raised while building elements go through an injected
//! [`Diagnostics`] value and the `log` facade; the crate never installs a
//! logger.

pub mod blocks;
pub mod config;
pub mod diagnostics;
pub mod element;
mod elements;
pub mod error;
pub mod extrapolation;
pub mod factory;
pub mod faces;
pub mod integration;
pub mod kernels;
pub mod materials;
pub mod node;
pub mod quadrature;
pub mod shape;
pub mod stiffness;
pub mod topology;

pub use blocks::{assemble_dense, assemble_parallel, NodePairBlocks};
pub use config::{ElementConfig, Quadrature};
pub use diagnostics::{DiagnosticKind, Diagnostics};
pub use element::{init_shell_directors, polar_rotation, Element, NaturalCoordinates, PointGeometry};
pub use error::{FemError, Result};
pub use extrapolation::ExtrapolationBasis;
pub use factory::{create_element, create_flipped, create_topology_element};
pub use integration::{IntegrationData, IntegrationPoint};
pub use materials::{DeformedPoint, IncompressibleLinearMaterial, LinearMaterial, Material};
pub use node::{Configuration, Node};
pub use quadrature::QuadraturePoint;
pub use stiffness::{ElementModel, IncompressibleState};
pub use topology::{ElementClass, Topology, TopologyDescriptor};
