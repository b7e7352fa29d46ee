//! Element topologies and their constant descriptor table.
//!
//! Every concrete element type is one [`Topology`] variant with one
//! [`TopologyDescriptor`] row. The row carries the natural-coordinate node
//! template, connectivity, mass weights, the inverse-orientation permutation
//! and function pointers for the shape, pressure and quadrature tables.

use crate::config::Quadrature;
use crate::elements;
use crate::error::{FemError, Result};
use crate::extrapolation::ExtrapolationBasis;
use crate::quadrature::QuadraturePoint;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Concrete element topology
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Topology {
    /// 4-node linear tetrahedron
    Tet,
    /// 8-node trilinear hexahedron
    Hex,
    /// 6-node linear wedge (triangular prism)
    Wedge,
    /// 5-node linear pyramid
    Pyramid,
    /// 10-node quadratic tetrahedron
    QuadTet,
    /// 20-node serendipity hexahedron
    QuadHex,
    /// 15-node quadratic wedge
    QuadWedge,
    /// 13-node quadratic pyramid
    QuadPyramid,
    /// 3-node triangular shell
    ShellTri,
    /// 4-node quadrilateral shell
    ShellQuad,
}

/// How an element maps natural coordinates to space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ElementClass {
    /// Solid element, Jacobian from node positions only
    #[default]
    Volumetric,
    /// Thick shell, through-thickness direction from node directors
    Shell,
    /// Membrane, third Jacobian column is the unit surface normal
    Membrane,
}

impl ElementClass {
    pub const COUNT: usize = 3;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Constant per-topology data and evaluation functions.
pub struct TopologyDescriptor {
    pub topology: Topology,
    pub name: &'static str,
    /// Natural coordinates of each node
    pub node_coords: &'static [[f64; 3]],
    /// Linear sub-topology whose nodes are the leading corner nodes
    pub linear: Topology,
    /// Edge node lists (2 nodes, or 3 with the mid-edge node in the middle)
    pub edges: &'static [&'static [usize]],
    /// Face node lists, counter-clockwise about the outward normal
    pub faces: &'static [&'static [usize]],
    /// Node permutation that reverses the element orientation
    pub inverse_ordering: &'static [usize],
    /// Lumped mass fractions (sum to 1, quadratic corners are negative)
    pub mass_weights: &'static [f64],
    /// Measure of the natural-coordinate domain
    pub reference_measure: f64,
    pub num_pressure_values: usize,
    /// Natural coordinates of the warping point
    pub warping_coords: [f64; 3],
    /// Supported explicit rules; the first is the default
    pub quadratures: &'static [Quadrature],
    /// Unchecked basis functions; the index must be in range. Public callers
    /// go through [`crate::shape`].
    pub(crate) shape: fn(usize, &Vector3<f64>) -> f64,
    pub(crate) shape_gradient: fn(usize, &Vector3<f64>) -> Vector3<f64>,
    pub(crate) pressure_shape: fn(usize, &Vector3<f64>) -> f64,
    pub contains: fn(&Vector3<f64>) -> bool,
    pub rule: fn(Quadrature, ElementClass) -> Vec<QuadraturePoint>,
    pub extrapolation: fn(Quadrature, ElementClass) -> ExtrapolationBasis,
}

impl Topology {
    pub const COUNT: usize = 10;

    pub const ALL: [Topology; Topology::COUNT] = [
        Topology::Tet,
        Topology::Hex,
        Topology::Wedge,
        Topology::Pyramid,
        Topology::QuadTet,
        Topology::QuadHex,
        Topology::QuadWedge,
        Topology::QuadPyramid,
        Topology::ShellTri,
        Topology::ShellQuad,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn descriptor(self) -> &'static TopologyDescriptor {
        match self {
            Topology::Tet => &elements::tet::DESCRIPTOR,
            Topology::Hex => &elements::hex::DESCRIPTOR,
            Topology::Wedge => &elements::wedge::DESCRIPTOR,
            Topology::Pyramid => &elements::pyramid::DESCRIPTOR,
            Topology::QuadTet => &elements::quad_tet::DESCRIPTOR,
            Topology::QuadHex => &elements::quad_hex::DESCRIPTOR,
            Topology::QuadWedge => &elements::quad_wedge::DESCRIPTOR,
            Topology::QuadPyramid => &elements::quad_pyramid::DESCRIPTOR,
            Topology::ShellTri => &elements::shell::TRI_DESCRIPTOR,
            Topology::ShellQuad => &elements::shell::QUAD_DESCRIPTOR,
        }
    }

    /// Volumetric topology with the given node count.
    pub fn from_node_count(num_nodes: usize) -> Result<Topology> {
        match num_nodes {
            4 => Ok(Topology::Tet),
            5 => Ok(Topology::Pyramid),
            6 => Ok(Topology::Wedge),
            8 => Ok(Topology::Hex),
            10 => Ok(Topology::QuadTet),
            13 => Ok(Topology::QuadPyramid),
            15 => Ok(Topology::QuadWedge),
            20 => Ok(Topology::QuadHex),
            n => Err(FemError::UnsupportedNodeCount(n)),
        }
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    pub fn num_nodes(self) -> usize {
        self.descriptor().node_coords.len()
    }

    pub fn node_coords(self) -> &'static [[f64; 3]] {
        self.descriptor().node_coords
    }

    pub fn node_coord(self, i: usize) -> Result<Vector3<f64>> {
        let coords = self.node_coords();
        let c = coords.get(i).ok_or(FemError::ShapeIndexOutOfRange {
            index: i,
            count: coords.len(),
        })?;
        Ok(Vector3::new(c[0], c[1], c[2]))
    }

    pub fn is_shell(self) -> bool {
        matches!(self, Topology::ShellTri | Topology::ShellQuad)
    }

    pub fn is_quadratic(self) -> bool {
        self.descriptor().linear != self
    }

    pub fn linear(self) -> Topology {
        self.descriptor().linear
    }

    pub fn edges(self) -> &'static [&'static [usize]] {
        self.descriptor().edges
    }

    pub fn faces(self) -> &'static [&'static [usize]] {
        self.descriptor().faces
    }

    pub fn inverse_ordering(self) -> &'static [usize] {
        self.descriptor().inverse_ordering
    }

    pub fn mass_weights(self) -> &'static [f64] {
        self.descriptor().mass_weights
    }

    pub fn reference_measure(self) -> f64 {
        self.descriptor().reference_measure
    }

    pub fn num_pressure_values(self) -> usize {
        self.descriptor().num_pressure_values
    }

    /// Map `Standard` to the default rule and reject unsupported choices.
    pub fn resolve_quadrature(self, quadrature: Quadrature) -> Result<Quadrature> {
        let supported = self.descriptor().quadratures;
        if quadrature == Quadrature::Standard {
            return Ok(supported[0]);
        }
        if supported.contains(&quadrature) {
            Ok(quadrature)
        } else {
            Err(FemError::UnsupportedQuadrature {
                topology: self,
                quadrature,
            })
        }
    }

    /// Check that a class can be used with this topology.
    pub fn check_class(self, class: ElementClass) -> Result<()> {
        let valid = match class {
            ElementClass::Volumetric => !self.is_shell(),
            ElementClass::Shell | ElementClass::Membrane => self.is_shell(),
        };
        if valid {
            Ok(())
        } else {
            Err(FemError::InvalidConfig(format!(
                "{:?} elements cannot use the {:?} class",
                self, class
            )))
        }
    }
}

/// Pressure basis for elements with a single constant pressure.
pub(crate) fn constant_pressure(_i: usize, _coords: &Vector3<f64>) -> f64 {
    1.0
}

/// Pressure basis for elements without pressure values.
pub(crate) fn no_pressure(_i: usize, _coords: &Vector3<f64>) -> f64 {
    0.0
}

/// Pressure basis `{1, s0, s1, s2}`.
pub(crate) fn linear_pressure(i: usize, coords: &Vector3<f64>) -> f64 {
    match i {
        0 => 1.0,
        1 => coords.x,
        2 => coords.y,
        _ => coords.z,
    }
}

/// Only the topology default rule.
pub(crate) const STANDARD_ONLY: &[Quadrature] = &[Quadrature::Standard];
