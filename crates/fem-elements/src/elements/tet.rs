//! 4-node linear tetrahedron.
//!
//! ```text
//!        3
//!       /|\
//!      / | \
//!     /  |  \
//!    0---|---2
//!     \  |  /
//!      \ | /
//!        1
//! ```
//!
//! Natural coordinates are `(s0, s1, s2)` with `s_k >= 0` and
//! `s0 + s1 + s2 <= 1`. `N0 = 1 - s0 - s1 - s2`, `N_k = s_{k-1}`.

use crate::config::Quadrature;
use crate::extrapolation::ExtrapolationBasis;
use crate::quadrature::QuadraturePoint;
use crate::topology::{
    constant_pressure, ElementClass, Topology, TopologyDescriptor, STANDARD_ONLY,
};
use nalgebra::Vector3;

pub(crate) const NODE_COORDS: [[f64; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
];

pub(crate) static DESCRIPTOR: TopologyDescriptor = TopologyDescriptor {
    topology: Topology::Tet,
    name: "tet",
    node_coords: &NODE_COORDS,
    linear: Topology::Tet,
    edges: &[&[0, 1], &[1, 2], &[2, 0], &[0, 3], &[1, 3], &[2, 3]],
    faces: &[&[0, 2, 1], &[0, 1, 3], &[1, 2, 3], &[2, 0, 3]],
    inverse_ordering: &[0, 2, 1, 3],
    mass_weights: &[0.25, 0.25, 0.25, 0.25],
    reference_measure: 1.0 / 6.0,
    num_pressure_values: 1,
    warping_coords: [0.25, 0.25, 0.25],
    quadratures: STANDARD_ONLY,
    shape,
    shape_gradient,
    pressure_shape: constant_pressure,
    contains,
    rule,
    extrapolation,
};

/// Barycentric coordinates `(L0, L1, L2, L3)`.
pub(crate) fn barycentric(s: &Vector3<f64>) -> [f64; 4] {
    [1.0 - s.x - s.y - s.z, s.x, s.y, s.z]
}

/// Gradients of the barycentric coordinates.
pub(crate) const BARYCENTRIC_GRADIENTS: [[f64; 3]; 4] = [
    [-1.0, -1.0, -1.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
];

pub(crate) fn shape(i: usize, s: &Vector3<f64>) -> f64 {
    barycentric(s)[i]
}

pub(crate) fn shape_gradient(i: usize, _s: &Vector3<f64>) -> Vector3<f64> {
    let g = BARYCENTRIC_GRADIENTS[i];
    Vector3::new(g[0], g[1], g[2])
}

pub(crate) fn contains(s: &Vector3<f64>) -> bool {
    s.x >= 0.0 && s.y >= 0.0 && s.z >= 0.0 && s.x + s.y + s.z <= 1.0
}

fn rule(_quadrature: Quadrature, _class: ElementClass) -> Vec<QuadraturePoint> {
    vec![QuadraturePoint::new(0.25, 0.25, 0.25, 1.0 / 6.0)]
}

fn extrapolation(_quadrature: Quadrature, _class: ElementClass) -> ExtrapolationBasis {
    ExtrapolationBasis::Constant
}
