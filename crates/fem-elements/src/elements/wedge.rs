//! 6-node linear wedge (triangular prism).
//!
//! Nodes 0, 1, 2 form the triangle at `s2 = 0` and nodes 3, 4, 5 the triangle
//! at `s2 = 1`, with node `k + 3` above node `k`. The in-plane coordinates
//! `(s0, s1)` live on the unit triangle.

use crate::config::Quadrature;
use crate::extrapolation::ExtrapolationBasis;
use crate::quadrature::{GaussOrder, prism_rule, QuadraturePoint};
use crate::topology::{
    constant_pressure, ElementClass, Topology, TopologyDescriptor, STANDARD_ONLY,
};
use nalgebra::Vector3;

pub(crate) const NODE_COORDS: [[f64; 3]; 6] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
];

pub(crate) static DESCRIPTOR: TopologyDescriptor = TopologyDescriptor {
    topology: Topology::Wedge,
    name: "wedge",
    node_coords: &NODE_COORDS,
    linear: Topology::Wedge,
    edges: &[
        &[0, 1],
        &[1, 2],
        &[2, 0],
        &[3, 4],
        &[4, 5],
        &[5, 3],
        &[0, 3],
        &[1, 4],
        &[2, 5],
    ],
    faces: &[
        &[0, 2, 1],
        &[3, 4, 5],
        &[0, 1, 4, 3],
        &[1, 2, 5, 4],
        &[2, 0, 3, 5],
    ],
    inverse_ordering: &[0, 2, 1, 3, 5, 4],
    mass_weights: &[1.0 / 6.0; 6],
    reference_measure: 0.5,
    num_pressure_values: 1,
    warping_coords: [1.0 / 3.0, 1.0 / 3.0, 0.5],
    quadratures: STANDARD_ONLY,
    shape,
    shape_gradient,
    pressure_shape: constant_pressure,
    contains,
    rule,
    extrapolation,
};

/// Triangle area coordinates `(1 - s0 - s1, s0, s1)`.
pub(crate) fn area_coords(s: &Vector3<f64>) -> [f64; 3] {
    [1.0 - s.x - s.y, s.x, s.y]
}

pub(crate) const AREA_GRADIENTS: [[f64; 2]; 3] = [[-1.0, -1.0], [1.0, 0.0], [0.0, 1.0]];

pub(crate) fn shape(i: usize, s: &Vector3<f64>) -> f64 {
    let l = area_coords(s)[i % 3];
    if i < 3 { l * (1.0 - s.z) } else { l * s.z }
}

pub(crate) fn shape_gradient(i: usize, s: &Vector3<f64>) -> Vector3<f64> {
    let l = area_coords(s)[i % 3];
    let g = AREA_GRADIENTS[i % 3];
    let (h, dh) = if i < 3 { (1.0 - s.z, -1.0) } else { (s.z, 1.0) };
    Vector3::new(g[0] * h, g[1] * h, l * dh)
}

pub(crate) fn contains(s: &Vector3<f64>) -> bool {
    s.x >= 0.0 && s.y >= 0.0 && s.x + s.y <= 1.0 && s.z >= 0.0 && s.z <= 1.0
}

fn rule(_quadrature: Quadrature, _class: ElementClass) -> Vec<QuadraturePoint> {
    prism_rule(GaussOrder::Two)
}

pub(crate) fn extrapolation(_quadrature: Quadrature, _class: ElementClass) -> ExtrapolationBasis {
    ExtrapolationBasis::Prism
}
