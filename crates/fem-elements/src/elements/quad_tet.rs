//! 10-node quadratic tetrahedron.
//!
//! Corner nodes 0-3 as in the linear tet, mid-edge nodes
//! 4 (0-1), 5 (1-2), 6 (2-0), 7 (0-3), 8 (1-3), 9 (2-3).
//!
//! With barycentric coordinates `L`:
//! corner `N_i = L_i (2 L_i - 1)`, edge `N_ab = 4 L_a L_b`.

use crate::config::Quadrature;
use crate::elements::tet::{barycentric, BARYCENTRIC_GRADIENTS};
use crate::extrapolation::ExtrapolationBasis;
use crate::quadrature::QuadraturePoint;
use crate::topology::{
    linear_pressure, ElementClass, Topology, TopologyDescriptor, STANDARD_ONLY,
};
use nalgebra::Vector3;

pub(crate) const NODE_COORDS: [[f64; 3]; 10] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.5, 0.0, 0.0],
    [0.5, 0.5, 0.0],
    [0.0, 0.5, 0.0],
    [0.0, 0.0, 0.5],
    [0.5, 0.0, 0.5],
    [0.0, 0.5, 0.5],
];

/// Corner pair for each mid-edge node 4..9
const EDGE_CORNERS: [[usize; 2]; 6] = [[0, 1], [1, 2], [2, 0], [0, 3], [1, 3], [2, 3]];

pub(crate) static DESCRIPTOR: TopologyDescriptor = TopologyDescriptor {
    topology: Topology::QuadTet,
    name: "quadtet",
    node_coords: &NODE_COORDS,
    linear: Topology::Tet,
    edges: &[
        &[0, 4, 1],
        &[1, 5, 2],
        &[2, 6, 0],
        &[0, 7, 3],
        &[1, 8, 3],
        &[2, 9, 3],
    ],
    faces: &[
        &[0, 6, 2, 5, 1, 4],
        &[0, 4, 1, 8, 3, 7],
        &[1, 5, 2, 9, 3, 8],
        &[2, 6, 0, 7, 3, 9],
    ],
    inverse_ordering: &[0, 2, 1, 3, 6, 5, 4, 7, 9, 8],
    mass_weights: &[
        -0.05, -0.05, -0.05, -0.05, 0.2, 0.2, 0.2, 0.2, 0.2, 0.2,
    ],
    reference_measure: 1.0 / 6.0,
    num_pressure_values: 4,
    warping_coords: [0.25, 0.25, 0.25],
    quadratures: STANDARD_ONLY,
    shape,
    shape_gradient,
    pressure_shape: linear_pressure,
    contains: crate::elements::tet::contains,
    rule,
    extrapolation,
};

pub(crate) fn shape(i: usize, s: &Vector3<f64>) -> f64 {
    let l = barycentric(s);
    if i < 4 {
        l[i] * (2.0 * l[i] - 1.0)
    } else {
        let [a, b] = EDGE_CORNERS[i - 4];
        4.0 * l[a] * l[b]
    }
}

pub(crate) fn shape_gradient(i: usize, s: &Vector3<f64>) -> Vector3<f64> {
    let l = barycentric(s);
    let g = |k: usize| {
        let d = BARYCENTRIC_GRADIENTS[k];
        Vector3::new(d[0], d[1], d[2])
    };
    if i < 4 {
        g(i) * (4.0 * l[i] - 1.0)
    } else {
        let [a, b] = EDGE_CORNERS[i - 4];
        (g(a) * l[b] + g(b) * l[a]) * 4.0
    }
}

/// Four-point rule, exact to degree 2.
fn rule(_quadrature: Quadrature, _class: ElementClass) -> Vec<QuadraturePoint> {
    let a = (5.0 + 3.0 * 5.0_f64.sqrt()) / 20.0;
    let b = (5.0 - 5.0_f64.sqrt()) / 20.0;
    let w = 1.0 / 24.0;
    vec![
        QuadraturePoint::new(b, b, b, w),
        QuadraturePoint::new(a, b, b, w),
        QuadraturePoint::new(b, a, b, w),
        QuadraturePoint::new(b, b, a, w),
    ]
}

fn extrapolation(_quadrature: Quadrature, _class: ElementClass) -> ExtrapolationBasis {
    ExtrapolationBasis::Linear
}
