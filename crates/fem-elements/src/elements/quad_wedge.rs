//! 15-node quadratic wedge.
//!
//! Corner nodes 0-5 follow the linear wedge. Mid-edge nodes:
//! 6 (0-1), 7 (1-2), 8 (2-0) on the bottom triangle, 9 (3-4), 10 (4-5),
//! 11 (5-3) on the top triangle and 12 (0-3), 13 (1-4), 14 (2-5) on the
//! vertical edges.
//!
//! With area coordinates `L` and `t = 2 s2 - 1` (bottom `t = -1`):
//!
//! ```text
//! corner:     L_i (2 L_i - 1)(1 ± t) / 2 - L_i (1 - t^2) / 2
//! horizontal: 2 L_a L_b (1 ± t)
//! vertical:   L_i (1 - t^2)
//! ```

use crate::config::Quadrature;
use crate::elements::wedge::{self, area_coords, AREA_GRADIENTS};
use crate::quadrature::{GaussOrder, prism_rule, QuadraturePoint};
use crate::topology::{ElementClass, Topology, TopologyDescriptor, STANDARD_ONLY};
use nalgebra::Vector3;

pub(crate) const NODE_COORDS: [[f64; 3]; 15] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [0.5, 0.0, 0.0],
    [0.5, 0.5, 0.0],
    [0.0, 0.5, 0.0],
    [0.5, 0.0, 1.0],
    [0.5, 0.5, 1.0],
    [0.0, 0.5, 1.0],
    [0.0, 0.0, 0.5],
    [1.0, 0.0, 0.5],
    [0.0, 1.0, 0.5],
];

/// Triangle vertex pair of each horizontal mid-edge node 6..11
const TRIANGLE_EDGES: [[usize; 2]; 3] = [[0, 1], [1, 2], [2, 0]];

pub(crate) static DESCRIPTOR: TopologyDescriptor = TopologyDescriptor {
    topology: Topology::QuadWedge,
    name: "quadwedge",
    node_coords: &NODE_COORDS,
    linear: Topology::Wedge,
    edges: &[
        &[0, 6, 1],
        &[1, 7, 2],
        &[2, 8, 0],
        &[3, 9, 4],
        &[4, 10, 5],
        &[5, 11, 3],
        &[0, 12, 3],
        &[1, 13, 4],
        &[2, 14, 5],
    ],
    faces: &[
        &[0, 8, 2, 7, 1, 6],
        &[3, 9, 4, 10, 5, 11],
        &[0, 6, 1, 13, 4, 9, 3, 12],
        &[1, 7, 2, 14, 5, 10, 4, 13],
        &[2, 8, 0, 12, 3, 11, 5, 14],
    ],
    inverse_ordering: &[0, 2, 1, 3, 5, 4, 8, 7, 6, 11, 10, 9, 12, 14, 13],
    mass_weights: &[
        -1.0 / 9.0,
        -1.0 / 9.0,
        -1.0 / 9.0,
        -1.0 / 9.0,
        -1.0 / 9.0,
        -1.0 / 9.0,
        1.0 / 6.0,
        1.0 / 6.0,
        1.0 / 6.0,
        1.0 / 6.0,
        1.0 / 6.0,
        1.0 / 6.0,
        2.0 / 9.0,
        2.0 / 9.0,
        2.0 / 9.0,
    ],
    reference_measure: 0.5,
    num_pressure_values: 2,
    warping_coords: [1.0 / 3.0, 1.0 / 3.0, 0.5],
    quadratures: STANDARD_ONLY,
    shape,
    shape_gradient,
    pressure_shape,
    contains: wedge::contains,
    rule,
    extrapolation: wedge::extrapolation,
};

/// `-1` for bottom nodes, `+1` for top nodes.
fn layer_sign(i: usize) -> f64 {
    if i < 3 || (6..9).contains(&i) { -1.0 } else { 1.0 }
}

pub(crate) fn shape(i: usize, s: &Vector3<f64>) -> f64 {
    let l = area_coords(s);
    let t = 2.0 * s.z - 1.0;
    match i {
        0..=5 => {
            let li = l[i % 3];
            0.5 * li * (2.0 * li - 1.0) * (1.0 + layer_sign(i) * t) - 0.5 * li * (1.0 - t * t)
        }
        6..=11 => {
            let [a, b] = TRIANGLE_EDGES[(i - 6) % 3];
            2.0 * l[a] * l[b] * (1.0 + layer_sign(i) * t)
        }
        _ => l[i - 12] * (1.0 - t * t),
    }
}

pub(crate) fn shape_gradient(i: usize, s: &Vector3<f64>) -> Vector3<f64> {
    let l = area_coords(s);
    let t = 2.0 * s.z - 1.0;
    let dl = |k: usize| Vector3::new(AREA_GRADIENTS[k][0], AREA_GRADIENTS[k][1], 0.0);
    // d/ds2 = 2 d/dt
    match i {
        0..=5 => {
            let j = i % 3;
            let li = l[j];
            let sg = layer_sign(i);
            let dn_dl = 0.5 * (4.0 * li - 1.0) * (1.0 + sg * t) - 0.5 * (1.0 - t * t);
            let dn_dt = 0.5 * li * (2.0 * li - 1.0) * sg + li * t;
            let mut grad = dl(j) * dn_dl;
            grad.z = 2.0 * dn_dt;
            grad
        }
        6..=11 => {
            let [a, b] = TRIANGLE_EDGES[(i - 6) % 3];
            let sg = layer_sign(i);
            let mut grad = (dl(a) * l[b] + dl(b) * l[a]) * (2.0 * (1.0 + sg * t));
            grad.z = 4.0 * l[a] * l[b] * sg;
            grad
        }
        _ => {
            let k = i - 12;
            let mut grad = dl(k) * (1.0 - t * t);
            grad.z = -4.0 * l[k] * t;
            grad
        }
    }
}

/// Pressure basis `{1, s2}`.
fn pressure_shape(i: usize, s: &Vector3<f64>) -> f64 {
    if i == 0 { 1.0 } else { s.z }
}

fn rule(_quadrature: Quadrature, _class: ElementClass) -> Vec<QuadraturePoint> {
    prism_rule(GaussOrder::Three)
}
