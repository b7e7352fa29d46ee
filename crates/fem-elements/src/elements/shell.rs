//! 3-node triangular and 4-node quadrilateral shells.
//!
//! Shell nodes carry a director pointing from the back surface to the front
//! surface. The first two natural coordinates `(r, s)` are in-plane, the third
//! `t` runs through the thickness from the back (`t = -1`) to the front
//! (`t = +1`). Shape functions only depend on `(r, s)`.
//!
//! ```text
//!   2                 3-----------2
//!   |\                |           |
//!   | \               |           |
//!   |  \              |           |
//!   0---1             0-----------1
//! ```
//!
//! Shell elements have no pressure values. With the membrane class the
//! quadrature collapses onto `t = 0`.

use crate::config::Quadrature;
use crate::elements::{hex, wedge};
use crate::extrapolation::ExtrapolationBasis;
use crate::quadrature::{GaussOrder, gauss_legendre, QuadraturePoint, TRIANGLE_3};
use crate::topology::{no_pressure, ElementClass, Topology, TopologyDescriptor, STANDARD_ONLY};
use nalgebra::Vector3;

pub(crate) const TRI_NODE_COORDS: [[f64; 3]; 3] =
    [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

pub(crate) const QUAD_NODE_COORDS: [[f64; 3]; 4] = [
    [-1.0, -1.0, 0.0],
    [1.0, -1.0, 0.0],
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
];

pub(crate) static TRI_DESCRIPTOR: TopologyDescriptor = TopologyDescriptor {
    topology: Topology::ShellTri,
    name: "shelltri",
    node_coords: &TRI_NODE_COORDS,
    linear: Topology::ShellTri,
    edges: &[&[0, 1], &[1, 2], &[2, 0]],
    faces: &[&[0, 1, 2]],
    inverse_ordering: &[0, 2, 1],
    mass_weights: &[1.0 / 3.0; 3],
    reference_measure: 1.0,
    num_pressure_values: 0,
    warping_coords: [1.0 / 3.0, 1.0 / 3.0, 0.0],
    quadratures: STANDARD_ONLY,
    shape: tri_shape,
    shape_gradient: tri_shape_gradient,
    pressure_shape: no_pressure,
    contains: tri_contains,
    rule: tri_rule,
    extrapolation: tri_extrapolation,
};

pub(crate) static QUAD_DESCRIPTOR: TopologyDescriptor = TopologyDescriptor {
    topology: Topology::ShellQuad,
    name: "shellquad",
    node_coords: &QUAD_NODE_COORDS,
    linear: Topology::ShellQuad,
    edges: &[&[0, 1], &[1, 2], &[2, 3], &[3, 0]],
    faces: &[&[0, 1, 2, 3]],
    inverse_ordering: &[0, 3, 2, 1],
    mass_weights: &[0.25; 4],
    reference_measure: 8.0,
    num_pressure_values: 0,
    warping_coords: [0.0, 0.0, 0.0],
    quadratures: STANDARD_ONLY,
    shape: quad_shape,
    shape_gradient: quad_shape_gradient,
    pressure_shape: no_pressure,
    contains: hex::contains,
    rule: quad_rule,
    extrapolation: quad_extrapolation,
};

/// Through-thickness sample locations and weights for a class.
fn thickness_points(class: ElementClass) -> Vec<(f64, f64)> {
    match class {
        ElementClass::Membrane => vec![(0.0, 1.0)],
        _ => gauss_legendre(GaussOrder::Two),
    }
}

fn tri_shape(i: usize, s: &Vector3<f64>) -> f64 {
    wedge::area_coords(s)[i]
}

fn tri_shape_gradient(i: usize, _s: &Vector3<f64>) -> Vector3<f64> {
    let g = wedge::AREA_GRADIENTS[i];
    Vector3::new(g[0], g[1], 0.0)
}

fn tri_contains(s: &Vector3<f64>) -> bool {
    s.x >= 0.0 && s.y >= 0.0 && s.x + s.y <= 1.0 && s.z.abs() <= 1.0
}

fn tri_rule(_quadrature: Quadrature, class: ElementClass) -> Vec<QuadraturePoint> {
    let mut points = Vec::with_capacity(6);
    for (t, wt) in thickness_points(class) {
        for &(r, s, w) in &TRIANGLE_3 {
            points.push(QuadraturePoint::new(r, s, t, w * wt));
        }
    }
    points
}

fn tri_extrapolation(_quadrature: Quadrature, class: ElementClass) -> ExtrapolationBasis {
    match class {
        ElementClass::Membrane => ExtrapolationBasis::Planar,
        _ => ExtrapolationBasis::Prism,
    }
}

fn quad_shape(i: usize, s: &Vector3<f64>) -> f64 {
    let c = QUAD_NODE_COORDS[i];
    0.25 * (1.0 + c[0] * s.x) * (1.0 + c[1] * s.y)
}

fn quad_shape_gradient(i: usize, s: &Vector3<f64>) -> Vector3<f64> {
    let c = QUAD_NODE_COORDS[i];
    Vector3::new(
        0.25 * c[0] * (1.0 + c[1] * s.y),
        0.25 * c[1] * (1.0 + c[0] * s.x),
        0.0,
    )
}

fn quad_rule(_quadrature: Quadrature, class: ElementClass) -> Vec<QuadraturePoint> {
    let q = 1.0 / 3.0_f64.sqrt();
    let mut points = Vec::with_capacity(8);
    for (t, wt) in thickness_points(class) {
        for c in &QUAD_NODE_COORDS {
            points.push(QuadraturePoint::new(c[0] * q, c[1] * q, t, wt));
        }
    }
    points
}

fn quad_extrapolation(_quadrature: Quadrature, class: ElementClass) -> ExtrapolationBasis {
    match class {
        ElementClass::Membrane => ExtrapolationBasis::Bilinear,
        _ => ExtrapolationBasis::Trilinear,
    }
}
