//! 5-node linear pyramid.
//!
//! The base square `[-1, 1]^2` lies at `s2 = 0`, the apex at `(0, 0, 1)`.
//! With `a = 1 - s2` the base functions are
//!
//! ```text
//! N_i = (a + c0 s0)(a + c1 s1) / (4a) = (a + c0 s0 + c1 s1 + c0 c1 s0 s1 / a) / 4
//! N_4 = s2
//! ```
//!
//! The rational term `s0 s1 / a` is bounded by `a` inside the domain, so it is
//! dropped (its limit) when `a` vanishes at the apex.

use crate::config::Quadrature;
use crate::extrapolation::ExtrapolationBasis;
use crate::quadrature::{GaussOrder, collapsed_pyramid_rule, QuadraturePoint};
use crate::topology::{
    constant_pressure, ElementClass, Topology, TopologyDescriptor, STANDARD_ONLY,
};
use nalgebra::Vector3;

pub(crate) const NODE_COORDS: [[f64; 3]; 5] = [
    [-1.0, -1.0, 0.0],
    [1.0, -1.0, 0.0],
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
];

pub(crate) static DESCRIPTOR: TopologyDescriptor = TopologyDescriptor {
    topology: Topology::Pyramid,
    name: "pyramid",
    node_coords: &NODE_COORDS,
    linear: Topology::Pyramid,
    edges: &[
        &[0, 1],
        &[1, 2],
        &[2, 3],
        &[3, 0],
        &[0, 4],
        &[1, 4],
        &[2, 4],
        &[3, 4],
    ],
    faces: &[&[0, 3, 2, 1], &[0, 1, 4], &[1, 2, 4], &[2, 3, 4], &[3, 0, 4]],
    inverse_ordering: &[0, 3, 2, 1, 4],
    mass_weights: &[3.0 / 16.0, 3.0 / 16.0, 3.0 / 16.0, 3.0 / 16.0, 0.25],
    reference_measure: 4.0 / 3.0,
    num_pressure_values: 1,
    warping_coords: [0.0, 0.0, 0.25],
    quadratures: STANDARD_ONLY,
    shape,
    shape_gradient,
    pressure_shape: constant_pressure,
    contains,
    rule,
    extrapolation,
};

/// Below this distance from the apex the rational terms take their limit.
pub(crate) const APEX_TOLERANCE: f64 = 1e-12;

/// Ratios used by the rational pyramid bases.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ApexRatios {
    /// `1 - s2`
    pub a: f64,
    /// `s0 / a`
    pub x: f64,
    /// `s1 / a`
    pub y: f64,
    /// `s0 s1 / a`
    pub xy: f64,
    /// `s0 s1 / a^2`
    pub xy2: f64,
}

impl ApexRatios {
    pub(crate) fn new(s: &Vector3<f64>) -> Self {
        let a = 1.0 - s.z;
        if a > APEX_TOLERANCE {
            Self {
                a,
                x: s.x / a,
                y: s.y / a,
                xy: s.x * s.y / a,
                xy2: s.x * s.y / (a * a),
            }
        } else {
            Self {
                a,
                x: 0.0,
                y: 0.0,
                xy: 0.0,
                xy2: 0.0,
            }
        }
    }
}

pub(crate) fn shape(i: usize, s: &Vector3<f64>) -> f64 {
    if i == 4 {
        return s.z;
    }
    let r = ApexRatios::new(s);
    let c = NODE_COORDS[i];
    0.25 * (r.a + c[0] * s.x + c[1] * s.y + c[0] * c[1] * r.xy)
}

pub(crate) fn shape_gradient(i: usize, s: &Vector3<f64>) -> Vector3<f64> {
    if i == 4 {
        return Vector3::new(0.0, 0.0, 1.0);
    }
    let r = ApexRatios::new(s);
    let c = NODE_COORDS[i];
    let cc = c[0] * c[1];
    Vector3::new(
        0.25 * (c[0] + cc * r.y),
        0.25 * (c[1] + cc * r.x),
        0.25 * (-1.0 + cc * r.xy2),
    )
}

pub(crate) fn contains(s: &Vector3<f64>) -> bool {
    let a = 1.0 - s.z;
    s.z >= 0.0 && s.z <= 1.0 && s.x.abs() <= a && s.y.abs() <= a
}

fn rule(_quadrature: Quadrature, _class: ElementClass) -> Vec<QuadraturePoint> {
    collapsed_pyramid_rule(GaussOrder::Two)
}

pub(crate) fn extrapolation(_quadrature: Quadrature, _class: ElementClass) -> ExtrapolationBasis {
    ExtrapolationBasis::Linear
}
