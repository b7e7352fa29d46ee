//! 13-node quadratic pyramid.
//!
//! Corner nodes 0-4 follow the linear pyramid. Mid-edge nodes 5 (0-1),
//! 6 (1-2), 7 (2-3), 8 (3-0) lie on the base, 9-12 on the edges joining base
//! corners 0-3 to the apex.
//!
//! With `a = 1 - s2`, `x = s0`, `y = s1` and base corner `(c0, c1)`:
//!
//! ```text
//! base corner:   (c0 x + c1 y - 1)(a + c0 x + c1 y + c0 c1 x y / a) / 4
//! apex:          s2 (2 s2 - 1)
//! base edge y=e: (a^2 - x^2)(1 + e y / a) / 2     (x=e analogous)
//! slanted edge:  s2 (a + c0 x)(1 + c1 y / a)
//! ```

use crate::config::Quadrature;
use crate::elements::pyramid::{self, ApexRatios};
use crate::quadrature::{GaussOrder, collapsed_pyramid_rule, QuadraturePoint};
use crate::topology::{
    constant_pressure, ElementClass, Topology, TopologyDescriptor, STANDARD_ONLY,
};
use nalgebra::Vector3;

pub(crate) const NODE_COORDS: [[f64; 3]; 13] = [
    [-1.0, -1.0, 0.0],
    [1.0, -1.0, 0.0],
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, -1.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [-1.0, 0.0, 0.0],
    [-0.5, -0.5, 0.5],
    [0.5, -0.5, 0.5],
    [0.5, 0.5, 0.5],
    [-0.5, 0.5, 0.5],
];

pub(crate) static DESCRIPTOR: TopologyDescriptor = TopologyDescriptor {
    topology: Topology::QuadPyramid,
    name: "quadpyramid",
    node_coords: &NODE_COORDS,
    linear: Topology::Pyramid,
    edges: &[
        &[0, 5, 1],
        &[1, 6, 2],
        &[2, 7, 3],
        &[3, 8, 0],
        &[0, 9, 4],
        &[1, 10, 4],
        &[2, 11, 4],
        &[3, 12, 4],
    ],
    faces: &[
        &[0, 8, 3, 7, 2, 6, 1, 5],
        &[0, 5, 1, 10, 4, 9],
        &[1, 6, 2, 11, 4, 10],
        &[2, 7, 3, 12, 4, 11],
        &[3, 8, 0, 9, 4, 12],
    ],
    inverse_ordering: &[0, 3, 2, 1, 4, 8, 7, 6, 5, 9, 12, 11, 10],
    mass_weights: &[
        -0.0875, -0.0875, -0.0875, -0.0875, -0.05, 0.2, 0.2, 0.2, 0.2, 0.15, 0.15, 0.15, 0.15,
    ],
    reference_measure: 4.0 / 3.0,
    num_pressure_values: 1,
    warping_coords: [0.0, 0.0, 0.25],
    quadratures: STANDARD_ONLY,
    shape,
    shape_gradient,
    pressure_shape: constant_pressure,
    contains: pyramid::contains,
    rule,
    extrapolation: pyramid::extrapolation,
};

fn base_corner(i: usize) -> (f64, f64) {
    let c = pyramid::NODE_COORDS[i];
    (c[0], c[1])
}

pub(crate) fn shape(i: usize, s: &Vector3<f64>) -> f64 {
    let (x, y, z) = (s.x, s.y, s.z);
    let r = ApexRatios::new(s);
    match i {
        0..=3 => {
            let (c0, c1) = base_corner(i);
            0.25 * (c0 * x + c1 * y - 1.0) * (r.a + c0 * x + c1 * y + c0 * c1 * r.xy)
        }
        4 => z * (2.0 * z - 1.0),
        5..=8 => {
            let c = NODE_COORDS[i];
            if c[1] != 0.0 {
                0.5 * (r.a * r.a - x * x) * (1.0 + c[1] * r.y)
            } else {
                0.5 * (r.a * r.a - y * y) * (1.0 + c[0] * r.x)
            }
        }
        _ => {
            let (c0, c1) = base_corner(i - 9);
            z * (r.a + c0 * x) * (1.0 + c1 * r.y)
        }
    }
}

pub(crate) fn shape_gradient(i: usize, s: &Vector3<f64>) -> Vector3<f64> {
    let (x, y, z) = (s.x, s.y, s.z);
    let r = ApexRatios::new(s);
    // 1/a and 1/a^2, dropped at the apex like the rational terms themselves
    let (inv_a, inv_a2) = if r.a > pyramid::APEX_TOLERANCE {
        (1.0 / r.a, 1.0 / (r.a * r.a))
    } else {
        (0.0, 0.0)
    };
    match i {
        0..=3 => {
            let (c0, c1) = base_corner(i);
            let cc = c0 * c1;
            let p = c0 * x + c1 * y - 1.0;
            let b = r.a + c0 * x + c1 * y + cc * r.xy;
            let db = Vector3::new(c0 + cc * r.y, c1 + cc * r.x, -1.0 + cc * r.xy2);
            (Vector3::new(c0, c1, 0.0) * b + db * p) * 0.25
        }
        4 => Vector3::new(0.0, 0.0, 4.0 * z - 1.0),
        5..=8 => {
            let c = NODE_COORDS[i];
            if c[1] != 0.0 {
                let e = c[1];
                let g = 1.0 + e * r.y;
                let q = 0.5 * (r.a * r.a - x * x);
                Vector3::new(-x * g, q * e * inv_a, -r.a * g + q * e * y * inv_a2)
            } else {
                let e = c[0];
                let g = 1.0 + e * r.x;
                let q = 0.5 * (r.a * r.a - y * y);
                Vector3::new(q * e * inv_a, -y * g, -r.a * g + q * e * x * inv_a2)
            }
        }
        _ => {
            let (c0, c1) = base_corner(i - 9);
            let f = r.a + c0 * x;
            let g = 1.0 + c1 * r.y;
            Vector3::new(
                z * c0 * g,
                z * f * c1 * inv_a,
                f * g - z * g + z * f * c1 * y * inv_a2,
            )
        }
    }
}

fn rule(_quadrature: Quadrature, _class: ElementClass) -> Vec<QuadraturePoint> {
    collapsed_pyramid_rule(GaussOrder::Three)
}
