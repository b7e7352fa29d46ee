//! 8-node trilinear hexahedron.
//!
//! Node ordering: the first four nodes form the face `s2 = +1`, counter-
//! clockwise seen from outside, the last four the face `s2 = -1`.
//!
//! ```text
//!        3----------2
//!       /|         /|
//!      / |        / |
//!     0----------1  |        s2 = +1 : 0 1 2 3
//!     |  7-------|--6        s2 = -1 : 4 5 6 7
//!     | /        | /
//!     |/         |/
//!     4----------5
//! ```
//!
//! `N_i = (1 + s0 c0)(1 + s1 c1)(1 + s2 c2) / 8` with `c` the node's natural
//! coordinates.

use crate::config::Quadrature;
use crate::elements::quad_hex;
use crate::extrapolation::ExtrapolationBasis;
use crate::quadrature::{scaled_template, QuadraturePoint};
use crate::topology::{constant_pressure, ElementClass, Topology, TopologyDescriptor};
use nalgebra::Vector3;

pub(crate) const NODE_COORDS: [[f64; 3]; 8] = [
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
];

pub(crate) static DESCRIPTOR: TopologyDescriptor = TopologyDescriptor {
    topology: Topology::Hex,
    name: "hex",
    node_coords: &NODE_COORDS,
    linear: Topology::Hex,
    edges: &[
        &[0, 1],
        &[1, 2],
        &[2, 3],
        &[3, 0],
        &[4, 5],
        &[5, 6],
        &[6, 7],
        &[7, 4],
        &[0, 4],
        &[1, 5],
        &[2, 6],
        &[3, 7],
    ],
    faces: &[
        &[0, 1, 2, 3],
        &[1, 5, 6, 2],
        &[5, 4, 7, 6],
        &[4, 0, 3, 7],
        &[0, 4, 5, 1],
        &[3, 2, 6, 7],
    ],
    inverse_ordering: &[0, 3, 2, 1, 4, 7, 6, 5],
    mass_weights: &[0.125; 8],
    reference_measure: 8.0,
    num_pressure_values: 1,
    warping_coords: [0.0, 0.0, 0.0],
    quadratures: &[Quadrature::Gauss8, Quadrature::Gauss14, Quadrature::Gauss27],
    shape,
    shape_gradient,
    pressure_shape: constant_pressure,
    contains,
    rule: gauss_rule,
    extrapolation,
};

pub(crate) fn shape(i: usize, s: &Vector3<f64>) -> f64 {
    let c = NODE_COORDS[i];
    0.125 * (1.0 + c[0] * s.x) * (1.0 + c[1] * s.y) * (1.0 + c[2] * s.z)
}

pub(crate) fn shape_gradient(i: usize, s: &Vector3<f64>) -> Vector3<f64> {
    let c = NODE_COORDS[i];
    let p = [1.0 + c[0] * s.x, 1.0 + c[1] * s.y, 1.0 + c[2] * s.z];
    Vector3::new(
        0.125 * c[0] * p[1] * p[2],
        0.125 * c[1] * p[0] * p[2],
        0.125 * c[2] * p[0] * p[1],
    )
}

/// Bounding-box test on `[-1, 1]^3`.
pub(crate) fn contains(s: &Vector3<f64>) -> bool {
    s.iter().all(|x| x.abs() <= 1.0)
}

const IRONS_CORNER: f64 = 0.758686910639328;
const IRONS_CORNER_WEIGHT: f64 = 0.335180055401662;
const IRONS_FACE: f64 = 0.795822425754222;
const IRONS_FACE_WEIGHT: f64 = 0.886426592797784;

/// Face-center directions, in the order `+s2, -s2, -s1, +s0, +s1, -s0`.
pub(crate) const FACE_DIRECTIONS: [[f64; 3]; 6] = [
    [0.0, 0.0, 1.0],
    [0.0, 0.0, -1.0],
    [0.0, -1.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [-1.0, 0.0, 0.0],
];

/// Gauss rules shared by the linear and serendipity hexahedra.
///
/// The 8- and 14-point rules list corner points in node order. The 27-point
/// rule lists corners, then edge points in the 20-node edge order, then face
/// centers, then the centroid, so point `k` is the sample nearest node `k`.
pub(crate) fn gauss_rule(quadrature: Quadrature, _class: ElementClass) -> Vec<QuadraturePoint> {
    match quadrature {
        Quadrature::Gauss14 => {
            let mut points = scaled_template(&NODE_COORDS, IRONS_CORNER, |_| IRONS_CORNER_WEIGHT);
            points.extend(FACE_DIRECTIONS.iter().map(|d| {
                QuadraturePoint::new(
                    d[0] * IRONS_FACE,
                    d[1] * IRONS_FACE,
                    d[2] * IRONS_FACE,
                    IRONS_FACE_WEIGHT,
                )
            }));
            points
        }
        Quadrature::Gauss27 => {
            let q = 0.6_f64.sqrt();
            let mut template: Vec<[f64; 3]> = quad_hex::NODE_COORDS.to_vec();
            template.extend_from_slice(&FACE_DIRECTIONS);
            template.push([0.0, 0.0, 0.0]);
            scaled_template(&template, q, |c| {
                c.iter()
                    .map(|&x| if x == 0.0 { 8.0 / 9.0 } else { 5.0 / 9.0 })
                    .product()
            })
        }
        _ => scaled_template(&NODE_COORDS, 1.0 / 3.0_f64.sqrt(), |_| 1.0),
    }
}

pub(crate) fn extrapolation(quadrature: Quadrature, _class: ElementClass) -> ExtrapolationBasis {
    match quadrature {
        Quadrature::Gauss27 => ExtrapolationBasis::Identity,
        _ => ExtrapolationBasis::Trilinear,
    }
}
