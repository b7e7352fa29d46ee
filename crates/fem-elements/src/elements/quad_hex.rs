//! 20-node serendipity hexahedron.
//!
//! Corner nodes 0-7 follow the linear hex. Mid-edge nodes 8-11 lie on the
//! face `s2 = +1` (edges 0-1, 1-2, 2-3, 3-0), 12-15 on the face `s2 = -1`
//! (edges 4-5, 5-6, 6-7, 7-4) and 16-19 on the vertical edges 0-4, 1-5, 2-6,
//! 3-7.
//!
//! Corner: `N = (1 + c0 s0)(1 + c1 s1)(1 + c2 s2)(c0 s0 + c1 s1 + c2 s2 - 2) / 8`
//! Edge (coordinate k zero): `N = (1 - s_k^2) * prod_{m != k} (1 + c_m s_m) / 4`

use crate::config::Quadrature;
use crate::elements::hex;
use crate::topology::{linear_pressure, Topology, TopologyDescriptor};
use nalgebra::Vector3;

pub(crate) const NODE_COORDS: [[f64; 3]; 20] = [
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [0.0, -1.0, 1.0],
    [1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [-1.0, 0.0, 1.0],
    [0.0, -1.0, -1.0],
    [1.0, 0.0, -1.0],
    [0.0, 1.0, -1.0],
    [-1.0, 0.0, -1.0],
    [-1.0, -1.0, 0.0],
    [1.0, -1.0, 0.0],
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
];

pub(crate) static DESCRIPTOR: TopologyDescriptor = TopologyDescriptor {
    topology: Topology::QuadHex,
    name: "quadhex",
    node_coords: &NODE_COORDS,
    linear: Topology::Hex,
    edges: &[
        &[0, 8, 1],
        &[1, 9, 2],
        &[2, 10, 3],
        &[3, 11, 0],
        &[4, 12, 5],
        &[5, 13, 6],
        &[6, 14, 7],
        &[7, 15, 4],
        &[0, 16, 4],
        &[1, 17, 5],
        &[2, 18, 6],
        &[3, 19, 7],
    ],
    faces: &[
        &[0, 8, 1, 9, 2, 10, 3, 11],
        &[1, 17, 5, 13, 6, 18, 2, 9],
        &[5, 12, 4, 15, 7, 14, 6, 13],
        &[4, 16, 0, 11, 3, 19, 7, 15],
        &[0, 16, 4, 12, 5, 17, 1, 8],
        &[3, 10, 2, 18, 6, 14, 7, 19],
    ],
    inverse_ordering: &[
        0, 3, 2, 1, 4, 7, 6, 5, 11, 10, 9, 8, 15, 14, 13, 12, 16, 19, 18, 17,
    ],
    mass_weights: &[
        -0.125,
        -0.125,
        -0.125,
        -0.125,
        -0.125,
        -0.125,
        -0.125,
        -0.125,
        1.0 / 6.0,
        1.0 / 6.0,
        1.0 / 6.0,
        1.0 / 6.0,
        1.0 / 6.0,
        1.0 / 6.0,
        1.0 / 6.0,
        1.0 / 6.0,
        1.0 / 6.0,
        1.0 / 6.0,
        1.0 / 6.0,
        1.0 / 6.0,
    ],
    reference_measure: 8.0,
    num_pressure_values: 4,
    warping_coords: [0.0, 0.0, 0.0],
    quadratures: &[Quadrature::Gauss14, Quadrature::Gauss8, Quadrature::Gauss27],
    shape,
    shape_gradient,
    pressure_shape: linear_pressure,
    contains: hex::contains,
    rule: hex::gauss_rule,
    extrapolation: hex::extrapolation,
};

pub(crate) fn shape(i: usize, s: &Vector3<f64>) -> f64 {
    let c = NODE_COORDS[i];
    if i < 8 {
        let p = (0..3).map(|k| 1.0 + c[k] * s[k]).product::<f64>();
        0.125 * p * (c[0] * s.x + c[1] * s.y + c[2] * s.z - 2.0)
    } else {
        0.25 * (0..3)
            .map(|k| if c[k] == 0.0 { 1.0 - s[k] * s[k] } else { 1.0 + c[k] * s[k] })
            .product::<f64>()
    }
}

pub(crate) fn shape_gradient(i: usize, s: &Vector3<f64>) -> Vector3<f64> {
    let c = NODE_COORDS[i];
    let mut grad = Vector3::zeros();
    if i < 8 {
        let p = [1.0 + c[0] * s.x, 1.0 + c[1] * s.y, 1.0 + c[2] * s.z];
        let g = c[0] * s.x + c[1] * s.y + c[2] * s.z - 2.0;
        for k in 0..3 {
            let others = p[(k + 1) % 3] * p[(k + 2) % 3];
            grad[k] = 0.125 * c[k] * others * (g + p[k]);
        }
    } else {
        for k in 0..3 {
            grad[k] = 0.25
                * (0..3)
                    .map(|m| match (m == k, c[m] == 0.0) {
                        (true, true) => -2.0 * s[m],
                        (true, false) => c[m],
                        (false, true) => 1.0 - s[m] * s[m],
                        (false, false) => 1.0 + c[m] * s[m],
                    })
                    .product::<f64>();
        }
    }
    grad
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extrapolation::ExtrapolationBasis;
    use crate::topology::ElementClass;

    #[test]
    fn gauss14_weights_sum_to_cube_volume() {
        let points = hex::gauss_rule(Quadrature::Gauss14, ElementClass::Volumetric);
        assert_eq!(points.len(), 14);
        let total: f64 = points.iter().map(|p| p.weight).sum();
        assert!((total - 8.0).abs() < 1e-9, "total {}", total);
    }

    #[test]
    fn extrapolation_basis_follows_rule() {
        assert_eq!(
            hex::extrapolation(Quadrature::Gauss27, ElementClass::Volumetric),
            ExtrapolationBasis::Identity
        );
    }
}
