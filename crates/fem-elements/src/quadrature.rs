//! Quadrature sample tables.
//!
//! Rules are built as plain `(coords, weight)` lists. The integration module
//! turns them into cached [`crate::integration::IntegrationPoint`] arrays.

use crate::error::{FemError, Result};
use nalgebra::Vector3;

/// One quadrature sample in natural coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraturePoint {
    pub coords: Vector3<f64>,
    pub weight: f64,
}

impl QuadraturePoint {
    pub fn new(s0: f64, s1: f64, s2: f64, weight: f64) -> Self {
        Self {
            coords: Vector3::new(s0, s1, s2),
            weight,
        }
    }
}

/// Number of points of a one-dimensional Gauss-Legendre rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaussOrder {
    One,
    Two,
    Three,
    Four,
}

impl GaussOrder {
    pub const ALL: [GaussOrder; 4] = [GaussOrder::One, GaussOrder::Two, GaussOrder::Three, GaussOrder::Four];

    /// Order with `n` points; only 1 to 4 points are tabulated.
    pub fn from_points(n: usize) -> Result<Self> {
        match n {
            1 => Ok(GaussOrder::One),
            2 => Ok(GaussOrder::Two),
            3 => Ok(GaussOrder::Three),
            4 => Ok(GaussOrder::Four),
            _ => Err(FemError::UnsupportedGaussOrder(n)),
        }
    }

    pub fn num_points(self) -> usize {
        match self {
            GaussOrder::One => 1,
            GaussOrder::Two => 2,
            GaussOrder::Three => 3,
            GaussOrder::Four => 4,
        }
    }
}

/// Gauss-Legendre abscissae and weights on `[-1, 1]`.
pub fn gauss_legendre(order: GaussOrder) -> Vec<(f64, f64)> {
    match order {
        GaussOrder::One => vec![(0.0, 2.0)],
        GaussOrder::Two => {
            let q = 1.0 / 3.0_f64.sqrt();
            vec![(-q, 1.0), (q, 1.0)]
        }
        GaussOrder::Three => {
            let q = 0.6_f64.sqrt();
            vec![(-q, 5.0 / 9.0), (0.0, 8.0 / 9.0), (q, 5.0 / 9.0)]
        }
        GaussOrder::Four => {
            let a = (3.0 / 7.0 - 2.0 / 7.0 * 1.2_f64.sqrt()).sqrt();
            let b = (3.0 / 7.0 + 2.0 / 7.0 * 1.2_f64.sqrt()).sqrt();
            let wa = (18.0 + 30.0_f64.sqrt()) / 36.0;
            let wb = (18.0 - 30.0_f64.sqrt()) / 36.0;
            vec![(-b, wb), (-a, wa), (a, wa), (b, wb)]
        }
    }
}

/// Three-point rule on the unit triangle (exact to degree 2).
///
/// Point k lies closest to triangle vertex k.
pub const TRIANGLE_3: [(f64, f64, f64); 3] = [
    (1.0 / 6.0, 1.0 / 6.0, 1.0 / 6.0),
    (2.0 / 3.0, 1.0 / 6.0, 1.0 / 6.0),
    (1.0 / 6.0, 2.0 / 3.0, 1.0 / 6.0),
];

/// Triangle rule times Gauss-Legendre in the third coordinate mapped to `[0, 1]`.
///
/// Layers are ordered from `s2 = 0` upwards.
pub fn prism_rule(layers: GaussOrder) -> Vec<QuadraturePoint> {
    let mut points = Vec::with_capacity(3 * layers.num_points());
    for (z, wz) in gauss_legendre(layers) {
        for &(r, s, w) in &TRIANGLE_3 {
            points.push(QuadraturePoint::new(r, s, 0.5 * (1.0 + z), 0.5 * w * wz));
        }
    }
    points
}

/// Collapsed Gauss rule for the pyramid domain
/// `|s0| <= 1 - s2`, `|s1| <= 1 - s2`, `0 <= s2 <= 1`.
///
/// A cube point `(u, v, w)` maps to `((1-z)u, (1-z)v, z)` with
/// `z = (1 + w)/2`; the weight picks up the Jacobian `(1-z)^2 / 2`.
pub fn collapsed_pyramid_rule(order: GaussOrder) -> Vec<QuadraturePoint> {
    let gauss = gauss_legendre(order);
    let mut points = Vec::with_capacity(gauss.len().pow(3));
    for &(w, ww) in &gauss {
        let z = 0.5 * (1.0 + w);
        let a = 1.0 - z;
        for &(v, wv) in &gauss {
            for &(u, wu) in &gauss {
                points.push(QuadraturePoint::new(
                    u * a,
                    v * a,
                    z,
                    wu * wv * ww * a * a * 0.5,
                ));
            }
        }
    }
    points
}

/// Template points scaled by `q`, weighted per point by `weight`.
pub fn scaled_template(
    template: &[[f64; 3]],
    q: f64,
    weight: impl Fn(&[f64; 3]) -> f64,
) -> Vec<QuadraturePoint> {
    template
        .iter()
        .map(|c| QuadraturePoint::new(c[0] * q, c[1] * q, c[2] * q, weight(c)))
        .collect()
}

pub fn total_weight(points: &[QuadraturePoint]) -> f64 {
    points.iter().map(|p| p.weight).sum()
}
