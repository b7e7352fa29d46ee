//! Nodal extrapolation of integration-point fields.
//!
//! For a polynomial basis `P` the extrapolation matrix is
//!
//! ```text
//! E = B * pinv(A)      A[k][j] = P_j(s_k)   (integration points)
//!                      B[i][j] = P_j(x_i)   (nodes)
//! ```
//!
//! i.e. a least-squares polynomial fit of the samples, evaluated at the
//! nodes. Any field in the span of `P` is reproduced exactly. The 27-point
//! hexahedral rules place one sample next to every node, so their matrix is a
//! plain selection (identity on the leading columns).

use crate::config::Quadrature;
use crate::error::{FemError, Result};
use crate::integration::{cache_slot, integration_points};
use crate::topology::{ElementClass, Topology};
use nalgebra::{DMatrix, Vector3};
use once_cell::sync::OnceCell;

const SLOTS: usize = Topology::COUNT * Quadrature::COUNT * ElementClass::COUNT;

static EXTRAPOLATION: [OnceCell<DMatrix<f64>>; SLOTS] = [const { OnceCell::new() }; SLOTS];
static SHAPE_MATRICES: [OnceCell<DMatrix<f64>>; SLOTS] = [const { OnceCell::new() }; SLOTS];

/// Polynomial basis used to fit integration-point samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtrapolationBasis {
    /// `{1}`: the nodal value is the sample mean
    Constant,
    /// `{1, s0, s1, s2}`
    Linear,
    /// `{1, s0, s1}`
    Planar,
    /// `{1, s0, s1, s0 s1}`
    Bilinear,
    /// `{1, s0, s1, s2, s0 s2, s1 s2}`
    Prism,
    /// `{1, s0, s1, s2, s0 s1, s1 s2, s0 s2, s0 s1 s2}`
    Trilinear,
    /// Node `i` takes the value of integration point `i`
    Identity,
}

impl ExtrapolationBasis {
    /// Number of basis terms (`None` for `Identity`).
    pub fn num_terms(self) -> Option<usize> {
        match self {
            ExtrapolationBasis::Constant => Some(1),
            ExtrapolationBasis::Planar => Some(3),
            ExtrapolationBasis::Linear | ExtrapolationBasis::Bilinear => Some(4),
            ExtrapolationBasis::Prism => Some(6),
            ExtrapolationBasis::Trilinear => Some(8),
            ExtrapolationBasis::Identity => None,
        }
    }

    /// Evaluate every basis term at `s`.
    pub fn evaluate(self, s: &Vector3<f64>) -> Vec<f64> {
        let (x, y, z) = (s.x, s.y, s.z);
        match self {
            ExtrapolationBasis::Constant => vec![1.0],
            ExtrapolationBasis::Linear => vec![1.0, x, y, z],
            ExtrapolationBasis::Planar => vec![1.0, x, y],
            ExtrapolationBasis::Bilinear => vec![1.0, x, y, x * y],
            ExtrapolationBasis::Prism => vec![1.0, x, y, z, x * z, y * z],
            ExtrapolationBasis::Trilinear => {
                vec![1.0, x, y, z, x * y, y * z, x * z, x * y * z]
            }
            ExtrapolationBasis::Identity => Vec::new(),
        }
    }
}

/// Basis chosen for a topology, rule and class.
pub fn extrapolation_basis(
    topology: Topology,
    quadrature: Quadrature,
    class: ElementClass,
) -> Result<ExtrapolationBasis> {
    let resolved = topology.resolve_quadrature(quadrature)?;
    topology.check_class(class)?;
    Ok((topology.descriptor().extrapolation)(resolved, class))
}

/// Least-squares extrapolation from `samples` to `targets`.
pub fn least_squares_extrapolation(
    basis: ExtrapolationBasis,
    samples: &[Vector3<f64>],
    targets: &[Vector3<f64>],
) -> Result<DMatrix<f64>> {
    let Some(terms) = basis.num_terms() else {
        let mut e = DMatrix::zeros(targets.len(), samples.len());
        for i in 0..targets.len().min(samples.len()) {
            e[(i, i)] = 1.0;
        }
        return Ok(e);
    };
    let a = DMatrix::from_fn(samples.len(), terms, |k, j| basis.evaluate(&samples[k])[j]);
    let b = DMatrix::from_fn(targets.len(), terms, |i, j| basis.evaluate(&targets[i])[j]);
    let pinv = a
        .pseudo_inverse(1e-12)
        .map_err(|e| FemError::Numerical(format!("extrapolation fit: {}", e)))?;
    Ok(b * pinv)
}

/// Cached `num_nodes x num_points` nodal extrapolation matrix.
pub fn nodal_extrapolation_matrix(
    topology: Topology,
    quadrature: Quadrature,
    class: ElementClass,
) -> Result<&'static DMatrix<f64>> {
    let resolved = topology.resolve_quadrature(quadrature)?;
    let points = integration_points(topology, resolved, class)?;
    EXTRAPOLATION[cache_slot(topology, resolved, class)].get_or_try_init(|| {
        let basis = (topology.descriptor().extrapolation)(resolved, class);
        log::debug!("building {:?} extrapolation matrix for {:?}", basis, topology);
        let samples: Vec<Vector3<f64>> = points.iter().map(|p| p.coords).collect();
        let nodes: Vec<Vector3<f64>> = topology
            .node_coords()
            .iter()
            .map(|c| Vector3::new(c[0], c[1], c[2]))
            .collect();
        least_squares_extrapolation(basis, &samples, &nodes)
    })
}

/// Cached `num_points x num_nodes` matrix of shape values, interpolating
/// nodal values to the integration points.
pub fn shape_matrix(
    topology: Topology,
    quadrature: Quadrature,
    class: ElementClass,
) -> Result<&'static DMatrix<f64>> {
    let resolved = topology.resolve_quadrature(quadrature)?;
    let points = integration_points(topology, resolved, class)?;
    Ok(SHAPE_MATRICES[cache_slot(topology, resolved, class)].get_or_init(|| {
        DMatrix::from_fn(points.len(), topology.num_nodes(), |k, i| points[k].shape[i])
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gauss27_is_a_selection() {
        let e = nodal_extrapolation_matrix(Topology::QuadHex, Quadrature::Gauss27, ElementClass::Volumetric)
            .unwrap();
        assert_eq!(e.shape(), (20, 27));
        for i in 0..20 {
            for k in 0..27 {
                assert_eq!(e[(i, k)], if i == k { 1.0 } else { 0.0 });
            }
        }
    }

    #[test]
    fn constant_basis_averages() {
        let e = nodal_extrapolation_matrix(Topology::Tet, Quadrature::Standard, ElementClass::Volumetric)
            .unwrap();
        assert_eq!(e.shape(), (4, 1));
        assert!(e.iter().all(|&v| (v - 1.0).abs() < 1e-12));
    }

    #[test]
    fn rows_sum_to_one() {
        for topology in Topology::ALL {
            let class = if topology.is_shell() {
                ElementClass::Shell
            } else {
                ElementClass::Volumetric
            };
            let e = nodal_extrapolation_matrix(topology, Quadrature::Standard, class).unwrap();
            for i in 0..e.nrows() {
                let sum: f64 = e.row(i).sum();
                assert!((sum - 1.0).abs() < 1e-9, "{:?} row {} sums to {}", topology, i, sum);
            }
        }
    }

    #[test]
    fn shape_matrix_interpolates_constants() {
        let n = shape_matrix(Topology::Wedge, Quadrature::Standard, ElementClass::Volumetric).unwrap();
        assert_eq!(n.shape(), (6, 6));
        for k in 0..n.nrows() {
            assert!((n.row(k).sum() - 1.0).abs() < 1e-12);
        }
    }
}
