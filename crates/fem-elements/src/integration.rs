//! Integration points and their process-wide caches.
//!
//! Integration point tables depend only on the topology, the quadrature rule
//! and the element class, so they are built once per process and shared by
//! every element. Geometry-dependent rest data (inverse Jacobians and their
//! determinants) lives in [`IntegrationData`], owned by each element.
//!
//! Jacobian columns are the derivatives of the mapped position with respect
//! to the natural coordinates:
//!
//! ```text
//! volumetric:  x(s) = sum N_i p_i
//! shell:       x(s) = sum N_i (p_i + (t - 1)/2 d_i)      d = front - back
//! membrane:    x(s) = sum N_i p_i, third column = unit surface normal
//! ```

use crate::config::Quadrature;
use crate::error::Result;
use crate::node::{Configuration, Node};
use crate::quadrature::QuadraturePoint;
use crate::topology::{ElementClass, Topology};
use nalgebra::{DVector, Matrix3, Vector3};
use once_cell::sync::OnceCell;

/// Number of `(topology, quadrature, class)` cache slots.
const SLOTS: usize = Topology::COUNT * Quadrature::COUNT * ElementClass::COUNT;

/// Cache slot for a resolved quadrature and a valid class.
pub(crate) fn cache_slot(topology: Topology, quadrature: Quadrature, class: ElementClass) -> usize {
    (topology.index() * Quadrature::COUNT + quadrature.index()) * ElementClass::COUNT + class.index()
}

static POINTS: [OnceCell<Vec<IntegrationPoint>>; SLOTS] = [const { OnceCell::new() }; SLOTS];

static WARPING_POINTS: [OnceCell<IntegrationPoint>; Topology::COUNT * ElementClass::COUNT] =
    [const { OnceCell::new() }; Topology::COUNT * ElementClass::COUNT];

/// A quadrature sample with its shape data evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationPoint {
    /// Position in the element's point list
    pub number: usize,
    pub coords: Vector3<f64>,
    pub weight: f64,
    /// Shape function values `N_i`
    pub shape: DVector<f64>,
    /// Natural-coordinate gradients `dN_i/ds`
    pub gradients: Vec<Vector3<f64>>,
    /// Pressure basis values `H_k`
    pub pressure: DVector<f64>,
}

impl IntegrationPoint {
    /// Evaluate the full basis of `topology` at a quadrature point.
    pub fn new(topology: Topology, number: usize, point: &QuadraturePoint) -> Self {
        let desc = topology.descriptor();
        let n = desc.node_coords.len();
        let s = point.coords;
        Self {
            number,
            coords: s,
            weight: point.weight,
            shape: DVector::from_iterator(n, (0..n).map(|i| (desc.shape)(i, &s))),
            gradients: (0..n).map(|i| (desc.shape_gradient)(i, &s)).collect(),
            pressure: DVector::from_iterator(
                desc.num_pressure_values,
                (0..desc.num_pressure_values).map(|k| (desc.pressure_shape)(k, &s)),
            ),
        }
    }

    /// Warping point: only the linear corner basis is evaluated, higher-order
    /// nodes get zero shape values and gradients.
    fn warping(topology: Topology, class: ElementClass) -> Self {
        let desc = topology.descriptor();
        let linear = desc.linear.descriptor();
        let n = desc.node_coords.len();
        let m = linear.node_coords.len();
        let c = desc.warping_coords;
        let s = Vector3::new(c[0], c[1], c[2]);

        let mut shape = DVector::zeros(n);
        let mut gradients = vec![Vector3::zeros(); n];
        for i in 0..m {
            shape[i] = (linear.shape)(i, &s);
            gradients[i] = (linear.shape_gradient)(i, &s);
        }
        let weight = match class {
            ElementClass::Membrane => 0.5 * desc.reference_measure,
            _ => desc.reference_measure,
        };
        Self {
            number: 0,
            coords: s,
            weight,
            shape,
            gradients,
            pressure: DVector::from_iterator(
                desc.num_pressure_values,
                (0..desc.num_pressure_values).map(|k| (desc.pressure_shape)(k, &s)),
            ),
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.gradients.len()
    }

    /// Jacobian `dx/ds` for the given node state.
    pub fn jacobian(&self, class: ElementClass, nodes: &[&Node], config: Configuration) -> Matrix3<f64> {
        let mut j = Matrix3::zeros();
        match class {
            ElementClass::Volumetric => {
                for (node, dn) in nodes.iter().zip(&self.gradients) {
                    j += node.coordinates(config) * dn.transpose();
                }
            }
            ElementClass::Shell => {
                let st = -0.5 * (1.0 - self.coords.z);
                for (i, (node, dn)) in nodes.iter().zip(&self.gradients).enumerate() {
                    let d = node.director_in(config);
                    let v = node.coordinates(config) + d * st;
                    j.column_mut(0).axpy(dn.x, &v, 1.0);
                    j.column_mut(1).axpy(dn.y, &v, 1.0);
                    j.column_mut(2).axpy(0.5 * self.shape[i], d, 1.0);
                }
            }
            ElementClass::Membrane => {
                for (node, dn) in nodes.iter().zip(&self.gradients) {
                    let p = node.coordinates(config);
                    j.column_mut(0).axpy(dn.x, p, 1.0);
                    j.column_mut(1).axpy(dn.y, p, 1.0);
                }
                let normal = j.column(0).cross(&j.column(1));
                let len = normal.norm();
                if len > 0.0 {
                    j.set_column(2, &(normal / len));
                }
            }
        }
        j
    }

    /// Interpolated position of this point.
    pub fn position(&self, class: ElementClass, nodes: &[&Node], config: Configuration) -> Vector3<f64> {
        let mut pos = Vector3::zeros();
        for (i, node) in nodes.iter().enumerate() {
            let mut p = *node.coordinates(config);
            if class == ElementClass::Shell {
                p += node.director_in(config) * (0.5 * (self.coords.z - 1.0));
            }
            pos += p * self.shape[i];
        }
        pos
    }

    /// Spatial gradients `dN_i/dx = J^-T dN_i/ds`.
    pub fn spatial_gradients(&self, inv_j: &Matrix3<f64>) -> Vec<Vector3<f64>> {
        let inv_jt = inv_j.transpose();
        self.gradients.iter().map(|dn| inv_jt * dn).collect()
    }

    /// Interpolate nodal scalars at this point.
    pub fn interpolate(&self, values: &[f64]) -> f64 {
        values.iter().zip(self.shape.iter()).map(|(v, n)| v * n).sum()
    }
}

/// Rest-configuration data for one integration point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationData {
    /// Inverse rest Jacobian (zero if the rest Jacobian is singular)
    pub inv_j0: Matrix3<f64>,
    pub det_j0: f64,
}

impl IntegrationData {
    pub fn new(point: &IntegrationPoint, class: ElementClass, nodes: &[&Node]) -> Self {
        let j0 = point.jacobian(class, nodes, Configuration::Rest);
        let det_j0 = j0.determinant();
        let inv_j0 = j0.try_inverse().unwrap_or_else(|| {
            log::debug!("singular rest Jacobian at integration point {}", point.number);
            Matrix3::zeros()
        });
        Self { inv_j0, det_j0 }
    }

    /// Rest volume element `detJ0 * weight`.
    pub fn dv0(&self, point: &IntegrationPoint) -> f64 {
        self.det_j0 * point.weight
    }
}

/// Sample points of the rule actually used for `quadrature`.
pub fn quadrature_points(
    topology: Topology,
    quadrature: Quadrature,
    class: ElementClass,
) -> Result<Vec<QuadraturePoint>> {
    let quadrature = topology.resolve_quadrature(quadrature)?;
    topology.check_class(class)?;
    Ok((topology.descriptor().rule)(quadrature, class))
}

/// Shared integration points for a topology, rule and class.
///
/// Built on first use. Concurrent first calls block until one builder
/// finishes and then all observe the same table.
pub fn integration_points(
    topology: Topology,
    quadrature: Quadrature,
    class: ElementClass,
) -> Result<&'static [IntegrationPoint]> {
    let resolved = topology.resolve_quadrature(quadrature)?;
    topology.check_class(class)?;
    let points = POINTS[cache_slot(topology, resolved, class)].get_or_init(|| {
        let rule = (topology.descriptor().rule)(resolved, class);
        log::debug!(
            "building {} integration points for {:?} ({:?}, {:?})",
            rule.len(),
            topology,
            resolved,
            class
        );
        rule.iter()
            .enumerate()
            .map(|(k, p)| IntegrationPoint::new(topology, k, p))
            .collect()
    });
    Ok(points.as_slice())
}

/// Shared warping point for a topology and class.
pub fn warping_point(topology: Topology, class: ElementClass) -> Result<&'static IntegrationPoint> {
    topology.check_class(class)?;
    let slot = topology.index() * ElementClass::COUNT + class.index();
    Ok(WARPING_POINTS[slot].get_or_init(|| IntegrationPoint::warping(topology, class)))
}
