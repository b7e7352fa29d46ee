//! Element stiffness, internal force and mass built on the assembly kernels.
//!
//! Volumetric and membrane elements have 3 degrees of freedom per node.
//! Shell elements have 6: the front displacement followed by the back
//! (director) displacement.
//!
//! Materials that report an incompressible bulk modulus get their volumetric
//! response from the element pressure (mixed u/p):
//!
//! ```text
//! M0     = sum_k H_k H_k^T dV0_k
//! p      = M0^-1 sum_k H_k kappa (detJ_k / detJ0_k - 1) dV0_k
//! Rinv   = kappa M0^-1                      (= kappa / V0 for one pressure)
//! K_ij  += GT_i Rinv GT_j^T + pressure stiffness
//! ```

use crate::element::Element;
use crate::error::{FemError, Result};
use crate::kernels::{self, ShellBlocks};
use crate::materials::{DeformedPoint, Material};
use crate::node::{Configuration, Node};
use crate::topology::ElementClass;
use nalgebra::{DMatrix, DVector, Matrix3, Matrix3xX, Vector3};

/// Element interface for stiffness and mass evaluation
pub trait ElementModel {
    /// Degrees of freedom per node
    fn dofs_per_node(&self) -> usize;

    /// Model node indices in element order
    fn node_indices(&self) -> &[usize];

    /// Tangent stiffness in the current configuration
    ///
    /// # Arguments
    /// * `nodes` - The model's node array
    /// * `material` - Constitutive model
    ///
    /// # Returns
    /// Element stiffness matrix (size: num_dofs × num_dofs)
    fn stiffness_matrix(&self, nodes: &[Node], material: &dyn Material) -> Result<DMatrix<f64>>;

    /// Internal (stress) forces in the current configuration
    fn internal_forces(&self, nodes: &[Node], material: &dyn Material) -> Result<DVector<f64>>;

    /// Consistent mass matrix
    fn mass_matrix(&self, nodes: &[Node], material: &dyn Material) -> Result<DMatrix<f64>>;

    /// Global DOF indices, `dofs_per_node` consecutive entries per node
    fn global_dof_indices(&self) -> Vec<usize> {
        let dofs_per_node = self.dofs_per_node();
        self.node_indices()
            .iter()
            .flat_map(|&n| (0..dofs_per_node).map(move |d| n * dofs_per_node + d))
            .collect()
    }
}

/// Stress state of one integration point in the current configuration.
struct PointState {
    inv_j: Matrix3<f64>,
    gradients: Vec<Vector3<f64>>,
    dv: f64,
    sigma: Matrix3<f64>,
    tangent: nalgebra::Matrix6<f64>,
}

fn point_states(elem: &Element, nodes: &[Node], material: &dyn Material) -> Result<Vec<PointState>> {
    let refs = elem.element_nodes(nodes)?;
    let rest = elem.rest_data(nodes)?;
    let rotation = if material.is_corotated() {
        elem.rotation(nodes)?
    } else {
        Matrix3::identity()
    };
    elem.integration_points()
        .iter()
        .zip(rest)
        .map(|(p, data)| {
            let geom = elem.point_geometry(p, &refs, Configuration::Current)?;
            let f = geom.jacobian * data.inv_j0;
            let (sigma, tangent) =
                material.compute_stress_and_tangent(&DeformedPoint::with_rotation(f, rotation));
            Ok(PointState {
                inv_j: geom.inv_j,
                gradients: geom.gradients,
                dv: geom.det_j * p.weight,
                sigma,
                tangent,
            })
        })
        .collect()
}

/// Pressure state of a mixed u/p element.
#[derive(Debug, Clone, PartialEq)]
pub struct IncompressibleState {
    /// One pressure per pressure basis function
    pub pressures: DVector<f64>,
    /// `kappa M0^-1`
    pub rinv: DMatrix<f64>,
}

/// Element pressures and dilational weight matrix for bulk modulus `kappa`.
pub fn incompressible_state(elem: &Element, nodes: &[Node], kappa: f64) -> Result<IncompressibleState> {
    let npvals = elem.num_pressure_values();
    if npvals == 0 {
        return Err(FemError::InvalidConfig(format!(
            "{} elements have no pressure values",
            elem.topology().name()
        )));
    }
    let refs = elem.element_nodes(nodes)?;
    let rest = elem.rest_data(nodes)?;

    let mut m0 = DMatrix::zeros(npvals, npvals);
    let mut pbuf = DVector::zeros(npvals);
    for (p, data) in elem.integration_points().iter().zip(rest) {
        let det_j = p.jacobian(elem.class(), &refs, Configuration::Current).determinant();
        let dv0 = data.dv0(p);
        pbuf.axpy(kappa * (det_j / data.det_j0 - 1.0) * dv0, &p.pressure, 1.0);
        m0.ger(dv0, &p.pressure, &p.pressure, 1.0);
    }
    let m0_inv = m0.try_inverse().ok_or_else(|| {
        FemError::Numerical(format!(
            "element {} has a singular rest pressure mass matrix",
            elem.id()
        ))
    })?;
    Ok(IncompressibleState {
        pressures: &m0_inv * pbuf,
        rinv: m0_inv * kappa,
    })
}

/// Add the dilational and pressure stiffness of a mixed element to `k`.
pub fn add_incompressible_stiffness(
    elem: &Element,
    nodes: &[Node],
    state: &IncompressibleState,
    k: &mut DMatrix<f64>,
) -> Result<()> {
    let n = elem.num_nodes();
    let gt = elem.incompress_constraints(nodes)?;
    let refs = elem.element_nodes(nodes)?;
    let mut blocks = vec![Matrix3::zeros(); n * n];

    for i in 0..n {
        for j in 0..n {
            kernels::add_dilational_stiffness_dense(&mut blocks[i * n + j], &state.rinv, &gt[i], &gt[j])?;
        }
    }
    for p in elem.integration_points() {
        let geom = elem.point_geometry(p, &refs, Configuration::Current)?;
        let dv = geom.det_j * p.weight;
        let pressure = p.pressure.dot(&state.pressures);
        for i in 0..n {
            for j in 0..n {
                kernels::add_pressure_stiffness(
                    &mut blocks[i * n + j],
                    &geom.gradients[i],
                    pressure,
                    &geom.gradients[j],
                    dv,
                );
            }
        }
    }
    for i in 0..n {
        for j in 0..n {
            let mut view = k.fixed_view_mut::<3, 3>(3 * i, 3 * j);
            view += blocks[i * n + j];
        }
    }
    Ok(())
}

/// Add the pressure forces `sum_k B^T (p I) dv` of a mixed element to `f`.
pub fn add_incompressible_forces(
    elem: &Element,
    nodes: &[Node],
    state: &IncompressibleState,
    f: &mut DVector<f64>,
) -> Result<()> {
    let refs = elem.element_nodes(nodes)?;
    for p in elem.integration_points() {
        let geom = elem.point_geometry(p, &refs, Configuration::Current)?;
        let sigma = Matrix3::identity() * p.pressure.dot(&state.pressures);
        let dv = geom.det_j * p.weight;
        for (i, g) in geom.gradients.iter().enumerate() {
            let mut fi = Vector3::zeros();
            kernels::add_stress_force(&mut fi, g, &sigma, dv);
            let mut view = f.fixed_rows_mut::<3>(3 * i);
            view += fi;
        }
    }
    Ok(())
}

/// Per-pair 3×3 material stiffness blocks of a volumetric or membrane
/// element, row-major over node pairs.
pub fn material_stiffness_blocks(
    elem: &Element,
    nodes: &[Node],
    material: &dyn Material,
) -> Result<Vec<Matrix3<f64>>> {
    let n = elem.num_nodes();
    let states = point_states(elem, nodes, material)?;
    let mut blocks = vec![Matrix3::zeros(); n * n];
    for (p, s) in elem.integration_points().iter().zip(&states) {
        for i in 0..n {
            for j in 0..n {
                let kij = &mut blocks[i * n + j];
                match elem.class() {
                    ElementClass::Membrane => kernels::add_membrane_material_stiffness(
                        kij,
                        &p.gradients[i],
                        &p.gradients[j],
                        &s.inv_j,
                        &s.tangent,
                        &s.sigma,
                        s.dv,
                    ),
                    _ => kernels::add_material_stiffness(
                        kij,
                        &s.gradients[i],
                        &s.tangent,
                        &s.sigma,
                        &s.gradients[j],
                        s.dv,
                    ),
                }
            }
        }
    }
    Ok(blocks)
}

fn shell_stiffness(elem: &Element, nodes: &[Node], material: &dyn Material) -> Result<DMatrix<f64>> {
    let n = elem.num_nodes();
    let states = point_states(elem, nodes, material)?;
    let mut blocks = vec![ShellBlocks::default(); n * n];
    for (p, s) in elem.integration_points().iter().zip(&states) {
        let t = p.coords.z;
        let grads: Vec<_> = (0..n)
            .map(|i| kernels::shell_gradients(p.shape[i], &p.gradients[i], t, &s.inv_j))
            .collect();
        for i in 0..n {
            for j in 0..n {
                kernels::add_shell_material_stiffness(
                    &mut blocks[i * n + j],
                    &grads[i],
                    &s.tangent,
                    &s.sigma,
                    &grads[j],
                    s.dv,
                );
            }
        }
    }
    let mut k = DMatrix::zeros(6 * n, 6 * n);
    for i in 0..n {
        for j in 0..n {
            let b = &blocks[i * n + j];
            k.fixed_view_mut::<3, 3>(6 * i, 6 * j).copy_from(&b.front_front);
            k.fixed_view_mut::<3, 3>(6 * i, 6 * j + 3).copy_from(&b.front_back);
            k.fixed_view_mut::<3, 3>(6 * i + 3, 6 * j).copy_from(&b.back_front);
            k.fixed_view_mut::<3, 3>(6 * i + 3, 6 * j + 3).copy_from(&b.back_back);
        }
    }
    Ok(k)
}

impl ElementModel for Element {
    fn dofs_per_node(&self) -> usize {
        match self.class() {
            ElementClass::Shell => 6,
            _ => 3,
        }
    }

    fn node_indices(&self) -> &[usize] {
        self.nodes()
    }

    fn stiffness_matrix(&self, nodes: &[Node], material: &dyn Material) -> Result<DMatrix<f64>> {
        if self.class() == ElementClass::Shell {
            return shell_stiffness(self, nodes, material);
        }
        let n = self.num_nodes();
        let blocks = material_stiffness_blocks(self, nodes, material)?;
        let mut k = DMatrix::zeros(3 * n, 3 * n);
        for i in 0..n {
            for j in 0..n {
                k.fixed_view_mut::<3, 3>(3 * i, 3 * j).copy_from(&blocks[i * n + j]);
            }
        }
        if let Some(kappa) = material.incompressible_bulk_modulus() {
            let state = incompressible_state(self, nodes, kappa)?;
            add_incompressible_stiffness(self, nodes, &state, &mut k)?;
        }
        Ok(k)
    }

    fn internal_forces(&self, nodes: &[Node], material: &dyn Material) -> Result<DVector<f64>> {
        let n = self.num_nodes();
        let states = point_states(self, nodes, material)?;
        let mut f = DVector::zeros(self.dofs_per_node() * n);
        for (p, s) in self.integration_points().iter().zip(&states) {
            for i in 0..n {
                match self.class() {
                    ElementClass::Volumetric => {
                        let mut fi = Vector3::zeros();
                        kernels::add_stress_force(&mut fi, &s.gradients[i], &s.sigma, s.dv);
                        let mut view = f.fixed_rows_mut::<3>(3 * i);
                        view += fi;
                    }
                    ElementClass::Membrane => {
                        let mut fi = Vector3::zeros();
                        kernels::add_membrane_stress_force(&mut fi, &s.sigma, &p.gradients[i], &s.inv_j, s.dv);
                        let mut view = f.fixed_rows_mut::<3>(3 * i);
                        view += fi;
                    }
                    ElementClass::Shell => {
                        let g = kernels::shell_gradients(p.shape[i], &p.gradients[i], p.coords.z, &s.inv_j);
                        let mut front = Vector3::zeros();
                        let mut back = Vector3::zeros();
                        kernels::add_shell_stress_force(&mut front, &mut back, &s.sigma, &g, s.dv);
                        let mut view = f.fixed_rows_mut::<3>(6 * i);
                        view += front;
                        let mut view = f.fixed_rows_mut::<3>(6 * i + 3);
                        view += back;
                    }
                }
            }
        }
        if let Some(kappa) = material.incompressible_bulk_modulus() {
            let state = incompressible_state(self, nodes, kappa)?;
            add_incompressible_forces(self, nodes, &state, &mut f)?;
        }
        Ok(f)
    }

    fn mass_matrix(&self, nodes: &[Node], material: &dyn Material) -> Result<DMatrix<f64>> {
        let m = self.consistent_mass(nodes, material.density())?;
        let dofs = self.dofs_per_node();
        let n = self.num_nodes();
        let mut mass = DMatrix::zeros(dofs * n, dofs * n);
        for i in 0..n {
            for j in 0..n {
                for d in 0..dofs {
                    mass[(dofs * i + d, dofs * j + d)] = m[(i, j)];
                }
            }
        }
        Ok(mass)
    }
}

/// Dilational stiffness blocks `GT_i Rinv GT_j^T` and the element's
/// incompressibility constraints, for assembly into shared storage.
pub fn dilational_blocks(
    elem: &Element,
    nodes: &[Node],
    kappa: f64,
) -> Result<(IncompressibleState, Vec<Matrix3xX<f64>>)> {
    let state = incompressible_state(elem, nodes, kappa)?;
    let gt = elem.incompress_constraints(nodes)?;
    Ok((state, gt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ElementConfig, Quadrature};
    use crate::materials::{IncompressibleLinearMaterial, LinearMaterial};
    use crate::topology::Topology;

    fn reference_nodes(topology: Topology) -> Vec<Node> {
        topology
            .node_coords()
            .iter()
            .enumerate()
            .map(|(i, c)| Node::new(i, c[0], c[1], c[2]))
            .collect()
    }

    fn element(topology: Topology) -> Element {
        Element::new(0, topology, (0..topology.num_nodes()).collect(), &ElementConfig::default()).unwrap()
    }

    #[test]
    fn stiffness_is_symmetric_with_rigid_modes() {
        let mat = LinearMaterial::new(1000.0, 0.3, 1.0).unwrap();
        for topology in [Topology::Tet, Topology::Hex, Topology::Wedge, Topology::QuadTet] {
            let nodes = reference_nodes(topology);
            let elem = element(topology);
            let k = elem.stiffness_matrix(&nodes, &mat).unwrap();
            assert!((&k - k.transpose()).norm() < 1e-9 * k.norm(), "{:?} not symmetric", topology);

            // translation in x produces no force
            let n = topology.num_nodes();
            let u = DVector::from_fn(3 * n, |r, _| if r % 3 == 0 { 1.0 } else { 0.0 });
            assert!((&k * u).norm() < 1e-9 * k.norm(), "{:?}", topology);
        }
    }

    #[test]
    fn undeformed_element_has_no_internal_force() {
        let mat = LinearMaterial::new(1000.0, 0.3, 1.0).unwrap();
        let nodes = reference_nodes(Topology::Hex);
        let f = element(Topology::Hex).internal_forces(&nodes, &mat).unwrap();
        assert!(f.norm() < 1e-12);
    }

    #[test]
    fn stretched_cube_forces_balance() {
        let mat = LinearMaterial::new(1000.0, 0.0, 1.0).unwrap();
        let mut nodes = reference_nodes(Topology::Hex);
        for node in &mut nodes {
            let p = *node.position();
            node.set_position(Vector3::new(1.01 * p.x, p.y, p.z));
        }
        let f = element(Topology::Hex).internal_forces(&nodes, &mat).unwrap();
        let total: f64 = (0..8).map(|i| f[3 * i]).sum();
        assert!(total.abs() < 1e-9);
        // +x face pulled in +x
        assert!(f[3] > 0.0);
        assert!(f[0] < 0.0);
    }

    #[test]
    fn mass_matrix_totals_element_mass() {
        let mat = LinearMaterial::new(1000.0, 0.3, 2.0).unwrap();
        let nodes = reference_nodes(Topology::Hex);
        let elem = Element::with_quadrature(
            0,
            Topology::Hex,
            (0..8).collect(),
            Quadrature::Gauss8,
            ElementClass::Volumetric,
        )
        .unwrap();
        let m = elem.mass_matrix(&nodes, &mat).unwrap();
        assert_eq!(m.shape(), (24, 24));
        // x-direction entries sum to density * volume
        let sum: f64 = (0..8).flat_map(|i| (0..8).map(move |j| (i, j))).map(|(i, j)| m[(3 * i, 3 * j)]).sum();
        assert!((sum - 16.0).abs() < 1e-12);
    }

    #[test]
    fn global_dofs_follow_node_indices() {
        let elem = Element::new(0, Topology::Tet, vec![3, 0, 7, 2], &ElementConfig::default()).unwrap();
        assert_eq!(&elem.global_dof_indices()[..4], &[9, 10, 11, 0]);
        let shell = Element::new(0, Topology::ShellTri, vec![1, 2, 0], &ElementConfig::default()).unwrap();
        assert_eq!(shell.dofs_per_node(), 6);
        assert_eq!(&shell.global_dof_indices()[..2], &[6, 7]);
    }

    #[test]
    fn incompressible_pressure_tracks_volume_change() {
        let mat = IncompressibleLinearMaterial::new(1.0, 100.0, 1.0).unwrap();
        let mut nodes = reference_nodes(Topology::QuadHex);
        for node in &mut nodes {
            let p = *node.position();
            node.set_position(p * 1.01);
        }
        let elem = Element::with_quadrature(
            0,
            Topology::QuadHex,
            (0..20).collect(),
            Quadrature::Gauss27,
            ElementClass::Volumetric,
        )
        .unwrap();
        let state = incompressible_state(&elem, &nodes, mat.bulk_modulus).unwrap();
        let expected = 100.0 * (1.01f64.powi(3) - 1.0);
        assert!((state.pressures[0] - expected).abs() < 1e-9, "{}", state.pressures);
        for c in 1..4 {
            assert!(state.pressures[c].abs() < 1e-9);
        }

        let k = elem.stiffness_matrix(&nodes, &mat).unwrap();
        assert!((&k - k.transpose()).norm() < 1e-8 * k.norm());
    }

    #[test]
    fn shell_stiffness_has_six_dofs_per_node() {
        let mat = LinearMaterial::new(1000.0, 0.3, 1.0).unwrap();
        let mut nodes = reference_nodes(Topology::ShellQuad);
        for node in &mut nodes {
            node.set_director(Vector3::new(0.0, 0.0, 0.1));
        }
        let elem = element(Topology::ShellQuad);
        let k = elem.stiffness_matrix(&nodes, &mat).unwrap();
        assert_eq!(k.shape(), (24, 24));
        assert!((&k - k.transpose()).norm() < 1e-9 * k.norm());
        let f = elem.internal_forces(&nodes, &mat).unwrap();
        assert!(f.norm() < 1e-12);
    }

    #[test]
    fn membrane_stiffness_is_symmetric() {
        let mat = LinearMaterial::new(1000.0, 0.3, 1.0).unwrap();
        let nodes = reference_nodes(Topology::ShellTri);
        let config = ElementConfig {
            shell_class: ElementClass::Membrane,
            ..ElementConfig::default()
        };
        let elem = Element::new(0, Topology::ShellTri, vec![0, 1, 2], &config).unwrap();
        let k = elem.stiffness_matrix(&nodes, &mat).unwrap();
        assert_eq!(k.shape(), (9, 9));
        assert!((&k - k.transpose()).norm() < 1e-9 * k.norm());
    }
}
