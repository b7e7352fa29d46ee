//! Finite elements over a shared node array.
//!
//! An [`Element`] stores node indices into a model-owned `&[Node]`, its
//! topology, class and quadrature selection, the shared integration point
//! table, and lazily built rest-configuration data.

use crate::config::{ElementConfig, Quadrature};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{FemError, Result};
use crate::extrapolation;
use crate::faces;
use crate::integration::{self, cache_slot, IntegrationData, IntegrationPoint};
use crate::node::{Configuration, Node};
use crate::quadrature::QuadraturePoint;
use crate::shape;
use crate::topology::{ElementClass, Topology};
use nalgebra::{DMatrix, DVector, Matrix3, Matrix3xX, Vector3};
use once_cell::sync::OnceCell;

const SLOTS: usize = Topology::COUNT * Quadrature::COUNT * ElementClass::COUNT;

static PRESSURE_WEIGHTS: [OnceCell<DMatrix<f64>>; SLOTS] = [const { OnceCell::new() }; SLOTS];

/// Condition number above which natural coordinate solves are reported.
const ILL_CONDITIONED: f64 = 1e10;

/// Geometry of one integration point in a given node state.
#[derive(Debug, Clone, PartialEq)]
pub struct PointGeometry {
    pub jacobian: Matrix3<f64>,
    pub det_j: f64,
    pub inv_j: Matrix3<f64>,
    /// Spatial shape gradients `dN_i/dx`
    pub gradients: Vec<Vector3<f64>>,
}

/// Result of a natural coordinate search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NaturalCoordinates {
    pub coords: Vector3<f64>,
    /// Newton iterations used
    pub iterations: usize,
    pub converged: bool,
}

/// A finite element
#[derive(Debug, Clone)]
pub struct Element {
    id: usize,
    topology: Topology,
    class: ElementClass,
    quadrature: Quadrature,
    nodes: Vec<usize>,
    points: &'static [IntegrationPoint],
    warping: &'static IntegrationPoint,
    rest_data: OnceCell<Vec<IntegrationData>>,
    warping_data: OnceCell<IntegrationData>,
    volume: f64,
    rest_volume: f64,
    volumes: Vec<f64>,
    rest_volumes: Vec<f64>,
    inverted: bool,
}

impl Element {
    /// Create an element using the quadrature and class chosen by `config`.
    pub fn new(id: usize, topology: Topology, nodes: Vec<usize>, config: &ElementConfig) -> Result<Self> {
        Self::with_quadrature(
            id,
            topology,
            nodes,
            config.quadrature_for(topology),
            config.class_for(topology),
        )
    }

    /// Create an element with an explicit quadrature rule and class.
    ///
    /// # Arguments
    ///
    /// * `id` - Element ID
    /// * `topology` - Element type
    /// * `nodes` - Indices into the model's node array, in topology order
    /// * `quadrature` - Rule selection, fixed for the element's lifetime
    /// * `class` - Volumetric for solids, Shell or Membrane for shells
    pub fn with_quadrature(
        id: usize,
        topology: Topology,
        nodes: Vec<usize>,
        quadrature: Quadrature,
        class: ElementClass,
    ) -> Result<Self> {
        if nodes.len() != topology.num_nodes() {
            return Err(FemError::NodeCountMismatch {
                topology,
                expected: topology.num_nodes(),
                actual: nodes.len(),
            });
        }
        let quadrature = topology.resolve_quadrature(quadrature)?;
        let points = integration::integration_points(topology, quadrature, class)?;
        let warping = integration::warping_point(topology, class)?;
        let npvals = topology.num_pressure_values();
        Ok(Self {
            id,
            topology,
            class,
            quadrature,
            nodes,
            points,
            warping,
            rest_data: OnceCell::new(),
            warping_data: OnceCell::new(),
            volume: 0.0,
            rest_volume: 0.0,
            volumes: vec![0.0; npvals],
            rest_volumes: vec![0.0; npvals],
            inverted: false,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn class(&self) -> ElementClass {
        self.class
    }

    /// Resolved quadrature rule
    pub fn quadrature(&self) -> Quadrature {
        self.quadrature
    }

    /// Node indices into the model's node array
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_pressure_values(&self) -> usize {
        self.topology.num_pressure_values()
    }

    /// Borrow this element's nodes from the model's node array.
    pub fn element_nodes<'a>(&self, nodes: &'a [Node]) -> Result<Vec<&'a Node>> {
        self.nodes
            .iter()
            .map(|&i| {
                nodes.get(i).ok_or(FemError::NodeIndexOutOfRange {
                    index: i,
                    len: nodes.len(),
                })
            })
            .collect()
    }

    /* --- Shape functions --- */

    pub fn shape_function(&self, i: usize, s: &Vector3<f64>) -> Result<f64> {
        shape::shape_function(self.topology, i, s)
    }

    pub fn shape_gradient(&self, i: usize, s: &Vector3<f64>) -> Result<Vector3<f64>> {
        shape::shape_gradient(self.topology, i, s)
    }

    pub fn pressure_shape(&self, i: usize, s: &Vector3<f64>) -> Result<f64> {
        shape::pressure_shape(self.topology, i, s)
    }

    pub fn coords_are_inside(&self, s: &Vector3<f64>) -> bool {
        shape::coords_are_inside(self.topology, s)
    }

    /* --- Integration points --- */

    pub fn integration_points(&self) -> &'static [IntegrationPoint] {
        self.points
    }

    pub fn num_integration_points(&self) -> usize {
        self.points.len()
    }

    pub fn warping_point(&self) -> &'static IntegrationPoint {
        self.warping
    }

    /// Rest data for every integration point, built on first use.
    pub fn rest_data(&self, nodes: &[Node]) -> Result<&[IntegrationData]> {
        let data = self.rest_data.get_or_try_init(|| {
            let refs = self.element_nodes(nodes)?;
            Ok::<_, FemError>(
                self.points
                    .iter()
                    .map(|p| IntegrationData::new(p, self.class, &refs))
                    .collect(),
            )
        })?;
        Ok(data)
    }

    /// Rest data at the warping point.
    pub fn warping_data(&self, nodes: &[Node]) -> Result<&IntegrationData> {
        self.warping_data.get_or_try_init(|| {
            let refs = self.element_nodes(nodes)?;
            Ok(IntegrationData::new(self.warping, self.class, &refs))
        })
    }

    /// Drop cached rest data after rest positions changed.
    pub fn invalidate_rest_data(&mut self) {
        self.rest_data = OnceCell::new();
        self.warping_data = OnceCell::new();
    }

    /// Jacobian, determinant, inverse and spatial gradients at a point.
    pub fn point_geometry(
        &self,
        point: &IntegrationPoint,
        nodes: &[&Node],
        config: Configuration,
    ) -> Result<PointGeometry> {
        let jacobian = point.jacobian(self.class, nodes, config);
        let det_j = jacobian.determinant();
        let inv_j = jacobian.try_inverse().ok_or(FemError::SingularJacobian {
            element: self.id,
            point: point.number,
        })?;
        Ok(PointGeometry {
            jacobian,
            det_j,
            inv_j,
            gradients: point.spatial_gradients(&inv_j),
        })
    }

    /* --- Volumes --- */

    /// Volume by quadrature in the given node state.
    pub fn compute_volume(&self, nodes: &[Node], config: Configuration) -> Result<f64> {
        let refs = self.element_nodes(nodes)?;
        Ok(self
            .points
            .iter()
            .map(|p| p.jacobian(self.class, &refs, config).determinant() * p.weight)
            .sum())
    }

    /// Update the current volume and partial volumes.
    ///
    /// Returns the smallest ratio `detJ / detJ0` over the integration points.
    /// A non-positive value indicates that the element has inverted; points
    /// with a non-positive rest determinant contribute `min(detJ, 0)`.
    pub fn compute_volumes(&mut self, nodes: &[Node]) -> Result<f64> {
        let npvals = self.num_pressure_values();
        let (volume, volumes, min_ratio) = {
            let refs = self.element_nodes(nodes)?;
            let rest = self.rest_data(nodes)?;
            let mut volume = 0.0;
            let mut volumes = vec![0.0; npvals];
            let mut min_ratio = f64::MAX;
            for (p, data) in self.points.iter().zip(rest) {
                let det_j = p.jacobian(self.class, &refs, Configuration::Current).determinant();
                let dv = det_j * p.weight;
                if npvals > 1 {
                    for (v, h) in volumes.iter_mut().zip(p.pressure.iter()) {
                        *v += h * dv;
                    }
                }
                // a degenerate rest point counts as inverted
                let ratio = if data.det_j0 > 0.0 {
                    det_j / data.det_j0
                } else {
                    det_j.min(0.0)
                };
                min_ratio = min_ratio.min(ratio);
                volume += dv;
            }
            if npvals == 1 {
                volumes[0] = volume;
            }
            (volume, volumes, min_ratio)
        };
        self.volume = volume;
        self.volumes = volumes;
        Ok(min_ratio)
    }

    /// Update and return the rest volume and partial rest volumes.
    pub fn compute_rest_volumes(&mut self, nodes: &[Node]) -> Result<f64> {
        let npvals = self.num_pressure_values();
        let (volume, volumes) = {
            let rest = self.rest_data(nodes)?;
            let mut volume = 0.0;
            let mut volumes = vec![0.0; npvals];
            for (p, data) in self.points.iter().zip(rest) {
                let dv0 = data.dv0(p);
                if npvals > 1 {
                    for (v, h) in volumes.iter_mut().zip(p.pressure.iter()) {
                        *v += h * dv0;
                    }
                }
                volume += dv0;
            }
            if npvals == 1 {
                volumes[0] = volume;
            }
            (volume, volumes)
        };
        self.rest_volume = volume;
        self.rest_volumes = volumes;
        Ok(volume)
    }

    /// Current volume from the last `compute_volumes`
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Rest volume from the last `compute_rest_volumes`
    pub fn rest_volume(&self) -> f64 {
        self.rest_volume
    }

    /// Partial volumes, one per pressure value
    pub fn volumes(&self) -> &[f64] {
        &self.volumes
    }

    pub fn rest_volumes(&self) -> &[f64] {
        &self.rest_volumes
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Set by the simulation loop after checking `compute_volumes`.
    pub fn set_inverted(&mut self, inverted: bool) {
        self.inverted = inverted;
    }

    /// True if any rest Jacobian determinant is non-positive.
    pub fn is_inverted_at_rest(&self, nodes: &[Node]) -> Result<bool> {
        Ok(self.rest_data(nodes)?.iter().any(|d| d.det_j0 <= 0.0))
    }

    /* --- Extrapolation and pressure --- */

    pub fn nodal_extrapolation_matrix(&self) -> Result<&'static DMatrix<f64>> {
        extrapolation::nodal_extrapolation_matrix(self.topology, self.quadrature, self.class)
    }

    pub fn shape_matrix(&self) -> Result<&'static DMatrix<f64>> {
        extrapolation::shape_matrix(self.topology, self.quadrature, self.class)
    }

    /// Inverse of `sum_k H(s_k) H(s_k)^T` over the integration points, or
    /// `[1]` for a single pressure value.
    pub fn pressure_weight_matrix(&self) -> Result<&'static DMatrix<f64>> {
        let points = self.points;
        let npvals = self.num_pressure_values();
        PRESSURE_WEIGHTS[cache_slot(self.topology, self.quadrature, self.class)].get_or_try_init(|| {
            if npvals == 1 {
                return Ok(DMatrix::from_element(1, 1, 1.0));
            }
            let mut m = DMatrix::zeros(npvals, npvals);
            for p in points {
                m.ger(1.0, &p.pressure, &p.pressure, 1.0);
            }
            m.try_inverse()
                .ok_or_else(|| FemError::Numerical("singular pressure weight matrix".to_string()))
        })
    }

    /// Incompressibility constraint blocks, one 3×npvals block per node:
    /// `sum_k H(s_k) gradN_i(s_k)^T dv_k` in the current configuration.
    pub fn incompress_constraints(&self, nodes: &[Node]) -> Result<Vec<Matrix3xX<f64>>> {
        let refs = self.element_nodes(nodes)?;
        let npvals = self.num_pressure_values();
        let mut blocks = vec![Matrix3xX::zeros(npvals); self.num_nodes()];
        for p in self.points {
            let geom = self.point_geometry(p, &refs, Configuration::Current)?;
            let dv = geom.det_j * p.weight;
            for (block, g) in blocks.iter_mut().zip(&geom.gradients) {
                crate::kernels::add_to_incompress_constraints(block, p.pressure.as_slice(), g, dv)?;
            }
        }
        Ok(blocks)
    }

    /* --- Mass --- */

    /// Normalized weights `sum_k w_k N_i(s_k) / sum_k w_k` for distributing
    /// body forces.
    pub fn gravity_weights(&self) -> DVector<f64> {
        let mut weights = DVector::zeros(self.num_nodes());
        let mut total = 0.0;
        for p in self.points {
            weights.axpy(p.weight, &p.shape, 1.0);
            total += p.weight;
        }
        weights / total
    }

    /// Consistent mass matrix `rho sum_k N_i N_j detJ0 w_k`.
    pub fn consistent_mass(&self, nodes: &[Node], density: f64) -> Result<DMatrix<f64>> {
        let rest = self.rest_data(nodes)?;
        let n = self.num_nodes();
        let mut m = DMatrix::zeros(n, n);
        for (p, data) in self.points.iter().zip(rest) {
            m.ger(density * data.dv0(p), &p.shape, &p.shape, 1.0);
        }
        Ok(m)
    }

    /// Lumped nodal masses from the topology's mass weights.
    pub fn lumped_masses(&self, nodes: &[Node], density: f64) -> Result<DVector<f64>> {
        let rest = self.rest_data(nodes)?;
        let volume: f64 = self.points.iter().zip(rest).map(|(p, d)| d.dv0(p)).sum();
        let weights = self.topology.mass_weights();
        Ok(DVector::from_iterator(
            weights.len(),
            weights.iter().map(|w| w * density * volume),
        ))
    }

    /* --- Rotation and covariance --- */

    /// Deformation gradient `F = J J0^-1` at the warping point.
    pub fn warping_deformation_gradient(&self, nodes: &[Node]) -> Result<Matrix3<f64>> {
        let refs = self.element_nodes(nodes)?;
        let data = self.warping_data(nodes)?;
        let j = self.warping.jacobian(self.class, &refs, Configuration::Current);
        Ok(j * data.inv_j0)
    }

    /// Rotation part of the polar decomposition of the warping point
    /// deformation gradient.
    pub fn rotation(&self, nodes: &[Node]) -> Result<Matrix3<f64>> {
        let f = self.warping_deformation_gradient(nodes)?;
        polar_rotation(&f)
    }

    /// Current volume and `sum_k x_k x_k^T dv_k` over the integration points.
    pub fn covariance(&self, nodes: &[Node]) -> Result<(f64, Matrix3<f64>)> {
        let refs = self.element_nodes(nodes)?;
        let mut c = Matrix3::zeros();
        let mut volume = 0.0;
        for p in self.points {
            let x = p.position(self.class, &refs, Configuration::Current);
            let dv = p.jacobian(self.class, &refs, Configuration::Current).determinant() * p.weight;
            c.ger(dv, &x, &x, 1.0);
            volume += dv;
        }
        Ok((volume, c))
    }

    /* --- Natural coordinates --- */

    /// Position and Jacobian of the current configuration at `s`.
    fn map_point(&self, refs: &[&Node], s: &Vector3<f64>) -> (Vector3<f64>, Matrix3<f64>) {
        let point = IntegrationPoint::new(
            self.topology,
            0,
            &QuadraturePoint {
                coords: *s,
                weight: 0.0,
            },
        );
        (
            point.position(self.class, refs, Configuration::Current),
            point.jacobian(self.class, refs, Configuration::Current),
        )
    }

    /// Natural coordinates of a spatial point by Newton iteration.
    ///
    /// `initial` is used as the starting guess if it lies inside the domain,
    /// otherwise the search starts at the origin. When a Newton step increases
    /// the residual, the step is limited to unit length and halved until the
    /// residual drops again.
    pub fn natural_coordinates(
        &self,
        nodes: &[Node],
        target: &Vector3<f64>,
        initial: Vector3<f64>,
        max_iters: usize,
        diagnostics: &Diagnostics,
    ) -> Result<NaturalCoordinates> {
        let refs = self.element_nodes(nodes)?;
        let mut coords = if self.coords_are_inside(&initial) {
            initial
        } else {
            Vector3::zeros()
        };

        let n = refs.len() as f64;
        let centroid = refs
            .iter()
            .fold(Vector3::<f64>::zeros(), |acc, node| acc + node.position())
            / n;
        let radius = refs
            .iter()
            .map(|node| (node.position() - centroid).norm())
            .fold(0.0, f64::max);
        let tol = radius * 1e-12;

        let result = |coords, iterations, converged| NaturalCoordinates {
            coords,
            iterations,
            converged,
        };

        let (x, _) = self.map_point(&refs, &coords);
        let mut res = x - target;
        let mut prn = res.norm();
        if prn < tol {
            return Ok(result(coords, 0, true));
        }

        for iter in 0..max_iters {
            let (_, dxds) = self.map_point(&refs, &coords);
            let sv = dxds.singular_values();
            let cond = sv.max() / sv.min();
            if !(cond <= ILL_CONDITIONED) {
                diagnostics.warn_once(
                    DiagnosticKind::IllConditionedNaturalCoords(self.topology),
                    &format!(
                        "condition number for solving natural coordinates is {:e} ({} element {})",
                        cond,
                        self.topology.name(),
                        self.id
                    ),
                );
            }
            let Some(mut del) = dxds.lu().solve(&res) else {
                return Ok(result(coords, iter + 1, false));
            };
            if del.norm() < 1e-10 {
                return Ok(result(coords, iter + 1, true));
            }

            let prev = coords;
            coords -= del;
            let (x, _) = self.map_point(&refs, &coords);
            res = x - target;
            let mut rn = res.norm();
            if rn < tol {
                return Ok(result(coords, iter + 1, true));
            }
            if rn > prn {
                let eps = 1e-12;
                if del.norm() > 1.0 {
                    del.normalize_mut();
                }
                let mut alpha = 0.5;
                while alpha > eps && rn > prn {
                    coords = prev - del * alpha;
                    let (x, _) = self.map_point(&refs, &coords);
                    res = x - target;
                    rn = res.norm();
                    alpha *= 0.5;
                }
                if alpha < eps {
                    return Ok(result(coords, iter + 1, false));
                }
            }
            prn = rn;
        }
        Ok(result(coords, max_iters, false))
    }

    /// Whether a spatial point lies inside the element. Points whose natural
    /// coordinate search does not converge count as outside.
    pub fn is_inside(&self, nodes: &[Node], point: &Vector3<f64>, diagnostics: &Diagnostics) -> Result<bool> {
        let nc = self.natural_coordinates(nodes, point, Vector3::zeros(), 1000, diagnostics)?;
        Ok(nc.converged && self.coords_are_inside(&nc.coords))
    }

    /* --- Faces and edges --- */

    /// Faces as element-local node indices
    pub fn faces(&self) -> &'static [&'static [usize]] {
        self.topology.faces()
    }

    /// Edges as element-local node indices
    pub fn edges(&self) -> &'static [&'static [usize]] {
        self.topology.edges()
    }

    /// Fixed-pattern triangulation of all faces, in element-local indices.
    pub fn triangulated_face_indices(&self) -> Result<Vec<[usize; 3]>> {
        faces::triangulated_face_indices(self.topology.faces())
    }

    /// Position-aware triangulation of all faces, in model node indices.
    pub fn triangulate_faces(&self, nodes: &[Node]) -> Result<Vec<[usize; 3]>> {
        let refs = self.element_nodes(nodes)?;
        let mut triangles = Vec::new();
        for face in self.topology.faces() {
            let local = faces::triangulate_face(face, |k| *refs[k].position())?;
            triangles.extend(
                local
                    .iter()
                    .map(|t| [self.nodes[t[0]], self.nodes[t[1]], self.nodes[t[2]]]),
            );
        }
        Ok(triangles)
    }
}

/// Rotation factor `R` of the polar decomposition `F = R U`.
///
/// Reflections are removed by flipping the singular direction with the
/// smallest singular value.
pub fn polar_rotation(f: &Matrix3<f64>) -> Result<Matrix3<f64>> {
    let svd = f.svd(true, true);
    let mut u = svd
        .u
        .ok_or_else(|| FemError::Numerical("SVD did not produce U".to_string()))?;
    let v_t = svd
        .v_t
        .ok_or_else(|| FemError::Numerical("SVD did not produce V^T".to_string()))?;
    let mut r = u * v_t;
    if r.determinant() < 0.0 {
        let imin = svd.singular_values.imin();
        u.column_mut(imin).neg_mut();
        r = u * v_t;
    }
    Ok(r)
}

/// Set shell directors from averaged surface normals.
///
/// Each node used by a shell or membrane element receives a director of
/// length `thickness` along the mean of the unit normals of the elements
/// sharing it.
pub fn init_shell_directors(elements: &[Element], nodes: &mut [Node], thickness: f64) -> Result<()> {
    let mut normals = vec![Vector3::<f64>::zeros(); nodes.len()];
    for elem in elements.iter().filter(|e| e.topology().is_shell()) {
        let refs = elem.element_nodes(nodes)?;
        for (k, c) in elem.topology().node_coords().iter().enumerate() {
            let point = IntegrationPoint::new(
                elem.topology(),
                0,
                &QuadraturePoint::new(c[0], c[1], c[2], 0.0),
            );
            let j = point.jacobian(ElementClass::Membrane, &refs, Configuration::Rest);
            normals[elem.nodes()[k]] += j.column(2);
        }
    }
    for (node, normal) in nodes.iter_mut().zip(&normals) {
        let len = normal.norm();
        if len > 0.0 {
            node.set_director(normal * (thickness / len));
        }
    }
    Ok(())
}
