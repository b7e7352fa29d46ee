//! Shared node-pair stiffness blocks and parallel element assembly.
//!
//! One 3×3 block is stored per pair of nodes that share an element, each
//! behind its own `parking_lot::Mutex`. Elements are processed in parallel
//! with rayon:
//!
//! ```text
//!   element ──► scratch blocks (material stiffness, unlocked)
//!          └──► locked merge into NodePairBlocks
//!          └──► locked dilational and pressure accumulation (mixed u/p)
//! ```
//!
//! The pressure, dilational and incompressibility wrappers take the block
//! lock for every accumulation, so any number of elements sharing a node
//! pair may call them concurrently.

use crate::element::Element;
use crate::error::{FemError, Result};
use crate::kernels;
use crate::materials::Material;
use crate::node::{Configuration, Node};
use crate::stiffness::{self, ElementModel};
use crate::topology::ElementClass;
use nalgebra::{DMatrix, Matrix3, Matrix3xX, Vector3};
use parking_lot::Mutex;
use rayon::prelude::*;
use std::collections::HashMap;

/// Lock-guarded 3×3 blocks indexed by node pair.
#[derive(Debug, Default)]
pub struct NodePairBlocks {
    num_nodes: usize,
    index: HashMap<(usize, usize), usize>,
    blocks: Vec<Mutex<Matrix3<f64>>>,
}

impl NodePairBlocks {
    pub fn new(num_nodes: usize) -> Self {
        Self {
            num_nodes,
            ..Self::default()
        }
    }

    /// Allocate a zero block for every node pair sharing an element.
    pub fn from_elements(elements: &[Element], num_nodes: usize) -> Result<Self> {
        let mut blocks = Self::new(num_nodes);
        for elem in elements {
            for &i in elem.nodes() {
                for &j in elem.nodes() {
                    blocks.insert(i, j)?;
                }
            }
        }
        log::debug!(
            "allocated {} node-pair blocks for {} elements",
            blocks.len(),
            elements.len()
        );
        Ok(blocks)
    }

    /// Allocate the block `(row, col)` if it does not exist yet.
    pub fn insert(&mut self, row: usize, col: usize) -> Result<()> {
        for n in [row, col] {
            if n >= self.num_nodes {
                return Err(FemError::NodeIndexOutOfRange {
                    index: n,
                    len: self.num_nodes,
                });
            }
        }
        let next = self.blocks.len();
        if let std::collections::hash_map::Entry::Vacant(e) = self.index.entry((row, col)) {
            e.insert(next);
            self.blocks.push(Mutex::new(Matrix3::zeros()));
        }
        Ok(())
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of stored blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.index.contains_key(&(row, col))
    }

    fn block(&self, row: usize, col: usize) -> Result<&Mutex<Matrix3<f64>>> {
        self.index
            .get(&(row, col))
            .map(|&k| &self.blocks[k])
            .ok_or(FemError::MissingBlock { row, col })
    }

    /// Copy of the block `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Result<Matrix3<f64>> {
        Ok(*self.block(row, col)?.lock())
    }

    /// `block(row, col) += m`
    pub fn add(&self, row: usize, col: usize, m: &Matrix3<f64>) -> Result<()> {
        *self.block(row, col)?.lock() += m;
        Ok(())
    }

    /// Locked [`kernels::add_pressure_stiffness`].
    pub fn add_pressure_stiffness(
        &self,
        row: usize,
        col: usize,
        gi: &Vector3<f64>,
        p: f64,
        gj: &Vector3<f64>,
        dv: f64,
    ) -> Result<()> {
        let mut k = self.block(row, col)?.lock();
        kernels::add_pressure_stiffness(&mut k, gi, p, gj, dv);
        Ok(())
    }

    /// Locked [`kernels::add_dilational_stiffness`].
    pub fn add_dilational_stiffness(
        &self,
        row: usize,
        col: usize,
        kp: f64,
        int_gi: &Vector3<f64>,
        int_gj: &Vector3<f64>,
    ) -> Result<()> {
        let mut k = self.block(row, col)?.lock();
        kernels::add_dilational_stiffness(&mut k, kp, int_gi, int_gj);
        Ok(())
    }

    /// Locked [`kernels::add_dilational_stiffness_dense`].
    pub fn add_dilational_stiffness_dense(
        &self,
        row: usize,
        col: usize,
        rinv: &DMatrix<f64>,
        gt_i: &Matrix3xX<f64>,
        gt_j: &Matrix3xX<f64>,
    ) -> Result<()> {
        let mut k = self.block(row, col)?.lock();
        kernels::add_dilational_stiffness_dense(&mut k, rinv, gt_i, gt_j)
    }

    /// Locked [`kernels::add_incompressibility_stiffness`].
    pub fn add_incompressibility_stiffness(
        &self,
        row: usize,
        col: usize,
        s: f64,
        int_gi: &Vector3<f64>,
        int_gj: &Vector3<f64>,
    ) -> Result<()> {
        let mut k = self.block(row, col)?.lock();
        kernels::add_incompressibility_stiffness(&mut k, s, int_gi, int_gj);
        Ok(())
    }

    /// Zero every block, keeping the structure.
    pub fn clear(&mut self) {
        for block in &mut self.blocks {
            *block.get_mut() = Matrix3::zeros();
        }
    }

    /// Dense `3n × 3n` matrix of all blocks.
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut k = DMatrix::zeros(3 * self.num_nodes, 3 * self.num_nodes);
        for (&(row, col), &idx) in &self.index {
            k.fixed_view_mut::<3, 3>(3 * row, 3 * col)
                .copy_from(&*self.blocks[idx].lock());
        }
        k
    }
}

/// Add the dilational and pressure stiffness of one mixed u/p element through
/// the locked wrappers.
fn accumulate_incompressible(
    elem: &Element,
    nodes: &[Node],
    kappa: f64,
    blocks: &NodePairBlocks,
) -> Result<()> {
    let (state, gt) = stiffness::dilational_blocks(elem, nodes, kappa)?;
    let ids = elem.nodes();
    for (i, &ni) in ids.iter().enumerate() {
        for (j, &nj) in ids.iter().enumerate() {
            blocks.add_dilational_stiffness_dense(ni, nj, &state.rinv, &gt[i], &gt[j])?;
        }
    }

    let refs = elem.element_nodes(nodes)?;
    for p in elem.integration_points() {
        let geom = elem.point_geometry(p, &refs, Configuration::Current)?;
        let dv = geom.det_j * p.weight;
        let pressure = p.pressure.dot(&state.pressures);
        for (i, &ni) in ids.iter().enumerate() {
            for (j, &nj) in ids.iter().enumerate() {
                blocks.add_pressure_stiffness(ni, nj, &geom.gradients[i], pressure, &geom.gradients[j], dv)?;
            }
        }
    }
    Ok(())
}

/// Assemble the stiffness of every element into `blocks` in parallel.
///
/// Material stiffness is computed per element into scratch blocks and then
/// merged under the block locks; mixed u/p materials additionally go through
/// the locked dilational and pressure kernels. Shell elements (6 degrees of
/// freedom per node) are rejected.
pub fn assemble_parallel(
    elements: &[Element],
    nodes: &[Node],
    material: &dyn Material,
    blocks: &NodePairBlocks,
) -> Result<()> {
    if let Some(elem) = elements.iter().find(|e| e.class() == ElementClass::Shell) {
        return Err(FemError::InvalidConfig(format!(
            "element {} has 6 degrees of freedom per node and cannot use 3x3 node-pair blocks",
            elem.id()
        )));
    }
    elements.par_iter().try_for_each(|elem| {
        let n = elem.num_nodes();
        let scratch = stiffness::material_stiffness_blocks(elem, nodes, material)?;
        let ids = elem.nodes();
        for (i, &ni) in ids.iter().enumerate() {
            for (j, &nj) in ids.iter().enumerate() {
                blocks.add(ni, nj, &scratch[i * n + j])?;
            }
        }
        if let Some(kappa) = material.incompressible_bulk_modulus() {
            accumulate_incompressible(elem, nodes, kappa, blocks)?;
        }
        Ok(())
    })
}

/// Serial reference assembly into a dense matrix using [`ElementModel`].
pub fn assemble_dense(elements: &[Element], nodes: &[Node], material: &dyn Material) -> Result<DMatrix<f64>> {
    let ndofs = 3 * nodes.len();
    let mut k = DMatrix::zeros(ndofs, ndofs);
    for elem in elements {
        let ke = elem.stiffness_matrix(nodes, material)?;
        let dofs = elem.global_dof_indices();
        for (a, &ra) in dofs.iter().enumerate() {
            for (b, &cb) in dofs.iter().enumerate() {
                k[(ra, cb)] += ke[(a, b)];
            }
        }
    }
    Ok(k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_pair_is_an_error() {
        let mut blocks = NodePairBlocks::new(3);
        blocks.insert(0, 1).unwrap();
        assert!(blocks.add(0, 1, &Matrix3::identity()).is_ok());
        assert!(matches!(
            blocks.add(1, 2, &Matrix3::identity()),
            Err(FemError::MissingBlock { row: 1, col: 2 })
        ));
        assert!(matches!(
            blocks.insert(0, 3),
            Err(FemError::NodeIndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn insert_is_idempotent() {
        let mut blocks = NodePairBlocks::new(2);
        blocks.insert(1, 0).unwrap();
        blocks.insert(1, 0).unwrap();
        assert_eq!(blocks.len(), 1);
        assert!(blocks.contains(1, 0));
        assert!(!blocks.contains(0, 1));
    }

    #[test]
    fn concurrent_accumulation_is_not_lost() {
        let mut blocks = NodePairBlocks::new(2);
        blocks.insert(0, 1).unwrap();
        let gi = Vector3::new(1.0, 0.0, 0.0);
        let gj = Vector3::new(0.0, 1.0, 0.0);

        (0..1000).into_par_iter().for_each(|_| {
            blocks.add_dilational_stiffness(0, 1, 1.0, &gi, &gj).unwrap();
            blocks.add_incompressibility_stiffness(0, 1, 1.0, &gi, &gj).unwrap();
            blocks.add_pressure_stiffness(0, 1, &gi, 1.0, &gj, 1.0).unwrap();
        });

        let k = blocks.get(0, 1).unwrap();
        // dilational + incompressibility + pressure at (0, 1)
        assert!((k[(0, 1)] - 3000.0).abs() < 1e-9, "{}", k);
        assert!((k[(1, 0)] + 2000.0).abs() < 1e-9, "{}", k);
        assert_eq!(k[(2, 2)], 0.0);

        blocks.clear();
        assert_eq!(blocks.get(0, 1).unwrap(), Matrix3::zeros());
    }
}
