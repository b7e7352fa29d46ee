//! Checked evaluation of the per-topology shape functions.
//!
//! The descriptor rows index their node tables directly; these wrappers
//! validate the node index first so callers get an error instead of a panic.

use crate::error::{FemError, Result};
use crate::topology::Topology;
use nalgebra::{DVector, Vector3};

fn check_index(index: usize, count: usize) -> Result<()> {
    if index < count {
        Ok(())
    } else {
        Err(FemError::ShapeIndexOutOfRange { index, count })
    }
}

/// Value of shape function `i` at natural coordinates `s`.
pub fn shape_function(topology: Topology, i: usize, s: &Vector3<f64>) -> Result<f64> {
    let desc = topology.descriptor();
    check_index(i, desc.node_coords.len())?;
    Ok((desc.shape)(i, s))
}

/// Gradient of shape function `i` with respect to natural coordinates.
pub fn shape_gradient(topology: Topology, i: usize, s: &Vector3<f64>) -> Result<Vector3<f64>> {
    let desc = topology.descriptor();
    check_index(i, desc.node_coords.len())?;
    Ok((desc.shape_gradient)(i, s))
}

/// Value of pressure basis function `i` for mixed u/p elements.
pub fn pressure_shape(topology: Topology, i: usize, s: &Vector3<f64>) -> Result<f64> {
    let desc = topology.descriptor();
    check_index(i, desc.num_pressure_values)?;
    Ok((desc.pressure_shape)(i, s))
}

/// Whether `s` lies in the natural-coordinate domain of `topology`.
pub fn coords_are_inside(topology: Topology, s: &Vector3<f64>) -> bool {
    (topology.descriptor().contains)(s)
}

/// All shape function values at `s`.
pub fn shape_values(topology: Topology, s: &Vector3<f64>) -> DVector<f64> {
    let desc = topology.descriptor();
    DVector::from_iterator(
        desc.node_coords.len(),
        (0..desc.node_coords.len()).map(|i| (desc.shape)(i, s)),
    )
}

/// All shape function gradients at `s`, one per node.
pub fn shape_gradients(topology: Topology, s: &Vector3<f64>) -> Vec<Vector3<f64>> {
    let desc = topology.descriptor();
    (0..desc.node_coords.len())
        .map(|i| (desc.shape_gradient)(i, s))
        .collect()
}

/// All pressure basis values at `s`.
pub fn pressure_values(topology: Topology, s: &Vector3<f64>) -> DVector<f64> {
    let desc = topology.descriptor();
    DVector::from_iterator(
        desc.num_pressure_values,
        (0..desc.num_pressure_values).map(|i| (desc.pressure_shape)(i, s)),
    )
}
