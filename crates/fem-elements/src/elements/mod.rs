//! Per-topology descriptor rows.
//!
//! Each submodule defines one [`crate::topology::TopologyDescriptor`] (two
//! for the shells) and the shape, quadrature and extrapolation functions it
//! points to.

pub(crate) mod hex;
pub(crate) mod pyramid;
pub(crate) mod quad_hex;
pub(crate) mod quad_pyramid;
pub(crate) mod quad_tet;
pub(crate) mod quad_wedge;
pub(crate) mod shell;
pub(crate) mod tet;
pub(crate) mod wedge;
