//! Element construction configuration.
//!
//! Quadrature selection is fixed when an element is built; changing the
//! configuration afterwards only affects elements created later.

use crate::error::{FemError, Result};
use crate::topology::{ElementClass, Topology};
use serde::{Deserialize, Serialize};

/// Quadrature rule selection.
///
/// `Standard` resolves to the topology's default rule. The Gauss variants are
/// only available for hex-like topologies (Hex, QuadHex).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Quadrature {
    /// Topology default
    #[default]
    Standard,
    /// 2×2×2 Gauss-Legendre
    Gauss8,
    /// 14-point Irons rule (8 corner + 6 face points)
    Gauss14,
    /// 3×3×3 Gauss-Legendre
    Gauss27,
}

impl Quadrature {
    pub const COUNT: usize = 4;

    pub fn index(self) -> usize {
        self as usize
    }

    /// Number of points for the explicit Gauss variants.
    pub fn num_points(self) -> Option<usize> {
        match self {
            Quadrature::Standard => None,
            Quadrature::Gauss8 => Some(8),
            Quadrature::Gauss14 => Some(14),
            Quadrature::Gauss27 => Some(27),
        }
    }
}

/// Configuration applied by the element factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementConfig {
    /// Rule for linear hexahedra
    pub hex_quadrature: Quadrature,
    /// Rule for 20-node hexahedra
    pub quad_hex_quadrature: Quadrature,
    /// Class assigned to shell topologies (`Shell` or `Membrane`)
    pub shell_class: ElementClass,
    /// Rebuild negatively oriented elements with the inverse node ordering
    pub fix_orientation: bool,
    /// Silence warn-once diagnostics
    pub suppress_warnings: bool,
}

impl Default for ElementConfig {
    fn default() -> Self {
        Self {
            hex_quadrature: Quadrature::Gauss8,
            quad_hex_quadrature: Quadrature::Gauss14,
            shell_class: ElementClass::Shell,
            fix_orientation: true,
            suppress_warnings: false,
        }
    }
}

impl ElementConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ElementConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every selected rule exists for its topology.
    pub fn validate(&self) -> Result<()> {
        Topology::Hex.resolve_quadrature(self.hex_quadrature)?;
        Topology::QuadHex.resolve_quadrature(self.quad_hex_quadrature)?;
        if self.shell_class == ElementClass::Volumetric {
            return Err(FemError::InvalidConfig(
                "shell_class must be Shell or Membrane".to_string(),
            ));
        }
        Ok(())
    }

    /// Quadrature selection for a given topology.
    pub fn quadrature_for(&self, topology: Topology) -> Quadrature {
        match topology {
            Topology::Hex => self.hex_quadrature,
            Topology::QuadHex => self.quad_hex_quadrature,
            _ => Quadrature::Standard,
        }
    }

    /// Element class for a given topology.
    pub fn class_for(&self, topology: Topology) -> ElementClass {
        if topology.is_shell() {
            self.shell_class
        } else {
            ElementClass::Volumetric
        }
    }
}
