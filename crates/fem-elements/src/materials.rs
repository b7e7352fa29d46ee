//! Constitutive models evaluated at integration points.
//!
//! A material maps the deformation at an integration point to a Cauchy
//! stress and a 6×6 tangent in the Voigt order used by [`crate::kernels`].

use crate::error::{FemError, Result};
use nalgebra::{Matrix3, Matrix6};
use serde::{Deserialize, Serialize};

/// Deformation state at one integration point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeformedPoint {
    /// Deformation gradient `F = J J0^-1`
    pub deformation_gradient: Matrix3<f64>,
    /// Element rotation from the warping point (identity if not needed)
    pub rotation: Matrix3<f64>,
}

impl DeformedPoint {
    pub fn new(deformation_gradient: Matrix3<f64>) -> Self {
        Self {
            deformation_gradient,
            rotation: Matrix3::identity(),
        }
    }

    pub fn with_rotation(deformation_gradient: Matrix3<f64>, rotation: Matrix3<f64>) -> Self {
        Self {
            deformation_gradient,
            rotation,
        }
    }
}

/// Material interface shared by all element classes
pub trait Material: Send + Sync {
    /// Cauchy stress and tangent at one integration point.
    fn compute_stress_and_tangent(&self, point: &DeformedPoint) -> (Matrix3<f64>, Matrix6<f64>);

    /// Mass density
    fn density(&self) -> f64;

    /// Bulk modulus handled by the mixed pressure formulation, if any.
    ///
    /// Materials returning `Some` supply only the deviatoric response from
    /// [`Material::compute_stress_and_tangent`].
    fn incompressible_bulk_modulus(&self) -> Option<f64> {
        None
    }

    /// Whether the element rotation must be supplied in [`DeformedPoint`].
    fn is_corotated(&self) -> bool {
        false
    }
}

/// Symmetric small strain `sym(F) - I`.
fn small_strain(f: &Matrix3<f64>) -> Matrix3<f64> {
    (f + f.transpose()) * 0.5 - Matrix3::identity()
}

/// Contract a Voigt tangent with a strain tensor.
fn apply_tangent(d: &Matrix6<f64>, eps: &Matrix3<f64>) -> Matrix3<f64> {
    let e = nalgebra::Vector6::new(
        eps[(0, 0)],
        eps[(1, 1)],
        eps[(2, 2)],
        2.0 * eps[(0, 1)],
        2.0 * eps[(1, 2)],
        2.0 * eps[(0, 2)],
    );
    let s = d * e;
    Matrix3::new(
        s[0], s[3], s[5], //
        s[3], s[1], s[4], //
        s[5], s[4], s[2],
    )
}

/// Isotropic linear elastic material, small-strain or corotated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearMaterial {
    /// Young's modulus (E)
    pub youngs_modulus: f64,
    /// Poisson's ratio (ν)
    pub poissons_ratio: f64,
    pub density: f64,
    /// Measure strain in the element's rotated frame
    #[serde(default)]
    pub corotated: bool,
}

impl LinearMaterial {
    pub fn new(youngs_modulus: f64, poissons_ratio: f64, density: f64) -> Result<Self> {
        let material = Self {
            youngs_modulus,
            poissons_ratio,
            density,
            corotated: false,
        };
        material.validate()?;
        Ok(material)
    }

    pub fn corotated(mut self) -> Self {
        self.corotated = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.youngs_modulus > 0.0) {
            return Err(FemError::InvalidMaterial(format!(
                "Young's modulus must be positive, got {}",
                self.youngs_modulus
            )));
        }
        if !(self.poissons_ratio > -1.0 && self.poissons_ratio < 0.5) {
            return Err(FemError::InvalidMaterial(format!(
                "Poisson's ratio must lie in (-1, 0.5), got {}",
                self.poissons_ratio
            )));
        }
        if !(self.density >= 0.0) {
            return Err(FemError::InvalidMaterial(format!(
                "density must be non-negative, got {}",
                self.density
            )));
        }
        Ok(())
    }

    /// Shear modulus (G) from E and ν
    pub fn shear_modulus(&self) -> f64 {
        self.youngs_modulus / (2.0 * (1.0 + self.poissons_ratio))
    }

    /// Bulk modulus (K) from E and ν
    pub fn bulk_modulus(&self) -> f64 {
        self.youngs_modulus / (3.0 * (1.0 - 2.0 * self.poissons_ratio))
    }

    pub fn tangent(&self) -> Matrix6<f64> {
        crate::kernels::isotropic_tangent(self.youngs_modulus, self.poissons_ratio)
    }
}

impl Material for LinearMaterial {
    fn compute_stress_and_tangent(&self, point: &DeformedPoint) -> (Matrix3<f64>, Matrix6<f64>) {
        let d = self.tangent();
        let sigma = if self.corotated {
            let r = &point.rotation;
            let eps = small_strain(&(r.transpose() * point.deformation_gradient));
            r * apply_tangent(&d, &eps) * r.transpose()
        } else {
            apply_tangent(&d, &small_strain(&point.deformation_gradient))
        };
        // an isotropic tangent is invariant under rotation
        (sigma, d)
    }

    fn density(&self) -> f64 {
        self.density
    }

    fn is_corotated(&self) -> bool {
        self.corotated
    }
}

/// Nearly incompressible linear material.
///
/// The deviatoric part `2 mu dev(eps)` comes from the material; the volumetric
/// part is carried by the element pressure with bulk modulus `kappa`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncompressibleLinearMaterial {
    pub shear_modulus: f64,
    pub bulk_modulus: f64,
    pub density: f64,
}

impl IncompressibleLinearMaterial {
    pub fn new(shear_modulus: f64, bulk_modulus: f64, density: f64) -> Result<Self> {
        if !(shear_modulus >= 0.0) || !(bulk_modulus > 0.0) || !(density >= 0.0) {
            return Err(FemError::InvalidMaterial(format!(
                "invalid incompressible material (mu = {}, kappa = {}, rho = {})",
                shear_modulus, bulk_modulus, density
            )));
        }
        Ok(Self {
            shear_modulus,
            bulk_modulus,
            density,
        })
    }

    /// Deviatoric tangent `2 mu (I - 1/3 1 1^T)` with engineering shears.
    pub fn tangent(&self) -> Matrix6<f64> {
        let mu = self.shear_modulus;
        let mut d = Matrix6::zeros();
        for a in 0..3 {
            for b in 0..3 {
                d[(a, b)] = -2.0 * mu / 3.0;
            }
            d[(a, a)] = 4.0 * mu / 3.0;
            d[(a + 3, a + 3)] = mu;
        }
        d
    }
}

impl Material for IncompressibleLinearMaterial {
    fn compute_stress_and_tangent(&self, point: &DeformedPoint) -> (Matrix3<f64>, Matrix6<f64>) {
        let d = self.tangent();
        (apply_tangent(&d, &small_strain(&point.deformation_gradient)), d)
    }

    fn density(&self) -> f64 {
        self.density
    }

    fn incompressible_bulk_modulus(&self) -> Option<f64> {
        Some(self.bulk_modulus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniaxial_stretch() {
        let mat = LinearMaterial::new(210e9, 0.3, 7850.0).unwrap();
        let mut f = Matrix3::identity();
        f[(0, 0)] = 1.001;
        let (sigma, _) = mat.compute_stress_and_tangent(&DeformedPoint::new(f));

        let lambda = 210e9 * 0.3 / (1.3 * 0.4);
        let mu = 210e9 / 2.6;
        let expected = (lambda + 2.0 * mu) * 0.001;
        assert!((sigma[(0, 0)] - expected).abs() / expected < 1e-12);
        assert!((sigma[(1, 1)] - lambda * 0.001).abs() / expected < 1e-12);
        assert!(sigma[(0, 1)].abs() < 1e-6);
    }

    #[test]
    fn moduli() {
        let mat = LinearMaterial::new(210e9, 0.3, 7850.0).unwrap();
        assert!((mat.shear_modulus() - 80.769e9).abs() < 1e7);
        assert!((mat.bulk_modulus() - 175e9).abs() < 1e6);
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(matches!(
            LinearMaterial::new(-1.0, 0.3, 1.0),
            Err(FemError::InvalidMaterial(_))
        ));
        assert!(LinearMaterial::new(1.0, 0.5, 1.0).is_err());
        assert!(LinearMaterial::new(1.0, 0.3, -1.0).is_err());
        assert!(IncompressibleLinearMaterial::new(1.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn corotated_rigid_rotation_is_stress_free() {
        let mat = LinearMaterial::new(1000.0, 0.25, 1.0).unwrap().corotated();
        let r = nalgebra::Rotation3::from_euler_angles(0.3, -0.2, 0.7).into_inner();
        let (sigma, _) = mat.compute_stress_and_tangent(&DeformedPoint::with_rotation(r, r));
        assert!(sigma.norm() < 1e-10, "{}", sigma);

        // small strain sees a large rotation as strain
        let plain = LinearMaterial::new(1000.0, 0.25, 1.0).unwrap();
        let (sigma, _) = plain.compute_stress_and_tangent(&DeformedPoint::new(r));
        assert!(sigma.norm() > 1.0);
    }

    #[test]
    fn deviatoric_stress_is_traceless() {
        let mat = IncompressibleLinearMaterial::new(10.0, 1000.0, 1.0).unwrap();
        let f = Matrix3::new(1.01, 0.002, 0.0, 0.0, 0.98, 0.003, 0.001, 0.0, 1.02);
        let (sigma, _) = mat.compute_stress_and_tangent(&DeformedPoint::new(f));
        assert!(sigma.trace().abs() < 1e-12);
        assert_eq!(mat.incompressible_bulk_modulus(), Some(1000.0));
    }

    #[test]
    fn serde_defaults_to_small_strain() {
        let json = r#"{"youngs_modulus": 5.0, "poissons_ratio": 0.2, "density": 1.0}"#;
        let mat: LinearMaterial = serde_json::from_str(json).unwrap();
        assert!(!mat.corotated);
    }
}
