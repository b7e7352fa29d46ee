/// Algebraic properties of the node-pair assembly kernels
use fem_elements::kernels::{
    add_dilational_stiffness, add_dilational_stiffness_dense, add_incompressibility_stiffness,
    add_isotropic_stiffness, add_pressure_stiffness, add_stress_force, add_tangent_stiffness,
    isotropic_tangent, strain_displacement,
};
use nalgebra::{DMatrix, Matrix3, Matrix3xX, Vector3};
use proptest::prelude::*;

fn vec3() -> impl Strategy<Value = Vector3<f64>> {
    (-5.0f64..5.0, -5.0f64..5.0, -5.0f64..5.0).prop_map(|(x, y, z)| Vector3::new(x, y, z))
}

fn sym3() -> impl Strategy<Value = Matrix3<f64>> {
    prop::array::uniform6(-10.0f64..10.0).prop_map(|s| {
        Matrix3::new(
            s[0], s[3], s[5], //
            s[3], s[1], s[4], //
            s[5], s[4], s[2],
        )
    })
}

proptest! {
    #[test]
    fn incompressibility_diagonal_untouched(g in vec3(), s in -10.0f64..10.0) {
        let mut k = Matrix3::from_diagonal(&Vector3::new(1.0, 2.0, 3.0));
        let before = k;
        add_incompressibility_stiffness(&mut k, s, &g, &g);
        for a in 0..3 {
            prop_assert_eq!(k[(a, a)], before[(a, a)]);
        }
        prop_assert!((k - before).norm() < 1e-12);
    }

    #[test]
    fn incompressibility_pairs_cancel(gi in vec3(), gj in vec3(), s in -10.0f64..10.0) {
        let mut kij = Matrix3::zeros();
        let mut kji = Matrix3::zeros();
        add_incompressibility_stiffness(&mut kij, s, &gi, &gj);
        add_incompressibility_stiffness(&mut kji, s, &gj, &gi);
        prop_assert!((kij + kji).norm() < 1e-10);
    }

    #[test]
    fn pressure_stiffness_is_pair_symmetric(gi in vec3(), gj in vec3(), p in -10.0f64..10.0, dv in 0.01f64..2.0) {
        let mut kij = Matrix3::zeros();
        let mut kji = Matrix3::zeros();
        add_pressure_stiffness(&mut kij, &gi, p, &gj, dv);
        add_pressure_stiffness(&mut kji, &gj, p, &gi, dv);
        prop_assert!((kij - kji.transpose()).norm() < 1e-10);
    }

    #[test]
    fn isotropic_expansion_matches_tangent(gi in vec3(), gj in vec3(), e in 1.0f64..1000.0, nu in 0.0f64..0.45, dv in 0.01f64..2.0) {
        let mut expanded = Matrix3::zeros();
        let mut general = Matrix3::zeros();
        add_isotropic_stiffness(&mut expanded, &gi, e, nu, &gj, dv);
        add_tangent_stiffness(&mut general, &gi, &isotropic_tangent(e, nu), &gj, dv);
        prop_assert!((expanded - general).norm() <= 1e-10 * (1.0 + general.norm()));
    }

    #[test]
    fn stress_force_is_b_transpose_sigma(g in vec3(), sigma in sym3(), dv in 0.01f64..2.0) {
        let mut f = Vector3::zeros();
        add_stress_force(&mut f, &g, &sigma, dv);
        let voigt = nalgebra::Vector6::new(
            sigma[(0, 0)], sigma[(1, 1)], sigma[(2, 2)],
            sigma[(0, 1)], sigma[(1, 2)], sigma[(0, 2)],
        );
        let expected = strain_displacement(&g).transpose() * voigt * dv;
        prop_assert!((f - expected).norm() < 1e-10 * (1.0 + expected.norm()));
    }

    #[test]
    fn single_pressure_dense_matches_scalar(gi in vec3(), gj in vec3(), kp in 0.0f64..100.0) {
        let mut scalar = Matrix3::zeros();
        let mut dense = Matrix3::zeros();
        add_dilational_stiffness(&mut scalar, kp, &gi, &gj);
        let rinv = DMatrix::from_element(1, 1, kp);
        let gt_i = Matrix3xX::from_column_slice(gi.as_slice());
        let gt_j = Matrix3xX::from_column_slice(gj.as_slice());
        add_dilational_stiffness_dense(&mut dense, &rinv, &gt_i, &gt_j).unwrap();
        prop_assert!((scalar - dense).norm() < 1e-10 * (1.0 + scalar.norm()));
    }
}

#[test]
fn test_dense_rejects_mismatched_blocks() {
    let mut k = Matrix3::zeros();
    let rinv = DMatrix::identity(4, 4);
    let gt = Matrix3xX::zeros(2);
    assert!(add_dilational_stiffness_dense(&mut k, &rinv, &gt, &gt).is_err());
}
