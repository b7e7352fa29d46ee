//! Node-pair assembly kernels.
//!
//! Every kernel accumulates into a caller-owned block and allocates nothing.
//! Stresses are symmetric 3×3 matrices; tangents are 6×6 in Voigt order
//! `[xx, yy, zz, xy, yz, xz]` with engineering shear strains, so that the
//! strain-displacement operator of a shape gradient `g` is
//!
//! ```text
//!        | gx  0   0  |
//!        | 0   gy  0  |
//! B(g) = | 0   0   gz |
//!        | gy  gx  0  |
//!        | 0   gz  gy |
//!        | gz  0   gx |
//! ```
//!
//! None of these kernels synchronize. Blocks shared between elements must be
//! accumulated through [`crate::blocks::NodePairBlocks`].

use crate::error::{check_dims, Result};
use nalgebra::{
    DMatrix, DVector, Dim, Matrix, Matrix3, Matrix3xX, Matrix6, Matrix6x3, StorageMut, U3,
    Vector3,
};

/// Strain-displacement operator `B(g)`.
pub fn strain_displacement(g: &Vector3<f64>) -> Matrix6x3<f64> {
    Matrix6x3::new(
        g.x, 0.0, 0.0, //
        0.0, g.y, 0.0, //
        0.0, 0.0, g.z, //
        g.y, g.x, 0.0, //
        0.0, g.z, g.y, //
        g.z, 0.0, g.x,
    )
}

/// `f += B(g)^T sigma dv`
pub fn add_stress_force(f: &mut Vector3<f64>, g: &Vector3<f64>, sigma: &Matrix3<f64>, dv: f64) {
    let gx = g.x * dv;
    let gy = g.y * dv;
    let gz = g.z * dv;

    f.x += gx * sigma[(0, 0)] + gy * sigma[(0, 1)] + gz * sigma[(0, 2)];
    f.y += gy * sigma[(1, 1)] + gx * sigma[(0, 1)] + gz * sigma[(1, 2)];
    f.z += gz * sigma[(2, 2)] + gy * sigma[(1, 2)] + gx * sigma[(0, 2)];
}

/// `K += (Bi^T D Bj + (gi . sigma gj) I) dv`
///
/// Material tangent plus geometric (initial stress) stiffness.
pub fn add_material_stiffness(
    k: &mut Matrix3<f64>,
    gi: &Vector3<f64>,
    d: &Matrix6<f64>,
    sigma: &Matrix3<f64>,
    gj: &Vector3<f64>,
    dv: f64,
) {
    add_tangent_stiffness(k, gi, d, gj, dv);
    add_geometric_stiffness(k, gi, sigma, gj, dv);
}

/// `K += Bi^T D Bj dv`
pub fn add_tangent_stiffness(
    k: &mut Matrix3<f64>,
    gi: &Vector3<f64>,
    d: &Matrix6<f64>,
    gj: &Vector3<f64>,
    dv: f64,
) {
    let bi = strain_displacement(gi);
    let dbj = d * strain_displacement(&(gj * dv));
    *k += bi.transpose() * dbj;
}

/// `K += (gi . sigma gj) I dv`
pub fn add_geometric_stiffness(
    k: &mut Matrix3<f64>,
    gi: &Vector3<f64>,
    sigma: &Matrix3<f64>,
    gj: &Vector3<f64>,
    dv: f64,
) {
    let kg = gi.dot(&(sigma * gj)) * dv;
    for a in 0..3 {
        k[(a, a)] += kg;
    }
}

/// `K += Bi^T D(E, nu) Bj dv` for isotropic linear elasticity, expanded
/// without forming `D`.
pub fn add_isotropic_stiffness(
    k: &mut Matrix3<f64>,
    gi: &Vector3<f64>,
    e: f64,
    nu: f64,
    gj: &Vector3<f64>,
    dv: f64,
) {
    let s = e / (1.0 + nu);
    let dia = s * (1.0 - nu) / (1.0 - 2.0 * nu);
    let off = s * nu / (1.0 - 2.0 * nu);
    let di2 = 0.5 * s;

    let gjx = gj.x * dv;
    let gjy = gj.y * dv;
    let gjz = gj.z * dv;

    let (gix, giy, giz) = (gi.x, gi.y, gi.z);

    let xx = gix * di2 * gjx;
    let yy = giy * di2 * gjy;
    let zz = giz * di2 * gjz;

    k[(0, 0)] += gix * dia * gjx + yy + zz;
    k[(0, 1)] += gix * off * gjy + giy * di2 * gjx;
    k[(0, 2)] += gix * off * gjz + giz * di2 * gjx;

    k[(1, 0)] += giy * off * gjx + gix * di2 * gjy;
    k[(1, 1)] += giy * dia * gjy + xx + zz;
    k[(1, 2)] += giy * off * gjz + giz * di2 * gjy;

    k[(2, 0)] += giz * off * gjx + gix * di2 * gjz;
    k[(2, 1)] += giz * off * gjy + giy * di2 * gjz;
    k[(2, 2)] += giz * dia * gjz + yy + xx;
}

/// Pressure stiffness `K += Bi^T D(p) Bj dv` with `D_aa = -p`, `D_ab = p`.
///
/// The off-diagonal part is skew: `p (gi gj^T - gj gi^T)`.
pub fn add_pressure_stiffness(
    k: &mut Matrix3<f64>,
    gi: &Vector3<f64>,
    p: f64,
    gj: &Vector3<f64>,
    dv: f64,
) {
    let gjx = p * gj.x * dv;
    let gjy = p * gj.y * dv;
    let gjz = p * gj.z * dv;
    let (gix, giy, giz) = (gi.x, gi.y, gi.z);

    let diag = -gix * gjx - giy * gjy - giz * gjz;

    k[(0, 0)] += diag;
    k[(0, 1)] += gix * gjy - giy * gjx;
    k[(0, 2)] += gix * gjz - giz * gjx;

    k[(1, 0)] += giy * gjx - gix * gjy;
    k[(1, 1)] += diag;
    k[(1, 2)] += giy * gjz - giz * gjy;

    k[(2, 0)] += giz * gjx - gix * gjz;
    k[(2, 1)] += giz * gjy - giy * gjz;
    k[(2, 2)] += diag;
}

/// `K += kp intGi intGj^T`
///
/// `intGi` is the element integral of shape gradient `i`; `kp` is usually
/// the bulk modulus over the rest volume.
pub fn add_dilational_stiffness(
    k: &mut Matrix3<f64>,
    kp: f64,
    int_gi: &Vector3<f64>,
    int_gj: &Vector3<f64>,
) {
    k.ger(kp, int_gi, int_gj, 1.0);
}

/// `K += sum_c kp[c] GTi[:, c] GTj[:, c]^T`
///
/// Diagonal pressure stiffness over the element's pressure values.
pub fn add_dilational_stiffness_diagonal(
    k: &mut Matrix3<f64>,
    kp: &DVector<f64>,
    gt_i: &Matrix3xX<f64>,
    gt_j: &Matrix3xX<f64>,
) -> Result<()> {
    let m = kp.len();
    check_dims((3, m), gt_i.shape())?;
    check_dims((3, m), gt_j.shape())?;
    for c in 0..m {
        k.ger(kp[c], &gt_i.column(c), &gt_j.column(c), 1.0);
    }
    Ok(())
}

/// `K += GTi Rinv GTj^T`
pub fn add_dilational_stiffness_dense(
    k: &mut Matrix3<f64>,
    rinv: &DMatrix<f64>,
    gt_i: &Matrix3xX<f64>,
    gt_j: &Matrix3xX<f64>,
) -> Result<()> {
    let m = rinv.nrows();
    check_dims((m, m), rinv.shape())?;
    check_dims((3, m), gt_i.shape())?;
    check_dims((3, m), gt_j.shape())?;
    if m == 1 {
        k.ger(rinv[(0, 0)], &gt_i.column(0), &gt_j.column(0), 1.0);
        return Ok(());
    }
    let kij = gt_i * rinv * gt_j.transpose();
    for a in 0..3 {
        for b in 0..3 {
            k[(a, b)] += kij[(a, b)];
        }
    }
    Ok(())
}

/// `K += s (intGi intGj^T - intGj intGi^T)`
///
/// The diagonal of the bracket is identically zero and is left untouched.
pub fn add_incompressibility_stiffness(
    k: &mut Matrix3<f64>,
    s: f64,
    int_gi: &Vector3<f64>,
    int_gj: &Vector3<f64>,
) {
    let gix = s * int_gi.x;
    let giy = s * int_gi.y;
    let giz = s * int_gi.z;
    let (gjx, gjy, gjz) = (int_gj.x, int_gj.y, int_gj.z);

    k[(0, 1)] += gix * gjy - gjx * giy;
    k[(0, 2)] += gix * gjz - gjx * giz;

    k[(1, 0)] += giy * gjx - gjy * gix;
    k[(1, 2)] += giy * gjz - gjy * giz;

    k[(2, 0)] += giz * gjx - gjz * gix;
    k[(2, 1)] += giz * gjy - gjz * giy;
}

/// `block[:, c] += H[c] dv gradN`
///
/// `block` has one column per pressure value; fixed 3×1, 3×2, 3×4 blocks and
/// dynamic 3×m blocks are all accepted.
pub fn add_to_incompress_constraints<C, S>(
    block: &mut Matrix<f64, U3, C, S>,
    h: &[f64],
    grad_n: &Vector3<f64>,
    dv: f64,
) -> Result<()>
where
    C: Dim,
    S: StorageMut<f64, U3, C>,
{
    check_dims((3, h.len()), block.shape())?;
    for (c, hc) in h.iter().enumerate() {
        block.column_mut(c).axpy(hc * dv, grad_n, 1.0);
    }
    Ok(())
}

/// Front and back displacement gradients of a shell node at one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShellGradients {
    /// `gradMu`, acting on the front (displacement) degrees of freedom
    pub front: Vector3<f64>,
    /// `gradMd`, acting on the back (director) degrees of freedom
    pub back: Vector3<f64>,
}

/// In-plane spatial gradient `gradM = dN/dr gct0 + dN/ds gct1`, where the
/// `gct` vectors are the rows of the inverse Jacobian.
pub fn membrane_gradient(dn: &Vector3<f64>, inv_j: &Matrix3<f64>) -> Vector3<f64> {
    inv_j.transpose() * Vector3::new(dn.x, dn.y, 0.0)
}

/// Front/back split of a shell node's gradient at thickness coordinate `t`.
pub fn shell_gradients(n: f64, dn: &Vector3<f64>, t: f64, inv_j: &Matrix3<f64>) -> ShellGradients {
    let grad_m = membrane_gradient(dn, inv_j);
    let gct2: Vector3<f64> = inv_j.row(2).transpose();
    ShellGradients {
        front: (grad_m * (1.0 + t) + gct2 * n) * 0.5,
        back: (grad_m * (1.0 - t) - gct2 * n) * 0.5,
    }
}

/// Four 3×3 blocks coupling the front/back degrees of freedom of two shell
/// nodes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShellBlocks {
    pub front_front: Matrix3<f64>,
    pub front_back: Matrix3<f64>,
    pub back_front: Matrix3<f64>,
    pub back_back: Matrix3<f64>,
}

/// Shell material and geometric stiffness for one node pair and point.
pub fn add_shell_material_stiffness(
    k: &mut ShellBlocks,
    gi: &ShellGradients,
    d: &Matrix6<f64>,
    sigma: &Matrix3<f64>,
    gj: &ShellGradients,
    dv: f64,
) {
    add_material_stiffness(&mut k.front_front, &gi.front, d, sigma, &gj.front, dv);
    add_material_stiffness(&mut k.front_back, &gi.front, d, sigma, &gj.back, dv);
    add_material_stiffness(&mut k.back_front, &gi.back, d, sigma, &gj.front, dv);
    add_material_stiffness(&mut k.back_back, &gi.back, d, sigma, &gj.back, dv);
}

/// Membrane material and geometric stiffness for one node pair and point.
pub fn add_membrane_material_stiffness(
    k: &mut Matrix3<f64>,
    dn_i: &Vector3<f64>,
    dn_j: &Vector3<f64>,
    inv_j: &Matrix3<f64>,
    d: &Matrix6<f64>,
    sigma: &Matrix3<f64>,
    dv: f64,
) {
    let gi = membrane_gradient(dn_i, inv_j);
    let gj = membrane_gradient(dn_j, inv_j);
    add_material_stiffness(k, &gi, d, sigma, &gj, dv);
}

/// `f += sigma gradMu dv`, `df += sigma gradMd dv`
pub fn add_shell_stress_force(
    f: &mut Vector3<f64>,
    df: &mut Vector3<f64>,
    sigma: &Matrix3<f64>,
    g: &ShellGradients,
    dv: f64,
) {
    *f += sigma * g.front * dv;
    *df += sigma * g.back * dv;
}

/// `f += sigma gradM dv`
pub fn add_membrane_stress_force(
    f: &mut Vector3<f64>,
    sigma: &Matrix3<f64>,
    dn: &Vector3<f64>,
    inv_j: &Matrix3<f64>,
    dv: f64,
) {
    *f += sigma * membrane_gradient(dn, inv_j) * dv;
}

/// Isotropic linear elastic tangent in Voigt order.
pub fn isotropic_tangent(e: f64, nu: f64) -> Matrix6<f64> {
    let lambda = e * nu / ((1.0 + nu) * (1.0 - 2.0 * nu));
    let mu = e / (2.0 * (1.0 + nu));
    let mut d = Matrix6::zeros();
    for a in 0..3 {
        for b in 0..3 {
            d[(a, b)] = lambda;
        }
        d[(a, a)] = lambda + 2.0 * mu;
        d[(a + 3, a + 3)] = mu;
    }
    d
}
