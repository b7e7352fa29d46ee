//! Face triangulation.
//!
//! Faces are node lists ordered counter-clockwise about the outward normal,
//! corner and mid-edge nodes alternating for quadratic faces. Quadratic faces
//! split into corner triangles plus an inner polygon; the position-aware
//! variant cuts the inner quadrilateral along its shorter diagonal.

use crate::error::{FemError, Result};
use nalgebra::Vector3;

const TRI: &[[usize; 3]] = &[[0, 1, 2]];
const QUAD: &[[usize; 3]] = &[[0, 1, 2], [0, 2, 3]];
const QUAD_TRI: &[[usize; 3]] = &[[0, 1, 5], [1, 3, 5], [1, 2, 3], [5, 3, 4]];
const QUAD_QUAD: &[[usize; 3]] = &[
    [0, 1, 7],
    [1, 5, 7],
    [1, 3, 5],
    [1, 2, 3],
    [3, 4, 5],
    [7, 5, 6],
];

/// Fixed triangle pattern, in face-local positions, for a face size.
pub fn face_triangle_pattern(num_nodes: usize) -> Result<&'static [[usize; 3]]> {
    match num_nodes {
        3 => Ok(TRI),
        4 => Ok(QUAD),
        6 => Ok(QUAD_TRI),
        8 => Ok(QUAD_QUAD),
        n => Err(FemError::UnsupportedFace(n)),
    }
}

/// Triangulate a list of faces with the fixed patterns.
///
/// Returned triangles hold the faces' own node indices.
pub fn triangulated_face_indices(faces: &[&[usize]]) -> Result<Vec<[usize; 3]>> {
    let mut triangles = Vec::new();
    for face in faces {
        let pattern = face_triangle_pattern(face.len())?;
        triangles.extend(pattern.iter().map(|t| [face[t[0]], face[t[1]], face[t[2]]]));
    }
    Ok(triangles)
}

/// Triangulate one face using node positions.
///
/// Linear faces are fanned from the first node. For 6- and 8-node faces the
/// inner quadrilateral of mid-edge nodes is split along its shorter diagonal.
pub fn triangulate_face<F>(face: &[usize], position: F) -> Result<Vec<[usize; 3]>>
where
    F: Fn(usize) -> Vector3<f64>,
{
    let local: Vec<[usize; 3]> = match face.len() {
        3 | 4 => (0..face.len() - 2).map(|i| [0, i + 1, i + 2]).collect(),
        6 => {
            let p = |k: usize| position(face[k]);
            if (p(1) - p(4)).norm() < (p(5) - p(3)).norm() {
                vec![[0, 1, 5], [1, 4, 5], [1, 3, 4], [1, 2, 3]]
            } else {
                vec![[0, 1, 5], [1, 3, 5], [3, 4, 5], [1, 2, 3]]
            }
        }
        8 => {
            let p = |k: usize| position(face[k]);
            let mut tris = vec![[0, 1, 7], [1, 2, 3], [3, 4, 5], [7, 5, 6]];
            if (p(7) - p(3)).norm() < (p(1) - p(5)).norm() {
                tris.extend([[1, 3, 7], [7, 3, 5]]);
            } else {
                tris.extend([[1, 5, 7], [1, 3, 5]]);
            }
            tris
        }
        n => return Err(FemError::UnsupportedFace(n)),
    };
    Ok(local
        .iter()
        .map(|t| [face[t[0]], face[t[1]], face[t[2]]])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_patterns_cover_faces() {
        let faces: [&[usize]; 2] = [&[10, 11, 12, 13], &[0, 1, 2, 3, 4, 5, 6, 7]];
        let tris = triangulated_face_indices(&faces).unwrap();
        assert_eq!(tris.len(), 8);
        assert_eq!(tris[0], [10, 11, 12]);
        assert_eq!(tris[1], [10, 12, 13]);
        assert!(matches!(
            face_triangle_pattern(5),
            Err(FemError::UnsupportedFace(5))
        ));
    }

    #[test]
    fn eight_node_face_uses_shorter_diagonal() {
        // Mid-edge nodes of a square face stretched along x
        let coords = [
            [-2.0, -1.0],
            [0.0, -1.0],
            [2.0, -1.0],
            [2.0, 0.0],
            [2.0, 1.0],
            [0.0, 1.0],
            [-2.0, 1.0],
            [-2.0, 0.0],
        ];
        let face: Vec<usize> = (0..8).collect();
        let tris = triangulate_face(&face, |k| Vector3::new(coords[k][0], coords[k][1], 0.0)).unwrap();
        assert_eq!(tris.len(), 6);
        // |n1 - n5| = 2 is shorter than |n7 - n3| = 4
        assert!(tris.contains(&[1, 5, 7]));
        assert!(tris.contains(&[1, 3, 5]));
    }

    #[test]
    fn six_node_face_uses_shorter_diagonal() {
        let coords = [
            [0.0, 0.0],
            [1.0, 0.0],
            [2.0, 0.0],
            [1.0, 1.0],
            [0.0, 2.0],
            [0.0, 1.0],
        ];
        let face = [0, 5, 4, 3, 2, 1];
        let pos = |k: usize| Vector3::new(coords[k][0], coords[k][1], 0.0);
        let tris = triangulate_face(&face, pos).unwrap();
        assert_eq!(tris.len(), 4);
        let area: f64 = tris
            .iter()
            .map(|t| 0.5 * (pos(t[1]) - pos(t[0])).cross(&(pos(t[2]) - pos(t[0]))).norm())
            .sum();
        assert!((area - 2.0).abs() < 1e-12);
    }
}
