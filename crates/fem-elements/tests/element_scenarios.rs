/// End-to-end element scenarios
///
/// Builds elements through the factory from explicit node arrays and checks
/// volumes, quadrature, orientation fixing, mass distribution and nodal
/// extrapolation.
use fem_elements::extrapolation::{extrapolation_basis, nodal_extrapolation_matrix};
use fem_elements::{
    create_element, Configuration, DiagnosticKind, Diagnostics, Element, ElementClass,
    ElementConfig, ExtrapolationBasis, Node, Quadrature, Topology,
};
use nalgebra::{DVector, Vector3};

fn nodes_at(points: &[[f64; 3]]) -> Vec<Node> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| Node::new(i, p[0], p[1], p[2]))
        .collect()
}

/// Corner nodes of the cube `[-1, 1]^3` in hex order
fn cube_nodes() -> Vec<Node> {
    nodes_at(Topology::Hex.node_coords())
}

#[test]
fn test_unit_cube_hex() {
    let nodes = cube_nodes();
    let diagnostics = Diagnostics::suppressed();
    let mut elem = create_element(
        1,
        (0..8).collect(),
        &nodes,
        &ElementConfig::default(),
        &diagnostics,
    )
    .unwrap();

    assert_eq!(elem.topology(), Topology::Hex);
    assert_eq!(elem.num_integration_points(), 8);
    for p in elem.integration_points() {
        assert!((p.weight - 1.0).abs() < 1e-15);
    }
    let rest = elem.compute_rest_volumes(&nodes).unwrap();
    assert!((rest - 8.0).abs() < 1e-12, "rest volume {}", rest);
    assert!(!elem.is_inverted());
    assert_eq!(diagnostics.fired_count(), 0);
}

#[test]
fn test_reversed_cube_stays_positive() {
    // reversing the whole array is a rotation of the cube, not a reflection
    let nodes = cube_nodes();
    let reversed: Vec<usize> = (0..8).rev().collect();
    let diagnostics = Diagnostics::suppressed();
    let elem = create_element(0, reversed.clone(), &nodes, &ElementConfig::default(), &diagnostics)
        .unwrap();
    assert_eq!(elem.nodes(), reversed.as_slice());
    assert!(elem.compute_volume(&nodes, Configuration::Rest).unwrap() > 0.0);
    assert!(!diagnostics.has_fired(DiagnosticKind::OrientationFixed(Topology::Hex)));
}

#[test]
fn test_mirrored_cube_is_fixed() {
    let nodes = cube_nodes();
    let mirrored = vec![4, 5, 6, 7, 0, 1, 2, 3];
    let diagnostics = Diagnostics::suppressed();
    let elem = create_element(0, mirrored, &nodes, &ElementConfig::default(), &diagnostics).unwrap();

    // new[k] = old[inverse[k]] with inverse = {0,3,2,1,4,7,6,5}
    assert_eq!(elem.nodes(), &[4, 7, 6, 5, 0, 3, 2, 1]);
    let volume = elem.compute_volume(&nodes, Configuration::Rest).unwrap();
    assert!((volume - 8.0).abs() < 1e-12);
    assert!(!elem.is_inverted());
    assert!(diagnostics.has_fired(DiagnosticKind::OrientationFixed(Topology::Hex)));
}

#[test]
fn test_tet_orientation_fix() {
    let nodes = nodes_at(&[
        [0.0, 0.0, 0.0],
        [2.0, 0.0, 0.0],
        [0.0, 3.0, 0.0],
        [0.0, 0.0, 1.0],
    ]);
    let diagnostics = Diagnostics::suppressed();
    let config = ElementConfig::default();

    let negative = Element::new(0, Topology::Tet, vec![0, 2, 1, 3], &config).unwrap();
    assert!(negative.compute_volume(&nodes, Configuration::Rest).unwrap() < 0.0);

    let fixed = create_element(0, vec![0, 2, 1, 3], &nodes, &config, &diagnostics).unwrap();
    let volume = fixed.compute_volume(&nodes, Configuration::Rest).unwrap();
    assert!((volume - 1.0).abs() < 1e-12, "volume {}", volume);
    assert!(diagnostics.has_fired(DiagnosticKind::OrientationFixed(Topology::Tet)));

    diagnostics.reset();
    assert_eq!(diagnostics.fired_count(), 0);
}

#[test]
fn test_unit_tet_volume() {
    let nodes = nodes_at(Topology::Tet.node_coords());
    let mut elem = create_element(
        0,
        vec![0, 1, 2, 3],
        &nodes,
        &ElementConfig::default(),
        &Diagnostics::suppressed(),
    )
    .unwrap();
    let points = elem.integration_points();
    assert_eq!(points.len(), 1);
    assert!((points[0].coords - Vector3::new(0.25, 0.25, 0.25)).norm() < 1e-15);
    assert!((points[0].weight - 1.0 / 6.0).abs() < 1e-15);
    assert!((elem.compute_rest_volumes(&nodes).unwrap() - 1.0 / 6.0).abs() < 1e-15);
    assert_eq!(elem.rest_volumes().len(), 1);
}

#[test]
fn test_quadrature_weights_sum_to_reference_measure() {
    for topology in Topology::ALL {
        let class = if topology.is_shell() {
            ElementClass::Shell
        } else {
            ElementClass::Volumetric
        };
        let mut rules = vec![Quadrature::Standard];
        if matches!(topology, Topology::Hex | Topology::QuadHex) {
            rules.extend([Quadrature::Gauss8, Quadrature::Gauss14, Quadrature::Gauss27]);
        }
        for q in rules {
            let points = fem_elements::integration::integration_points(topology, q, class).unwrap();
            let total: f64 = points.iter().map(|p| p.weight).sum();
            assert!(
                (total - topology.reference_measure()).abs() < 1e-12,
                "{:?} {:?}: weights sum to {}",
                topology,
                q,
                total
            );
        }
    }
}

#[test]
fn test_gravity_weights_match_mass_weights() {
    let cases = [
        (Topology::Tet, Quadrature::Standard),
        (Topology::Hex, Quadrature::Gauss8),
        (Topology::Wedge, Quadrature::Standard),
        (Topology::QuadTet, Quadrature::Standard),
        (Topology::QuadHex, Quadrature::Gauss27),
        (Topology::QuadWedge, Quadrature::Standard),
    ];
    for (topology, q) in cases {
        let elem = Element::with_quadrature(
            0,
            topology,
            (0..topology.num_nodes()).collect(),
            q,
            ElementClass::Volumetric,
        )
        .unwrap();
        let weights = elem.gravity_weights();
        for (i, (g, m)) in weights.iter().zip(topology.mass_weights()).enumerate() {
            assert!(
                (g - m).abs() < 1e-12,
                "{:?} node {}: gravity weight {} vs mass weight {}",
                topology,
                i,
                g,
                m
            );
        }
    }
}

#[test]
fn test_lumped_mass_totals_element_mass() {
    let mut nodes = nodes_at(Topology::QuadTet.node_coords());
    for node in &mut nodes {
        let p = *node.rest_position();
        node.set_rest_position(p * 2.0);
    }
    let elem = Element::new(0, Topology::QuadTet, (0..10).collect(), &ElementConfig::default()).unwrap();
    let masses = elem.lumped_masses(&nodes, 3.0).unwrap();
    // volume 8/6, density 3
    assert!((masses.sum() - 4.0).abs() < 1e-12);
    assert!(masses[0] < 0.0);

    let consistent = elem.consistent_mass(&nodes, 3.0).unwrap();
    assert!((consistent.sum() - 4.0).abs() < 1e-12);
}

#[test]
fn test_extrapolation_reproduces_linear_fields() {
    let field = |s: &Vector3<f64>| 1.0 + 2.0 * s.x - s.y + 0.5 * s.z;
    for topology in Topology::ALL {
        let class = if topology.is_shell() {
            ElementClass::Shell
        } else {
            ElementClass::Volumetric
        };
        let basis = extrapolation_basis(topology, Quadrature::Standard, class).unwrap();
        if matches!(basis, ExtrapolationBasis::Constant | ExtrapolationBasis::Identity) {
            continue;
        }
        let e = nodal_extrapolation_matrix(topology, Quadrature::Standard, class).unwrap();
        let points = fem_elements::integration::integration_points(topology, Quadrature::Standard, class)
            .unwrap();
        let samples = DVector::from_iterator(points.len(), points.iter().map(|p| field(&p.coords)));
        let nodal = e * samples;
        for (i, c) in topology.node_coords().iter().enumerate() {
            let expected = field(&Vector3::new(c[0], c[1], c[2]));
            assert!(
                (nodal[i] - expected).abs() < 1e-9,
                "{:?} node {}: {} vs {}",
                topology,
                i,
                nodal[i],
                expected
            );
        }
    }
}

#[test]
fn test_face_triangulation_covers_surface() {
    let nodes = nodes_at(Topology::QuadHex.node_coords());
    let elem = Element::new(0, Topology::QuadHex, (0..20).collect(), &ElementConfig::default()).unwrap();
    let tris = elem.triangulate_faces(&nodes).unwrap();
    assert_eq!(tris.len(), 6 * 6);

    let area: f64 = tris
        .iter()
        .map(|t| {
            let a = nodes[t[0]].position();
            let b = nodes[t[1]].position();
            let c = nodes[t[2]].position();
            0.5 * (b - a).cross(&(c - a)).norm()
        })
        .sum();
    assert!((area - 24.0).abs() < 1e-12, "surface area {}", area);
    assert_eq!(elem.triangulated_face_indices().unwrap().len(), 36);
}
