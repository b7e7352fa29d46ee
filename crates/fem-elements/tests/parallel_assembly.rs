/// Parallel node-pair assembly against serial dense assembly
///
/// A 2 x 2 x 1 block of hexahedra shares its middle nodes between all four
/// elements, so the locked accumulation is exercised by concurrent writers.
use fem_elements::{
    assemble_dense, assemble_parallel, create_element, Diagnostics, Element, ElementConfig,
    IncompressibleLinearMaterial, LinearMaterial, Material, Node, NodePairBlocks, Topology,
};
use nalgebra::Vector3;

/// Nodes and hex connectivity of an `nx x ny x 1` grid of unit cubes.
fn hex_grid(nx: usize, ny: usize) -> (Vec<Node>, Vec<Vec<usize>>) {
    let id = |i: usize, j: usize, k: usize| (k * (ny + 1) + j) * (nx + 1) + i;
    let mut nodes = Vec::new();
    for k in 0..2 {
        for j in 0..=ny {
            for i in 0..=nx {
                nodes.push(Node::new(id(i, j, k), i as f64, j as f64, k as f64));
            }
        }
    }
    let mut cells = Vec::new();
    for j in 0..ny {
        for i in 0..nx {
            cells.push(vec![
                id(i, j, 1),
                id(i + 1, j, 1),
                id(i + 1, j + 1, 1),
                id(i, j + 1, 1),
                id(i, j, 0),
                id(i + 1, j, 0),
                id(i + 1, j + 1, 0),
                id(i, j + 1, 0),
            ]);
        }
    }
    (nodes, cells)
}

fn build_elements(nodes: &[Node], cells: Vec<Vec<usize>>) -> Vec<Element> {
    let diagnostics = Diagnostics::suppressed();
    let config = ElementConfig::default();
    cells
        .into_iter()
        .enumerate()
        .map(|(e, cell)| create_element(e, cell, nodes, &config, &diagnostics).unwrap())
        .collect()
}

fn compare(material: &dyn Material, nodes: &[Node], elements: &[Element]) {
    let blocks = NodePairBlocks::from_elements(elements, nodes.len()).unwrap();
    assemble_parallel(elements, nodes, material, &blocks).unwrap();
    let parallel = blocks.to_dense();
    let serial = assemble_dense(elements, nodes, material).unwrap();

    let scale = serial.norm();
    assert!(scale > 0.0);
    assert!(
        (&parallel - &serial).norm() < 1e-10 * scale,
        "parallel and serial assembly differ by {}",
        (&parallel - &serial).norm()
    );
}

#[test]
fn test_parallel_matches_serial_linear() {
    let (mut nodes, cells) = hex_grid(2, 2);
    for node in &mut nodes {
        let p = *node.position();
        node.set_position(p + Vector3::new(0.01 * p.y, 0.0, -0.02 * p.x));
    }
    let elements = build_elements(&nodes, cells);
    let material = LinearMaterial::new(1000.0, 0.3, 1.0).unwrap();
    compare(&material, &nodes, &elements);
}

#[test]
fn test_parallel_matches_serial_incompressible() {
    let (mut nodes, cells) = hex_grid(2, 2);
    // dilated and sheared, so the element pressures are non-zero
    for node in &mut nodes {
        let p = *node.position();
        node.set_position(p * 1.05 + Vector3::new(0.02 * p.z, 0.0, 0.01 * p.x));
    }
    let elements = build_elements(&nodes, cells);
    let material = IncompressibleLinearMaterial::new(10.0, 1000.0, 1.0).unwrap();
    compare(&material, &nodes, &elements);
}

#[test]
fn test_parallel_incompressible_quadratic_pressures() {
    // a single 20-node hex carries four pressure values
    let nodes: Vec<Node> = Topology::QuadHex
        .node_coords()
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let p = Vector3::new(c[0], c[1], c[2]);
            let mut node = Node::from_position(i, p);
            node.set_position(p * 1.03 + Vector3::new(0.0, 0.02 * p.x * p.x, 0.0));
            node
        })
        .collect();
    let elements = build_elements(&nodes, vec![(0..20).collect()]);
    let material = IncompressibleLinearMaterial::new(5.0, 500.0, 1.0).unwrap();
    compare(&material, &nodes, &elements);
}

#[test]
fn test_shared_blocks_are_allocated_once() {
    let (nodes, cells) = hex_grid(2, 2);
    let elements = build_elements(&nodes, cells);
    let blocks = NodePairBlocks::from_elements(&elements, nodes.len()).unwrap();
    // centre column nodes touch all four elements and every other node
    let centre_top = 4 + 9;
    let neighbours = (0..nodes.len()).filter(|&j| blocks.contains(centre_top, j)).count();
    assert_eq!(neighbours, nodes.len());
}

#[test]
fn test_shells_are_rejected() {
    let nodes: Vec<Node> = (0..4)
        .map(|i| Node::new(i, (i % 2) as f64, (i / 2) as f64, 0.0))
        .collect();
    let config = ElementConfig::default();
    let shell = Element::new(0, Topology::ShellQuad, vec![0, 1, 3, 2], &config).unwrap();
    let blocks = NodePairBlocks::from_elements(std::slice::from_ref(&shell), nodes.len()).unwrap();
    let material = LinearMaterial::new(1.0, 0.3, 1.0).unwrap();
    assert!(assemble_parallel(&[shell], &nodes, &material, &blocks).is_err());
}
