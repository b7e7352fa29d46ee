//! Orientation-checked element construction.
//!
//! Volumetric elements whose rest volume comes out negative are rebuilt with
//! the topology's inverse node ordering. Elements that are still inverted at
//! rest afterwards (degenerate geometry) keep their inverted flag set.

use crate::config::ElementConfig;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::element::Element;
use crate::error::Result;
use crate::node::{Configuration, Node};
use crate::topology::{ElementClass, Topology};

/// Create a volumetric element, choosing the topology from the node count.
///
/// # Arguments
///
/// * `id` - Element ID
/// * `nodes` - Indices into `all_nodes`, in topology order
/// * `all_nodes` - The model's node array
/// * `config` - Quadrature, class and orientation settings
/// * `diagnostics` - Receives one-time orientation warnings
pub fn create_element(
    id: usize,
    nodes: Vec<usize>,
    all_nodes: &[Node],
    config: &ElementConfig,
    diagnostics: &Diagnostics,
) -> Result<Element> {
    let topology = Topology::from_node_count(nodes.len())?;
    create_topology_element(id, topology, nodes, all_nodes, config, diagnostics)
}

/// Create an element of an explicit topology.
pub fn create_topology_element(
    id: usize,
    topology: Topology,
    nodes: Vec<usize>,
    all_nodes: &[Node],
    config: &ElementConfig,
    diagnostics: &Diagnostics,
) -> Result<Element> {
    let mut elem = Element::new(id, topology, nodes, config)?;
    if elem.class() != ElementClass::Volumetric {
        // shell orientation follows the directors
        return Ok(elem);
    }

    if config.fix_orientation && elem.compute_volume(all_nodes, Configuration::Rest)? < 0.0 {
        elem = create_flipped(&elem)?;
        report(
            config,
            diagnostics,
            DiagnosticKind::OrientationFixed(topology),
            &format!(
                "fixed orientation for some {} elements (first: element {})",
                topology.name(),
                id
            ),
        );
    }

    if elem.is_inverted_at_rest(all_nodes)? {
        elem.set_inverted(true);
        report(
            config,
            diagnostics,
            DiagnosticKind::InvertedAtRest(topology),
            &format!(
                "some {} elements are inverted at rest (first: element {})",
                topology.name(),
                id
            ),
        );
    }
    Ok(elem)
}

/// Rebuild `elem` with the topology's inverse node ordering.
///
/// The permutation is applied as `new[k] = old[inverse[k]]`; applying it twice
/// is not assumed to restore the original order.
pub fn create_flipped(elem: &Element) -> Result<Element> {
    let old = elem.nodes();
    let nodes = elem
        .topology()
        .inverse_ordering()
        .iter()
        .map(|&k| old[k])
        .collect();
    Element::with_quadrature(elem.id(), elem.topology(), nodes, elem.quadrature(), elem.class())
}

fn report(config: &ElementConfig, diagnostics: &Diagnostics, kind: DiagnosticKind, message: &str) {
    if config.suppress_warnings {
        diagnostics.record_once(kind);
    } else {
        diagnostics.warn_once(kind, message);
    }
}
