//! Bipartite graph linking every row to shared "supernodes", one per distinct
//! value found in the link columns.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::error::ConvertResult;
use crate::graph::{Node, NodeLinkGraph, Weight};
use crate::table::Table;

pub const SUPERNODE_LINK_STRENGTH: f64 = 0.01;

/// Rows take ids `0..N` in input order; supernodes follow in the order their
/// value is first met, scanning rows then link columns. Every non-empty link
/// value yields one `supernode -> row` link.
pub fn build_supernode_graph(table: &Table, links: &[String]) -> ConvertResult<NodeLinkGraph> {
    let positions = table.column_positions(links)?;

    let mut graph = NodeLinkGraph::new();
    let rows: Vec<NodeIndex> = table
        .records()
        .iter()
        .map(|record| graph.add_node(Node::Row(record.clone())))
        .collect();

    // Keyed by raw value, shared by all link columns.
    let mut supernodes: HashMap<&str, NodeIndex> = HashMap::new();

    for (&row, record) in rows.iter().zip(table.records()) {
        for &position in &positions {
            let value = record.value(position);
            if value.is_empty() {
                continue;
            }

            let supernode = *supernodes.entry(value).or_insert_with(|| {
                graph.add_node(Node::Supernode {
                    element: value.to_string(),
                })
            });
            graph.add_link(supernode, row, Weight::Strength(SUPERNODE_LINK_STRENGTH));
        }
    }

    Ok(graph)
}
