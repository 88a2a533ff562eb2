//! Sankey flow graph: each row becomes a chain through its values in the
//! configured column order.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::error::ConvertResult;
use crate::graph::{Node, NodeLinkGraph, Weight};
use crate::table::Table;

/// One node per distinct `(column, value)` pair, numbered in first-seen
/// order. Every row adds one unit link per adjacent column pair; identical
/// links from different rows are kept separate.
pub fn build_sankey_graph(table: &Table, columns: &[String]) -> ConvertResult<NodeLinkGraph> {
    let positions = table.column_positions(columns)?;

    let mut graph = NodeLinkGraph::new();
    let mut node_indices: HashMap<(&str, &str), NodeIndex> = HashMap::new();

    for record in table.records() {
        let mut previous: Option<NodeIndex> = None;

        for (column, &position) in columns.iter().zip(&positions) {
            let value = record.value(position);
            let current = *node_indices
                .entry((column.as_str(), value))
                .or_insert_with(|| {
                    graph.add_node(Node::Column {
                        group: column.clone(),
                        name: value.to_string(),
                    })
                });

            if let Some(previous) = previous {
                graph.add_link(previous, current, Weight::Count(1));
            }
            previous = Some(current);
        }
    }

    Ok(graph)
}
