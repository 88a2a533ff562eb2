//! Per-group overview of a built graph: which named nodes carry the most
//! links, and how many would fall into an "Other" bucket past the top `n`.

use std::collections::HashMap;
use std::fmt;

use crate::graph::NodeLinkGraph;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub group: String,
    /// `(name, link endpoints)`, most connected first; ties keep node order.
    pub top: Vec<(String, usize)>,
    /// Named nodes of this group not listed in `top`.
    pub other: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub nodes: usize,
    pub links: usize,
    pub groups: Vec<GroupSummary>,
}

impl Summary {
    pub fn of(graph: &NodeLinkGraph, top: usize) -> Summary {
        let mut order: Vec<String> = Vec::new();
        let mut by_group: HashMap<String, Vec<(String, usize)>> = HashMap::new();

        for (id, node) in graph.nodes() {
            let Some(name) = node.name() else {
                continue;
            };
            let group = node.group();
            if !by_group.contains_key(&group) {
                order.push(group.clone());
            }
            by_group
                .entry(group)
                .or_default()
                .push((name.to_string(), graph.degree(id)));
        }

        let groups = order
            .into_iter()
            .map(|group| {
                let mut counts = by_group.remove(&group).unwrap_or_default();
                counts.sort_by(|a, b| b.1.cmp(&a.1));
                let other = counts.len().saturating_sub(top);
                counts.truncate(top);
                GroupSummary {
                    group,
                    top: counts,
                    other,
                }
            })
            .collect();

        Summary {
            nodes: graph.node_count(),
            links: graph.link_count(),
            groups,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} nodes, {} links", self.nodes, self.links)?;
        for group in &self.groups {
            writeln!(f, "[{}]", group.group)?;
            for (name, count) in &group.top {
                writeln!(f, "  {:>6}  {}", count, name)?;
            }
            if group.other > 0 {
                writeln!(f, "  ({} more)", group.other)?;
            }
        }
        Ok(())
    }
}
