//! Node-link graph shared by both builders, and its JSON/DOT writers.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use petgraph::dot::{Config, Dot};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Graph, Incoming, Outgoing};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::error::{ConvertError, ConvertResult};
use crate::table::Record;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An input row (group 0 of a supernode graph).
    Row(Record),
    /// A shared categorical value (group 1 of a supernode graph).
    Supernode { element: String },
    /// A (column, value) pair of a sankey graph.
    Column { group: String, name: String },
}

impl Node {
    /// Group key used by the viewer for colouring and column placement.
    pub fn group(&self) -> String {
        match self {
            Node::Row(_) => "0".to_string(),
            Node::Supernode { .. } => "1".to_string(),
            Node::Column { group, .. } => group.clone(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Row(_) => None,
            Node::Supernode { element } => Some(element.as_str()),
            Node::Column { name, .. } => Some(name.as_str()),
        }
    }

    fn label(&self, id: usize) -> String {
        match self {
            Node::Row(_) => format!("row {}", id),
            Node::Supernode { element } => element.clone(),
            Node::Column { group, name } => format!("{}: {}", group, name),
        }
    }
}

/// Link weight. Supernode links carry a fractional strength, sankey links a
/// unit count; they serialize as `0.01` and `1` respectively.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Weight {
    Count(u64),
    Strength(f64),
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weight::Count(n) => write!(f, "{}", n),
            Weight::Strength(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Link {
    pub source: usize,
    pub target: usize,
    pub value: Weight,
}

/// Directed graph whose node ids are petgraph indices. Nodes and edges are
/// never removed, so ids stay dense and both lists keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct NodeLinkGraph {
    graph: Graph<Node, Weight, Directed>,
}

impl NodeLinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) -> NodeIndex {
        self.graph.add_node(node)
    }

    pub fn add_link(&mut self, source: NodeIndex, target: NodeIndex, value: Weight) {
        self.graph.add_edge(source, target, value);
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes with their ids, in id order.
    pub fn nodes(&self) -> impl Iterator<Item = (usize, &Node)> {
        self.graph
            .node_indices()
            .map(move |ix| (ix.index(), &self.graph[ix]))
    }

    /// Links in the order they were added.
    pub fn links(&self) -> impl Iterator<Item = Link> + '_ {
        self.graph.edge_references().map(|edge| Link {
            source: edge.source().index(),
            target: edge.target().index(),
            value: *edge.weight(),
        })
    }

    /// Number of link endpoints touching the node with this id. A self-loop
    /// counts twice.
    pub fn degree(&self, id: usize) -> usize {
        let ix = NodeIndex::new(id);
        self.graph.edges_directed(ix, Outgoing).count()
            + self.graph.edges_directed(ix, Incoming).count()
    }

    pub fn to_json_writer<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer(writer, self)
    }

    pub fn write_json(&self, path: &Path) -> ConvertResult<()> {
        let file = File::create(path).map_err(|e| ConvertError::file_access(path, e))?;
        let mut writer = BufWriter::new(file);
        self.to_json_writer(&mut writer)
            .map_err(|e| ConvertError::from_json(path, e))?;
        writer
            .flush()
            .map_err(|e| ConvertError::file_access(path, e))
    }

    pub fn to_dot(&self) -> String {
        let viz = Dot::with_attr_getters(
            &self.graph,
            &[Config::NodeNoLabel, Config::EdgeNoLabel],
            &|_, edge| format!("weight={}", edge.weight()),
            &|_, (ix, node)| format!("label={:?}", node.label(ix.index())),
        );
        format!("{:?}", viz)
    }

    pub fn write_dot(&self, path: &Path) -> ConvertResult<()> {
        std::fs::write(path, self.to_dot()).map_err(|e| ConvertError::file_access(path, e))
    }
}

struct NodeEntry<'a> {
    id: usize,
    node: &'a Node,
}

impl Serialize for NodeEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.node {
            Node::Row(record) => {
                let mut map = serializer.serialize_map(None)?;
                for (column, value) in record.iter() {
                    if column != "id" && column != "group" {
                        map.serialize_entry(column, value)?;
                    }
                }
                map.serialize_entry("id", &self.id)?;
                map.serialize_entry("group", &0)?;
                map.end()
            }
            Node::Supernode { element } => {
                let mut s = serializer.serialize_struct("Supernode", 3)?;
                s.serialize_field("id", &self.id)?;
                s.serialize_field("Element", element)?;
                s.serialize_field("group", &1)?;
                s.end()
            }
            Node::Column { group, name } => {
                let mut s = serializer.serialize_struct("Column", 2)?;
                s.serialize_field("group", group)?;
                s.serialize_field("name", name)?;
                s.end()
            }
        }
    }
}

struct NodeList<'a>(&'a NodeLinkGraph);

impl Serialize for NodeList<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.nodes().map(|(id, node)| NodeEntry { id, node }))
    }
}

struct LinkList<'a>(&'a NodeLinkGraph);

impl Serialize for LinkList<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.links())
    }
}

impl Serialize for NodeLinkGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("NodeLinkGraph", 2)?;
        s.serialize_field("nodes", &NodeList(self))?;
        s.serialize_field("links", &LinkList(self))?;
        s.end()
    }
}
