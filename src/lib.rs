//! Convert CSV tables into node-link graphs for force-directed and sankey
//! visualizations.

pub mod error;
pub mod graph;
pub mod job;
pub mod sankey;
pub mod summary;
pub mod supernode;
pub mod table;

pub use error::{ConvertError, ConvertResult};
pub use graph::{Link, Node, NodeLinkGraph, Weight};
pub use job::{run_jobs, JobConfig, JobReport, JobSpec, OutputFormat, Strategy};
pub use sankey::build_sankey_graph;
pub use summary::Summary;
pub use supernode::build_supernode_graph;
pub use table::{Record, Table};
