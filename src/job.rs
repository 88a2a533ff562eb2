//! Conversion jobs: which file to read, how to link it, where to write it.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{ConvertError, ConvertResult};
use crate::graph::NodeLinkGraph;
use crate::sankey::build_sankey_graph;
use crate::supernode::build_supernode_graph;
use crate::table::Table;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Dot,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Dot => "dot",
        }
    }
}

/// How rows become nodes and links. In a job file, `links` selects
/// supernodes and `columns` a sankey chain; a job names exactly one.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    Supernode { links: Vec<String> },
    Sankey { columns: Vec<String> },
}

impl Strategy {
    fn column_names(&self) -> &[String] {
        match self {
            Strategy::Supernode { links } => links,
            Strategy::Sankey { columns } => columns,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "JobEntry")]
pub struct JobSpec {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub strategy: Strategy,
}

/// A job as written in the YAML file, before the strategy is decided.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct JobEntry {
    input: PathBuf,
    #[serde(default)]
    output: Option<PathBuf>,
    #[serde(default)]
    format: OutputFormat,
    #[serde(default)]
    links: Option<Vec<String>>,
    #[serde(default)]
    columns: Option<Vec<String>>,
}

impl TryFrom<JobEntry> for JobSpec {
    type Error = String;

    fn try_from(entry: JobEntry) -> Result<Self, Self::Error> {
        let strategy = match (entry.links, entry.columns) {
            (Some(links), None) => Strategy::Supernode { links },
            (None, Some(columns)) => Strategy::Sankey { columns },
            (Some(_), Some(_)) => {
                return Err(format!(
                    "job for {} has both `links` and `columns`",
                    entry.input.display()
                ))
            }
            (None, None) => {
                return Err(format!(
                    "job for {} needs `links` or `columns`",
                    entry.input.display()
                ))
            }
        };
        Ok(JobSpec {
            input: entry.input,
            output: entry.output,
            format: entry.format,
            strategy,
        })
    }
}

impl JobSpec {
    pub fn new(input: impl Into<PathBuf>, strategy: Strategy) -> Self {
        JobSpec {
            input: input.into(),
            output: None,
            format: OutputFormat::default(),
            strategy,
        }
    }

    /// Explicit output, or the input path with its extension swapped for the
    /// format's.
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(output) => output.clone(),
            None => self.input.with_extension(self.format.extension()),
        }
    }

    /// Load the input and build its graph without writing anything.
    pub fn build(&self) -> ConvertResult<NodeLinkGraph> {
        if self.strategy.column_names().is_empty() {
            return Err(ConvertError::Config {
                path: self.input.clone(),
                reason: "job names no columns to link".to_string(),
            });
        }

        let table = Table::open(&self.input)?;
        debug!(rows = table.len(), columns = table.headers().len(), "loaded table");

        match &self.strategy {
            Strategy::Supernode { links } => build_supernode_graph(&table, links),
            Strategy::Sankey { columns } => build_sankey_graph(&table, columns),
        }
    }

    pub fn run(&self) -> ConvertResult<JobReport> {
        info!("Processing {}", self.input.display());
        let graph = self.build()?;

        let output = self.output_path();
        match self.format {
            OutputFormat::Json => graph.write_json(&output)?,
            OutputFormat::Dot => graph.write_dot(&output)?,
        }
        info!(
            nodes = graph.node_count(),
            links = graph.link_count(),
            "Wrote {}",
            output.display()
        );

        Ok(JobReport {
            input: self.input.clone(),
            output,
            nodes: graph.node_count(),
            links: graph.link_count(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub nodes: usize,
    pub links: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    pub jobs: Vec<JobSpec>,
}

impl JobConfig {
    pub fn from_yaml(content: &str, origin: &Path) -> ConvertResult<JobConfig> {
        serde_yaml::from_str(content).map_err(|e| ConvertError::Config {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Read a YAML job file. Relative job paths are taken relative to the
    /// file's directory.
    pub fn load(path: &Path) -> ConvertResult<JobConfig> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConvertError::file_access(path, e))?;
        let mut config = JobConfig::from_yaml(&content, path)?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for job in &mut config.jobs {
            job.input = base.join(&job.input);
            if let Some(output) = &job.output {
                job.output = Some(base.join(output));
            }
        }
        Ok(config)
    }
}

/// Run every job in order. The first failure stops the run; later jobs are
/// not attempted.
pub fn run_jobs(config: &JobConfig) -> ConvertResult<Vec<JobReport>> {
    config.jobs.iter().map(JobSpec::run).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_both_strategies() {
        let yaml = r#"
jobs:
  - input: Interview_Data_Clean_Consolidated_DM_Only.csv
    links: [GOAL]
  - input: Interview_Data_Clean_Consolidated.csv
    output: Access-to-info.json
    columns: [LEVEL, SOURCE TYPE, GOAL]
  - input: data.csv
    format: dot
    columns: [A]
"#;
        let config = JobConfig::from_yaml(yaml, Path::new("jobs.yaml")).unwrap();

        assert_eq!(config.jobs.len(), 3);
        assert_eq!(
            config.jobs[0].strategy,
            Strategy::Supernode {
                links: columns(&["GOAL"])
            }
        );
        assert_eq!(
            config.jobs[1].strategy,
            Strategy::Sankey {
                columns: columns(&["LEVEL", "SOURCE TYPE", "GOAL"])
            }
        );
        assert_eq!(config.jobs[1].output_path(), PathBuf::from("Access-to-info.json"));
        assert_eq!(config.jobs[2].format, OutputFormat::Dot);
        assert_eq!(config.jobs[2].output_path(), PathBuf::from("data.dot"));
    }

    #[test]
    fn test_job_without_strategy_is_rejected() {
        let yaml = "jobs:\n  - input: data.csv\n";
        let err = JobConfig::from_yaml(yaml, Path::new("jobs.yaml")).unwrap_err();
        assert!(matches!(err, ConvertError::Config { .. }));
    }

    #[test]
    fn test_job_with_both_strategies_is_rejected() {
        let yaml = "jobs:\n  - input: a.csv\n    links: [A]\n    columns: [B, C]\n";
        let err = JobConfig::from_yaml(yaml, Path::new("jobs.yaml")).unwrap_err();
        match err {
            ConvertError::Config { reason, .. } => {
                assert!(reason.contains("both `links` and `columns`"), "{}", reason)
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_misspelled_key_is_rejected() {
        let yaml = "jobs:\n  - input: a.csv\n    ouptut: x.json\n    links: [A]\n";
        let err = JobConfig::from_yaml(yaml, Path::new("jobs.yaml")).unwrap_err();
        match err {
            ConvertError::Config { reason, .. } => assert!(reason.contains("ouptut"), "{}", reason),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_numeric_column_names() {
        let yaml = "jobs:\n  - input: a.csv\n    columns: [YEAR, 2019]\n";
        let config = JobConfig::from_yaml(yaml, Path::new("jobs.yaml")).unwrap();
        assert_eq!(
            config.jobs[0].strategy,
            Strategy::Sankey {
                columns: columns(&["YEAR", "2019"])
            }
        );
    }

    #[test]
    fn test_derived_output_path() {
        let job = JobSpec::new(
            "data/Interview_Data_Clean_Consolidated_DM_Only.csv",
            Strategy::Supernode {
                links: columns(&["GOAL"]),
            },
        );
        assert_eq!(
            job.output_path(),
            PathBuf::from("data/Interview_Data_Clean_Consolidated_DM_Only.json")
        );
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("jobs.yaml");
        fs::write(
            &config_path,
            "jobs:\n  - input: in.csv\n    output: out/graph.json\n    links: [GOAL]\n",
        )
        .unwrap();

        let config = JobConfig::load(&config_path).unwrap();
        assert_eq!(config.jobs[0].input, dir.path().join("in.csv"));
        assert_eq!(config.jobs[0].output_path(), dir.path().join("out/graph.json"));
    }

    #[test]
    fn test_run_jobs_writes_each_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("decisions.csv");
        fs::write(&input, "GOAL,DECISION\nA,d1\nB,d2\nA,d1\n").unwrap();

        let mut sankey = JobSpec::new(
            &input,
            Strategy::Sankey {
                columns: columns(&["GOAL", "DECISION"]),
            },
        );
        sankey.output = Some(dir.path().join("Critical-Decisions.json"));
        let config = JobConfig {
            jobs: vec![
                JobSpec::new(
                    &input,
                    Strategy::Supernode {
                        links: columns(&["GOAL"]),
                    },
                ),
                sankey,
            ],
        };

        let reports = run_jobs(&config).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!((reports[0].nodes, reports[0].links), (5, 3));
        assert_eq!((reports[1].nodes, reports[1].links), (4, 3));

        let written = fs::read_to_string(dir.path().join("decisions.json")).unwrap();
        let graph: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(graph["nodes"][3], serde_json::json!({"id": 3, "Element": "A", "group": 1}));
        assert!(!written.contains('\n'));

        let written = fs::read_to_string(dir.path().join("Critical-Decisions.json")).unwrap();
        let graph: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(graph["links"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn test_run_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("rows.csv");
        fs::write(&input, "X,Y\n1,2\n1,3\n").unwrap();
        let job = JobSpec::new(
            &input,
            Strategy::Sankey {
                columns: columns(&["X", "Y"]),
            },
        );

        job.run().unwrap();
        let first = fs::read(job.output_path()).unwrap();
        job.run().unwrap();
        assert_eq!(fs::read(job.output_path()).unwrap(), first);
    }

    #[test]
    fn test_first_failure_stops_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.csv");
        fs::write(&good, "GOAL\nA\n").unwrap();
        let missing = dir.path().join("missing.csv");

        let strategy = Strategy::Supernode {
            links: columns(&["GOAL"]),
        };
        let config = JobConfig {
            jobs: vec![
                JobSpec::new(&missing, strategy.clone()),
                JobSpec::new(&good, strategy),
            ],
        };

        let err = run_jobs(&config).unwrap_err();
        assert!(matches!(err, ConvertError::FileAccess { .. }));
        assert_eq!(err.path(), missing.as_path());
        assert!(!dir.path().join("good.json").exists());
    }

    #[test]
    fn test_empty_column_list() {
        let job = JobSpec::new("any.csv", Strategy::Sankey { columns: vec![] });
        let err = job.build().unwrap_err();
        assert!(matches!(err, ConvertError::Config { .. }));
    }

    #[test]
    fn test_dot_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("rows.csv");
        fs::write(&input, "X,Y\n1,2\n").unwrap();
        let mut job = JobSpec::new(
            &input,
            Strategy::Sankey {
                columns: columns(&["X", "Y"]),
            },
        );
        job.format = OutputFormat::Dot;

        let report = job.run().unwrap();
        assert_eq!(report.output, dir.path().join("rows.dot"));
        let dot = fs::read_to_string(&report.output).unwrap();
        assert!(dot.contains("X: 1"));
    }
}
