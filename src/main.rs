use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use nodelink::{run_jobs, JobConfig, JobSpec, OutputFormat, Strategy, Summary};

#[derive(Parser)]
#[command(name = "nodelink")]
#[command(about = "Convert CSV tables into node-link JSON for graph visualizations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every job listed in a YAML job file
    Run {
        /// Path to the job file
        config: PathBuf,
    },
    /// Link each row to one shared node per distinct value of the link columns
    Supernode {
        /// Input CSV file
        input: PathBuf,
        /// Column whose values become supernodes (repeatable)
        #[arg(short, long = "link", required = true)]
        links: Vec<String>,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Chain each row's values through the given columns, in order
    Sankey {
        /// Input CSV file
        input: PathBuf,
        /// Column in the chain (repeatable, order matters)
        #[arg(short, long = "column", required = true)]
        columns: Vec<String>,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Build every job's graph and print its most connected nodes
    Summary {
        /// Path to the job file
        config: PathBuf,
        /// Nodes listed per group
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Output path (defaults to the input path with the format's extension)
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

impl OutputArgs {
    fn job(self, input: PathBuf, strategy: Strategy) -> JobSpec {
        JobSpec {
            input,
            output: self.output,
            format: self.format,
            strategy,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => {
            let config = JobConfig::load(&config)?;
            let reports = run_jobs(&config)?;
            tracing::info!("Finished {} jobs", reports.len());
        }
        Commands::Supernode { input, links, out } => {
            out.job(input, Strategy::Supernode { links }).run()?;
        }
        Commands::Sankey {
            input,
            columns,
            out,
        } => {
            out.job(input, Strategy::Sankey { columns }).run()?;
        }
        Commands::Summary { config, top } => {
            let config = JobConfig::load(&config)?;
            for job in &config.jobs {
                let graph = job.build()?;
                println!("{}", job.input.display());
                print!("{}", Summary::of(&graph, top));
            }
        }
    }

    Ok(())
}
