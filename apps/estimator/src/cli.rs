use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub const DEMO_DESCRIPTION: &str =
    "Mow the lawn of a standard high school football field, which is 100 yards long and 50 yards wide";
pub const DEMO_WORKERS: u32 = 5;

#[derive(Parser, Debug)]
#[command(name = "estimator", version, about = "Landscape job feasibility estimator")]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "Catalog JSON file (employees, tools, schedule); overrides CATALOG_PATH"
    )]
    pub catalog: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Estimate the built-in football field example (the default)
    Demo,
    /// Estimate a single job
    Estimate {
        #[arg(long, short)]
        description: String,
        #[arg(long = "image", help = "Photo of the job site; repeat for several")]
        images: Vec<PathBuf>,
        #[arg(long, short)]
        workers: u32,
        #[arg(long, help = "Print parse status and raw model text too")]
        raw: bool,
    },
    /// Serve the estimation HTTP API
    Serve {
        #[arg(long, help = "Overrides PORT")]
        port: Option<u16>,
    },
}
