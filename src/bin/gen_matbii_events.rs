//! Generate the MATB-II event scenario files for an experiment.
//!
//! Usage: `gen_matbii_events <output-folder> [--seed N] [--condition high|low|both]`

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::info;

use matbexp::scenarios::create_matbii_scenarios;
use matbexp::{CommStems, Condition, ParamsFile};

#[derive(Parser, Debug)]
#[command(name = "gen_matbii_events")]
#[command(about = "Generate MATB-II event scenario XML files")]
struct Args {
    /// Output folder for the generated XML files
    output_folder: PathBuf,

    /// Base seed for scenario randomization
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Which task-load condition(s) to generate
    #[arg(long, value_enum, default_value_t = ConditionArg::Both)]
    condition: ConditionArg,

    /// JSON file overriding the embedded parameter sets
    #[arg(long)]
    params: Option<PathBuf>,

    /// Directory of communication recordings to build the stem catalog
    /// from, instead of the embedded catalog
    #[arg(long)]
    comm_stems: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ConditionArg {
    High,
    Low,
    Both,
}

impl ConditionArg {
    fn conditions(self) -> Vec<Condition> {
        match self {
            ConditionArg::High => vec![Condition::High],
            ConditionArg::Low => vec![Condition::Low],
            ConditionArg::Both => vec![Condition::High, Condition::Low],
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    matbexp::logging::init_logging(args.verbose);

    let params_file = match &args.params {
        Some(path) => ParamsFile::load(path)?,
        None => ParamsFile::embedded()?,
    };
    let stems = match &args.comm_stems {
        Some(dir) => CommStems::from_wav_dir(dir)?,
        None => CommStems::embedded()?,
    };

    for condition in args.condition.conditions() {
        let paths = create_matbii_scenarios(
            condition,
            &args.output_folder,
            args.seed,
            &params_file,
            &stems,
        )
        .with_context(|| format!("generating the {condition} condition"))?;
        info!("generated {} {condition} scenario file(s)", paths.len());
    }
    Ok(())
}
