use std::path::PathBuf;

use cfw_core::{action, extract_samples, print_success, style};

use super::{GlobalArgs, SubcmdResult};
use crate::util;

/// Extract samples from a problem statement and save them as testcases.
#[derive(Debug, clap::Args)]
pub struct Args {
    /// Problem name (default: the problem containing the current dir)
    pub problem: Option<String>,

    /// Statement text file (default: stdin)
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Only print the extracted samples
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    #[arg(short, long)]
    pub json: bool,
}

pub fn exec(args: &Args, _: &GlobalArgs) -> SubcmdResult {
    let statement = util::read_text(&args.file)?;

    let samples = if args.dry_run {
        extract_samples(&statement)
    } else {
        let repo = util::repository()?;
        let name = util::resolve_problem(&repo, &args.problem)?;
        let samples = action::import_statement(&repo, &name, &statement)?;
        if !samples.is_empty() && !args.json {
            print_success!("Saved {} samples to '{}'", samples.len(), name);
        }
        samples
    };

    if args.json {
        return util::print_json(&samples);
    }
    style::print_samples(&samples);
    Ok(())
}
