use std::path::PathBuf;

use cfw_core::{
    action::{self, RunInput},
    style,
};

use super::{ArgProfile, GlobalArgs, SubcmdResult};
use crate::util;

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Problem name (default: the problem containing the current dir)
    pub problem: Option<String>,

    /// Run on sample N (default: 1)
    #[arg(short, long, conflicts_with = "input")]
    pub sample: Option<usize>,

    /// Run on the contents of FILE instead of a sample (`-` for stdin)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t)]
    pub profile: ArgProfile,

    /// Print the verdict as JSON
    #[arg(short, long)]
    pub json: bool,
}

pub async fn exec(args: &Args, _: &GlobalArgs) -> SubcmdResult {
    let repo = util::repository()?;
    let name = util::resolve_problem(&repo, &args.problem)?;

    let input = match &args.input {
        Some(_) => RunInput::Custom(util::read_text(&args.input)?),
        None => RunInput::Sample(args.sample.unwrap_or(1)),
    };

    let report = action::run_single(&repo, &name, args.profile.into(), input).await?;
    if args.json {
        return util::print_json(&report.verdict);
    }

    if !report.build.success {
        style::print_build_failure(&report.build);
    }
    if let Some(exec) = &report.exec {
        print!("{}", exec.stdout);
        if !exec.stderr.is_empty() {
            eprint!("{}", exec.stderr);
        }
    }
    style::print_verdict(&report.verdict);
    Ok(())
}
