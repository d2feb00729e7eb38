use cfw_core::{
    action::{self, NoopReporter},
    style::{self, SpinnerReporter},
};

use super::{ArgProfile, GlobalArgs, SubcmdResult};
use crate::util;

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Problem name (default: the problem containing the current dir)
    pub problem: Option<String>,

    #[arg(short, long, value_enum, default_value_t)]
    pub profile: ArgProfile,

    /// Print the verdict as JSON
    #[arg(short, long)]
    pub json: bool,
}

pub async fn exec(args: &Args, _global_args: &GlobalArgs) -> SubcmdResult {
    let repo = util::repository()?;
    let name = util::resolve_problem(&repo, &args.problem)?;
    let profile = args.profile.into();

    if args.json {
        let report = action::test_all(&repo, &name, profile, &mut NoopReporter).await?;
        return util::print_json(&report.verdict);
    }

    let report = action::test_all(&repo, &name, profile, &mut SpinnerReporter::new()).await?;
    style::print_verdict(&report.verdict);
    Ok(())
}
