use cfw_core::{action, print_success, style};

use super::{ArgProfile, GlobalArgs, SubcmdResult};
use crate::util;

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Problem name (default: the problem containing the current dir)
    pub problem: Option<String>,

    #[arg(short, long, value_enum, default_value_t)]
    pub profile: ArgProfile,
}

pub async fn exec(args: &Args, _: &GlobalArgs) -> SubcmdResult {
    let repo = util::repository()?;
    let name = util::resolve_problem(&repo, &args.problem)?;

    let report = action::build(&repo, &name, args.profile.into()).await?;
    if !report.success {
        style::print_build_failure(&report);
        anyhow::bail!("Failed to build '{}'", name);
    }
    if !report.diagnostics.is_empty() {
        eprint!("{}", report.diagnostics);
    }
    print_success!(
        "Built {}",
        util::replace_homedir_to_tilde(&report.binary).to_string_lossy()
    );
    Ok(())
}
