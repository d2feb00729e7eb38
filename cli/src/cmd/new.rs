use anyhow::Context as _;
use cfw_core::{action, print_success};
use dialoguer::{theme::ColorfulTheme, Select};

use super::{GlobalArgs, SubcmdResult};
use crate::util;

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Problem name, e.g. 1850A
    pub name: String,

    /// Template to start from (default: `workspace.default_template`)
    #[arg(short, long, conflicts_with = "pick")]
    pub template: Option<String>,

    /// Choose the template interactively
    #[arg(long)]
    pub pick: bool,
}

pub fn exec(args: &Args, _: &GlobalArgs) -> SubcmdResult {
    let repo = util::repository()?;

    let template = if args.pick {
        let names = repo.templates().list()?;
        let default = names
            .iter()
            .position(|n| *n == repo.workspace.default_template)
            .unwrap_or(0);
        let i = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Template")
            .items(&names)
            .default(default)
            .interact()
            .context("Failed to pick a template")?;
        names.get(i).cloned()
    } else {
        args.template.clone()
    };

    let problem = action::new_problem(&repo, &args.name, template.as_deref())?;
    print_success!(
        "Created problem '{}' at {}",
        args.name,
        util::replace_homedir_to_tilde(problem.dir()).to_string_lossy()
    );
    Ok(())
}
