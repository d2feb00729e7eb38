use colored::Colorize as _;

use super::{GlobalArgs, SubcmdResult};
use crate::util;

#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg(short, long)]
    pub json: bool,

    /// List templates instead of problems
    #[arg(short, long)]
    pub templates: bool,
}

pub fn exec(args: &Args, _: &GlobalArgs) -> SubcmdResult {
    let repo = util::repository()?;

    if args.templates {
        let names = repo.templates().list()?;
        if args.json {
            return util::print_json(&names);
        }
        for name in names {
            println!("{}", name);
        }
        return Ok(());
    }

    let summaries = repo.problems().summaries()?;
    if args.json {
        return util::print_json(&summaries);
    }
    for p in summaries {
        let statement = if p.has_statement {
            "statement".green()
        } else {
            "no statement".dimmed()
        };
        println!(
            "{:<12} {} testcases, {}",
            p.name.bold(),
            p.testcase_count,
            statement
        );
    }
    Ok(())
}
