use std::path::PathBuf;

use cfw_core::{parse_verdict, style};

use super::{GlobalArgs, SubcmdResult};
use crate::util;

/// Parse saved pipeline output into a verdict.
#[derive(Debug, clap::Args)]
pub struct Args {
    /// File holding the pipeline's stdout (default: stdin)
    #[arg(long, value_name = "FILE")]
    pub stdout: Option<PathBuf>,

    /// File holding the pipeline's stderr
    #[arg(long, value_name = "FILE")]
    pub stderr: Option<PathBuf>,

    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    pub exit_code: i32,

    #[arg(short, long)]
    pub json: bool,
}

pub fn exec(args: &Args, _: &GlobalArgs) -> SubcmdResult {
    let stdout = util::read_text(&args.stdout)?;
    let stderr = match &args.stderr {
        Some(path) => fsutil::read_to_string(path)?,
        None => String::new(),
    };

    let verdict = parse_verdict(&stdout, &stderr, args.exit_code);
    if args.json {
        return util::print_json(&verdict);
    }
    style::print_verdict(&verdict);
    Ok(())
}
