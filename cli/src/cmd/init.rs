use cfw_core::{action, print_success};
use std::path::PathBuf;

use super::{GlobalArgs, SubcmdResult};
use crate::util;

#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg(default_value = "./")]
    dir: PathBuf,
}

pub fn exec(args: &Args, _: &GlobalArgs) -> SubcmdResult {
    let config_file = action::init_repository(&args.dir)?;
    print_success!(
        "Successfully initialized cfw repository. (config: {})",
        util::replace_homedir_to_tilde(config_file).to_string_lossy()
    );
    Ok(())
}
