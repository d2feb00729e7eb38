use super::{GlobalArgs, SubcmdResult};
use crate::{server, util};

/// Serve the repository over a JSON API.
#[derive(Debug, clap::Args)]
pub struct Args {
    /// Listen address (default: `serve.address` of the config)
    #[arg(short, long)]
    pub address: Option<String>,
}

pub async fn exec(args: &Args, _: &GlobalArgs) -> SubcmdResult {
    let repo = util::repository()?;
    let address = args
        .address
        .clone()
        .unwrap_or_else(|| repo.serve.address.clone());
    server::serve(repo, &address).await
}
