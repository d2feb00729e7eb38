pub mod build;
pub mod init;
pub mod list;
pub mod new;
pub mod run;
pub mod samples;
pub mod serve;
pub mod test;
pub mod verdict;

use cfw_core::config::BuildProfile;

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct GlobalArgs {
    #[command(subcommand)]
    pub subcmd: Subcommand,

    /// Show info-level logs (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    Build(build::Args),
    Init(init::Args),
    List(list::Args),
    New(new::Args),

    #[command(alias("r"))]
    Run(run::Args),

    Samples(samples::Args),
    Serve(serve::Args),

    #[command(alias("t"))]
    Test(test::Args),

    Verdict(verdict::Args),
}

pub type SubcmdResult = anyhow::Result<()>;

impl GlobalArgs {
    pub async fn exec_subcmd(&self) -> SubcmdResult {
        use Subcommand::*;
        match &self.subcmd {
            Build(args) => build::exec(args, self).await,
            Init(args) => init::exec(args, self),
            List(args) => list::exec(args, self),
            New(args) => new::exec(args, self),
            Run(args) => run::exec(args, self).await,
            Samples(args) => samples::exec(args, self),
            Serve(args) => serve::exec(args, self).await,
            Test(args) => test::exec(args, self).await,
            Verdict(args) => verdict::exec(args, self),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
#[clap(rename_all = "lower")]
pub enum ArgProfile {
    #[default]
    Release,
    Debug,
}

impl From<ArgProfile> for BuildProfile {
    fn from(value: ArgProfile) -> Self {
        use ArgProfile::*;
        match value {
            Release => BuildProfile::Release,
            Debug => BuildProfile::Debug,
        }
    }
}

impl From<&ArgProfile> for BuildProfile {
    fn from(&value: &ArgProfile) -> Self {
        value.into()
    }
}
