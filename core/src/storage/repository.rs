use std::{
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::bail;

use super::ProblemStore;
use crate::config::Config;
use crate::template::TemplateStore;

/// A directory tree rooted at a `cfw.toml`.
#[derive(Debug, Clone)]
pub struct Repository {
    inner: Config,
}

impl Deref for Repository {
    type Target = Config;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<Config> for Repository {
    fn from(c: Config) -> Self {
        Self::new(c)
    }
}

fn strip_prefix_dot(path: &Path) -> &Path {
    path.strip_prefix(".").unwrap_or(path)
}

impl Repository {
    pub fn new(mut cfg: Config) -> Self {
        let repo_root = &cfg.source_config_dir;

        let with_repo_root = |path: PathBuf| {
            if path.is_absolute() {
                path
            } else {
                repo_root.join(strip_prefix_dot(&path))
            }
        };
        cfg.workspace.problems_dir = with_repo_root(cfg.workspace.problems_dir);
        cfg.workspace.template_dir = cfg.workspace.template_dir.map(with_repo_root);

        Self { inner: cfg }
    }

    /// Load the config found in `cur_dir` or its ancestors.
    pub fn discover(cur_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        Config::from_file_finding_in_ancestors(cur_dir).map(Self::new)
    }

    pub fn root(&self) -> &Path {
        &self.source_config_dir
    }

    #[inline]
    pub fn problems(&self) -> ProblemStore {
        ProblemStore::new(&self.workspace.problems_dir, &self.workspace.solution_file)
    }

    #[inline]
    pub fn templates(&self) -> TemplateStore {
        TemplateStore::new(self.workspace.template_dir.clone())
    }

    /// Write the example `cfw.toml` into `dir`. Returns the path of the written file.
    pub fn init_with_example_config(dir: impl AsRef<Path>) -> anyhow::Result<PathBuf> {
        let dir = dir.as_ref();
        if let Ok(config_filepath) = Config::find_file_in_ancestors(dir) {
            let path = if config_filepath.is_relative() && !config_filepath.starts_with("./") {
                Path::new("./").join(config_filepath)
            } else {
                config_filepath
            };
            bail!(
                "Already inside a cfw repository.\nIf it's intentional, remove {:?} and then try again.",
                path
            );
        }

        let config_filepath = dir.join(Config::FILENAME);
        let toml = Config::example_toml()?;
        fsutil::write_with_mkdir(&config_filepath, &toml)?;
        Ok(config_filepath)
    }
}
