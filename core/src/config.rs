use std::path::{Path, PathBuf};
use std::result::Result as StdResult;

use anyhow::Context as _;
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};

use crate::testing::CompareMode;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Directory of the loaded config file; relative paths in the config are resolved against it.
    #[serde(skip)]
    pub source_config_dir: PathBuf,
    pub workspace: WorkspaceConfig,
    pub build: BuildConfig,
    pub test: TestConfig,
    #[serde(default)]
    pub serve: ServeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkspaceConfig {
    pub problems_dir: PathBuf,
    pub solution_file: String,
    pub default_template: String,
    #[serde(default)]
    pub template_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildConfig {
    pub compile: String,
    pub release_flags: String,
    pub debug_flags: String,
    pub run: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestConfig {
    pub shell: PathBuf,
    pub time_limit_ms: u64,
    #[serde(default)]
    pub compare: CompareMode,
    #[serde(default)]
    pub time_wrapper: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServeConfig {
    pub address: String,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:8790".to_owned(),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BuildProfile {
    #[default]
    Release,
    Debug,
}

impl BuildConfig {
    pub fn flags(&self, profile: BuildProfile) -> &str {
        match profile {
            BuildProfile::Release => &self.release_flags,
            BuildProfile::Debug => &self.debug_flags,
        }
    }
}

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Asset;

impl Config {
    pub const FILENAME: &str = "cfw.toml";

    pub fn example_toml() -> anyhow::Result<String> {
        let file = Asset::get(Self::FILENAME)
            .with_context(|| format!("Example '{}' is not embedded", Self::FILENAME))?;
        Ok(String::from_utf8_lossy(file.data.as_ref()).into_owned())
    }

    pub fn from_toml(s: &str) -> StdResult<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn from_toml_file(filepath: &Path) -> anyhow::Result<Self> {
        let toml = fsutil::read_to_string(filepath).context("Cannot read config file")?;
        let mut cfg = Self::from_toml(&toml)
            .with_context(|| format!("Invalid config TOML: {:?}", filepath))?;
        cfg.source_config_dir = filepath
            .parent()
            .map(Path::to_owned)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(cfg)
    }

    /// Find config file ancestor dirs, including current dir.
    pub fn find_file_in_ancestors(cur_dir: impl AsRef<Path>) -> anyhow::Result<PathBuf> {
        let cur_dir = cur_dir.as_ref();
        cur_dir
            .ancestors()
            .map(|dir| dir.join(Self::FILENAME))
            .find(|path| path.is_file())
            .with_context(|| {
                format!(
                    "Not in a cfw repository: Cannot find '{}' (run `cfw init` first)",
                    Self::FILENAME
                )
            })
    }

    pub fn from_file_finding_in_ancestors(cur_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config_filepath = Config::find_file_in_ancestors(cur_dir)?;
        Self::from_toml_file(&config_filepath)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn example_toml_should_be_parsable() {
        let toml = Config::example_toml().unwrap();
        let cfg = dbg!(Config::from_toml(&toml)).unwrap();

        let Config {
            source_config_dir,
            workspace,
            build,
            test,
            serve,
        } = cfg;

        assert_eq!(source_config_dir, PathBuf::new());
        assert_eq!(workspace.problems_dir, Path::new("./problems"));
        assert_eq!(workspace.solution_file, "main.cpp");
        assert_eq!(workspace.default_template, "default");
        assert_eq!(workspace.template_dir.as_deref(), Some(Path::new("./templates")));

        assert!(build.compile.contains("#{binPath}"));
        assert_eq!(build.flags(BuildProfile::Release), "-O2 -Wall");
        assert!(build.flags(BuildProfile::Debug).contains("-fsanitize"));

        assert_eq!(test.shell, Path::new("/bin/sh"));
        assert_eq!(test.time_limit_ms, 2000);
        assert_eq!(test.compare, CompareMode::Lenient);
        assert_eq!(test.time_wrapper, None);

        assert_eq!(serve.address, "127.0.0.1:8790");
    }

    #[test]
    fn optional_sections_have_defaults() {
        let toml = r##"
            [workspace]
            problems_dir = "p"
            solution_file = "a.cpp"
            default_template = "default"

            [build]
            compile = "g++ -o #{binPath} #{sourcePath}"
            release_flags = ""
            debug_flags = "-g"
            run = "#{binPath}"

            [test]
            shell = "/bin/bash"
            time_limit_ms = 500
            time_wrapper = "/usr/bin/time -f 'RESOURCE_USAGE: %e %M'"
        "##;
        let cfg = Config::from_toml(toml).unwrap();
        assert_eq!(cfg.workspace.template_dir, None);
        assert_eq!(cfg.test.compare, CompareMode::Lenient);
        assert_eq!(
            cfg.test.time_wrapper.as_deref(),
            Some("/usr/bin/time -f 'RESOURCE_USAGE: %e %M'")
        );
        assert_eq!(cfg.serve, ServeConfig::default());
    }

    #[test]
    fn unknown_compare_mode_is_rejected() {
        let toml = Config::example_toml()
            .unwrap()
            .replace(r#"compare = "lenient""#, r#"compare = "fuzzy""#);
        assert!(Config::from_toml(&toml).is_err());
    }
}
