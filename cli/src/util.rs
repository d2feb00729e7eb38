use std::{
    io::{self, Read as _, Write as _},
    path::{Path, PathBuf},
    process::exit,
};

use anyhow::{bail, Context as _};
use cfw_core::{storage::Repository, style::ColorTheme};
use colored::Colorize as _;
use serde::Serialize;

pub fn init_logger(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let level = record.level();
            writeln!(
                buf,
                "[{}] {}",
                level.as_str().color(level.color()).bold(),
                record.args()
            )
        })
        .init();
}

pub fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|e| {
        eprintln!("Failed to get current dir: {}", e);
        exit(1);
    })
}

pub fn replace_homedir_to_tilde(path: impl Into<PathBuf>) -> PathBuf {
    let path = path.into();
    let Some(home_dir) = ::dirs::home_dir() else {
        return path
    };
    path.strip_prefix(home_dir)
        .map(|path| Path::new("~").join(path))
        .unwrap_or(path)
}

pub fn repository() -> anyhow::Result<Repository> {
    Repository::discover(self::current_dir())
}

/// The given problem name, or the problem whose dir contains the current dir.
pub fn resolve_problem(repo: &Repository, name: &Option<String>) -> anyhow::Result<String> {
    if let Some(name) = name {
        return Ok(name.clone());
    }
    match repo.problems().find_name_by_path(self::current_dir()) {
        Some(name) => Ok(name),
        None => bail!("Specify a problem name, or run inside a problem dir"),
    }
}

/// Contents of `path`, or stdin if `path` is `None` or `-`.
pub fn read_text(path: &Option<PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(p) if p != Path::new("-") => Ok(fsutil::read_to_string(p)?),
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(io::stdout(), value)?;
    println!();
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tilde() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(
            replace_homedir_to_tilde(home.join("cf/problems")),
            Path::new("~/cf/problems")
        );
        assert_eq!(
            replace_homedir_to_tilde("/definitely/not/home"),
            Path::new("/definitely/not/home")
        );
    }
}
