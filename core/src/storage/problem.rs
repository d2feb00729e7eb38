use std::path::{Path, PathBuf};

use lazy_regex::regex_is_match;
use serde::Serialize;

use super::error::*;
use crate::config::BuildProfile;
use crate::sample::Sample;
use crate::testing::Testcase;

/// The directory holding every problem dir (`workspace.problems_dir`).
#[derive(Debug, Clone)]
pub struct ProblemStore {
    home: PathBuf,
    solution_file: String,
}

/// `<problems_dir>/<name>/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemDir {
    name: String,
    dir: PathBuf,
    solution_file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSummary {
    pub name: String,
    pub has_statement: bool,
    pub testcase_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetail {
    pub name: String,
    pub statement: Option<String>,
    pub solution: Option<String>,
    pub testcases: Vec<Testcase>,
}

pub fn is_valid_problem_name(name: &str) -> bool {
    regex_is_match!(r"^[A-Za-z0-9_-]+$", name)
}

fn validate_name(name: &str) -> Result<()> {
    if is_valid_problem_name(name) {
        Ok(())
    } else {
        Err(Error::InvalidProblemName(name.to_owned()))
    }
}

/// `sample1`, `sample2`, ... are owned by [`ProblemDir::save_samples`]; other names are user testcases.
fn is_sample_name(name: &str) -> bool {
    name.strip_prefix(ProblemDir::SAMPLE_PREFIX)
        .map_or(false, |n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

fn with_trailing_newline(s: &str) -> String {
    if s.is_empty() || s.ends_with('\n') {
        s.to_owned()
    } else {
        format!("{}\n", s)
    }
}

impl ProblemStore {
    pub fn new(home: impl Into<PathBuf>, solution_file: impl Into<String>) -> Self {
        Self {
            home: home.into(),
            solution_file: solution_file.into(),
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    fn problem_dir(&self, name: &str) -> ProblemDir {
        ProblemDir {
            name: name.to_owned(),
            dir: self.home.join(name),
            solution_file: self.solution_file.clone(),
        }
    }

    /// Names of the existing problems, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.home.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = fsutil::list_subdir_names(&self.home)?;
        names.retain(|name| is_valid_problem_name(name));
        Ok(names)
    }

    pub fn summaries(&self) -> Result<Vec<ProblemSummary>> {
        self.list()?
            .iter()
            .map(|name| self.problem_dir(name).summary())
            .collect()
    }

    pub fn exists(&self, name: &str) -> bool {
        is_valid_problem_name(name) && self.home.join(name).is_dir()
    }

    pub fn open(&self, name: &str) -> Result<ProblemDir> {
        validate_name(name)?;
        let p = self.problem_dir(name);
        if !p.dir.is_dir() {
            return Err(Error::NoSuchProblem(name.to_owned()));
        }
        Ok(p)
    }

    /// Create the problem dir with the solution file filled by `solution_source`.
    pub fn create(&self, name: &str, solution_source: &str) -> Result<ProblemDir> {
        validate_name(name)?;
        let p = self.problem_dir(name);
        if p.dir.exists() {
            return Err(Error::ProblemAlreadyExists(name.to_owned()));
        }
        fsutil::mkdir_all(p.testcase_dir())?;
        p.save_solution(solution_source)?;
        Ok(p)
    }

    /// Problem whose dir contains `path` (e.g. the current dir), if any.
    pub fn find_name_by_path(&self, path: impl AsRef<Path>) -> Option<String> {
        let rest = path.as_ref().strip_prefix(&self.home).ok()?;
        let name = rest.components().next()?.as_os_str().to_str()?;
        self.exists(name).then(|| name.to_owned())
    }
}

impl ProblemDir {
    const STATEMENT_FILENAME: &str = "statement.txt";
    const TESTCASE_DIR_NAME: &str = "testcase";
    const BUILD_DIR_NAME: &str = "build";
    const SAMPLE_PREFIX: &str = "sample";

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn solution_file(&self) -> PathBuf {
        self.dir.join(&self.solution_file)
    }

    pub fn statement_file(&self) -> PathBuf {
        self.dir.join(Self::STATEMENT_FILENAME)
    }

    pub fn testcase_dir(&self) -> PathBuf {
        self.dir.join(Self::TESTCASE_DIR_NAME)
    }

    /// `build/main-release`, `build/main-debug`
    pub fn binary_file(&self, profile: BuildProfile) -> PathBuf {
        let stem = Path::new(&self.solution_file)
            .file_stem()
            .map_or_else(|| "main".into(), |s| s.to_string_lossy());
        self.dir
            .join(Self::BUILD_DIR_NAME)
            .join(format!("{}-{}", stem, profile))
    }

    pub fn read_statement(&self) -> Result<Option<String>> {
        Ok(fsutil::read_to_string_if_exists(self.statement_file())?)
    }

    pub fn save_statement(&self, text: &str) -> Result<()> {
        Ok(fsutil::write_with_mkdir(self.statement_file(), text)?)
    }

    pub fn read_solution(&self) -> Result<Option<String>> {
        Ok(fsutil::read_to_string_if_exists(self.solution_file())?)
    }

    pub fn save_solution(&self, source: &str) -> Result<()> {
        Ok(fsutil::write_with_mkdir(self.solution_file(), source)?)
    }

    /// Replace the previously saved samples with `samples`; user testcases are kept.
    pub fn save_samples(&self, samples: &[Sample]) -> Result<Vec<Testcase>> {
        let dir = self.testcase_dir();
        fsutil::mkdir_all(&dir)?;
        let removed = fsutil::remove_files_where(&dir, |filename| {
            Testcase::is_file_of(filename, is_sample_name)
        })?;
        log::debug!("Removed {} old sample files in {:?}", removed, dir);

        let testcases: Vec<Testcase> = samples
            .iter()
            .map(|s| {
                Testcase::new(
                    format!("{}{}", Self::SAMPLE_PREFIX, s.index),
                    with_trailing_newline(&s.input),
                    with_trailing_newline(&s.expected_output),
                )
            })
            .collect();
        for t in &testcases {
            t.save(&dir)?;
        }
        Ok(testcases)
    }

    pub fn load_testcases(&self) -> Result<Vec<Testcase>> {
        Ok(Testcase::enumerate(self.testcase_dir())?)
    }

    pub fn load_testcase(&self, name: &str) -> Result<Testcase> {
        self.load_testcases()?
            .into_iter()
            .find(|t| t.name == name)
            .ok_or_else(|| Error::NoSuchTestcase {
                problem: self.name.clone(),
                name: name.to_owned(),
            })
    }

    /// The testcase saved from sample `index` of the statement.
    pub fn load_sample(&self, index: usize) -> Result<Testcase> {
        self.load_testcase(&format!("{}{}", Self::SAMPLE_PREFIX, index))
    }

    pub fn summary(&self) -> Result<ProblemSummary> {
        Ok(ProblemSummary {
            name: self.name.clone(),
            has_statement: self.statement_file().is_file(),
            testcase_count: self.load_testcases()?.len(),
        })
    }

    pub fn detail(&self) -> Result<ProblemDetail> {
        Ok(ProblemDetail {
            name: self.name.clone(),
            statement: self.read_statement()?,
            solution: self.read_solution()?,
            testcases: self.load_testcases()?,
        })
    }
}
