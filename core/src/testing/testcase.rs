use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
};

use serde::Serialize;

/// A saved input/expected-output pair: `in_<name>.txt` and `out_<name>.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Testcase {
    pub name: String,
    pub input: String,
    pub expected: String,
}

impl Testcase {
    const INPUT_PREFIX: &str = "in_";
    const OUTPUT_PREFIX: &str = "out_";
    const EXT: &str = ".txt";

    pub fn new(
        name: impl Into<String>,
        input: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            expected: expected.into(),
        }
    }

    pub fn input_filename(name: &str) -> String {
        format!("{}{}{}", Self::INPUT_PREFIX, name, Self::EXT)
    }

    pub fn output_filename(name: &str) -> String {
        format!("{}{}{}", Self::OUTPUT_PREFIX, name, Self::EXT)
    }

    /// `in_sample1.txt` => `Some("sample1")`
    pub fn name_from_input_filename(filename: &str) -> Option<&str> {
        filename
            .strip_prefix(Self::INPUT_PREFIX)?
            .strip_suffix(Self::EXT)
            .filter(|name| !name.is_empty())
    }

    /// Whether `filename` is the input or output file of a testcase whose name satisfies `pred`.
    pub fn is_file_of(filename: &str, pred: impl Fn(&str) -> bool) -> bool {
        [Self::INPUT_PREFIX, Self::OUTPUT_PREFIX].iter().any(|prefix| {
            filename
                .strip_prefix(prefix)
                .and_then(|s| s.strip_suffix(Self::EXT))
                .map_or(false, &pred)
        })
    }

    pub fn input_path(&self, dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(Self::input_filename(&self.name))
    }

    pub fn output_path(&self, dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(Self::output_filename(&self.name))
    }

    pub fn save(&self, dir: impl AsRef<Path>) -> fsutil::Result<()> {
        fsutil::write_with_mkdir(self.input_path(&dir), &self.input)?;
        fsutil::write_with_mkdir(self.output_path(&dir), &self.expected)
    }

    /// Load every complete testcase in `dir`, sorted by [`natural_cmp`] on the name.
    /// A missing dir has no testcases; an input file without its output file is skipped.
    pub fn enumerate(dir: impl AsRef<Path>) -> fsutil::Result<Vec<Self>> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut res = Vec::new();
        for entry in fsutil::read_dir(dir)?.filter_map(Result::ok) {
            let Ok(ft) = entry.file_type() else {
                continue;
            };
            if ft.is_dir() {
                continue;
            }
            let filename = entry.file_name();
            let filename = filename.to_string_lossy();
            let Some(name) = Self::name_from_input_filename(&filename).map(str::to_owned) else {
                continue;
            };

            let output_path = dir.join(Self::output_filename(&name));
            let Some(expected) = fsutil::read_to_string_if_exists(output_path)? else {
                log::warn!("Testcase '{}' has no output file; skipped", name);
                continue;
            };
            let input = fsutil::read_to_string(entry.path())?;
            res.push(Self::new(name, input, expected));
        }
        res.sort_by(|a, b| natural_cmp(&a.name, &b.name));
        Ok(res)
    }
}

/// Compare strings so that embedded decimal numbers are ordered by value: `sample9 < sample10`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a, b);
    loop {
        match (a.chars().next(), b.chars().next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let (na, ra) = split_digits(a);
                let (nb, rb) = split_digits(b);
                let (ta, tb) = (na.trim_start_matches('0'), nb.trim_start_matches('0'));
                let ord = ta
                    .len()
                    .cmp(&tb.len())
                    .then_with(|| ta.cmp(tb))
                    .then_with(|| na.len().cmp(&nb.len()));
                if ord != Ordering::Equal {
                    return ord;
                }
                (a, b) = (ra, rb);
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                (a, b) = (&a[x.len_utf8()..], &b[y.len_utf8()..]);
            }
        }
    }
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}
