use std::{
    fs::{self, ReadDir},
    path::Path,
};

pub mod error {
    use std::{io, path::PathBuf};

    pub type Result<T> = std::result::Result<T, self::Error>;

    type Msg = &'static str;

    #[derive(Debug, thiserror::Error)]
    pub enum Error {
        #[error("{0} ({1}): {2}")]
        SingleIO(Msg, PathBuf, #[source] io::Error),
    }

    impl Error {
        /// Whether the underlying I/O error says the entry does not exist.
        pub fn is_not_found(&self) -> bool {
            let Error::SingleIO(_, _, e) = self;
            e.kind() == io::ErrorKind::NotFound
        }
    }
}
pub use error::{Error, Result};

pub fn mkdir_all(path: impl AsRef<Path>) -> Result<()> {
    let dir = path.as_ref();
    fs::create_dir_all(dir).map_err(|e| Error::SingleIO("Cannot create dir", dir.to_owned(), e))
}

pub fn write<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    fs::write(&filepath, contents)
        .map_err(|e| Error::SingleIO("Cannot write file", filepath.as_ref().to_owned(), e))
}

pub fn write_with_mkdir<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    if let Some(dir) = filepath.as_ref().parent() {
        self::mkdir_all(dir)?;
    }
    self::write(filepath, contents)
}

pub fn read_to_string(filepath: impl AsRef<Path>) -> Result<String> {
    fs::read_to_string(&filepath)
        .map_err(|e| Error::SingleIO("Cannot read file", filepath.as_ref().to_owned(), e))
}

/// Same as [`read_to_string`] but a missing file is `Ok(None)`.
pub fn read_to_string_if_exists(filepath: impl AsRef<Path>) -> Result<Option<String>> {
    match self::read_to_string(filepath) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn remove_file(filepath: impl AsRef<Path>) -> Result<()> {
    fs::remove_file(&filepath)
        .map_err(|e| Error::SingleIO("Cannot remove file", filepath.as_ref().to_owned(), e))
}

pub fn read_dir(dir: impl AsRef<Path>) -> Result<ReadDir> {
    fs::read_dir(&dir).map_err(|e| Error::SingleIO("Cannot read dir", dir.as_ref().to_owned(), e))
}

/// Names of the direct subdirectories of `dir`, sorted.
/// Entries whose name is not valid UTF-8 are skipped.
pub fn list_subdir_names(dir: impl AsRef<Path>) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in self::read_dir(&dir)?.filter_map(std::result::Result::ok) {
        let Ok(ft) = entry.file_type() else {
            continue;
        };
        if !ft.is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => log::debug!("Skipping non UTF-8 dir name {:?}", name),
        }
    }
    names.sort();
    Ok(names)
}

/// Remove every regular file directly under `dir` whose name satisfies `pred`.
/// Returns the number of removed files.
pub fn remove_files_where(dir: impl AsRef<Path>, pred: impl Fn(&str) -> bool) -> Result<usize> {
    let mut removed = 0;
    for entry in self::read_dir(&dir)?.filter_map(std::result::Result::ok) {
        let Ok(ft) = entry.file_type() else {
            continue;
        };
        if ft.is_dir() {
            continue;
        }
        let name = entry.file_name();
        if pred(&name.to_string_lossy()) {
            self::remove_file(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn read_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let res = read_to_string_if_exists(dir.path().join("nope.txt")).unwrap();
        assert_eq!(res, None);
    }

    #[test]
    fn list_subdirs_ignores_files() {
        let dir = tempfile::tempdir().unwrap();
        mkdir_all(dir.path().join("b")).unwrap();
        mkdir_all(dir.path().join("a")).unwrap();
        write(dir.path().join("c.txt"), "x").unwrap();

        let names = list_subdir_names(dir.path()).unwrap();
        assert_eq!(names, vec!["a".to_owned(), "b".to_owned()]);
    }

    #[test]
    fn remove_files_where_only_touches_matches() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path().join("in_sample1.txt"), "1").unwrap();
        write(dir.path().join("out_sample1.txt"), "2").unwrap();
        write(dir.path().join("in_mine.txt"), "3").unwrap();

        let n = remove_files_where(dir.path(), |name| name.contains("sample")).unwrap();
        assert_eq!(n, 2);
        assert!(dir.path().join("in_mine.txt").is_file());
        assert!(!dir.path().join("in_sample1.txt").exists());
    }

    #[test]
    fn write_with_mkdir_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x/y/z.txt");
        write_with_mkdir(&path, "hello").unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "hello");
    }
}
