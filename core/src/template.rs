//! Solution templates: the built-in ones plus `<template_dir>/<name>.cpp` of the repository.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rust_embed::RustEmbed;

use crate::storage::{Error, Result};

#[derive(RustEmbed)]
#[folder = "assets/templates/"]
struct BuiltinTemplate;

#[derive(Debug, Clone)]
pub struct TemplateStore {
    user_dir: Option<PathBuf>,
}

impl TemplateStore {
    const EXT: &str = ".cpp";

    pub fn new(user_dir: Option<PathBuf>) -> Self {
        Self { user_dir }
    }

    pub fn builtin_names() -> Vec<String> {
        BuiltinTemplate::iter()
            .filter_map(|f| f.strip_suffix(Self::EXT).map(str::to_owned))
            .collect()
    }

    fn user_file(&self, name: &str) -> Option<PathBuf> {
        self.user_dir
            .as_deref()
            .map(|dir| dir.join(format!("{}{}", name, Self::EXT)))
    }

    fn user_names(dir: &Path) -> Result<Vec<String>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fsutil::read_dir(dir)?.filter_map(std::result::Result::ok) {
            let filename = entry.file_name();
            if let Some(name) = filename.to_string_lossy().strip_suffix(Self::EXT) {
                if !name.is_empty() {
                    names.push(name.to_owned());
                }
            }
        }
        Ok(names)
    }

    /// Every available template name, sorted and deduplicated.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names: BTreeSet<String> = Self::builtin_names().into_iter().collect();
        if let Some(dir) = &self.user_dir {
            names.extend(Self::user_names(dir)?);
        }
        Ok(names.into_iter().collect())
    }

    /// Source of template `name`. A user file shadows the built-in template of the same name.
    pub fn load(&self, name: &str) -> Result<String> {
        if let Some(path) = self.user_file(name) {
            if let Some(source) = fsutil::read_to_string_if_exists(&path)? {
                log::debug!("Using user template {:?}", path);
                return Ok(source);
            }
        }
        let file = BuiltinTemplate::get(&format!("{}{}", name, Self::EXT))
            .ok_or_else(|| Error::NoSuchTemplate(name.to_owned()))?;
        Ok(String::from_utf8_lossy(file.data.as_ref()).into_owned())
    }
}
