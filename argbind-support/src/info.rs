//! Process-wide application metadata: the program name shown in help and
//! guidance text, a one-line description, and the directory that holds gate
//! markers and persisted values.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;

use crate::info_error;

const LOCKS_DIR: &str = "locks";
const VARS_DIR: &str = "vars";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub progname: String,
    pub description: String,
    pub data_dir: PathBuf,
}

impl AppInfo {
    /// Builds metadata for `progname`, resolving the data directory from the
    /// `<PROGNAME>_HOME` override or the platform configuration directory.
    pub fn new(progname: impl Into<String>) -> Result<Self> {
        let progname = progname.into();
        let data_dir = resolve_data_dir(&progname)?;
        Ok(Self {
            progname,
            description: String::new(),
            data_dir,
        })
    }

    /// Uses the stem of `argv[0]` as the program name.
    pub fn from_env() -> Result<Self> {
        let argv0 = env::args_os()
            .next()
            .ok_or_else(|| anyhow!(info_error("from_env", None, "argv is empty")))?;
        Self::new(progname_from_argv0(Path::new(&argv0)))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn locks_dir(&self) -> PathBuf {
        self.data_dir.join(LOCKS_DIR)
    }

    pub fn vars_dir(&self) -> PathBuf {
        self.data_dir.join(VARS_DIR)
    }

    /// Creates the data directory and its `locks/` and `vars/` children.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.locks_dir(), self.vars_dir()] {
            fs::create_dir_all(&dir).with_context(|| {
                info_error("ensure_dirs", Some(&dir.display().to_string()), "create failed")
            })?;
        }
        Ok(())
    }
}

/// Name of the environment variable that overrides the data directory.
pub fn home_env_var(progname: &str) -> String {
    let mut name: String = progname
        .chars()
        .map(|ch| match ch {
            '-' | '.' | ' ' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect();
    name.push_str("_HOME");
    name
}

pub fn progname_from_argv0(argv0: &Path) -> String {
    argv0
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn resolve_data_dir(progname: &str) -> Result<PathBuf> {
    if let Some(dir) = env::var_os(home_env_var(progname)) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let base = BaseDirs::new().ok_or_else(|| {
        anyhow!(info_error(
            "data_dir",
            Some(progname),
            "no home directory for the current user"
        ))
    })?;
    Ok(base.config_dir().join(progname))
}
