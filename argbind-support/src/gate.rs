use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::{check_entry_name, gate_error};

/// Records whether a one-time setup command has completed.
pub trait GateStore {
    fn is_satisfied(&self, gate: &str) -> Result<bool>;
    fn mark_satisfied(&self, gate: &str) -> Result<()>;
    fn clear(&self, gate: &str) -> Result<()>;
}

/// Gate markers kept as empty `<gate>.lock` files in one directory.
#[derive(Debug, Clone)]
pub struct LockDir {
    root: PathBuf,
}

impl LockDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn lock_path(&self, operation: &str, gate: &str) -> Result<PathBuf> {
        check_entry_name(gate).map_err(|reason| anyhow!(gate_error(operation, gate, reason)))?;
        Ok(self.root.join(format!("{gate}.lock")))
    }
}

impl GateStore for LockDir {
    fn is_satisfied(&self, gate: &str) -> Result<bool> {
        Ok(self.lock_path("is_satisfied", gate)?.is_file())
    }

    fn mark_satisfied(&self, gate: &str) -> Result<()> {
        let path = self.lock_path("mark_satisfied", gate)?;
        fs::create_dir_all(&self.root)
            .with_context(|| gate_error("mark_satisfied", gate, "cannot create lock directory"))?;
        fs::write(path, b"")
            .with_context(|| gate_error("mark_satisfied", gate, "cannot write lock file"))?;
        tracing::info!(gate, "gate satisfied");
        Ok(())
    }

    fn clear(&self, gate: &str) -> Result<()> {
        match fs::remove_file(self.lock_path("clear", gate)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| gate_error("clear", gate, "cannot remove lock")),
        }
    }
}
