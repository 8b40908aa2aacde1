use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::prompt::Prompt;
use crate::{check_entry_name, store_error};

/// Settings persisted across invocations, one JSON document per name.
#[derive(Debug, Clone)]
pub struct ValueStore {
    root: PathBuf,
}

impl ValueStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn value_path(&self, operation: &str, name: &str) -> Result<PathBuf> {
        check_entry_name(name).map_err(|reason| anyhow!(store_error(operation, name, reason)))?;
        Ok(self.root.join(format!("{name}.json")))
    }

    pub fn save<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.value_path("save", name)?;
        fs::create_dir_all(&self.root)
            .with_context(|| store_error("save", name, "cannot create value directory"))?;
        let encoded = serde_json::to_vec_pretty(value)
            .with_context(|| store_error("save", name, "cannot encode value"))?;
        fs::write(path, encoded)
            .with_context(|| store_error("save", name, "cannot write value file"))?;
        tracing::debug!(name, "saved value");
        Ok(())
    }

    /// Returns `None` when nothing has been saved under `name`.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let bytes = match fs::read(self.value_path("load", name)?) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| store_error("load", name, "cannot read value"))
            }
        };
        let value = serde_json::from_slice(&bytes)
            .with_context(|| store_error("load", name, "stored value is malformed"))?;
        Ok(Some(value))
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        match fs::remove_file(self.value_path("remove", name)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| store_error("remove", name, "cannot remove")),
        }
    }

    /// Asks for a new value and saves it unless the answer is empty. The
    /// previously saved value, if any, is offered as the default.
    pub fn ask(&self, name: &str, prompt: &dyn Prompt, message: &str) -> Result<Option<String>> {
        let current: Option<String> = self.load(name)?;
        let answer = prompt.ask_text(message, current.as_deref().unwrap_or(""), &[])?;
        if answer.is_empty() {
            return Ok(None);
        }
        self.save(name, &answer)?;
        Ok(Some(answer))
    }
}
