use std::fmt;

pub mod banner;
pub mod gate;
pub mod info;
pub mod prompt;
pub mod store;

pub use crate::gate::{GateStore, LockDir};
pub use crate::info::AppInfo;
pub use crate::prompt::{Prompt, TerminalPrompt};
pub use crate::store::ValueStore;

/// Renders `support.<area>.<operation>('<target>') failed: <error>`, with
/// single quotes in the target escaped.
fn describe_failure(
    area: &str,
    operation: &str,
    target: Option<&str>,
    error: impl fmt::Display,
) -> String {
    let target = target
        .map(|target| format!("('{}')", target.replace('\'', "\\'")))
        .unwrap_or_default();
    format!("support.{area}.{operation}{target} failed: {error}")
}

/// Names of gates and stored values become file names under one directory,
/// so they must not be able to point anywhere else.
pub(crate) fn check_entry_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("name is empty");
    }
    if name.starts_with('.') {
        return Err("name must not start with '.'");
    }
    if name.contains(&['/', '\\'][..]) || name.contains("..") {
        return Err("name must not contain path separators or '..'");
    }
    Ok(())
}

pub fn gate_error(operation: &str, gate: &str, error: impl fmt::Display) -> String {
    describe_failure("gate", operation, Some(gate), error)
}

pub fn store_error(operation: &str, name: &str, error: impl fmt::Display) -> String {
    describe_failure("store", operation, Some(name), error)
}

pub fn prompt_error(operation: &str, error: impl fmt::Display) -> String {
    describe_failure("prompt", operation, None, error)
}

pub fn info_error(operation: &str, target: Option<&str>, error: impl fmt::Display) -> String {
    describe_failure("info", operation, target, error)
}
