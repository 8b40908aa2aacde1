//! Rebuilds a command's calling convention from parsed values.
//!
//! Positional values go to `args` in declaration order with the variadic
//! values spliced in place; options and switches go to `kwargs` by name.

use std::collections::HashMap;

use argbind_support::{AppInfo, GateStore, Prompt, ValueStore};
use clap::ArgMatches;
use indexmap::IndexMap;

use crate::error::{BindError, Result};
use crate::grammar::{Grammar, Shape};
use crate::registry::CommandDescriptor;
use crate::spec::Role;
use crate::value::Value;

/// Parameter name to value, as produced by the parser.
pub type ParsedValues = HashMap<String, Value>;

/// Reads every declared parameter out of the parser's matches. Absent
/// optional values become `Nil`, absent switches `false`.
pub fn collect_values(grammar: &Grammar, matches: &ArgMatches) -> ParsedValues {
    grammar
        .decls()
        .iter()
        .map(|decl| {
            let name = decl.name.as_str();
            let value = match decl.shape {
                Shape::Flag => Value::Bool(matches.get_flag(name)),
                Shape::Scalar => matches.get_one::<Value>(name).cloned().unwrap_or(Value::Nil),
                Shape::List => Value::List(
                    matches
                        .get_many::<Value>(name)
                        .map(|values| values.cloned().collect())
                        .unwrap_or_default(),
                ),
            };
            (decl.name.clone(), value)
        })
        .collect()
}

/// The arguments a command is invoked with.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Invocation {
    pub command: String,
    pub args: Vec<Value>,
    pub kwargs: IndexMap<String, Value>,
}

impl Invocation {
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    pub fn kwarg(&self, name: &str) -> Option<&Value> {
        self.kwargs.get(name)
    }

    /// Value of a switch; false when the name is not a keyword argument.
    pub fn flag(&self, name: &str) -> bool {
        self.kwarg(name).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn str_arg(&self, index: usize) -> Option<&str> {
        self.arg(index).and_then(Value::as_str)
    }

    pub fn int_arg(&self, index: usize) -> Option<i64> {
        self.arg(index).and_then(Value::as_int)
    }
}

/// Collaborators a running command can reach.
pub struct Context<'a> {
    pub info: &'a AppInfo,
    pub gates: &'a dyn GateStore,
    pub values: &'a ValueStore,
    pub prompt: &'a dyn Prompt,
}

/// Builds the invocation for `command` from `parsed`.
///
/// A declared parameter without a parsed value means the grammar and the
/// registry disagree; that is reported as [`BindError::Internal`].
pub fn bind(command: &CommandDescriptor, parsed: &ParsedValues) -> Result<Invocation> {
    let mut invocation = Invocation {
        command: command.name.clone(),
        ..Invocation::default()
    };
    for param in &command.parameters {
        let value = parsed
            .get(&param.name)
            .ok_or_else(|| BindError::Internal {
                command: command.name.clone(),
                parameter: param.name.clone(),
            })?
            .clone();
        match param.role {
            Role::RequiredPositional => invocation.args.push(value),
            Role::VariadicPositional => match value {
                Value::List(values) => invocation.args.extend(values),
                other => invocation.args.push(other),
            },
            Role::Option | Role::Switch => {
                invocation.kwargs.insert(param.name.clone(), value);
            }
        }
    }
    Ok(invocation)
}

/// Binds `parsed` and runs the command's handler.
pub fn dispatch(
    command: &CommandDescriptor,
    parsed: &ParsedValues,
    context: &Context<'_>,
) -> Result<Invocation> {
    let invocation = bind(command, parsed)?;
    tracing::debug!(
        command = %command.name,
        args = invocation.args.len(),
        kwargs = invocation.kwargs.len(),
        "dispatching"
    );
    (command.handler())(&invocation, context)?;
    Ok(invocation)
}
