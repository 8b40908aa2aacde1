//! Compiles a command's parameter list into `clap` argument declarations.
//!
//! Positional parameters keep their declaration order because the parser
//! assigns positional indices in the order arguments are added. Options and
//! switches keep it too so that help output is stable between runs.

use std::collections::HashSet;
use std::ffi::OsStr;

use clap::builder::{PossibleValue, TypedValueParser};
use clap::error::ErrorKind;
use clap::{Arg, ArgAction};

use crate::error::{BindError, Result};
use crate::spec::{Arity, OptionSpec, ParameterSpec, PositionalSpec, Role, SwitchSpec};
use crate::value::{Value, ValueType};

const VARIADIC_HELP: &str = "(Multiple arguments)";

/// One declared parameter after inference.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub role: Role,
    pub spec: ParameterSpec,
}

/// What the parser yields for a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    List,
    Flag,
}

#[derive(Debug, Clone)]
pub struct ArgDecl {
    pub name: String,
    /// `name` for positionals, `--name` and optionally `-a` otherwise.
    pub tokens: Vec<String>,
    pub shape: Shape,
    arg: Arg,
}

impl ArgDecl {
    pub fn arg(&self) -> &Arg {
        &self.arg
    }
}

/// The compiled declarations of one command, in parameter order.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    decls: Vec<ArgDecl>,
}

impl Grammar {
    pub fn decls(&self) -> &[ArgDecl] {
        &self.decls
    }

    pub fn decl(&self, name: &str) -> Option<&ArgDecl> {
        self.decls.iter().find(|decl| decl.name == name)
    }

    /// Builds the parser for this grammar. Repeating a single-valued option
    /// or a switch keeps the last occurrence.
    pub fn to_command(&self, name: &str, about: &str) -> clap::Command {
        self.decls.iter().fold(
            clap::Command::new(name.to_string())
                .about(about.to_string())
                .args_override_self(true),
            |command, decl| command.arg(decl.arg.clone()),
        )
    }
}

pub fn compile(command: &str, params: &[Parameter]) -> Result<Grammar> {
    check_names(command, params)?;
    check_positionals(command, params)?;

    let decls: Vec<ArgDecl> = params
        .iter()
        .map(|param| match &param.spec {
            ParameterSpec::Positional(spec) => {
                positional_decl(&param.name, spec, param.role == Role::VariadicPositional)
            }
            ParameterSpec::Option(spec) => option_decl(&param.name, spec),
            ParameterSpec::Switch(spec) => switch_decl(&param.name, spec),
        })
        .collect();

    tracing::debug!(command, arguments = decls.len(), "compiled grammar");
    Ok(Grammar { decls })
}

fn check_names(command: &str, params: &[Parameter]) -> Result<()> {
    let mut names = HashSet::new();
    let mut aliases = HashSet::new();
    for param in params {
        let name = param.name.as_str();
        if name.is_empty() {
            return Err(BindError::configuration(command, name, "parameter name is empty"));
        }
        if name.starts_with('-') {
            return Err(BindError::configuration(
                command,
                name,
                "parameter names must not begin with '-'",
            ));
        }
        if name == "help" && !param.role.is_positional() {
            return Err(BindError::configuration(
                command,
                name,
                "'--help' is reserved for help output",
            ));
        }
        if !names.insert(name) {
            return Err(BindError::configuration(
                command,
                name,
                "duplicate parameter name",
            ));
        }
        if let Some(alias) = param.spec.alias() {
            if alias == 'h' {
                return Err(BindError::configuration(
                    command,
                    name,
                    "'-h' is reserved for help output",
                ));
            }
            if alias == '-' || alias.is_whitespace() {
                return Err(BindError::configuration(
                    command,
                    name,
                    format!("'{alias}' cannot be used as a short alias"),
                ));
            }
            if !aliases.insert(alias) {
                return Err(BindError::configuration(
                    command,
                    name,
                    format!("duplicate short alias '-{alias}'"),
                ));
            }
        }
    }
    Ok(())
}

fn check_positionals(command: &str, params: &[Parameter]) -> Result<()> {
    let mut variadic_seen: Option<&str> = None;
    let mut optional_seen = false;
    for param in params.iter().filter(|param| param.role.is_positional()) {
        if let Some(variadic) = variadic_seen {
            let reason = if param.role == Role::VariadicPositional {
                "only one variadic parameter is allowed".to_string()
            } else {
                format!("positional parameter follows the variadic parameter '{variadic}'")
            };
            return Err(BindError::configuration(command, &param.name, reason));
        }
        let has_default = matches!(
            &param.spec,
            ParameterSpec::Positional(PositionalSpec { default: Some(_), .. })
        );
        if param.role == Role::VariadicPositional {
            if has_default {
                return Err(BindError::configuration(
                    command,
                    &param.name,
                    "a variadic parameter cannot have a default",
                ));
            }
            variadic_seen = Some(param.name.as_str());
        }
        if has_default {
            optional_seen = true;
        } else if optional_seen {
            return Err(BindError::configuration(
                command,
                &param.name,
                "required positional parameter follows one with a default",
            ));
        }
    }
    Ok(())
}

fn positional_decl(name: &str, spec: &PositionalSpec, variadic: bool) -> ArgDecl {
    let mut arg = Arg::new(name.to_string())
        .allow_negative_numbers(true)
        .value_parser(SpecValueParser {
            value_type: spec.value_type,
            allowed: spec.allowed.clone(),
        });
    if variadic {
        arg = arg.num_args(1..).required(true).help(VARIADIC_HELP);
    } else {
        arg = arg.num_args(1);
        arg = match &spec.default {
            // Absent values are collected as Nil already.
            Some(Value::Nil) => arg.required(false),
            Some(default) => arg.required(false).default_value(default.to_string()),
            None => arg.required(true),
        };
    }
    ArgDecl {
        name: name.to_string(),
        tokens: vec![name.to_string()],
        shape: if variadic { Shape::List } else { Shape::Scalar },
        arg,
    }
}

fn option_decl(name: &str, spec: &OptionSpec) -> ArgDecl {
    let tokens = flag_tokens(name, spec.alias);
    let mut arg = Arg::new(name.to_string())
        .long(name.to_string())
        .allow_negative_numbers(true)
        .value_parser(SpecValueParser {
            value_type: spec.value_type,
            allowed: None,
        });
    if let Some(alias) = spec.alias {
        arg = arg.short(alias);
    }
    arg = match spec.arity {
        Arity::ExactlyOne => arg.num_args(1).action(ArgAction::Set),
        Arity::ZeroOrOne => arg.num_args(0..=1).action(ArgAction::Set),
        Arity::ZeroOrMore => arg.num_args(0..).action(ArgAction::Append),
        Arity::Exactly(count) => arg.num_args(count).action(ArgAction::Set),
    };
    arg = match &spec.default {
        Some(Value::List(items)) => arg
            .required(false)
            .default_values(items.iter().map(ToString::to_string))
            .value_name(default_placeholder(name, &Value::List(items.clone()))),
        Some(Value::Nil) => arg.required(false),
        Some(default) => arg
            .required(false)
            .default_value(default.to_string())
            .value_name(default_placeholder(name, default)),
        None => arg.required(true),
    };
    ArgDecl {
        name: name.to_string(),
        tokens,
        shape: if spec.arity.is_multiple() {
            Shape::List
        } else {
            Shape::Scalar
        },
        arg,
    }
}

fn switch_decl(name: &str, spec: &SwitchSpec) -> ArgDecl {
    let tokens = flag_tokens(name, spec.alias);
    let mut arg = Arg::new(name.to_string())
        .long(name.to_string())
        .action(ArgAction::SetTrue);
    if let Some(alias) = spec.alias {
        arg = arg.short(alias);
    }
    ArgDecl {
        name: name.to_string(),
        tokens,
        shape: Shape::Flag,
        arg,
    }
}

fn flag_tokens(name: &str, alias: Option<char>) -> Vec<String> {
    let mut tokens = vec![format!("--{name}")];
    if let Some(alias) = alias {
        tokens.push(format!("-{alias}"));
    }
    tokens
}

/// Placeholder shown in help for options that have a default.
pub fn default_placeholder(name: &str, default: &Value) -> String {
    format!("{} (default: {})", name.to_uppercase(), default)
}

/// Converts tokens to the declared type and enforces allowed values, so that
/// both failures are reported by the parser like any other usage error.
#[derive(Debug, Clone)]
struct SpecValueParser {
    value_type: ValueType,
    allowed: Option<Vec<Value>>,
}

impl TypedValueParser for SpecValueParser {
    type Value = Value;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        arg: Option<&Arg>,
        value: &OsStr,
    ) -> std::result::Result<Value, clap::Error> {
        let raw = value
            .to_str()
            .ok_or_else(|| clap::Error::new(ErrorKind::InvalidUtf8).with_cmd(cmd))?;
        let target = arg
            .map(ToString::to_string)
            .unwrap_or_else(|| "...".to_string());
        let parsed = self.value_type.parse(raw).map_err(|err| {
            clap::Error::raw(
                ErrorKind::ValueValidation,
                format!(
                    "invalid value '{raw}' for '{target}': expected {}: {err}\n",
                    self.value_type.describe()
                ),
            )
            .with_cmd(cmd)
        })?;
        if let Some(allowed) = &self.allowed {
            if !allowed.contains(&parsed) {
                let choices = allowed
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(clap::Error::raw(
                    ErrorKind::InvalidValue,
                    format!("invalid value '{raw}' for '{target}' [possible values: {choices}]\n"),
                )
                .with_cmd(cmd));
            }
        }
        Ok(parsed)
    }

    fn possible_values(&self) -> Option<Box<dyn Iterator<Item = PossibleValue> + '_>> {
        let allowed = self.allowed.as_ref()?;
        Some(Box::new(
            allowed
                .iter()
                .map(|value| PossibleValue::new(value.to_string())),
        ))
    }
}
