use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::dispatch::{Context, Invocation};
use crate::error::{BindError, Result};
use crate::grammar::{compile, Grammar, Parameter};
use crate::inference::{infer, Annotation, ParamKind};

/// The code a command runs once its arguments are bound.
pub type Handler = Arc<dyn Fn(&Invocation, &Context<'_>) -> anyhow::Result<()> + Send + Sync>;

pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&Invocation, &Context<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A parameter as the command author declares it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: String,
    pub kind: ParamKind,
    pub annotation: Annotation,
}

impl ParamDecl {
    pub fn new(name: impl Into<String>, annotation: impl Into<Annotation>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Regular,
            annotation: annotation.into(),
        }
    }

    pub fn variadic(name: impl Into<String>, annotation: impl Into<Annotation>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Variadic,
            annotation: annotation.into(),
        }
    }
}

pub struct CommandDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<Parameter>,
    gated: bool,
    grammar: Grammar,
    handler: Handler,
}

impl CommandDescriptor {
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// True for the one-time setup command other commands wait for.
    pub fn is_gated(&self) -> bool {
        self.gated
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .field("gated", &self.gated)
            .finish_non_exhaustive()
    }
}

/// Commands by name, in the order they were first registered.
#[derive(Debug, Default)]
pub struct Registry {
    commands: IndexMap<String, CommandDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command. A command registered under an existing name
    /// replaces the earlier one but keeps its position in listings.
    pub fn register(
        &mut self,
        name: &str,
        description: &str,
        params: &[ParamDecl],
        handler: Handler,
    ) -> Result<()> {
        self.insert(name, description, params, handler, false)
    }

    /// Registers the one-time setup command. Until it has run successfully no
    /// other command is dispatched.
    pub fn register_gated(
        &mut self,
        name: &str,
        description: &str,
        params: &[ParamDecl],
        handler: Handler,
    ) -> Result<()> {
        self.insert(name, description, params, handler, true)
    }

    fn insert(
        &mut self,
        name: &str,
        description: &str,
        params: &[ParamDecl],
        handler: Handler,
        gated: bool,
    ) -> Result<()> {
        if name.is_empty() || name.starts_with('-') {
            return Err(BindError::configuration(
                name,
                "",
                "command names must be non-empty and must not begin with '-'",
            ));
        }
        let parameters = params
            .iter()
            .map(|decl| {
                let (role, spec) = infer(&decl.annotation, decl.kind)
                    .map_err(|reason| BindError::configuration(name, &decl.name, reason))?;
                let spec = spec
                    .validate()
                    .map_err(|reason| BindError::configuration(name, &decl.name, reason))?;
                Ok(Parameter {
                    name: decl.name.clone(),
                    role,
                    spec,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let grammar = compile(name, &parameters)?;

        let descriptor = CommandDescriptor {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
            gated,
            grammar,
            handler,
        };
        if self.commands.insert(name.to_string(), descriptor).is_some() {
            tracing::warn!(command = name, "command registered twice; keeping the later one");
        } else {
            tracing::debug!(command = name, gated, "registered command");
        }
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.get(name)
    }

    /// `(name, description)` pairs in registration order.
    pub fn list_all(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.commands
            .values()
            .map(|command| (command.name.as_str(), command.description.as_str()))
    }

    pub fn gates(&self) -> impl Iterator<Item = &str> + '_ {
        self.commands
            .values()
            .filter(|command| command.gated)
            .map(|command| command.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::SpecKind;
    use crate::spec::{OptionSpec, PositionalSpec, Role};
    use crate::value::ValueType;

    fn noop() -> Handler {
        handler(|_, _| Ok(()))
    }

    #[test]
    fn later_registration_wins_and_keeps_position() {
        let mut registry = Registry::new();
        registry.register("add", "first", &[], noop()).unwrap();
        registry.register("list", "listing", &[], noop()).unwrap();
        registry
            .register("add", "second", &[ParamDecl::new("a", Annotation::None)], noop())
            .unwrap();

        assert_eq!(registry.len(), 2);
        let listed: Vec<_> = registry.list_all().collect();
        assert_eq!(listed, vec![("add", "second"), ("list", "listing")]);
        assert_eq!(registry.lookup("add").unwrap().parameters.len(), 1);
    }

    #[test]
    fn lookup_of_unknown_command_is_none() {
        let registry = Registry::new();
        assert!(registry.lookup("missing").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn parameters_are_inferred_in_order() {
        let mut registry = Registry::new();
        registry
            .register(
                "mixed",
                "",
                &[
                    ParamDecl::new("name", Annotation::None),
                    ParamDecl::new("what", OptionSpec::new()),
                    ParamDecl::new("should", SpecKind::Switch),
                    ParamDecl::variadic("files", Annotation::None),
                ],
                noop(),
            )
            .unwrap();
        let roles: Vec<_> = registry
            .lookup("mixed")
            .unwrap()
            .parameters
            .iter()
            .map(|param| param.role)
            .collect();
        assert_eq!(
            roles,
            vec![
                Role::RequiredPositional,
                Role::Option,
                Role::Switch,
                Role::VariadicPositional
            ]
        );
    }

    #[test]
    fn invalid_specs_name_the_command_and_parameter() {
        let mut registry = Registry::new();
        let err = registry
            .register(
                "pick",
                "",
                &[ParamDecl::new(
                    "n",
                    PositionalSpec::new()
                        .value_type(ValueType::Int)
                        .allowed([1_i64, 2])
                        .default(3_i64),
                )],
                noop(),
            )
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "command 'pick', parameter 'n': default '3' is not one of the allowed values"
        );
        assert!(registry.lookup("pick").is_none());
    }

    #[test]
    fn gated_commands_are_listed_as_gates() {
        let mut registry = Registry::new();
        registry.register_gated("setup", "", &[], noop()).unwrap();
        registry.register("run", "", &[], noop()).unwrap();
        assert_eq!(registry.gates().collect::<Vec<_>>(), vec!["setup"]);
        assert!(registry.lookup("setup").unwrap().is_gated());
    }
}
