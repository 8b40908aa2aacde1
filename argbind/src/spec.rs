//! Vocabulary describing how one command parameter appears on the command
//! line: a positional value, a named option carrying values, or a boolean
//! switch.

use crate::value::{Value, ValueType};

/// How many values an option consumes each time it appears.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Arity {
    ExactlyOne,
    #[default]
    ZeroOrOne,
    ZeroOrMore,
    /// A fixed count greater than one.
    Exactly(usize),
}

impl Arity {
    /// Maps a numeric count: any negative count means "zero or more".
    /// Zero has no meaning for an option that carries values.
    pub fn from_count(count: i64) -> Result<Self, String> {
        match count {
            n if n < 0 => Ok(Arity::ZeroOrMore),
            0 => Err("an option must accept at least one value".to_string()),
            1 => Ok(Arity::ExactlyOne),
            n => usize::try_from(n)
                .map(Arity::Exactly)
                .map_err(|_| format!("value count {n} is too large")),
        }
    }

    /// True when the parsed result is a list rather than a single value.
    pub fn is_multiple(self) -> bool {
        matches!(self, Arity::ZeroOrMore | Arity::Exactly(_))
    }
}

/// Semantic role a parameter plays in the command's calling convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    RequiredPositional,
    VariadicPositional,
    Option,
    Switch,
}

impl Role {
    pub fn is_positional(self) -> bool {
        matches!(self, Role::RequiredPositional | Role::VariadicPositional)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionalSpec {
    pub default: Option<Value>,
    pub value_type: ValueType,
    pub allowed: Option<Vec<Value>>,
}

impl PositionalSpec {
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn allowed<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Coerces the default and allowed values to the declared type and checks
    /// that a default is one of the allowed values.
    pub fn validate(&self) -> Result<Self, String> {
        let value_type = self.value_type;
        let default = self
            .default
            .as_ref()
            .map(|value| {
                value_type
                    .coerce(value)
                    .map_err(|err| format!("invalid default: {err}"))
            })
            .transpose()?;
        let allowed = self
            .allowed
            .as_ref()
            .map(|values| {
                if values.is_empty() {
                    return Err("allowed values must not be empty".to_string());
                }
                values
                    .iter()
                    .map(|value| {
                        value_type
                            .coerce(value)
                            .map_err(|err| format!("invalid allowed value: {err}"))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        if let (Some(default), Some(allowed)) = (&default, &allowed) {
            if !allowed.contains(default) {
                return Err(format!(
                    "default '{}' is not one of the allowed values",
                    default
                ));
            }
        }
        Ok(Self {
            default,
            value_type,
            allowed,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSpec {
    pub arity: Arity,
    pub alias: Option<char>,
    pub default: Option<Value>,
    pub value_type: ValueType,
    count_error: Option<String>,
}

impl OptionSpec {
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        self.count_error = None;
        self
    }

    /// Numeric shorthand for [`OptionSpec::arity`]; negative means "zero or
    /// more". An invalid count is reported when the command is registered.
    pub fn arg_count(mut self, count: i64) -> Self {
        match Arity::from_count(count) {
            Ok(arity) => {
                self.arity = arity;
                self.count_error = None;
            }
            Err(err) => self.count_error = Some(err),
        }
        self
    }

    pub fn alias(mut self, alias: char) -> Self {
        self.alias = Some(alias);
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// Without a default the option must be given on the command line.
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    pub fn validate(&self) -> Result<Self, String> {
        if let Some(err) = &self.count_error {
            return Err(err.clone());
        }
        if let Arity::Exactly(0) = self.arity {
            return Err("an option must accept at least one value".to_string());
        }
        let value_type = self.value_type;
        let default = match &self.default {
            None => None,
            Some(Value::List(items)) if self.arity.is_multiple() => Some(Value::List(
                items
                    .iter()
                    .map(|item| value_type.coerce(item))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|err| format!("invalid default: {err}"))?,
            )),
            Some(Value::List(_)) => {
                return Err("a list default needs an option that accepts many values".into())
            }
            Some(value) => Some(
                value_type
                    .coerce(value)
                    .map_err(|err| format!("invalid default: {err}"))?,
            ),
        };
        Ok(Self {
            arity: self.arity,
            alias: self.alias,
            default,
            value_type,
            count_error: None,
        })
    }
}

/// A boolean presence flag; always false unless given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchSpec {
    pub alias: Option<char>,
}

impl SwitchSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alias(mut self, alias: char) -> Self {
        self.alias = Some(alias);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParameterSpec {
    Positional(PositionalSpec),
    Option(OptionSpec),
    Switch(SwitchSpec),
}

impl ParameterSpec {
    pub fn alias(&self) -> Option<char> {
        match self {
            ParameterSpec::Positional(_) => None,
            ParameterSpec::Option(spec) => spec.alias,
            ParameterSpec::Switch(spec) => spec.alias,
        }
    }

    /// Returns the normalised spec (defaults coerced to the declared type).
    pub fn validate(&self) -> Result<Self, String> {
        match self {
            ParameterSpec::Positional(spec) => spec.validate().map(ParameterSpec::Positional),
            ParameterSpec::Option(spec) => spec.validate().map(ParameterSpec::Option),
            ParameterSpec::Switch(spec) => Ok(ParameterSpec::Switch(spec.clone())),
        }
    }
}

impl From<PositionalSpec> for ParameterSpec {
    fn from(spec: PositionalSpec) -> Self {
        ParameterSpec::Positional(spec)
    }
}

impl From<OptionSpec> for ParameterSpec {
    fn from(spec: OptionSpec) -> Self {
        ParameterSpec::Option(spec)
    }
}

impl From<SwitchSpec> for ParameterSpec {
    fn from(spec: SwitchSpec) -> Self {
        ParameterSpec::Switch(spec)
    }
}
