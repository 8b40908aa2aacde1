use crate::spec::{OptionSpec, ParameterSpec, PositionalSpec, Role, SwitchSpec};

/// Where a parameter sits in the command's signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Regular,
    /// The trailing parameter that collects all remaining positional values.
    Variadic,
}

/// A spec variant named without arguments; instantiating it yields the
/// variant with every field at its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecKind {
    Positional,
    Option,
    Switch,
}

impl SpecKind {
    pub fn instantiate(self) -> ParameterSpec {
        match self {
            SpecKind::Positional => ParameterSpec::Positional(PositionalSpec::new()),
            SpecKind::Option => ParameterSpec::Option(OptionSpec::new()),
            SpecKind::Switch => ParameterSpec::Switch(SwitchSpec::new()),
        }
    }
}

/// What the command author attached to a parameter, if anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Annotation {
    #[default]
    None,
    Spec(ParameterSpec),
    Marker(SpecKind),
}

impl From<ParameterSpec> for Annotation {
    fn from(spec: ParameterSpec) -> Self {
        Annotation::Spec(spec)
    }
}

impl From<PositionalSpec> for Annotation {
    fn from(spec: PositionalSpec) -> Self {
        Annotation::Spec(spec.into())
    }
}

impl From<OptionSpec> for Annotation {
    fn from(spec: OptionSpec) -> Self {
        Annotation::Spec(spec.into())
    }
}

impl From<SwitchSpec> for Annotation {
    fn from(spec: SwitchSpec) -> Self {
        Annotation::Spec(spec.into())
    }
}

impl From<SpecKind> for Annotation {
    fn from(kind: SpecKind) -> Self {
        Annotation::Marker(kind)
    }
}

/// Resolves an annotation to the spec and role it implies.
///
/// Fails when a variadic parameter is annotated as an option or a switch,
/// since only positional values can be collected from the tail of the line.
pub fn infer(annotation: &Annotation, kind: ParamKind) -> Result<(Role, ParameterSpec), String> {
    let spec = match annotation {
        Annotation::None => ParameterSpec::Positional(PositionalSpec::new()),
        Annotation::Spec(spec) => spec.clone(),
        Annotation::Marker(marker) => marker.instantiate(),
    };
    let role = match (&spec, kind) {
        (ParameterSpec::Positional(_), ParamKind::Regular) => Role::RequiredPositional,
        (ParameterSpec::Positional(_), ParamKind::Variadic) => Role::VariadicPositional,
        (ParameterSpec::Option(_), ParamKind::Regular) => Role::Option,
        (ParameterSpec::Switch(_), ParamKind::Regular) => Role::Switch,
        (ParameterSpec::Option(_), ParamKind::Variadic) => {
            return Err("a variadic parameter cannot be an option".to_string())
        }
        (ParameterSpec::Switch(_), ParamKind::Variadic) => {
            return Err("a variadic parameter cannot be a switch".to_string())
        }
    };
    Ok((role, spec))
}
