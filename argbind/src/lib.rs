mod app;
mod dispatch;
mod error;
mod grammar;
mod help;
mod inference;
mod registry;
mod spec;
mod value;

pub use crate::app::{App, CommandBuilder, Outcome};
pub use crate::dispatch::{bind, collect_values, dispatch, Context, Invocation, ParsedValues};
pub use crate::error::{BindError, Result};
pub use crate::grammar::{compile, default_placeholder, ArgDecl, Grammar, Parameter, Shape};
pub use crate::help::{CommandListing, HelpFormatter};
pub use crate::inference::{infer, Annotation, ParamKind, SpecKind};
pub use crate::registry::{handler, CommandDescriptor, Handler, ParamDecl, Registry};
pub use crate::spec::{Arity, OptionSpec, ParameterSpec, PositionalSpec, Role, SwitchSpec};
pub use crate::value::{Value, ValueType};

pub use argbind_support as support;
