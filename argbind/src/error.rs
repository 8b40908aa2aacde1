use thiserror::Error;

#[derive(Debug, Error)]
pub enum BindError {
    /// A command was declared with parameters no parser can honour.
    #[error("command '{command}', parameter '{parameter}': {reason}")]
    Configuration {
        command: String,
        parameter: String,
        reason: String,
    },

    /// The command line did not match the command's grammar.
    #[error("{0}")]
    UserInput(#[from] clap::Error),

    #[error("New environment. Please run \"{program} {gate}\" first!")]
    GateNotSatisfied { program: String, gate: String },

    /// The parsed values and the declared parameters disagree.
    #[error("internal error: command '{command}' has no parsed value for parameter '{parameter}'")]
    Internal { command: String, parameter: String },

    /// A gate or storage collaborator failed.
    #[error(transparent)]
    External(anyhow::Error),

    #[error("an application has already been installed for this process")]
    AlreadyInstalled,

    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl BindError {
    pub(crate) fn configuration(
        command: &str,
        parameter: &str,
        reason: impl Into<String>,
    ) -> Self {
        BindError::Configuration {
            command: command.to_string(),
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            BindError::UserInput(err) => err.exit_code(),
            BindError::Configuration { .. }
            | BindError::Internal { .. }
            | BindError::AlreadyInstalled => 70,
            BindError::GateNotSatisfied { .. } | BindError::External(_) | BindError::Handler(_) => 1,
        }
    }
}

pub type Result<T, E = BindError> = std::result::Result<T, E>;
