//! Top-level run control: pick a command from the first token, let the
//! parser consume the rest, and dispatch.

use std::env;
use std::process::ExitCode;
use std::sync::OnceLock;

use argbind_support::{banner, AppInfo, GateStore, LockDir, Prompt, TerminalPrompt, ValueStore};
use clap::error::ErrorKind;

use crate::dispatch::{collect_values, dispatch, Context, Invocation};
use crate::error::{BindError, Result};
use crate::help::{CommandListing, HelpFormatter};
use crate::inference::{Annotation, SpecKind};
use crate::registry::{handler, ParamDecl, Registry};
use crate::spec::OptionSpec;

static INSTALLED: OnceLock<App> = OnceLock::new();

/// How an invocation ended when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Help text to print; no command ran.
    Help(String),
    Dispatched(Invocation),
}

pub struct App {
    info: AppInfo,
    registry: Registry,
    help: Box<dyn HelpFormatter>,
    gates: Box<dyn GateStore + Send + Sync>,
    values: ValueStore,
    prompt: Box<dyn Prompt + Send + Sync>,
}

impl App {
    /// Gate markers and persisted values live under `info.data_dir`; prompts
    /// use the terminal.
    pub fn new(info: AppInfo) -> Self {
        let gates = LockDir::new(info.locks_dir());
        let values = ValueStore::new(info.vars_dir());
        Self {
            info,
            registry: Registry::new(),
            help: Box::new(CommandListing),
            gates: Box::new(gates),
            values,
            prompt: Box::new(TerminalPrompt::stdio()),
        }
    }

    pub fn with_help_formatter(mut self, help: impl HelpFormatter + 'static) -> Self {
        self.help = Box::new(help);
        self
    }

    pub fn with_gate_store(mut self, gates: impl GateStore + Send + Sync + 'static) -> Self {
        self.gates = Box::new(gates);
        self
    }

    pub fn with_prompt(mut self, prompt: impl Prompt + Send + Sync + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    pub fn info(&self) -> &AppInfo {
        &self.info
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Starts declaring a command; [`CommandBuilder::handler`] registers it.
    pub fn command(&mut self, name: &str, description: &str) -> CommandBuilder<'_> {
        CommandBuilder {
            registry: &mut self.registry,
            name: name.to_string(),
            description: description.to_string(),
            params: Vec::new(),
            gated: false,
        }
    }

    /// Makes this application the process-wide one. Registration is over
    /// once it is installed: the registry can no longer be reached mutably.
    pub fn install(self) -> Result<&'static App> {
        let mut fresh = false;
        let app = INSTALLED.get_or_init(|| {
            fresh = true;
            self
        });
        if fresh {
            Ok(app)
        } else {
            Err(BindError::AlreadyInstalled)
        }
    }

    pub fn installed() -> Option<&'static App> {
        INSTALLED.get()
    }

    pub fn global_help(&self) -> String {
        let commands: Vec<(&str, &str)> = self.registry.list_all().collect();
        self.help.global_help(&self.info, &commands)
    }

    pub fn context(&self) -> Context<'_> {
        Context {
            info: &self.info,
            gates: self.gates.as_ref(),
            values: &self.values,
            prompt: self.prompt.as_ref(),
        }
    }

    /// Runs one invocation. `args` excludes the program name.
    pub fn execute<I, T>(&self, args: I) -> Result<Outcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        self.check_gates(&args)?;

        let Some(command) = args.first().and_then(|first| self.registry.lookup(first)) else {
            return Ok(Outcome::Help(self.global_help()));
        };

        let parser = command
            .grammar()
            .to_command(&command.name, &command.description)
            .bin_name(format!("{} {}", self.info.progname, command.name));
        let matches = match parser.try_get_matches_from(&args) {
            Ok(matches) => matches,
            Err(err) if err.kind() == ErrorKind::DisplayHelp => {
                return Ok(Outcome::Help(err.render().to_string()))
            }
            Err(err) => return Err(BindError::UserInput(err)),
        };
        let parsed = collect_values(command.grammar(), &matches);

        if command.is_gated() {
            banner::print_title();
        }
        let invocation = dispatch(command, &parsed, &self.context())?;
        if command.is_gated() {
            self.gates
                .mark_satisfied(&command.name)
                .map_err(BindError::External)?;
        }
        Ok(Outcome::Dispatched(invocation))
    }

    /// While a gate is unsatisfied only the gate command itself and help
    /// requests may run.
    fn check_gates(&self, args: &[String]) -> Result<()> {
        let Some(first) = args.first() else {
            return Ok(());
        };
        if args.iter().any(|arg| arg == "-h" || arg == "--help") {
            return Ok(());
        }
        for gate in self.registry.gates() {
            if first == gate {
                continue;
            }
            if !self.gates.is_satisfied(gate).map_err(BindError::External)? {
                tracing::debug!(gate, "refusing to dispatch before setup");
                return Err(BindError::GateNotSatisfied {
                    program: self.info.progname.clone(),
                    gate: gate.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Runs with the process arguments and reports the result.
    pub fn run(&self) -> ExitCode {
        let args = env::args_os()
            .skip(1)
            .map(|arg| arg.to_string_lossy().into_owned());
        self.run_with(args)
    }

    pub fn run_with<I, T>(&self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        match self.execute(args) {
            Ok(Outcome::Help(text)) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Ok(Outcome::Dispatched(_)) => ExitCode::SUCCESS,
            Err(err) => report(err),
        }
    }
}

fn report(err: BindError) -> ExitCode {
    let code = u8::try_from(err.exit_code()).unwrap_or(1);
    match &err {
        BindError::UserInput(parse_error) => {
            if parse_error.print().is_err() {
                eprintln!("{parse_error}");
            }
        }
        BindError::GateNotSatisfied { .. } => println!("{err}"),
        BindError::Configuration { .. }
        | BindError::Internal { .. }
        | BindError::AlreadyInstalled => {
            tracing::error!(error = %err, "invariant violated");
            eprintln!("{err}");
        }
        BindError::External(_) | BindError::Handler(_) => eprintln!("error: {err:#}"),
    }
    ExitCode::from(code)
}

/// Declares one command's parameters in signature order.
pub struct CommandBuilder<'a> {
    registry: &'a mut Registry,
    name: String,
    description: String,
    params: Vec<ParamDecl>,
    gated: bool,
}

impl<'a> CommandBuilder<'a> {
    /// An unannotated parameter: a required string positional.
    pub fn arg(self, name: &str) -> Self {
        self.param(name, Annotation::None)
    }

    pub fn param(mut self, name: &str, annotation: impl Into<Annotation>) -> Self {
        self.params.push(ParamDecl::new(name, annotation));
        self
    }

    /// The trailing parameter collecting every remaining positional value.
    pub fn rest(self, name: &str) -> Self {
        self.rest_as(name, Annotation::None)
    }

    pub fn rest_as(mut self, name: &str, annotation: impl Into<Annotation>) -> Self {
        self.params.push(ParamDecl::variadic(name, annotation));
        self
    }

    pub fn option(self, name: &str, spec: OptionSpec) -> Self {
        self.param(name, spec)
    }

    pub fn switch(self, name: &str) -> Self {
        self.param(name, SpecKind::Switch)
    }

    /// Marks this as the one-time setup command.
    pub fn gated(mut self) -> Self {
        self.gated = true;
        self
    }

    pub fn handler<F>(self, f: F) -> Result<()>
    where
        F: Fn(&Invocation, &Context<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let handler = handler(f);
        if self.gated {
            self.registry
                .register_gated(&self.name, &self.description, &self.params, handler)
        } else {
            self.registry
                .register(&self.name, &self.description, &self.params, handler)
        }
    }
}
