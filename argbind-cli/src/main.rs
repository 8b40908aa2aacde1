use std::process::ExitCode;

use anyhow::{anyhow, Context as _, Result};
use argbind::{App, Arity, OptionSpec, PositionalSpec, SpecKind, SwitchSpec, Value, ValueType};
use argbind_support::AppInfo;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "ARGBIND_LOG";

fn main() -> ExitCode {
    if let Err(err) = init_tracing() {
        eprintln!("warning: {err:#}");
    }
    let app = match build_app().and_then(|app| app.install().map_err(Into::into)) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::from(70);
        }
    };
    app.run()
}

/// Logs go to stderr; the filter comes from `ARGBIND_LOG` and defaults to
/// warnings only.
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize tracing subscriber: {e}"))
}

fn build_app() -> Result<App> {
    let info = AppInfo::from_env()?.with_description("Example commands bound from declarations.");
    let mut app = App::new(info);

    app.command("setup", "Prepare the environment (run once)")
        .gated()
        .handler(|_, ctx| {
            ctx.info
                .ensure_dirs()
                .context("failed to prepare the data directory")?;
            ctx.values.ask("editor", ctx.prompt, "Preferred editor")?;
            println!("Environment ready in {}", ctx.info.data_dir.display());
            Ok(())
        })?;

    app.command("normal", "A nice command")
        .option("what", OptionSpec::new())
        .switch("should")
        .handler(|call, _| {
            if call.flag("should") {
                println!("{}", call.kwarg("what").unwrap_or(&Value::Nil));
            }
            Ok(())
        })?;

    app.command("multiple", "An even nicer command")
        .arg("name")
        .rest("files")
        .handler(|call, _| {
            let name = call.arg(0).unwrap_or(&Value::Nil);
            println!("{} {}", name, call.args.len().saturating_sub(1));
            Ok(())
        })?;

    app.command("add", "A numbery command")
        .param("a", PositionalSpec::new().value_type(ValueType::Int))
        .param("b", PositionalSpec::new().value_type(ValueType::Int))
        .handler(|call, _| {
            let (Some(a), Some(b)) = (call.int_arg(0), call.int_arg(1)) else {
                return Err(anyhow!("add expects two integers"));
            };
            let sum = a
                .checked_add(b)
                .ok_or_else(|| anyhow!("{a} + {b} overflows"))?;
            println!("{sum}");
            Ok(())
        })?;

    app.command("remember", "Save, show or forget a setting")
        .arg("key")
        .param(
            "action",
            PositionalSpec::new()
                .allowed(["show", "set", "forget"])
                .default("show"),
        )
        .option("value", OptionSpec::new().alias('v').default(""))
        .param("ask", SwitchSpec::new().alias('a'))
        .handler(|call, ctx| {
            let key = call.str_arg(0).unwrap_or_default();
            match call.str_arg(1).unwrap_or("show") {
                "set" => {
                    let given = call.kwarg("value").and_then(Value::as_str).unwrap_or("");
                    let value = if !given.is_empty() {
                        given.to_string()
                    } else if call.flag("ask") {
                        ctx.prompt.ask_text(&format!("Value for {key}"), "", &[])?
                    } else {
                        return Err(anyhow!("pass --value or --ask to set '{key}'"));
                    };
                    ctx.values.save(key, &value)?;
                }
                "forget" => ctx.values.remove(key)?,
                _ => {
                    let value: Option<String> = ctx.values.load(key)?;
                    match value {
                        Some(value) => println!("{key} = {value}"),
                        None => println!("{key} is not set"),
                    }
                }
            }
            Ok(())
        })?;

    app.command("greet", "Say hello a number of times")
        .param("name", PositionalSpec::new().default("world"))
        .option(
            "times",
            OptionSpec::new()
                .alias('t')
                .arity(Arity::ExactlyOne)
                .value_type(ValueType::Int)
                .default(1_i64),
        )
        .param("shout", SpecKind::Switch)
        .handler(|call, _| {
            let name = call.str_arg(0).unwrap_or("world");
            let times = call.kwarg("times").and_then(Value::as_int).unwrap_or(1);
            let mut line = format!("hello, {name}");
            if call.flag("shout") {
                line = line.to_uppercase();
            }
            for _ in 0..times.max(0) {
                println!("{line}");
            }
            Ok(())
        })?;

    tracing::debug!(commands = app.registry().len(), "commands registered");
    Ok(app)
}
