use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use argbind::support::AppInfo;
use argbind::{
    App, BindError, Invocation, OptionSpec, Outcome, PositionalSpec, SpecKind, SwitchSpec, Value,
    ValueType,
};
use clap::error::ErrorKind;
use tempfile::tempdir;

fn info(data_dir: &Path) -> AppInfo {
    AppInfo {
        progname: "dev".to_string(),
        description: String::new(),
        data_dir: data_dir.to_path_buf(),
    }
}

type Calls = Arc<Mutex<Vec<Invocation>>>;

fn demo_app(data_dir: &Path) -> Result<(App, Calls)> {
    let calls: Calls = Arc::default();
    let mut app = App::new(info(data_dir));

    let seen = Arc::clone(&calls);
    app.command("normal", "A nice command")
        .option("what", OptionSpec::new())
        .param("should", SpecKind::Switch)
        .handler(move |call, _| {
            seen.lock().unwrap().push(call.clone());
            Ok(())
        })?;

    let seen = Arc::clone(&calls);
    app.command("multiple", "An even nicer command")
        .arg("name")
        .rest("files")
        .handler(move |call, _| {
            seen.lock().unwrap().push(call.clone());
            Ok(())
        })?;

    let seen = Arc::clone(&calls);
    app.command("add", "A numbery command")
        .param("a", PositionalSpec::new().value_type(ValueType::Int))
        .param("b", PositionalSpec::new().value_type(ValueType::Int))
        .handler(move |call, _| {
            seen.lock().unwrap().push(call.clone());
            Ok(())
        })?;

    Ok((app, calls))
}

fn dispatched(outcome: Outcome) -> Invocation {
    match outcome {
        Outcome::Dispatched(invocation) => invocation,
        Outcome::Help(text) => panic!("expected a dispatch, got help:\n{text}"),
    }
}

#[test]
fn add_binds_integers_positionally() -> Result<()> {
    let tmp = tempdir()?;
    let (app, calls) = demo_app(tmp.path())?;
    let call = dispatched(app.execute(["add", "2", "3"])?);
    assert_eq!(call.args, vec![Value::Int(2), Value::Int(3)]);
    assert!(call.kwargs.is_empty());
    assert_eq!(calls.lock().unwrap().as_slice(), &[call]);
    Ok(())
}

#[test]
fn normal_binds_option_and_switch_as_keywords() -> Result<()> {
    let tmp = tempdir()?;
    let (app, _) = demo_app(tmp.path())?;

    let call = dispatched(app.execute(["normal", "--what", "hello", "--should"])?);
    assert!(call.args.is_empty());
    assert_eq!(call.kwarg("what"), Some(&Value::from("hello")));
    assert_eq!(call.kwarg("should"), Some(&Value::Bool(true)));

    let call = dispatched(app.execute(["normal", "--what", "hello"])?);
    assert_eq!(call.kwarg("what"), Some(&Value::from("hello")));
    assert_eq!(call.kwarg("should"), Some(&Value::Bool(false)));
    Ok(())
}

#[test]
fn keyword_order_follows_the_declaration() -> Result<()> {
    let tmp = tempdir()?;
    let (app, _) = demo_app(tmp.path())?;
    let call = dispatched(app.execute(["normal", "--should", "--what", "hi"])?);
    let names: Vec<_> = call.kwargs.keys().cloned().collect();
    assert_eq!(names, vec!["what".to_string(), "should".to_string()]);
    Ok(())
}

#[test]
fn multiple_splices_the_variadic_values() -> Result<()> {
    let tmp = tempdir()?;
    let (app, _) = demo_app(tmp.path())?;
    let call = dispatched(app.execute(["multiple", "bob", "a.txt", "b.txt"])?);
    assert_eq!(
        call.args,
        vec![Value::from("bob"), Value::from("a.txt"), Value::from("b.txt")]
    );
    Ok(())
}

#[test]
fn no_tokens_prints_the_listing_without_dispatching() -> Result<()> {
    let tmp = tempdir()?;
    let (app, calls) = demo_app(tmp.path())?;
    let outcome = app.execute(Vec::<String>::new())?;
    assert_eq!(
        outcome,
        Outcome::Help(
            "Available sub-commands:\n  normal - A nice command\n  multiple - An even nicer command\n  add - A numbery command\nPass -h or --help to a sub-command to learn more"
                .to_string()
        )
    );
    assert!(calls.lock().unwrap().is_empty());
    Ok(())
}

#[test]
fn unknown_commands_and_help_flags_show_the_listing() -> Result<()> {
    let tmp = tempdir()?;
    let (app, calls) = demo_app(tmp.path())?;
    for args in [vec!["frobnicate"], vec!["--help"], vec!["-h"]] {
        match app.execute(args)? {
            Outcome::Help(text) => assert!(text.starts_with("Available sub-commands:")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
    assert!(calls.lock().unwrap().is_empty());
    Ok(())
}

#[test]
fn command_help_comes_from_the_grammar() -> Result<()> {
    let tmp = tempdir()?;
    let (app, calls) = demo_app(tmp.path())?;
    let Outcome::Help(text) = app.execute(["multiple", "--help"])? else {
        panic!("expected help output");
    };
    assert!(text.contains("An even nicer command"));
    assert!(text.contains("dev multiple"));
    assert!(text.contains("(Multiple arguments)"));
    assert!(calls.lock().unwrap().is_empty());
    Ok(())
}

#[test]
fn parse_errors_surface_as_user_input_errors() -> Result<()> {
    let tmp = tempdir()?;
    let (app, calls) = demo_app(tmp.path())?;

    let err = app.execute(["add", "2", "three"]).unwrap_err();
    assert!(matches!(&err, BindError::UserInput(e) if e.kind() == ErrorKind::ValueValidation));
    assert_eq!(err.exit_code(), 2);

    let err = app.execute(["normal", "--should"]).unwrap_err();
    assert!(
        matches!(&err, BindError::UserInput(e) if e.kind() == ErrorKind::MissingRequiredArgument)
    );

    let err = app.execute(["multiple", "bob"]).unwrap_err();
    assert!(matches!(err, BindError::UserInput(_)));

    assert!(calls.lock().unwrap().is_empty());
    Ok(())
}

#[test]
fn allowed_values_are_enforced_before_dispatch() -> Result<()> {
    let tmp = tempdir()?;
    let called = Arc::new(Mutex::new(false));
    let mut app = App::new(info(tmp.path()));
    let flag = Arc::clone(&called);
    app.command("pick", "Pick one")
        .param("choice", PositionalSpec::new().allowed(["A", "B"]))
        .handler(move |_, _| {
            *flag.lock().unwrap() = true;
            Ok(())
        })?;

    let err = app.execute(["pick", "C"]).unwrap_err();
    assert!(matches!(&err, BindError::UserInput(e) if e.kind() == ErrorKind::InvalidValue));
    assert!(!*called.lock().unwrap());

    dispatched(app.execute(["pick", "A"])?);
    assert!(*called.lock().unwrap());
    Ok(())
}

#[test]
fn option_aliases_defaults_and_repeats() -> Result<()> {
    let tmp = tempdir()?;
    let mut app = App::new(info(tmp.path()));
    app.command("build", "Build things")
        .option(
            "jobs",
            OptionSpec::new()
                .alias('j')
                .value_type(ValueType::Int)
                .default(4_i64),
        )
        .option("tag", OptionSpec::new().arg_count(-1).default(Vec::<String>::new()))
        .param("verbose", SwitchSpec::new().alias('v'))
        .handler(|_, _| Ok(()))?;

    let call = dispatched(app.execute(["build"])?);
    assert_eq!(call.kwarg("jobs"), Some(&Value::Int(4)));
    assert_eq!(call.kwarg("tag"), Some(&Value::List(Vec::new())));
    assert!(!call.flag("verbose"));

    let call = dispatched(app.execute(["build", "-j", "8", "--tag", "a", "b", "--tag", "c", "-v"])?);
    assert_eq!(call.kwarg("jobs"), Some(&Value::Int(8)));
    assert_eq!(call.kwarg("tag"), Some(&Value::from(vec!["a", "b", "c"])));
    assert!(call.flag("verbose"));

    let Outcome::Help(text) = app.execute(["build", "-h"])? else {
        panic!("expected help output");
    };
    assert!(text.contains("JOBS (default: 4)"));
    Ok(())
}

#[test]
fn handler_failures_are_reported_as_handler_errors() -> Result<()> {
    let tmp = tempdir()?;
    let mut app = App::new(info(tmp.path()));
    app.command("fail", "Always fails")
        .handler(|_, _| Err(anyhow::anyhow!("disk on fire")))?;
    let err = app.execute(["fail"]).unwrap_err();
    assert!(matches!(err, BindError::Handler(_)));
    assert_eq!(err.to_string(), "disk on fire");
    assert_eq!(err.exit_code(), 1);
    Ok(())
}

#[test]
fn negative_numbers_are_values_not_flags() -> Result<()> {
    let tmp = tempdir()?;
    let (app, _) = demo_app(tmp.path())?;
    let call = dispatched(app.execute(["add", "-2", "3"])?);
    assert_eq!(call.args, vec![Value::Int(-2), Value::Int(3)]);

    let call = dispatched(app.execute(["add", "4", "-10"])?);
    assert_eq!(call.args, vec![Value::Int(4), Value::Int(-10)]);
    Ok(())
}

#[test]
fn nil_defaults_bind_nil_when_the_option_is_absent() -> Result<()> {
    let tmp = tempdir()?;
    let mut app = App::new(info(tmp.path()));
    app.command("n", "Optional options")
        .option("what", OptionSpec::new().default(Value::Nil))
        .option(
            "count",
            OptionSpec::new().value_type(ValueType::Int).default(Value::Nil),
        )
        .handler(|_, _| Ok(()))?;

    let call = dispatched(app.execute(["n"])?);
    assert_eq!(call.kwarg("what"), Some(&Value::Nil));
    assert_eq!(call.kwarg("count"), Some(&Value::Nil));

    let call = dispatched(app.execute(["n", "--what", "hi", "--count", "3"])?);
    assert_eq!(call.kwarg("what"), Some(&Value::from("hi")));
    assert_eq!(call.kwarg("count"), Some(&Value::Int(3)));
    Ok(())
}
