//! Property tests for binding command lines to invocations.

use std::path::PathBuf;

use argbind::support::AppInfo;
use argbind::{App, Outcome, SpecKind, Value};
use proptest::prelude::*;

fn app() -> App {
    let info = AppInfo {
        progname: "dev".to_string(),
        description: String::new(),
        data_dir: PathBuf::from("unused"),
    };
    let mut app = App::new(info);
    app.command("multiple", "Collect files")
        .arg("name")
        .rest("files")
        .handler(|_, _| Ok(()))
        .expect("register multiple");
    app.command("flags", "Positional plus switch")
        .arg("first")
        .arg("second")
        .param("loud", SpecKind::Switch)
        .handler(|_, _| Ok(()))
        .expect("register flags");
    app
}

/// Tokens that never look like flags.
fn word() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9._]{0,8}"
}

proptest! {
    #[test]
    fn variadic_receives_every_trailing_token_in_order(
        name in word(),
        files in prop::collection::vec(word(), 1..12),
    ) {
        let app = app();
        let mut args = vec!["multiple".to_string(), name.clone()];
        args.extend(files.iter().cloned());

        let Outcome::Dispatched(call) = app.execute(args).expect("dispatch") else {
            panic!("expected dispatch");
        };
        prop_assert_eq!(call.args.len(), files.len() + 1);
        prop_assert_eq!(&call.args[0], &Value::String(name));
        let spliced: Vec<Value> = files.into_iter().map(Value::String).collect();
        prop_assert_eq!(&call.args[1..], spliced.as_slice());
    }

    #[test]
    fn switch_is_true_wherever_it_appears(
        first in word(),
        second in word(),
        position in 0usize..3,
        present in any::<bool>(),
    ) {
        let app = app();
        let mut args = vec![first.clone(), second.clone()];
        if present {
            args.insert(position, "--loud".to_string());
        }
        args.insert(0, "flags".to_string());

        let Outcome::Dispatched(call) = app.execute(args).expect("dispatch") else {
            panic!("expected dispatch");
        };
        prop_assert_eq!(call.flag("loud"), present);
        prop_assert_eq!(call.args, vec![Value::String(first), Value::String(second)]);
    }
}
