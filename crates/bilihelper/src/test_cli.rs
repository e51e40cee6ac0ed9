use std::time::Duration;

use clap::Parser;
use serde_json::json;

use crate::{
    cli::{Cli, Commands, SettingsCommand},
    settings::parse_value,
};

#[test]
fn run_flags_parse() {
    let cli = Cli::try_parse_from([
        "bilihelper",
        "--debug",
        "run",
        "--page",
        "page.json",
        "--keys",
        "d,Enter,w",
        "--settle",
        "250ms",
        "--config-dir",
        "/tmp/bh",
    ])
    .unwrap();
    assert!(cli.log.debug);
    assert_eq!(cli.config_dir.as_deref(), Some("/tmp/bh".as_ref()));
    let Commands::Run(args) = cli.command else {
        panic!("expected run");
    };
    assert_eq!(args.keys, ["d", "Enter", "w"]);
    assert_eq!(args.settle, Duration::from_millis(250));
    assert_eq!(args.wait, Duration::from_secs(5));
}

#[test]
fn settings_set_takes_key_and_value() {
    let cli =
        Cli::try_parse_from(["bilihelper", "settings", "set", "registerHotKeys", "off"]).unwrap();
    match cli.command {
        Commands::Settings {
            command: SettingsCommand::Set { key, value },
        } => {
            assert_eq!(key, "registerHotKeys");
            assert_eq!(value, "off");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn conflicting_log_flags_are_rejected() {
    assert!(Cli::try_parse_from(["bilihelper", "--trace", "--debug", "settings", "show"]).is_err());
}

#[test]
fn values_are_json_or_plain_strings() {
    assert_eq!(parse_value("off"), json!("off"));
    assert_eq!(parse_value("\"on\""), json!("on"));
    assert_eq!(
        parse_value(r#"[{"type":"giveCoin","keys":["x"]}]"#),
        json!([{"type": "giveCoin", "keys": ["x"]}])
    );
}
