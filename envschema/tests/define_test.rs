//! Fatal facade tests
//!
//! `define_env` exits the process, so each test re-runs this test binary
//! filtered to itself, with a guard variable selecting the child branch.

#![cfg(feature = "expr")]

use envschema::{define_env, ColorChoice, EnvSnapshot, Loader, Schema};
use std::env;
use std::process::{Command, Output};

const CHILD_GUARD: &str = "ENVSCHEMA_DEFINE_CHILD";

fn is_child() -> bool {
    env::var_os(CHILD_GUARD).is_some()
}

fn run_child(test_name: &str, vars: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env::current_exe().unwrap());
    command
        .args([test_name, "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_GUARD, "1")
        .env("NO_COLOR", "1")
        .env_remove("CLICOLOR_FORCE")
        .env_remove("DEFINE_DATABASE_URL")
        .env_remove("DEFINE_PORT");
    for (key, value) in vars {
        command.env(key, value);
    }
    command.output().unwrap()
}

fn schema() -> Schema {
    Schema::builder()
        .field("DEFINE_DATABASE_URL", "string.url")
        .field("DEFINE_PORT", "number.port")
        .build()
        .unwrap()
}

#[test]
fn test_define_env_exits_with_report() {
    if is_child() {
        define_env(&schema());
        return;
    }

    let output = run_child("test_define_env_exits_with_report", &[("DEFINE_PORT", "70000")]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1), "stderr: {stderr}");
    assert!(stderr.contains("Errors found while validating environment variables:\n"));
    assert!(stderr.contains("  DEFINE_DATABASE_URL must be a URL (was missing)\n"));
    assert!(stderr.contains("  DEFINE_PORT must be an integer between 0 and 65535 (was 70000)\n"));
}

#[test]
fn test_define_env_continues_on_valid_environment() {
    if is_child() {
        let record = define_env(&schema());
        assert_eq!(record.get_i64("DEFINE_PORT"), Some(5432));
        return;
    }

    let output = run_child(
        "test_define_env_continues_on_valid_environment",
        &[
            ("DEFINE_DATABASE_URL", "postgres://db/app"),
            ("DEFINE_PORT", "5432"),
        ],
    );
    assert!(output.status.success());
    assert!(!String::from_utf8_lossy(&output.stderr).contains("Errors found"));
}

#[test]
fn test_define_exits_on_realization_error() {
    if is_child() {
        let schema = Schema::builder()
            .field("DEFINE_PORT", "number.prt")
            .build()
            .unwrap();
        let env: EnvSnapshot = [("DEFINE_PORT", "80")].into_iter().collect();
        Loader::new(&schema).color(ColorChoice::Never).define(&env);
        return;
    }

    let output = run_child("test_define_exits_on_realization_error", &[]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1), "stderr: {stderr}");
    assert!(stderr.contains("number.prt"), "stderr: {stderr}");
}
