use pairs_cli::run_with_input;
use serde_json::Value;
use serial_test::serial;
use std::io::{Cursor, Write};

fn cfg() -> (i32, Value) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let mut stdin = Cursor::new(Vec::new());
    let code = run_with_input(["pairs", "cfg"], &mut out, &mut err, &mut stdin);
    let json = serde_json::from_slice(&out).unwrap_or(Value::Null);
    (code, json)
}

fn clear_env() {
    unsafe {
        std::env::remove_var("PAIRS_CONFIG");
        std::env::remove_var("PAIRS_SEED");
        std::env::remove_var("PAIRS_MISMATCH_DELAY_MS");
    }
}

#[test]
#[serial]
fn cfg_shows_defaults() {
    clear_env();
    let (code, json) = cfg();
    assert_eq!(code, 0);
    assert!(json["seed"]["value"].is_null());
    assert_eq!(json["seed"]["source"], "default");
    assert_eq!(json["mismatch_delay_ms"]["value"], 1000);
    assert_eq!(json["mismatch_delay_ms"]["source"], "default");
}

#[test]
#[serial]
fn env_over_file_over_default() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pairs.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "seed = 456\nmismatch_delay_ms = 300").unwrap();
    unsafe {
        std::env::set_var("PAIRS_CONFIG", &path);
    }

    let (code, json) = cfg();
    assert_eq!(code, 0);
    assert_eq!(json["seed"]["value"], 456);
    assert_eq!(json["seed"]["source"], "file");
    assert_eq!(json["mismatch_delay_ms"]["value"], 300);
    assert_eq!(json["mismatch_delay_ms"]["source"], "file");

    unsafe {
        std::env::set_var("PAIRS_SEED", "123");
    }
    let (_, json) = cfg();
    assert_eq!(json["seed"]["value"], 123);
    assert_eq!(json["seed"]["source"], "env");
    assert_eq!(json["mismatch_delay_ms"]["source"], "file");

    // An empty variable does not override.
    unsafe {
        std::env::set_var("PAIRS_MISMATCH_DELAY_MS", "");
    }
    let (_, json) = cfg();
    assert_eq!(json["mismatch_delay_ms"]["value"], 300);

    clear_env();
}

#[test]
#[serial]
fn missing_config_file_is_an_error() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    unsafe {
        std::env::set_var("PAIRS_CONFIG", dir.path().join("absent.toml"));
    }
    let (code, json) = cfg();
    clear_env();

    assert_eq!(code, 2);
    assert!(json.is_null());
}

#[test]
#[serial]
fn deal_uses_configured_seed() {
    clear_env();
    unsafe {
        std::env::set_var("PAIRS_SEED", "4242");
    }
    let mut out = Vec::new();
    let mut err = Vec::new();
    let mut stdin = Cursor::new(Vec::new());
    let code = run_with_input(["pairs", "deal"], &mut out, &mut err, &mut stdin);
    clear_env();

    assert_eq!(code, 0);
    assert!(String::from_utf8(out).unwrap().starts_with("Seed: 4242\n"));
}
