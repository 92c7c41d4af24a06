//! `pairs cfg`: resolved configuration with value sources.
//!
//! ```json
//! {
//!   "seed": { "value": null, "source": "default" },
//!   "mismatch_delay_ms": { "value": 1000, "source": "default" }
//! }
//! ```

use crate::config;
use crate::error::CliError;
use crate::ui;
use std::io::Write;

pub fn handle_cfg_command(out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    let resolved = match config::load_with_sources() {
        Ok(r) => r,
        Err(e) => {
            ui::write_error(err, &format!("Invalid configuration: {}", e))?;
            return Err(e.into());
        }
    };

    let config::ConfigResolved { config, sources } = resolved;
    let display = serde_json::json!({
        "seed": {
            "value": config.seed,
            "source": sources.seed,
        },
        "mismatch_delay_ms": {
            "value": config.mismatch_delay_ms,
            "source": sources.mismatch_delay_ms,
        }
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn prints_pretty_json_with_sources() {
        unsafe {
            std::env::remove_var(config::CONFIG_ENV);
            std::env::remove_var(config::DELAY_ENV);
            std::env::set_var(config::SEED_ENV, "77");
        }
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = handle_cfg_command(&mut out, &mut err);
        unsafe {
            std::env::remove_var(config::SEED_ENV);
        }

        assert!(result.is_ok());
        let output = String::from_utf8(out).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["seed"]["value"], 77);
        assert_eq!(json["seed"]["source"], "env");
        assert_eq!(json["mismatch_delay_ms"]["value"], 1000);
        assert_eq!(json["mismatch_delay_ms"]["source"], "default");
        assert!(output.contains("\n  "));
        assert!(err.is_empty());
    }

    #[test]
    #[serial]
    fn reports_invalid_configuration_on_stderr() {
        unsafe {
            std::env::remove_var(config::CONFIG_ENV);
            std::env::set_var(config::SEED_ENV, "not-a-number");
        }
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = handle_cfg_command(&mut out, &mut err);
        unsafe {
            std::env::remove_var(config::SEED_ENV);
        }

        assert!(matches!(result, Err(CliError::Config(_))));
        assert!(out.is_empty());
        assert!(String::from_utf8(err).unwrap().contains("Invalid configuration"));
    }
}
