//! Very basic functionality to read and write some configuration into a toml configuration file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConfigToml {
    /// Name of the sentinel file that, once created on disk, tells a running
    /// enumeration to stop cleanly at the next checkpoint and write a stack
    /// snapshot (SPEC_FULL.md §6, "Environment").
    #[serde(default = "default_stop_filename")]
    stop_filename: String,

    /// Directory the witness/outcome logs and stack snapshot are written to.
    #[serde(default = "default_out_dir")]
    out_dir: String,

    /// Locale used to format large numbers in progress/report output.
    #[serde(default = "default_locale")]
    locale: String,
}

impl ConfigToml {
    pub fn read_toml() -> ConfigToml {
        if Path::new(CONFIG_FILE).exists() {
            let config_content = fs::read_to_string(CONFIG_FILE)
                .expect("Config file {CONFIG_FILE} could not be read.");
            let config: ConfigToml = toml::from_str(&config_content)
                .expect("Config file {CONFIG_FILE} could not be parsed.");
            config
        } else {
            println!(
                "Config file {CONFIG_FILE} not found, creating a new one with default values."
            );
            let default_config = ConfigToml::default();
            let toml_string = toml::to_string_pretty(&default_config)
                .expect("Failed to serialize default config");
            let write_result = fs::write(CONFIG_FILE, toml_string);
            if write_result.is_err() {
                println!(
                    "ERROR: Config file {CONFIG_FILE} was not found and could not be written. Using default values, some functionality might not be available."
                );
            }
            default_config
        }
    }

    pub fn stop_filename(&self) -> &str {
        &self.stop_filename
    }

    pub fn out_dir(&self) -> &str {
        &self.out_dir
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }
}

impl Default for ConfigToml {
    fn default() -> Self {
        ConfigToml {
            stop_filename: default_stop_filename(),
            out_dir: default_out_dir(),
            locale: default_locale(),
        }
    }
}

fn default_stop_filename() -> String {
    "stop.enumeration".to_string()
}

fn default_out_dir() -> String {
    ".".to_string()
}

fn default_locale() -> String {
    "en".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_toml_has_sentinel_filename() {
        let config = ConfigToml::default();
        assert_eq!(config.stop_filename(), "stop.enumeration");
    }
}
