//! Parsing and validation of `luma.toml` run configuration files.
//!
//! The configuration file is optional; every field has a default, and CLI
//! flags override file values. Layout:
//!
//! ```toml
//! [sim]
//! reset_cycles = 2
//! randomize = false
//! seed = 0
//!
//! [trace]
//! enabled = true
//! output = "out/luma.vcd"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Errors that can occur when loading or validating a `luma.toml` file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    Validation(String),
}

/// The top-level run configuration parsed from `luma.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct RunConfig {
    /// Simulation settings.
    #[serde(default)]
    pub sim: SimSection,
    /// Waveform tracing settings.
    #[serde(default)]
    pub trace: TraceSection,
}

/// The `[sim]` section.
#[derive(Debug, Deserialize)]
pub struct SimSection {
    /// Clock cycles held in reset before streaming.
    #[serde(default = "default_reset_cycles")]
    pub reset_cycles: u32,
    /// Whether power-on state is filled with pseudo-random values.
    #[serde(default)]
    pub randomize: bool,
    /// Seed for the power-on RNG.
    #[serde(default)]
    pub seed: u64,
}

fn default_reset_cycles() -> u32 {
    2
}

impl Default for SimSection {
    fn default() -> Self {
        Self {
            reset_cycles: default_reset_cycles(),
            randomize: false,
            seed: 0,
        }
    }
}

/// The `[trace]` section.
#[derive(Debug, Default, Deserialize)]
pub struct TraceSection {
    /// Whether waveform recording is on by default.
    #[serde(default)]
    pub enabled: bool,
    /// Waveform output path.
    #[serde(default)]
    pub output: Option<PathBuf>,
}

/// Parses a configuration from TOML text and validates it.
pub fn load_config_from_str(text: &str) -> Result<RunConfig, ConfigError> {
    let config: RunConfig = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}

/// Loads and validates a configuration file.
pub fn load_config(path: &Path) -> Result<RunConfig, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    load_config_from_str(&text)
}

/// Resolves the effective configuration.
///
/// An explicit `--config` path must exist; otherwise `luma.toml` in the
/// current directory is used when present, and built-in defaults when not.
pub fn resolve_config(explicit: Option<&str>) -> Result<RunConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config(Path::new(path));
    }
    let default_path = Path::new("luma.toml");
    if default_path.is_file() {
        return load_config(default_path);
    }
    Ok(RunConfig::default())
}

fn validate(config: &RunConfig) -> Result<(), ConfigError> {
    if config.trace.enabled && config.trace.output.is_none() {
        return Err(ConfigError::Validation(
            "trace.output is required when trace.enabled is set".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_without_file() {
        let config = RunConfig::default();
        assert_eq!(config.sim.reset_cycles, 2);
        assert!(!config.sim.randomize);
        assert_eq!(config.sim.seed, 0);
        assert!(!config.trace.enabled);
        assert!(config.trace.output.is_none());
    }

    #[test]
    fn parse_full_config() {
        let config = load_config_from_str(
            r#"
            [sim]
            reset_cycles = 5
            randomize = true
            seed = 42

            [trace]
            enabled = true
            output = "out/run.vcd"
            "#,
        )
        .unwrap();
        assert_eq!(config.sim.reset_cycles, 5);
        assert!(config.sim.randomize);
        assert_eq!(config.sim.seed, 42);
        assert!(config.trace.enabled);
        assert_eq!(config.trace.output.as_deref(), Some(Path::new("out/run.vcd")));
    }

    #[test]
    fn parse_partial_config_fills_defaults() {
        let config = load_config_from_str(
            r#"
            [sim]
            reset_cycles = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.sim.reset_cycles, 1);
        assert!(!config.sim.randomize);
        assert!(!config.trace.enabled);
    }

    #[test]
    fn parse_empty_config() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.sim.reset_cycles, 2);
    }

    #[test]
    fn parse_error_reported() {
        let err = load_config_from_str("[sim\nreset_cycles = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("failed to parse configuration:"));
    }

    #[test]
    fn trace_enabled_requires_output() {
        let err = load_config_from_str(
            r#"
            [trace]
            enabled = true
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("trace.output"));
    }

    #[test]
    fn load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sim]\nreset_cycles = 7").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.sim.reset_cycles, 7);
    }

    #[test]
    fn missing_explicit_config_errors() {
        let err = resolve_config(Some("/nonexistent/luma.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
