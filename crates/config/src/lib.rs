pub mod schema;

pub use schema::{
    CompensationConfig, CpuSource, DisplayConfig, EnviroConfig, Layout, ModeConfig,
    SchedulerConfig, SensorsConfig,
};

use enviro_core::{EnviroError, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file.  Returns `EnviroConfig::default()` if
/// the file doesn't exist so the station always has sensible defaults.
pub fn load(path: impl AsRef<Path>) -> Result<EnviroConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(EnviroConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| EnviroError::Config(format!("cannot read '{}': {e}", path.display())))?;

    let config: EnviroConfig =
        toml::from_str(&raw).map_err(|e| EnviroError::Config(format!("TOML parse error: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("enviro").join("enviro.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("enviro-config-does-not-exist.toml");
        let config = load(&path).unwrap();
        assert_eq!(config.scheduler.period_secs, 10);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let path = std::env::temp_dir().join(format!("enviro-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "[scheduler\nperiod_secs = ").unwrap();
        let err = load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, EnviroError::Config(_)));
    }
}
