use std::time::Duration;

use serde::Deserialize;

use super::helpers::deserialize_duration_from_millis;

/// Configuration for script compilation and execution.
#[derive(Debug, Deserialize, Clone)]
pub struct ScriptConfig {
    /// Maximum wall-clock time a submitted script may run before it is
    /// cancelled. Applied per execution, on the driver.
    #[serde(
        default = "default_execution_timeout",
        deserialize_with = "deserialize_duration_from_millis"
    )]
    pub execution_timeout: Duration,

    /// Whether compiled units carry their submission name as debug metadata.
    /// When enabled, runtime error positions are attributed to the submission
    /// that produced them. Disabled by default.
    #[serde(default)]
    pub debug_info: bool,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self { execution_timeout: default_execution_timeout(), debug_info: false }
    }
}

/// Default value for execution timeout.
fn default_execution_timeout() -> Duration {
    Duration::from_millis(10_000)
}

#[cfg(test)]
mod tests {
    use config::Config;

    use super::*;

    #[test]
    fn test_script_config_default() {
        let config = ScriptConfig::default();
        assert_eq!(config.execution_timeout, Duration::from_millis(10_000));
        assert!(!config.debug_info);
    }

    #[test]
    fn test_script_config_custom_values_yaml() {
        let yaml = "
            execution_timeout: 3000
            debug_info: true
        ";

        let builder =
            Config::builder().add_source(config::File::from_str(yaml, config::FileFormat::Yaml));
        let config: ScriptConfig = builder.build().unwrap().try_deserialize().unwrap();

        assert_eq!(config.execution_timeout, Duration::from_millis(3_000));
        assert!(config.debug_info);
    }

    #[test]
    fn test_script_config_partial_yaml_uses_defaults() {
        let yaml = "execution_timeout: 7500";

        let builder =
            Config::builder().add_source(config::File::from_str(yaml, config::FileFormat::Yaml));
        let config: ScriptConfig = builder.build().unwrap().try_deserialize().unwrap();

        assert_eq!(config.execution_timeout, Duration::from_millis(7_500));
        assert!(!config.debug_info); // Should use default
    }
}
