//! Configuration loading from disk and command-line overrides.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Values supplied on the command line or through the environment.
///
/// These win over the file so a single image can be pointed at different
/// targets per deployment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind_address: Option<String>,
    pub bucket: Option<String>,
    pub queue_url: Option<String>,
}

/// Parse configuration from a TOML string without validating it.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Read the optional config file, apply overrides and validate the result.
pub fn load_config(
    path: Option<&Path>,
    overrides: &Overrides,
) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => GatewayConfig::default(),
    };

    apply_overrides(&mut config, overrides);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn apply_overrides(config: &mut GatewayConfig, overrides: &Overrides) {
    if let Some(bind_address) = &overrides.bind_address {
        config.listener.bind_address = bind_address.clone();
    }
    if let Some(bucket) = &overrides.bucket {
        config.storage.bucket = bucket.clone();
    }
    if let Some(queue_url) = &overrides.queue_url {
        config.queue.queue_url = queue_url.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win_over_file_values() {
        let mut config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:3000"

            [storage]
            bucket = "from-file"
            "#,
        )
        .unwrap();

        apply_overrides(
            &mut config,
            &Overrides {
                bind_address: None,
                bucket: Some("from-cli".into()),
                queue_url: Some("https://queue.example/q".into()),
            },
        );

        assert_eq!(config.listener.bind_address, "127.0.0.1:3000");
        assert_eq!(config.storage.bucket, "from-cli");
        assert_eq!(config.queue.queue_url, "https://queue.example/q");
    }

    #[test]
    fn load_without_file_validates_overrides() {
        let overrides = Overrides {
            bind_address: Some("127.0.0.1:0".into()),
            bucket: Some("captures".into()),
            queue_url: Some("https://queue.example/q".into()),
        };
        let config = load_config(None, &overrides).unwrap();
        assert_eq!(config.storage.bucket, "captures");

        let err = load_config(None, &Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("storage.bucket is required"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(
            Some(Path::new("/definitely/not/here.toml")),
            &Overrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
