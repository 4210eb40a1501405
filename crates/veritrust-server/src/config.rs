//! Server configuration

use crate::cli::Cli;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use veritrust_classifiers::{ModelConfig, ModelSource};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// The single browser origin allowed by CORS
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    /// Review classifier configuration
    #[serde(default)]
    pub model: ModelConfig,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(&cli.config).exists() {
            Self::from_file(&cli.config)?
        } else {
            tracing::debug!("No config file at {}, using defaults", cli.config);
            Self::default()
        };

        config.apply_overrides(cli);
        Ok(config)
    }

    /// Parse a YAML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Apply CLI overrides
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(listen) = &cli.listen {
            self.listen = listen.clone();
        }

        if let Some(port) = cli.port {
            self.port = port;
        }

        if let Some(origin) = &cli.cors_origin {
            self.cors_origin = origin.clone();
        }

        if let Some(path) = &cli.model_path {
            self.model.source = ModelSource::Local { path: path.clone() };
        }
    }

    /// Socket address to bind
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.listen, self.port).parse()?)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            model: ModelConfig::default(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origin() -> String {
    "http://localhost:5173".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.cors_origin, "http://localhost:5173");
        assert_eq!(config.model.max_length, 256);
        assert_eq!(config.socket_addr().unwrap().port(), 8000);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let yaml = r#"
port: 9000
model:
  max_length: 128
"#;
        let config: ServerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.listen, "0.0.0.0");
        assert_eq!(config.model.max_length, 128);
        assert_eq!(config.model.num_labels, 2);
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port: 9000\ncors_origin: http://example.test").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let cli = Cli::parse_from([
            "veritrust-server",
            "--config",
            path.as_str(),
            "--port",
            "9100",
            "--model-path",
            "/srv/models/review-roberta",
        ]);
        let config = ServerConfig::load(&cli).unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(config.cors_origin, "http://example.test");
        assert_eq!(
            config.model.source,
            ModelSource::Local {
                path: PathBuf::from("/srv/models/review-roberta")
            }
        );
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let cli = Cli::parse_from(["veritrust-server", "--config", "/nonexistent/veritrust.yaml"]);
        let config = ServerConfig::load(&cli).unwrap();
        assert_eq!(config.port, 8000);
    }
}
