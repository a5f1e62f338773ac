// Configuration module entry point
// Loads application configuration and builds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, FilesConfig, HttpConfig, LoggingConfig, PerformanceConfig, RelayConfig, ServerConfig,
};

/// Environment variable prefix, e.g. `FILEDROP_RELAY__API_KEY`
const ENV_PREFIX: &str = "FILEDROP";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = Self::defaults(
            config::Config::builder()
                .add_source(config::File::with_name(config_path).required(false))
                .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__")),
        )?
        .build()?;

        settings.try_deserialize()
    }

    /// Built-in configuration with no file or environment overrides
    pub fn with_defaults() -> Result<Self, config::ConfigError> {
        Self::defaults(config::Config::builder())?
            .build()?
            .try_deserialize()
    }

    fn defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "filedrop/0.1")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("http.greeting", "Hello, Allord!")?
            .set_default("files.root_dir", "files")?
            .set_default("relay.api_url", "https://app.ayrshare.com/api/post")?
            .set_default("relay.api_key", "")?
            .set_default("relay.timeout_secs", 30)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::LogLevel;

    #[test]
    fn test_defaults() {
        let cfg = Config::with_defaults().unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.files.root_dir, "files");
        assert_eq!(cfg.http.greeting, "Hello, Allord!");
        assert_eq!(cfg.relay.api_url, "https://app.ayrshare.com/api/post");
        assert!(cfg.relay.api_key.is_empty());
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.performance.max_connections.is_none());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9090\n\n[files]\nroot_dir = \"/srv/share\"\n\n[relay]\napi_key = \"secret\"\n",
        )
        .unwrap();

        let stem = dir.path().join("custom");
        let cfg = Config::load_from(stem.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.files.root_dir, "/srv/share");
        assert_eq!(cfg.relay.api_key, "secret");
    }

    #[test]
    fn test_log_level_from_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("quiet.toml"), "[logging]\nlevel = \"warning\"\n").unwrap();
        std::fs::write(dir.path().join("bogus.toml"), "[logging]\nlevel = \"loud\"\n").unwrap();

        let quiet = Config::load_from(dir.path().join("quiet").to_str().unwrap()).unwrap();
        assert_eq!(quiet.logging.level, LogLevel::Warn);
        assert_eq!(Config::with_defaults().unwrap().logging.level, LogLevel::Info);
        assert!(Config::load_from(dir.path().join("bogus").to_str().unwrap()).is_err());
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::with_defaults().unwrap();
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 8080);
        cfg.server.host = "not an ip".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
