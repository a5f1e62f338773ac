// Application state module
// Holds everything handlers need, built once at startup and shared read-only

use super::types::Config;
use crate::files::FileDirectory;
use crate::relay::{RelayClient, RelayError};

/// Application state
pub struct AppState {
    pub config: Config,
    pub directory: FileDirectory,
    pub relay: RelayClient,
}

impl AppState {
    /// Build state from a loaded configuration
    pub fn new(config: &Config) -> Result<Self, RelayError> {
        let relay = RelayClient::new(&config.relay)?;

        Ok(Self {
            config: config.clone(),
            directory: FileDirectory::new(&config.files.root_dir),
            relay,
        })
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_log_follows_config() {
        let mut cfg = Config::with_defaults().unwrap();
        assert!(AppState::new(&cfg).unwrap().access_log_enabled());

        cfg.logging.access_log = false;
        assert!(!AppState::new(&cfg).unwrap().access_log_enabled());
    }
}
