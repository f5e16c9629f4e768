//! Standard paths used by chiketto

use std::path::PathBuf;

/// Standard chiketto paths
pub struct Paths {
    /// Config directory (~/.config/chiketto)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("chiketto");

        Self { config }
    }

    /// Get the default config file path
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }
}
