use super::Config;
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::Path;

impl Config {
    /// Load `~/.ghostpost/config.toml`, writing a default one on first run.
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let ghostpost_dir = home.join(".ghostpost");
        let config_path = ghostpost_dir.join("config.toml");

        if !ghostpost_dir.exists() {
            fs::create_dir_all(&ghostpost_dir).context("Failed to create .ghostpost directory")?;
        }

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self {
                config_path: config_path.clone(),
                ..Self::default()
            };
            config.validate()?;
            config.save()?;
            Ok(config)
        }
    }

    /// Load an explicit config file. A missing file yields defaults and is
    /// not created.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self {
                config_path: path.to_path_buf(),
                ..Self::default()
            });
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.config_path = path.to_path_buf();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}
