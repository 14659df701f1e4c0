use std::collections::HashMap;

use serde_derive::Deserialize;
use sugars::hmap;

pub const DEFAULT_PROFILE_NAME: &str = "default";

#[derive(Debug, Clone, Deserialize)]
pub struct CoreConfig {
    /// Identifier of the hosted backend project
    pub project_id: String,

    /// Profile used by default when none are specified
    pub default_profile_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConfig {
    /// Type of storage backend (e.g. memory)
    pub storage_type: String,

    // Rest of the backend config as a flexible structure
    #[serde(flatten)]
    pub details: toml::Value,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        ProfileConfig {
            storage_type: "memory".to_owned(),
            details: toml::Value::Table(toml::map::Map::new()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub core: CoreConfig,
    pub profile: HashMap<String, ProfileConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            core: CoreConfig {
                project_id: "local".to_owned(),
                default_profile_name: None,
            },
            profile: hmap! {
                DEFAULT_PROFILE_NAME.to_owned() => ProfileConfig::default()
            },
        }
    }
}

impl Config {
    /// Resolve a profile by name, falling back to the configured default
    /// profile then to "default".
    pub fn resolve_profile(&self, name: Option<&str>) -> eyre::Result<&ProfileConfig> {
        let name = name
            .or(self.core.default_profile_name.as_deref())
            .unwrap_or(DEFAULT_PROFILE_NAME);

        self.profile
            .get(name)
            .ok_or_else(|| eyre::eyre!("profile '{name}' was not found in configuration"))
    }
}
