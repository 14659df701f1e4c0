use std::str::FromStr;

use doable_config::{Config, ProfileConfig};
use doable_storage::backend::{MemIdentity, MemStorageConfig};
use doable_storage::{BuiltinStorageType, IdentityBox, StorageBox, StorageConfig};

use crate::Core;

/// Build a core from a configuration file. A missing file degrades to
/// the built-in defaults and the reason is kept on the core for the
/// frontend to surface.
pub async fn load(profile_name: Option<&str>, config_path: &str) -> eyre::Result<Core> {
    let mut found_config_file = Ok(());
    let config = match doable_config::load(config_path) {
        Ok(v) => v,
        Err(e) => {
            found_config_file = Err(e);
            Config::default()
        }
    };

    let profile = config.resolve_profile(profile_name)?;
    let storage = build_storage(profile)?;
    let identity = IdentityBox::new(MemIdentity::new());

    Ok(Core::new(storage, identity).with_config_status(found_config_file))
}

/// Build a core over an explicit storage configuration, bypassing the
/// profile lookup. Frontends use this when they already carry their
/// own settings.
pub async fn load_with<SC>(storage_config: SC) -> eyre::Result<Core>
where
    SC: StorageConfig,
{
    let storage = storage_config.try_into_storage()?;
    Ok(Core::new(storage, IdentityBox::new(MemIdentity::new())))
}

fn build_storage(profile: &ProfileConfig) -> eyre::Result<StorageBox> {
    match BuiltinStorageType::from_str(&profile.storage_type)? {
        BuiltinStorageType::Memory => {
            let config: MemStorageConfig = profile.details.clone().try_into()?;
            config.try_into_storage()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_a_core_from_a_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[core]
project_id = "doable-demo"

[profile.default]
storage_type = "memory"
"#,
        )
        .unwrap();

        let core = load(None, path.to_str().unwrap()).await.unwrap();

        assert!(core.has_found_config_file().is_ok());
        core.initialize().await.unwrap();
    }

    #[tokio::test]
    async fn missing_config_file_degrades_to_defaults() {
        let core = load(None, "/definitely/not/here.toml").await.unwrap();

        assert!(core.has_found_config_file().is_err());
        core.initialize().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_storage_type_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[core]
project_id = "doable-demo"

[profile.default]
storage_type = "carrier-pigeon"
"#,
        )
        .unwrap();

        assert!(load(None, path.to_str().unwrap()).await.is_err());
    }

    #[tokio::test]
    async fn load_with_takes_a_storage_config_directly() {
        let core = load_with(doable_storage::backend::MemStorageConfig::default())
            .await
            .unwrap();

        core.initialize().await.unwrap();
    }
}
