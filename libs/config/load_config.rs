use std::path::Path;

use crate::Config;

pub fn load(config_path: &str) -> eyre::Result<Config> {
    let content = read_file_content_if_exist(config_path)?
        .ok_or_else(|| eyre::eyre!("config path '{config_path}' was not found"))?;

    let config: Config = toml::from_str(&content)?;

    Ok(config)
}

fn read_file_content_if_exist(file_path: &str) -> eyre::Result<Option<String>> {
    let path = Path::new(file_path);

    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    Ok(Some(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_config_with_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[core]
project_id = "doable-demo"
default_profile_name = "local"

[profile.local]
storage_type = "memory"
channel_capacity = 16
"#,
        )
        .unwrap();

        let config = load(path.to_str().unwrap()).unwrap();

        assert_eq!(config.core.project_id, "doable-demo");
        let profile = config.resolve_profile(None).unwrap();
        assert_eq!(profile.storage_type, "memory");
        assert_eq!(
            profile.details.get("channel_capacity").and_then(|v| v.as_integer()),
            Some(16)
        );
    }

    #[test]
    fn missing_config_path_is_an_error() {
        assert!(load("/definitely/not/here.toml").is_err());
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let config = Config::default();

        assert!(config.resolve_profile(Some("staging")).is_err());
        assert!(config.resolve_profile(None).is_ok());
    }
}
