use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard.toml";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
}

pub fn load_app_config() -> anyhow::Result<AppConfig> {
    load_app_config_from(Path::new(DEFAULT_CONFIG_PATH))
}

/// Defaults, then the optional TOML file, then `DASHBOARD_*` environment
/// variables (`DASHBOARD_SERVER__BIND`, `DASHBOARD_STORAGE__DATA_DIR`).
pub fn load_app_config_from(path: &Path) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .set_default("server.bind", "0.0.0.0:8080")?
        .set_default("storage.data_dir", ".data")?
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
