use std::path::{
    Path,
    PathBuf,
};

use color_eyre::eyre::{
    Error,
    WrapErr,
    eyre,
};
use directories::ProjectDirs;
use serde::{
    Serialize,
    de::DeserializeOwned,
};

#[derive(Clone, Debug)]
pub struct AppFiles {
    project_dirs: ProjectDirs,
}

impl AppFiles {
    pub fn open() -> Result<Self, Error> {
        let project_dirs = ProjectDirs::from("", "", std::env!("CARGO_PKG_NAME"))
            .ok_or_else(|| eyre!("Could not determine config directory"))?;
        std::fs::create_dir_all(project_dirs.config_local_dir())?;
        Ok(Self { project_dirs })
    }

    pub fn config_path(&self) -> PathBuf {
        self.project_dirs.config_local_dir().join("config.toml")
    }

    /// Read config file, or create one with default values if it doesn't
    /// exist yet.
    pub fn read_config_or_create<T>(&self) -> Result<T, Error>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        let path = self.config_path();

        if path.exists() {
            read_config(&path)
        }
        else {
            tracing::info!(path = %path.display(), "Creating config file");
            let config = T::default();
            let toml = toml::to_string_pretty(&config)?;
            std::fs::write(&path, &toml)
                .with_context(|| format!("Could not write config file: {}", path.display()))?;
            Ok(config)
        }
    }
}

pub fn read_config<T>(path: &Path) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    tracing::info!(path = %path.display(), "Reading config file");
    let toml = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read config file: {}", path.display()))?;
    toml::from_str(&toml).with_context(|| format!("Invalid config file: {}", path.display()))
}
