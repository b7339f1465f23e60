// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Filesystem-backed `ConfigStore` for writer profiles (uses platform config dir).

use directories::ProjectDirs;
use odata_config::{ConfigError, ConfigStore};
use std::fs;
use std::path::{Path, PathBuf};

/// Store profiles as `<name>.json` files under a base directory.
pub struct FsConfigStore {
    base: PathBuf,
}

impl FsConfigStore {
    /// Create a store rooted at the user config directory (e.g., `~/.config/odata-writer/profiles`).
    pub fn new() -> Result<Self, ConfigError> {
        let proj = ProjectDirs::from("org", "odata", "odata-writer")
            .ok_or_else(|| ConfigError::Other("could not resolve config dir".into()))?;
        Self::at(proj.config_dir().join("profiles"))
    }

    /// Create a store rooted at an explicit directory, creating it if needed.
    pub fn at(base: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let base = base.into();
        fs::create_dir_all(&base)?;
        Ok(Self { base })
    }

    /// Directory the profiles live in.
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ConfigError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(ConfigError::Other(format!("invalid profile name '{key}'")));
        }
        Ok(self.base.join(format!("{key}.json")))
    }
}

impl ConfigStore for FsConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        let path = self.path_for(key)?;
        match fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(ConfigError::NotFound),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odata_config::{ConfigService, WriterProfile};
    use odata_payload::ODataVersion;

    #[test]
    fn profile_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let service = ConfigService::new(FsConfigStore::at(dir.path()).unwrap());

        let mut profile = WriterProfile::request();
        profile.version = ODataVersion::V2;
        profile.quotas.max_nesting_depth = 8;
        service.save_profile("request-v2", &profile).unwrap();

        assert!(dir.path().join("request-v2.json").exists());
        let loaded = service.load_profile("request-v2").unwrap().unwrap();
        assert_eq!(loaded, profile);
    }

    #[test]
    fn missing_profile_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let service = ConfigService::new(FsConfigStore::at(dir.path()).unwrap());
        assert!(service.load_profile("absent").unwrap().is_none());
    }

    #[test]
    fn path_like_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsConfigStore::at(dir.path()).unwrap();
        assert!(matches!(
            store.save_raw("../escape", b"{}"),
            Err(ConfigError::Other(_))
        ));
        assert!(matches!(store.load_raw(""), Err(ConfigError::Other(_))));
    }
}
