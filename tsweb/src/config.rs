//! Flat file persistence: global credentials and cookies under
//! `~/.tsweb/`, and a per-project `.tsweb.local` holding the default
//! compiler index, discovered by walking up from the current directory.
//!
//! Loading is tolerant by design. A missing or corrupt file behaves like
//! an absent one, so a damaged config never blocks a command.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const GLOBAL_DIR: &str = ".tsweb";
const GLOBAL_CONFIG_FILE: &str = "global.json";
const COOKIE_FILE: &str = "cookies.json";
pub const LOCAL_CONFIG_FILE: &str = ".tsweb.local";

fn global_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(GLOBAL_DIR))
        .context("could not determine the home directory")
}

fn read_json<T: Default + for<'de> Deserialize<'de>>(path: &Path) -> T {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("ignoring corrupt config file {}: {}", path.display(), e);
            T::default()
        }),
        Err(_) => T::default(),
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

/// Saved credentials, stored as plain JSON to match the site's own
/// plaintext login scheme.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
}

impl GlobalConfig {
    pub fn load_or_default() -> Self {
        match global_dir() {
            Ok(dir) => Self::load_from(&dir.join(GLOBAL_CONFIG_FILE)),
            Err(_) => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        read_json(path)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&global_dir()?.join(GLOBAL_CONFIG_FILE))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    pub fn has_credentials(&self) -> bool {
        !self.user.is_empty() && !self.password.is_empty()
    }
}

/// Session cookies from a previous run, one `name=value` string each.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CookieFile {
    #[serde(default)]
    pub cookies: Vec<String>,
}

impl CookieFile {
    pub fn load_or_default() -> Self {
        match global_dir() {
            Ok(dir) => read_json(&dir.join(COOKIE_FILE)),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<()> {
        write_json(&global_dir()?.join(COOKIE_FILE), self)
    }
}

/// Per-project settings, currently just the default compiler index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalConfig {
    #[serde(default)]
    pub default_lang: usize,
}

impl LocalConfig {
    /// Loads the nearest `.tsweb.local`, searching upward from the
    /// current directory.
    pub fn load() -> Option<Self> {
        let start = std::env::current_dir().ok()?;
        let path = Self::find_from(&start)?;
        Some(Self::load_from(&path))
    }

    pub fn load_from(path: &Path) -> Self {
        read_json(path)
    }

    /// Walks up from `dir` to the filesystem root looking for the local
    /// config file.
    pub fn find_from(dir: &Path) -> Option<PathBuf> {
        let mut current = dir;
        loop {
            let candidate = current.join(LOCAL_CONFIG_FILE);
            if candidate.exists() {
                return Some(candidate);
            }
            current = current.parent()?;
        }
    }

    /// Saves into the current directory.
    pub fn save(&self) -> Result<()> {
        let path = std::env::current_dir()
            .context("could not determine the current directory")?
            .join(LOCAL_CONFIG_FILE);
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "tsweb-config-test-{}-{}",
            std::process::id(),
            DIR_SEQ.fetch_add(1, Ordering::SeqCst)
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_global_config_round_trip() {
        let path = scratch_dir().join("global.json");
        let config = GlobalConfig {
            user: String::from("team7"),
            password: String::from("hunter2"),
        };
        config.save_to(&path).unwrap();

        let loaded = GlobalConfig::load_from(&path);
        assert_eq!(loaded.user, "team7");
        assert_eq!(loaded.password, "hunter2");
        assert!(loaded.has_credentials());
    }

    #[test]
    fn test_corrupt_global_config_falls_back_to_default() {
        let path = scratch_dir().join("global.json");
        fs::write(&path, "{not json").unwrap();

        let loaded = GlobalConfig::load_from(&path);
        assert!(!loaded.has_credentials());
    }

    #[test]
    fn test_has_credentials_requires_both_fields() {
        let config = GlobalConfig {
            user: String::from("team7"),
            password: String::new(),
        };
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_local_config_is_found_in_a_parent_directory() {
        let root = scratch_dir();
        let nested = root.join("src").join("bin");
        fs::create_dir_all(&nested).unwrap();
        LocalConfig { default_lang: 3 }
            .save_to(&root.join(LOCAL_CONFIG_FILE))
            .unwrap();

        let found = LocalConfig::find_from(&nested).unwrap();
        assert_eq!(found, root.join(LOCAL_CONFIG_FILE));
        assert_eq!(LocalConfig::load_from(&found).default_lang, 3);
    }

    #[test]
    fn test_missing_local_config_yields_none() {
        let dir = scratch_dir();
        assert!(LocalConfig::find_from(&dir.join("nowhere")).is_none());
    }
}
