//! User preferences persisted as a flat string map in a JSON file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{error::Error, registry::Endpoint};

pub const FAVORITE_MAP_KEY: &str = "favoriteMap";
pub const THEME_KEY: &str = "theme";
pub const CURRENCY_KEY: &str = "currency";

const DEFAULT_FAVORITE: &str = "epix";
const DEFAULT_THEME: &str = "dark";
/// The primary display currency, implied when nothing is stored
const PRIMARY_CURRENCY: &str = "usd";

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub path: Option<PathBuf>,
}

impl Config {
    pub fn path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from("./tmp/explorer-prefs.json"))
    }
}

#[derive(Debug)]
pub struct Preferences {
    path: Option<PathBuf>,
    values: IndexMap<String, String>,
}

impl Preferences {
    /// Open the store at `path`; a missing file reads as empty
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        let values = match fs::read(&path) {
            Ok(raw) => serde_json::from_slice(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => IndexMap::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), "opened preferences");

        Ok(Self {
            path: Some(path),
            values,
        })
    }

    /// Store that is never written to disk
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: IndexMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), Error> {
        self.values.insert(key.to_string(), value.into());
        self.persist()
    }

    pub fn remove(&mut self, key: &str) -> Result<(), Error> {
        if self.values.shift_remove(key).is_some() {
            self.persist()?;
        }

        Ok(())
    }

    fn persist(&self) -> Result<(), Error> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, serde_json::to_vec_pretty(&self.values)?)?;

        Ok(())
    }

    pub fn favorites(&self) -> IndexMap<String, bool> {
        self.get(FAVORITE_MAP_KEY)
            .and_then(|raw| match serde_json::from_str(raw) {
                Ok(map) => Some(map),
                Err(e) => {
                    warn!(error = %e, "ignoring unreadable favorite map");
                    None
                }
            })
            .unwrap_or_else(|| IndexMap::from([(DEFAULT_FAVORITE.to_string(), true)]))
    }

    pub fn set_favorite(&mut self, chain: &str, favorite: bool) -> Result<(), Error> {
        let mut favorites = self.favorites();
        favorites.insert(chain.to_string(), favorite);

        self.set(FAVORITE_MAP_KEY, serde_json::to_string(&favorites)?)
    }

    pub fn endpoint(&self, chain: &str) -> Option<Endpoint> {
        let raw = self.get(&endpoint_key(chain))?;

        serde_json::from_str(raw)
            .inspect_err(|e| warn!(chain, error = %e, "ignoring unreadable saved endpoint"))
            .ok()
    }

    pub fn set_endpoint(&mut self, chain: &str, endpoint: &Endpoint) -> Result<(), Error> {
        self.set(&endpoint_key(chain), serde_json::to_string(endpoint)?)
    }

    pub fn sdk_version(&self, chain: &str) -> Option<&str> {
        self.get(&sdk_version_key(chain)).filter(|v| !v.is_empty())
    }

    pub fn set_sdk_version(&mut self, chain: &str, version: &str) -> Result<(), Error> {
        self.set(&sdk_version_key(chain), version)
    }

    pub fn theme(&self) -> &str {
        self.get(THEME_KEY).unwrap_or(DEFAULT_THEME)
    }

    pub fn set_theme(&mut self, theme: &str) -> Result<(), Error> {
        self.set(THEME_KEY, theme)
    }

    /// Secondary display currency, if one was chosen
    pub fn currency(&self) -> Option<&str> {
        self.get(CURRENCY_KEY)
    }

    /// Choosing the primary currency clears the secondary one
    pub fn set_currency(&mut self, currency: &str) -> Result<(), Error> {
        if currency.eq_ignore_ascii_case(PRIMARY_CURRENCY) {
            self.remove(CURRENCY_KEY)
        } else {
            self.set(CURRENCY_KEY, currency)
        }
    }
}

fn endpoint_key(chain: &str) -> String {
    format!("endpoint-{chain}")
}

fn sdk_version_key(chain: &str) -> String {
    format!("sdk_version_{chain}")
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn defaults_when_empty() {
        let prefs = Preferences::in_memory();

        assert_eq!(prefs.favorites(), IndexMap::from([("epix".to_string(), true)]));
        assert_eq!(prefs.theme(), "dark");
        assert_eq!(prefs.currency(), None);
        assert!(prefs.endpoint("epix").is_none());
        assert!(prefs.sdk_version("epix").is_none());
    }

    #[test]
    fn persists_across_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/prefs.json");

        let endpoint = Endpoint {
            address: "https://api.epix.zone".into(),
            provider: "epix".into(),
        };

        {
            let mut prefs = Preferences::open(&path).unwrap();
            prefs.set_endpoint("epix", &endpoint).unwrap();
            prefs.set_sdk_version("epix", "0.45.0").unwrap();
            prefs.set_favorite("cosmos", true).unwrap();
            prefs.set_theme("light").unwrap();
        }

        let prefs = Preferences::open(&path).unwrap();

        assert_eq!(prefs.endpoint("epix"), Some(endpoint));
        assert_eq!(prefs.get("sdk_version_epix"), Some("0.45.0"));
        assert_eq!(prefs.theme(), "light");
        assert_eq!(
            prefs.favorites().keys().cloned().collect::<Vec<_>>(),
            vec!["epix".to_string(), "cosmos".to_string()]
        );
    }

    #[test]
    fn primary_currency_is_not_stored() {
        let mut prefs = Preferences::in_memory();

        prefs.set_currency("eur").unwrap();
        assert_eq!(prefs.currency(), Some("eur"));

        prefs.set_currency("USD").unwrap();
        assert_eq!(prefs.currency(), None);
    }

    #[test]
    fn unreadable_values_fall_back() {
        let mut prefs = Preferences::in_memory();

        prefs.set(FAVORITE_MAP_KEY, "not json").unwrap();
        prefs.set("endpoint-epix", "{").unwrap();

        assert!(prefs.favorites()["epix"]);
        assert!(prefs.endpoint("epix").is_none());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("prefs.json");
        fs::write(&path, "[1, 2").unwrap();

        assert!(Preferences::open(&path).is_err());
    }
}
