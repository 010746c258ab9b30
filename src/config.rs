// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs::read_to_string;
use std::path::Path;

use chrono::TimeDelta;
use serde::Deserialize;

use crate::error::ErrorKind;
use crate::error::Fallible;
use crate::error::fail_with;
use crate::review::select::Order;

/// Collection settings, read from `lexicards.toml`. Every key is optional.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Maximum number of cards in a day's working set.
    pub daily_goal: usize,
    /// How long an analytics report is served from cache.
    pub cache_ttl_secs: u64,
    pub order: Order,
    /// Restrict both engines to cards with this level tag.
    pub level: Option<String>,
    pub port: u16,
    pub open_browser: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daily_goal: 20,
            cache_ttl_secs: 300,
            order: Order::default(),
            level: None,
            port: 8000,
            open_browser: true,
        }
    }
}

impl Config {
    /// Load the config file at `path`, or the defaults if there is none.
    pub fn load(path: &Path) -> Fallible<Self> {
        if !path.exists() {
            log::debug!("No config file at {path:?}, using defaults.");
            return Ok(Self::default());
        }
        let text = read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Fallible<Self> {
        let config: Config = toml::from_str(text)?;
        if config.daily_goal == 0 {
            return fail_with(
                ErrorKind::InvalidInput,
                "invalid configuration: daily_goal must be at least 1",
            );
        }
        Ok(config)
    }

    pub fn cache_ttl(&self) -> TimeDelta {
        i64::try_from(self.cache_ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_empty_file_is_default() -> Fallible<()> {
        assert_eq!(Config::from_toml("")?, Config::default());
        assert_eq!(Config::default().cache_ttl(), TimeDelta::minutes(5));
        Ok(())
    }

    #[test]
    fn test_parse() -> Fallible<()> {
        let config = Config::from_toml(
            r#"
            daily_goal = 5
            cache_ttl_secs = 60
            order = "priority"
            level = "Novice 1"
            open_browser = false
            "#,
        )?;
        assert_eq!(config.daily_goal, 5);
        assert_eq!(config.cache_ttl(), TimeDelta::seconds(60));
        assert_eq!(config.order, Order::Priority);
        assert_eq!(config.level.as_deref(), Some("Novice 1"));
        assert_eq!(config.port, 8000);
        assert!(!config.open_browser);
        Ok(())
    }

    #[test]
    fn test_huge_ttl_saturates() -> Fallible<()> {
        let config = Config {
            cache_ttl_secs: u64::MAX,
            ..Config::default()
        };
        assert_eq!(config.cache_ttl(), TimeDelta::MAX);
        let config = Config::from_toml(&format!("cache_ttl_secs = {}", i64::MAX))?;
        assert_eq!(config.cache_ttl(), TimeDelta::MAX);
        Ok(())
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = Config::from_toml("daily_goal = 0").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(Config::from_toml("colour = \"blue\"").is_err());
        assert!(Config::from_toml("order = \"random\"").is_err());
    }

    #[test]
    fn test_load_missing_file() -> Fallible<()> {
        let dir = tempdir()?;
        let config = Config::load(&dir.path().join("lexicards.toml"))?;
        assert_eq!(config, Config::default());
        Ok(())
    }
}
