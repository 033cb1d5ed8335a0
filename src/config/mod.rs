use std::path::PathBuf;

use thiserror::Error;

use crate::link::PathMap;

pub const SONARR_URL_FLAG: &str = "sonarr-url";
pub const SONARR_URL_ENV: &str = "SONARR_URL";
pub const SONARR_KEY_FLAG: &str = "sonarr-key";
pub const SONARR_KEY_ENV: &str = "SONARR_KEY";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("required parameter not provided; flag \"-{flag}\" or envar \"{envar}\" must be set")]
    Missing {
        flag: &'static str,
        envar: &'static str,
    },
    #[error("flag \"-series\" must be a positive series id, got {0}")]
    InvalidSeries(i64),
}

/// Resolves a required parameter: the flag value if non-empty, else the environment variable
/// `envar` as returned by `lookup`, else a [`ConfigError::Missing`] naming both.
pub fn require(
    flag: &'static str,
    envar: &'static str,
    value: Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    value
        .filter(|value| !value.is_empty())
        .or_else(|| lookup(envar).filter(|value| !value.is_empty()))
        .ok_or(ConfigError::Missing { flag, envar })
}

/// Reads environment variables from the process environment.
pub fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

#[derive(Clone, Debug, PartialEq)]
pub struct SonarrConfig {
    pub url: String,
    pub api_key: String,
    pub series_id: i64,
}

impl SonarrConfig {
    pub fn resolve(
        url: Option<String>,
        api_key: Option<String>,
        series_id: i64,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let url = require(SONARR_URL_FLAG, SONARR_URL_ENV, url, &lookup)?;
        let api_key = require(SONARR_KEY_FLAG, SONARR_KEY_ENV, api_key, &lookup)?;
        if series_id <= 0 {
            return Err(ConfigError::InvalidSeries(series_id));
        }
        Ok(Self {
            url,
            api_key,
            series_id,
        })
    }
}

/// Settings shared by every workflow: where links go and how source paths are rewritten.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkConfig {
    pub path_map: Option<PathMap>,
    pub destination_root: PathBuf,
}

impl LinkConfig {
    /// Defaults the destination root to the current working directory.
    pub fn resolve(
        map_from: Option<String>,
        map_to: Option<String>,
        destination_root: Option<PathBuf>,
    ) -> std::io::Result<Self> {
        let destination_root = match destination_root {
            Some(root) if !root.as_os_str().is_empty() => root,
            _ => std::env::current_dir()?,
        };
        Ok(Self {
            path_map: PathMap::new(map_from, map_to),
            destination_root,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn require_prefers_flag() {
        assert_eq!(
            require("sonarr-url", "SONARR_URL", Some("http://flag".into()), |_| Some(
                "http://env".into()
            )),
            Ok("http://flag".into())
        );
    }

    #[test]
    fn require_falls_back_to_env() {
        let lookup = |name: &str| (name == "SONARR_URL").then(|| "http://env".to_string());
        assert_eq!(
            require("sonarr-url", "SONARR_URL", None, lookup),
            Ok("http://env".into())
        );
        assert_eq!(
            require("sonarr-url", "SONARR_URL", Some(String::new()), lookup),
            Ok("http://env".into())
        );
    }

    #[test]
    fn require_missing_names_flag_and_envar() {
        let err = require("sonarr-key", "SONARR_KEY", Some(String::new()), |_| {
            Some(String::new())
        })
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Missing {
                flag: "sonarr-key",
                envar: "SONARR_KEY"
            }
        );
        let message = err.to_string();
        assert!(message.contains("-sonarr-key"));
        assert!(message.contains("SONARR_KEY"));
    }

    #[test]
    fn sonarr_config_checks_url_before_key() {
        assert_eq!(
            SonarrConfig::resolve(None, None, 42, no_env),
            Err(ConfigError::Missing {
                flag: SONARR_URL_FLAG,
                envar: SONARR_URL_ENV
            })
        );
        assert_eq!(
            SonarrConfig::resolve(Some("http://localhost:8989".into()), None, 42, no_env),
            Err(ConfigError::Missing {
                flag: SONARR_KEY_FLAG,
                envar: SONARR_KEY_ENV
            })
        );
    }

    #[test]
    fn sonarr_config_rejects_unset_series() {
        assert_eq!(
            SonarrConfig::resolve(
                Some("http://localhost:8989".into()),
                Some("key".into()),
                -1,
                no_env
            ),
            Err(ConfigError::InvalidSeries(-1))
        );
    }

    #[test]
    fn sonarr_config_ok() {
        assert_eq!(
            SonarrConfig::resolve(None, Some("key".into()), 42, |_| Some(
                "http://localhost:8989".into()
            )),
            Ok(SonarrConfig {
                url: "http://localhost:8989".into(),
                api_key: "key".into(),
                series_id: 42,
            })
        );
    }

    #[test]
    fn link_config_defaults() {
        let config = LinkConfig::resolve(None, Some("/x".into()), None).unwrap();
        assert_eq!(config.path_map, None);
        assert_eq!(config.destination_root, std::env::current_dir().unwrap());
    }

    #[test]
    fn link_config_explicit() {
        let config =
            LinkConfig::resolve(Some("/a".into()), Some("/x".into()), Some("/out".into())).unwrap();
        assert_eq!(config.path_map, PathMap::new(Some("/a".into()), Some("/x".into())));
        assert!(config.path_map.is_some());
        assert_eq!(config.destination_root, PathBuf::from("/out"));
    }
}
