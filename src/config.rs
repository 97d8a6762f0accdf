use std::num::NonZeroUsize;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE: &str = "http://localhost:8080";
pub const DEFAULT_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const DEFAULT_TILE_CACHE: usize = 512;
pub const DEFAULT_CLUSTER_RADIUS: f32 = 40.0;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base: Url,
    pub tile_url: String,
    pub tile_token: Option<String>,
    pub tile_cache: NonZeroUsize,
    /// `None` disables marker clustering.
    pub cluster_radius: Option<f32>,
    pub start_location: Option<String>,
}

impl AppConfig {
    /// Reads `.env` (when present) and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_base = var("HISTMAP_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let api_base = Url::parse(&api_base).map_err(|source| ConfigError::InvalidUrl {
            var: "HISTMAP_API_BASE",
            source,
        })?;

        let tile_cache = match var("HISTMAP_TILE_CACHE") {
            Some(value) => value
                .parse::<usize>()
                .ok()
                .and_then(NonZeroUsize::new)
                .ok_or(ConfigError::InvalidNumber {
                    var: "HISTMAP_TILE_CACHE",
                    value,
                })?,
            None => NonZeroUsize::new(DEFAULT_TILE_CACHE).unwrap_or(NonZeroUsize::MIN),
        };

        // 0 turns clustering off
        let cluster_radius = match var("HISTMAP_CLUSTER_RADIUS") {
            Some(value) => match value.parse::<f32>() {
                Ok(r) if r.is_finite() && r > 0.0 => Some(r),
                Ok(r) if r == 0.0 => None,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        var: "HISTMAP_CLUSTER_RADIUS",
                        value,
                    })
                }
            },
            None => Some(DEFAULT_CLUSTER_RADIUS),
        };

        Ok(Self {
            api_base,
            tile_url: var("HISTMAP_TILE_URL").unwrap_or_else(|| DEFAULT_TILE_URL.to_string()),
            tile_token: var("MAP_BOX_API_TOKEN"),
            tile_cache,
            cluster_radius,
            start_location: var("HISTMAP_START"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_base.as_str(), "http://localhost:8080/");
        assert_eq!(config.tile_url, DEFAULT_TILE_URL);
        assert_eq!(config.tile_token, None);
        assert_eq!(config.tile_cache.get(), 512);
        assert_eq!(config.cluster_radius, Some(40.0));
        assert_eq!(config.start_location, None);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("MAP_BOX_API_TOKEN", "  "), ("HISTMAP_START", "")])).unwrap();
        assert_eq!(config.tile_token, None);
        assert_eq!(config.start_location, None);
    }

    #[test]
    fn zero_radius_disables_clustering() {
        let config = AppConfig::from_lookup(lookup(&[("HISTMAP_CLUSTER_RADIUS", "0")])).unwrap();
        assert_eq!(config.cluster_radius, None);
    }

    #[test]
    fn rejects_bad_values() {
        let err = AppConfig::from_lookup(lookup(&[("HISTMAP_API_BASE", "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { var: "HISTMAP_API_BASE", .. }));

        let err = AppConfig::from_lookup(lookup(&[("HISTMAP_TILE_CACHE", "0")])).unwrap_err();
        assert_eq!(err.to_string(), "HISTMAP_TILE_CACHE must be a positive number, got '0'");

        let err = AppConfig::from_lookup(lookup(&[("HISTMAP_CLUSTER_RADIUS", "-3")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
    }
}
