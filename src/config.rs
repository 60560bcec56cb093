/// Path finder and logging configuration
///
/// Options come from defaults, environment variables (optionally loaded from
/// a `.env` file) or any serde source.

use crate::algorithms::DEFAULT_MATCHING_RADIUS_M;
use crate::conversion::{ConversionOptions, DEFAULT_SCALING_FACTOR};
use crate::dispatch::{EngineKind, SizeRule, DEFAULT_AUTO_THRESHOLDS};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to install logging: {0}")]
    Logging(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Options for `create_path_finder`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PathFinderOptions {
    /// Factor applied to float weights before rounding to integers
    pub scaling_factor: u32,
    /// Directory for hierarchy artifacts; next to the origin file, else the OS temp dir
    pub cache_dir: Option<PathBuf>,
    /// Artifact file name prefix; the origin file name, else `"graph"`
    pub origin_tag: Option<String>,
    pub matching_radius_m: f64,
    /// Report duration instead of distance for geo paths
    pub return_time_cost: bool,
    /// Size thresholds used by `Algorithm::Auto` on Graph sources
    pub auto_thresholds: Vec<(usize, EngineKind)>,
}

impl Default for PathFinderOptions {
    fn default() -> Self {
        Self {
            scaling_factor: DEFAULT_SCALING_FACTOR,
            cache_dir: None,
            origin_tag: None,
            matching_radius_m: DEFAULT_MATCHING_RADIUS_M,
            return_time_cost: true,
            auto_thresholds: DEFAULT_AUTO_THRESHOLDS.to_vec(),
        }
    }
}

fn parse_var<T>(key: &'static str) -> ConfigResult<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key,
                reason: e.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

impl PathFinderOptions {
    /// Load options from `GPF_*` environment variables, reading `.env` first
    ///
    /// - `GPF_SCALING_FACTOR`
    /// - `GPF_CACHE_DIR`
    /// - `GPF_ORIGIN_TAG`
    /// - `GPF_MATCHING_RADIUS` (meters)
    /// - `GPF_RETURN_TIME_COST` (`true`/`false`)
    /// - `GPF_AUTO_THRESHOLD`: node count from which `Auto` prefers the hierarchy
    pub fn from_env() -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();

        let mut options = Self::default();
        if let Some(scaling_factor) = parse_var::<u32>("GPF_SCALING_FACTOR")? {
            if scaling_factor == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "GPF_SCALING_FACTOR",
                    value: "0".to_string(),
                    reason: "must be positive".to_string(),
                });
            }
            options.scaling_factor = scaling_factor;
        }
        if let Ok(dir) = env::var("GPF_CACHE_DIR") {
            options.cache_dir = Some(PathBuf::from(dir));
        }
        if let Ok(tag) = env::var("GPF_ORIGIN_TAG") {
            options.origin_tag = Some(tag);
        }
        if let Some(radius) = parse_var::<f64>("GPF_MATCHING_RADIUS")? {
            options.matching_radius_m = radius;
        }
        if let Some(time_cost) = parse_var::<bool>("GPF_RETURN_TIME_COST")? {
            options.return_time_cost = time_cost;
        }
        if let Some(threshold) = parse_var::<usize>("GPF_AUTO_THRESHOLD")? {
            options.auto_thresholds = vec![(0, EngineKind::AStar), (threshold, EngineKind::GraphHierarchy)];
        }

        Ok(options)
    }

    pub fn size_rule(&self) -> SizeRule {
        SizeRule::new(self.auto_thresholds.clone())
    }

    /// Conversion options; explicit settings win over those derived from `origin_file`
    pub fn conversion_options(&self, origin_file: Option<&Path>) -> ConversionOptions {
        let mut conversion = match origin_file {
            Some(path) => ConversionOptions::for_origin_file(path),
            None => ConversionOptions::default(),
        };
        conversion.scaling_factor = self.scaling_factor;
        if let Some(dir) = &self.cache_dir {
            conversion.cache_dir = Some(dir.clone());
        }
        if let Some(tag) = &self.origin_tag {
            conversion.origin_tag = Some(tag.clone());
        }
        conversion
    }
}

/// Logging setup for the binaries
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Read `LOG_LEVEL` and `LOG_FORMAT`
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();
        Self {
            level: env::var("LOG_LEVEL").unwrap_or(defaults.level),
            format: env::var("LOG_FORMAT").unwrap_or(defaults.format),
        }
    }

    /// Install a global subscriber; `RUST_LOG` overrides the configured level
    pub fn init(&self) -> ConfigResult<()> {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        let result = match self.format.as_str() {
            "json" => tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init(),
            _ => tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init(),
        };
        result.map_err(|e| ConfigError::Logging(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = PathFinderOptions::default();
        assert_eq!(options.scaling_factor, 1_000_000);
        assert_eq!(options.matching_radius_m, 100.0);
        assert!(options.return_time_cost);
        assert_eq!(options.size_rule(), SizeRule::default());
    }

    #[test]
    fn test_deserialize_partial() {
        let options: PathFinderOptions = serde_json::from_str(
            r#"{"scaling_factor": 1000, "auto_thresholds": [[0, "a_star"], [50, "graph_hierarchy"]]}"#,
        )
        .unwrap();
        assert_eq!(options.scaling_factor, 1000);
        assert_eq!(options.size_rule().pick(50).unwrap(), EngineKind::GraphHierarchy);
        assert!(options.return_time_cost);
    }

    #[test]
    fn test_conversion_options_precedence() {
        let origin = Path::new("/maps/hall.json");
        let derived = PathFinderOptions::default().conversion_options(Some(origin));
        assert_eq!(derived.tag(), "hall.json");
        assert_eq!(derived.cache_dir, Some(PathBuf::from("/maps")));

        let explicit = PathFinderOptions {
            cache_dir: Some(PathBuf::from("/cache")),
            origin_tag: Some("custom".to_string()),
            scaling_factor: 10,
            ..PathFinderOptions::default()
        }
        .conversion_options(Some(origin));
        assert_eq!(explicit.tag(), "custom");
        assert_eq!(explicit.cache_dir, Some(PathBuf::from("/cache")));
        assert_eq!(explicit.scaling_factor, 10);
    }
}
