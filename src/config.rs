//! Run configuration read from the process environment

use std::env::VarError;
use std::path::PathBuf;

use crate::{Coordinate, Error, Result, DEFAULT_API_BASE};

pub const TOKEN_VAR: &str = "MAPBOX_TOKEN";
pub const STYLES_VAR: &str = "STYLES";
pub const START_VAR: &str = "START_POINT";
pub const END_VAR: &str = "END_POINT";
pub const API_BASE_VAR: &str = "MAPBOX_API_URL";
pub const OUTPUT_DIR_VAR: &str = "OUTPUT_DIR";

/// Variables that must be set for a run to start
pub const REQUIRED_VARIABLES: [&str; 4] = [TOKEN_VAR, STYLES_VAR, START_VAR, END_VAR];

/// Everything a banner run needs, built once at startup
///
/// The four required values come from the environment. The remaining fields
/// have defaults that the CLI may override.
#[derive(Debug, Clone)]
pub struct Config {
    /// Mapbox access token, sent as the `access_token` query parameter
    pub access_token: String,
    /// Style identifiers (`owner/style`), in the order they are rendered
    pub styles: Vec<String>,
    /// Route origin
    pub start: Coordinate,
    /// Route destination
    pub end: Coordinate,
    /// Scheme and host both endpoints live under
    pub api_base: String,
    /// Directory the images are written to
    pub output_dir: PathBuf,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| match std::env::var(name) {
            Ok(v) => Some(Ok(v)),
            Err(VarError::NotPresent) => None,
            Err(VarError::NotUnicode(_)) => Some(Err(Error::ConfigError(format!(
                "{name} value is not valid unicode"
            )))),
        })
    }

    /// Build a configuration from an arbitrary variable source.
    ///
    /// Token and styles are checked before the coordinates, so the first
    /// missing variable in `REQUIRED_VARIABLES` order is the one reported.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<Result<String>>,
    {
        let required = |name: &'static str| -> Result<String> {
            match lookup(name).transpose()? {
                Some(v) if !v.trim().is_empty() => Ok(v),
                _ => Err(Error::MissingSetting(name)),
            }
        };
        let optional = |name: &str| -> Result<Option<String>> {
            Ok(lookup(name).transpose()?.filter(|v| !v.trim().is_empty()))
        };

        let access_token = required(TOKEN_VAR)?.trim().to_string();
        let styles = parse_styles(&required(STYLES_VAR)?);
        let start = parse_coordinate(START_VAR, &required(START_VAR)?)?;
        let end = parse_coordinate(END_VAR, &required(END_VAR)?)?;

        let api_base = optional(API_BASE_VAR)?.unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let output_dir = optional(OUTPUT_DIR_VAR)?
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            access_token,
            styles,
            start,
            end,
            api_base,
            output_dir,
            timeout_ms: 30000,
        })
    }

    /// Log the effective configuration without the token.
    pub fn log(&self) {
        log::info!("Route: {} -> {}", self.start, self.end);
        log::info!("Styles: {}", self.styles.join(", "));
        log::debug!(
            "API base: {}, output dir: {}, timeout: {}ms",
            self.api_base,
            self.output_dir.display(),
            self.timeout_ms
        );
    }
}

/// Split a comma-separated style list, trimming entries and dropping empty ones.
pub fn parse_styles(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Parse a `lon,lat` pair. `name` is the setting the value came from.
pub fn parse_coordinate(name: &str, raw: &str) -> Result<Coordinate> {
    let invalid = || Error::ConfigError(format!("{name} must be \"lon,lat\", got {raw:?}"));

    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let [lon, lat] = parts.as_slice() else {
        return Err(invalid());
    };
    let lon: f64 = lon.parse().map_err(|_| invalid())?;
    let lat: f64 = lat.parse().map_err(|_| invalid())?;

    if !lon.is_finite() || !lat.is_finite() {
        return Err(invalid());
    }

    Ok(Coordinate::new(lon, lat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn load(env: &HashMap<String, String>) -> Result<Config> {
        Config::from_lookup(|name| env.get(name).cloned().map(Ok))
    }

    fn complete() -> HashMap<String, String> {
        vars(&[
            (TOKEN_VAR, "pk.test"),
            (STYLES_VAR, "mapbox/streets-v12,mapbox/outdoors-v12"),
            (START_VAR, "-0.1276,51.5072"),
            (END_VAR, "-0.1200, 51.5100"),
        ])
    }

    #[test]
    fn test_complete_environment() {
        let cfg = load(&complete()).unwrap();
        assert_eq!(cfg.access_token, "pk.test");
        assert_eq!(cfg.styles, vec!["mapbox/streets-v12", "mapbox/outdoors-v12"]);
        assert_eq!(cfg.start, Coordinate::new(-0.1276, 51.5072));
        assert_eq!(cfg.end, Coordinate::new(-0.12, 51.51));
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);
        assert_eq!(cfg.output_dir, PathBuf::from("."));
        assert_eq!(cfg.timeout_ms, 30000);
    }

    #[test]
    fn test_each_missing_variable_is_named() {
        for name in REQUIRED_VARIABLES {
            let mut env = complete();
            env.remove(name);
            match load(&env) {
                Err(Error::MissingSetting(missing)) => assert_eq!(missing, name),
                other => panic!("expected missing {name}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_variable_counts_as_missing() {
        let mut env = complete();
        env.insert(STYLES_VAR.to_string(), "   ".to_string());
        let err = load(&env).unwrap_err();
        assert_eq!(err.to_string(), "STYLES is not set");
    }

    #[test]
    fn test_styles_trimmed_and_empties_dropped() {
        assert_eq!(parse_styles("a/b,  c/d ,"), vec!["a/b", "c/d"]);
        assert_eq!(parse_styles(",,"), Vec::<String>::new());
    }

    #[test]
    fn test_bad_coordinate_is_config_error() {
        let mut env = complete();
        env.insert(END_VAR.to_string(), "north,south".to_string());
        let err = load(&env).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("END_POINT"));

        assert!(parse_coordinate(START_VAR, "1.0").is_err());
        assert!(parse_coordinate(START_VAR, "1.0,2.0,3.0").is_err());
        assert!(parse_coordinate(START_VAR, "NaN,2.0").is_err());
    }

    #[test]
    fn test_unreadable_variable_is_config_error() {
        let env = complete();
        let err = Config::from_lookup(|name| {
            if name == START_VAR {
                Some(Err(Error::ConfigError(format!("{name} value is not valid unicode"))))
            } else {
                env.get(name).cloned().map(Ok)
            }
        })
        .unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("START_POINT"));
    }

    #[test]
    fn test_optional_overrides() {
        let mut env = complete();
        env.insert(API_BASE_VAR.to_string(), "http://127.0.0.1:9999".to_string());
        env.insert(OUTPUT_DIR_VAR.to_string(), "out".to_string());
        let cfg = load(&env).unwrap();
        assert_eq!(cfg.api_base, "http://127.0.0.1:9999");
        assert_eq!(cfg.output_dir, PathBuf::from("out"));
    }
}
