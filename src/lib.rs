//! Route banner renderer
//!
//! Fetches a walking route between two coordinates from the Mapbox Directions
//! API, draws it over one or more map styles with the Mapbox Static Images
//! API, and saves each image as a timestamped PNG.
//!
//! # Example
//!
//! ```no_run
//! use routebanner::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let report = routebanner::run(&config)?;
//! for path in report.saved_paths() {
//!     println!("wrote {}", path.display());
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod banner;
pub mod config;
pub mod directions;
pub mod overlay;
pub mod static_map;

pub use banner::{run, Banner, BannerReport};
pub use static_map::{RenderTimestamp, StyleOutcome};
pub use config::Config;
pub use overlay::{MapView, Marker, MarkerShape, Overlay};

/// Default API host for both endpoints
pub const DEFAULT_API_BASE: &str = "https://api.mapbox.com";

/// A geographic position in degrees
///
/// Serializes as a GeoJSON position (`[lon, lat]`) and displays as `lon,lat`,
/// which is the form both Mapbox endpoints expect in their paths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lon, c.lat]
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lon, self.lat)
    }
}

/// Output image dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ImageSize {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Render a request URL for logs with the access token masked.
pub fn redacted(url: &url::Url) -> String {
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "access_token" { "***".into() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}

/// Build the blocking client shared by both endpoints.
pub(crate) fn http_client(timeout_ms: u64) -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_millis(timeout_ms))
        .user_agent(concat!("routebanner/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))
}
