//! Directions endpoint client: one walking route between two points.

use reqwest::blocking::Client;
use serde::Deserialize;
use url::Url;

use crate::{Coordinate, Error, Result};

/// Travel profile the route is requested for
pub const PROFILE: &str = "mapbox/walking";

/// Ordered route geometry as returned by the directions endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub coordinates: Vec<Coordinate>,
}

impl Route {
    pub fn new(coordinates: Vec<Coordinate>) -> Self {
        Self { coordinates }
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Arithmetic mean of all longitudes and all latitudes.
    pub fn center(&self) -> Option<Coordinate> {
        if self.coordinates.is_empty() {
            return None;
        }
        let n = self.coordinates.len() as f64;
        let (lon, lat) = self
            .coordinates
            .iter()
            .fold((0.0, 0.0), |(lon, lat), c| (lon + c.lon, lat + c.lat));
        Some(Coordinate::new(lon / n, lat / n))
    }
}

#[derive(Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<RouteBody>,
}

#[derive(Deserialize)]
struct RouteBody {
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Geometry {
    coordinates: Vec<Coordinate>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    code: Option<String>,
}

/// Blocking client for the directions endpoint
pub struct DirectionsClient {
    inner: Client,
    base: Url,
    access_token: String,
}

impl DirectionsClient {
    pub fn new(inner: Client, base: &str, access_token: &str) -> Result<Self> {
        let base = base
            .parse()
            .map_err(|e| Error::ConfigError(format!("{} is not a valid url: {}", base, e)))?;

        Ok(Self {
            inner,
            base,
            access_token: access_token.to_string(),
        })
    }

    /// URL for a walking route from `start` to `end` with GeoJSON geometry.
    pub fn request_url(&self, start: Coordinate, end: Coordinate) -> Result<Url> {
        let path = format!("directions/v5/{}/{};{}", PROFILE, start, end);
        let mut url = join(&self.base, &path)?;
        url.query_pairs_mut()
            .append_pair("geometries", "geojson")
            .append_pair("access_token", &self.access_token);
        Ok(url)
    }

    /// Fetch the geometry of the first route between `start` and `end`.
    pub fn fetch_route(&self, start: Coordinate, end: Coordinate) -> Result<Route> {
        let url = self.request_url(start, end)?;
        log::debug!("GET {}", crate::redacted(&url));

        let resp = self
            .inner
            .get(url)
            .send()
            .map_err(|e| Error::NetworkError(format!("directions endpoint: {}", e.without_url())))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| Error::NetworkError(format!("directions endpoint: failed to read body: {}", e.without_url())))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message.or(b.code))
                .unwrap_or(body);
            return Err(Error::RouteError(format!("HTTP {}: {}", status.as_u16(), detail)));
        }

        parse_route(&body, start, end)
    }
}

/// Extract `routes[0].geometry.coordinates` from a directions response body.
pub fn parse_route(body: &str, start: Coordinate, end: Coordinate) -> Result<Route> {
    let parsed: DirectionsResponse = serde_json::from_str(body)
        .map_err(|e| Error::RouteError(format!("unexpected response body: {}", e)))?;

    let coordinates = parsed
        .routes
        .into_iter()
        .next()
        .map(|r| r.geometry.coordinates)
        .unwrap_or_default();

    if coordinates.is_empty() {
        return Err(Error::NoRoute { start, end });
    }

    Ok(Route::new(coordinates))
}

/// Append `path` to the base URL, keeping any path prefix the base carries.
pub(crate) fn join(base: &Url, path: &str) -> Result<Url> {
    let joined = format!("{}/{}", base.as_str().trim_end_matches('/'), path);
    Url::parse(&joined).map_err(|e| Error::ConfigError(format!("error joining url: {e}")))
}
