//! Route overlay for the static-map request.
//!
//! The overlay is a GeoJSON FeatureCollection holding the route twice: a wide
//! translucent white line underneath and a narrower red line on top, so the
//! route stays readable on both light and dark styles. Start and finish are
//! drawn with Mapbox marker overlays rather than GeoJSON points.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::directions::Route;
use crate::{Coordinate, Error, ImageSize, Result};

/// Zoom level every banner is rendered at
pub const ZOOM: u8 = 16;

const MARKER_COLOR: &str = "ff0000";

/// Bytes left as-is in the encoded overlay; everything else becomes `%XX`.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: StrokeStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Geometry {
    LineString { coordinates: Vec<Coordinate> },
}

/// simplestyle stroke properties understood by the static-map renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrokeStyle {
    pub stroke: String,
    #[serde(rename = "stroke-width")]
    pub stroke_width: u32,
    #[serde(rename = "stroke-opacity", skip_serializing_if = "Option::is_none")]
    pub stroke_opacity: Option<f64>,
}

impl StrokeStyle {
    /// Wide white line drawn beneath the route.
    pub fn outline() -> Self {
        Self {
            stroke: "#ffffff".into(),
            stroke_width: 12,
            stroke_opacity: Some(0.8),
        }
    }

    /// The route itself.
    pub fn route() -> Self {
        Self {
            stroke: "#ff0000".into(),
            stroke_width: 6,
            stroke_opacity: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Star,
}

impl MarkerShape {
    fn as_str(self) -> &'static str {
        match self {
            MarkerShape::Circle => "circle",
            MarkerShape::Star => "star",
        }
    }
}

/// A large pin drawn by the static-map endpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub shape: MarkerShape,
    pub at: Coordinate,
}

impl Marker {
    pub fn start(at: Coordinate) -> Self {
        Self {
            shape: MarkerShape::Circle,
            at,
        }
    }

    pub fn finish(at: Coordinate) -> Self {
        Self {
            shape: MarkerShape::Star,
            at,
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `l` selects the large pin size.
        write!(f, "pin-l-{}+{}({})", self.shape.as_str(), MARKER_COLOR, self.at)
    }
}

/// Camera for the rendered image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
    pub size: ImageSize,
}

impl MapView {
    /// `lon,lat,zoom` path segment
    pub fn center_segment(&self) -> String {
        format!("{},{}", self.center, self.zoom)
    }

    /// `WxH` path segment
    pub fn size_segment(&self) -> String {
        self.size.to_string()
    }
}

/// Everything drawn on top of the base style, shared by every style of a run
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub features: FeatureCollection,
    pub start: Marker,
    pub finish: Marker,
    pub view: MapView,
}

impl Overlay {
    /// Compose the overlay for `route`, centered on the route's mean position.
    pub fn compose(route: &Route, start: Coordinate, end: Coordinate) -> Result<Self> {
        let center = route.center().ok_or(Error::NoRoute { start, end })?;

        let line = |properties| Feature {
            geometry: Geometry::LineString {
                coordinates: route.coordinates.clone(),
            },
            properties,
        };

        Ok(Self {
            features: FeatureCollection {
                features: vec![line(StrokeStyle::outline()), line(StrokeStyle::route())],
            },
            start: Marker::start(start),
            finish: Marker::finish(end),
            view: MapView {
                center,
                zoom: ZOOM,
                size: ImageSize::default(),
            },
        })
    }

    /// The FeatureCollection as percent-encoded JSON, ready for a URL path.
    pub fn encoded_geojson(&self) -> Result<String> {
        let json = serde_json::to_string(&self.features)
            .map_err(|e| Error::ConfigError(format!("failed to serialize overlay: {}", e)))?;
        Ok(utf8_percent_encode(&json, PATH_SEGMENT).to_string())
    }

    /// `{start},{finish},geojson(...)` overlay path segment
    pub fn overlay_segment(&self) -> Result<String> {
        Ok(format!(
            "{},{},geojson({})",
            self.start,
            self.finish,
            self.encoded_geojson()?
        ))
    }
}
