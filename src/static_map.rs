//! Static-map endpoint client and image output.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime};
use reqwest::blocking::Client;
use url::Url;

use crate::directions::join;
use crate::{Error, Overlay, Result};

/// Wall-clock time a run started, shared by every file it writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTimestamp(NaiveDateTime);

impl RenderTimestamp {
    pub fn now() -> Self {
        let now: DateTime<Local> = Local::now();
        Self(now.naive_local())
    }

    pub fn from_naive(at: NaiveDateTime) -> Self {
        Self(at)
    }
}

impl fmt::Display for RenderTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d_%H%M%S"))
    }
}

/// What happened to one style
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleOutcome {
    /// Image written to `path`
    Saved { style: String, path: PathBuf },
    /// Endpoint answered with a non-200 status; nothing was written
    Rejected {
        style: String,
        status: u16,
        body: String,
    },
}

impl StyleOutcome {
    pub fn style(&self) -> &str {
        match self {
            StyleOutcome::Saved { style, .. } | StyleOutcome::Rejected { style, .. } => style,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, StyleOutcome::Saved { .. })
    }
}

/// Short name of a style: the last `/` segment of its identifier.
pub fn style_name(style_id: &str) -> &str {
    let id = style_id.trim_matches('/');
    id.rsplit('/').next().unwrap_or(id)
}

/// `banner-map_{style}_{timestamp}.png`
pub fn output_filename(style_id: &str, timestamp: &RenderTimestamp) -> String {
    format!("banner-map_{}_{}.png", style_name(style_id), timestamp)
}

/// Path segments shared by every style of a run, computed once from the overlay
#[derive(Debug, Clone, PartialEq)]
pub struct StaticMapRequest {
    overlay: String,
    center: String,
    size: String,
}

impl StaticMapRequest {
    pub fn new(overlay: &Overlay) -> Result<Self> {
        Ok(Self {
            overlay: overlay.overlay_segment()?,
            center: overlay.view.center_segment(),
            size: overlay.view.size_segment(),
        })
    }
}

/// Blocking client for the static-map endpoint
pub struct StaticMapClient {
    inner: Client,
    base: Url,
    access_token: String,
}

impl StaticMapClient {
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

    pub fn request_url(&self, style_id: &str, request: &StaticMapRequest) -> Result<Url> {
        let path = format!(
            "styles/v1/{}/static/{}/{}/{}",
            style_id.trim_matches('/'),
            request.overlay,
            request.center,
            request.size
        );
        let mut url = join(&self.base, &path)?;
        url.query_pairs_mut()
            .append_pair("access_token", &self.access_token);
        Ok(url)
    }

    /// Request one style and write it under `output_dir` on HTTP 200.
    ///
    /// Any other status is returned as `StyleOutcome::Rejected`; only transport
    /// and write failures are errors.
    pub fn render(
        &self,
        style_id: &str,
        request: &StaticMapRequest,
        timestamp: &RenderTimestamp,
        output_dir: &Path,
    ) -> Result<StyleOutcome> {
        let name = style_name(style_id);
        let url = self.request_url(style_id, request)?;
        log::info!("Requesting styled map '{}' from Mapbox...", name);
        log::debug!("GET {}", crate::redacted(&url));

        let resp = self.inner.get(url).send().map_err(|e| {
            Error::NetworkError(format!(
                "static-map endpoint (style '{}'): {}",
                name,
                e.without_url()
            ))
        })?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            let body = resp
                .text()
                .unwrap_or_else(|e| format!("<unreadable body: {}>", e.without_url()));
            log::warn!("Error for style '{}': {} {}", name, status.as_u16(), body);
            return Ok(StyleOutcome::Rejected {
                style: style_id.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().map_err(|e| {
            Error::NetworkError(format!(
                "static-map endpoint (style '{}'): failed to read body: {}",
                name,
                e.without_url()
            ))
        })?;

        let path = output_dir.join(output_filename(style_id, timestamp));
        std::fs::write(&path, &bytes).map_err(|source| Error::WriteError {
            path: path.clone(),
            source,
        })?;
        log::info!("Styled map image saved as {}", path.display());

        Ok(StyleOutcome::Saved {
            style: style_id.to_string(),
            path,
        })
    }
}
