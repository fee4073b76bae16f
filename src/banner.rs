//! The banner pipeline: route, overlay, then one image per style.

use std::path::PathBuf;

use crate::directions::{DirectionsClient, Route};
use crate::static_map::{StaticMapClient, StaticMapRequest};
use crate::{Config, Error, Overlay, Result};

pub use crate::static_map::{RenderTimestamp, StyleOutcome};

/// Per-style results of one run, in request order
#[derive(Debug, Clone)]
pub struct BannerReport {
    pub timestamp: RenderTimestamp,
    pub route_points: usize,
    pub outcomes: Vec<StyleOutcome>,
}

impl BannerReport {
    pub fn saved_paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.outcomes.iter().filter_map(|o| match o {
            StyleOutcome::Saved { path, .. } => Some(path),
            StyleOutcome::Rejected { .. } => None,
        })
    }

    pub fn rejected(&self) -> impl Iterator<Item = &StyleOutcome> {
        self.outcomes.iter().filter(|o| !o.is_saved())
    }

    pub fn all_saved(&self) -> bool {
        self.outcomes.iter().all(StyleOutcome::is_saved)
    }
}

/// The two endpoint clients for a run, sharing one HTTP connection pool
pub struct Banner<'a> {
    config: &'a Config,
    directions: DirectionsClient,
    static_map: StaticMapClient,
}

impl<'a> Banner<'a> {
    pub fn new(config: &'a Config) -> Result<Self> {
        let http = crate::http_client(config.timeout_ms)?;
        let directions = DirectionsClient::new(http.clone(), &config.api_base, &config.access_token)?;
        let static_map = StaticMapClient::new(http, &config.api_base, &config.access_token)?;

        Ok(Self {
            config,
            directions,
            static_map,
        })
    }

    /// Fetch the route and compose the overlay shared by every style.
    pub fn prepare(&self) -> Result<(Route, Overlay)> {
        let route = self.directions.fetch_route(self.config.start, self.config.end)?;
        log::info!("Route has {} points", route.len());
        let overlay = Overlay::compose(&route, self.config.start, self.config.end)?;
        Ok((route, overlay))
    }

    /// Static-map URLs for every configured style, without fetching them.
    pub fn plan(&self, overlay: &Overlay) -> Result<Vec<url::Url>> {
        let request = StaticMapRequest::new(overlay)?;
        self.config
            .styles
            .iter()
            .map(|style| self.static_map.request_url(style, &request))
            .collect()
    }

    /// Render every style in order. A rejected style does not stop the others.
    pub fn render_all(&self, overlay: &Overlay, timestamp: RenderTimestamp) -> Result<Vec<StyleOutcome>> {
        let request = StaticMapRequest::new(overlay)?;

        if !self.config.styles.is_empty() {
            std::fs::create_dir_all(&self.config.output_dir).map_err(|source| Error::WriteError {
                path: self.config.output_dir.clone(),
                source,
            })?;
        }

        let mut outcomes = Vec::with_capacity(self.config.styles.len());
        for style in &self.config.styles {
            let outcome = self
                .static_map
                .render(style, &request, &timestamp, &self.config.output_dir)?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}

/// Run the whole pipeline for `config`.
pub fn run(config: &Config) -> Result<BannerReport> {
    let banner = Banner::new(config)?;
    let (route, overlay) = banner.prepare()?;

    if config.styles.is_empty() {
        log::warn!("No styles configured; nothing to render");
    }

    let timestamp = RenderTimestamp::now();
    let outcomes = banner.render_all(&overlay, timestamp)?;

    Ok(BannerReport {
        timestamp,
        route_points: route.len(),
        outcomes,
    })
}
