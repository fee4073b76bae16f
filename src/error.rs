//! Error types for the banner pipeline

use std::path::PathBuf;

use thiserror::Error;

use crate::Coordinate;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can stop a banner run
#[derive(Error, Debug)]
pub enum Error {
    /// A required setting is absent or empty
    #[error("{0} is not set")]
    MissingSetting(&'static str),

    /// A setting is present but its value cannot be used
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Transport failure while talking to one of the endpoints
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The directions endpoint answered with something other than a route list
    #[error("Directions request failed: {0}")]
    RouteError(String),

    /// The directions endpoint found no route between the two points
    #[error("No route found between {start} and {end}")]
    NoRoute { start: Coordinate, end: Coordinate },

    /// An image could not be written to disk
    #[error("Failed to write {}: {source}", .path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// True for errors raised before any network activity
    pub fn is_config(&self) -> bool {
        matches!(self, Error::MissingSetting(_) | Error::ConfigError(_))
    }
}
