//! A tiny_http stand-in for the Mapbox Directions and Static Images APIs.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use base64::Engine as _;
use routebanner::{Config, Coordinate};
use tiny_http::{Header, Response, Server, StatusCode};

/// 1x1 PNG served as every successful static-map image
pub const PNG_FIXTURE: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

pub fn png_bytes() -> Vec<u8> {
    base64::engine::general_purpose::STANDARD
        .decode(PNG_FIXTURE)
        .expect("fixture is valid base64")
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    hex::encode(Sha256::digest(bytes))
}

#[derive(Clone, Copy)]
struct Rejection {
    status: u16,
    truncated: bool,
}

pub struct MockMapbox {
    pub base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockMapbox {
    /// Serve `directions_body` with `directions_status` for directions calls, and
    /// the PNG fixture for static-map calls unless the style's short name is in
    /// `rejected` (then that status with body "Forbidden").
    pub fn start(directions_status: u16, directions_body: &str, rejected: &[(&str, u16)]) -> Self {
        let styles = rejected
            .iter()
            .map(|(name, status)| (name.to_string(), Rejection { status: *status, truncated: false }))
            .collect();
        Self::spawn(directions_status, directions_body, styles)
    }

    /// Like `start`, but the rejected style announces a longer body than it
    /// sends and then stalls, so the client cannot read the error body.
    pub fn start_truncated(directions_body: &str, name: &str, status: u16) -> Self {
        let mut styles = HashMap::new();
        styles.insert(name.to_string(), Rejection { status, truncated: true });
        Self::spawn(200, directions_body, styles)
    }

    fn spawn(directions_status: u16, directions_body: &str, rejected: HashMap<String, Rejection>) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let base = format!("http://{}", server.server_addr());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = requests.clone();
        let directions_body = directions_body.to_string();

        std::thread::spawn(move || {
            for request in server.incoming_requests() {
                let url = request.url().to_string();
                seen.lock().unwrap().push(url.clone());

                if url.starts_with("/directions/") {
                    let resp = Response::from_string(directions_body.clone())
                        .with_status_code(directions_status)
                        .with_header("Content-Type: application/json".parse::<Header>().unwrap());
                    let _ = request.respond(resp);
                } else if let Some(rest) = url.strip_prefix("/styles/v1/") {
                    let name = rest.split('/').nth(1).unwrap_or_default();
                    match rejected.get(name) {
                        Some(Rejection { status, truncated: false }) => {
                            let _ = request.respond(Response::from_string("Forbidden").with_status_code(*status));
                        }
                        Some(Rejection { status, truncated: true }) => {
                            let resp = Response::new(
                                StatusCode(*status),
                                vec![],
                                std::io::Cursor::new(b"Forb".to_vec()),
                                Some(64),
                                None,
                            );
                            let _ = request.respond(resp);
                        }
                        None => {
                            let resp = Response::from_data(png_bytes())
                                .with_header("Content-Type: image/png".parse::<Header>().unwrap());
                            let _ = request.respond(resp);
                        }
                    }
                } else {
                    let _ = request.respond(Response::from_string("Not Found").with_status_code(404));
                }
            }
        });

        Self { base, requests }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn static_requests(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|u| u.starts_with("/styles/"))
            .collect()
    }
}

pub fn route_body(points: &[[f64; 2]]) -> String {
    serde_json::json!({
        "code": "Ok",
        "routes": [{
            "geometry": { "type": "LineString", "coordinates": points },
            "distance": 250.0,
            "duration": 180.0
        }],
        "waypoints": []
    })
    .to_string()
}

pub fn config(base: &str, styles: &[&str], output_dir: PathBuf) -> Config {
    config_with_timeout(base, styles, output_dir, 5000)
}

pub fn config_with_timeout(base: &str, styles: &[&str], output_dir: PathBuf, timeout_ms: u64) -> Config {
    Config {
        access_token: "pk.test-token".into(),
        styles: styles.iter().map(|s| s.to_string()).collect(),
        start: Coordinate::new(0.0, 0.0),
        end: Coordinate::new(2.0, 2.0),
        api_base: base.to_string(),
        output_dir,
        timeout_ms,
    }
}

pub fn written_files(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
