//! Shared test support utilities for integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use crsops_core::{CodeSource, FetchedSource, OperationRequest, ReferenceSystemDescriptor, Result};

pub const WGS84_WKT: &str = r#"GEOGCRS["WGS 84",DATUM["World Geodetic System 1984",ELLIPSOID["WGS 84",6378137,298.257223563]],CS[ellipsoidal,2],AXIS["longitude",east],AXIS["latitude",north],UNIT["degree",0.0174532925199433],ID["EPSG",4326]]"#;

pub const PSEUDO_MERCATOR_WKT: &str = r#"PROJCRS["WGS 84 / Pseudo-Mercator",BASEGEOGCRS["WGS 84",DATUM["World Geodetic System 1984",ELLIPSOID["WGS 84",6378137,298.257223563]]],CONVERSION["Popular Visualisation Pseudo-Mercator",METHOD["Popular Visualisation Pseudo Mercator"]],CS[Cartesian,2],AXIS["easting (X)",east],AXIS["northing (Y)",north],UNIT["metre",1],ID["EPSG",3857]]"#;

/// Spherical Pseudo-Mercator, the kind of class the code service generates
pub const MERCATOR_JS: &str = r#"class {
    transform(coords) {
        const R = 6378137.0;
        const lon = coords[0] * Math.PI / 180.0;
        const lat = coords[1] * Math.PI / 180.0;
        return [R * lon, R * Math.log(Math.tan(Math.PI / 4.0 + lat / 2.0))];
    }
}"#;

pub const IDENTITY_PY: &str = "class Operation:\n    def transform(self, coords):\n        return list(coords)\n";

pub fn wgs84() -> ReferenceSystemDescriptor {
    ReferenceSystemDescriptor::new(WGS84_WKT, 2).expect("valid descriptor")
}

pub fn pseudo_mercator() -> ReferenceSystemDescriptor {
    ReferenceSystemDescriptor::new(PSEUDO_MERCATOR_WKT, 2).expect("valid descriptor")
}

pub fn descriptor(dimension: usize) -> ReferenceSystemDescriptor {
    ReferenceSystemDescriptor::new(format!("ENGCRS[\"test {}D\"]", dimension), dimension)
        .expect("valid descriptor")
}

/// Code source serving fixed text and recording every request
pub struct StaticSource {
    text: String,
    requests: RefCell<Vec<OperationRequest>>,
}

impl StaticSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn requests(&self) -> Vec<OperationRequest> {
        self.requests.borrow().clone()
    }
}

impl CodeSource for StaticSource {
    fn fetch(&self, request: &OperationRequest) -> Result<FetchedSource> {
        self.requests.borrow_mut().push(request.clone());
        Ok(FetchedSource::new(self.text.clone(), request.format()))
    }

    fn vendor(&self) -> &str {
        "static"
    }
}

/// Serve exactly one HTTP response on a loopback port
///
/// Returns the base URL and a handle yielding the raw request line.
pub fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let address = listener.local_addr().expect("local address");
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept connection");
        let mut head = Vec::new();
        let mut buffer = [0u8; 1024];
        while !head.windows(4).any(|window| window == b"\r\n\r\n") {
            let read = stream.read(&mut buffer).expect("read request");
            if read == 0 {
                break;
            }
            head.extend_from_slice(&buffer[..read]);
        }
        stream.write_all(response.as_bytes()).expect("write response");
        stream.flush().expect("flush response");

        String::from_utf8_lossy(&head)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    });

    (format!("http://{}/operation", address), handle)
}

/// Base URL of a loopback port nothing listens on
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let address = listener.local_addr().expect("local address");
    drop(listener);
    format!("http://{}/operation", address)
}
