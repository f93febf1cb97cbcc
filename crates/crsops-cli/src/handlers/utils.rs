//! Shared utilities for command handlers

use crate::cli::OperationArgs;
use crate::config::Config;
use crate::error::{Error, ErrorContext, Result};
use crsops_core::{HttpClientConfig, OperationRequest, ReferenceSystemDescriptor};
use std::fs;
use std::io::BufRead;
use std::path::Path;
use std::time::Duration;

/// Everything needed to contact the code service for one operation
#[derive(Debug)]
pub struct OperationContext {
    pub service_url: String,
    pub http: HttpClientConfig,
    pub request: OperationRequest,
}

/// Resolve command-line arguments against the configuration
pub fn operation_context(args: &OperationArgs, config: &Config) -> Result<OperationContext> {
    let service_url = match &args.service_url {
        Some(url) => url.clone(),
        None => config.service_url()?.to_string(),
    };

    let mut http = config.http_config();
    if let Some(seconds) = args.timeout {
        http.timeout = Some(Duration::from_secs(seconds));
    }

    let source = ReferenceSystemDescriptor::new(load_wkt(&args.source)?, args.source_dim)?;
    let target = ReferenceSystemDescriptor::new(load_wkt(&args.target)?, args.target_dim)?;
    let format = args.format.map(Into::into).unwrap_or(config.default_format);

    Ok(OperationContext {
        service_url,
        http,
        request: OperationRequest::new(source, target, format).with_hints(args.hints()),
    })
}

/// WKT given inline, or read from a file when prefixed with `@`
pub fn load_wkt(argument: &str) -> Result<String> {
    let Some(path) = argument.strip_prefix('@') else {
        return Ok(argument.to_string());
    };

    let path = Path::new(path);
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read WKT from {}", path.display()))?;
    Ok(content.trim().to_string())
}

/// Parse `x,y[,z...]` (commas or whitespace) into exactly `dimension` coordinates
pub fn parse_point(input: &str, dimension: usize) -> Result<Vec<f64>> {
    let coordinates = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f64>().map_err(|e| Error::InvalidPoint {
                input: input.to_string(),
                message: format!("'{}': {}", part, e),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if coordinates.len() != dimension {
        return Err(Error::InvalidPoint {
            input: input.to_string(),
            message: format!("expected {} coordinates, got {}", dimension, coordinates.len()),
        });
    }
    Ok(coordinates)
}

/// Read one point per line, skipping blank lines and `#` comments
pub fn read_points(reader: impl BufRead, dimension: usize) -> Result<Vec<Vec<f64>>> {
    let mut points = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        points.push(parse_point(trimmed, dimension)?);
    }
    Ok(points)
}
