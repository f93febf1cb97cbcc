//! Transform command handler

use crate::cli::TransformArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::{redaction, timing::Timer};
use crate::output::{OutputWriter, PointResult, TransformReport};
use crsops_core::{MathTransform, RemoteOperationFactory};
use std::io;
use tracing::{info, instrument, warn};

use super::utils::{operation_context, parse_point, read_points};

/// Handle the transform command
#[instrument(skip_all, fields(points = args.points.len()))]
pub fn handle_transform(args: TransformArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let context = operation_context(&args.operation, config)?;
    let _timer = Timer::with_details("transform_command", context.request.format().mime_type());
    let source_dim = args.operation.source_dim;

    // Points are validated before anything is fetched
    let inputs = if args.points.is_empty() {
        output.info("Reading points from stdin")?;
        read_points(io::stdin().lock(), source_dim)?
    } else {
        args.points
            .iter()
            .map(|point| parse_point(point, source_dim))
            .collect::<Result<Vec<_>>>()?
    };
    if inputs.is_empty() {
        return Err(Error::invalid_args("no points to transform; pass --point or pipe them on stdin"));
    }

    info!(
        service_url = %redaction::redact_sensitive(&context.service_url),
        format = %context.request.format(),
        "Building coordinate operation"
    );
    let spinner = output.spinner("Building coordinate operation...");
    let built = RemoteOperationFactory::connect(&context.service_url, context.http.clone())
        .and_then(|factory| {
            let request = &context.request;
            factory.create_operation_with_hints(
                request.source(),
                request.target(),
                request.format(),
                request.hints().clone(),
            )
        });
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let operation = built?;

    let points = transform_all(operation.transform(), inputs);
    let mut metadata = operation.metadata().clone();
    metadata.vendor = redaction::redact_sensitive(&metadata.vendor);

    let report = TransformReport {
        operation: metadata,
        source_dimension: operation.source().dimension(),
        target_dimension: operation.target().dimension(),
        points,
    };
    output.report(&report)?;

    match report.failed() {
        0 => Ok(()),
        failed => Err(Error::PointsFailed {
            failed,
            total: report.points.len(),
        }),
    }
}

/// Transform every point, keeping per-point failures instead of stopping
fn transform_all(transform: &dyn MathTransform, inputs: Vec<Vec<f64>>) -> Vec<PointResult> {
    inputs
        .into_iter()
        .map(|input| match transform.transform(&input) {
            Ok(output) => PointResult {
                input,
                output: Some(output),
                error: None,
            },
            Err(e) => {
                warn!(?input, error = %e, "Point failed to transform");
                PointResult {
                    input,
                    output: None,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect()
}

#[cfg(all(test, feature = "javascript"))]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands, OutputFormat};
    use crate::test_support::{serve_once, Buffer};
    use clap::Parser;

    const SWAP_JS: &str = "class { transform(c) { if (c[0] > 180) throw new Error('bad longitude'); return [c[1], c[0]]; } }";

    fn transform_args(url: &str, points: &[&str]) -> TransformArgs {
        let mut argv = vec![
            "crsops", "transform", "--source", "GEOGCRS[\"WGS 84\"]", "--source-dim", "2",
            "--target", "GEOGCRS[\"WGS 84 (lat,lon)\"]", "--target-dim", "2", "--service-url", url,
        ];
        for point in points {
            argv.push("--point");
            argv.push(point);
        }
        match Cli::parse_from(argv).command {
            Commands::Transform(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_transform_writes_json_report() {
        let (url, server) = serve_once("200 OK", SWAP_JS);
        let buffer = Buffer::default();
        let mut output = OutputWriter::with_writer(OutputFormat::Json, false, false, Box::new(buffer.clone()));

        handle_transform(transform_args(&url, &["1,2", "-3,4"]), &Config::default(), &mut output).unwrap();
        let request_line = server.join().unwrap();
        assert!(request_line.contains("format=text%2Fjavascript"));

        let report: serde_json::Value = serde_json::from_str(&buffer.contents()).unwrap();
        assert_eq!(report["operation"]["name"], "JavaScript operation");
        assert_eq!(report["points"][0]["output"], serde_json::json!([2.0, 1.0]));
        assert_eq!(report["points"][1]["output"], serde_json::json!([4.0, -3.0]));
    }

    #[test]
    fn test_failed_points_are_reported_then_returned() {
        let (url, server) = serve_once("200 OK", SWAP_JS);
        let buffer = Buffer::default();
        let mut output = OutputWriter::with_writer(OutputFormat::Human, false, true, Box::new(buffer.clone()));

        let err = handle_transform(transform_args(&url, &["1,2", "200,0"]), &Config::default(), &mut output)
            .unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, Error::PointsFailed { failed: 1, total: 2 }));
        let table = buffer.contents();
        assert!(table.lines().any(|line| line.starts_with("1, 2") && line.ends_with("│ 2, 1")));
        assert!(table.contains("bad longitude"));
    }

    #[test]
    fn test_invalid_point_fails_before_fetching() {
        let buffer = Buffer::default();
        let mut output = OutputWriter::with_writer(OutputFormat::Json, false, false, Box::new(buffer));

        // Nothing listens on this address; a fetch would fail with a network error instead
        let err = handle_transform(
            transform_args("http://127.0.0.1:9/operation", &["1,2,3"]),
            &Config::default(),
            &mut output,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidPoint { .. }));
    }
}
