//! Fetch command handler

use crate::cli::{FetchArgs, OutputFormat};
use crate::config::Config;
use crate::error::Result;
use crate::logging::{redaction, timing::Timer};
use crate::output::OutputWriter;
use crsops_core::{FormatTag, TransformCodeClient};
use serde::Serialize;
use std::fs;
use tracing::{debug, instrument};

use super::utils::operation_context;

/// Generated source as printed by machine output formats
#[derive(Debug, Serialize)]
struct SourceListing {
    format: FormatTag,
    vendor: String,
    source: String,
}

/// Handle the fetch command
#[instrument(skip_all)]
pub fn handle_fetch(args: FetchArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let context = operation_context(&args.operation, config)?;
    let _timer = Timer::with_details("fetch_command", context.request.format().mime_type());

    let spinner = output.spinner("Fetching operation source...");
    let fetched = TransformCodeClient::new(&context.service_url, context.http)
        .and_then(|client| client.fetch(&context.request));
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let fetched = fetched?;
    debug!(bytes = fetched.text().len(), "Source fetched");

    if let Some(path) = args.save_to {
        fs::write(&path, fetched.text())?;
        return output.success(&format!("✓ Source saved to {}", path.display()));
    }

    match output.format() {
        OutputFormat::Human => {
            let text = fetched.into_text();
            if text.ends_with('\n') {
                output.write(&text)
            } else {
                output.writeln(&text)
            }
        }
        _ => output.data(&SourceListing {
            format: fetched.format(),
            vendor: redaction::redact_sensitive(&context.service_url),
            source: fetched.into_text(),
        }),
    }
}
