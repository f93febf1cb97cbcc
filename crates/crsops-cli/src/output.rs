//! Output formatting and writing utilities
//!
//! Results are written as human-readable tables or serialized as JSON/YAML,
//! depending on `--output`. Status messages only appear in human mode so
//! machine formats stay parseable.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use crsops_core::OperationMetadata;
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;
use tracing::trace;

/// One transformed point, or the reason it could not be transformed
#[derive(Debug, Clone, Serialize)]
pub struct PointResult {
    pub input: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything the transform command reports
#[derive(Debug, Clone, Serialize)]
pub struct TransformReport {
    pub operation: OperationMetadata,
    pub source_dimension: usize,
    pub target_dimension: usize,
    pub points: Vec<PointResult>,
}

impl TransformReport {
    pub fn failed(&self) -> usize {
        self.points.iter().filter(|p| p.error.is_some()).count()
    }
}

/// Trait for formatting output
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a transform report
    fn format_report(&self, report: &TransformReport) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_report(&self, report: &TransformReport) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_report_human(report)),
            other => other.format(report),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, progress: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: progress && !quiet && io::stderr().is_terminal(),
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(format: OutputFormat, use_color: bool, quiet: bool, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color,
            show_progress: false,
            quiet,
            writer,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        self.emit(formatted)
    }

    /// Write a transform report in the configured format
    pub fn report(&mut self, report: &TransformReport) -> Result<()> {
        trace!(points = report.points.len(), failed = report.failed(), "Writing report");
        let formatted = self.format.format_report(report)?;
        self.emit(formatted)
    }

    fn emit(&mut self, formatted: String) -> Result<()> {
        if formatted.ends_with('\n') {
            self.write(&formatted)
        } else {
            self.writeln(&formatted)
        }
    }

    /// Create a spinner for indeterminate progress
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(default_spinner_style());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }
}

/// Helper function to create a spinner style
pub fn default_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
}

/// Format a transform report as an aligned table
fn format_report_human(report: &TransformReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("Operation: {}\n", report.operation.name));
    output.push_str(&format!("Vendor: {}\n", report.operation.vendor));
    output.push_str(&format!(
        "Dimensions: {} -> {}\n\n",
        report.source_dimension, report.target_dimension
    ));

    let rows: Vec<[String; 2]> = report
        .points
        .iter()
        .map(|point| {
            let result = match (&point.output, &point.error) {
                (Some(values), _) => join_coordinates(values),
                (None, Some(error)) => format!("error: {}", error),
                (None, None) => String::new(),
            };
            [join_coordinates(&point.input), result]
        })
        .collect();

    let width = rows
        .iter()
        .map(|row| row[0].len())
        .chain(std::iter::once("Input".len()))
        .max()
        .unwrap_or_default();

    output.push_str(&format!("{:width$} │ Output\n", "Input", width = width));
    output.push_str(&format!("{}─┼─{}\n", "─".repeat(width), "─".repeat(6)));
    for [input, result] in rows {
        output.push_str(&format!("{:width$} │ {}\n", input, result, width = width));
    }

    output
}

fn join_coordinates(values: &[f64]) -> String {
    values
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
