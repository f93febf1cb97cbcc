//! Core data types for crsops
//!
//! Reference system descriptors, format tags, operation requests and the
//! metadata attached to every constructed coordinate operation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Source dialect requested from the code service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FormatTag {
    /// `text/javascript`: the body is a class expression
    #[default]
    #[serde(rename = "text/javascript")]
    JavaScript,
    /// `text/x-python`: the body defines a class named `Operation`
    #[serde(rename = "text/x-python")]
    Python,
}

impl FormatTag {
    pub const JAVASCRIPT_MIME: &'static str = "text/javascript";
    pub const PYTHON_MIME: &'static str = "text/x-python";

    /// MIME-like tag sent as the `format` query parameter
    pub fn mime_type(&self) -> &'static str {
        match self {
            FormatTag::JavaScript => Self::JAVASCRIPT_MIME,
            FormatTag::Python => Self::PYTHON_MIME,
        }
    }

    /// Human readable dialect name
    pub fn display_name(&self) -> &'static str {
        match self {
            FormatTag::JavaScript => "JavaScript",
            FormatTag::Python => "Python",
        }
    }

    /// Parse a MIME-like format tag, rejecting anything but the two dialects
    pub fn parse(tag: &str) -> Result<Self> {
        match tag.trim() {
            t if t.eq_ignore_ascii_case(Self::JAVASCRIPT_MIME) => Ok(FormatTag::JavaScript),
            t if t.eq_ignore_ascii_case(Self::PYTHON_MIME) => Ok(FormatTag::Python),
            other => Err(Error::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

impl FromStr for FormatTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Serialized reference system plus its dimensionality
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceSystemDescriptor {
    wkt: String,
    dimension: usize,
}

impl ReferenceSystemDescriptor {
    /// Create a descriptor; the dimension is the coordinate system rank
    pub fn new(wkt: impl Into<String>, dimension: usize) -> Result<Self> {
        let wkt = wkt.into();
        if wkt.trim().is_empty() {
            return Err(Error::InvalidDescriptor {
                message: "WKT text is empty".to_string(),
            });
        }
        if dimension == 0 {
            return Err(Error::InvalidDescriptor {
                message: "dimension must be at least 1".to_string(),
            });
        }
        Ok(Self { wkt, dimension })
    }

    pub fn wkt(&self) -> &str {
        &self.wkt
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Bounding box in degrees, sent as `aoi=west,south,east,north`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaOfInterest {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl AreaOfInterest {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self { west, south, east, north }
    }

    pub(crate) fn to_query_value(self) -> String {
        format!("{},{},{},{}", self.west, self.south, self.east, self.north)
    }
}

/// Optional parameters that narrow the operation chosen by the code service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationHints {
    /// Force longitude-first axis order on the source system
    pub source_longitude_first: bool,
    /// Force longitude-first axis order on the target system
    pub target_longitude_first: bool,
    pub area_of_interest: Option<AreaOfInterest>,
    /// Epoch the operation must be valid for
    pub time: Option<DateTime<Utc>>,
}

impl OperationHints {
    pub fn with_area_of_interest(mut self, area: AreaOfInterest) -> Self {
        self.area_of_interest = Some(area);
        self
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_longitude_first(mut self, source: bool, target: bool) -> Self {
        self.source_longitude_first = source;
        self.target_longitude_first = target;
        self
    }

    /// Extra query pairs, empty when no hint is set
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if self.source_longitude_first {
            pairs.push(("sourceLongitudeFirst", "true".to_string()));
        }
        if self.target_longitude_first {
            pairs.push(("targetLongitudeFirst", "true".to_string()));
        }
        if let Some(area) = self.area_of_interest {
            pairs.push(("aoi", area.to_query_value()));
        }
        if let Some(time) = self.time {
            pairs.push(("time", time.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        pairs
    }
}

/// Everything needed to ask the code service for one operation
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRequest {
    source: ReferenceSystemDescriptor,
    target: ReferenceSystemDescriptor,
    format: FormatTag,
    hints: OperationHints,
}

impl OperationRequest {
    pub fn new(
        source: ReferenceSystemDescriptor,
        target: ReferenceSystemDescriptor,
        format: FormatTag,
    ) -> Self {
        Self {
            source,
            target,
            format,
            hints: OperationHints::default(),
        }
    }

    /// Build a request from a raw format tag; unknown tags are rejected here
    pub fn from_tag(
        source: ReferenceSystemDescriptor,
        target: ReferenceSystemDescriptor,
        tag: &str,
    ) -> Result<Self> {
        Ok(Self::new(source, target, FormatTag::parse(tag)?))
    }

    pub fn with_hints(mut self, hints: OperationHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn source(&self) -> &ReferenceSystemDescriptor {
        &self.source
    }

    pub fn target(&self) -> &ReferenceSystemDescriptor {
        &self.target
    }

    pub fn format(&self) -> FormatTag {
        self.format
    }

    pub fn hints(&self) -> &OperationHints {
        &self.hints
    }
}

/// Source text returned by the code service, consumed by compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedSource {
    text: String,
    format: FormatTag,
}

impl FetchedSource {
    pub fn new(text: impl Into<String>, format: FormatTag) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn format(&self) -> FormatTag {
        self.format
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Descriptive properties of a constructed coordinate operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationMetadata {
    /// `"<Dialect> operation"`
    pub name: String,
    pub dialect: FormatTag,
    /// Identity of the service that generated the code
    pub vendor: String,
}

impl OperationMetadata {
    pub fn new(dialect: FormatTag, vendor: impl Into<String>) -> Self {
        Self {
            name: format!("{} operation", dialect.display_name()),
            dialect,
            vendor: vendor.into(),
        }
    }
}

/// Operation method reference, only used to reject method-based construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationMethod {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_tag_parsing() {
        assert_eq!(FormatTag::parse("text/javascript").unwrap(), FormatTag::JavaScript);
        assert_eq!(FormatTag::parse(" TEXT/X-PYTHON ").unwrap(), FormatTag::Python);
        assert_eq!("text/javascript".parse::<FormatTag>().unwrap(), FormatTag::JavaScript);

        for tag in ["application/json", "javascript", "", "text/python"] {
            let err = FormatTag::parse(tag).unwrap_err();
            assert!(matches!(err, Error::UnsupportedFormat { .. }), "{tag} accepted");
        }
    }

    #[test]
    fn test_format_tag_defaults_to_javascript() {
        assert_eq!(FormatTag::default(), FormatTag::JavaScript);
        assert_eq!(FormatTag::Python.mime_type(), "text/x-python");
        assert_eq!(FormatTag::JavaScript.to_string(), "JavaScript");
    }

    #[test]
    fn test_descriptor_validation() {
        let descriptor = ReferenceSystemDescriptor::new("GEOGCRS[\"WGS 84\"]", 2).unwrap();
        assert_eq!(descriptor.dimension(), 2);
        assert_eq!(descriptor.wkt(), "GEOGCRS[\"WGS 84\"]");

        assert!(matches!(
            ReferenceSystemDescriptor::new("GEOGCRS[\"WGS 84\"]", 0),
            Err(Error::InvalidDescriptor { .. })
        ));
        assert!(matches!(
            ReferenceSystemDescriptor::new("   ", 2),
            Err(Error::InvalidDescriptor { .. })
        ));
    }

    #[test]
    fn test_request_from_unknown_tag_is_rejected() {
        let source = ReferenceSystemDescriptor::new("A", 2).unwrap();
        let target = ReferenceSystemDescriptor::new("B", 2).unwrap();
        assert!(OperationRequest::from_tag(source.clone(), target.clone(), "text/plain").is_err());

        let request = OperationRequest::from_tag(source, target, "text/x-python").unwrap();
        assert_eq!(request.format(), FormatTag::Python);
        assert_eq!(request.hints(), &OperationHints::default());
    }

    #[test]
    fn test_hints_query_pairs() {
        assert!(OperationHints::default().query_pairs().is_empty());

        let time = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let hints = OperationHints::default()
            .with_longitude_first(true, false)
            .with_area_of_interest(AreaOfInterest::new(-5.5, 41.0, 10.0, 51.5))
            .with_time(time);

        assert_eq!(
            hints.query_pairs(),
            vec![
                ("sourceLongitudeFirst", "true".to_string()),
                ("aoi", "-5.5,41,10,51.5".to_string()),
                ("time", "2024-03-01T12:00:00Z".to_string()),
            ]
        );
    }

    #[test]
    fn test_metadata_name_follows_dialect() {
        let metadata = OperationMetadata::new(FormatTag::Python, "http://localhost/operation");
        assert_eq!(metadata.name, "Python operation");
        assert_eq!(OperationMetadata::new(FormatTag::JavaScript, "x").name, "JavaScript operation");
    }
}
