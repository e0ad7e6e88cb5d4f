//! Job type and descriptor classification

use crate::core::error::RejectReason;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Category of work a job represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    /// Plain text documents
    #[serde(alias = "txt")]
    Text,
    /// PDF documents
    Pdf,
    /// Images
    #[serde(alias = "png")]
    Image,
}

impl JobKind {
    /// Every known kind, in declaration order.
    pub const ALL: [JobKind; 3] = [JobKind::Text, JobKind::Pdf, JobKind::Image];

    /// Canonical lowercase name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Text => "text",
            JobKind::Pdf => "pdf",
            JobKind::Image => "image",
        }
    }

    /// Resolve a descriptor's type token, accepting the short extensions
    /// `txt` and `png` alongside the canonical names.
    ///
    /// Matching is case-insensitive.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "text" | "txt" => Some(JobKind::Text),
            "pdf" => Some(JobKind::Pdf),
            "image" | "png" => Some(JobKind::Image),
            _ => None,
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable unit of work handed from a producer to a consumer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Job {
    name: String,
    kind: JobKind,
    payload: Option<String>,
}

impl Job {
    /// Create a job without a payload
    pub fn new(name: impl Into<String>, kind: JobKind) -> Self {
        Self {
            name: name.into(),
            kind,
            payload: None,
        }
    }

    /// Attach a payload while constructing the job
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Job name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Job kind
    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// Optional payload
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.kind)
    }
}

/// Outcome of classifying a raw descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The descriptor produced a job
    Accepted(Job),
    /// The descriptor was dropped
    Rejected(RejectReason),
}

impl Classification {
    /// Whether the descriptor was accepted
    pub fn is_accepted(&self) -> bool {
        matches!(self, Classification::Accepted(_))
    }
}

/// The set of job kinds a run accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupportedTypes(BTreeSet<JobKind>);

impl Default for SupportedTypes {
    fn default() -> Self {
        Self::all()
    }
}

impl SupportedTypes {
    /// Accept every known kind
    pub fn all() -> Self {
        Self(JobKind::ALL.into_iter().collect())
    }

    /// Accept only the given kinds
    pub fn only(kinds: impl IntoIterator<Item = JobKind>) -> Self {
        Self(kinds.into_iter().collect())
    }

    /// Parse a comma separated list such as `"text,pdf"`.
    ///
    /// Returns the first unknown token on failure.
    pub fn parse_list(list: &str) -> std::result::Result<Self, String> {
        list.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| JobKind::from_extension(t).ok_or_else(|| t.to_string()))
            .collect::<std::result::Result<BTreeSet<_>, _>>()
            .map(Self)
    }

    /// Whether `kind` is accepted
    pub fn contains(&self, kind: JobKind) -> bool {
        self.0.contains(&kind)
    }

    /// Whether no kind is accepted
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over accepted kinds
    pub fn iter(&self) -> impl Iterator<Item = JobKind> + '_ {
        self.0.iter().copied()
    }

    /// Split a raw descriptor such as `"file3.png"` into a job.
    ///
    /// The type is everything after the last `.`, so `"a.b.pdf"` names job
    /// `a.b`. Surrounding whitespace is ignored. A descriptor with no `.`, an
    /// empty name or an empty type is malformed.
    pub fn classify(&self, descriptor: &str) -> Classification {
        let Some((name, ext)) = descriptor.trim().rsplit_once('.') else {
            return Classification::Rejected(RejectReason::MalformedDescriptor);
        };
        if name.is_empty() || ext.is_empty() {
            return Classification::Rejected(RejectReason::MalformedDescriptor);
        }

        match JobKind::from_extension(ext) {
            Some(kind) if self.contains(kind) => Classification::Accepted(Job::new(name, kind)),
            _ => Classification::Rejected(RejectReason::UnsupportedType(ext.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_accepts_supported_kinds() {
        let types = SupportedTypes::all();
        assert_eq!(
            types.classify("a.text"),
            Classification::Accepted(Job::new("a", JobKind::Text))
        );
        assert_eq!(
            types.classify("file3.png"),
            Classification::Accepted(Job::new("file3", JobKind::Image))
        );
        assert_eq!(
            types.classify("  report.PDF \n"),
            Classification::Accepted(Job::new("report", JobKind::Pdf))
        );
    }

    #[test]
    fn test_classify_rejects_unsupported_type() {
        let types = SupportedTypes::all();
        assert_eq!(
            types.classify("d.bin"),
            Classification::Rejected(RejectReason::UnsupportedType("bin".to_string()))
        );
        assert_eq!(
            types.classify("file4.jpg"),
            Classification::Rejected(RejectReason::UnsupportedType("jpg".to_string()))
        );
    }

    #[test]
    fn test_classify_respects_configured_subset() {
        let types = SupportedTypes::only([JobKind::Pdf]);
        assert!(types.classify("b.pdf").is_accepted());
        assert_eq!(
            types.classify("a.txt"),
            Classification::Rejected(RejectReason::UnsupportedType("txt".to_string()))
        );
    }

    #[test]
    fn test_classify_malformed() {
        let types = SupportedTypes::all();
        for raw in ["noext", "", ".pdf", "name.", "   "] {
            assert_eq!(
                types.classify(raw),
                Classification::Rejected(RejectReason::MalformedDescriptor),
                "descriptor {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_classify_uses_last_separator() {
        let types = SupportedTypes::all();
        match types.classify("archive.v2.pdf") {
            Classification::Accepted(job) => {
                assert_eq!(job.name(), "archive.v2");
                assert_eq!(job.kind(), JobKind::Pdf);
            }
            other => panic!("expected accepted job, got {:?}", other),
        }
    }

    #[test]
    fn test_job_display_and_payload() {
        let job = Job::new("c", JobKind::Image).with_payload("pixels");
        assert_eq!(job.to_string(), "c.image");
        assert_eq!(job.payload(), Some("pixels"));
        assert_eq!(Job::new("a", JobKind::Text).payload(), None);
    }

    #[test]
    fn test_parse_list() {
        let types = SupportedTypes::parse_list("txt, pdf").unwrap();
        assert!(types.contains(JobKind::Text));
        assert!(types.contains(JobKind::Pdf));
        assert!(!types.contains(JobKind::Image));

        assert_eq!(SupportedTypes::parse_list("pdf,gif"), Err("gif".to_string()));
    }

    #[test]
    fn test_supported_types_serde() {
        let types: SupportedTypes = serde_json::from_str(r#"["txt", "image"]"#).unwrap();
        assert_eq!(types, SupportedTypes::only([JobKind::Text, JobKind::Image]));
        assert_eq!(serde_json::to_string(&types).unwrap(), r#"["text","image"]"#);
    }
}
