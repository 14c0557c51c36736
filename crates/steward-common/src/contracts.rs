//! Plugin result contract shared between plugins and the agent framework.
//!
//! The framework consumes plugin results as JSON with PascalCase field names;
//! that wire shape is fixed and versioned by the backing service, not by this
//! crate.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Terminal (or in-flight) status of a plugin invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResultStatus {
    #[default]
    InProgress,
    Success,
    Failed,
    Cancelled,
    TimedOut,
}

impl std::fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultStatus::InProgress => write!(f, "InProgress"),
            ResultStatus::Success => write!(f, "Success"),
            ResultStatus::Failed => write!(f, "Failed"),
            ResultStatus::Cancelled => write!(f, "Cancelled"),
            ResultStatus::TimedOut => write!(f, "TimedOut"),
        }
    }
}

/// Lifecycle state of a single association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssociationStatus {
    #[default]
    Pending,
    InProgress,
    Success,
    Failed,
}

impl std::fmt::Display for AssociationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssociationStatus::Pending => write!(f, "Pending"),
            AssociationStatus::InProgress => write!(f, "InProgress"),
            AssociationStatus::Success => write!(f, "Success"),
            AssociationStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// Error-code taxonomy reported with association status updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssociationErrorCode {
    NoError,
    InvalidAssociation,
    ListAssociationError,
    ExecutionError,
    PendingError,
    StuckAtInProgress,
}

impl std::fmt::Display for AssociationErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssociationErrorCode::NoError => write!(f, ""),
            AssociationErrorCode::InvalidAssociation => write!(f, "InvalidAssoc"),
            AssociationErrorCode::ListAssociationError => write!(f, "ListAssociationError"),
            AssociationErrorCode::ExecutionError => write!(f, "ExecutionError"),
            AssociationErrorCode::PendingError => write!(f, "PendingError"),
            AssociationErrorCode::StuckAtInProgress => write!(f, "StuckAtInProgressError"),
        }
    }
}

/// Aggregate result of one plugin invocation, persisted by the framework.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginResult {
    #[serde(rename = "ExitCode")]
    pub exit_code: i32,

    #[serde(rename = "Status")]
    pub status: ResultStatus,

    #[serde(rename = "Output")]
    pub output: String,

    #[serde(rename = "StandardOutput")]
    pub standard_output: String,

    #[serde(rename = "StandardError")]
    pub standard_error: String,

    #[serde(rename = "StartDateTime")]
    pub start_date_time: Option<DateTime<Utc>>,

    #[serde(rename = "EndDateTime")]
    pub end_date_time: Option<DateTime<Utc>>,
}

/// Truncate `text` to at most `max_bytes` bytes, appending `suffix` when
/// truncation occurs.
///
/// The cut point is floored to the nearest character boundary so the result
/// is always valid UTF-8; for ASCII input the kept prefix is exactly
/// `max_bytes` bytes. Text within the limit is returned unchanged, without
/// the suffix.
pub fn truncate_output(text: &str, suffix: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut cut = max_bytes;
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let mut truncated = text[..cut].to_string();
    truncated.push_str(suffix);
    truncated
}

/// Format a timestamp as ISO-8601 UTC with millisecond precision, the shape
/// the association service expects in status updates.
pub fn to_iso8601_utc(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn truncate_output_within_limit_is_unchanged() {
        assert_eq!(truncate_output("hello", "...", 24000), "hello");
        assert_eq!(truncate_output("", "...", 10), "");
    }

    #[test]
    fn truncate_output_cuts_to_exact_byte_count_plus_suffix() {
        let long = "x".repeat(100);
        let out = truncate_output(&long, "--truncated--", 40);
        assert_eq!(out, format!("{}--truncated--", "x".repeat(40)));
    }

    #[test]
    fn truncate_output_at_exact_limit_keeps_text() {
        let text = "y".repeat(40);
        assert_eq!(truncate_output(&text, "--truncated--", 40), text);
    }

    #[test]
    fn truncate_output_respects_char_boundaries() {
        // Each 'é' is two bytes; a cut at byte 3 would split the second one.
        let text = "ééé";
        let out = truncate_output(text, "+", 3);
        assert_eq!(out, "é+");
    }

    #[test]
    fn truncate_output_empty_suffix() {
        let out = truncate_output("abcdef", "", 3);
        assert_eq!(out, "abc");
    }

    #[test]
    fn result_serializes_with_framework_field_names() {
        let result = PluginResult {
            exit_code: 0,
            status: ResultStatus::Success,
            output: "done".into(),
            standard_output: "done".into(),
            standard_error: String::new(),
            start_date_time: Some(Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()),
            end_date_time: Some(Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 1).unwrap()),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"ExitCode\":0"));
        assert!(json.contains("\"Status\":\"Success\""));
        assert!(json.contains("\"StandardOutput\":\"done\""));
        assert!(json.contains("\"StartDateTime\""));
    }

    #[test]
    fn iso8601_format_millisecond_precision() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 15, 14, 30, 22).unwrap();
        assert_eq!(to_iso8601_utc(ts), "2026-01-15T14:30:22.000Z");
    }

    #[test]
    fn error_code_display_matches_service_taxonomy() {
        assert_eq!(
            AssociationErrorCode::ListAssociationError.to_string(),
            "ListAssociationError"
        );
        assert_eq!(AssociationErrorCode::NoError.to_string(), "");
    }
}
