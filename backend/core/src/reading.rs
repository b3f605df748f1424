use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome classification of one read cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadStatus {
    Success,
    Error,
}

impl ReadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadStatus::Success => "success",
            ReadStatus::Error => "error",
        }
    }
}

/// The record produced by exactly one read cycle.
///
/// `value` is present iff `status` is `Success`; the constructors are the only
/// way to build one, so the pairing cannot drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub status: ReadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ReadResult {
    pub fn success(value: f64) -> Self {
        Self {
            value: Some(value),
            status: ReadStatus::Success,
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(error: impl ToString) -> Self {
        Self {
            value: None,
            status: ReadStatus::Error,
            error: Some(error.to_string()),
            timestamp: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ReadStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_carries_value_and_no_error() {
        let r = ReadResult::success(87.18);
        assert_eq!(r.status, ReadStatus::Success);
        assert_eq!(r.value, Some(87.18));
        assert!(r.error.is_none());
    }

    #[test]
    fn failure_carries_error_and_no_value() {
        let r = ReadResult::failure("no image");
        assert_eq!(r.status, ReadStatus::Error);
        assert!(r.value.is_none());
        assert_eq!(r.error.as_deref(), Some("no image"));
    }

    #[test]
    fn value_present_iff_success() {
        for r in [ReadResult::success(1.0), ReadResult::failure("boom")] {
            assert_eq!(r.value.is_some(), r.is_success());
        }
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_value(ReadResult::success(2.5)).unwrap();
        assert_eq!(json["status"], "success");
        assert!(json.get("error").is_none());
    }
}
