//! Scrubs API keys from strings before they reach logs or error output.

use once_cell::sync::Lazy;
use regex::Regex;

static API_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"sk-ant-[a-zA-Z0-9\-_]{8,}").unwrap());

/// Redacts Anthropic API keys, keeping the prefix so logs stay diagnosable.
pub fn redact_secrets(input: &str) -> String {
    API_KEY_RE.replace_all(input, "sk-ant-[REDACTED]").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_api_keys() {
        let raw = "calling with key sk-ant-REDACTED";
        let clean = redact_secrets(raw);
        assert!(!clean.contains("abcdef1234567890"));
        assert!(clean.contains("sk-ant-[REDACTED]"));
    }

    #[test]
    fn leaves_ordinary_text_alone() {
        let raw = "meter value 87.18 from camera meter_cam";
        assert_eq!(redact_secrets(raw), raw);
    }
}
