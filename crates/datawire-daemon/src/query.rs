//! UI query protocol.

use datawire_ledger::UsageSnapshot;
use datawire_types::TransferRate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error text for an unrecognized or missing action.
pub const UNKNOWN_ACTION: &str = "Unknown action";

/// Error text for a query that did not finish in time.
pub const QUERY_TIMED_OUT: &str = "Query timed out";

/// A query from the UI, keyed by `action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum QueryRequest {
    /// Full usage snapshot.
    GetUsageData,
    /// Start a new session.
    ResetSession,
    /// Drop all usage data.
    ClearAllData,
    /// Current transfer rate.
    GetTransferRate,
    /// Anything else.
    #[serde(other)]
    Unknown,
}

impl QueryRequest {
    /// Decodes a query, mapping anything unrecognized to [`Self::Unknown`].
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or(Self::Unknown)
    }

    /// Whether the action changes stored usage.
    #[must_use]
    pub const fn is_mutating(self) -> bool {
        matches!(self, Self::ResetSession | Self::ClearAllData)
    }
}

/// Response to a [`QueryRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryResponse {
    /// `getUsageData`.
    Usage(Box<UsageSnapshot>),
    /// `getTransferRate`.
    Rate(TransferRate),
    /// Mutating actions.
    Success {
        /// Always true.
        success: bool,
    },
    /// Failure.
    Error {
        /// Error text.
        error: String,
    },
}

impl QueryResponse {
    /// `{"success": true}`.
    #[must_use]
    pub const fn success() -> Self {
        Self::Success { success: true }
    }

    /// `{"error": message}`.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    /// `{"error": "Unknown action"}`.
    #[must_use]
    pub fn unknown_action() -> Self {
        Self::error(UNKNOWN_ACTION)
    }

    /// `{"error": "Query timed out"}`.
    #[must_use]
    pub fn timed_out() -> Self {
        Self::error(QUERY_TIMED_OUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_actions_decode() {
        assert_eq!(
            QueryRequest::from_value(json!({"action": "resetSession"})),
            QueryRequest::ResetSession
        );
        assert_eq!(
            QueryRequest::from_value(json!({"action": "clearAllData", "extra": 1})),
            QueryRequest::ClearAllData
        );
        assert_eq!(
            QueryRequest::from_value(json!({"action": "exportData"})),
            QueryRequest::Unknown
        );
        assert_eq!(QueryRequest::from_value(json!({})), QueryRequest::Unknown);
        assert_eq!(
            QueryRequest::from_value(json!({"action": 5})),
            QueryRequest::Unknown
        );
    }

    #[test]
    fn test_only_reset_and_clear_mutate() {
        assert!(QueryRequest::ResetSession.is_mutating());
        assert!(QueryRequest::ClearAllData.is_mutating());
        assert!(!QueryRequest::GetUsageData.is_mutating());
        assert!(!QueryRequest::GetTransferRate.is_mutating());
        assert!(!QueryRequest::Unknown.is_mutating());
    }

    #[test]
    fn test_response_shapes() {
        assert_eq!(
            serde_json::to_value(QueryResponse::success()).unwrap(),
            json!({"success": true})
        );
        assert_eq!(
            serde_json::to_value(QueryResponse::unknown_action()).unwrap(),
            json!({"error": "Unknown action"})
        );
        assert_eq!(
            serde_json::to_value(QueryResponse::Rate(TransferRate {
                upload: 1,
                download: 2
            }))
            .unwrap(),
            json!({"upload": 1, "download": 2})
        );
    }
}
