//! The `{ success, data?, error?, message? }` response envelope.

use serde::{Deserialize, Serialize};

/// Response envelope used by every backend endpoint.
///
/// The client also produces this shape for callers that want a flat
/// success/error record instead of a `Result`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// A successful envelope carrying `data`.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    /// A failed envelope carrying a user-facing error.
    #[must_use]
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }

    /// The most specific message the backend gave, `error` before `message`.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        [self.error.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|m| !m.is_empty())
    }
}

/// `data` of a list endpoint: a bare array, or the array under a
/// resource-named key (`{ "projects": [...], "total": 12 }`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Bare(Vec<T>),
    Keyed {
        #[serde(
            alias = "projects",
            alias = "blogs",
            alias = "posts",
            alias = "users",
            alias = "logs",
            alias = "categories",
            alias = "tags",
            alias = "files"
        )]
        items: Vec<T>,
    },
}

impl<T> ListPayload<T> {
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Keyed { items } => items,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_serialization_omits_empty_fields() {
        let json = serde_json::to_string(&ApiResponse::ok(vec![1, 2])).unwrap();
        assert_eq!(json, r#"{"success":true,"data":[1,2]}"#);

        let json = serde_json::to_string(&ApiResponse::<()>::fail("Access denied")).unwrap();
        assert_eq!(json, r#"{"success":false,"error":"Access denied"}"#);
    }

    #[test]
    fn test_reason_prefers_error() {
        let envelope: ApiResponse<()> =
            serde_json::from_str(r#"{"success": false, "error": "", "message": "Slug taken"}"#).unwrap();
        assert_eq!(envelope.reason(), Some("Slug taken"));
    }

    #[test]
    fn test_list_payload_shapes() {
        let bare: ListPayload<u8> = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(bare.into_items(), vec![1, 2]);

        let keyed: ListPayload<u8> =
            serde_json::from_str(r#"{"logs": [3], "total": 1, "page": 1}"#).unwrap();
        assert_eq!(keyed.into_items(), vec![3]);
    }
}
