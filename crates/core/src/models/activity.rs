//! Back-office activity log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::wire;
use crate::types::ActivityLogId;

/// One recorded back-office action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    #[serde(alias = "_id")]
    pub id: ActivityLogId,
    /// Who performed the action (name or email), when the backend knows it.
    #[serde(default, alias = "user", deserialize_with = "wire::name_opt")]
    pub actor: Option<String>,
    /// Action name, e.g. `login` or `project.update`.
    pub action: String,
    #[serde(default)]
    pub resource: Option<String>,
    /// Free-form details recorded by the backend.
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Query parameters for `/admin/logs`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivityLogQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl ActivityLogQuery {
    /// Render the query as `key=value` pairs for the request URL.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(action) = self.action.as_deref().filter(|a| !a.is_empty()) {
            pairs.push(("action", action.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_log_actor_from_populated_user() {
        let log: ActivityLog = serde_json::from_str(
            r#"{"_id": "l1", "user": {"email": "ops@atelier.studio"}, "action": "login", "ipAddress": "10.0.0.1"}"#,
        )
        .unwrap();
        assert_eq!(log.actor.as_deref(), Some("ops@atelier.studio"));
        assert_eq!(log.ip_address.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_query_pairs_skip_unset() {
        let query = ActivityLogQuery {
            page: Some(2),
            limit: None,
            action: Some(String::new()),
        };
        assert_eq!(query.to_pairs(), vec![("page", "2".to_string())]);
        assert!(ActivityLogQuery::default().to_pairs().is_empty());
    }
}
