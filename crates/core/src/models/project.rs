//! Portfolio projects shown on the landing page and managed in the back-office.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::wire;
use crate::types::ProjectId;
use crate::validation::{ValidationError, optional_url, require};

/// A portfolio project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(alias = "_id")]
    pub id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Category name; empty when the project is uncategorized.
    #[serde(default, deserialize_with = "wire::name_or_empty")]
    pub category: String,
    /// Technology tags in display order.
    #[serde(default, deserialize_with = "wire::names")]
    pub tags: Vec<String>,
    #[serde(default, alias = "image")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default, alias = "githubUrl")]
    pub repo_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Writable fields for creating or updating a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    pub featured: bool,
}

impl ProjectDraft {
    /// Validate the draft before sending it to the backend.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("description", &self.description)?;
        require("category", &self.category)?;
        if self.tags.iter().any(|tag| tag.trim().is_empty()) {
            return Err(ValidationError::Invalid {
                field: "tags",
                reason: "cannot contain blank entries".to_string(),
            });
        }
        optional_url("imageUrl", self.image_url.as_deref())?;
        optional_url("liveUrl", self.live_url.as_deref())?;
        optional_url("repoUrl", self.repo_url.as_deref())
    }
}

impl From<&Project> for ProjectDraft {
    fn from(project: &Project) -> Self {
        Self {
            title: project.title.clone(),
            description: project.description.clone(),
            category: project.category.clone(),
            tags: project.tags.clone(),
            image_url: project.image_url.clone(),
            live_url: project.live_url.clone(),
            repo_url: project.repo_url.clone(),
            featured: project.featured,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_project_lenient_shape() {
        let project: Project = serde_json::from_str(
            r#"{
                "_id": 12,
                "title": "Clinic booking",
                "category": {"name": "Web App"},
                "tags": ["Laravel", "Vue"],
                "image": "/uploads/clinic.png",
                "githubUrl": "https://github.com/atelier/clinic"
            }"#,
        )
        .unwrap();
        assert_eq!(project.id.as_str(), "12");
        assert_eq!(project.category, "Web App");
        assert_eq!(project.tags, vec!["Laravel", "Vue"]);
        assert_eq!(project.image_url.as_deref(), Some("/uploads/clinic.png"));
        assert!(project.repo_url.is_some());
        assert!(!project.featured);
        assert!(project.description.is_empty());
    }

    #[test]
    fn test_draft_from_project_validates() {
        let project: Project = serde_json::from_str(
            r#"{"id": "p1", "title": "Site", "description": "Marketing site", "category": "Web", "tags": ["Rust"]}"#,
        )
        .unwrap();
        let draft = ProjectDraft::from(&project);
        assert!(draft.validate().is_ok());

        let json = serde_json::to_value(&draft).unwrap();
        assert!(json.get("liveUrl").is_none());
        assert_eq!(json["tags"][0], "Rust");
    }

    #[test]
    fn test_draft_rejects_blank_tag_and_bad_url() {
        let mut draft = ProjectDraft {
            title: "Site".to_string(),
            description: "Marketing site".to_string(),
            category: "Web".to_string(),
            tags: vec![String::new()],
            ..ProjectDraft::default()
        };
        assert_eq!(draft.validate().unwrap_err().field(), "tags");

        draft.tags = vec!["Rust".to_string()];
        draft.live_url = Some("atelier.studio".to_string());
        assert_eq!(draft.validate().unwrap_err().field(), "liveUrl");
    }

    #[test]
    fn test_draft_requires_title() {
        assert_eq!(
            ProjectDraft::default().validate(),
            Err(ValidationError::Required("title"))
        );
    }
}
