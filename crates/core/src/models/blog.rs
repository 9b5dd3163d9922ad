//! Blog posts, categories and tags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::wire;
use crate::types::{BlogPostId, CategoryId, TagId};
use crate::validation::{ValidationError, optional_url, require};

/// A blog post as returned by `/blogs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    #[serde(alias = "_id")]
    pub id: BlogPostId,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    /// Rich-text HTML produced by the admin editor.
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "wire::name_opt")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "wire::names")]
    pub tags: Vec<String>,
    #[serde(default, alias = "featuredImage")]
    pub cover_image: Option<String>,
    #[serde(default, deserialize_with = "wire::name_opt")]
    pub author: Option<String>,
    #[serde(default = "default_published")]
    pub published: bool,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Posts served by the public endpoints are published unless stated otherwise.
const fn default_published() -> bool {
    true
}

impl BlogPost {
    /// Estimated reading time at 200 words per minute, never less than one.
    #[must_use]
    pub fn reading_time_minutes(&self) -> u32 {
        let mut words = 0_u32;
        let mut in_tag = false;
        let mut in_word = false;
        for c in self.content.chars() {
            match c {
                '<' => {
                    in_tag = true;
                    in_word = false;
                }
                '>' => in_tag = false,
                _ if in_tag => {}
                c if c.is_whitespace() => in_word = false,
                _ => {
                    if !in_word {
                        words = words.saturating_add(1);
                        in_word = true;
                    }
                }
            }
        }
        words.div_ceil(200).max(1)
    }
}

/// Writable fields for creating or updating a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub excerpt: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub published: bool,
}

impl BlogPostDraft {
    /// Validate the draft before sending it to the backend.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("excerpt", &self.excerpt)?;
        require("content", &self.content)?;
        if let Some(slug) = &self.slug {
            let valid = !slug.is_empty()
                && slug
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
            if !valid {
                return Err(ValidationError::Invalid {
                    field: "slug",
                    reason: "may only contain lowercase letters, digits and dashes".to_string(),
                });
            }
        }
        optional_url("coverImage", self.cover_image.as_deref())
    }
}

/// A blog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// A blog tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(alias = "_id")]
    pub id: TagId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// Writable fields of a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDraft {
    pub name: String,
}

/// Writable fields of a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagDraft {
    pub name: String,
}

impl CategoryDraft {
    /// # Errors
    ///
    /// Returns [`ValidationError::Required`] when the name is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)
    }
}

impl TagDraft {
    /// # Errors
    ///
    /// Returns [`ValidationError::Required`] when the name is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)
    }
}
