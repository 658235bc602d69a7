use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::limits::{MIN_CONTENT_LEN, MIN_TITLE_LEN};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub tag: Option<String>,
    pub slug: Option<String>,
    pub author_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied by a caller creating a post.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub tag: Option<String>,
}

impl PostDraft {
    /// Trims every field; a blank tag becomes `None`.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
            tag: normalize_tag(self.tag),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)?;
        validate_content(&self.content)
    }
}

/// Fields supplied by a caller updating a post.
///
/// `content` is kept when absent; `tag` is replaced as given.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostChanges {
    pub title: String,
    pub content: Option<String>,
    pub tag: Option<String>,
}

impl PostChanges {
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            content: self.content.map(|c| c.trim().to_string()),
            tag: normalize_tag(self.tag),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)?;
        if let Some(content) = &self.content {
            validate_content(content)?;
        }
        Ok(())
    }
}

/// Record handed to the store on insert.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub tag: Option<String>,
    pub slug: Option<String>,
    pub author_id: i32,
    pub created_at: DateTime<Utc>,
}

/// Optional criteria for listing posts. All present criteria must match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostFilter {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tag: Option<String>,
    pub slug: Option<String>,
    pub author_id: Option<i32>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub updated_after: Option<DateTime<Utc>>,
    pub updated_before: Option<DateTime<Utc>>,
}

impl PostFilter {
    /// Returns the value when it is present and non-empty.
    #[must_use]
    pub fn non_empty(value: Option<&str>) -> Option<&str> {
        value.filter(|v| !v.is_empty())
    }
}

fn normalize_tag(tag: Option<String>) -> Option<String> {
    tag.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("title is required".to_string());
    }
    if title.chars().count() < MIN_TITLE_LEN {
        return Err(format!("title must be at least {MIN_TITLE_LEN} characters"));
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<(), String> {
    if content.trim().is_empty() {
        return Err("content is required".to_string());
    }
    if content.chars().count() < MIN_CONTENT_LEN {
        return Err(format!("content must be at least {MIN_CONTENT_LEN} characters"));
    }
    Ok(())
}

/// Derives a URL slug from a title.
///
/// Letters and digits are lower-cased and kept; every other run of characters
/// becomes a single `-`. Returns `None` when nothing usable remains.
#[must_use]
pub fn slugify(title: &str) -> Option<String> {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() { None } else { Some(slug) }
}
