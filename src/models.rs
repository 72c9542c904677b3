use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Rendered / raw text fields
// ---------------------------------------------------------------------------

/// A text field WordPress returns both raw and rendered. `raw` is only
/// present in `context=edit` responses and is what gets sent on write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rendered {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default)]
    pub rendered: String,
}

impl Rendered {
    pub fn is_blank(&self) -> bool {
        self.raw.is_none() && self.rendered.is_empty()
    }

    pub fn raw(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            raw: Some(text.clone()),
            rendered: text,
        }
    }
}

// ---------------------------------------------------------------------------
// Posts & pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub slug: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub link: String,
    #[serde(default, skip_serializing_if = "Rendered::is_blank")]
    pub title: Rendered,
    #[serde(default, skip_serializing_if = "Rendered::is_blank")]
    pub content: Rendered,
    #[serde(default, skip_serializing_if = "Rendered::is_blank")]
    pub excerpt: Rendered,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub author: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub featured_media: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticky: Option<bool>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
    /// `Some(vec![])` clears every category on update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<u64>>,
    /// Related resources inlined by `_embed`.
    #[serde(default, rename = "_embedded", skip_serializing)]
    pub embedded: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub slug: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub link: String,
    #[serde(default, skip_serializing_if = "Rendered::is_blank")]
    pub title: Rendered,
    #[serde(default, skip_serializing_if = "Rendered::is_blank")]
    pub content: Rendered,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub author: u64,
    /// `Some(0)` moves the page to the top level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_order: Option<i64>,
    #[serde(default, rename = "_embedded", skip_serializing)]
    pub embedded: Option<serde_json::Value>,
}

/// A stored revision of a post. Read-only on the remote side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostRevision {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub parent: u64,
    #[serde(default)]
    pub author: u64,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub content: Rendered,
    #[serde(default)]
    pub excerpt: Rendered,
}

// ---------------------------------------------------------------------------
// Taxonomies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub id: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub count: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub link: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub id: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub count: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub link: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub slug: String,
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub author: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Rendered::is_blank")]
    pub content: Rendered,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    /// Write-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

fn is_zero(v: &u64) -> bool {
    *v == 0
}
