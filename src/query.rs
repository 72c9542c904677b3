//! Query-string builders for list endpoints.
//!
//! Each builder only renders the options that were explicitly set, so an
//! empty builder produces no query string at all.

use std::fmt;

use url::form_urlencoded;

/// Renders list filters into query-string pairs.
pub trait QueryBuilder {
    fn query_pairs(&self) -> Vec<(&'static str, String)>;

    /// `""` when nothing is set, otherwise `?key=value&...` (form-urlencoded).
    fn to_query_string(&self) -> String {
        let pairs = self.query_pairs();
        if pairs.is_empty() {
            return String::new();
        }
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &pairs {
            serializer.append_pair(key, value);
        }
        format!("?{}", serializer.finish())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        })
    }
}

/// Publication status filter for posts and pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Publish,
    Future,
    Draft,
    Pending,
    Private,
    Any,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Publish => "publish",
            Status::Future => "future",
            Status::Draft => "draft",
            Status::Pending => "pending",
            Status::Private => "private",
            Status::Any => "any",
        })
    }
}

fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn push_ids(query: &mut Vec<(&'static str, String)>, key: &'static str, ids: &[u64]) {
    if !ids.is_empty() {
        query.push((key, join_ids(ids)));
    }
}

fn push_opt<V: ToString>(
    query: &mut Vec<(&'static str, String)>,
    key: &'static str,
    v: &Option<V>,
) {
    if let Some(v) = v {
        query.push((key, v.to_string()));
    }
}

// ---------------------------------------------------------------------------
// Shared paging / ordering options
// ---------------------------------------------------------------------------

/// Options understood by every collection endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paging {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub offset: Option<u32>,
    pub order: Option<Order>,
    pub search: Option<String>,
    pub include: Vec<u64>,
    pub exclude: Vec<u64>,
}

impl Paging {
    pub fn page(page: u32, per_page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            ..Default::default()
        }
    }
}

impl QueryBuilder for Paging {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        push_opt(&mut query, "page", &self.page);
        push_opt(&mut query, "per_page", &self.per_page);
        push_opt(&mut query, "offset", &self.offset);
        push_opt(&mut query, "order", &self.order);
        push_opt(&mut query, "search", &self.search);
        push_ids(&mut query, "include", &self.include);
        push_ids(&mut query, "exclude", &self.exclude);
        query
    }
}

/// For endpoints that take no filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoQuery;

impl QueryBuilder for NoQuery {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOrderBy {
    Date,
    Modified,
    Id,
    Include,
    Title,
    Slug,
    Relevance,
}

impl fmt::Display for PostOrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PostOrderBy::Date => "date",
            PostOrderBy::Modified => "modified",
            PostOrderBy::Id => "id",
            PostOrderBy::Include => "include",
            PostOrderBy::Title => "title",
            PostOrderBy::Slug => "slug",
            PostOrderBy::Relevance => "relevance",
        })
    }
}

/// Filters for `wp/v2/posts`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostsQuery {
    pub paging: Paging,
    pub categories: Vec<u64>,
    pub categories_exclude: Vec<u64>,
    pub tags: Vec<u64>,
    pub tags_exclude: Vec<u64>,
    pub author: Vec<u64>,
    pub sticky: Option<bool>,
    pub status: Option<Status>,
    pub slug: Option<String>,
    pub orderby: Option<PostOrderBy>,
    /// ISO8601 date; only posts published before it.
    pub before: Option<String>,
    /// ISO8601 date; only posts published after it.
    pub after: Option<String>,
}

impl QueryBuilder for PostsQuery {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut query = self.paging.query_pairs();
        push_ids(&mut query, "categories", &self.categories);
        push_ids(&mut query, "categories_exclude", &self.categories_exclude);
        push_ids(&mut query, "tags", &self.tags);
        push_ids(&mut query, "tags_exclude", &self.tags_exclude);
        push_ids(&mut query, "author", &self.author);
        push_opt(&mut query, "sticky", &self.sticky);
        push_opt(&mut query, "status", &self.status);
        push_opt(&mut query, "slug", &self.slug);
        push_opt(&mut query, "orderby", &self.orderby);
        push_opt(&mut query, "before", &self.before);
        push_opt(&mut query, "after", &self.after);
        query
    }
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// Filters for `wp/v2/pages`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PagesQuery {
    pub paging: Paging,
    pub author: Vec<u64>,
    pub parent: Vec<u64>,
    pub status: Option<Status>,
    pub slug: Option<String>,
    pub menu_order: Option<i64>,
    pub orderby: Option<PostOrderBy>,
}

impl QueryBuilder for PagesQuery {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut query = self.paging.query_pairs();
        push_ids(&mut query, "author", &self.author);
        push_ids(&mut query, "parent", &self.parent);
        push_opt(&mut query, "status", &self.status);
        push_opt(&mut query, "slug", &self.slug);
        push_opt(&mut query, "menu_order", &self.menu_order);
        push_opt(&mut query, "orderby", &self.orderby);
        query
    }
}

// ---------------------------------------------------------------------------
// Categories & tags
// ---------------------------------------------------------------------------

/// Filters shared by `wp/v2/categories` and `wp/v2/tags`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxonomyQuery {
    pub paging: Paging,
    pub hide_empty: Option<bool>,
    /// Categories only; tags are flat.
    pub parent: Option<u64>,
    /// Limit to terms assigned to this post.
    pub post: Option<u64>,
    pub slug: Option<String>,
    /// `id`, `name`, `slug`, `count`, ...
    pub orderby: Option<String>,
}

impl QueryBuilder for TaxonomyQuery {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut query = self.paging.query_pairs();
        push_opt(&mut query, "hide_empty", &self.hide_empty);
        push_opt(&mut query, "parent", &self.parent);
        push_opt(&mut query, "post", &self.post);
        push_opt(&mut query, "slug", &self.slug);
        push_opt(&mut query, "orderby", &self.orderby);
        query
    }
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// Filters for `wp/v2/comments`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentsQuery {
    pub paging: Paging,
    pub post: Vec<u64>,
    pub author: Vec<u64>,
    pub parent: Vec<u64>,
    /// `approve`, `hold`, `spam`, `trash`.
    pub status: Option<String>,
}

impl QueryBuilder for CommentsQuery {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut query = self.paging.query_pairs();
        push_ids(&mut query, "post", &self.post);
        push_ids(&mut query, "author", &self.author);
        push_ids(&mut query, "parent", &self.parent);
        push_opt(&mut query, "status", &self.status);
        query
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Filters for `wp/v2/users`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsersQuery {
    pub paging: Paging,
    pub roles: Vec<String>,
    pub slug: Option<String>,
    /// `id`, `name`, `registered_date`, ...
    pub orderby: Option<String>,
}

impl QueryBuilder for UsersQuery {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut query = self.paging.query_pairs();
        if !self.roles.is_empty() {
            query.push(("roles", self.roles.join(",")));
        }
        push_opt(&mut query, "slug", &self.slug);
        push_opt(&mut query, "orderby", &self.orderby);
        query
    }
}
