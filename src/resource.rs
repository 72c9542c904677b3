//! Generic CRUD access to one REST collection.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, WordPressError};
use crate::http::{ApiResponse, RequestExecutor};
use crate::query::{NoQuery, Paging, QueryBuilder};

/// Largest page size WordPress accepts for `per_page`.
const MAX_PER_PAGE: u32 = 100;

/// List, get, create, update and delete for one endpoint.
///
/// `T` is the entity type and `Q` renders list filters into a query string.
/// The base route is `{namespace}{endpoint}`, e.g. `wp/v2/posts`.
pub struct Resource<'a, T, Q = NoQuery> {
    http: &'a RequestExecutor,
    path: String,
    _marker: PhantomData<fn() -> (T, Q)>,
}

impl<T, Q> std::fmt::Debug for Resource<'_, T, Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource").field("path", &self.path).finish()
    }
}

impl<'a, T, Q> Resource<'a, T, Q> {
    pub fn new(http: &'a RequestExecutor, namespace: &str, endpoint: &str) -> Self {
        let mut path = namespace.trim_start_matches('/').to_string();
        if !path.is_empty() && !path.ends_with('/') {
            path.push('/');
        }
        path.push_str(endpoint.trim_matches('/'));
        Self::at(http, path)
    }

    /// Resource rooted at an already assembled route.
    pub(crate) fn at(http: &'a RequestExecutor, path: String) -> Self {
        Self {
            http,
            path,
            _marker: PhantomData,
        }
    }

    /// Base route of the collection.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn http(&self) -> &'a RequestExecutor {
        self.http
    }

    pub(crate) fn item_route(&self, id: u64) -> String {
        format!("{}/{id}", self.path)
    }

    pub(crate) fn list_route(&self, query: &impl QueryBuilder) -> String {
        format!("{}{}", self.path, query.to_query_string())
    }

    pub(crate) fn delete_route(&self, id: u64, force: bool) -> String {
        format!("{}?force={force}", self.item_route(id))
    }
}

impl<T, Q> Resource<'_, T, Q>
where
    T: DeserializeOwned + Serialize,
    Q: QueryBuilder,
{
    /// List entities matching `query`.
    pub async fn list(&self, query: &Q, embed: bool, use_auth: bool) -> Result<Vec<T>> {
        self.http
            .get(&self.list_route(query), embed, use_auth)
            .await
    }

    /// Fetch every entity, walking pages of 100 until `X-WP-TotalPages` is
    /// reached or a page comes back empty.
    pub async fn list_all(&self, embed: bool, use_auth: bool) -> Result<Vec<T>> {
        let first: ApiResponse<Vec<T>> = self
            .http
            .get_with_meta(
                &self.list_route(&Paging::page(1, MAX_PER_PAGE)),
                embed,
                use_auth,
            )
            .await?;
        let pages = first.meta.total_pages().unwrap_or(1);
        debug!(path = %self.path, pages, "listing all pages");

        let mut items = first.body;
        for page in 2..=pages {
            let batch: Vec<T> = self
                .http
                .get(
                    &self.list_route(&Paging::page(page, MAX_PER_PAGE)),
                    embed,
                    use_auth,
                )
                .await?;
            if batch.is_empty() {
                debug!(path = %self.path, page, "empty page, stopping");
                break;
            }
            items.extend(batch);
        }
        Ok(items)
    }

    /// Fetch one entity by id.
    pub async fn get(&self, id: u64, embed: bool, use_auth: bool) -> Result<T> {
        self.http.get(&self.item_route(id), embed, use_auth).await
    }

    /// Create an entity. Requires authentication.
    pub async fn create(&self, entity: &T) -> Result<T> {
        let body = serde_json::to_string(entity).map_err(WordPressError::Serialize)?;
        Ok(self.http.post(&self.path, body, true).await?.body)
    }

    /// Update the entity with `id`. Requires authentication.
    pub async fn update(&self, id: u64, entity: &T) -> Result<T> {
        let body = serde_json::to_string(entity).map_err(WordPressError::Serialize)?;
        Ok(self.http.post(&self.item_route(id), body, true).await?.body)
    }

    /// Delete the entity with `id`. `force` skips the trash on the remote
    /// side. Returns whether the server answered with a 2xx status.
    pub async fn delete(&self, id: u64, force: bool) -> Result<bool> {
        let meta = self.http.delete(&self.delete_route(id, force), true).await?;
        Ok(meta.is_success())
    }
}
