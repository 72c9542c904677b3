//! Shared request executor.
//!
//! Every endpoint goes through [`RequestExecutor`], which owns URL assembly,
//! bearer-token attachment, the `_embed` convention and JSON decoding. The
//! executor keeps only two pieces of mutable state, the token and the
//! response preprocessing hook; both are cloned out of their locks before a
//! request is sent so no lock is held across an await point.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn, Span};

use crate::error::{Result, WordPressError};

/// Text transform applied to every successful response body before it is
/// decoded. Useful for stripping garbage some plugins print ahead of the JSON.
pub type ResponsePreprocessor = Arc<dyn Fn(String) -> String + Send + Sync>;

const TOTAL_HEADER: &str = "x-wp-total";
const TOTAL_PAGES_HEADER: &str = "x-wp-totalpages";

/// Status and headers of a completed response.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl ResponseMeta {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Total number of items in the collection (`X-WP-Total`).
    pub fn total(&self) -> Option<u64> {
        self.header_number(TOTAL_HEADER)
    }

    /// Number of pages at the requested page size (`X-WP-TotalPages`).
    pub fn total_pages(&self) -> Option<u32> {
        self.header_number(TOTAL_PAGES_HEADER)
    }

    fn header_number<N: std::str::FromStr>(&self, name: &str) -> Option<N> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    }
}

/// A decoded body together with the response it came from.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub body: T,
    pub meta: ResponseMeta,
}

/// Append the bare `_embed` flag to `route`, using `&` when the route
/// already carries a query string and `?` otherwise.
pub fn with_embed(route: &str, embed: bool) -> String {
    if !embed {
        return route.to_string();
    }
    if route.contains('?') {
        format!("{route}&_embed")
    } else {
        format!("{route}?_embed")
    }
}

/// Performs single HTTP round trips against one WordPress site.
pub struct RequestExecutor {
    base_uri: String,
    http: Client,
    token: RwLock<Option<String>>,
    preprocessor: RwLock<Option<ResponsePreprocessor>>,
}

impl fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("base_uri", &self.base_uri)
            .field("authenticated", &self.token().is_some())
            .field("preprocessor", &self.preprocessor().is_some())
            .finish()
    }
}

impl RequestExecutor {
    /// Create an executor with a default `reqwest` client.
    ///
    /// * `base_uri` – REST root, e.g. `https://demo.com/wp-json/`
    pub fn new(base_uri: &str) -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(Self::from_parts(base_uri, http, None, None))
    }

    pub(crate) fn from_parts(
        base_uri: &str,
        http: Client,
        token: Option<String>,
        preprocessor: Option<ResponsePreprocessor>,
    ) -> Self {
        let mut base_uri = base_uri.to_string();
        if !base_uri.ends_with('/') {
            base_uri.push('/');
        }
        Self {
            base_uri,
            http,
            token: RwLock::new(token),
            preprocessor: RwLock::new(preprocessor),
        }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Full URL for a relative route.
    pub fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_uri, route.trim_start_matches('/'))
    }

    // ---- token & hook -----------------------------------------------------

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the bearer token. Requests already in flight keep the token
    /// they read when they were built.
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    pub fn clear_token(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn preprocessor(&self) -> Option<ResponsePreprocessor> {
        self.preprocessor
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_response_preprocessor<F>(&self, hook: F)
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        *self
            .preprocessor
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(hook));
    }

    pub fn clear_response_preprocessor(&self) {
        *self
            .preprocessor
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    // ---- verbs ------------------------------------------------------------

    /// GET `route` and decode the body as `T`.
    ///
    /// Non-2xx statuses become typed errors; see [`get_or_default`] for the
    /// tolerant variant.
    ///
    /// [`get_or_default`]: RequestExecutor::get_or_default
    pub async fn get<T: DeserializeOwned>(
        &self,
        route: &str,
        embed: bool,
        require_auth: bool,
    ) -> Result<T> {
        Ok(self.get_with_meta(route, embed, require_auth).await?.body)
    }

    /// GET `route`, returning the decoded body and the response metadata.
    pub async fn get_with_meta<T: DeserializeOwned>(
        &self,
        route: &str,
        embed: bool,
        require_auth: bool,
    ) -> Result<ApiResponse<T>> {
        let (meta, text) = self
            .send(Method::GET, &with_embed(route, embed), None, require_auth)
            .await?;
        if !meta.is_success() {
            return Err(WordPressError::from_status(meta.status.as_u16(), &text));
        }
        let body = self.decode(text)?;
        Ok(ApiResponse { body, meta })
    }

    /// GET `route`, yielding `T::default()` when the server answers with a
    /// non-2xx status. The failure is only visible in the debug log.
    pub async fn get_or_default<T: DeserializeOwned + Default>(
        &self,
        route: &str,
        embed: bool,
        require_auth: bool,
    ) -> Result<T> {
        let (meta, text) = self
            .send(Method::GET, &with_embed(route, embed), None, require_auth)
            .await?;
        if !meta.is_success() {
            return Ok(T::default());
        }
        self.decode(text)
    }

    /// POST a pre-serialized JSON `body` to `route`.
    pub async fn post<T: DeserializeOwned>(
        &self,
        route: &str,
        body: String,
        require_auth: bool,
    ) -> Result<ApiResponse<T>> {
        let (meta, text) = self
            .send(Method::POST, route, Some(body), require_auth)
            .await?;
        if !meta.is_success() {
            return Err(WordPressError::from_status(meta.status.as_u16(), &text));
        }
        let body = self.decode(text)?;
        Ok(ApiResponse { body, meta })
    }

    /// POST variant that returns `T::default()` alongside the real response
    /// metadata on a non-2xx status. Decode failures after a 2xx are still
    /// reported as [`WordPressError::Decode`].
    pub async fn post_or_default<T: DeserializeOwned + Default>(
        &self,
        route: &str,
        body: String,
        require_auth: bool,
    ) -> Result<(T, ResponseMeta)> {
        let (meta, text) = self
            .send(Method::POST, route, Some(body), require_auth)
            .await?;
        if !meta.is_success() {
            return Ok((T::default(), meta));
        }
        let body = self.decode(text)?;
        Ok((body, meta))
    }

    /// DELETE `route`. The metadata is returned whatever the status so the
    /// caller can decide what counts as success.
    pub async fn delete(&self, route: &str, require_auth: bool) -> Result<ResponseMeta> {
        let (meta, _) = self
            .send(Method::DELETE, route, None, require_auth)
            .await?;
        Ok(meta)
    }

    // ---- internals --------------------------------------------------------

    #[instrument(
        name = "wp_request",
        skip_all,
        fields(
            http.method = %method,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
        )
    )]
    async fn send(
        &self,
        method: Method,
        route: &str,
        body: Option<String>,
        require_auth: bool,
    ) -> Result<(ResponseMeta, String)> {
        let url = self.url(route);
        Span::current().record("http.url", url.as_str());

        let mut request = self.http.request(method, &url);
        if require_auth {
            match self.token() {
                Some(token) => {
                    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
                    value.set_sensitive(true);
                    request = request.header(AUTHORIZATION, value);
                }
                None => warn!("authentication requested but no token is set"),
            }
        }
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body);
        }

        let response = request.send().await?;
        let meta = ResponseMeta {
            status: response.status(),
            headers: response.headers().clone(),
        };
        Span::current().record("http.status_code", meta.status.as_u16());

        let text = response.text().await?;
        if !meta.is_success() {
            debug!(status = meta.status.as_u16(), body = %text, "non-success response");
        }
        Ok((meta, text))
    }

    fn decode<T: DeserializeOwned>(&self, text: String) -> Result<T> {
        let text = match self.preprocessor() {
            Some(hook) => hook(text),
            None => text,
        };
        serde_json::from_str(&text).map_err(|source| WordPressError::Decode {
            type_name: std::any::type_name::<T>(),
            body: text,
            source,
        })
    }
}
