use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;

use crate::endpoints::{Categories, Comments, Pages, PostRevisions, Posts, Tags, Users};
use crate::error::Result;
use crate::http::{RequestExecutor, ResponsePreprocessor};
use crate::resource::Resource;

/// Namespace of the core WordPress REST routes.
pub const DEFAULT_NAMESPACE: &str = "wp/v2/";

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures a [`WordPressClient`].
pub struct ClientBuilder {
    base_uri: String,
    namespace: String,
    token: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    preprocessor: Option<ResponsePreprocessor>,
}

impl ClientBuilder {
    fn new(base_uri: &str) -> Self {
        Self {
            base_uri: base_uri.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            token: None,
            timeout: None,
            user_agent: None,
            preprocessor: None,
        }
    }

    /// Route prefix joined to every endpoint name. Defaults to `wp/v2/`.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Bearer token obtained elsewhere (JWT plugin, application password
    /// exchange, ...).
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Per-request timeout. Unset means whatever `reqwest` does by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Rewrite every successful response body before it is decoded.
    pub fn response_preprocessor<F>(mut self, hook: F) -> Self
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        self.preprocessor = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> Result<WordPressClient> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut http = Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        if let Some(ua) = self.user_agent {
            http = http.user_agent(ua);
        }

        Ok(WordPressClient {
            executor: RequestExecutor::from_parts(
                &self.base_uri,
                http.build()?,
                self.token,
                self.preprocessor,
            ),
            namespace: self.namespace,
        })
    }
}

// ---------------------------------------------------------------------------
// Public client
// ---------------------------------------------------------------------------

/// Main entry point for talking to one WordPress site.
///
/// ```no_run
/// use wordpress_client::WordPressClient;
///
/// # async fn run() -> wordpress_client::Result<()> {
/// let client = WordPressClient::new("https://demo.com/wp-json/")?;
/// let posts = client.posts().by_category(7, false, false).await?;
/// for p in &posts {
///     println!("{}: {}", p.id, p.title.rendered);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WordPressClient {
    executor: RequestExecutor,
    namespace: String,
}

impl WordPressClient {
    /// Create a client with default settings.
    ///
    /// * `base_uri` – REST root, e.g. `https://demo.com/wp-json/`
    pub fn new(base_uri: &str) -> Result<Self> {
        Self::builder(base_uri).build()
    }

    pub fn builder(base_uri: &str) -> ClientBuilder {
        ClientBuilder::new(base_uri)
    }

    /// The executor, for routes this crate has no typed wrapper for.
    pub fn http(&self) -> &RequestExecutor {
        &self.executor
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn set_token(&self, token: impl Into<String>) {
        self.executor.set_token(token);
    }

    pub fn clear_token(&self) {
        self.executor.clear_token();
    }

    pub fn is_authenticated(&self) -> bool {
        self.executor.token().is_some()
    }

    // -- resource accessors --------------------------------------------------

    /// Any collection under the client's namespace.
    pub fn resource<T, Q>(&self, endpoint: &str) -> Resource<'_, T, Q> {
        Resource::new(&self.executor, &self.namespace, endpoint)
    }

    pub fn posts(&self) -> Posts<'_> {
        self.resource("posts")
    }

    pub fn post_revisions(&self, post_id: u64) -> PostRevisions<'_> {
        self.posts().revisions(post_id)
    }

    pub fn pages(&self) -> Pages<'_> {
        self.resource("pages")
    }

    pub fn categories(&self) -> Categories<'_> {
        self.resource("categories")
    }

    pub fn tags(&self) -> Tags<'_> {
        self.resource("tags")
    }

    pub fn comments(&self) -> Comments<'_> {
        self.resource("comments")
    }

    pub fn users(&self) -> Users<'_> {
        self.resource("users")
    }
}
