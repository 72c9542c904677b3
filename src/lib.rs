//! WordPress REST API client library for Rust.
//!
//! A typed async client for the
//! [WordPress REST API](https://developer.wordpress.org/rest-api/). Every
//! collection (posts, pages, categories, tags, comments, users, post
//! revisions) is exposed through the same [`Resource`] with list, get,
//! create, update and delete, all funnelled through one shared
//! [`RequestExecutor`].
//!
//! # Quick Start
//!
//! ```no_run
//! use wordpress_client::WordPressClient;
//!
//! # async fn run() -> wordpress_client::Result<()> {
//! let client = WordPressClient::new("https://demo.com/wp-json/")?;
//!
//! // Sticky posts, with authors and media embedded
//! let posts = client.posts().sticky(true, false).await?;
//! for p in &posts {
//!     println!("{}: {}", p.id, p.title.rendered);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod models;
pub mod query;
pub mod resource;

// Re-export the main public types at the crate root for convenience.
pub use client::{ClientBuilder, WordPressClient, DEFAULT_NAMESPACE};
pub use endpoints::{Categories, Comments, Pages, PostRevisions, Posts, Tags, Users};
pub use error::{Result, WordPressError};
pub use http::{with_embed, ApiResponse, RequestExecutor, ResponseMeta, ResponsePreprocessor};
pub use models::{Category, Comment, Page, Post, PostRevision, Rendered, Tag, User};
pub use query::{
    CommentsQuery, NoQuery, Order, PagesQuery, Paging, PostOrderBy, PostsQuery, QueryBuilder,
    Status, TaxonomyQuery, UsersQuery,
};
pub use resource::Resource;
