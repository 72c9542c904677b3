//! Endpoint-specific shortcuts layered on [`Resource`].

use crate::error::Result;
use crate::models::{Category, Comment, Page, Post, PostRevision, Tag, User};
use crate::query::{
    CommentsQuery, NoQuery, PagesQuery, Paging, PostsQuery, TaxonomyQuery, UsersQuery,
};
use crate::resource::Resource;

pub type Posts<'a> = Resource<'a, Post, PostsQuery>;
pub type PostRevisions<'a> = Resource<'a, PostRevision, NoQuery>;
pub type Pages<'a> = Resource<'a, Page, PagesQuery>;
pub type Categories<'a> = Resource<'a, Category, TaxonomyQuery>;
pub type Tags<'a> = Resource<'a, Tag, TaxonomyQuery>;
pub type Comments<'a> = Resource<'a, Comment, CommentsQuery>;
pub type Users<'a> = Resource<'a, User, UsersQuery>;

impl<'a> Resource<'a, Post, PostsQuery> {
    /// Sticky posts only (`?sticky=true`).
    pub async fn sticky(&self, embed: bool, use_auth: bool) -> Result<Vec<Post>> {
        let query = PostsQuery {
            sticky: Some(true),
            ..Default::default()
        };
        self.list(&query, embed, use_auth).await
    }

    /// Posts in one category (`?categories={id}`).
    pub async fn by_category(
        &self,
        category_id: u64,
        embed: bool,
        use_auth: bool,
    ) -> Result<Vec<Post>> {
        let query = PostsQuery {
            categories: vec![category_id],
            ..Default::default()
        };
        self.list(&query, embed, use_auth).await
    }

    /// Posts carrying one tag (`?tags={id}`).
    pub async fn by_tag(&self, tag_id: u64, embed: bool, use_auth: bool) -> Result<Vec<Post>> {
        let query = PostsQuery {
            tags: vec![tag_id],
            ..Default::default()
        };
        self.list(&query, embed, use_auth).await
    }

    /// Posts written by one author (`?author={id}`).
    pub async fn by_author(
        &self,
        author_id: u64,
        embed: bool,
        use_auth: bool,
    ) -> Result<Vec<Post>> {
        let query = PostsQuery {
            author: vec![author_id],
            ..Default::default()
        };
        self.list(&query, embed, use_auth).await
    }

    /// Full-text search (`?search={term}`).
    pub async fn by_search(&self, term: &str, embed: bool, use_auth: bool) -> Result<Vec<Post>> {
        let query = PostsQuery {
            paging: Paging {
                search: Some(term.to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        self.list(&query, embed, use_auth).await
    }

    /// Revisions of the post with `post_id`.
    ///
    /// WordPress does not trash revisions, so deleting one needs
    /// `force = true`.
    pub fn revisions(&self, post_id: u64) -> PostRevisions<'a> {
        Resource::at(self.http(), format!("{}/revisions", self.item_route(post_id)))
    }
}

impl Resource<'_, User, UsersQuery> {
    /// The user the configured token belongs to.
    pub async fn me(&self) -> Result<User> {
        self.http()
            .get(&format!("{}/me", self.path()), false, true)
            .await
    }
}
