use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{Comment, CommentedPost, NewComment, Post, ScoredPost, SimilarPost, Tag};
use crate::paginator::Page;
use crate::store::queries::SearchQuery;

pub mod pg_store;
pub mod queries;

/// Read access to published posts plus comment creation. Every post returned
/// by a store is published, and carries its tags.
#[async_trait]
pub trait BlogStore: Send + Sync {
    async fn find_tag(&self, slug: &str) -> Result<Option<Tag>>;

    async fn count_published(&self, tag: Option<&Tag>) -> Result<u64>;

    /// Newest first.
    async fn list_published(&self, tag: Option<&Tag>, page: &Page) -> Result<Vec<Post>>;

    /// Every published post, newest first.
    async fn all_published(&self) -> Result<Vec<Post>>;

    async fn find_published(&self, publish_date: NaiveDate, slug: &str) -> Result<Option<Post>>;

    async fn find_published_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Active comments only, oldest first.
    async fn active_comments(&self, post_id: i64) -> Result<Vec<Comment>>;

    async fn add_comment(&self, post_id: i64, comment: NewComment) -> Result<Comment>;

    async fn similar_posts(&self, post_id: i64, count: i64) -> Result<Vec<SimilarPost>>;

    async fn search(&self, query: &SearchQuery) -> Result<Vec<ScoredPost>>;

    async fn most_commented(&self, count: i64) -> Result<Vec<CommentedPost>>;
}
