use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use spdlog::{debug, info};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};

use crate::config::Database;
use crate::error::Result;
use crate::models::{Comment, CommentedPost, NewComment, Post, ScoredPost, SimilarPost, Tag};
use crate::paginator::Page;
use crate::store::queries::{count_posts, most_commented, select_posts, similar_posts, PostFilter, SearchQuery};
use crate::store::BlogStore;

pub struct PgStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct PostTagRow {
    post_id: i64,
    #[sqlx(flatten)]
    tag: Tag,
}

impl PgStore {
    pub async fn connect(config: &Database) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        PgStore { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        info!("Applying database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn load_tags(&self, post_ids: Vec<i64>) -> Result<HashMap<i64, Vec<Tag>>> {
        let mut tags: HashMap<i64, Vec<Tag>> = HashMap::new();
        if post_ids.is_empty() {
            return Ok(tags);
        }

        let rows: Vec<PostTagRow> = sqlx::query_as(
            "SELECT pt.post_id, t.id, t.name, t.slug FROM blog_tag t \
             JOIN blog_post_tags pt ON pt.tag_id = t.id \
             WHERE pt.post_id = ANY($1) ORDER BY t.name")
            .bind(post_ids)
            .fetch_all(&self.pool)
            .await?;

        for row in rows {
            tags.entry(row.post_id).or_default().push(row.tag);
        }
        Ok(tags)
    }

    async fn with_tags(&self, mut posts: Vec<Post>) -> Result<Vec<Post>> {
        let mut tags = self.load_tags(posts.iter().map(|p| p.id).collect()).await?;
        for post in posts.iter_mut() {
            post.tags = tags.remove(&post.id).unwrap_or_default();
        }
        Ok(posts)
    }

    async fn fetch_posts(&self, filter: &PostFilter, page: Option<&Page>) -> Result<Vec<Post>> {
        let posts = select_posts(filter, page)
            .build_query_as::<Post>()
            .fetch_all(&self.pool)
            .await?;
        self.with_tags(posts).await
    }

    async fn fetch_one(&self, filter: &PostFilter) -> Result<Option<Post>> {
        let mut posts = self.fetch_posts(filter, None).await?;
        Ok(if posts.is_empty() { None } else { Some(posts.remove(0)) })
    }
}

#[async_trait]
impl BlogStore for PgStore {
    async fn find_tag(&self, slug: &str) -> Result<Option<Tag>> {
        let tag: Option<Tag> = sqlx::query_as("SELECT id, name, slug FROM blog_tag WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tag)
    }

    async fn count_published(&self, tag: Option<&Tag>) -> Result<u64> {
        let mut filter = PostFilter::published(Utc::now());
        if let Some(tag) = tag {
            filter = filter.tagged(tag.id);
        }
        let count: i64 = count_posts(&filter)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn list_published(&self, tag: Option<&Tag>, page: &Page) -> Result<Vec<Post>> {
        let mut filter = PostFilter::published(Utc::now());
        if let Some(tag) = tag {
            filter = filter.tagged(tag.id);
        }
        self.fetch_posts(&filter, Some(page)).await
    }

    async fn all_published(&self) -> Result<Vec<Post>> {
        self.fetch_posts(&PostFilter::published(Utc::now()), None).await
    }

    async fn find_published(&self, publish_date: NaiveDate, slug: &str) -> Result<Option<Post>> {
        let filter = PostFilter::published(Utc::now())
            .on_date(publish_date)
            .with_slug(slug);
        self.fetch_one(&filter).await
    }

    async fn find_published_by_id(&self, id: i64) -> Result<Option<Post>> {
        self.fetch_one(&PostFilter::published(Utc::now()).with_id(id)).await
    }

    async fn active_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        let comments: Vec<Comment> = sqlx::query_as(
            "SELECT id, post_id, name, email, body, created, updated, active FROM blog_comment \
             WHERE post_id = $1 AND active ORDER BY created, id")
            .bind(post_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(comments)
    }

    async fn add_comment(&self, post_id: i64, comment: NewComment) -> Result<Comment> {
        let comment: Comment = sqlx::query_as(
            "INSERT INTO blog_comment (post_id, name, email, body, active) VALUES ($1, $2, $3, $4, TRUE) \
             RETURNING id, post_id, name, email, body, created, updated, active")
            .bind(post_id)
            .bind(comment.name)
            .bind(comment.email)
            .bind(comment.body)
            .fetch_one(&self.pool)
            .await?;
        debug!("Comment {} stored for post {}", comment.id, post_id);
        Ok(comment)
    }

    async fn similar_posts(&self, post_id: i64, count: i64) -> Result<Vec<SimilarPost>> {
        let mut similar: Vec<SimilarPost> = similar_posts(post_id, Utc::now(), count)
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;
        let mut tags = self.load_tags(similar.iter().map(|s| s.post.id).collect()).await?;
        for item in similar.iter_mut() {
            item.post.tags = tags.remove(&item.post.id).unwrap_or_default();
        }
        Ok(similar)
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<ScoredPost>> {
        let mut results: Vec<ScoredPost> = query.build(Utc::now())
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;
        let mut tags = self.load_tags(results.iter().map(|r| r.post.id).collect()).await?;
        for result in results.iter_mut() {
            result.post.tags = tags.remove(&result.post.id).unwrap_or_default();
        }
        Ok(results)
    }

    async fn most_commented(&self, count: i64) -> Result<Vec<CommentedPost>> {
        let posts: Vec<CommentedPost> = most_commented(Utc::now(), count)
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;
        Ok(posts)
    }
}
