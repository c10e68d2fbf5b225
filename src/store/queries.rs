//! SQL construction for every read query. All of them share [`PostFilter`],
//! which carries the "published" predicate: status published and publish
//! timestamp not in the future.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sqlx::{Postgres, QueryBuilder};

use crate::models::PostStatus;
use crate::paginator::Page;

pub const POST_COLUMNS: &str = "p.id, p.title, p.slug, p.body, p.publish, p.created, p.updated, p.status";

#[derive(Debug, Clone, PartialEq)]
pub struct PostFilter {
    now: DateTime<Utc>,
    id: Option<i64>,
    tag_id: Option<i64>,
    publish_date: Option<NaiveDate>,
    slug: Option<String>,
}

impl PostFilter {
    pub fn published(now: DateTime<Utc>) -> Self {
        PostFilter {
            now,
            id: None,
            tag_id: None,
            publish_date: None,
            slug: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn tagged(mut self, tag_id: i64) -> Self {
        self.tag_id = Some(tag_id);
        self
    }

    /// Publish timestamp within the given UTC calendar day.
    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.publish_date = Some(date);
        self
    }

    pub fn with_slug(mut self, slug: &str) -> Self {
        self.slug = Some(slug.to_string());
        self
    }

    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE p.status = ");
        qb.push_bind(PostStatus::Published.code());
        qb.push(" AND p.publish <= ");
        qb.push_bind(self.now);

        if let Some(id) = self.id {
            qb.push(" AND p.id = ");
            qb.push_bind(id);
        }

        if let Some(tag_id) = self.tag_id {
            qb.push(" AND EXISTS (SELECT 1 FROM blog_post_tags ft WHERE ft.post_id = p.id AND ft.tag_id = ");
            qb.push_bind(tag_id);
            qb.push(")");
        }

        if let Some(date) = self.publish_date {
            let day_start = date.and_time(NaiveTime::MIN).and_utc();
            qb.push(" AND p.publish >= ");
            qb.push_bind(day_start);
            qb.push(" AND p.publish < ");
            qb.push_bind(day_start + Duration::days(1));
        }

        if let Some(ref slug) = self.slug {
            qb.push(" AND p.slug = ");
            qb.push_bind(slug.clone());
        }
    }
}

/// Newest first. Without a page, every matching post is returned.
pub fn select_posts(filter: &PostFilter, page: Option<&Page>) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM blog_post p", POST_COLUMNS));
    filter.push_where(&mut qb);
    qb.push(" ORDER BY p.publish DESC, p.id DESC");
    if let Some(page) = page {
        qb.push(" LIMIT ");
        qb.push_bind(page.limit);
        qb.push(" OFFSET ");
        qb.push_bind(page.offset);
    }
    qb
}

pub fn count_posts(filter: &PostFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM blog_post p");
    filter.push_where(&mut qb);
    qb
}

/// Published posts sharing at least one tag with `post_id`, the post itself
/// excluded, most shared tags first and newest first on ties.
pub fn similar_posts(post_id: i64, now: DateTime<Utc>, limit: i64) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {}, COUNT(pt.tag_id) AS same_tags FROM blog_post p \
         JOIN blog_post_tags pt ON pt.post_id = p.id",
        POST_COLUMNS));
    PostFilter::published(now).push_where(&mut qb);
    qb.push(" AND p.id <> ");
    qb.push_bind(post_id);
    qb.push(" AND pt.tag_id IN (SELECT tag_id FROM blog_post_tags WHERE post_id = ");
    qb.push_bind(post_id);
    qb.push(")");
    qb.push(" GROUP BY p.id ORDER BY same_tags DESC, p.publish DESC LIMIT ");
    qb.push_bind(limit);
    qb
}

pub fn most_commented(now: DateTime<Utc>, limit: i64) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {}, COUNT(c.id) AS total_comments FROM blog_post p \
         LEFT JOIN blog_comment c ON c.post_id = p.id",
        POST_COLUMNS));
    PostFilter::published(now).push_where(&mut qb);
    qb.push(" GROUP BY p.id ORDER BY total_comments DESC, p.publish DESC LIMIT ");
    qb.push_bind(limit);
    qb
}

pub const DEFAULT_TEXT_CONFIG: &str = "english";
pub const DEFAULT_RANK_THRESHOLD: f32 = 0.1;
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.3;

/// Blended full-text and trigram search.
///
/// Each published post gets a `rank` (title weighted A, body weighted B), a
/// trigram similarity of the query to the title and another to the body.
/// A post is kept when any one of the three clears its threshold, and results
/// are ordered by the sum of the three.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub text_config: String,
    pub rank_threshold: f32,
    pub similarity_threshold: f32,
}

impl SearchQuery {
    pub fn new(text: &str) -> Self {
        SearchQuery {
            text: text.to_string(),
            text_config: DEFAULT_TEXT_CONFIG.to_string(),
            rank_threshold: DEFAULT_RANK_THRESHOLD,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    pub fn with_text_config(mut self, text_config: &str) -> Self {
        self.text_config = text_config.to_string();
        self
    }

    pub fn with_thresholds(mut self, rank_threshold: f32, similarity_threshold: f32) -> Self {
        self.rank_threshold = rank_threshold;
        self.similarity_threshold = similarity_threshold;
        self
    }

    pub fn build(&self, now: DateTime<Utc>) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {}, s.rank, s.title_similarity, s.body_similarity, \
             (s.rank + s.title_similarity + s.body_similarity) AS score \
             FROM blog_post p CROSS JOIN LATERAL (SELECT ts_rank(",
            POST_COLUMNS));

        // setweight(title, 'A') || setweight(body, 'B')
        qb.push("setweight(to_tsvector(");
        qb.push_bind(self.text_config.clone());
        qb.push("::regconfig, coalesce(p.title, '')), 'A') || setweight(to_tsvector(");
        qb.push_bind(self.text_config.clone());
        qb.push("::regconfig, coalesce(p.body, '')), 'B'), plainto_tsquery(");
        qb.push_bind(self.text_config.clone());
        qb.push("::regconfig, ");
        qb.push_bind(self.text.clone());
        qb.push(")) AS rank, similarity(p.title, ");
        qb.push_bind(self.text.clone());
        qb.push(") AS title_similarity, similarity(p.body, ");
        qb.push_bind(self.text.clone());
        qb.push(") AS body_similarity) s");

        PostFilter::published(now).push_where(&mut qb);

        qb.push(" AND (s.rank >= ");
        qb.push_bind(self.rank_threshold);
        qb.push(" OR s.title_similarity >= ");
        qb.push_bind(self.similarity_threshold);
        qb.push(" OR s.body_similarity >= ");
        qb.push_bind(self.similarity_threshold);
        qb.push(") ORDER BY score DESC, p.publish DESC");
        qb
    }
}
