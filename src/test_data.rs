use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::config::parse_config;
use crate::error::{BlogError, Result};
use crate::mailer::{Mailer, OutgoingMail};
use crate::models::{Comment, CommentedPost, NewComment, Post, PostStatus, ScoredPost, SimilarPost, Tag};
use crate::paginator::Page;
use crate::server::{AppState, Templates};
use crate::store::queries::SearchQuery;
use crate::store::BlogStore;

pub const TEST_CONFIG: &str = r##"
[site]
title = "My blog"
base_url = "https://blog.example.com/"
description = "Posts about things"

[paths]
template_dir = "res/template"
public_dir = "res/public"

[server]
address = "127.0.0.1"
port = 8000

[database]
url = "postgres://blog@localhost/blog"

[rss_feed]
title = "My blog"
description = "New posts of the blog."
"##;

pub const POST_BODY_MD: &str = "# Django news

Django *5.0* was released.

<!-- internal note -->
Read the [release notes](https://docs.djangoproject.com/).
";

fn templates() -> Templates {
    Templates {
        list: "{{#filtered}}tag {{tag_name}} {{/filtered}}page {{page_number}}/{{page_count}}\
{{#sidebar}} total={{total_posts}}{{/sidebar}}:{{#post_list}} {{title}};{{/post_list}}".to_string(),
        detail: "{{post_title}} comments=[{{#comments}}{{name}}{{/comments}}] \
similar=[{{#similar_posts}}({{title}}){{/similar_posts}}]".to_string(),
        comment: "{{#added}}added by {{comment_name}}{{/added}}\
{{^added}}errors={{#errors}}[{{field}}]{{/errors}}{{/added}}".to_string(),
        share: "share {{post_title}} sent={{#sent}}yes{{/sent}}{{^sent}}no{{/sent}}\
{{#errors}} errors=[{{field}}]{{/errors}}{{#mail_failed}} failed{{/mail_failed}}".to_string(),
        search: "{{#submitted}}results for {{query}}:{{#results}} {{title}};{{/results}}{{/submitted}}\
{{^submitted}}search form{{#errors}} errors=[{{field}}]{{/errors}}{{/submitted}}".to_string(),
    }
}

pub fn test_state(store: Arc<dyn BlogStore>, mailer: Arc<dyn Mailer>) -> Arc<AppState> {
    Arc::new(AppState {
        config: parse_config(TEST_CONFIG).unwrap(),
        templates: templates(),
        store,
        mailer,
    })
}

fn tag(id: i64, slug: &str) -> Tag {
    Tag { id, name: slug.to_string(), slug: slug.to_string() }
}

fn post(id: i64, title: &str, slug: &str, body: &str, publish: DateTime<Utc>,
        status: PostStatus, tags: Vec<Tag>) -> Post {
    Post {
        id,
        title: title.to_string(),
        slug: slug.to_string(),
        body: body.to_string(),
        publish,
        created: publish,
        updated: publish,
        status,
        tags,
    }
}

fn comment(id: i64, post_id: i64, name: &str, active: bool) -> Comment {
    let created = Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, id as u32).unwrap();
    Comment {
        id,
        post_id,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        body: format!("Comment from {}", name),
        created,
        updated: created,
        active,
    }
}

/// In-memory store with the same visibility rules as the database one.
pub struct FakeStore {
    posts: Vec<Post>,
    tags: Vec<Tag>,
    comments: Mutex<Vec<Comment>>,
}

impl FakeStore {
    /// Visible posts, newest first: "Django news", "Second post", "First post".
    /// "Draft post" is a draft and "Future post" is scheduled for 2030.
    pub fn with_sample_posts() -> Self {
        let django = tag(1, "django");
        let python = tag(2, "python");
        let posts = vec![
            post(1, "First post", "first-post", "The first post.",
                 Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap(), PostStatus::Published, vec![django.clone()]),
            post(2, "Draft post", "draft-post", "Unfinished django draft.",
                 Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap(), PostStatus::Draft, vec![django.clone()]),
            post(3, "Django news", "django-news", POST_BODY_MD,
                 Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap(), PostStatus::Published,
                 vec![django.clone(), python.clone()]),
            post(4, "Second post", "second-post", "More words here.",
                 Utc.with_ymd_and_hms(2024, 2, 20, 8, 0, 0).unwrap(), PostStatus::Published, vec![python.clone()]),
            post(5, "Future post", "future-post", "Not yet.",
                 Utc.with_ymd_and_hms(2030, 1, 1, 8, 0, 0).unwrap(), PostStatus::Published, vec![django.clone()]),
        ];

        FakeStore {
            posts,
            tags: vec![django, python],
            comments: Mutex::new(vec![comment(1, 3, "Ana", true), comment(2, 3, "Eve", false)]),
        }
    }

    fn visible(&self, tag: Option<&Tag>) -> Vec<Post> {
        let now = Utc::now();
        let mut posts: Vec<Post> = self.posts.iter()
            .filter(|p| p.is_visible_at(&now))
            .filter(|p| tag.map_or(true, |t| p.tags.iter().any(|pt| pt.id == t.id)))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.publish.cmp(&a.publish).then(b.id.cmp(&a.id)));
        posts
    }

    fn comment_count(&self, post_id: i64) -> i64 {
        self.comments.lock().unwrap().iter()
            .filter(|c| c.post_id == post_id)
            .count() as i64
    }
}

#[async_trait]
impl BlogStore for FakeStore {
    async fn find_tag(&self, slug: &str) -> Result<Option<Tag>> {
        Ok(self.tags.iter().find(|t| t.slug == slug).cloned())
    }

    async fn count_published(&self, tag: Option<&Tag>) -> Result<u64> {
        Ok(self.visible(tag).len() as u64)
    }

    async fn list_published(&self, tag: Option<&Tag>, page: &Page) -> Result<Vec<Post>> {
        Ok(self.visible(tag).into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn all_published(&self) -> Result<Vec<Post>> {
        Ok(self.visible(None))
    }

    async fn find_published(&self, publish_date: NaiveDate, slug: &str) -> Result<Option<Post>> {
        Ok(self.visible(None).into_iter()
            .find(|p| p.slug == slug && p.publish.date_naive() == publish_date))
    }

    async fn find_published_by_id(&self, id: i64) -> Result<Option<Post>> {
        Ok(self.visible(None).into_iter().find(|p| p.id == id))
    }

    async fn active_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        let mut comments: Vec<Comment> = self.comments.lock().unwrap().iter()
            .filter(|c| c.post_id == post_id && c.active)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created);
        Ok(comments)
    }

    async fn add_comment(&self, post_id: i64, comment: NewComment) -> Result<Comment> {
        if !self.posts.iter().any(|p| p.id == post_id) {
            return Err(BlogError::NotFound(format!("Post {}", post_id)));
        }

        let mut comments = self.comments.lock().unwrap();
        let now = Utc::now();
        let comment = Comment {
            id: comments.len() as i64 + 1,
            post_id,
            name: comment.name,
            email: comment.email,
            body: comment.body,
            created: now,
            updated: now,
            active: true,
        };
        comments.push(comment.clone());
        Ok(comment)
    }

    async fn similar_posts(&self, post_id: i64, count: i64) -> Result<Vec<SimilarPost>> {
        let Some(source) = self.posts.iter().find(|p| p.id == post_id) else {
            return Ok(vec![]);
        };

        let mut similar: Vec<SimilarPost> = self.visible(None).into_iter()
            .filter(|p| p.id != post_id)
            .map(|p| {
                let same_tags = p.tags.iter().filter(|t| source.tags.contains(t)).count() as i64;
                SimilarPost { post: p, same_tags }
            })
            .filter(|s| s.same_tags > 0)
            .collect();
        similar.sort_by(|a, b| b.same_tags.cmp(&a.same_tags).then(b.post.publish.cmp(&a.post.publish)));
        similar.truncate(count as usize);
        Ok(similar)
    }

    /// Substring matches stand in for the database scores: a title hit is
    /// worth 1.0 and a body hit 0.5. Thresholds and score ordering follow the
    /// real query; the PostgreSQL ranking itself is covered by tests/pg_store.rs.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<ScoredPost>> {
        let text = query.text.to_lowercase();
        let hit = |field: &str, weight: f32| if field.to_lowercase().contains(&text) { weight } else { 0.0 };

        let mut results: Vec<ScoredPost> = self.visible(None).into_iter()
            .map(|p| {
                let title_similarity = hit(&p.title, 1.0);
                let body_similarity = hit(&p.body, 0.5);
                ScoredPost { post: p, rank: 0.0, title_similarity, body_similarity, score: title_similarity + body_similarity }
            })
            .filter(|r| r.rank >= query.rank_threshold
                || r.title_similarity >= query.similarity_threshold
                || r.body_similarity >= query.similarity_threshold)
            .collect();
        results.sort_by(|a, b| b.score.total_cmp(&a.score).then(b.post.publish.cmp(&a.post.publish)));
        Ok(results)
    }

    async fn most_commented(&self, count: i64) -> Result<Vec<CommentedPost>> {
        let mut commented: Vec<CommentedPost> = self.visible(None).into_iter()
            .map(|p| {
                let total_comments = self.comment_count(p.id);
                CommentedPost { post: p, total_comments }
            })
            .collect();
        commented.sort_by(|a, b| b.total_comments.cmp(&a.total_comments));
        commented.truncate(count as usize);
        Ok(commented)
    }
}

/// Keeps every mail instead of sending it. A failing mailer rejects all of them.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        RecordingMailer { sent: Mutex::new(vec![]), fail: true }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<()> {
        if self.fail {
            return Err(BlogError::Mail("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}
