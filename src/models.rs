use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgTypeInfo, PgValueRef};
use sqlx::{Decode, FromRow, Postgres, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    /// Code stored in the `status` column.
    pub fn code(&self) -> &'static str {
        match self {
            PostStatus::Draft => "DF",
            PostStatus::Published => "PB",
        }
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DF" => Ok(PostStatus::Draft),
            "PB" => Ok(PostStatus::Published),
            other => Err(format!("Unknown post status: {}", other)),
        }
    }
}

impl Type<Postgres> for PostStatus {
    fn type_info() -> PgTypeInfo {
        <&str as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <&str as Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for PostStatus {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let code = <&str as Decode<Postgres>>::decode(value)?;
        Ok(code.parse::<PostStatus>()?)
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub publish: DateTime<Utc>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub status: PostStatus,
    #[sqlx(skip)]
    pub tags: Vec<Tag>,
}

impl Post {
    /// `/blog/{year}/{month}/{day}/{slug}/`, month and day without padding.
    pub fn url_path(&self) -> String {
        format!("/blog/{}/{}/{}/{}/",
                self.publish.year(),
                self.publish.month(),
                self.publish.day(),
                self.slug)
    }

    pub fn absolute_url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.url_path())
    }

    pub fn is_visible_at(&self, now: &DateTime<Utc>) -> bool {
        self.status == PostStatus::Published && self.publish <= *now
    }
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "id={}, slug={}, publish={}, status={}",
               self.id,
               self.slug,
               self.publish,
               self.status.code())
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub name: String,
    pub email: String,
    pub body: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub active: bool,
}

/// A validated comment, ready to be stored. New comments are always active.
#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub name: String,
    pub email: String,
    pub body: String,
}

/// Result row of the similar posts query.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct SimilarPost {
    #[sqlx(flatten)]
    pub post: Post,
    pub same_tags: i64,
}

/// Result row of the search query.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ScoredPost {
    #[sqlx(flatten)]
    pub post: Post,
    pub rank: f32,
    pub title_similarity: f32,
    pub body_similarity: f32,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CommentedPost {
    #[sqlx(flatten)]
    pub post: Post,
    pub total_comments: i64,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn post_at(publish: DateTime<Utc>, status: PostStatus) -> Post {
        Post {
            id: 1,
            title: "Django news".to_string(),
            slug: "django-news".to_string(),
            body: "body".to_string(),
            publish,
            created: publish,
            updated: publish,
            status,
            tags: vec![],
        }
    }

    #[test]
    fn test_url_path() {
        let post = post_at(Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap(), PostStatus::Published);
        assert_eq!(post.url_path(), "/blog/2024/1/5/django-news/");
        assert_eq!(post.absolute_url("https://example.com/"), "https://example.com/blog/2024/1/5/django-news/");
        assert_eq!(post.absolute_url("https://example.com"), "https://example.com/blog/2024/1/5/django-news/");
    }

    #[test]
    fn test_visibility() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let past = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let future = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        assert!(post_at(past, PostStatus::Published).is_visible_at(&now));
        assert!(post_at(now, PostStatus::Published).is_visible_at(&now));
        assert!(!post_at(past, PostStatus::Draft).is_visible_at(&now));
        assert!(!post_at(future, PostStatus::Published).is_visible_at(&now));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!("PB".parse::<PostStatus>(), Ok(PostStatus::Published));
        assert_eq!("DF".parse::<PostStatus>(), Ok(PostStatus::Draft));
        assert!("XX".parse::<PostStatus>().is_err());
        assert_eq!(PostStatus::Published.code(), "PB");
    }
}
