use crate::forms::FormErrors;
use crate::models::{CommentedPost, Post, Tag};

pub mod comment_renderer;
pub mod list_renderer;
pub mod post_renderer;
pub mod rss_renderer;
pub mod search_renderer;
pub mod share_renderer;
pub mod sitemap_renderer;

#[derive(ramhorns::Content, Debug, Clone, PartialEq)]
pub struct ViewTag {
    pub name: String,
    pub link: String,
}

impl ViewTag {
    pub fn from_tags(tags: &[Tag]) -> Vec<ViewTag> {
        tags.iter()
            .map(|t| ViewTag {
                name: t.name.clone(),
                link: format!("/blog/tag/{}/", t.slug),
            })
            .collect()
    }
}

#[derive(ramhorns::Content, Debug, Clone, PartialEq)]
pub struct PostLink {
    pub title: String,
    pub link: String,
}

impl From<&Post> for PostLink {
    fn from(post: &Post) -> Self {
        PostLink {
            title: post.title.clone(),
            link: post.url_path(),
        }
    }
}

#[derive(ramhorns::Content, Debug, Clone, PartialEq)]
pub struct ViewError {
    pub field: String,
    pub message: String,
}

impl ViewError {
    pub fn from_errors(errors: &FormErrors) -> Vec<ViewError> {
        errors.iter()
            .map(|e| ViewError {
                field: e.field.to_string(),
                message: e.message.clone(),
            })
            .collect()
    }
}

/// Submitted value echoed back into a re-rendered form
pub fn form_value(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

#[derive(ramhorns::Content, Debug, Clone, PartialEq)]
pub struct CommentedLink {
    pub title: String,
    pub link: String,
    pub total_comments: i64,
}

/// Data shown next to every HTML page.
#[derive(ramhorns::Content, Debug, Clone, Default, PartialEq)]
pub struct Sidebar {
    pub total_posts: u64,
    pub latest_posts: Vec<PostLink>,
    pub most_commented: Vec<CommentedLink>,
}

impl Sidebar {
    pub fn new(total_posts: u64, latest: &[Post], most_commented: &[CommentedPost]) -> Self {
        Sidebar {
            total_posts,
            latest_posts: latest.iter().map(PostLink::from).collect(),
            most_commented: most_commented.iter()
                .map(|c| CommentedLink {
                    title: c.post.title.clone(),
                    link: c.post.url_path(),
                    total_comments: c.total_comments,
                })
                .collect(),
        }
    }
}
