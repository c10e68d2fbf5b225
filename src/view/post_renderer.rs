use ramhorns::Template;

use crate::content::markdown_renderer::MarkdownRenderer;
use crate::error::Result;
use crate::models::{Comment, Post, SimilarPost};
use crate::text_utils::format_date_time;
use crate::view::{PostLink, Sidebar, ViewTag};

#[derive(ramhorns::Content)]
struct ViewComment {
    number: usize,
    name: String,
    date: String,
    time: String,
    body: String,
}

#[derive(ramhorns::Content)]
struct ViewItem<'a> {
    site_title: &'a str,
    post_id: i64,
    post_title: &'a str,
    post_content: &'a str,
    link: String,
    date: &'a str,
    time: &'a str,
    tags: Vec<ViewTag>,
    comments: Vec<ViewComment>,
    comment_count: usize,
    similar_posts: Vec<PostLink>,
    sidebar: &'a Sidebar,
}

pub struct PostRenderer<'a> {
    pub template: Template<'a>,
}

impl PostRenderer<'_> {
    pub fn new(view_tpl_src: &str) -> Result<PostRenderer> {
        let template = Template::new(view_tpl_src)?;
        Ok(PostRenderer {
            template,
        })
    }

    pub fn render(&self, site_title: &str, post: &Post, comments: &[Comment],
                  similar: &[SimilarPost], sidebar: &Sidebar) -> Result<String> {
        let post_content = MarkdownRenderer::render(&post.body)?;
        let (date, time) = format_date_time(&post.publish);

        let comments: Vec<ViewComment> = comments.iter()
            .enumerate()
            .map(|(i, c)| {
                let (date, time) = format_date_time(&c.created);
                ViewComment {
                    number: i + 1,
                    name: c.name.clone(),
                    date,
                    time,
                    body: c.body.clone(),
                }
            })
            .collect();

        let rendered_page = self.template.render(&ViewItem {
            site_title,
            post_id: post.id,
            post_title: post.title.as_str(),
            post_content: post_content.as_str(),
            link: post.url_path(),
            date: date.as_str(),
            time: time.as_str(),
            tags: ViewTag::from_tags(&post.tags),
            comment_count: comments.len(),
            comments,
            similar_posts: similar.iter().map(|s| PostLink::from(&s.post)).collect(),
            sidebar,
        });

        Ok(rendered_page)
    }
}
