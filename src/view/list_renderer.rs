use ramhorns::Template;

use crate::content::markdown_renderer::MarkdownRenderer;
use crate::content::summary::html_to_text;
use crate::error::Result;
use crate::models::{Post, Tag};
use crate::paginator::{Page, Paginator};
use crate::text_utils::{format_date_time, truncate_words};
use crate::view::{Sidebar, ViewTag};

const SUMMARY_WORD_COUNT: usize = 30;

#[derive(ramhorns::Content)]
struct ListPage<'a> {
    site_title: &'a str,
    filtered: bool,
    tag_name: &'a str,
    post_list: Vec<PostItem>,
    page_list: Vec<ViewPagination>,
    show_pagination: bool,
    has_previous: bool,
    previous_page: u32,
    has_next: bool,
    next_page: u32,
    page_number: u32,
    page_count: u32,
    sidebar: &'a Sidebar,
}

#[derive(ramhorns::Content)]
struct PostItem {
    date: String,
    time: String,
    link: String,
    title: String,
    summary: String,
    tags: Vec<ViewTag>,
}

#[derive(ramhorns::Content)]
struct ViewPagination {
    current: bool,
    number: u32,
}

pub struct ListRenderer<'a> {
    pub template: Template<'a>,
}

impl ListRenderer<'_> {
    pub fn new(list_tpl_src: &str) -> Result<ListRenderer> {
        let template = Template::new(list_tpl_src)?;
        Ok(ListRenderer {
            template,
        })
    }

    pub fn render(&self, site_title: &str, posts: &[Post], tag: Option<&Tag>,
                  paginator: &Paginator, page: &Page, sidebar: &Sidebar) -> Result<String> {
        let mut post_list = vec![];
        for post in posts {
            let (date, time) = format_date_time(&post.publish);
            let html = MarkdownRenderer::render(&post.body)?;
            post_list.push(PostItem {
                date,
                time,
                link: post.url_path(),
                title: post.title.clone(),
                summary: truncate_words(&html_to_text(&html), SUMMARY_WORD_COUNT),
                tags: ViewTag::from_tags(&post.tags),
            });
        }

        let page_list: Vec<ViewPagination> = (1..=paginator.page_count())
            .map(|number| ViewPagination { current: number == page.number, number })
            .collect();

        let rendered = self.template.render(&ListPage {
            site_title,
            filtered: tag.is_some(),
            tag_name: tag.map(|t| t.name.as_str()).unwrap_or(""),
            post_list,
            page_list,
            show_pagination: paginator.page_count() > 1,
            has_previous: paginator.has_previous(page),
            previous_page: page.number.saturating_sub(1),
            has_next: paginator.has_next(page),
            next_page: page.number + 1,
            page_number: page.number,
            page_count: paginator.page_count(),
            sidebar,
        });

        Ok(rendered)
    }
}
