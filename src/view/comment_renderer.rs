use ramhorns::Template;

use crate::error::Result;
use crate::forms::{CommentForm, FormErrors};
use crate::models::{Comment, Post};
use crate::view::{form_value, Sidebar, ViewError};

#[derive(ramhorns::Content)]
struct CommentPage<'a> {
    site_title: &'a str,
    post_id: i64,
    post_title: &'a str,
    link: String,
    added: bool,
    comment_name: &'a str,
    errors: Vec<ViewError>,
    name: &'a str,
    email: &'a str,
    body: &'a str,
    sidebar: &'a Sidebar,
}

/// Outcome of a comment submission
pub enum CommentOutcome<'a> {
    Added(&'a Comment),
    Rejected(&'a CommentForm, &'a FormErrors),
}

pub struct CommentRenderer<'a> {
    pub template: Template<'a>,
}

impl CommentRenderer<'_> {
    pub fn new(comment_tpl_src: &str) -> Result<CommentRenderer> {
        let template = Template::new(comment_tpl_src)?;
        Ok(CommentRenderer {
            template,
        })
    }

    pub fn render(&self, site_title: &str, post: &Post, outcome: &CommentOutcome,
                  sidebar: &Sidebar) -> Result<String> {
        let (added, comment_name, errors, form) = match outcome {
            CommentOutcome::Added(comment) => (true, comment.name.as_str(), vec![], None),
            CommentOutcome::Rejected(form, errors) => (false, "", ViewError::from_errors(errors), Some(*form)),
        };

        let (name, email, body) = match form {
            Some(form) => (form_value(&form.name), form_value(&form.email), form_value(&form.body)),
            None => ("", "", ""),
        };

        let rendered = self.template.render(&CommentPage {
            site_title,
            post_id: post.id,
            post_title: post.title.as_str(),
            link: post.url_path(),
            added,
            comment_name,
            errors,
            name,
            email,
            body,
            sidebar,
        });

        Ok(rendered)
    }
}
