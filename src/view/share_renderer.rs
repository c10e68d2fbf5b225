use ramhorns::Template;

use crate::error::Result;
use crate::forms::{EmailPostForm, FormErrors};
use crate::models::Post;
use crate::view::{form_value, Sidebar, ViewError};

#[derive(ramhorns::Content)]
struct SharePage<'a> {
    site_title: &'a str,
    post_id: i64,
    post_title: &'a str,
    link: String,
    sent: bool,
    mail_failed: bool,
    errors: Vec<ViewError>,
    name: &'a str,
    email: &'a str,
    to: &'a str,
    comments: &'a str,
    sidebar: &'a Sidebar,
}

/// State of the share form after a GET or a POST
pub enum ShareState<'a> {
    Empty,
    Sent(&'a EmailPostForm),
    Invalid(&'a EmailPostForm, &'a FormErrors),
    MailFailed(&'a EmailPostForm),
}

pub struct ShareRenderer<'a> {
    pub template: Template<'a>,
}

impl ShareRenderer<'_> {
    pub fn new(share_tpl_src: &str) -> Result<ShareRenderer> {
        let template = Template::new(share_tpl_src)?;
        Ok(ShareRenderer {
            template,
        })
    }

    pub fn render(&self, site_title: &str, post: &Post, state: &ShareState,
                  sidebar: &Sidebar) -> Result<String> {
        let (sent, mail_failed, errors, form) = match state {
            ShareState::Empty => (false, false, vec![], None),
            ShareState::Sent(form) => (true, false, vec![], Some(*form)),
            ShareState::Invalid(form, errors) => (false, false, ViewError::from_errors(errors), Some(*form)),
            ShareState::MailFailed(form) => (false, true, vec![], Some(*form)),
        };

        let (name, email, to, comments) = match form {
            Some(form) => (form_value(&form.name), form_value(&form.email),
                           form_value(&form.to), form_value(&form.comments)),
            None => ("", "", "", ""),
        };

        let rendered = self.template.render(&SharePage {
            site_title,
            post_id: post.id,
            post_title: post.title.as_str(),
            link: post.url_path(),
            sent,
            mail_failed,
            errors,
            name,
            email,
            to,
            comments,
            sidebar,
        });

        Ok(rendered)
    }
}
