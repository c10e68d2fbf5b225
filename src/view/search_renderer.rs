use ramhorns::Template;

use crate::content::summary::summarize;
use crate::error::Result;
use crate::forms::FormErrors;
use crate::models::ScoredPost;
use crate::view::{Sidebar, ViewError, ViewTag};

const SUMMARY_WORD_COUNT: usize = 30;

#[derive(ramhorns::Content)]
struct SearchPage<'a> {
    site_title: &'a str,
    query: &'a str,
    submitted: bool,
    results: Vec<SearchResult>,
    result_count: usize,
    errors: Vec<ViewError>,
    sidebar: &'a Sidebar,
}

#[derive(ramhorns::Content)]
struct SearchResult {
    title: String,
    link: String,
    summary: String,
    score: String,
    tags: Vec<ViewTag>,
}

/// What the search page shows: the bare form, a rejected query or results
pub enum SearchState<'a> {
    Empty,
    Invalid(&'a str, &'a FormErrors),
    Results(&'a str, &'a [ScoredPost]),
}

pub struct SearchRenderer<'a> {
    pub template: Template<'a>,
}

impl SearchRenderer<'_> {
    pub fn new(search_tpl_src: &str) -> Result<SearchRenderer> {
        let template = Template::new(search_tpl_src)?;
        Ok(SearchRenderer {
            template,
        })
    }

    pub fn render(&self, site_title: &str, state: &SearchState, sidebar: &Sidebar) -> Result<String> {
        let (query, submitted, errors, found): (&str, bool, Vec<ViewError>, &[ScoredPost]) = match state {
            SearchState::Empty => ("", false, vec![], &[]),
            SearchState::Invalid(query, errors) => (*query, false, ViewError::from_errors(errors), &[]),
            SearchState::Results(query, found) => (*query, true, vec![], *found),
        };

        let mut results = Vec::with_capacity(found.len());
        for scored in found {
            results.push(SearchResult {
                title: scored.post.title.clone(),
                link: scored.post.url_path(),
                summary: summarize(&scored.post.body, SUMMARY_WORD_COUNT)?,
                score: format!("{:.3}", scored.score),
                tags: ViewTag::from_tags(&scored.post.tags),
            });
        }

        let rendered = self.template.render(&SearchPage {
            site_title,
            query,
            submitted,
            result_count: results.len(),
            results,
            errors,
            sidebar,
        });

        Ok(rendered)
    }
}
