use lazy_static::lazy_static;
use regex::Regex;

use crate::content::markdown_renderer::MarkdownRenderer;
use crate::error::Result;
use crate::text_utils::truncate_words;

/// Plain text summary of a Markdown body: rendered, reduced to text and cut
/// to `word_count` words.
pub fn summarize(md_body: &str, word_count: usize) -> Result<String> {
    let html = MarkdownRenderer::render(md_body)?;
    Ok(truncate_words(&html_to_text(&html), word_count))
}

pub fn html_to_text(html: &str) -> String {
    lazy_static! {
        static ref TAG_REGEX: Regex = Regex::new(r"<[^>]*>").unwrap();
    }

    let text = TAG_REGEX.replace_all(html, " ");
    // &amp; last, so "&amp;lt;" stays "&lt;"
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
