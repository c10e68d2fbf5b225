use markdown::Options;

use crate::error::{BlogError, Result};

pub struct MarkdownRenderer {}

impl MarkdownRenderer {
    /// Renders a post body to HTML. Raw HTML in the body is escaped, HTML
    /// comments are dropped before rendering.
    pub fn render(md_text: &str) -> Result<String> {
        let buf = remove_comments(md_text);
        match markdown::to_html_with_options(buf.as_str(), &Options::gfm()) {
            Ok(x) => Ok(x),
            Err(e) => Err(BlogError::Markdown(e.reason)),
        }
    }
}

fn remove_comments(md_post: &str) -> String {
    let mut res: String = String::new();
    let mut slice = md_post;

    let start_comment = "<!--";
    let end_comment = "-->";

    while let Some(start) = slice.find(start_comment) {
        let next = &slice[(start + start_comment.len())..];
        match next.find(end_comment) {
            Some(end) => {
                res.push_str(&slice[0..start]);
                slice = &next[(end + end_comment.len())..];
            }
            // Unterminated, keep it as text
            None => break,
        }
    }
    res.push_str(slice);

    res
}
