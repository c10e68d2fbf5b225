use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::error::Result;
use crate::models::Post;
use crate::view::rss_renderer::push_text;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const CHANGE_FREQ: &str = "weekly";
const PRIORITY: &str = "0.9";

pub struct Sitemap<'a> {
    pub base_url: &'a str,
}

impl Sitemap<'_> {
    pub fn render(&self, posts: &[Post]) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut urlset = BytesStart::new("urlset");
        urlset.push_attribute(("xmlns", SITEMAP_NS));
        writer.write_event(Event::Start(urlset))?;

        for post in posts {
            writer.write_event(Event::Start(BytesStart::new("url")))?;
            push_text(&mut writer, "loc", &post.absolute_url(self.base_url))?;
            push_text(&mut writer, "lastmod", &post.updated.format("%Y-%m-%d").to_string())?;
            push_text(&mut writer, "changefreq", CHANGE_FREQ)?;
            push_text(&mut writer, "priority", PRIORITY)?;
            writer.write_event(Event::End(BytesEnd::new("url")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("urlset")))?;

        Ok(writer.into_inner().into_inner())
    }
}
