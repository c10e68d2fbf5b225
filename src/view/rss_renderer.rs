use std::io::Cursor;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::content::summary::summarize;
use crate::error::Result;
use crate::models::Post;

/* Example
<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
<channel>
  <title>My blog</title>
  <link>https://blog.example.com/blog/</link>
  <description>New posts of my blog</description>
  <item>
    <title>Django news</title>
    <link>https://blog.example.com/blog/2024/3/4/django-news/</link>
    <guid>https://blog.example.com/blog/2024/3/4/django-news/</guid>
    <description><![CDATA[All about Django]]></description>
    <pubDate>Mon, 4 Mar 2024 10:00:00 +0000</pubDate>
  </item>
</channel>
</rss>
*/

pub struct RssChannel<'a> {
    pub ch_title: &'a str,
    pub base_url: &'a str,
    pub ch_desc: &'a str,
    pub summary_word_count: usize,
}

impl<'a> RssChannel<'a> {
    pub fn render(&self, posts: &[Post]) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        let decl = Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None));
        writer.write_event(decl)?;

        let mut rss = BytesStart::new("rss");
        rss.push_attribute(("version", "2.0"));
        writer.write_event(Event::Start(rss))?;

        writer.write_event(Event::Start(BytesStart::new("channel")))?;
        push_text(&mut writer, "title", self.ch_title)?;
        let ch_link = format!("{}/blog/", self.base_url.trim_end_matches('/'));
        push_text(&mut writer, "link", &ch_link)?;
        push_text(&mut writer, "description", self.ch_desc)?;

        for post in posts {
            writer.write_event(Event::Start(BytesStart::new("item")))?;

            push_text(&mut writer, "title", &post.title)?;

            let link = post.absolute_url(self.base_url);
            push_text(&mut writer, "link", &link)?;
            push_text(&mut writer, "guid", &link)?;

            let description = summarize(&post.body, self.summary_word_count)?;
            push_cdata(&mut writer, "description", &description)?;

            // Mon, 4 Mar 2024 10:00:00 +0000
            push_text(&mut writer, "pubDate", &post.publish.to_rfc2822())?;

            writer.write_event(Event::End(BytesEnd::new("item")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("channel")))?;
        writer.write_event(Event::End(BytesEnd::new("rss")))?;

        Ok(writer.into_inner().into_inner())
    }
}

pub(crate) fn push_text(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn push_cdata(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    if text.contains("]]>") {
        let new_text = text.replace("]]>", "]] >");
        writer.write_event(Event::CData(BytesCData::new(&new_text)))?;
    } else {
        writer.write_event(Event::CData(BytesCData::new(text)))?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str;

    use chrono::{TimeZone, Utc};

    use crate::models::PostStatus;

    use super::*;

    fn create_post(id: i64, body: &str) -> Post {
        let publish = Utc.with_ymd_and_hms(2024, 1, 2, 5, 6, 7).unwrap();
        Post {
            id,
            title: format!("title-of-post-{}", id),
            slug: format!("post-{}", id),
            body: body.to_string(),
            publish,
            created: publish,
            updated: publish,
            status: PostStatus::Published,
            tags: vec![],
        }
    }

    #[test]
    fn render_xml() {
        let posts = vec![create_post(1, "summary of *post* 1"), create_post(2, "one two three four five")];

        let rss = RssChannel {
            ch_title: "my feed",
            base_url: "https://blog.example.com/",
            ch_desc: "My blog feed",
            summary_word_count: 4,
        };
        let xml = rss.render(&posts).unwrap();
        assert_eq!(str::from_utf8(&xml).unwrap(), EXPECTED);
    }

    const EXPECTED: &str = r##"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>my feed</title><link>https://blog.example.com/blog/</link><description>My blog feed</description><item><title>title-of-post-1</title><link>https://blog.example.com/blog/2024/1/2/post-1/</link><guid>https://blog.example.com/blog/2024/1/2/post-1/</guid><description><![CDATA[summary of post 1]]></description><pubDate>Tue, 2 Jan 2024 05:06:07 +0000</pubDate></item><item><title>title-of-post-2</title><link>https://blog.example.com/blog/2024/1/2/post-2/</link><guid>https://blog.example.com/blog/2024/1/2/post-2/</guid><description><![CDATA[one two three four …]]></description><pubDate>Tue, 2 Jan 2024 05:06:07 +0000</pubDate></item></channel></rss>"##;
}
