// tests/feed_parse.rs
use chrono::{TimeZone, Utc};

use feed_ingress::ingest::fetch::parse_feed;

const RSS_FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example Feed</title>
    <link>https://example.com</link>
    <description>Sample entries</description>
    <item>
      <title>First Post</title>
      <link>https://example.com/posts/1</link>
      <guid>https://example.com/posts/1</guid>
      <description>Hello from the first post.</description>
      <pubDate>Fri, 30 Aug 2024 12:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Second Post</title>
      <link>https://example.com/posts/2</link>
      <guid>post-2</guid>
      <description>Another post.</description>
    </item>
  </channel>
</rss>
"#;

#[test]
fn maps_rss_entries_to_domain_items() {
    let parsed = parse_feed(RSS_FIXTURE.as_bytes()).unwrap();
    assert_eq!(parsed.meta.title, "Example Feed");
    assert_eq!(parsed.items.len(), 2);

    let first = &parsed.items[0];
    assert_eq!(first.guid, "https://example.com/posts/1");
    assert_eq!(first.title, "First Post");
    assert_eq!(first.link, "https://example.com/posts/1");
    assert_eq!(first.description, "Hello from the first post.");
    assert_eq!(
        first.published_parsed,
        Some(Utc.with_ymd_and_hms(2024, 8, 30, 12, 0, 0).unwrap())
    );
    assert_eq!(first.published, "2024-08-30T12:00:00Z");
}

#[test]
fn entries_without_a_publish_date_map_with_empty_timestamp() {
    let parsed = parse_feed(RSS_FIXTURE.as_bytes()).unwrap();
    let second = &parsed.items[1];
    assert_eq!(second.guid, "post-2");
    assert_eq!(second.published_parsed, None);
    assert_eq!(second.published, "");
}

#[test]
fn garbage_input_is_a_parse_error() {
    assert!(parse_feed(b"not a feed at all").is_err());
}
