use anyhow::Result;
use feedsync::SqliteProvider;

// --- Test Setup ---

/// A helper struct to manage database creation for each test.
pub struct TestSetup {
    pub store: SqliteProvider,
}

impl TestSetup {
    /// Creates a new, isolated in-memory database and initializes the schema.
    pub async fn new() -> Result<Self> {
        let store = SqliteProvider::new(":memory:").await?;
        store.initialize_schema().await?;
        Ok(Self { store })
    }

    /// Titles of all stored articles, sorted.
    pub async fn article_titles(&self) -> Result<Vec<String>> {
        let conn = self.store.db.connect()?;
        let mut rows = conn
            .query(
                "SELECT title FROM content WHERE content_type = 'article' ORDER BY title ASC",
                (),
            )
            .await?;
        let mut titles = Vec::new();
        while let Some(row) = rows.next().await? {
            titles.push(row.get::<String>(0)?);
        }
        Ok(titles)
    }

    /// Scalar result of a single-value query such as `SELECT COUNT(*) ...`.
    pub async fn scalar(&self, sql: &str) -> Result<i64> {
        let conn = self.store.db.connect()?;
        let mut rows = conn.query(sql, ()).await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| anyhow::anyhow!("Query returned no rows: {sql}"))?;
        Ok(row.get::<i64>(0)?)
    }
}

// --- RSS Fixtures ---

/// One `<item>` of a generated feed. Every field is emitted as given.
#[derive(Clone, Debug)]
pub struct RssItemFixture {
    pub title: String,
    pub guid: String,
    pub link: String,
    pub pub_date: String,
    pub description: String,
    pub encoded: String,
    pub image_url: String,
}

impl RssItemFixture {
    /// A complete item whose fields derive from `title`. The image is served
    /// from `image_base` under `/images/<slug>.jpg`.
    pub fn new(title: &str, image_base: &str) -> Self {
        let slug = title.to_lowercase().replace(' ', "-");
        Self {
            title: title.to_string(),
            guid: format!("urn:feedsync:{slug}"),
            link: format!("https://news.example.com/{slug}"),
            pub_date: "Mon, 01 Jan 2024 00:00:00 GMT".to_string(),
            description: format!("Summary of {title}"),
            encoded: format!("<p>Body of {title}</p>"),
            image_url: format!("{image_base}/images/{slug}.jpg"),
        }
    }

    fn to_xml(&self) -> String {
        format!(
            r#"<item>
            <title>{title}</title>
            <guid isPermaLink="false">{guid}</guid>
            <link>{link}</link>
            <pubDate>{pub_date}</pubDate>
            <description>{description}</description>
            <media:content url="{image_url}" medium="image" />
            <content:encoded><![CDATA[{encoded}]]></content:encoded>
        </item>"#,
            title = self.title,
            guid = self.guid,
            link = self.link,
            pub_date = self.pub_date,
            description = self.description,
            image_url = self.image_url,
            encoded = self.encoded,
        )
    }
}

/// Renders an RSS 2.0 document with the media and content namespaces declared.
pub fn rss_feed(items: &[RssItemFixture]) -> String {
    let items = items
        .iter()
        .map(RssItemFixture::to_xml)
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/" xmlns:content="http://purl.org/rss/1.0/modules/content/">
<channel>
    <title>Test Feed</title>
    <link>https://news.example.com</link>
    <description>A feed for testing the importer.</description>
    {items}
</channel>
</rss>"#
    )
}
