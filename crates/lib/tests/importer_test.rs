//! # Importer and Reconciler Tests
//!
//! Runs full migrations against an in-memory store with mocked feed and file
//! collaborators, covering the repeat-run, shrinking-feed and empty-feed
//! behaviour as well as the per-item error policies.

mod common;

use crate::common::{
    article_titles, count, item, new_store, setup_tracing, MockFeedSource, StubFileRetriever,
};
use feedsync::errors::{ImportError, ItemParseError};
use feedsync::{
    migrate, ContentLocator, ContentStore, FeedImporter, ImportMode, ImportOptions,
    InvalidItem, ItemErrorPolicy, Reconciler,
};
use std::collections::HashSet;

const FEED_URL: &str = "https://example.com/sports/latest";

async fn run(
    store: &feedsync::SqliteProvider,
    feed: &MockFeedSource,
    options: ImportOptions,
) -> Result<feedsync::MigrationReport, ImportError> {
    let files = StubFileRetriever::new(store);
    let importer = FeedImporter::new(store, feed, &files, options);
    let reconciler = Reconciler::new(store);
    migrate(&importer, &reconciler, FEED_URL).await
}

#[tokio::test]
async fn test_first_run_creates_tagged_article() {
    setup_tracing();
    let store = new_store().await;
    let feed = MockFeedSource::with_items(vec![item("Foo")]);

    let report = run(&store, &feed, ImportOptions::default()).await.unwrap();

    assert_eq!(
        report.to_string(),
        "1 migration completed out of 1 and 0 existing nodes deleted."
    );
    let sports = store.find_term("sports", "tags").await.unwrap().unwrap();
    let latest = store.find_term("latest", "tags").await.unwrap().unwrap();
    let foo = ContentLocator::new(&store)
        .find_by_title("Foo")
        .await
        .unwrap()
        .expect("article was created");
    assert_eq!(foo.tags, vec![sports, latest]);
    assert!(foo.image.is_some());
    assert_eq!(foo.created, 1_704_067_200);
    assert_eq!(foo.changed, 1_704_067_200);
    assert_eq!(foo.owner_id, 1);
    assert_eq!(foo.body.summary, "Summary of Foo");
    assert_eq!(foo.body.value, "<p>Foo</p>");
    assert_eq!(feed.fetched_urls.read().unwrap().as_slice(), [FEED_URL]);
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    setup_tracing();
    let store = new_store().await;
    let feed = MockFeedSource::with_items(vec![item("Foo")]);

    run(&store, &feed, ImportOptions::default()).await.unwrap();
    let report = run(&store, &feed, ImportOptions::default()).await.unwrap();

    assert_eq!(
        report.to_string(),
        "0 migration completed out of 1 and 0 existing nodes deleted."
    );
    assert_eq!(article_titles(&store).await, vec!["Foo"]);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM taxonomy_terms").await, 2);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM managed_files").await, 1);
}

#[tokio::test]
async fn test_empty_feed_skips_reconciliation() {
    setup_tracing();
    let store = new_store().await;
    let feed = MockFeedSource::with_items(vec![item("Foo"), item("Bar")]);
    run(&store, &feed, ImportOptions::default()).await.unwrap();

    feed.set_items(vec![]);
    let report = run(&store, &feed, ImportOptions::default()).await.unwrap();

    assert_eq!(
        report.to_string(),
        "0 migration completed out of 0 and 0 existing nodes deleted."
    );
    assert_eq!(article_titles(&store).await, vec!["Bar", "Foo"]);
}

#[tokio::test]
async fn test_dropped_title_is_deleted() {
    setup_tracing();
    let store = new_store().await;
    let feed = MockFeedSource::with_items(vec![item("Foo"), item("Bar")]);
    run(&store, &feed, ImportOptions::default()).await.unwrap();

    feed.set_items(vec![item("Foo")]);
    let report = run(&store, &feed, ImportOptions::default()).await.unwrap();

    assert_eq!(report.deleted, 1);
    assert_eq!(report.created, 0);
    assert_eq!(report.total_items, 1);
    assert_eq!(article_titles(&store).await, vec!["Foo"]);
    // Only Foo's two tag references remain.
    assert_eq!(count(&store, "SELECT COUNT(*) FROM content_tags").await, 2);
}

#[tokio::test]
async fn test_stored_titles_match_feed_after_run() {
    setup_tracing();
    let store = new_store().await;
    let feed = MockFeedSource::with_items(vec![item("One"), item("Two"), item("Three")]);
    run(&store, &feed, ImportOptions::default()).await.unwrap();

    feed.set_items(vec![item("Two"), item("Four")]);
    let report = run(&store, &feed, ImportOptions::default()).await.unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.deleted, 2);
    assert_eq!(article_titles(&store).await, vec!["Four", "Two"]);
}

#[tokio::test]
async fn test_always_create_duplicates_on_rerun() {
    setup_tracing();
    let store = new_store().await;
    let feed = MockFeedSource::with_items(vec![item("Foo")]);
    let options = ImportOptions {
        mode: ImportMode::AlwaysCreate,
        ..Default::default()
    };

    run(&store, &feed, options).await.unwrap();
    let report = run(&store, &feed, options).await.unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.deleted, 0);
    assert_eq!(article_titles(&store).await, vec!["Foo", "Foo"]);
    // Terms are still resolved, never duplicated.
    assert_eq!(count(&store, "SELECT COUNT(*) FROM taxonomy_terms").await, 2);
}

#[tokio::test]
async fn test_parse_error_aborts_by_default() {
    setup_tracing();
    let store = new_store().await;
    let feed = MockFeedSource::default();
    feed.set_results(vec![
        Ok(item("Foo")),
        Err(ItemParseError::MissingField {
            position: 1,
            field: "pubDate",
        }
        .into()),
        Ok(item("Bar")),
    ]);

    let err = run(&store, &feed, ImportOptions::default()).await.unwrap_err();

    assert!(matches!(
        err,
        ImportError::ItemParse(ItemParseError::MissingField {
            position: 1,
            field: "pubDate"
        })
    ));
    // No rollback: the item before the failure stays imported.
    assert_eq!(article_titles(&store).await, vec!["Foo"]);
}

#[tokio::test]
async fn test_skip_policy_continues_past_bad_items() {
    setup_tracing();
    let store = new_store().await;
    let feed = MockFeedSource::default();
    feed.set_results(vec![
        Ok(item("Foo")),
        Err(ItemParseError::InvalidDate {
            position: 1,
            value: "soon".to_string(),
        }
        .into()),
        Ok(item("Bar")),
    ]);
    let options = ImportOptions {
        on_item_error: ItemErrorPolicy::Skip,
        ..Default::default()
    };

    let report = run(&store, &feed, options).await.unwrap();

    assert_eq!(report.created, 2);
    assert_eq!(report.total_items, 3);
    assert_eq!(article_titles(&store).await, vec!["Bar", "Foo"]);
}

#[tokio::test]
async fn test_skipped_item_keeps_its_stored_article() {
    setup_tracing();
    let store = new_store().await;
    let feed = MockFeedSource::with_items(vec![item("Foo"), item("Bar")]);
    run(&store, &feed, ImportOptions::default()).await.unwrap();

    // Bar is still listed but its date no longer parses.
    feed.set_results(vec![
        Ok(item("Foo")),
        Err(InvalidItem {
            title: Some("Bar".to_string()),
            error: ItemParseError::InvalidDate {
                position: 1,
                value: "soon".to_string(),
            },
        }),
    ]);
    let options = ImportOptions {
        on_item_error: ItemErrorPolicy::Skip,
        ..Default::default()
    };
    let report = run(&store, &feed, options).await.unwrap();

    assert_eq!(
        report.to_string(),
        "0 migration completed out of 2 and 0 existing nodes deleted."
    );
    assert_eq!(article_titles(&store).await, vec!["Bar", "Foo"]);
}

#[tokio::test]
async fn test_skipped_untitled_item_does_not_protect_articles() {
    setup_tracing();
    let store = new_store().await;
    let feed = MockFeedSource::with_items(vec![item("Foo"), item("Bar")]);
    run(&store, &feed, ImportOptions::default()).await.unwrap();

    feed.set_results(vec![
        Ok(item("Foo")),
        Err(ItemParseError::MissingField {
            position: 1,
            field: "title",
        }
        .into()),
    ]);
    let options = ImportOptions {
        on_item_error: ItemErrorPolicy::Skip,
        ..Default::default()
    };
    let report = run(&store, &feed, options).await.unwrap();

    assert_eq!(report.deleted, 1);
    assert_eq!(article_titles(&store).await, vec!["Foo"]);
}

#[tokio::test]
async fn test_fetch_error_aborts_without_touching_store() {
    setup_tracing();
    let store = new_store().await;
    let feed = MockFeedSource::with_items(vec![item("Foo")]);
    run(&store, &feed, ImportOptions::default()).await.unwrap();

    feed.fail_fetch("connection refused");
    let err = run(&store, &feed, ImportOptions::default()).await.unwrap_err();

    assert!(matches!(err, ImportError::Feed(_)));
    assert_eq!(article_titles(&store).await, vec!["Foo"]);
}

#[tokio::test]
async fn test_download_error_is_fatal() {
    setup_tracing();
    let store = new_store().await;
    let feed = MockFeedSource::with_items(vec![item("Foo")]);
    let files = StubFileRetriever::failing(&store);
    let importer = FeedImporter::new(&store, &feed, &files, ImportOptions::default());

    let err = importer.run(FEED_URL).await.unwrap_err();

    assert!(matches!(err, ImportError::Download(_)));
    assert!(article_titles(&store).await.is_empty());
}

#[tokio::test]
async fn test_feed_url_without_path_is_rejected_before_fetch() {
    setup_tracing();
    let store = new_store().await;
    let feed = MockFeedSource::with_items(vec![item("Foo")]);
    let files = StubFileRetriever::new(&store);
    let importer = FeedImporter::new(&store, &feed, &files, ImportOptions::default());

    let err = importer.run("https://example.com/").await.unwrap_err();

    assert!(matches!(err, ImportError::FeedUrl { .. }));
    assert!(feed.fetched_urls.read().unwrap().is_empty());
}

#[tokio::test]
async fn test_importer_downloads_every_item_image() {
    setup_tracing();
    let store = new_store().await;
    let feed = MockFeedSource::with_items(vec![item("Foo"), item("Bar")]);
    let files = StubFileRetriever::new(&store);
    let importer = FeedImporter::new(&store, &feed, &files, ImportOptions::default());

    let summary = importer.run(FEED_URL).await.unwrap();

    assert_eq!(summary.created, 2);
    assert_eq!(
        summary.titles,
        HashSet::from(["Foo".to_string(), "Bar".to_string()])
    );
    assert_eq!(
        files.requested.read().unwrap().as_slice(),
        [
            "https://cdn.example.com/images/foo.jpg",
            "https://cdn.example.com/images/bar.jpg"
        ]
    );
}

#[tokio::test]
async fn test_reconciler_with_empty_set_deletes_nothing() {
    setup_tracing();
    let store = new_store().await;
    let feed = MockFeedSource::with_items(vec![item("Foo")]);
    run(&store, &feed, ImportOptions::default()).await.unwrap();

    let deleted = Reconciler::new(&store)
        .prune_missing(HashSet::new())
        .await
        .unwrap();

    assert_eq!(deleted, 0);
    assert_eq!(article_titles(&store).await, vec!["Foo"]);
}
