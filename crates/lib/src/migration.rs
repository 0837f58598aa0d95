use crate::errors::ImportError;
use crate::importer::FeedImporter;
use crate::reconcile::Reconciler;
use crate::report::MigrationReport;
use tracing::{error, info};

/// Runs a full migration: import the feed, then prune articles that dropped
/// out of it.
pub async fn migrate(
    importer: &FeedImporter<'_>,
    reconciler: &Reconciler<'_>,
    feed_url: &str,
) -> Result<MigrationReport, ImportError> {
    let summary = importer.run(feed_url).await?;

    let deleted = reconciler
        .prune_missing(summary.titles)
        .await
        .map_err(|e| {
            error!("Reconciliation failed: {e}");
            ImportError::from(e)
        })?;

    let report = MigrationReport {
        created: summary.created,
        total_items: summary.total_items,
        deleted,
    };
    info!("{report}");
    Ok(report)
}
