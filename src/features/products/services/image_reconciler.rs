use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use futures::future::join_all;

use crate::features::products::dtos::ImageCleanupDto;
use crate::modules::storage::MediaStore;

/// Image ids present in `existing` but not in `incoming`.
///
/// Order and duplicates in either list do not matter.
pub fn reconcile_images<E, I>(existing: E, incoming: I) -> BTreeSet<String>
where
    E: IntoIterator,
    E::Item: AsRef<str>,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let incoming: HashSet<String> = incoming
        .into_iter()
        .map(|id| id.as_ref().to_string())
        .collect();

    existing
        .into_iter()
        .map(|id| id.as_ref().to_string())
        .filter(|id| !incoming.contains(id))
        .collect()
}

/// What happened to each image that was due for deletion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: Vec<String>,
    pub failed: Vec<String>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl From<CleanupReport> for ImageCleanupDto {
    fn from(report: CleanupReport) -> Self {
        Self {
            removed: report.removed,
            failed: report.failed,
        }
    }
}

/// Deletes stale images from the media store
pub struct ImageReconciler {
    store: Arc<dyn MediaStore>,
}

impl ImageReconciler {
    pub fn new(store: Arc<dyn MediaStore>) -> Self {
        Self { store }
    }

    /// Delete every id concurrently. A failed deletion is logged and reported,
    /// the others still run.
    pub async fn purge(&self, ids: BTreeSet<String>) -> CleanupReport {
        if ids.is_empty() {
            return CleanupReport::default();
        }

        let results = join_all(ids.into_iter().map(|id| async move {
            let result = self.store.delete(&id).await;
            (id, result)
        }))
        .await;

        let mut report = CleanupReport::default();
        for (id, result) in results {
            match result {
                Ok(()) => report.removed.push(id),
                Err(e) => {
                    tracing::warn!("Failed to delete image {} from media store: {}", id, e);
                    report.failed.push(id);
                }
            }
        }

        tracing::debug!(
            removed = report.removed.len(),
            failed = report.failed.len(),
            "Image cleanup finished"
        );
        report
    }
}
