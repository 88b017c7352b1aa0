//! Time-boxed in-memory copy of the restaurant collection.
//!
//! Reads share one `Arc` snapshot. A stale or empty cache is reloaded under
//! the write lock, so concurrent misses trigger a single load.

use std::sync::Arc;
use std::time::{Duration, Instant};

use pronto_core::RestaurantRecord;
use pronto_listing::NoGeocoder;
use pronto_sources::{DataSource, NominatimGeocoder};
use tokio::sync::RwLock;

#[derive(Debug)]
struct Snapshot {
    loaded_at: Instant,
    records: Arc<Vec<RestaurantRecord>>,
}

#[derive(Debug, Clone)]
pub struct ListingCache {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    source: DataSource,
    geocoder: Option<NominatimGeocoder>,
    ttl: Duration,
    snapshot: RwLock<Option<Snapshot>>,
}

impl ListingCache {
    /// With no geocoder, coordinates come from maps links and the area table only.
    #[must_use]
    pub fn new(source: DataSource, geocoder: Option<NominatimGeocoder>, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                geocoder,
                ttl,
                snapshot: RwLock::new(None),
            }),
        }
    }

    /// Returns the cached collection, reloading it when older than the TTL.
    pub async fn records(&self) -> Arc<Vec<RestaurantRecord>> {
        {
            let guard = self.inner.snapshot.read().await;
            if let Some(snapshot) = guard.as_ref().filter(|s| self.is_fresh(s)) {
                return Arc::clone(&snapshot.records);
            }
        }

        let mut guard = self.inner.snapshot.write().await;
        if let Some(snapshot) = guard.as_ref().filter(|s| self.is_fresh(s)) {
            return Arc::clone(&snapshot.records);
        }
        let records = self.load().await;
        *guard = Some(Snapshot {
            loaded_at: Instant::now(),
            records: Arc::clone(&records),
        });
        records
    }

    /// Drops the cached copy and loads a fresh one. Returns the record count.
    pub async fn refresh(&self) -> usize {
        let mut guard = self.inner.snapshot.write().await;
        let records = self.load().await;
        let count = records.len();
        *guard = Some(Snapshot {
            loaded_at: Instant::now(),
            records,
        });
        tracing::info!(restaurants = count, "listing cache refreshed");
        count
    }

    fn is_fresh(&self, snapshot: &Snapshot) -> bool {
        snapshot.loaded_at.elapsed() < self.inner.ttl
    }

    async fn load(&self) -> Arc<Vec<RestaurantRecord>> {
        let records = match &self.inner.geocoder {
            Some(geocoder) => self.inner.source.load_records(geocoder).await,
            None => self.inner.source.load_records(&NoGeocoder).await,
        };
        Arc::new(records)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[tokio::test]
    async fn fresh_snapshot_is_reused_until_refresh() {
        let file = csv_file("name\nFirst\n");
        let cache = ListingCache::new(
            DataSource::Csv(file.path().to_path_buf()),
            None,
            Duration::from_secs(3600),
        );

        let first = cache.records().await;
        assert_eq!(first.len(), 1);

        std::fs::write(file.path(), "name\nFirst\nSecond\n").expect("rewrite");
        let cached = cache.records().await;
        assert!(Arc::ptr_eq(&first, &cached));

        assert_eq!(cache.refresh().await, 2);
        assert_eq!(cache.records().await.len(), 2);
    }

    #[tokio::test]
    async fn zero_ttl_reloads_every_time() {
        let file = csv_file("name\nOnly\n");
        let cache = ListingCache::new(
            DataSource::Csv(file.path().to_path_buf()),
            None,
            Duration::ZERO,
        );
        let first = cache.records().await;
        let second = cache.records().await;
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn unreadable_source_caches_empty_collection() {
        let cache = ListingCache::new(
            DataSource::Csv("/definitely/not/here.csv".into()),
            None,
            Duration::from_secs(60),
        );
        assert!(cache.records().await.is_empty());
    }
}
