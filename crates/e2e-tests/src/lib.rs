//! End-to-end test infrastructure for pubcat.
//!
//! Provides a shared TestHarness wired to a real RocksDB store, a real
//! Tantivy index and the HTTP router, plus helpers for seeding records.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use pubcat_search::{SearchIndexConfig, TantivyBackend};
use pubcat_service::{run_server_with_shutdown, AppState, CatalogService};
use pubcat_storage::Storage;
use pubcat_types::{BulkResponse, CatalogError, NewPublication, Publication, SearchBackend};

/// Name of the index every harness writes to.
pub const TEST_INDEX_NAME: &str = "publications2";

/// Shared test harness for E2E tests.
///
/// Owns the temp directory holding the record store, the search index
/// root and a static UI directory.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    pub storage: Arc<Storage>,
    pub search: Arc<TantivyBackend>,
    pub search_index_path: PathBuf,
    pub static_dir: PathBuf,
}

impl TestHarness {
    /// Create a harness with an empty store, no search index yet and a
    /// minimal static directory.
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let storage = Arc::new(
            Storage::open(&temp_dir.path().join("db")).expect("Failed to open test storage"),
        );

        let search_index_path = temp_dir.path().join("search-index");
        std::fs::create_dir_all(&search_index_path).expect("Failed to create search index dir");
        let search = Arc::new(TantivyBackend::new(
            SearchIndexConfig::new(&search_index_path).with_index_name(TEST_INDEX_NAME),
        ));

        let static_dir = temp_dir.path().join("public");
        std::fs::create_dir_all(&static_dir).expect("Failed to create static dir");
        std::fs::write(
            static_dir.join("index.html"),
            "<!doctype html><title>Publications</title><script src=\"/app.js\"></script>",
        )
        .expect("Failed to write index.html");
        std::fs::write(static_dir.join("styles.css"), "body { margin: 0; }")
            .expect("Failed to write styles.css");
        std::fs::write(static_dir.join("app.js"), "console.log('v1');")
            .expect("Failed to write app.js");

        Self {
            _temp_dir: temp_dir,
            storage,
            search,
            search_index_path,
            static_dir,
        }
    }

    /// Catalog service over the harness adapters.
    pub fn catalog(&self, search_limit: usize) -> CatalogService {
        CatalogService::new(self.storage.clone(), self.search.clone(), search_limit)
    }

    /// Serve the harness catalog on an ephemeral port.
    pub async fn serve(&self) -> TestServer {
        self.serve_from(&self.static_dir).await
    }

    /// Serve the harness catalog with a different static directory.
    pub async fn serve_from(&self, static_dir: &Path) -> TestServer {
        let state = AppState::new(self.catalog(1000), static_dir);
        TestServer::start(state).await
    }

    /// Store publications in the record store only.
    pub fn store(&self, publications: &[Publication]) {
        for publication in publications {
            self.storage
                .put_publication(publication)
                .expect("Failed to store publication");
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// A running HTTP server bound to 127.0.0.1.
pub struct TestServer {
    pub base_url: String,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    async fn start(state: AppState) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let base_url = format!(
            "http://{}",
            listener.local_addr().expect("Listener has no address")
        );

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            run_server_with_shutdown(listener, state, async {
                rx.await.ok();
            })
            .await
        });

        Self {
            base_url,
            shutdown: tx,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Trigger graceful shutdown and wait for the server task.
    pub async fn stop(self) {
        self.shutdown.send(()).ok();
        let joined = tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("Server did not shut down in time")
            .expect("Server task panicked");
        joined.expect("Server returned an error");
    }
}

/// Create N publications with ULID ids 1ms apart, in id order.
pub fn create_test_publications(count: usize, base_title: &str) -> Vec<Publication> {
    let base_ts: i64 = 1_706_540_400_000; // 2024-01-29 approx
    (0..count)
        .map(|i| {
            let ts_ms = base_ts + i as i64;
            let id = ulid::Ulid::from_parts(ts_ms as u64, i as u128).to_string();
            let date = Utc.timestamp_millis_opt(ts_ms).unwrap();
            NewPublication::titled(format!("{} {}", base_title, i))
                .with_text(format!("Body of {} number {}", base_title, i))
                .with_author("John Doe")
                .with_rank((i % 5) as f64)
                .into_publication_at(id, date)
                .expect("Test publication is valid")
        })
        .collect()
}

/// Search backend wrapper that counts bulk requests.
pub struct CountingSearch {
    inner: Arc<TantivyBackend>,
    bulk_calls: AtomicUsize,
}

impl CountingSearch {
    pub fn new(inner: Arc<TantivyBackend>) -> Self {
        Self {
            inner,
            bulk_calls: AtomicUsize::new(0),
        }
    }

    pub fn bulk_calls(&self) -> usize {
        self.bulk_calls.load(Ordering::SeqCst)
    }
}

impl SearchBackend for CountingSearch {
    fn index_name(&self) -> &str {
        self.inner.index_name()
    }

    fn exists(&self) -> Result<bool, CatalogError> {
        self.inner.exists()
    }

    fn create(&self) -> Result<(), CatalogError> {
        self.inner.create()
    }

    fn index(&self, publication: &Publication) -> Result<(), CatalogError> {
        self.inner.index(publication)
    }

    fn bulk(&self, publications: &[Publication]) -> Result<BulkResponse, CatalogError> {
        self.bulk_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.bulk(publications)
    }

    fn refresh(&self) -> Result<(), CatalogError> {
        self.inner.refresh()
    }

    fn count(&self) -> Result<u64, CatalogError> {
        self.inner.count()
    }

    fn search(&self, query: &str, limit: usize) -> Result<Vec<Publication>, CatalogError> {
        self.inner.search(query, limit)
    }
}
