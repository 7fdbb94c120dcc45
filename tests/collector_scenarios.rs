use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use devfp::{generate_with_algorithm, Collector, CollectorConfig, DigestAlgorithm, Probed};
use signals::{
    async_trait, DigestedSignal, FileSaltStore, FixedSignal, InMemorySaltStore, ProbeError,
    SaltStore, SignalSet, SignalSource, StorageError, StorageSalt,
};
use tempfile::TempDir;

#[tokio::test]
async fn file_salt_survives_new_collectors() {
    let dir = TempDir::new().unwrap();
    let cfg = CollectorConfig {
        salt_path: Some(dir.path().join("salt.json")),
        ..Default::default()
    };

    let first = Collector::headless(&cfg).collect().await;
    let second = Collector::headless(&cfg).collect().await;
    let salt = first.storage_salt.value().cloned().expect("salt written");
    assert_eq!(salt.len(), 32);
    assert!(salt.bytes().all(|b| b.is_ascii_hexdigit()));
    assert_eq!(first.storage_salt, second.storage_salt);
}

#[tokio::test]
async fn separate_scopes_get_separate_salts() {
    let a = Collector::headless(&CollectorConfig::default()).collect().await;
    let b = Collector::headless(&CollectorConfig::default()).collect().await;
    assert!(!a.storage_salt.is_sentinel());
    assert_ne!(a.storage_salt, b.storage_salt);
}

#[tokio::test]
async fn corrupt_salt_file_is_replaced() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("salt.json");
    std::fs::write(&path, "not json at all").unwrap();

    let store: Arc<dyn SaltStore> = Arc::new(FileSaltStore::new(&path));
    let salt = StorageSalt::new(store.clone()).probe().await.expect("salt");
    assert_eq!(store.get("fp_salt").unwrap(), Some(salt));
}

struct UnreadableStore;

impl SaltStore for UnreadableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("storage disabled".into()))
    }

    fn put(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("storage disabled".into()))
    }
}

#[tokio::test]
async fn unavailable_storage_yields_sentinel_not_failure() {
    let set = SignalSet::headless_with_store(&CollectorConfig::default(), Arc::new(UnreadableStore));
    let record = Collector::new(set).collect().await;
    assert_eq!(record.storage_salt, Probed::Unavailable);
}

#[tokio::test]
async fn headless_generation_reports_unsupported_renders() {
    let collector = Collector::headless(&CollectorConfig::default());
    let fp = generate_with_algorithm(&collector, DigestAlgorithm::Sha256).await;
    assert_eq!(fp.components.audio_hash, Probed::Unsupported);
    assert_eq!(fp.components.drm_hash, Probed::Unsupported);
    assert_eq!(fp.components.canvas_hash, Probed::Unsupported);
    assert_eq!(fp.identifier.len(), 64);

    let text = serde_json::to_string(&fp.components).unwrap();
    assert!(text.contains("\"audioHash\":\"unsupported\""));
}

struct RawRender {
    bytes: Vec<u8>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl SignalSource for RawRender {
    type Output = Vec<u8>;

    fn name(&self) -> &'static str {
        "canvas"
    }

    async fn probe(&self) -> Result<Vec<u8>, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.bytes.clone())
    }
}

#[tokio::test]
async fn digested_render_feeds_the_record() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut set = SignalSet::headless(&CollectorConfig::default());
    set.canvas = Arc::new(DigestedSignal::new(RawRender {
        bytes: b"abc".to_vec(),
        calls: calls.clone(),
    }));
    set.audio = Arc::new(DigestedSignal::new(RawRender {
        bytes: Vec::new(),
        calls: calls.clone(),
    }));
    set.drm = Arc::new(FixedSignal::unavailable("drm"));

    let record = Collector::new(set).collect().await;
    assert_eq!(
        record.canvas_hash,
        Probed::Value("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad".into())
    );
    assert_eq!(record.audio_hash, Probed::Unavailable);
    assert_eq!(record.drm_hash, Probed::Unavailable);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn concurrent_first_writes_leave_one_stored_salt() {
    let store: Arc<dyn SaltStore> = Arc::new(InMemorySaltStore::new());
    let a = StorageSalt::new(store.clone());
    let b = StorageSalt::new(store.clone());
    let (sa, sb) = tokio::join!(a.probe(), b.probe());
    let stored = store.get("fp_salt").unwrap().expect("stored salt");
    assert!(sa.is_ok() && sb.is_ok());
    assert!(sa.unwrap() == stored || sb.unwrap() == stored);
}
