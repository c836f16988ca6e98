use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Get-by-key contract of the object-storage backend.
///
/// `Ok(None)` means the object does not exist; `Err` means the backend could
/// not be reached or answered with a non-retriable failure. The engine never
/// writes through this trait.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;
}

/// Object storage exposed over plain HTTP GET (`<base_url>/<key>`).
pub struct HttpStorage {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Storage for HttpStorage {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let url = format!("{}/{}", self.base_url, key);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("request to {} failed: {}", url, e))?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            anyhow::bail!("GET {} returned status {}", url, resp.status());
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| anyhow::anyhow!("reading body of {} failed: {}", url, e))?;
        Ok(Some(bytes.to_vec()))
    }
}

/// Local-directory backend: keys resolve to paths under `root`. Used by the
/// CLI against an offline build output and by fixtures in tests.
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Storage for FsStorage {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let path = self.root.join(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(anyhow::anyhow!("read {} failed: {}", path.display(), e)),
        }
    }
}

/// In-memory backend with per-key get counters, so tests can assert how many
/// times the engine actually went to storage. Keys listed in `fail_keys`
/// return an error, simulating a transient backend outage for that object.
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_keys: Mutex<HashSet<String>>,
    gets: Mutex<HashMap<String, usize>>,
    total_gets: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: impl Into<String>, bytes: Vec<u8>) {
        self.objects.lock().insert(key.into(), bytes);
    }

    pub fn put_json(&self, key: impl Into<String>, value: &serde_json::Value) {
        self.put(key, serde_json::to_vec(value).expect("serialize fixture"));
    }

    /// Make every future `get` of `key` fail until cleared.
    pub fn fail_key(&self, key: impl Into<String>) {
        self.fail_keys.lock().insert(key.into());
    }

    pub fn get_count(&self, key: &str) -> usize {
        self.gets.lock().get(key).copied().unwrap_or(0)
    }

    pub fn total_get_count(&self) -> usize {
        self.total_gets.load(Ordering::SeqCst)
    }

    /// Number of distinct keys ever requested.
    pub fn distinct_keys_requested(&self) -> usize {
        self.gets.lock().len()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        *self.gets.lock().entry(key.to_string()).or_insert(0) += 1;
        self.total_gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_keys.lock().contains(key) {
            anyhow::bail!("simulated backend outage for {}", key);
        }
        Ok(self.objects.lock().get(key).cloned())
    }
}
