//! InMemoryObjectStore - 開発用の object store
//!
//! テストのために、呼び出し回数の記録・失敗注入・遅延注入ができます。
//! 存在しないオブジェクトの delete は S3 と同じく成功扱いです。

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::ports::{ObjectError, ObjectTransport};

#[derive(Default)]
struct Counters {
    puts: AtomicUsize,
    gets: AtomicUsize,
    deletes: AtomicUsize,
}

#[derive(Default)]
struct Failures {
    put: AtomicBool,
    get: AtomicBool,
    delete: AtomicBool,
}

/// InMemoryObjectStore は (bucket, key) → bytes のマップ
#[derive(Clone, Default)]
pub struct InMemoryObjectStore {
    objects: Arc<Mutex<HashMap<(String, String), Vec<u8>>>>,
    counters: Arc<Counters>,
    failures: Arc<Failures>,
    latency: Arc<Mutex<Option<Duration>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// put を失敗させるかどうか（解除するまで有効）
    pub fn fail_puts(&self, fail: bool) {
        self.failures.put.store(fail, Ordering::SeqCst);
    }

    pub fn fail_gets(&self, fail: bool) {
        self.failures.get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.failures.delete.store(fail, Ordering::SeqCst);
    }

    /// 全操作の前に sleep を挟む
    pub async fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock().await = latency;
    }

    pub fn put_count(&self) -> usize {
        self.counters.puts.load(Ordering::SeqCst)
    }

    pub fn get_count(&self) -> usize {
        self.counters.gets.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.counters.deletes.load(Ordering::SeqCst)
    }

    /// テスト用: オブジェクトを直接読む（カウンタは増えない）
    pub async fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        let objects = self.objects.lock().await;
        objects.get(&(bucket.to_string(), key.to_string())).cloned()
    }

    /// テスト用: オブジェクトを直接置く（カウンタは増えない）
    pub async fn insert(&self, bucket: &str, key: &str, body: impl Into<Vec<u8>>) {
        let mut objects = self.objects.lock().await;
        objects.insert((bucket.to_string(), key.to_string()), body.into());
    }

    pub async fn len(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.lock().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl ObjectTransport for InMemoryObjectStore {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), ObjectError> {
        self.counters.puts.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        if self.failures.put.load(Ordering::SeqCst) {
            return Err(ObjectError::Backend(format!("bucket {bucket} does not exist")));
        }

        let mut objects = self.objects.lock().await;
        objects.insert((bucket.to_string(), key.to_string()), body);
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectError> {
        self.counters.gets.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        if self.failures.get.load(Ordering::SeqCst) {
            return Err(ObjectError::Backend("access denied".to_string()));
        }

        let objects = self.objects.lock().await;
        objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| ObjectError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ObjectError> {
        self.counters.deletes.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        if self.failures.delete.load(Ordering::SeqCst) {
            return Err(ObjectError::Backend("access denied".to_string()));
        }

        let mut objects = self.objects.lock().await;
        objects.remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = InMemoryObjectStore::new();
        store.put_object("b", "k", b"hello".to_vec()).await.unwrap();
        assert_eq!(store.get_object("b", "k").await.unwrap(), b"hello");

        store.delete_object("b", "k").await.unwrap();
        assert!(store.is_empty().await);
        assert_eq!(
            (store.put_count(), store.get_count(), store.delete_count()),
            (1, 1, 1)
        );
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let store = InMemoryObjectStore::new();
        let err = store.get_object("b", "missing").await.unwrap_err();
        assert!(matches!(err, ObjectError::NotFound { .. }));

        // delete of a missing object succeeds
        store.delete_object("b", "missing").await.unwrap();
    }

    #[tokio::test]
    async fn test_failure_injection_is_sticky_until_cleared() {
        let store = InMemoryObjectStore::new();
        store.fail_puts(true);
        assert!(store.put_object("b", "k", vec![]).await.is_err());
        assert!(store.put_object("b", "k", vec![]).await.is_err());

        store.fail_puts(false);
        assert!(store.put_object("b", "k", vec![]).await.is_ok());
    }
}
