//! PayloadStore - offload された本文の保存・取得・削除
//!
//! # 責務
//! - object key の払い出し（KeyGenerator）
//! - ポインタ文字列との相互変換（ObjectPointer）
//! - object store 呼び出しごとの timeout
//!
//! リトライはしません。失敗はそのまま呼び出し側に返します。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::errors::OffloadError;
use crate::domain::pointer::ObjectPointer;
use crate::ports::{KeyGenerator, ObjectError, ObjectTransport};

/// object store 呼び出し 1 回あたりの上限時間
pub const OBJECT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// PayloadStore は 1 つの bucket に本文を出し入れする
#[derive(Clone)]
pub struct PayloadStore {
    objects: Arc<dyn ObjectTransport>,
    key_generator: Arc<dyn KeyGenerator>,
    bucket: String,
    timeout: Duration,
}

impl PayloadStore {
    pub fn new(
        objects: Arc<dyn ObjectTransport>,
        key_generator: Arc<dyn KeyGenerator>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            objects,
            key_generator,
            bucket: bucket.into(),
            timeout: OBJECT_CALL_TIMEOUT,
        }
    }

    /// timeout を差し替える（主にテスト用）
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 本文を新しい key で保存し、ポインタ文字列を返す
    pub async fn store(&self, payload: &str) -> Result<String, OffloadError> {
        let pointer = self.store_pointer(payload).await?;
        Ok(pointer.encode()?)
    }

    /// 本文を新しい key で保存し、ポインタを返す
    pub async fn store_pointer(&self, payload: &str) -> Result<ObjectPointer, OffloadError> {
        let pointer = ObjectPointer::new(self.bucket.as_str(), self.key_generator.generate_key());
        let body = payload.as_bytes().to_vec();

        self.bounded(
            self.objects
                .put_object(pointer.bucket(), pointer.key(), body),
        )
        .await
        .map_err(OffloadError::Store)?;

        tracing::debug!(bucket = pointer.bucket(), key = pointer.key(), size = payload.len(), "payload stored");
        Ok(pointer)
    }

    /// ポインタ文字列が指す本文をテキストとして取得
    pub async fn fetch(&self, serialized_pointer: &str) -> Result<String, OffloadError> {
        let pointer = ObjectPointer::decode(serialized_pointer)?;
        self.fetch_pointer(&pointer).await
    }

    pub async fn fetch_pointer(&self, pointer: &ObjectPointer) -> Result<String, OffloadError> {
        let bytes = self
            .bounded(self.objects.get_object(pointer.bucket(), pointer.key()))
            .await
            .map_err(OffloadError::Fetch)?;

        String::from_utf8(bytes).map_err(|e| {
            OffloadError::Fetch(ObjectError::Backend(format!(
                "payload {pointer} is not valid UTF-8: {e}"
            )))
        })
    }

    /// ポインタ文字列が指すオブジェクトを削除
    pub async fn delete(&self, serialized_pointer: &str) -> Result<(), OffloadError> {
        let pointer = ObjectPointer::decode(serialized_pointer)?;
        self.delete_pointer(&pointer).await
    }

    pub async fn delete_pointer(&self, pointer: &ObjectPointer) -> Result<(), OffloadError> {
        self.bounded(self.objects.delete_object(pointer.bucket(), pointer.key()))
            .await
            .map_err(OffloadError::Delete)?;

        tracing::debug!(bucket = pointer.bucket(), key = pointer.key(), "payload deleted");
        Ok(())
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, ObjectError>
    where
        F: Future<Output = Result<T, ObjectError>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| ObjectError::Timeout(self.timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ErrorKind;
    use crate::impls::InMemoryObjectStore;
    use crate::ports::{FixedClock, UlidKeyGenerator};
    use chrono::{TimeZone, Utc};

    const BUCKET: &str = "test-bucket";

    fn payload_store(objects: &InMemoryObjectStore) -> PayloadStore {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        PayloadStore::new(
            Arc::new(objects.clone()),
            Arc::new(UlidKeyGenerator::new(clock)),
            BUCKET,
        )
    }

    #[tokio::test]
    async fn test_store_writes_object_and_returns_pointer() {
        let objects = InMemoryObjectStore::new();
        let store = payload_store(&objects);

        let serialized = store.store("test").await.unwrap();
        let pointer = ObjectPointer::decode(&serialized).unwrap();

        assert_eq!(pointer.bucket(), BUCKET);
        assert_eq!(objects.object(BUCKET, pointer.key()).await, Some(b"test".to_vec()));
        assert_eq!(objects.put_count(), 1);
    }

    #[tokio::test]
    async fn test_each_store_uses_a_fresh_key() {
        let objects = InMemoryObjectStore::new();
        let store = payload_store(&objects);

        let first = store.store_pointer("a").await.unwrap();
        let second = store.store_pointer("a").await.unwrap();
        assert_ne!(first.key(), second.key());
        assert_eq!(objects.len().await, 2);
    }

    #[tokio::test]
    async fn test_store_failure_is_store_error() {
        let objects = InMemoryObjectStore::new();
        objects.fail_puts(true);
        let err = payload_store(&objects).store("test").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Store);
    }

    #[tokio::test]
    async fn test_fetch_reads_stored_text() {
        let objects = InMemoryObjectStore::new();
        let store = payload_store(&objects);

        let serialized = store.store("héllo wörld").await.unwrap();
        assert_eq!(store.fetch(&serialized).await.unwrap(), "héllo wörld");
    }

    #[tokio::test]
    async fn test_fetch_errors() {
        let objects = InMemoryObjectStore::new();
        let store = payload_store(&objects);

        let err = store.fetch("not a pointer").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);

        let err = store.fetch(r#"["tag"]"#).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);

        let missing = ObjectPointer::new(BUCKET, "missing").encode().unwrap();
        let err = store.fetch(&missing).await.unwrap_err();
        assert!(matches!(err, OffloadError::Fetch(ObjectError::NotFound { .. })));
        assert_eq!(objects.get_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_rejects_binary_payload() {
        let objects = InMemoryObjectStore::new();
        objects.insert(BUCKET, "bin", vec![0xff, 0xfe]).await;
        let err = payload_store(&objects)
            .fetch_pointer(&ObjectPointer::new(BUCKET, "bin"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fetch);
    }

    #[tokio::test]
    async fn test_delete_removes_object() {
        let objects = InMemoryObjectStore::new();
        let store = payload_store(&objects);

        let serialized = store.store("test").await.unwrap();
        store.delete(&serialized).await.unwrap();
        assert!(objects.is_empty().await);

        objects.fail_deletes(true);
        let err = store.delete(&serialized).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Delete);

        let err = store.delete("{}").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[tokio::test]
    async fn test_slow_object_store_times_out() {
        let objects = InMemoryObjectStore::new();
        objects.set_latency(Some(Duration::from_millis(500))).await;
        let store = payload_store(&objects).with_timeout(Duration::from_millis(50));

        let err = store.store("test").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Store);
        assert!(err.is_timeout());

        let err = store
            .fetch_pointer(&ObjectPointer::new(BUCKET, "k"))
            .await
            .unwrap_err();
        assert!(matches!(err, OffloadError::Fetch(ObjectError::Timeout(_))));

        let err = store
            .delete_pointer(&ObjectPointer::new(BUCKET, "k"))
            .await
            .unwrap_err();
        assert!(matches!(err, OffloadError::Delete(ObjectError::Timeout(_))));
    }
}
