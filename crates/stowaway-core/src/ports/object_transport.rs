//! ObjectTransport port - Blob ストレージ（S3 など）
//!
//! offload された本文はここに保存されます。
//! timeout は呼び出し側（`PayloadStore`）が付けるので、実装側は気にしなくて構いません。

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// ObjectError は object store 操作のエラー
#[derive(Debug, Error)]
pub enum ObjectError {
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("object store call timed out after {0:?}")]
    Timeout(Duration),

    #[error("object store error: {0}")]
    Backend(String),
}

/// ObjectTransport は bucket + key 単位でバイト列を読み書きする
///
/// 存在しないオブジェクトの delete をどう扱うかは実装に任せます。
#[async_trait]
pub trait ObjectTransport: Send + Sync {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), ObjectError>;

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectError>;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ObjectError>;
}
