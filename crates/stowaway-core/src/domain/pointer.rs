//! ObjectPointer - offload 先オブジェクトの所在（bucket + key）
//!
//! キューに載るのは本文ではなくこのポインタを JSON 化した文字列です。
//! 他言語実装と相互運用するため、形式は 2 要素の配列で固定されています。
//!
//! ```text
//! ["software.amazon.payloadoffloading.PayloadS3Pointer",{"s3BucketName":"b","s3Key":"k"}]
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 配列の先頭要素に入る型タグ
pub const POINTER_TYPE_TAG: &str = "software.amazon.payloadoffloading.PayloadS3Pointer";

/// PointerError はポインタ文字列の encode/decode エラー
#[derive(Debug, Error)]
pub enum PointerError {
    /// JSON としては読めたが、期待する形ではない
    #[error("invalid pointer format: {0}")]
    Format(String),

    /// そもそも JSON として読めない
    #[error("pointer is not valid JSON")]
    Syntax(#[source] serde_json::Error),

    #[error("failed to encode pointer")]
    Encode(#[source] serde_json::Error),
}

/// 配列の 2 要素目（wire 上のフィールド名を保持）
#[derive(Debug, Serialize)]
struct PointerBodyRef<'a> {
    #[serde(rename = "s3BucketName")]
    bucket: &'a str,
    #[serde(rename = "s3Key")]
    key: &'a str,
}

#[derive(Debug, Deserialize)]
struct PointerBody {
    #[serde(rename = "s3BucketName")]
    bucket: String,
    #[serde(rename = "s3Key")]
    key: String,
}

/// ObjectPointer は object store 上の 1 オブジェクトを指す
///
/// 生成後は不変です。`decode(encode(p)) == p` が常に成り立ちます。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectPointer {
    bucket: String,
    key: String,
}

impl ObjectPointer {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// 2 要素配列の JSON 文字列に変換
    pub fn encode(&self) -> Result<String, PointerError> {
        let body = PointerBodyRef {
            bucket: &self.bucket,
            key: &self.key,
        };
        serde_json::to_string(&(POINTER_TYPE_TAG, body)).map_err(PointerError::Encode)
    }

    /// JSON 文字列からポインタを復元
    ///
    /// # エラー
    /// - JSON として読めない → `PointerError::Syntax`
    /// - 2 要素配列でない、または 2 要素目に bucket/key が揃っていない → `PointerError::Format`
    ///
    /// 先頭要素（型タグ）の値は検査しません。
    pub fn decode(serialized: &str) -> Result<Self, PointerError> {
        let value: serde_json::Value =
            serde_json::from_str(serialized).map_err(PointerError::Syntax)?;

        let serde_json::Value::Array(mut items) = value else {
            return Err(PointerError::Format("expected a two-element array".to_string()));
        };
        if items.len() != 2 {
            return Err(PointerError::Format(format!(
                "expected a two-element array, got {} elements",
                items.len()
            )));
        }

        let body = items.pop().unwrap_or_default();
        let body: PointerBody = serde_json::from_value(body)
            .map_err(|e| PointerError::Format(format!("missing bucket or key: {e}")))?;

        Ok(Self {
            bucket: body.bucket,
            key: body.key,
        })
    }
}

impl fmt::Display for ObjectPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}
