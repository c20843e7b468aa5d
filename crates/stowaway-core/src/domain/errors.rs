//! Errors - エラー型と分類
//!
//! 呼び出し側に返すエラーは `OffloadError` ひとつに集約します。
//! `kind()` で機械的に判別でき、`Display` で人間向けのメッセージになります。

use thiserror::Error;

use super::attributes::AttributeViolation;
use super::pointer::PointerError;
use super::routing::Rejection;
use crate::ports::object_transport::ObjectError;
use crate::ports::queue_transport::QueueError;

/// ErrorKind はエラーの分類
///
/// # 分類
/// - Sdk: ポリシー違反（属性サイズ・個数・予約名、hard cap）
/// - Format / Syntax / Encode: ポインタや埋め込み handle の形式エラー
/// - Store / Fetch / Delete: object store 側の失敗（timeout を含む）
/// - Transport: 下位のキュー transport が返したエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Sdk,
    Format,
    Syntax,
    Encode,
    Store,
    Fetch,
    Delete,
    Transport,
}

impl ErrorKind {
    /// 安定したエラーコード文字列
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Sdk => "ExtendedClientSdkError",
            ErrorKind::Format => "PointerFormatError",
            ErrorKind::Syntax => "PointerSyntaxError",
            ErrorKind::Encode => "PointerEncodeError",
            ErrorKind::Store => "PayloadStoreError",
            ErrorKind::Fetch => "PayloadFetchError",
            ErrorKind::Delete => "PayloadDeleteError",
            ErrorKind::Transport => "QueueTransportError",
        }
    }
}

/// OffloadError はクライアントが返すエラー
#[derive(Debug, Error)]
pub enum OffloadError {
    #[error(transparent)]
    InvalidAttributes(#[from] AttributeViolation),

    #[error("message body of {size} bytes exceeds hard cap of {limit} bytes")]
    HardCapExceeded { size: usize, limit: usize },

    #[error(transparent)]
    Pointer(#[from] PointerError),

    #[error("failed to store payload")]
    Store(#[source] ObjectError),

    #[error("failed to fetch payload")]
    Fetch(#[source] ObjectError),

    #[error("failed to delete payload")]
    Delete(#[source] ObjectError),

    #[error(transparent)]
    Queue(#[from] QueueError),
}

impl OffloadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OffloadError::InvalidAttributes(_) | OffloadError::HardCapExceeded { .. } => {
                ErrorKind::Sdk
            }
            OffloadError::Pointer(PointerError::Format(_)) => ErrorKind::Format,
            OffloadError::Pointer(PointerError::Syntax(_)) => ErrorKind::Syntax,
            OffloadError::Pointer(PointerError::Encode(_)) => ErrorKind::Encode,
            OffloadError::Store(_) => ErrorKind::Store,
            OffloadError::Fetch(_) => ErrorKind::Fetch,
            OffloadError::Delete(_) => ErrorKind::Delete,
            OffloadError::Queue(_) => ErrorKind::Transport,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    /// object store 呼び出しが timeout したかどうか
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            OffloadError::Store(ObjectError::Timeout(_))
                | OffloadError::Fetch(ObjectError::Timeout(_))
                | OffloadError::Delete(ObjectError::Timeout(_))
        )
    }
}

impl From<Rejection> for OffloadError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::InvalidAttributes(violation) => OffloadError::InvalidAttributes(violation),
            Rejection::HardCapExceeded { size, limit } => {
                OffloadError::HardCapExceeded { size, limit }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn policy_violations_are_sdk_errors() {
        let err = OffloadError::from(Rejection::HardCapExceeded {
            size: 2000,
            limit: 1000,
        });
        assert_eq!(err.kind(), ErrorKind::Sdk);
        assert_eq!(err.code(), "ExtendedClientSdkError");
        assert!(err.to_string().contains("2000"));

        let err = OffloadError::from(AttributeViolation::TooMany { count: 10, max: 9 });
        assert_eq!(err.kind(), ErrorKind::Sdk);
    }

    #[test]
    fn pointer_errors_keep_their_flavour() {
        let syntax = crate::domain::ObjectPointer::decode("not json").unwrap_err();
        assert_eq!(OffloadError::from(syntax).kind(), ErrorKind::Syntax);

        let format = crate::domain::ObjectPointer::decode("[1]").unwrap_err();
        assert_eq!(OffloadError::from(format).kind(), ErrorKind::Format);
    }

    #[test]
    fn object_failures_report_cause_once() {
        use std::error::Error as _;

        let err = OffloadError::Store(ObjectError::Backend("bucket is gone".to_string()));
        assert_eq!(err.to_string(), "failed to store payload");
        let cause = err.source().map(ToString::to_string);
        assert_eq!(cause.as_deref(), Some("object store error: bucket is gone"));
        assert!(!err.to_string().contains("bucket is gone"));
    }

    #[test]
    fn timeouts_are_detected_per_operation() {
        let err = OffloadError::Fetch(ObjectError::Timeout(Duration::from_secs(60)));
        assert!(err.is_timeout());
        assert_eq!(err.kind(), ErrorKind::Fetch);

        let err = OffloadError::Delete(ObjectError::Backend("boom".to_string()));
        assert!(!err.is_timeout());
    }
}
