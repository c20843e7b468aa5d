//! Events - offload 処理で発生したイベント
//!
//! `EventSink` に渡され、メトリクスや監査ログの材料になります。
//! ログ出力そのものは `tracing` で行い、こちらは構造化された観測用です。

use super::pointer::ObjectPointer;

/// イベントが発生した操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Send,
    Receive,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Send => "send",
            Operation::Receive => "receive",
            Operation::Delete => "delete",
        }
    }
}

/// OffloadEvent はクライアントで発生したイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OffloadEvent {
    /// 本文を object store に保存した
    PayloadStored {
        pointer: ObjectPointer,
        body_size: usize,
    },

    /// 受信時に本文を object store から取得した
    PayloadFetched {
        pointer: ObjectPointer,
        body_size: usize,
    },

    /// delete 時にオブジェクトを削除した
    PayloadDeleted { pointer: ObjectPointer },

    /// offload せずにそのまま transport に渡した
    PassedThrough { operation: Operation },

    /// 送信を拒否した（transport は呼ばれていない）
    Rejected { reason: String },
}
