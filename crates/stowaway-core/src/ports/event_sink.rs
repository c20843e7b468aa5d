//! EventSink port - イベント記録の抽象化
//!
//! クライアントは構築時に受け取った EventSink にだけイベントを送ります。
//! グローバルな logger や context からの取り出しは行いません。
//!
//! # 実装
//! - NoopEventSink: 何もしない（デフォルト）
//! - RecordingEventSink: メモリに溜める（テスト用）

use crate::domain::events::OffloadEvent;

/// EventSink はオフロードイベントを受け取る
///
/// 呼び出しはクライアントの処理経路上で同期的に行われるため、
/// 実装は重い処理をしないでください。
pub trait EventSink: Send + Sync {
    fn emit(&self, event: OffloadEvent);
}
