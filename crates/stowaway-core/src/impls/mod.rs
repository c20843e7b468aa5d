//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryQueue**: 開発用のキュー transport
//! - **InMemoryObjectStore**: 開発用の object store（失敗注入・遅延注入つき）
//! - **NoopEventSink / RecordingEventSink**: EventSink の実装
//!
//! # 本番用実装
//! 本番用の transport（SQS, S3 など）はこのクレートには含めません。
//! SDK クライアントに ports の trait を実装して渡してください。

pub mod inmem_queue;
pub mod inmem_objects;
pub mod event_sinks;

// 主要な型を再エクスポート
pub use self::inmem_queue::InMemoryQueue;
pub use self::inmem_objects::InMemoryObjectStore;
pub use self::event_sinks::{NoopEventSink, RecordingEventSink};
