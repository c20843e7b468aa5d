//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（キュー、object storage など）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - キューは本文かポインタのどちらかだけを運ぶ
//! - object storage は offload された本文の保存先
//! - どちらの transport もリトライはしない（呼び出し側の責務）

pub mod queue_transport;
pub mod object_transport;
pub mod clock;
pub mod key_generator;
pub mod event_sink;

// 主要な trait を再エクスポート
pub use self::queue_transport::{QueueError, QueueTransport};
pub use self::object_transport::{ObjectError, ObjectTransport};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::key_generator::{KeyGenerator, UlidKeyGenerator};
pub use self::event_sink::EventSink;
