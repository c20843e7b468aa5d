//! App - クライアント本体と、その構築・設定
//!
//! - config: OffloadConfig（閾値やフラグ）
//! - builder: ClientBuilder（ワイヤリングと起動時検証）
//! - payload_store: PayloadStore（本文の保存・取得・削除）
//! - client: ExtendedQueueClient（send / receive / delete の decorator）

pub mod builder;
pub mod client;
pub mod config;
pub mod payload_store;

pub use self::builder::{BuildError, ClientBuilder};
pub use self::client::ExtendedQueueClient;
pub use self::config::OffloadConfig;
pub use self::payload_store::PayloadStore;
