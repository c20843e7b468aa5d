//! stowaway-core
//!
//! Queue client decorator that offloads oversized message bodies to an object store.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（pointer, handle, attributes, routing, message, errors, events）
//! - **ports**: 抽象化レイヤー（QueueTransport, ObjectTransport, KeyGenerator, Clock, EventSink）
//! - **app**: アプリケーションロジック（config, builder, payload_store, client）
//! - **impls**: 実装（InMemoryQueue, InMemoryObjectStore など開発用）

pub mod domain;
pub mod ports;
pub mod app;
pub mod impls;

pub use app::{ClientBuilder, ExtendedQueueClient, OffloadConfig, PayloadStore};
pub use domain::{ErrorKind, OffloadError};
