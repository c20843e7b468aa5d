//! ClientBuilder - クライアントの構築とワイヤリング
//!
//! # Fail-fast 設計
//! - offload が有効なのに object transport や bucket が無ければ build() で失敗
//! - 起動後に「送ってみたら壊れていた」を避ける

use std::sync::Arc;
use std::time::Duration;

use super::client::ExtendedQueueClient;
use super::config::OffloadConfig;
use super::payload_store::OBJECT_CALL_TIMEOUT;
use crate::impls::NoopEventSink;
use crate::ports::{EventSink, KeyGenerator, ObjectTransport, QueueTransport, SystemClock, UlidKeyGenerator};

/// ClientBuilder は ExtendedQueueClient を構築
///
/// # 使用例
/// ```ignore
/// let mut config = OffloadConfig::new();
/// config.with_payload_support_enabled("my-bucket");
///
/// let client = ClientBuilder::new()
///     .transport(Arc::new(sqs))
///     .object_transport(Arc::new(s3))
///     .config(config)
///     .build()?;
/// ```
pub struct ClientBuilder {
    transport: Option<Arc<dyn QueueTransport>>,
    objects: Option<Arc<dyn ObjectTransport>>,
    key_generator: Option<Arc<dyn KeyGenerator>>,
    events: Option<Arc<dyn EventSink>>,
    config: OffloadConfig,
    object_call_timeout: Duration,
}

/// BuildError はクライアント構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("a queue transport is required")]
    MissingQueueTransport,

    #[error("payload support is enabled but no object transport was given")]
    MissingObjectTransport,

    #[error("payload support is enabled but the bucket name is empty")]
    EmptyBucket,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            transport: None,
            objects: None,
            key_generator: None,
            events: None,
            config: OffloadConfig::default(),
            object_call_timeout: OBJECT_CALL_TIMEOUT,
        }
    }

    pub fn transport(mut self, transport: Arc<dyn QueueTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn object_transport(mut self, objects: Arc<dyn ObjectTransport>) -> Self {
        self.objects = Some(objects);
        self
    }

    /// 省略時は `UlidKeyGenerator<SystemClock>`
    pub fn key_generator(mut self, key_generator: Arc<dyn KeyGenerator>) -> Self {
        self.key_generator = Some(key_generator);
        self
    }

    /// 省略時は `NoopEventSink`
    pub fn event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn config(mut self, config: OffloadConfig) -> Self {
        self.config = config;
        self
    }

    pub fn object_call_timeout(mut self, timeout: Duration) -> Self {
        self.object_call_timeout = timeout;
        self
    }

    /// 検証してクライアントを生成
    ///
    /// # 検証
    /// - queue transport は必須
    /// - offload が有効なら object transport と空でない bucket が必須
    pub fn build(self) -> Result<ExtendedQueueClient, BuildError> {
        let transport = self.transport.ok_or(BuildError::MissingQueueTransport)?;

        if self.config.is_payload_support_enabled() {
            if self.objects.is_none() {
                return Err(BuildError::MissingObjectTransport);
            }
            if self.config.bucket().is_empty() {
                return Err(BuildError::EmptyBucket);
            }
        }

        let key_generator = self
            .key_generator
            .unwrap_or_else(|| Arc::new(UlidKeyGenerator::new(SystemClock)));
        let events = self.events.unwrap_or_else(|| Arc::new(NoopEventSink));

        Ok(ExtendedQueueClient::from_parts(
            transport,
            self.objects,
            key_generator,
            events,
            self.config,
            self.object_call_timeout,
        ))
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
