//! ExtendedQueueClient - 大きな本文を object store に逃がすキュークライアント
//!
//! 下位の `QueueTransport` を保持し、send / receive / delete の 3 操作だけを横取りします。
//! それ以外の操作は `transport()` で取り出した transport を直接使ってください。
//!
//! # 処理の流れ
//! - send: 送信先を決め（`decide`）、必要なら本文を保存してポインタに差し替える
//! - receive: 予約属性が付いたメッセージの本文を取り戻し、handle にポインタを埋め込む
//! - delete: 埋め込み handle を分解し、必要ならオブジェクトを消してからキューから消す
//!
//! offload が無効、または必須の入力（本文・handle）が無い場合は何もせず transport に渡します。

use std::sync::Arc;
use std::time::Duration;

use super::config::OffloadConfig;
use super::payload_store::PayloadStore;
use crate::domain::attributes::{
    AttributeValue, LEGACY_RESERVED_ATTRIBUTE_NAME, MessageAttributes, RESERVED_ATTRIBUTE_NAME,
    attributes_wire_size, reserved_attribute_if_present,
};
use crate::domain::errors::OffloadError;
use crate::domain::events::{OffloadEvent, Operation};
use crate::domain::handle::{embed_in_handle, is_modified_handle, split_handle};
use crate::domain::message::{
    DeleteMessageRequest, ReceiveMessageOutput, ReceiveMessageRequest, ReceivedMessage,
    SendMessageOutput, SendMessageRequest,
};
use crate::domain::pointer::ObjectPointer;
use crate::domain::routing::{Destination, decide};
use crate::ports::{EventSink, KeyGenerator, ObjectTransport, QueueTransport};

/// ExtendedQueueClient は QueueTransport の decorator
///
/// # Thread Safety
/// - 呼び出しをまたぐ可変状態を持たないので、`&self` で並行に使えます
/// - 設定の変更は `config_mut()`（`&mut self`）経由のみ
pub struct ExtendedQueueClient {
    transport: Arc<dyn QueueTransport>,
    objects: Option<Arc<dyn ObjectTransport>>,
    key_generator: Arc<dyn KeyGenerator>,
    events: Arc<dyn EventSink>,
    config: OffloadConfig,
    object_call_timeout: Duration,
}

impl ExtendedQueueClient {
    pub(crate) fn from_parts(
        transport: Arc<dyn QueueTransport>,
        objects: Option<Arc<dyn ObjectTransport>>,
        key_generator: Arc<dyn KeyGenerator>,
        events: Arc<dyn EventSink>,
        config: OffloadConfig,
        object_call_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            objects,
            key_generator,
            events,
            config,
            object_call_timeout,
        }
    }

    /// 横取りしない操作のための、下位 transport
    pub fn transport(&self) -> &Arc<dyn QueueTransport> {
        &self.transport
    }

    pub fn config(&self) -> &OffloadConfig {
        &self.config
    }

    /// 実行時に設定を変える
    ///
    /// build() の検証はここでは走りません。offload を有効にしたまま bucket が空になった場合や
    /// object transport が無い場合、各操作は warn を出して transport にそのまま渡します。
    pub fn config_mut(&mut self) -> &mut OffloadConfig {
        &mut self.config
    }

    /// offload が有効で object transport と bucket が揃っているときだけ PayloadStore を返す
    ///
    /// 設定は `config_mut()` で変わりうるので、呼び出しごとに組み立てます。
    fn payload_store(&self) -> Option<PayloadStore> {
        if !self.config.is_payload_support_enabled() {
            return None;
        }
        let Some(objects) = &self.objects else {
            tracing::warn!("payload support is enabled without an object transport; passing through");
            return None;
        };
        if self.config.bucket().is_empty() {
            tracing::warn!("payload support is enabled with an empty bucket; passing through");
            return None;
        }
        Some(
            PayloadStore::new(
                Arc::clone(objects),
                Arc::clone(&self.key_generator),
                self.config.bucket(),
            )
            .with_timeout(self.object_call_timeout),
        )
    }

    /// `log_attribute_names` に挙げた属性の文字列値を `name=value` で連結
    fn log_attributes(&self, attributes: &MessageAttributes) -> String {
        self.config
            .log_attribute_names()
            .iter()
            .filter_map(|name| {
                let value = attributes.get(name)?.string_value()?;
                Some(format!("{name}={value}"))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn passed_through(&self, operation: Operation) {
        tracing::info!(method = operation.as_str(), "handled by underlying transport");
        self.events.emit(OffloadEvent::PassedThrough { operation });
    }

    pub async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<SendMessageOutput, OffloadError> {
        let Some(store) = self.payload_store() else {
            self.passed_through(Operation::Send);
            return Ok(self.transport.send_message(request).await?);
        };
        let Some(body) = request.body.as_deref() else {
            self.passed_through(Operation::Send);
            return Ok(self.transport.send_message(request).await?);
        };

        let attrs = self.log_attributes(&request.attributes);
        let body_size = body.len();
        let message_size = body_size + attributes_wire_size(&request.attributes);
        tracing::info!(method = "send_message", message_size, attrs = %attrs, "calculated payload size");

        match decide(&self.config.routing_policy(), body_size, &request.attributes) {
            Destination::Rejected(rejection) => {
                tracing::warn!(method = "send_message", attrs = %attrs, reason = %rejection, "message rejected");
                self.events.emit(OffloadEvent::Rejected {
                    reason: rejection.to_string(),
                });
                Err(rejection.into())
            }
            Destination::Queue => {
                tracing::info!(method = "send_message", uploaded_to_store = false, attrs = %attrs, "handled by underlying transport");
                self.events.emit(OffloadEvent::PassedThrough {
                    operation: Operation::Send,
                });
                Ok(self.transport.send_message(request).await?)
            }
            Destination::Store => {
                let pointer = store.store_pointer(body).await?;
                let serialized = pointer.encode()?;
                tracing::info!(
                    method = "send_message",
                    uploaded_to_store = true,
                    bucket = pointer.bucket(),
                    key = pointer.key(),
                    attrs = %attrs,
                    "uploaded payload to object store"
                );
                self.events.emit(OffloadEvent::PayloadStored {
                    pointer,
                    body_size,
                });

                let mut attributes = request.attributes;
                attributes.insert(
                    RESERVED_ATTRIBUTE_NAME.to_string(),
                    AttributeValue::number(body_size),
                );
                let offloaded = SendMessageRequest {
                    body: Some(serialized),
                    attributes,
                };
                Ok(self.transport.send_message(offloaded).await?)
            }
        }
    }

    pub async fn receive_message(
        &self,
        request: ReceiveMessageRequest,
    ) -> Result<ReceiveMessageOutput, OffloadError> {
        let Some(store) = self.payload_store() else {
            self.passed_through(Operation::Receive);
            return Ok(self.transport.receive_message(request).await?);
        };

        let request = with_reserved_attribute_names(request);
        let output = self.transport.receive_message(request).await.inspect_err(|e| {
            tracing::error!(method = "receive_message", error = %e, "underlying receive failed");
        })?;

        // 1 件でも取得に失敗したら全体を失敗にする（部分的な結果は返さない）
        let mut messages = Vec::with_capacity(output.messages.len());
        for message in output.messages {
            messages.push(self.restore_message(&store, message).await?);
        }

        Ok(ReceiveMessageOutput { messages })
    }

    async fn restore_message(
        &self,
        store: &PayloadStore,
        mut message: ReceivedMessage,
    ) -> Result<ReceivedMessage, OffloadError> {
        if reserved_attribute_if_present(&message.attributes).is_none() {
            return Ok(message);
        }

        let attrs = self.log_attributes(&message.attributes);
        tracing::info!(method = "receive_message", message_id = %message.message_id, attrs = %attrs, "getting payload from object store");

        let pointer = ObjectPointer::decode(&message.body).inspect_err(|e| {
            tracing::error!(method = "receive_message", attrs = %attrs, error = ?e, "message body is not a payload pointer");
        })?;
        let payload = store.fetch_pointer(&pointer).await.inspect_err(|e| {
            tracing::error!(method = "receive_message", attrs = %attrs, error = ?e, "failed to get payload");
        })?;

        message.attributes.remove(RESERVED_ATTRIBUTE_NAME);
        message.attributes.remove(LEGACY_RESERVED_ATTRIBUTE_NAME);
        message.receipt_handle = embed_in_handle(&message.receipt_handle, &pointer);
        message.body = payload;

        tracing::info!(method = "receive_message", message_id = %message.message_id, attrs = %attrs, "finished getting payload from object store");
        self.events.emit(OffloadEvent::PayloadFetched {
            pointer,
            body_size: message.body.len(),
        });
        Ok(message)
    }

    pub async fn delete_message(&self, request: DeleteMessageRequest) -> Result<(), OffloadError> {
        let Some(store) = self.payload_store() else {
            self.passed_through(Operation::Delete);
            return Ok(self.transport.delete_message(request).await?);
        };
        let Some(handle) = request.receipt_handle.as_deref() else {
            self.passed_through(Operation::Delete);
            return Ok(self.transport.delete_message(request).await?);
        };

        if !is_modified_handle(handle) {
            tracing::info!(method = "delete_message", "message was sent without object store");
            self.events.emit(OffloadEvent::PassedThrough {
                operation: Operation::Delete,
            });
            return Ok(self.transport.delete_message(request).await?);
        }

        let (original_handle, pointer) = split_handle(handle)?;
        tracing::info!(method = "delete_message", bucket = pointer.bucket(), key = pointer.key(), "message was sent with object store");

        if self.config.does_cleanup_on_delete() {
            // オブジェクト削除に失敗したらキューのメッセージは残す（再試行で掃除できるように）
            store.delete_pointer(&pointer).await.inspect_err(|e| {
                tracing::error!(method = "delete_message", error = ?e, "failed to delete payload");
            })?;
            tracing::info!(method = "delete_message", "deleted payload from object store");
            self.events.emit(OffloadEvent::PayloadDeleted { pointer });
        }

        self.transport
            .delete_message(DeleteMessageRequest {
                receipt_handle: Some(original_handle),
            })
            .await?;
        Ok(())
    }
}

/// 呼び出し側の属性名フィルタに、予約属性名を 2 つとも追加する
fn with_reserved_attribute_names(mut request: ReceiveMessageRequest) -> ReceiveMessageRequest {
    request
        .attribute_names
        .retain(|name| name != RESERVED_ATTRIBUTE_NAME && name != LEGACY_RESERVED_ATTRIBUTE_NAME);
    request.attribute_names.push(RESERVED_ATTRIBUTE_NAME.to_string());
    request
        .attribute_names
        .push(LEGACY_RESERVED_ATTRIBUTE_NAME.to_string());
    request
}
