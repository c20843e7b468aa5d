//! InMemoryQueue - 開発用のキュー transport
//!
//! # 挙動
//! - send で ULID の message id を払い出す
//! - receive のたびに新しい receipt handle を発行し、メッセージを in-flight にする
//! - delete は現在有効な receipt handle でのみ成功する
//! - 属性名フィルタは `"All"` / `".*"`（全件）、`"prefix.*"`（前方一致）、完全一致に対応

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use ulid::Ulid;

use crate::domain::attributes::MessageAttributes;
use crate::domain::events::Operation;
use crate::domain::message::{
    DeleteMessageRequest, ReceiveMessageOutput, ReceiveMessageRequest, ReceivedMessage,
    SendMessageOutput, SendMessageRequest,
};
use crate::ports::{QueueError, QueueTransport};

/// 1 回の receive で返せる最大件数
pub const MAX_RECEIVE_BATCH: u32 = 10;

/// 1 メッセージに付けられる属性の上限
pub const MAX_MESSAGE_ATTRIBUTES: usize = 10;

#[derive(Debug, Clone)]
struct StoredMessage {
    message_id: String,
    body: String,
    attributes: MessageAttributes,
    /// 受信済みなら、その時に発行した handle
    receipt_handle: Option<String>,
}

#[derive(Debug, Default)]
struct QueueState {
    messages: VecDeque<StoredMessage>,
    sent: Vec<SendMessageRequest>,
    receive_requests: Vec<ReceiveMessageRequest>,
    deleted_handles: Vec<String>,
    pending_failures: Vec<(Operation, String)>,
}

impl QueueState {
    fn take_failure(&mut self, operation: Operation) -> Option<QueueError> {
        let index = self
            .pending_failures
            .iter()
            .position(|(op, _)| *op == operation)?;
        let (_, message) = self.pending_failures.remove(index);
        Some(QueueError::OperationFailed(message))
    }
}

/// InMemoryQueue は開発用のキュー transport
///
/// # 使用例
/// ```ignore
/// let queue = InMemoryQueue::new();
/// queue.send_message(SendMessageRequest::new("hello")).await?;
/// let output = queue.receive_message(ReceiveMessageRequest::new(1)).await?;
/// ```
#[derive(Clone, Default)]
pub struct InMemoryQueue {
    state: Arc<Mutex<QueueState>>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 次の `operation` 呼び出しを 1 回だけ失敗させる
    pub async fn fail_next(&self, operation: Operation, message: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.pending_failures.push((operation, message.into()));
    }

    /// 削除されていないメッセージ数（in-flight を含む）
    pub async fn len(&self) -> usize {
        self.state.lock().await.messages.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// transport に届いた send リクエスト（届いた順）
    pub async fn sent_requests(&self) -> Vec<SendMessageRequest> {
        self.state.lock().await.sent.clone()
    }

    /// transport に届いた receive リクエスト（届いた順）
    pub async fn receive_requests(&self) -> Vec<ReceiveMessageRequest> {
        self.state.lock().await.receive_requests.clone()
    }

    /// delete に成功した receipt handle（成功した順）
    pub async fn deleted_handles(&self) -> Vec<String> {
        self.state.lock().await.deleted_handles.clone()
    }
}

fn wants_attribute(requested: &[String], name: &str) -> bool {
    requested.iter().any(|filter| match filter.as_str() {
        "All" | ".*" => true,
        other => match other.strip_suffix(".*") {
            Some(prefix) => name.starts_with(prefix),
            None => other == name,
        },
    })
}

#[async_trait]
impl QueueTransport for InMemoryQueue {
    async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<SendMessageOutput, QueueError> {
        let mut state = self.state.lock().await;
        if let Some(err) = state.take_failure(Operation::Send) {
            return Err(err);
        }

        let Some(body) = request.body.clone() else {
            return Err(QueueError::MissingParameter("MessageBody"));
        };
        if request.attributes.len() > MAX_MESSAGE_ATTRIBUTES {
            return Err(QueueError::OperationFailed(format!(
                "too many message attributes: {} (max {MAX_MESSAGE_ATTRIBUTES})",
                request.attributes.len()
            )));
        }

        let message_id = Ulid::new().to_string();
        state.messages.push_back(StoredMessage {
            message_id: message_id.clone(),
            body,
            attributes: request.attributes.clone(),
            receipt_handle: None,
        });
        state.sent.push(request);

        Ok(SendMessageOutput { message_id })
    }

    async fn receive_message(
        &self,
        request: ReceiveMessageRequest,
    ) -> Result<ReceiveMessageOutput, QueueError> {
        let mut state = self.state.lock().await;
        if let Some(err) = state.take_failure(Operation::Receive) {
            return Err(err);
        }
        if request.max_messages == 0 || request.max_messages > MAX_RECEIVE_BATCH {
            return Err(QueueError::OperationFailed(format!(
                "max_messages must be between 1 and {MAX_RECEIVE_BATCH}, got {}",
                request.max_messages
            )));
        }

        let mut messages = Vec::new();
        for stored in state.messages.iter_mut() {
            if messages.len() as u32 >= request.max_messages {
                break;
            }
            if stored.receipt_handle.is_some() {
                continue;
            }

            let receipt_handle = Ulid::new().to_string();
            stored.receipt_handle = Some(receipt_handle.clone());

            let attributes = stored
                .attributes
                .iter()
                .filter(|(name, _)| wants_attribute(&request.attribute_names, name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect();

            messages.push(ReceivedMessage {
                message_id: stored.message_id.clone(),
                body: stored.body.clone(),
                attributes,
                receipt_handle,
            });
        }
        state.receive_requests.push(request);

        Ok(ReceiveMessageOutput { messages })
    }

    async fn delete_message(&self, request: DeleteMessageRequest) -> Result<(), QueueError> {
        let mut state = self.state.lock().await;
        if let Some(err) = state.take_failure(Operation::Delete) {
            return Err(err);
        }

        let Some(handle) = request.receipt_handle else {
            return Err(QueueError::MissingParameter("ReceiptHandle"));
        };
        let position = state
            .messages
            .iter()
            .position(|m| m.receipt_handle.as_deref() == Some(handle.as_str()))
            .ok_or_else(|| QueueError::ReceiptHandleInvalid(handle.clone()))?;

        state.messages.remove(position);
        state.deleted_handles.push(handle);
        Ok(())
    }
}
