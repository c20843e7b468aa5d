//! QueueTransport port - 下位のキュー transport
//!
//! クライアントはこの trait の 3 操作だけを横取りします。
//! それ以外の操作が必要な場合は、呼び出し側が transport を直接保持してください。

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::message::{
    DeleteMessageRequest, ReceiveMessageOutput, ReceiveMessageRequest, SendMessageOutput,
    SendMessageRequest,
};

/// QueueError はキュー transport のエラー
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("receipt handle is invalid: {0}")]
    ReceiptHandleInvalid(String),

    #[error("queue operation failed: {0}")]
    OperationFailed(String),
}

/// QueueTransport はメッセージの送受信と削除を行う
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数タスクから同時に呼ばれる）
#[async_trait]
pub trait QueueTransport: Send + Sync {
    async fn send_message(&self, request: SendMessageRequest)
    -> Result<SendMessageOutput, QueueError>;

    async fn receive_message(
        &self,
        request: ReceiveMessageRequest,
    ) -> Result<ReceiveMessageOutput, QueueError>;

    async fn delete_message(&self, request: DeleteMessageRequest) -> Result<(), QueueError>;
}
