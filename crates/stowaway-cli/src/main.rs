use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stowaway_core::domain::{
    DeleteMessageRequest, OffloadEvent, ReceiveMessageRequest, SendMessageRequest,
};
use stowaway_core::impls::{InMemoryObjectStore, InMemoryQueue};
use stowaway_core::ports::EventSink;
use stowaway_core::{ClientBuilder, OffloadConfig};

const CONFIG_ENV: &str = "STOWAWAY_CONFIG";
const DEMO_BUCKET: &str = "stowaway-payloads";

#[derive(Debug, Serialize)]
struct OrderLine {
    sku: String,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct Order {
    order_id: u32,
    lines: Vec<OrderLine>,
}

/// イベントを 1 行ずつ表示するだけの sink
struct PrintEvents;

impl EventSink for PrintEvents {
    fn emit(&self, event: OffloadEvent) {
        println!("event: {event:?}");
    }
}

/// STOWAWAY_CONFIG があればその JSON を、なければデモ用 bucket で offload を有効にした設定を使う
fn load_config() -> Result<OffloadConfig, Box<dyn std::error::Error>> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)?;
            Ok(OffloadConfig::from_json_str(&raw)?)
        }
        Err(_) => {
            let mut config = OffloadConfig::new();
            config.with_payload_support_enabled(DEMO_BUCKET);
            Ok(config)
        }
    }
}

fn order_json(order_id: u32, lines: u32) -> Result<String, serde_json::Error> {
    let order = Order {
        order_id,
        lines: (0..lines)
            .map(|i| OrderLine {
                sku: format!("SKU-{i:08}"),
                quantity: i % 7 + 1,
            })
            .collect(),
    };
    serde_json::to_string(&order)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // (A) transport と client を用意
    let queue = InMemoryQueue::new();
    let objects = InMemoryObjectStore::new();
    let client = ClientBuilder::new()
        .transport(Arc::new(queue.clone()))
        .object_transport(Arc::new(objects.clone()))
        .event_sink(Arc::new(PrintEvents))
        .config(load_config()?)
        .build()?;

    // (B) 小さい注文と、しきい値を超える大きい注文を送る
    for (order_id, lines) in [(1, 3), (2, 10_000)] {
        let body = order_json(order_id, lines)?;
        let sent = client.send_message(SendMessageRequest::new(body.clone())).await?;
        println!("sent: id={} body_size={}", sent.message_id, body.len());
    }
    println!("objects stored: {}", objects.len().await);

    // (C) 受信して、本文が戻っていることを確認してから削除
    let received = client.receive_message(ReceiveMessageRequest::new(10)).await?;
    for message in received.messages {
        println!(
            "received: id={} body_size={}",
            message.message_id,
            message.body.len()
        );
        client
            .delete_message(DeleteMessageRequest::new(message.receipt_handle))
            .await?;
    }

    println!(
        "remaining: queue={} objects={}",
        queue.len().await,
        objects.len().await
    );
    Ok(())
}
