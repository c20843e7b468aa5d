//! EventSink の実装

use std::sync::Mutex;

use crate::domain::events::OffloadEvent;
use crate::ports::EventSink;

/// 何もしない EventSink（クライアントのデフォルト）
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: OffloadEvent) {}
}

/// 受け取ったイベントを順番に保持する EventSink
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<OffloadEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// これまでに受け取ったイベントのコピー
    pub fn events(&self) -> Vec<OffloadEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: OffloadEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::Operation;

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingEventSink::new();
        sink.emit(OffloadEvent::PassedThrough {
            operation: Operation::Send,
        });
        sink.emit(OffloadEvent::Rejected {
            reason: "too big".to_string(),
        });

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            OffloadEvent::PassedThrough {
                operation: Operation::Send
            }
        ));
        assert!(matches!(events[1], OffloadEvent::Rejected { .. }));
    }
}
