//! Routing decision: where an outbound message body goes.
//!
//! `decide` is a pure function. Given a [`RoutingPolicy`], the body length and the
//! caller's attributes it returns the destination without touching any transport.
//! Acting on the result (uploading, rewriting the request) is the client's job.

use thiserror::Error;

use super::attributes::{AttributeViolation, MessageAttributes, attributes_wire_size, validate_attributes};

/// Where the body of an outbound message is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Send the message unchanged.
    Queue,

    /// Upload the body and send a pointer instead.
    Store,

    /// Do not send at all.
    Rejected(Rejection),
}

/// Why a message was refused by every path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error(transparent)]
    InvalidAttributes(#[from] AttributeViolation),

    /// Body is above the configured hard cap.
    #[error("message body of {size} bytes exceeds hard cap of {limit} bytes")]
    HardCapExceeded { size: usize, limit: usize },
}

/// The part of the client configuration that routing looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingPolicy {
    /// Body + attribute bytes above this go to the store.
    pub size_threshold: usize,
    pub always_through_store: bool,
    /// Upper bound on the body alone. `None` disables the cap.
    pub hard_cap: Option<usize>,
}

impl RoutingPolicy {
    pub fn new(size_threshold: usize) -> Self {
        Self {
            size_threshold,
            always_through_store: false,
            hard_cap: None,
        }
    }

    pub fn with_always_through_store(mut self, always_through_store: bool) -> Self {
        self.always_through_store = always_through_store;
        self
    }

    pub fn with_hard_cap(mut self, limit: usize) -> Self {
        self.hard_cap = Some(limit);
        self
    }
}

/// Decide the destination of a message.
///
/// Order of checks:
/// 1. attribute validation (size, count, reserved names)
/// 2. `always_through_store` forces `Store`
/// 3. hard cap on the body alone
/// 4. body + attributes above `size_threshold` goes to `Store`
/// 5. everything else goes to `Queue`
pub fn decide(
    policy: &RoutingPolicy,
    body_size: usize,
    attributes: &MessageAttributes,
) -> Destination {
    if let Err(violation) = validate_attributes(attributes, policy.size_threshold) {
        return Destination::Rejected(violation.into());
    }

    if policy.always_through_store {
        return Destination::Store;
    }

    if let Some(limit) = policy.hard_cap.filter(|limit| body_size > *limit) {
        return Destination::Rejected(Rejection::HardCapExceeded {
            size: body_size,
            limit,
        });
    }

    let total_size = body_size + attributes_wire_size(attributes);
    if total_size > policy.size_threshold {
        Destination::Store
    } else {
        Destination::Queue
    }
}
