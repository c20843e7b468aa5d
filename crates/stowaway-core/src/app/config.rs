//! Client configuration.

use serde::{Deserialize, Serialize};

use crate::domain::routing::RoutingPolicy;

/// Bodies (plus attributes) above this many bytes are offloaded.
pub const DEFAULT_MESSAGE_SIZE_THRESHOLD: usize = 262_144;

/// Default hard cap, only consulted once the cap is enabled.
pub const DEFAULT_HARD_CAP_THRESHOLD: usize = 2 * 1024 * 1024 * 1024;

/// Offload behaviour of an [`ExtendedQueueClient`](crate::ExtendedQueueClient).
///
/// Owned by the client. Read-only through `&client`; tune it at runtime via
/// `ExtendedQueueClient::config_mut`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffloadConfig {
    payload_support_enabled: bool,
    bucket: String,
    size_threshold: usize,
    always_through_store: bool,
    cleanup_on_delete: bool,
    hard_cap_enabled: bool,
    hard_cap_threshold: usize,
    /// Attributes whose string values are attached to every log line.
    log_attribute_names: Vec<String>,
}

impl Default for OffloadConfig {
    fn default() -> Self {
        Self {
            payload_support_enabled: false,
            bucket: String::new(),
            size_threshold: DEFAULT_MESSAGE_SIZE_THRESHOLD,
            always_through_store: false,
            cleanup_on_delete: true,
            hard_cap_enabled: false,
            hard_cap_threshold: DEFAULT_HARD_CAP_THRESHOLD,
            log_attribute_names: Vec::new(),
        }
    }
}

impl OffloadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Turn offloading on, writing payloads to `bucket`.
    pub fn with_payload_support_enabled(&mut self, bucket: impl Into<String>) {
        self.bucket = bucket.into();
        self.payload_support_enabled = true;
    }

    pub fn with_payload_support_disabled(&mut self) {
        self.payload_support_enabled = false;
    }

    /// Turn the hard cap on with the given body-size limit.
    pub fn with_hard_cap_enabled(&mut self, threshold: usize) {
        self.hard_cap_enabled = true;
        self.hard_cap_threshold = threshold;
    }

    pub fn with_hard_cap_disabled(&mut self) {
        self.hard_cap_enabled = false;
    }

    pub fn set_size_threshold(&mut self, threshold: usize) {
        self.size_threshold = threshold;
    }

    pub fn set_always_through_store(&mut self, always_through_store: bool) {
        self.always_through_store = always_through_store;
    }

    pub fn set_cleanup_on_delete(&mut self, cleanup_on_delete: bool) {
        self.cleanup_on_delete = cleanup_on_delete;
    }

    pub fn set_hard_cap_threshold(&mut self, threshold: usize) {
        self.hard_cap_threshold = threshold;
    }

    pub fn set_log_attribute_names<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.log_attribute_names = names.into_iter().map(Into::into).collect();
    }

    pub fn is_payload_support_enabled(&self) -> bool {
        self.payload_support_enabled
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn size_threshold(&self) -> usize {
        self.size_threshold
    }

    pub fn is_always_through_store(&self) -> bool {
        self.always_through_store
    }

    pub fn does_cleanup_on_delete(&self) -> bool {
        self.cleanup_on_delete
    }

    pub fn is_hard_cap_enabled(&self) -> bool {
        self.hard_cap_enabled
    }

    pub fn hard_cap_threshold(&self) -> usize {
        self.hard_cap_threshold
    }

    /// Threshold, forced-store flag and hard cap as `decide` sees them.
    pub fn routing_policy(&self) -> RoutingPolicy {
        let policy = RoutingPolicy::new(self.size_threshold)
            .with_always_through_store(self.always_through_store);
        if self.hard_cap_enabled {
            policy.with_hard_cap(self.hard_cap_threshold)
        } else {
            policy
        }
    }

    pub fn log_attribute_names(&self) -> &[String] {
        &self.log_attribute_names
    }
}
