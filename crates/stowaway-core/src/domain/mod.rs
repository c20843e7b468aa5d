//! Domain model (pointer codec, attributes, routing, messages, errors, events).
//!
//! I/O を一切持たない純粋なロジックだけをここに置きます。
//! transport や object store とのやり取りは `app` 側の責務です。

pub mod attributes;
pub mod errors;
pub mod events;
pub mod handle;
pub mod message;
pub mod pointer;
pub mod routing;

pub use self::attributes::{
    AttributeValue, AttributeViolation, MessageAttributes, attributes_wire_size,
    reserved_attribute_if_present, validate_attributes,
};
pub use self::errors::{ErrorKind, OffloadError};
pub use self::events::{OffloadEvent, Operation};
pub use self::handle::{embed_in_handle, is_modified_handle, split_handle};
pub use self::message::{
    DeleteMessageRequest, ReceiveMessageRequest, ReceiveMessageOutput, ReceivedMessage,
    SendMessageOutput, SendMessageRequest,
};
pub use self::pointer::{ObjectPointer, PointerError};
pub use self::routing::{Destination, Rejection, RoutingPolicy, decide};
