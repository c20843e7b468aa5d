//! Message attributes: wire size, validation, and reserved-name detection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Attribute injected on offloaded messages, carrying the original body length.
pub const RESERVED_ATTRIBUTE_NAME: &str = "ExtendedPayloadSize";

/// Older name for the same marker, still honored on receive.
pub const LEGACY_RESERVED_ATTRIBUTE_NAME: &str = "SQSLargePayloadSize";

/// Protocol ceiling is 10 attributes; one slot is kept for the reserved marker.
pub const MAX_ALLOWED_ATTRIBUTES: usize = 10 - 1;

/// A single message attribute value.
///
/// `data_type` is kept as the wire string (`"String"`, `"Number"`, `"Binary"`,
/// or a custom `"Number.int"`-style subtype).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttributeValue {
    String { data_type: String, value: String },
    Binary { data_type: String, value: Vec<u8> },
    /// Data type only, no value (the transport decides whether that is legal).
    Empty { data_type: String },
}

impl AttributeValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String {
            data_type: "String".to_string(),
            value: value.into(),
        }
    }

    pub fn number(value: impl ToString) -> Self {
        Self::String {
            data_type: "Number".to_string(),
            value: value.to_string(),
        }
    }

    pub fn binary(value: impl Into<Vec<u8>>) -> Self {
        Self::Binary {
            data_type: "Binary".to_string(),
            value: value.into(),
        }
    }

    pub fn data_type(&self) -> &str {
        match self {
            Self::String { data_type, .. }
            | Self::Binary { data_type, .. }
            | Self::Empty { data_type } => data_type,
        }
    }

    pub fn string_value(&self) -> Option<&str> {
        match self {
            Self::String { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn binary_value(&self) -> Option<&[u8]> {
        match self {
            Self::Binary { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Bytes this value contributes to the message size (data type + value).
    pub fn wire_size(&self) -> usize {
        let value_len = match self {
            Self::String { value, .. } => value.len(),
            Self::Binary { value, .. } => value.len(),
            Self::Empty { .. } => 0,
        };
        self.data_type().len() + value_len
    }
}

/// Attribute map keyed by name. Names are unique.
pub type MessageAttributes = BTreeMap<String, AttributeValue>;

/// Reasons a caller-supplied attribute map is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeViolation {
    #[error(
        "Total size of Message attributes is {size} bytes which is larger than the threshold of {threshold} Bytes. Consider including the payload in the message body instead of message attributes."
    )]
    TooLarge { size: usize, threshold: usize },

    #[error(
        "Number of message attributes [{count}] exceeds the maximum allowed for large-payload messages [{max}]."
    )]
    TooMany { count: usize, max: usize },

    #[error("Message attribute name {0} is reserved for use by the extended client.")]
    Reserved(String),
}

/// Sum of name, data type and value lengths over all attributes.
pub fn attributes_wire_size(attributes: &MessageAttributes) -> usize {
    attributes
        .iter()
        .map(|(name, value)| name.len() + value.wire_size())
        .sum()
}

/// Checks size, then count, then reserved names. The first failure wins.
pub fn validate_attributes(
    attributes: &MessageAttributes,
    size_threshold: usize,
) -> Result<(), AttributeViolation> {
    let size = attributes_wire_size(attributes);
    if size > size_threshold {
        return Err(AttributeViolation::TooLarge {
            size,
            threshold: size_threshold,
        });
    }

    if attributes.len() > MAX_ALLOWED_ATTRIBUTES {
        return Err(AttributeViolation::TooMany {
            count: attributes.len(),
            max: MAX_ALLOWED_ATTRIBUTES,
        });
    }

    if let Some(name) = reserved_attribute_if_present(attributes) {
        return Err(AttributeViolation::Reserved(name.to_string()));
    }

    Ok(())
}

/// Current reserved name if present, else the legacy one, else `None`.
pub fn reserved_attribute_if_present(attributes: &MessageAttributes) -> Option<&'static str> {
    [RESERVED_ATTRIBUTE_NAME, LEGACY_RESERVED_ATTRIBUTE_NAME]
        .into_iter()
        .find(|name| attributes.contains_key(*name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn attrs(entries: &[(&str, AttributeValue)]) -> MessageAttributes {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    fn numbered(count: usize) -> MessageAttributes {
        (0..count)
            .map(|i| (format!("Attribute{i}"), AttributeValue::string("test")))
            .collect()
    }

    #[test]
    fn wire_size_counts_name_type_and_value() {
        let attributes = attrs(&[
            ("trace", AttributeValue::string("abc")),       // 5 + 6 + 3
            ("blob", AttributeValue::binary(vec![0u8; 4])), // 4 + 6 + 4
            (
                "flag",
                AttributeValue::Empty {
                    data_type: "Number".to_string(),
                },
            ), // 4 + 6
        ]);
        assert_eq!(attributes_wire_size(&attributes), 14 + 14 + 10);
    }

    #[test]
    fn wire_size_of_empty_map_is_zero() {
        assert_eq!(attributes_wire_size(&MessageAttributes::new()), 0);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(MAX_ALLOWED_ATTRIBUTES)]
    fn accepts_up_to_nine_attributes(#[case] count: usize) {
        assert_eq!(validate_attributes(&numbered(count), 262_144), Ok(()));
    }

    #[test]
    fn rejects_ten_attributes() {
        let err = validate_attributes(&numbered(10), 262_144).unwrap_err();
        assert_eq!(err, AttributeViolation::TooMany { count: 10, max: 9 });
    }

    #[test]
    fn ten_attributes_with_reserved_name_fail_on_count_first() {
        let mut attributes = numbered(9);
        attributes.insert(RESERVED_ATTRIBUTE_NAME.to_string(), AttributeValue::number(1));
        let err = validate_attributes(&attributes, 262_144).unwrap_err();
        assert!(matches!(err, AttributeViolation::TooMany { count: 10, .. }));
    }

    #[rstest]
    #[case(RESERVED_ATTRIBUTE_NAME)]
    #[case(LEGACY_RESERVED_ATTRIBUTE_NAME)]
    fn rejects_reserved_names(#[case] name: &str) {
        let attributes = attrs(&[(name, AttributeValue::string("test"))]);
        let err = validate_attributes(&attributes, 262_144).unwrap_err();
        assert_eq!(err, AttributeViolation::Reserved(name.to_string()));
    }

    #[test]
    fn rejects_attributes_one_byte_over_threshold() {
        let threshold = 100;
        // "a" + "String" + value => 7 + value
        let attributes = attrs(&[("a", AttributeValue::string("x".repeat(threshold + 1 - 7)))]);
        assert_eq!(attributes_wire_size(&attributes), threshold + 1);

        let err = validate_attributes(&attributes, threshold).unwrap_err();
        assert_eq!(
            err,
            AttributeViolation::TooLarge {
                size: threshold + 1,
                threshold
            }
        );
    }

    #[test]
    fn accepts_attributes_exactly_at_threshold() {
        let threshold = 100;
        let attributes = attrs(&[("a", AttributeValue::string("x".repeat(threshold - 7)))]);
        assert_eq!(validate_attributes(&attributes, threshold), Ok(()));
    }

    #[test]
    fn size_check_runs_before_reserved_name_check() {
        let attributes = attrs(&[(
            RESERVED_ATTRIBUTE_NAME,
            AttributeValue::string("x".repeat(64)),
        )]);
        let err = validate_attributes(&attributes, 10).unwrap_err();
        assert!(matches!(err, AttributeViolation::TooLarge { .. }));
    }

    #[test]
    fn reserved_lookup_prefers_current_name() {
        let both = attrs(&[
            (RESERVED_ATTRIBUTE_NAME, AttributeValue::number(1)),
            (LEGACY_RESERVED_ATTRIBUTE_NAME, AttributeValue::number(1)),
        ]);
        assert_eq!(reserved_attribute_if_present(&both), Some(RESERVED_ATTRIBUTE_NAME));

        let legacy = attrs(&[(LEGACY_RESERVED_ATTRIBUTE_NAME, AttributeValue::number(1))]);
        assert_eq!(
            reserved_attribute_if_present(&legacy),
            Some(LEGACY_RESERVED_ATTRIBUTE_NAME)
        );

        assert_eq!(reserved_attribute_if_present(&numbered(3)), None);
    }
}
