//! Column domains: validity predicate plus fixed storage width.

use serde::{Deserialize, Serialize};

use crate::error::DbError;

/// Width in bytes of the integer domain (native `i32`).
pub const INTEGER_WIDTH: usize = std::mem::size_of::<i32>();

/// Reusable column-type constraint.
///
/// Values of every variant occupy exactly [`Domain::size`] bytes inside a
/// record. Strings and enum members shorter than the width are stored
/// zero-padded on the right.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Domain {
    /// Any `INTEGER_WIDTH` bytes. Only the length is checked.
    Integer,
    /// Byte strings of at most `max_len` bytes.
    String { max_len: usize },
    /// One of a fixed set of byte strings.
    Enum { values: Vec<String> },
}

impl Domain {
    /// Creates an enum domain from its members.
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Domain::Enum {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Checks whether `value` satisfies this domain.
    ///
    /// Enum values are compared with their zero padding removed, so both a
    /// bare member and its padded slot are accepted.
    pub fn is_valid(&self, value: &[u8]) -> bool {
        match self {
            Domain::Integer => value.len() == INTEGER_WIDTH,
            Domain::String { max_len } => value.len() <= *max_len,
            Domain::Enum { values } => {
                let trimmed = trim_padding(value);
                values.iter().any(|v| v.as_bytes() == trimmed)
            }
        }
    }

    /// Returns the number of bytes a value of this domain occupies in a record.
    pub fn size(&self) -> usize {
        match self {
            Domain::Integer => INTEGER_WIDTH,
            Domain::String { max_len } => *max_len,
            Domain::Enum { values } => values.iter().map(|v| v.len()).max().unwrap_or(0),
        }
    }

    /// Encodes `value` into its fixed-width slot representation.
    pub fn encode(&self, value: &[u8]) -> Result<Vec<u8>, DbError> {
        if !self.is_valid(value) || value.len() > self.size() {
            return Err(DbError::ValidationError(format!(
                "value of {} bytes is not valid for domain {}",
                value.len(),
                self
            )));
        }
        let mut slot = value.to_vec();
        slot.resize(self.size(), 0);
        Ok(slot)
    }

    /// Renders a stored slot for display.
    pub fn render(&self, slot: &[u8]) -> String {
        match self {
            Domain::Integer => match decode_integer(slot) {
                Some(v) => v.to_string(),
                None => format!("{:?}", slot),
            },
            Domain::String { .. } | Domain::Enum { .. } => {
                String::from_utf8_lossy(trim_padding(slot)).into_owned()
            }
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::Integer => write!(f, "INTEGER"),
            Domain::String { max_len } => write!(f, "STRING({})", max_len),
            Domain::Enum { values } => write!(f, "ENUM({})", values.join(", ")),
        }
    }
}

/// Encodes an integer the way the integer domain stores it (little-endian).
pub fn encode_integer(value: i32) -> [u8; INTEGER_WIDTH] {
    value.to_le_bytes()
}

/// Decodes a stored integer slot.
pub fn decode_integer(slot: &[u8]) -> Option<i32> {
    let bytes: [u8; INTEGER_WIDTH] = slot.try_into().ok()?;
    Some(i32::from_le_bytes(bytes))
}

/// Strips trailing zero padding from a slot.
pub fn trim_padding(slot: &[u8]) -> &[u8] {
    let end = slot.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &slot[..end]
}
