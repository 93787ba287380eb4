//! Primitive validators and canonical forms.
//!
//! Every public constructor here lowercases and `0x`-prefixes its input, so
//! that once a value is one of these types, no caller has to canonicalize it
//! again before comparing, hashing, or forwarding it to a collaborator.

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::BubbleError;

/// A 20-byte address, always rendered as lowercase `0x`-prefixed hex.
///
/// Used for contract addresses, the public signatory, and delegate addresses.
/// Comparisons are case-insensitive by construction: two `Hex20`s built from
/// differently-cased input strings compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hex20(Address);

impl Hex20 {
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Hex20(Address::from(bytes))
    }

    pub fn as_bytes(&self) -> [u8; 20] {
        self.0.into_array()
    }

    /// Canonical lowercase `0x`-prefixed form.
    pub fn to_lowercase_hex(&self) -> String {
        format!("{:#x}", self.0)
    }
}

impl fmt::Display for Hex20 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_lowercase_hex())
    }
}

impl FromStr for Hex20 {
    type Err = BubbleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let address = Address::from_str(s).map_err(|e| {
            BubbleError::invalid_method_params(format!("malformed 20-byte hex address: {e}"))
        })?;
        Ok(Hex20(address))
    }
}

impl From<Address> for Hex20 {
    fn from(value: Address) -> Self {
        Hex20(value)
    }
}

impl From<Hex20> for Address {
    fn from(value: Hex20) -> Self {
        value.0
    }
}

impl Serialize for Hex20 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_lowercase_hex())
    }
}

impl<'de> Deserialize<'de> for Hex20 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hex20::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A 32-byte hex identifier: a bubble's directory id, or the root sentinel.
///
/// Always rendered as lowercase `0x`-prefixed hex, 66 characters total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hex32(B256);

/// The reserved root sentinel: 32 zero bytes.
pub const ROOT_SENTINEL: Hex32 = Hex32(B256::ZERO);

impl Hex32 {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Hex32(B256::from(bytes))
    }

    pub fn as_bytes(&self) -> [u8; 32] {
        self.0.0
    }

    pub fn to_lowercase_hex(&self) -> String {
        format!("{:#x}", self.0)
    }

    pub fn is_root(&self) -> bool {
        *self == ROOT_SENTINEL
    }
}

impl fmt::Display for Hex32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_lowercase_hex())
    }
}

impl FromStr for Hex32 {
    type Err = BubbleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let b256 = B256::from_str(s)
            .map_err(|e| BubbleError::invalid_method_params(format!("malformed 32-byte hex id: {e}")))?;
        Ok(Hex32(b256))
    }
}

impl Serialize for Hex32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_lowercase_hex())
    }
}

impl<'de> Deserialize<'de> for Hex32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hex32::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Validates a POSIX path segment: non-empty, no `/`, no NUL, not `.` or `..`.
pub fn validate_posix_segment(segment: &str) -> Result<(), BubbleError> {
    if segment.is_empty() {
        return Err(BubbleError::invalid_method_params("empty path segment"));
    }
    if segment.contains('/') || segment.contains('\0') {
        return Err(BubbleError::invalid_method_params(
            "path segment must not contain '/' or NUL",
        ));
    }
    if segment == "." || segment == ".." {
        return Err(BubbleError::invalid_method_params(
            "path segment must not be '.' or '..'",
        ));
    }
    Ok(())
}
