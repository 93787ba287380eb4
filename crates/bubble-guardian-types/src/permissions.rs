//! The 256-bit ACC permission bitmap.

use alloy_primitives::U256;

/// Bit 255: the bubble (identified by the permissioned part) has been terminated.
pub const BIT_BUBBLE_TERMINATED: usize = 255;
/// Bit 254: the permissioned part is a directory.
pub const BIT_DIRECTORY: usize = 254;
/// Bit 253: read access.
pub const BIT_READ: usize = 253;
/// Bit 252: write access.
pub const BIT_WRITE: usize = 252;
/// Bit 251: append access.
pub const BIT_APPEND: usize = 251;
/// Bit 250: execute access.
pub const BIT_EXECUTE: usize = 250;

/// A 256-bit permission bitmap as returned by `ChainView::get_permissions`.
///
/// Bits 255 down to 250 have fixed meanings (see the `BIT_*` constants); bits
/// 20-25 are reserved and bits 0-19 are application-defined and opaque to the
/// Guardian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionBits(U256);

impl PermissionBits {
    pub fn from_u256(bits: U256) -> Self {
        PermissionBits(bits)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    fn bit(&self, position: usize) -> bool {
        self.0.bit(position)
    }

    pub fn bubble_terminated(&self) -> bool {
        self.bit(BIT_BUBBLE_TERMINATED)
    }

    pub fn is_directory(&self) -> bool {
        self.bit(BIT_DIRECTORY)
    }

    pub fn can_read(&self) -> bool {
        self.bit(BIT_READ)
    }

    pub fn can_write(&self) -> bool {
        self.bit(BIT_WRITE)
    }

    pub fn can_append(&self) -> bool {
        self.bit(BIT_APPEND)
    }

    pub fn can_execute(&self) -> bool {
        self.bit(BIT_EXECUTE)
    }

    /// Lowercase `0x`-prefixed hex form, as returned verbatim for the
    /// `getPermissions` RPC method.
    pub fn to_lowercase_hex(&self) -> String {
        format!("0x{:x}", self.0)
    }
}

impl From<U256> for PermissionBits {
    fn from(value: U256) -> Self {
        PermissionBits(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits_with(positions: &[usize]) -> PermissionBits {
        let mut v = U256::ZERO;
        for &p in positions {
            v |= U256::from(1u8) << p;
        }
        PermissionBits::from_u256(v)
    }

    #[test]
    fn individual_bits_are_isolated() {
        let p = bits_with(&[BIT_READ]);
        assert!(p.can_read());
        assert!(!p.can_write());
        assert!(!p.can_append());
        assert!(!p.can_execute());
        assert!(!p.is_directory());
        assert!(!p.bubble_terminated());
    }

    #[test]
    fn combined_bits() {
        let p = bits_with(&[BIT_DIRECTORY, BIT_READ]);
        assert!(p.is_directory());
        assert!(p.can_read());
        assert!(!p.can_write());
    }

    #[test]
    fn terminated_bit_independent_of_others() {
        let p = bits_with(&[BIT_BUBBLE_TERMINATED, BIT_READ, BIT_WRITE]);
        assert!(p.bubble_terminated());
        assert!(p.can_read());
        assert!(p.can_write());
    }

    #[test]
    fn hex_form_is_lowercase_prefixed() {
        let p = bits_with(&[BIT_READ]);
        let hex = p.to_lowercase_hex();
        assert!(hex.starts_with("0x"));
        assert_eq!(hex, hex.to_lowercase());
    }
}
