//! Parsing and permission-dependent validation of a Bubble Protocol filename.

use crate::error::BubbleError;
use crate::hex_id::{validate_posix_segment, Hex32, ROOT_SENTINEL};
use crate::permissions::PermissionBits;

/// A parsed filename: a permissioned part (directory id or root sentinel)
/// plus an optional POSIX path extension.
///
/// A freshly-parsed `BubbleFilename` has no permissions attached; it becomes
/// fully valid (`is_valid`) only after `set_permissions` has been called with
/// the bits the ACC returned for its permissioned part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BubbleFilename {
    permissioned_part: Hex32,
    path_extension: Option<String>,
    permissions: Option<PermissionBits>,
}

impl BubbleFilename {
    /// Parses a filename string. An empty string is substituted with the
    /// root sentinel. Splits on the first `/`: the left side must be the
    /// root sentinel or a 32-byte hex id; the right side, if present, must
    /// satisfy the POSIX segment rules.
    pub fn parse(input: &str) -> Result<Self, BubbleError> {
        let input = if input.is_empty() {
            ROOT_SENTINEL.to_lowercase_hex()
        } else {
            input.to_string()
        };

        let (left, right) = match input.split_once('/') {
            Some((l, r)) => (l, Some(r)),
            None => (input.as_str(), None),
        };

        let permissioned_part: Hex32 = left.parse()?;

        let path_extension = match right {
            None => None,
            Some(segment) => {
                validate_posix_segment(segment)?;
                Some(segment.to_string())
            }
        };

        Ok(BubbleFilename {
            permissioned_part,
            path_extension,
            permissions: None,
        })
    }

    pub fn permissioned_part(&self) -> Hex32 {
        self.permissioned_part
    }

    pub fn is_root(&self) -> bool {
        self.permissioned_part.is_root() && self.path_extension.is_none()
    }

    /// True if this filename addresses the permissioned part itself — no
    /// path extension — and the ACC's directory bit is set on it. False
    /// before permissions have been attached, and false for a
    /// `permissionedPart/segment` file even when the directory bit is set
    /// on its permissioned part (the segment is what's being addressed,
    /// not the directory).
    pub fn is_directory(&self) -> bool {
        self.path_extension.is_none()
            && self.permissions.map(|p| p.is_directory()).unwrap_or(false)
    }

    /// The complement of `is_directory`: either a `permissionedPart/segment`
    /// path, or a bare permissioned part whose directory bit is unset.
    pub fn is_file(&self) -> bool {
        !self.is_directory()
    }

    /// Attaches the permission bits the ACC returned for `permissioned_part`.
    pub fn set_permissions(&mut self, permissions: PermissionBits) {
        self.permissions = Some(permissions);
    }

    pub fn permissions(&self) -> Option<PermissionBits> {
        self.permissions
    }

    /// True once parsed, and, if permissions have been attached and a path
    /// extension is present, only if the permissioned part is a directory.
    pub fn is_valid(&self) -> bool {
        match (&self.path_extension, self.permissions) {
            (Some(_), Some(permissions)) => permissions.is_directory(),
            _ => true,
        }
    }

    /// Canonical lowercased form: `permissioned_part` alone, or
    /// `permissioned_part/segment`.
    pub fn full_filename(&self) -> String {
        match &self.path_extension {
            Some(segment) => format!("{}/{}", self.permissioned_part, segment),
            None => self.permissioned_part.to_lowercase_hex(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    fn dir_id() -> String {
        "0x1111111111111111111111111111111111111111111111111111111111111111"
            .chars()
            .take(66)
            .collect()
    }

    #[test]
    fn empty_string_is_root() {
        let f = BubbleFilename::parse("").unwrap();
        assert!(f.is_root());
        assert!(f.is_valid());
    }

    #[test]
    fn directory_id_only() {
        let f = BubbleFilename::parse(&dir_id()).unwrap();
        assert!(!f.is_root());
        assert!(f.is_valid());
    }

    #[test]
    fn bare_permissioned_part_is_a_file_unless_the_directory_bit_is_set() {
        let mut f = BubbleFilename::parse(&dir_id()).unwrap();

        f.set_permissions(PermissionBits::from_u256(U256::from(1u8) << 253)); // read, no directory bit
        assert!(f.is_file(), "directory bit unset: a bare id is a file");
        assert!(!f.is_directory());

        f.set_permissions(PermissionBits::from_u256(U256::from(1u8) << 254)); // directory bit
        assert!(f.is_directory(), "directory bit set: a bare id is a directory");
        assert!(!f.is_file());
    }

    #[test]
    fn directory_id_plus_segment() {
        let input = format!("{}/notes.txt", dir_id());
        let f = BubbleFilename::parse(&input).unwrap();
        assert!(f.is_file());
        assert_eq!(f.full_filename(), input.to_lowercase());
    }

    #[test]
    fn segment_is_always_a_file_even_when_its_directory_bit_is_set() {
        // A `permissionedPart/segment` target addresses the segment, not the
        // directory, regardless of what the ACC says about the directory id
        // itself — otherwise every readable file under a directory would be
        // dispatched as a directory listing instead of a read.
        let input = format!("{}/notes.txt", dir_id());
        let mut f = BubbleFilename::parse(&input).unwrap();
        f.set_permissions(PermissionBits::from_u256(U256::from(1u8) << 254));
        assert!(f.is_file());
        assert!(!f.is_directory());
    }

    #[test]
    fn rejects_dotdot_segment() {
        let input = format!("{}/..", dir_id());
        assert!(BubbleFilename::parse(&input).is_err());
    }

    #[test]
    fn path_extension_requires_directory_bit_once_permissions_attached() {
        let input = format!("{}/notes.txt", dir_id());
        let mut f = BubbleFilename::parse(&input).unwrap();
        assert!(f.is_valid(), "no permissions attached yet: structurally valid");

        f.set_permissions(PermissionBits::from_u256(U256::ZERO));
        assert!(!f.is_valid(), "directory bit unset: invalid once checked");

        f.set_permissions(PermissionBits::from_u256(U256::from(1u8) << 254));
        assert!(f.is_valid(), "directory bit set: valid");
    }

    #[test]
    fn canonicalizes_permissioned_part_to_lowercase() {
        let input = format!("{}/Notes.TXT", dir_id().to_uppercase());
        let f = BubbleFilename::parse(&input).unwrap();
        assert_eq!(f.full_filename(), format!("{}/Notes.TXT", dir_id()));
    }
}
