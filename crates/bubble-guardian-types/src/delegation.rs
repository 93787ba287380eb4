//! The delegation packet: lets one key act on behalf of another for
//! specific content.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::content_id::ContentId;
use crate::hex_id::Hex20;

/// `expires` is either an absolute unix timestamp or the literal `"never"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Never,
    At(u64),
}

impl Expiry {
    pub fn is_expired(&self, now_secs: u64) -> bool {
        match self {
            Expiry::Never => false,
            Expiry::At(t) => *t <= now_secs,
        }
    }
}

impl Serialize for Expiry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Expiry::Never => serializer.serialize_str("never"),
            Expiry::At(t) => serializer.serialize_u64(*t),
        }
    }
}

impl<'de> Deserialize<'de> for Expiry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ExpiryVisitor;

        impl<'de> Visitor<'de> for ExpiryVisitor {
            type Value = Expiry;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "an integer timestamp or the string \"never\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Expiry, E> {
                Ok(Expiry::At(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Expiry, E> {
                u64::try_from(v)
                    .map(Expiry::At)
                    .map_err(|_| de::Error::custom("expires must not be negative"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Expiry, E> {
                if v == "never" {
                    Ok(Expiry::Never)
                } else {
                    Err(de::Error::custom("expires string must be \"never\""))
                }
            }
        }

        deserializer.deserialize_any(ExpiryVisitor)
    }
}

/// One entry of a delegation's permission list, dispatched on `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Permission {
    Contract { chain: u64, contract: Hex20 },
    Bubble { chain: u64, contract: Hex20, provider: String },
}

impl Permission {
    /// `contract`-type matches on `chain`/`contract` alone; `bubble`-type
    /// additionally requires `provider` to match.
    pub fn matches(&self, cid: &ContentId) -> bool {
        match self {
            Permission::Contract { chain, contract } => {
                *chain == cid.chain && *contract == cid.contract
            }
            Permission::Bubble {
                chain,
                contract,
                provider,
            } => *chain == cid.chain && *contract == cid.contract && *provider == cid.provider,
        }
    }
}

/// `"all-permissions"` matches every non-revoked, non-expired content; a
/// list matches only when one of its entries matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permissions {
    All,
    List(Vec<Permission>),
}

impl Permissions {
    pub fn matches(&self, cid: &ContentId) -> bool {
        match self {
            Permissions::All => true,
            Permissions::List(entries) => entries.iter().any(|p| p.matches(cid)),
        }
    }
}

impl Serialize for Permissions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Permissions::All => serializer.serialize_str("all-permissions"),
            Permissions::List(entries) => entries.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PermissionsVisitor;

        impl<'de> Visitor<'de> for PermissionsVisitor {
            type Value = Permissions;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "\"all-permissions\" or a list of permission entries")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Permissions, E> {
                if v == "all-permissions" {
                    Ok(Permissions::All)
                } else {
                    Err(de::Error::custom("permissions string must be \"all-permissions\""))
                }
            }

            fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Permissions, A::Error> {
                let mut entries = Vec::new();
                while let Some(entry) = seq.next_element()? {
                    entries.push(entry);
                }
                Ok(Permissions::List(entries))
            }
        }

        deserializer.deserialize_any(PermissionsVisitor)
    }
}

/// A parsed, structurally-valid delegation packet (signature excluded —
/// recovery and revocation/expiry authorization live in the signature
/// engine and the Guardian respectively).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delegation {
    pub version: u64,
    pub delegate: Hex20,
    pub expires: Expiry,
    pub permissions: Permissions,
}

impl Delegation {
    pub fn is_relevant(&self, now_secs: u64) -> bool {
        !self.expires.is_expired(now_secs)
    }

    pub fn delegate_matches(&self, signer: Hex20) -> bool {
        self.delegate == signer
    }
}

/// Field order mirrors the on-chain struct
/// `Delegation(uint256 version, address delegate, uint256 expires, Permission[] permissions)`,
/// which is also the producer order used for the signable/hash form.
impl Serialize for Delegation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("version", &self.version)?;
        map.serialize_entry("delegate", &self.delegate)?;
        map.serialize_entry("expires", &self.expires)?;
        map.serialize_entry("permissions", &self.permissions)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Delegation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(field_identifier, rename_all = "lowercase")]
        enum Field {
            Version,
            Delegate,
            Expires,
            Permissions,
            /// The delegation's own `signature` (and any other sibling key)
            /// lives alongside these fields in the wire object; it is
            /// recovered separately by the signature engine, not parsed here.
            #[serde(other)]
            Other,
        }

        struct DelegationVisitor;

        impl<'de> Visitor<'de> for DelegationVisitor {
            type Value = Delegation;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a delegation packet")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Delegation, A::Error> {
                let mut version = None;
                let mut delegate = None;
                let mut expires = None;
                let mut permissions = None;

                while let Some(key) = map.next_key::<Field>()? {
                    match key {
                        Field::Version => version = Some(map.next_value()?),
                        Field::Delegate => delegate = Some(map.next_value()?),
                        Field::Expires => expires = Some(map.next_value()?),
                        Field::Permissions => permissions = Some(map.next_value()?),
                        Field::Other => {
                            map.next_value::<de::IgnoredAny>()?;
                        }
                    }
                }

                Ok(Delegation {
                    version: version.ok_or_else(|| de::Error::missing_field("version"))?,
                    delegate: delegate.ok_or_else(|| de::Error::missing_field("delegate"))?,
                    expires: expires.ok_or_else(|| de::Error::missing_field("expires"))?,
                    permissions: permissions
                        .ok_or_else(|| de::Error::missing_field("permissions"))?,
                })
            }
        }

        deserializer.deserialize_map(DelegationVisitor)
    }
}
