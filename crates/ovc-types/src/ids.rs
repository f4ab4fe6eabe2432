//! Typed wrappers over [`Address`] plus the opaque blob id.
//!
//! OVC never passes bare addresses around: a repository id, a commit id, and
//! a write capability are different things even though they share a wire
//! representation, and mixing them up should not compile.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::TypeError;

macro_rules! address_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub Address);

        impl $name {
            /// The underlying ledger address.
            pub fn address(&self) -> Address {
                self.0
            }

            /// Full `0x`-prefixed hex representation.
            pub fn to_hex(&self) -> String {
                self.0.to_hex()
            }

            /// Short representation for logs and CLI output.
            pub fn short_hex(&self) -> String {
                self.0.short_hex()
            }

            /// Parse from a hex string, with or without the `0x` prefix.
            pub fn from_hex(s: &str) -> Result<Self, TypeError> {
                Ok(Self(Address::from_hex(s)?))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0.short_hex())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Address> for $name {
            fn from(addr: Address) -> Self {
                Self(addr)
            }
        }
    };
}

address_newtype! {
    /// Identifier of a repository object on the ledger.
    RepoId
}

address_newtype! {
    /// Identifier of an immutable commit (version) record on the ledger.
    CommitId
}

address_newtype! {
    /// Opaque write-authorization token bound to one repository.
    ///
    /// Possession of the capability is what authorizes mutating calls; the
    /// ledger enforces nothing beyond it.
    Capability
}

/// Opaque identifier assigned by the blob store on first write.
///
/// Blob ids are never interpreted locally. Repeated uploads of identical
/// bytes may return the same id or a fresh one; callers must not assume
/// uniqueness either way.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlobId(pub String);

impl BlobId {
    /// Create from the store's string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobId({})", self.0)
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BlobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BlobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
