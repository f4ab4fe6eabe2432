//! Wire codec for OVC ledger read results.
//!
//! Read-only ledger queries return ordered `(bytes, type tag)` tuples whose
//! payloads are fixed-order, mixed-width binary records. This crate decodes
//! them byte for byte: a bounds-checked [`Cursor`], ULEB128 length prefixes,
//! and a declarative [`RecordSchema`] consumed by one generic decode routine.
//!
//! Field order is load-bearing. A record decoded with fields out of order
//! silently misaligns every subsequent field, so the layouts live in one
//! place ([`schema`]) as ordered field lists rather than as ad-hoc sequential
//! reads scattered through client code.
//!
//! The [`encode`] module is the exact inverse. Production reads never encode;
//! it exists so the in-memory ledger transport and the tests exercise the
//! decoder against genuinely laid-out bytes.

pub mod cursor;
pub mod encode;
pub mod error;
pub mod schema;
pub mod value;

pub use cursor::Cursor;
pub use encode::Encoder;
pub use error::{WireError, WireResult};
pub use schema::{
    commit_record_schema, decode_address_value, decode_address_vector, decode_commit,
    decode_repository, repository_record_schema, Field, Record, RecordSchema,
};
pub use value::{ReturnValue, WireType, WireValue};
