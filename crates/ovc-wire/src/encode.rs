//! The inverse of the decode path.
//!
//! Production clients only ever decode; the ledger lays out these bytes.
//! The encoder exists for the in-memory transport double and for tests, so
//! the decoder is exercised against real field layouts rather than fixtures
//! written by hand.

use ovc_types::{Address, Commit, Repository};

use crate::schema::{ADDRESS_TAG, ADDRESS_VECTOR_TAG, REPOSITORY_TAG, VERSION_TAG};
use crate::value::ReturnValue;

/// Append-only byte builder mirroring [`Cursor`](crate::Cursor) reads.
#[derive(Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish and take the bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_uleb128(&mut self, mut value: u64) -> &mut Self {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.buf.push(byte);
                return self;
            }
            self.buf.push(byte | 0x80);
        }
    }

    pub fn write_string(&mut self, s: &str) -> &mut Self {
        self.write_uleb128(s.len() as u64);
        self.buf.extend_from_slice(s.as_bytes());
        self
    }

    pub fn write_address(&mut self, addr: &Address) -> &mut Self {
        self.buf.extend_from_slice(addr.as_bytes());
        self
    }

    pub fn write_u64(&mut self, value: u64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_bool(&mut self, value: bool) -> &mut Self {
        self.buf.push(u8::from(value));
        self
    }

    pub fn write_vector<T>(
        &mut self,
        items: &[T],
        mut write: impl FnMut(&mut Self, &T),
    ) -> &mut Self {
        self.write_uleb128(items.len() as u64);
        for item in items {
            write(self, item);
        }
        self
    }
}

/// Encode a commit in the version-record layout.
pub fn encode_commit(commit: &Commit) -> ReturnValue {
    let mut enc = Encoder::new();
    enc.write_string(commit.root_tree.as_str())
        .write_vector(&commit.parents, |e, p| {
            e.write_address(&p.address());
        })
        .write_address(&commit.author)
        .write_u64(commit.timestamp_secs)
        .write_string(&commit.message)
        .write_address(&commit.id.address());
    ReturnValue::new(enc.into_bytes(), VERSION_TAG)
}

/// Encode a repository in the repository-record layout.
pub fn encode_repository(repo: &Repository) -> ReturnValue {
    let names: Vec<&String> = repo.branch_heads.keys().collect();
    let targets: Vec<Address> = repo.branch_heads.values().map(|c| c.address()).collect();
    let mut enc = Encoder::new();
    enc.write_string(&repo.name)
        .write_address(&repo.owner)
        .write_vector(&names, |e, n| {
            e.write_string(n);
        })
        .write_vector(&targets, |e, t| {
            e.write_address(t);
        })
        .write_u64(repo.commit_count)
        .write_address(&repo.id.address());
    ReturnValue::new(enc.into_bytes(), REPOSITORY_TAG)
}

/// Encode a bare address result.
pub fn encode_address(addr: &Address) -> ReturnValue {
    ReturnValue::new(addr.as_bytes().to_vec(), ADDRESS_TAG)
}

/// Encode an address-vector result.
pub fn encode_address_vector(addrs: &[Address]) -> ReturnValue {
    let mut enc = Encoder::new();
    enc.write_vector(addrs, |e, a| {
        e.write_address(a);
    });
    ReturnValue::new(enc.into_bytes(), ADDRESS_VECTOR_TAG)
}
