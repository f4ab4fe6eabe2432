//! Declarative record layouts and the generic decode routine.
//!
//! Each ledger record is described once as an ordered list of named fields.
//! Decoding walks that list with a single routine, so a layout change is a
//! one-line schema edit instead of a hunt through sequential reads, and a
//! field-order mistake shows up as a structured decode failure rather than
//! as silently misaligned values.

use std::collections::BTreeMap;

use ovc_types::{Address, Commit, CommitId, RepoId, Repository};

use crate::cursor::Cursor;
use crate::error::{WireError, WireResult};
use crate::value::{ReturnValue, WireType, WireValue};

/// Type tag reported for version (commit) records.
pub const VERSION_TAG: &str = "vcs::repo::Version";
/// Type tag reported for repository records.
pub const REPOSITORY_TAG: &str = "vcs::repo::Repository";
/// Type tag reported for bare address results.
pub const ADDRESS_TAG: &str = "address";
/// Type tag reported for address-vector results.
pub const ADDRESS_VECTOR_TAG: &str = "vector<address>";

/// One named field in a record layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub ty: WireType,
}

impl Field {
    pub fn new(name: &'static str, ty: WireType) -> Self {
        Self { name, ty }
    }
}

/// An ordered record layout with a version tag.
#[derive(Clone, Debug)]
pub struct RecordSchema {
    /// Record name, used in error messages.
    pub name: &'static str,
    /// Expected type tag on the return tuple.
    pub type_tag: &'static str,
    /// Layout version. Bumped whenever the field list changes.
    pub version: u32,
    /// Fields in exact wire order.
    pub fields: Vec<Field>,
}

impl RecordSchema {
    /// Decode `value` against this schema.
    ///
    /// Fails on a mismatched type tag, on any field reading past the end of
    /// the buffer, and on bytes left over after the last field — a record
    /// either decodes completely or not at all.
    pub fn decode(&self, value: &ReturnValue) -> WireResult<Record> {
        if value.tag != self.type_tag {
            return Err(WireError::UnexpectedTag {
                record: self.name,
                expected: self.type_tag,
                actual: value.tag.clone(),
            });
        }
        let mut cursor = Cursor::new(&value.bytes);
        let mut values = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            values.push(WireValue::decode(&mut cursor, &field.ty)?);
        }
        if !cursor.is_exhausted() {
            return Err(WireError::TrailingBytes {
                record: self.name,
                remaining: cursor.remaining(),
            });
        }
        Ok(Record {
            schema_name: self.name,
            fields: self
                .fields
                .iter()
                .map(|f| f.name)
                .zip(values)
                .collect(),
        })
    }
}

/// A fully decoded record: field name → value, in schema order.
#[derive(Clone, Debug)]
pub struct Record {
    schema_name: &'static str,
    fields: Vec<(&'static str, WireValue)>,
}

impl Record {
    /// Look up a field by name.
    pub fn get(&self, name: &'static str) -> WireResult<&WireValue> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
            .ok_or(WireError::InvalidRecord {
                record: self.schema_name,
                reason: format!("missing field {name}"),
            })
    }

    fn str_field(&self, name: &'static str) -> WireResult<String> {
        self.typed(name, |v| v.as_str().map(str::to_string))
    }

    fn address_field(&self, name: &'static str) -> WireResult<Address> {
        self.typed(name, WireValue::as_address)
    }

    fn u64_field(&self, name: &'static str) -> WireResult<u64> {
        self.typed(name, WireValue::as_u64)
    }

    fn typed<T>(
        &self,
        name: &'static str,
        extract: impl Fn(&WireValue) -> Option<T>,
    ) -> WireResult<T> {
        extract(self.get(name)?).ok_or(WireError::InvalidRecord {
            record: self.schema_name,
            reason: format!("field {name} has the wrong wire type"),
        })
    }
}

/// Layout of a version (commit) record.
///
/// Field order here is the single source of truth for the read path; it
/// must match the ledger byte for byte.
pub fn commit_record_schema() -> RecordSchema {
    RecordSchema {
        name: "version",
        type_tag: VERSION_TAG,
        version: 1,
        fields: vec![
            Field::new("root_blob_id", WireType::Str),
            Field::new("parents", WireType::vector(WireType::Address)),
            Field::new("author", WireType::Address),
            Field::new("timestamp", WireType::U64),
            Field::new("message", WireType::Str),
            Field::new("version_id", WireType::Address),
        ],
    }
}

/// Layout of a repository record.
pub fn repository_record_schema() -> RecordSchema {
    RecordSchema {
        name: "repository",
        type_tag: REPOSITORY_TAG,
        version: 1,
        fields: vec![
            Field::new("name", WireType::Str),
            Field::new("owner", WireType::Address),
            Field::new("branch_names", WireType::vector(WireType::Str)),
            Field::new("branch_targets", WireType::vector(WireType::Address)),
            Field::new("commit_count", WireType::U64),
            Field::new("repo_id", WireType::Address),
        ],
    }
}

/// Decode a version record into a [`Commit`].
pub fn decode_commit(value: &ReturnValue) -> WireResult<Commit> {
    let record = commit_record_schema().decode(value)?;
    let parents = record
        .get("parents")?
        .as_vector()
        .ok_or(WireError::InvalidRecord {
            record: "version",
            reason: "parents is not a vector".into(),
        })?
        .iter()
        .map(|v| {
            v.as_address().map(CommitId).ok_or(WireError::InvalidRecord {
                record: "version",
                reason: "parent element is not an address".into(),
            })
        })
        .collect::<WireResult<Vec<_>>>()?;
    Ok(Commit {
        id: CommitId(record.address_field("version_id")?),
        root_tree: record.str_field("root_blob_id")?.into(),
        parents,
        author: record.address_field("author")?,
        timestamp_secs: record.u64_field("timestamp")?,
        message: record.str_field("message")?,
    })
}

/// Decode a repository record into a [`Repository`].
///
/// Branch heads arrive as two parallel vectors (names and targets); a length
/// mismatch is a corrupt record, not something to zip-truncate over.
pub fn decode_repository(value: &ReturnValue) -> WireResult<Repository> {
    let record = repository_record_schema().decode(value)?;
    let names = record.get("branch_names")?.as_vector().unwrap_or(&[]);
    let targets = record.get("branch_targets")?.as_vector().unwrap_or(&[]);
    if names.len() != targets.len() {
        return Err(WireError::InvalidRecord {
            record: "repository",
            reason: format!(
                "{} branch names but {} targets",
                names.len(),
                targets.len()
            ),
        });
    }
    let mut branch_heads = BTreeMap::new();
    for (name, target) in names.iter().zip(targets) {
        let (name, target) = match (name.as_str(), target.as_address()) {
            (Some(n), Some(t)) => (n.to_string(), CommitId(t)),
            _ => {
                return Err(WireError::InvalidRecord {
                    record: "repository",
                    reason: "branch vectors carry the wrong element types".into(),
                })
            }
        };
        branch_heads.insert(name, target);
    }
    Ok(Repository {
        id: RepoId(record.address_field("repo_id")?),
        name: record.str_field("name")?,
        owner: record.address_field("owner")?,
        branch_heads,
        commit_count: record.u64_field("commit_count")?,
    })
}

/// Decode a bare address result (e.g. a branch-head query).
pub fn decode_address_value(value: &ReturnValue) -> WireResult<Address> {
    if value.tag != ADDRESS_TAG {
        return Err(WireError::UnexpectedTag {
            record: "address",
            expected: ADDRESS_TAG,
            actual: value.tag.clone(),
        });
    }
    let mut cursor = Cursor::new(&value.bytes);
    let addr = cursor.read_address()?;
    if !cursor.is_exhausted() {
        return Err(WireError::TrailingBytes {
            record: "address",
            remaining: cursor.remaining(),
        });
    }
    Ok(addr)
}

/// Decode an address-vector result (e.g. repositories-by-owner).
pub fn decode_address_vector(value: &ReturnValue) -> WireResult<Vec<Address>> {
    if value.tag != ADDRESS_VECTOR_TAG {
        return Err(WireError::UnexpectedTag {
            record: "address vector",
            expected: ADDRESS_VECTOR_TAG,
            actual: value.tag.clone(),
        });
    }
    let mut cursor = Cursor::new(&value.bytes);
    let count = cursor.read_uleb128()?;
    let mut out = Vec::with_capacity(count.min(4096) as usize);
    for _ in 0..count {
        out.push(cursor.read_address()?);
    }
    if !cursor.is_exhausted() {
        return Err(WireError::TrailingBytes {
            record: "address vector",
            remaining: cursor.remaining(),
        });
    }
    Ok(out)
}
