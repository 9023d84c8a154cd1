//! Structural hashing for value types and function signatures.
//!
//! Types are hashed structurally - record field names are included, record
//! type names are not. Two signatures with the same parameter and result
//! shapes hash identically no matter what the records are called.
//!
//! - Primitives hash their tag byte
//! - Compound types hash their components: `hash(list<T>) = hash(LIST, hash(T))`
//! - Functions hash the counts and hashes of params and results, in order

use sha2::{Digest, Sha256};

use crate::ValueType;

/// A 256-bit type hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeHash([u8; 32]);

impl TypeHash {
    /// Create a TypeHash from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Format as hex string (for debugging).
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

// ============================================================================
// Hash Builder
// ============================================================================

/// Builder for computing type hashes.
pub struct TypeHasher {
    hasher: Sha256,
}

impl TypeHasher {
    /// Create a new hasher.
    pub fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    /// Add a tag byte (identifies the kind of construct being hashed).
    pub fn tag(mut self, tag: u8) -> Self {
        self.hasher.update([tag]);
        self
    }

    /// Add a string (length-prefixed).
    pub fn string(mut self, s: &str) -> Self {
        self.hasher.update((s.len() as u32).to_le_bytes());
        self.hasher.update(s.as_bytes());
        self
    }

    /// Add a child type hash.
    pub fn child(mut self, hash: &TypeHash) -> Self {
        self.hasher.update(hash.as_bytes());
        self
    }

    /// Add a count (for lists of children).
    pub fn count(mut self, n: usize) -> Self {
        self.hasher.update((n as u32).to_le_bytes());
        self
    }

    /// Finalize and return the hash.
    pub fn finish(self) -> TypeHash {
        let result = self.hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&result);
        TypeHash(bytes)
    }
}

impl Default for TypeHasher {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Hash Tags (identifies type constructors)
// ============================================================================

const TAG_BOOL: u8 = 0x01;
const TAG_U8: u8 = 0x02;
const TAG_U16: u8 = 0x03;
const TAG_U32: u8 = 0x04;
const TAG_U64: u8 = 0x05;
const TAG_S8: u8 = 0x06;
const TAG_S16: u8 = 0x07;
const TAG_S32: u8 = 0x08;
const TAG_S64: u8 = 0x09;
const TAG_F32: u8 = 0x0a;
const TAG_F64: u8 = 0x0b;
const TAG_CHAR: u8 = 0x0c;
const TAG_STRING: u8 = 0x0d;
const TAG_ERROR: u8 = 0x0e;

const TAG_LIST: u8 = 0x10;
const TAG_OPTION: u8 = 0x11;
const TAG_TUPLE: u8 = 0x13;
const TAG_RECORD: u8 = 0x14;
const TAG_FUNCTION: u8 = 0x16;

/// Hash a single type descriptor.
pub fn hash_type(ty: &ValueType) -> TypeHash {
    let primitive = |tag| TypeHasher::new().tag(tag).finish();
    match ty {
        ValueType::Bool => primitive(TAG_BOOL),
        ValueType::U8 => primitive(TAG_U8),
        ValueType::U16 => primitive(TAG_U16),
        ValueType::U32 => primitive(TAG_U32),
        ValueType::U64 => primitive(TAG_U64),
        ValueType::S8 => primitive(TAG_S8),
        ValueType::S16 => primitive(TAG_S16),
        ValueType::S32 => primitive(TAG_S32),
        ValueType::S64 => primitive(TAG_S64),
        ValueType::F32 => primitive(TAG_F32),
        ValueType::F64 => primitive(TAG_F64),
        ValueType::Char => primitive(TAG_CHAR),
        ValueType::String => primitive(TAG_STRING),
        ValueType::Error => primitive(TAG_ERROR),
        ValueType::List(elem) => TypeHasher::new()
            .tag(TAG_LIST)
            .child(&hash_type(elem))
            .finish(),
        ValueType::Option(inner) => TypeHasher::new()
            .tag(TAG_OPTION)
            .child(&hash_type(inner))
            .finish(),
        ValueType::Tuple(items) => {
            let mut hasher = TypeHasher::new().tag(TAG_TUPLE).count(items.len());
            for item in items {
                hasher = hasher.child(&hash_type(item));
            }
            hasher.finish()
        }
        ValueType::Record { fields, .. } => {
            let mut hasher = TypeHasher::new().tag(TAG_RECORD).count(fields.len());
            for (name, field) in fields {
                hasher = hasher.string(name).child(&hash_type(field));
            }
            hasher.finish()
        }
    }
}

/// Hash a function signature: `func(params) -> (results)`.
pub fn hash_function(params: &[ValueType], results: &[ValueType]) -> TypeHash {
    let mut hasher = TypeHasher::new().tag(TAG_FUNCTION).count(params.len());

    for param in params {
        hasher = hasher.child(&hash_type(param));
    }

    hasher = hasher.count(results.len());
    for result in results {
        hasher = hasher.child(&hash_type(result));
    }

    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, fields: &[(&str, ValueType)]) -> ValueType {
        ValueType::Record {
            name: name.to_string(),
            fields: fields
                .iter()
                .map(|(n, t)| (n.to_string(), t.clone()))
                .collect(),
        }
    }

    #[test]
    fn record_names_do_not_affect_hash() {
        let point = record("point", &[("x", ValueType::S32), ("y", ValueType::S32)]);
        let vec2 = record("vec2", &[("x", ValueType::S32), ("y", ValueType::S32)]);
        assert_eq!(hash_type(&point), hash_type(&vec2));
    }

    #[test]
    fn field_names_affect_hash() {
        let a = record("r", &[("x", ValueType::S32)]);
        let b = record("r", &[("y", ValueType::S32)]);
        assert_ne!(hash_type(&a), hash_type(&b));
    }

    #[test]
    fn params_and_results_are_not_interchangeable() {
        let a = hash_function(&[ValueType::S32], &[]);
        let b = hash_function(&[], &[ValueType::S32]);
        assert_ne!(a, b);
    }

    #[test]
    fn hex_is_64_chars() {
        assert_eq!(hash_type(&ValueType::Bool).to_hex().len(), 64);
    }
}
