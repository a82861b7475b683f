//! Canonical serialization for deterministic fingerprints.
//!
//! Two documents that encode to the same NAF text, or two stores with the same
//! per-layer counts, get the same fingerprint on every platform.
//!
//! ## Determinism Guarantees
//!
//! - Stable field order: struct fields serialize in declaration order
//! - Stable Vec order: layers serialize in document order
//! - Documents are fingerprinted from their compact encoding, so comments and
//!   indentation never change the hash

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

use crate::codec::CodecConfig;
use crate::document::Document;
use crate::error::{NafError, Result};

/// Serialize a value to canonical JSON bytes for hashing.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| NafError::InvalidValue {
        field: "canonical".into(),
        reason: e.to_string(),
    })
}

/// Compute the canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> Result<u64> {
    Ok(xxh64(&to_canonical_bytes(value)?, 0))
}

/// Compute the canonical hash and return it as a hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> Result<String> {
    Ok(format!("{:016x}", canonical_hash(value)?))
}

/// Fingerprint of a document's content.
pub fn document_hash(doc: &Document) -> u64 {
    xxh64(doc.to_naf_string_with(&CodecConfig::compact()).as_bytes(), 0)
}

/// [`document_hash`] as a hex string.
pub fn document_hash_hex(doc: &Document) -> String {
    format!("{:016x}", document_hash(doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Span;

    fn doc(forms: &[&str]) -> Document {
        let mut doc = Document::new("en", "v3");
        for form in forms {
            let id = doc.new_wf(*form, 1).unwrap().id().clone();
            doc.new_term(Span::from_targets(vec![id])).unwrap();
        }
        doc
    }

    #[test]
    fn test_determinism() {
        let counts = doc(&["John", "loves", "Mary"]).store().counts();
        let h1 = canonical_hash(&counts).unwrap();
        let h2 = canonical_hash(&counts).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(canonical_hash_hex(&counts).unwrap().len(), 16);
    }

    #[test]
    fn test_document_hash_ignores_layout() {
        let a = doc(&["John", "loves", "Mary"]);
        let reloaded: Document = a.to_naf_string().parse().unwrap();
        assert_eq!(document_hash(&a), document_hash(&reloaded));
        assert_ne!(document_hash_hex(&a), document_hash_hex(&doc(&["John", "hates", "Mary"])));
    }
}
