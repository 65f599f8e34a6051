//! # reasoncare-store
//!
//! `DocumentStore` implementations for patient records.
//!
//! - `InMemoryDocumentStore` keeps records in a concurrent map (demo default)
//! - `FileDocumentStore` keeps one `patient_<id>.json` per record
//!
//! Both merge shallowly and serialize merges per patient id. `KeyedLocks`
//! is the per-key lock table the file store (and the remote HTTP store in
//! `reasoncare-production`) hold across their read-modify-write.

pub mod file;
pub mod locks;
pub mod memory;

pub use file::FileDocumentStore;
pub use locks::{KeyedGuard, KeyedLocks};
pub use memory::InMemoryDocumentStore;

use reasoncare_contracts::error::{ReasonCareError, ReasonCareResult};

/// Reject patient ids that cannot safely name a record.
///
/// Ids must be non-empty and may not contain path separators or `..`.
pub fn validate_patient_id(id: &str) -> ReasonCareResult<()> {
    if id.trim().is_empty() {
        return Err(ReasonCareError::validation("patient id must not be empty"));
    }
    if id.contains('/') || id.contains('\\') || id.contains("..") {
        return Err(ReasonCareError::validation(format!(
            "patient id '{id}' contains a path separator or '..'"
        )));
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
