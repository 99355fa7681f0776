//! Schema validation applied at the storage boundary.

/// Structural invariants a persisted record must satisfy after
/// deserialization.
///
/// The storage adapter runs this check on every read and treats a failure
/// the same as an absent key, so callers can always reinitialize from
/// nothing instead of trusting a partially valid record.
pub trait Validate {
    type Error: std::error::Error;

    /// Checks invariants that the serialization format cannot express.
    ///
    /// # Errors
    ///
    /// Returns the record's validation error when an invariant is violated.
    fn validate(&self) -> Result<(), Self::Error>;
}
