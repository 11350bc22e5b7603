//! Entity trait: persisted records addressed by a typed id.

use crate::id::RecordId;

/// A persisted record with a store-assigned identifier.
pub trait Entity {
    /// Strongly-typed record identifier.
    type Id: RecordId;

    /// Returns the record identifier.
    fn id(&self) -> Self::Id;
}
