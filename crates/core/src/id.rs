//! Strongly-typed record identifiers.
//!
//! Every record kind gets its own newtype over a positive `i64` so a partner id
//! can never be passed where a product id is expected.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Common behaviour of store-assigned record identifiers.
pub trait RecordId: Copy + Ord + core::hash::Hash + core::fmt::Debug + Send + Sync {
    /// Wrap a raw identifier assigned by a store. Not validated.
    fn from_raw(raw: i64) -> Self;

    /// The raw identifier value.
    fn get(self) -> i64;
}

/// Identifier of a partner (customer) record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartnerId(i64);

/// Identifier of a product record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

/// Identifier of a currency record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyId(i64);

/// Identifier of a country record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryId(i64);

/// Identifier of a country state (region) record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(i64);

/// Identifier of an invoice (move) record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(i64);

macro_rules! impl_record_id {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Create an identifier from caller-supplied input.
            ///
            /// Identifiers are strictly positive.
            pub fn new(raw: i64) -> Result<Self, DomainError> {
                if raw <= 0 {
                    return Err(DomainError::invalid_id(format!(
                        "{}: must be positive, got {}",
                        $name, raw
                    )));
                }
                Ok(Self(raw))
            }
        }

        impl RecordId for $t {
            fn from_raw(raw: i64) -> Self {
                Self(raw)
            }

            fn get(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Self::new(raw)
            }
        }
    };
}

impl_record_id!(PartnerId, "PartnerId");
impl_record_id!(ProductId, "ProductId");
impl_record_id!(CurrencyId, "CurrencyId");
impl_record_id!(CountryId, "CountryId");
impl_record_id!(StateId, "StateId");
impl_record_id!(InvoiceId, "InvoiceId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_ids() {
        assert!(PartnerId::new(0).is_err());
        assert!(ProductId::new(-3).is_err());
        assert_eq!(CurrencyId::new(7).unwrap().get(), 7);
    }

    #[test]
    fn parses_from_trimmed_string() {
        let id: PartnerId = " 42 ".parse().unwrap();
        assert_eq!(id.get(), 42);

        let err = "abc".parse::<ProductId>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
    }

    #[test]
    fn serializes_transparently() {
        let id = InvoiceId::from_raw(12);
        assert_eq!(serde_json::to_value(id).unwrap(), serde_json::json!(12));
    }
}
