//! Country and state reference records.
//!
//! These are looked up by name while reconciling a customer address and are
//! never created by the intake service.

use serde::{Deserialize, Serialize};

use intake_core::{CountryId, Entity, StateId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    pub name: String,
    /// ISO 3166-1 alpha-2 code.
    pub code: String,
}

impl Entity for Country {
    type Id = CountryId;

    fn id(&self) -> CountryId {
        self.id
    }
}

/// A state, province or region within a country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryState {
    pub id: StateId,
    pub country_id: CountryId,
    pub name: String,
    pub code: String,
}

impl Entity for CountryState {
    type Id = StateId;

    fn id(&self) -> StateId {
        self.id
    }
}

impl CountryState {
    /// Exact name match, optionally restricted to one country.
    pub fn matches(&self, name: &str, country_id: Option<CountryId>) -> bool {
        self.name == name && country_id.is_none_or(|c| c == self.country_id)
    }
}
