use serde::{Deserialize, Serialize};

use intake_core::{CurrencyId, Entity};

/// Currency reference record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub id: CurrencyId,
    /// ISO 4217 code, e.g. `"USD"`.
    pub code: String,
    pub full_name: String,
    pub symbol: String,
}

impl Currency {
    /// Exact match on the code or the full name.
    pub fn matches(&self, code_or_name: &str) -> bool {
        self.code == code_or_name || self.full_name == code_or_name
    }
}

impl Entity for Currency {
    type Id = CurrencyId;

    fn id(&self) -> CurrencyId {
        self.id
    }
}
