use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use intake_core::{
    CountryId, CurrencyId, Entity, InvoiceId, PartnerId, ProductId, RecordId, StateId,
};
use intake_invoicing::{Currency, Invoice, NewInvoice};
use intake_parties::{Country, CountryState, NewPartner, Partner, PartnerMatch};
use intake_products::{NewProduct, Product};

use super::{DEFAULT_CURRENCIES, RecordStore, StoreError, StoreResult, StoreTransaction};

/// Rows of one record kind, keyed by id, with a monotonically increasing
/// id sequence.
#[derive(Debug, Clone)]
struct Table<T: Entity> {
    rows: BTreeMap<T::Id, T>,
    last_id: i64,
}

impl<T: Entity> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T: Entity + Clone> Table<T> {
    fn insert_with(&mut self, build: impl FnOnce(T::Id) -> T) -> T::Id {
        self.last_id += 1;
        let id = T::Id::from_raw(self.last_id);
        self.rows.insert(id, build(id));
        id
    }

    fn contains(&self, id: T::Id) -> bool {
        self.rows.contains_key(&id)
    }

    /// First match in id order, so ties resolve to the lowest id.
    fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T::Id> {
        self.rows.values().find(|row| pred(row)).map(Entity::id)
    }

    fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }
}

#[derive(Debug, Clone, Default)]
struct Tables {
    partners: Table<Partner>,
    countries: Table<Country>,
    states: Table<CountryState>,
    currencies: Table<Currency>,
    products: Table<Product>,
    invoices: Table<Invoice>,
}

impl Tables {
    fn insert_partner(&mut self, partner: &NewPartner) -> StoreResult<PartnerId> {
        partner
            .validate()
            .map_err(|e| StoreError::Constraint(format!("partner: {e}")))?;
        if let Some(country_id) = partner.address.country_id {
            if !self.countries.contains(country_id) {
                return Err(StoreError::ForeignKey(format!("country {country_id}")));
            }
        }
        if let Some(state_id) = partner.address.state_id {
            if !self.states.contains(state_id) {
                return Err(StoreError::ForeignKey(format!("state {state_id}")));
            }
        }
        Ok(self
            .partners
            .insert_with(|id| Partner::from_new(id, partner.clone())))
    }

    fn insert_product(&mut self, product: &NewProduct) -> StoreResult<ProductId> {
        product
            .validate()
            .map_err(|e| StoreError::Constraint(format!("product: {e}")))?;
        Ok(self
            .products
            .insert_with(|id| Product::from_new(id, product.clone())))
    }

    fn insert_invoice(&mut self, invoice: &NewInvoice) -> StoreResult<InvoiceId> {
        if invoice.lines.is_empty() {
            return Err(StoreError::Constraint("invoice has no lines".to_string()));
        }
        if !self.partners.contains(invoice.partner_id) {
            return Err(StoreError::ForeignKey(format!("partner {}", invoice.partner_id)));
        }
        if !self.currencies.contains(invoice.currency_id) {
            return Err(StoreError::ForeignKey(format!("currency {}", invoice.currency_id)));
        }
        for line in &invoice.lines {
            if !self.products.contains(line.product_id) {
                return Err(StoreError::ForeignKey(format!("product {}", line.product_id)));
            }
        }
        Ok(self.invoices.insert_with(|id| Invoice {
            id,
            fields: invoice.clone(),
        }))
    }
}

/// In-memory record store.
///
/// Intended for tests/dev. Transactions are serialised: `begin` holds the
/// store lock until the transaction commits, rolls back or is dropped, and
/// writes are staged on a copy of the tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with [`DEFAULT_CURRENCIES`].
    pub fn with_default_currencies() -> Self {
        let mut tables = Tables::default();
        for (code, full_name, symbol) in DEFAULT_CURRENCIES {
            tables.currencies.insert_with(|id| Currency {
                id,
                code: code.to_string(),
                full_name: full_name.to_string(),
                symbol: symbol.to_string(),
            });
        }
        Self {
            tables: Arc::new(Mutex::new(tables)),
        }
    }

    pub async fn insert_currency(&self, code: &str, full_name: &str, symbol: &str) -> CurrencyId {
        self.tables.lock().await.currencies.insert_with(|id| Currency {
            id,
            code: code.to_string(),
            full_name: full_name.to_string(),
            symbol: symbol.to_string(),
        })
    }

    pub async fn insert_country(&self, name: &str, code: &str) -> CountryId {
        self.tables.lock().await.countries.insert_with(|id| Country {
            id,
            name: name.to_string(),
            code: code.to_string(),
        })
    }

    pub async fn insert_state(&self, country_id: CountryId, name: &str, code: &str) -> StateId {
        self.tables.lock().await.states.insert_with(|id| CountryState {
            id,
            country_id,
            name: name.to_string(),
            code: code.to_string(),
        })
    }

    pub async fn insert_partner(&self, partner: &NewPartner) -> StoreResult<PartnerId> {
        self.tables.lock().await.insert_partner(partner)
    }

    pub async fn insert_product(&self, product: &NewProduct) -> StoreResult<ProductId> {
        self.tables.lock().await.insert_product(product)
    }

    /// Committed partners, in id order.
    pub async fn partners(&self) -> Vec<Partner> {
        self.tables.lock().await.partners.all()
    }

    /// Committed products, in id order.
    pub async fn products(&self) -> Vec<Product> {
        self.tables.lock().await.products.all()
    }

    /// Committed invoices, in id order.
    pub async fn invoices(&self) -> Vec<Invoice> {
        self.tables.lock().await.invoices.all()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryTransaction { guard, working }))
    }
}

/// Transaction over an [`InMemoryRecordStore`].
pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    async fn partner_exists(&mut self, id: PartnerId) -> StoreResult<bool> {
        Ok(self.working.partners.contains(id))
    }

    async fn find_partner(&mut self, criteria: &PartnerMatch) -> StoreResult<Option<PartnerId>> {
        Ok(self.working.partners.find(|p| criteria.matches(p)))
    }

    async fn create_partner(&mut self, partner: &NewPartner) -> StoreResult<PartnerId> {
        self.working.insert_partner(partner)
    }

    async fn find_country(&mut self, name: &str) -> StoreResult<Option<CountryId>> {
        Ok(self.working.countries.find(|c| c.name == name))
    }

    async fn find_state(
        &mut self,
        name: &str,
        country_id: Option<CountryId>,
    ) -> StoreResult<Option<StateId>> {
        Ok(self.working.states.find(|s| s.matches(name, country_id)))
    }

    async fn currency_exists(&mut self, id: CurrencyId) -> StoreResult<bool> {
        Ok(self.working.currencies.contains(id))
    }

    async fn find_currency(&mut self, code_or_name: &str) -> StoreResult<Option<CurrencyId>> {
        Ok(self.working.currencies.find(|c| c.matches(code_or_name)))
    }

    async fn product_exists(&mut self, id: ProductId) -> StoreResult<bool> {
        Ok(self.working.products.contains(id))
    }

    async fn find_product(&mut self, name: &str) -> StoreResult<Option<ProductId>> {
        Ok(self.working.products.find(|p| p.name == name))
    }

    async fn create_product(&mut self, product: &NewProduct) -> StoreResult<ProductId> {
        self.working.insert_product(product)
    }

    async fn create_invoice(&mut self, invoice: &NewInvoice) -> StoreResult<InvoiceId> {
        self.working.insert_invoice(invoice)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let InMemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}
