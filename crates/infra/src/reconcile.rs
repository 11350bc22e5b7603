//! Resolve the references of a validated request to record ids.
//!
//! Runs inside the request's transaction. Currency, partner ids and product
//! ids must exist; customers and products given by name are matched or
//! created; country and state names that match nothing are dropped.

use intake_core::{CountryId, CurrencyId, PartnerId, ProductId, StateId};
use intake_invoicing::{
    CurrencyRef, IntakeError, InvoiceRequest, PartnerRef, ProductRef, RequestLine,
    ResolvedReferences,
};
use intake_parties::CustomerDetails;
use intake_products::NewProduct;

use crate::store::StoreTransaction;

/// Result of reconciling one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub refs: ResolvedReferences,
    /// Partner matched or created from customer details; `None` when the
    /// request referenced a partner by id.
    pub customer_id: Option<PartnerId>,
}

/// Resolve every reference in `request`.
///
/// Currency goes first so an unknown currency fails before anything is
/// created.
pub async fn reconcile(
    tx: &mut dyn StoreTransaction,
    request: &InvoiceRequest,
) -> Result<Reconciliation, IntakeError> {
    let currency_id = resolve_currency(tx, &request.currency).await?;
    let (partner_id, customer_id) = match &request.partner {
        PartnerRef::Id(id) => (resolve_partner_id(tx, *id).await?, None),
        PartnerRef::Customer(details) => {
            let id = resolve_customer(tx, details).await?;
            (id, Some(id))
        }
    };
    let product_ids = resolve_products(tx, &request.lines).await?;

    Ok(Reconciliation {
        refs: ResolvedReferences {
            partner_id,
            currency_id,
            product_ids,
        },
        customer_id,
    })
}

pub async fn resolve_currency(
    tx: &mut dyn StoreTransaction,
    currency: &CurrencyRef,
) -> Result<CurrencyId, IntakeError> {
    let found = match currency {
        CurrencyRef::Id(id) => tx.currency_exists(*id).await?.then_some(*id),
        CurrencyRef::Code(code) => tx.find_currency(code).await?,
    };
    found.ok_or_else(|| IntakeError::unresolved(format!("Currency {currency} not found")))
}

async fn resolve_partner_id(
    tx: &mut dyn StoreTransaction,
    id: PartnerId,
) -> Result<PartnerId, IntakeError> {
    if tx.partner_exists(id).await? {
        Ok(id)
    } else {
        Err(IntakeError::unresolved(format!("Partner {id} not found")))
    }
}

/// Match the customer by email or mobile, or create it.
pub async fn resolve_customer(
    tx: &mut dyn StoreTransaction,
    details: &CustomerDetails,
) -> Result<PartnerId, IntakeError> {
    if let Some(criteria) = details.match_criteria() {
        if let Some(id) = tx.find_partner(&criteria).await? {
            tracing::info!(partner_id = %id, "matched existing customer");
            return Ok(id);
        }
    }

    let country_id = resolve_country(tx, details.country.as_deref()).await?;
    let state_id = resolve_state(tx, details.state.as_deref(), country_id).await?;
    let id = tx
        .create_partner(&details.to_new_partner(country_id, state_id))
        .await?;
    tracing::info!(
        partner_id = %id,
        country_resolved = country_id.is_some(),
        state_resolved = state_id.is_some(),
        "created customer"
    );
    Ok(id)
}

async fn resolve_country(
    tx: &mut dyn StoreTransaction,
    name: Option<&str>,
) -> Result<Option<CountryId>, IntakeError> {
    let Some(name) = name else {
        return Ok(None);
    };
    let found = tx.find_country(name).await?;
    if found.is_none() {
        tracing::debug!(country = name, "country not found, leaving unset");
    }
    Ok(found)
}

async fn resolve_state(
    tx: &mut dyn StoreTransaction,
    name: Option<&str>,
    country_id: Option<CountryId>,
) -> Result<Option<StateId>, IntakeError> {
    let Some(name) = name else {
        return Ok(None);
    };
    let found = tx.find_state(name, country_id).await?;
    if found.is_none() {
        tracing::debug!(state = name, "state not found, leaving unset");
    }
    Ok(found)
}

/// Resolve line products in order.
///
/// Products created for an earlier line are visible to later lookups
/// through the transaction, so a repeated name resolves to one product.
pub async fn resolve_products(
    tx: &mut dyn StoreTransaction,
    lines: &[RequestLine],
) -> Result<Vec<ProductId>, IntakeError> {
    let mut ids = Vec::with_capacity(lines.len());
    for line in lines {
        let id = match &line.product {
            ProductRef::Id(id) => {
                if !tx.product_exists(*id).await? {
                    return Err(IntakeError::unresolved(format!("Product {id} not found")));
                }
                *id
            }
            ProductRef::Name(name) => match tx.find_product(name).await? {
                Some(id) => id,
                None => {
                    let id = tx
                        .create_product(&NewProduct::service(name.as_str(), line.price_unit))
                        .await?;
                    tracing::info!(product_id = %id, product = %name, "created product");
                    id
                }
            },
        };
        ids.push(id);
    }
    Ok(ids)
}
