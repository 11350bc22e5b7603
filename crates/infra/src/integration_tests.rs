//! Integration tests for the full intake pipeline over the in-memory store.
//!
//! Tests: JSON body → validation → reconciliation → invoice → commit
//!
//! Verifies:
//! - Both request variants persist exactly one invoice
//! - Customers and products are reused across submissions
//! - Failures leave no partial writes behind

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::{Number, Value, json};

    use intake_core::{CountryId, CurrencyId, InvoiceId, PartnerId, ProductId, RecordId, StateId};
    use intake_invoicing::{IntakeError, MoveType, NewInvoice};
    use intake_parties::{ContactInfo, NewPartner, PartnerMatch, PersonalDetails, PostalAddress};
    use intake_products::NewProduct;

    use crate::intake::InvoiceIntake;
    use crate::store::{
        InMemoryRecordStore, RecordStore, StoreError, StoreResult, StoreTransaction,
    };

    fn setup() -> (InvoiceIntake<InMemoryRecordStore>, InMemoryRecordStore) {
        let store = InMemoryRecordStore::with_default_currencies();
        (InvoiceIntake::new(store.clone()), store)
    }

    fn customer_body() -> Value {
        json!({
            "FirstName": "Aisha",
            "LastName": "Khan",
            "Email": "aisha@example.com",
            "Mobile": "+966500000001",
            "Country": "Saudi Arabia",
            "invoice_lines": [
                {"product_name": "Consulting", "quantity": 2, "price_unit": 150.0},
                {"product_name": "Travel", "price_unit": 40}
            ],
            "currency_id": "USD",
            "currency_code": "USD",
            "total_amount_before_tax": 340,
            "total_tax": 51,
            "total_amount_after_tax": 391,
            "payment_reference": "POS-1001"
        })
    }

    async fn seed_partners(store: &InMemoryRecordStore, count: usize) -> PartnerId {
        let mut last = None;
        for i in 0..count {
            let id = store
                .insert_partner(&NewPartner {
                    name: format!("Partner {i}"),
                    contact: ContactInfo::default(),
                    address: PostalAddress::default(),
                    personal: PersonalDetails::default(),
                })
                .await
                .unwrap();
            last = Some(id);
        }
        last.unwrap()
    }

    async fn seed_products(store: &InMemoryRecordStore, count: usize) -> ProductId {
        let mut last = None;
        for i in 0..count {
            let id = store
                .insert_product(&NewProduct::service(format!("Product {i}"), 1.0))
                .await
                .unwrap();
            last = Some(id);
        }
        last.unwrap()
    }

    #[tokio::test]
    async fn id_variant_creates_invoice_for_existing_records() {
        let (intake, store) = setup();
        let partner = seed_partners(&store, 5).await;
        let product = seed_products(&store, 10).await;
        assert_eq!((partner.get(), product.get()), (5, 10));

        let receipt = intake
            .create_invoice(&json!({
                "partner_id": 5,
                "invoice_lines": [{"product_id": 10, "quantity": 2, "price_unit": 50.0}],
                "currency_id": 1,
                "currency_code": "USD",
                "total_amount_after_tax": 100,
                "invoice_date": "2025-02-14"
            }))
            .await
            .unwrap();

        assert_eq!(receipt.customer_id, None);
        assert_eq!(receipt.currency_code.as_deref(), Some("USD"));
        assert_eq!(receipt.totals.total_amount_after_tax, Some(Number::from(100)));

        let invoices = store.invoices().await;
        assert_eq!(invoices.len(), 1);
        let invoice = &invoices[0];
        assert_eq!(invoice.id, receipt.invoice_id);
        assert_eq!(invoice.fields.partner_id, partner);
        assert_eq!(invoice.fields.currency_id, CurrencyId::from_raw(1));
        assert_eq!(invoice.fields.move_type, MoveType::OutInvoice);
        assert_eq!(
            invoice.fields.invoice_date,
            NaiveDate::from_ymd_opt(2025, 2, 14).unwrap()
        );
        assert_eq!(invoice.fields.lines.len(), 1);
        assert_eq!(invoice.fields.lines[0].product_id, product);
        assert_eq!(invoice.fields.lines[0].quantity, 2.0);
    }

    #[tokio::test]
    async fn customer_variant_creates_partner_products_and_invoice() {
        let (intake, store) = setup();
        store.insert_country("Saudi Arabia", "SA").await;

        let receipt = intake.create_invoice(&customer_body()).await.unwrap();

        let partners = store.partners().await;
        assert_eq!(partners.len(), 1);
        assert_eq!(partners[0].name, "Aisha Khan");
        assert!(partners[0].address.country_id.is_some());
        assert_eq!(receipt.customer_id, Some(partners[0].id));

        let products = store.products().await;
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Consulting");
        assert_eq!(products[0].list_price, 150.0);
        assert_eq!(products[1].list_price, 40.0);

        let invoices = store.invoices().await;
        assert_eq!(invoices.len(), 1);
        let lines = &invoices[0].fields.lines;
        assert_eq!(lines[0].product_id, products[0].id);
        assert_eq!(lines[1].product_id, products[1].id);
        assert_eq!(lines[1].quantity, 1.0);
        assert_eq!(invoices[0].fields.payment_reference.as_deref(), Some("POS-1001"));
    }

    #[tokio::test]
    async fn resubmission_reuses_partner_and_products() {
        let (intake, store) = setup();

        let first = intake.create_invoice(&customer_body()).await.unwrap();
        let second = intake.create_invoice(&customer_body()).await.unwrap();

        assert_eq!(first.customer_id, second.customer_id);
        assert_ne!(first.invoice_id, second.invoice_id);
        assert_eq!(store.partners().await.len(), 1);
        assert_eq!(store.products().await.len(), 2);
        assert_eq!(store.invoices().await.len(), 2);
    }

    #[tokio::test]
    async fn padded_names_and_contacts_match_stored_records() {
        let (intake, store) = setup();
        let gold = store
            .insert_product(&NewProduct::service("Gold", 250.0))
            .await
            .unwrap();
        let first = intake.create_invoice(&customer_body()).await.unwrap();

        let mut body = customer_body();
        body["Email"] = json!("  aisha@example.com ");
        body["Mobile"] = json!(null);
        body["invoice_lines"] = json!([{"product_name": " Gold ", "price_unit": 250}]);
        let second = intake.create_invoice(&body).await.unwrap();

        assert_eq!(second.customer_id, first.customer_id);
        let invoices = store.invoices().await;
        assert_eq!(invoices[1].fields.lines[0].product_id, gold);
        assert_eq!(store.products().await.len(), 3);
    }

    #[tokio::test]
    async fn string_totals_and_currency_id_are_coerced() {
        let (intake, store) = setup();
        seed_partners(&store, 1).await;
        seed_products(&store, 1).await;

        let receipt = intake
            .create_invoice(&json!({
                "partner_id": "1",
                "invoice_lines": [{"product_id": "1"}],
                "currency_id": "1",
                "total_amount_after_tax": "100.50"
            }))
            .await
            .unwrap();

        assert_eq!(
            receipt.totals.total_amount_after_tax.as_ref().and_then(Number::as_f64),
            Some(100.5)
        );
        assert_eq!(store.invoices().await[0].fields.currency_id, CurrencyId::from_raw(1));
    }

    #[tokio::test]
    async fn unknown_currency_writes_nothing() {
        let (intake, store) = setup();
        let mut body = customer_body();
        body["currency_id"] = json!("XYZ");

        let err = intake.create_invoice(&body).await.unwrap_err();

        assert_eq!(err, IntakeError::unresolved("Currency \"XYZ\" not found"));
        assert!(store.partners().await.is_empty());
        assert!(store.products().await.is_empty());
        assert!(store.invoices().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_product_id_rolls_back_created_customer() {
        let (intake, store) = setup();
        let mut body = customer_body();
        body["invoice_lines"] = json!([
            {"product_name": "Consulting", "price_unit": 10},
            {"product_id": 77}
        ]);

        let err = intake.create_invoice(&body).await.unwrap_err();

        assert_eq!(err, IntakeError::unresolved("Product 77 not found"));
        assert!(store.partners().await.is_empty());
        assert!(store.products().await.is_empty());
    }

    #[tokio::test]
    async fn validation_failures_write_nothing() {
        let (intake, store) = setup();

        let bodies = [
            json!({"invoice_lines": [{"product_id": 1}], "currency_id": 1}),
            json!({"partner_id": 1, "invoice_lines": [], "currency_id": 1}),
            json!({"partner_id": 1, "invoice_lines": [{"product_id": 1}]}),
            json!({"partner_id": 1, "invoice_lines": [{"product_id": 1, "quantity": "2"}], "currency_id": 1}),
        ];
        for body in &bodies {
            let err = intake.create_invoice(body).await.unwrap_err();
            assert!(matches!(err, IntakeError::Validation(_)), "{body}: {err:?}");
        }

        let mut body = customer_body();
        body["invoice_date"] = json!("14/02/2025");
        let err = intake.create_invoice(&body).await.unwrap_err();
        assert!(matches!(err, IntakeError::InvalidValue(_)));

        assert!(store.partners().await.is_empty());
        assert!(store.invoices().await.is_empty());
    }

    /// Store whose transactions fail at invoice creation.
    struct FailingStore {
        inner: InMemoryRecordStore,
    }

    struct FailingTransaction {
        inner: Box<dyn StoreTransaction>,
    }

    #[async_trait]
    impl RecordStore for FailingStore {
        async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>> {
            Ok(Box::new(FailingTransaction {
                inner: self.inner.begin().await?,
            }))
        }
    }

    #[async_trait]
    impl StoreTransaction for FailingTransaction {
        async fn partner_exists(&mut self, id: PartnerId) -> StoreResult<bool> {
            self.inner.partner_exists(id).await
        }

        async fn find_partner(&mut self, criteria: &PartnerMatch) -> StoreResult<Option<PartnerId>> {
            self.inner.find_partner(criteria).await
        }

        async fn create_partner(&mut self, partner: &NewPartner) -> StoreResult<PartnerId> {
            self.inner.create_partner(partner).await
        }

        async fn find_country(&mut self, name: &str) -> StoreResult<Option<CountryId>> {
            self.inner.find_country(name).await
        }

        async fn find_state(
            &mut self,
            name: &str,
            country_id: Option<CountryId>,
        ) -> StoreResult<Option<StateId>> {
            self.inner.find_state(name, country_id).await
        }

        async fn currency_exists(&mut self, id: CurrencyId) -> StoreResult<bool> {
            self.inner.currency_exists(id).await
        }

        async fn find_currency(&mut self, code_or_name: &str) -> StoreResult<Option<CurrencyId>> {
            self.inner.find_currency(code_or_name).await
        }

        async fn product_exists(&mut self, id: ProductId) -> StoreResult<bool> {
            self.inner.product_exists(id).await
        }

        async fn find_product(&mut self, name: &str) -> StoreResult<Option<ProductId>> {
            self.inner.find_product(name).await
        }

        async fn create_product(&mut self, product: &NewProduct) -> StoreResult<ProductId> {
            self.inner.create_product(product).await
        }

        async fn create_invoice(&mut self, _invoice: &NewInvoice) -> StoreResult<InvoiceId> {
            Err(StoreError::Database("disk full".to_string()))
        }

        async fn commit(self: Box<Self>) -> StoreResult<()> {
            self.inner.commit().await
        }

        async fn rollback(self: Box<Self>) -> StoreResult<()> {
            self.inner.rollback().await
        }
    }

    #[tokio::test]
    async fn store_failure_rolls_back_and_reports_unexpected() {
        let inner = InMemoryRecordStore::with_default_currencies();
        let intake = InvoiceIntake::new(Arc::new(FailingStore {
            inner: inner.clone(),
        }));

        let err = intake.create_invoice(&customer_body()).await.unwrap_err();

        assert!(matches!(err, IntakeError::Unexpected(_)));
        assert!(err.to_string().starts_with("An unexpected error occurred: "));
        assert!(err.to_string().contains("disk full"));
        assert!(inner.partners().await.is_empty());
        assert!(inner.products().await.is_empty());

        // The failed transaction released the store.
        let ok = InvoiceIntake::new(inner.clone())
            .create_invoice(&customer_body())
            .await
            .unwrap();
        assert!(ok.customer_id.is_some());
    }

    #[tokio::test]
    async fn concurrent_submissions_for_one_customer_create_one_partner() {
        let (intake, store) = setup();
        let intake = Arc::new(intake);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let intake = intake.clone();
                tokio::spawn(async move { intake.create_invoice(&customer_body()).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.partners().await.len(), 1);
        assert_eq!(store.products().await.len(), 2);
        assert_eq!(store.invoices().await.len(), 8);
    }
}
